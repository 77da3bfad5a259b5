pub(crate) fn normalize_text(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

pub(crate) fn token_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Split on sentence terminators followed by whitespace, so decimals like `92.5%` stay intact.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        buf.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
            if at_boundary {
                let s = buf.split_whitespace().collect::<Vec<_>>().join(" ");
                if !s.is_empty() {
                    out.push(s);
                }
                buf.clear();
            }
        }
    }
    let rest = buf.split_whitespace().collect::<Vec<_>>().join(" ");
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

/// Split free text into passages of at most `max_tokens` whitespace tokens.
///
/// Passages break at paragraph and sentence boundaries; only a single sentence longer
/// than the budget is cut mid-sentence, into consecutive word windows.
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<String> {
    let max_tokens = max_tokens.max(1);
    let normalized = normalize_text(text);

    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_tokens = 0usize;

    let flush = |buf: &mut String, buf_tokens: &mut usize, out: &mut Vec<String>| {
        let t = buf.trim();
        if !t.is_empty() {
            out.push(t.to_string());
        }
        buf.clear();
        *buf_tokens = 0;
    };

    for para in normalized.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let mut para_start = true;
        for sentence in split_sentences(para) {
            let n = token_count(&sentence);
            if n > max_tokens {
                flush(&mut buf, &mut buf_tokens, &mut out);
                let words: Vec<&str> = sentence.split_whitespace().collect();
                for window in words.chunks(max_tokens) {
                    out.push(window.join(" "));
                }
                para_start = false;
                continue;
            }
            if buf_tokens + n > max_tokens {
                flush(&mut buf, &mut buf_tokens, &mut out);
            }
            if !buf.is_empty() {
                buf.push_str(if para_start { "\n\n" } else { " " });
            }
            buf.push_str(&sentence);
            buf_tokens += n;
            para_start = false;
        }
    }
    flush(&mut buf, &mut buf_tokens, &mut out);

    out
}
