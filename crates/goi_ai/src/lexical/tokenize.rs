use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "do", "does", "for", "from", "had",
    "has", "have", "how", "in", "is", "it", "of", "on", "or", "the", "to", "was", "were",
    "what", "which", "who", "with",
];

fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.contains(&term)
}

/// Lowercased alphanumeric runs with stop words removed, in text order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Query terms, de-duplicated in first-occurrence order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_drops_stop_words() {
        assert_eq!(
            tokenize("What is the Employment-Rate for Engineering in 2024?"),
            vec!["employment", "rate", "engineering", "2024"]
        );
    }

    #[test]
    fn query_terms_are_unique() {
        assert_eq!(query_terms("salary Salary SALARY arts"), vec!["salary", "arts"]);
        assert!(query_terms("the of and").is_empty());
    }
}
