use goi_core::error::AppError;

/// Maps text to a fixed-dimension vector for a named model.
pub trait Embedder: Send + Sync {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;

/// Longest prefix of `input` that fits in `max_bytes` without splitting a char.
pub(crate) fn clip_to_bytes(input: &str, max_bytes: usize) -> &str {
    if input.len() <= max_bytes {
        return input;
    }
    let mut end = max_bytes;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

#[cfg(test)]
mod tests {
    use super::clip_to_bytes;

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip_to_bytes("abc", 10), "abc");
        assert_eq!(clip_to_bytes("₹100", 2), "");
        assert_eq!(clip_to_bytes("a₹", 3), "a");
    }
}
