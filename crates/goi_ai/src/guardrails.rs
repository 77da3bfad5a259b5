use goi_core::error::{AppError, AI_GENERATION_MALFORMED};

/// Trim generated text and cap it at `max_chars` characters.
///
/// Empty output is rejected so the caller takes the extractive path instead.
pub fn sanitize_generated(output: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(
            AI_GENERATION_MALFORMED,
            "Generated answer was empty",
        ));
    }
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => Ok(trimmed[..cut].trim_end().to_string()),
        None => Ok(trimmed.to_string()),
    }
}
