//! Utility functions for DOM processing

/// Cap text length for the inline preview shown beside a tag
///
/// Counts characters, not bytes, so multi-byte text never splits.
pub fn preview_text(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], marker),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_text() {
        assert_eq!(preview_text("hello", 20, "..."), "hello");
        assert_eq!(
            preview_text("Hello World this is long text", 20, "..."),
            "Hello World this is ..."
        );
        // exactly at the limit is not truncated
        assert_eq!(preview_text("12345678901234567890", 20, "..."), "12345678901234567890");
    }

    #[test]
    fn test_preview_text_multibyte() {
        assert_eq!(preview_text("ääää", 2, "…"), "ää…");
    }
}
