/// Укоротить текст для логов: не более `max_chars` символов
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("привет мир", 6), "привет...");
        assert_eq!(preview("short", 50), "short");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\tthree\n"), 3);
        assert_eq!(word_count("   "), 0);
    }
}
