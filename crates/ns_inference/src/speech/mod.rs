pub mod gtts;
pub mod silence;

pub use gtts::{GoogleTranslateTts, TtsConfig};
pub use silence::silent_mp3;

/// Splits `text` into chunks of at most `max_chars` characters, breaking on
/// whitespace where possible. Words longer than `max_chars` are cut.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_text() {
        assert!(split_text("   ", 10).is_empty());
        assert_eq!(split_text("hello world", 100), vec!["hello world"]);
        assert_eq!(
            split_text("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(split_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(split_text("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    }

    #[test]
    fn test_split_text_counts_characters() {
        let text = "माफ़ करें, हम आपके अनुरोध को प्रोसेस नहीं कर सके।";
        let chunks = split_text(text, 12);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 12));
        assert_eq!(chunks.join(" "), text);
    }
}
