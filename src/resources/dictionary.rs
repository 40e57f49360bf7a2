//! Per-language word sets.
//!
//! Dictionary files are plain JSON arrays of uppercase words. Loading is
//! best-effort: a missing or malformed file yields no dictionary, and all
//! dependent scoring quietly skips the word-coverage bonus.

use std::collections::HashSet;

use log::debug;

/// An immutable set of known words for one language.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Build a dictionary from an iterator of words. Words are folded to
    /// uppercase so membership tests are case-insensitive.
    pub fn from_words<I, S>(words: I) -> Dictionary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Dictionary {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Parse a JSON array of words. Returns `None` on malformed input.
    pub fn from_json(json: &str) -> Option<Dictionary> {
        match serde_json::from_str::<Vec<String>>(json) {
            Ok(words) => Some(Dictionary::from_words(words)),
            Err(e) => {
                debug!("dictionary JSON failed to parse: {}", e);
                None
            }
        }
    }

    /// Is `word` a known word? Case-insensitive.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_ascii_uppercase())
    }

    /// Number of words loaded.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when no words were loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_case_insensitive() {
        let dict = Dictionary::from_words(["Hello", "WORLD"]);
        assert!(dict.contains("hello"));
        assert!(dict.contains("World"));
        assert!(!dict.contains("missing"));
    }

    #[test]
    fn test_from_json_parses_array() {
        let dict = Dictionary::from_json(r#"["THE", "QUICK"]"#).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("the"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Dictionary::from_json("{not json").is_none());
        assert!(Dictionary::from_json(r#"{"a": 1}"#).is_none());
    }
}
