//! Kasiski examination.
//!
//! Repeated trigrams in a polyalphabetic ciphertext tend to be the same
//! plaintext fragment enciphered at the same key phase, so the distances
//! between their occurrences are multiples of the key length. Each
//! candidate length is scored by the fraction of observed distances it
//! divides.

use std::collections::HashMap;

use log::trace;

use crate::textnorm::clean_letters;

/// Smallest key length considered.
pub const MIN_KEY_LENGTH: usize = 2;
/// Largest key length considered.
pub const MAX_KEY_LENGTH: usize = 20;

/// One candidate key length with its divisor-vote score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyLengthCandidate {
    /// Candidate key length, in [2, 20].
    pub key_length: usize,
    /// Fraction of repeat distances divisible by `key_length`.
    pub score: f64,
}

/// Full result of a Kasiski examination.
#[derive(Debug, Clone)]
pub struct KasiskiExamination {
    /// Trigram → positions, for trigrams occurring more than once.
    pub repeated_trigrams: HashMap<String, Vec<usize>>,
    /// All pairwise distances between same-trigram occurrences.
    pub distances: Vec<usize>,
    /// Key-length candidates sorted best first (ties favor shorter keys).
    pub key_length_candidates: Vec<KeyLengthCandidate>,
    /// Whether any trigram repeats at all.
    pub has_repetitions: bool,
}

impl KasiskiExamination {
    /// The best-scoring candidate, if any repetitions were found.
    pub fn best(&self) -> Option<KeyLengthCandidate> {
        self.key_length_candidates.first().copied()
    }
}

/// Examine `text` for repeated trigrams and rank key-length candidates.
pub fn examine(text: &str) -> KasiskiExamination {
    let cleaned = clean_letters(text);
    let bytes = cleaned.as_bytes();

    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
    if bytes.len() >= 3 {
        for (i, window) in bytes.windows(3).enumerate() {
            if let Ok(gram) = std::str::from_utf8(window) {
                positions.entry(gram.to_string()).or_default().push(i);
            }
        }
    }
    positions.retain(|_, v| v.len() > 1);

    let mut distances = Vec::new();
    for occurrences in positions.values() {
        for (i, &a) in occurrences.iter().enumerate() {
            for &b in &occurrences[i + 1..] {
                distances.push(b - a);
            }
        }
    }
    distances.sort_unstable();

    let mut candidates = Vec::new();
    if !distances.is_empty() {
        for key_length in MIN_KEY_LENGTH..=MAX_KEY_LENGTH {
            let divisible = distances.iter().filter(|&&d| d % key_length == 0).count();
            let score = divisible as f64 / distances.len() as f64;
            if score > 0.0 {
                candidates.push(KeyLengthCandidate { key_length, score });
            }
        }
        // Best score first; among equal scores the shorter key is the more
        // likely true period (longer divisors are usually its multiples).
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.key_length.cmp(&b.key_length))
        });
    }

    trace!(
        "kasiski: {} repeated trigrams, {} distances, top candidate {:?}",
        positions.len(),
        distances.len(),
        candidates.first()
    );

    KasiskiExamination {
        has_repetitions: !positions.is_empty(),
        repeated_trigrams: positions,
        distances,
        key_length_candidates: candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_repetitions_in_short_text() {
        let exam = examine("ABCDEFG");
        assert!(!exam.has_repetitions);
        assert!(exam.key_length_candidates.is_empty());
    }

    #[test]
    fn test_repeated_trigram_distance() {
        // "XYZ" occurs at positions 0 and 9: distance 9.
        let exam = examine("XYZABCDEFXYZ");
        assert!(exam.has_repetitions);
        assert_eq!(exam.distances, vec![9]);
        let best = exam.best().unwrap();
        assert_eq!(best.key_length, 3);
        assert!((best.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_candidates_stay_in_range() {
        let text = "THEQUICKTHEBROWNTHEFOXTHEJUMPS".repeat(3);
        let exam = examine(&text);
        for candidate in &exam.key_length_candidates {
            assert!((MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&candidate.key_length));
            assert!((0.0..=1.0).contains(&candidate.score));
        }
    }

    #[test]
    fn test_tie_break_prefers_shorter_key() {
        // Distance 12 is divisible by 2, 3, 4, 6, 12 equally.
        let exam = examine("QQQABCDEFGHIQQQ");
        assert_eq!(exam.distances, vec![12]);
        assert_eq!(exam.best().unwrap().key_length, 2);
    }

    #[test]
    fn test_ignores_layout() {
        let spaced = examine("XYZ ABC DEF XYZ");
        let packed = examine("XYZABCDEFXYZ");
        assert_eq!(spaced.distances, packed.distances);
    }
}
