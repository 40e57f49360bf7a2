//! N-gram log-probability model.
//!
//! Tables are loaded once from percentage maps and converted to log10
//! probabilities. Unseen n-grams score at a floor of one tenth of the
//! smallest observed probability so a single missing quadgram cannot drive
//! a candidate plaintext to negative infinity.

use std::collections::HashMap;

/// Log-probability tables for n-grams of order 1 through 4.
#[derive(Debug, Clone)]
pub struct NGramModel {
    /// `log10(P)` per n-gram, indexed by `n - 1`.
    log_probs: [HashMap<String, f64>; 4],
    /// Floor applied to unseen n-grams, indexed by `n - 1`.
    floors: [f64; 4],
}

impl NGramModel {
    /// Build a model from four percentage tables (monograms through
    /// quadgrams). Percentages are relative frequencies on a 0-100 scale.
    pub fn from_percentages(tables: [&HashMap<String, f64>; 4]) -> NGramModel {
        let mut log_probs: [HashMap<String, f64>; 4] = Default::default();
        let mut floors = [f64::MIN; 4];
        for (i, table) in tables.iter().enumerate() {
            let mut min_prob = f64::MAX;
            for (gram, pct) in table.iter() {
                let prob = (pct / 100.0).max(f64::MIN_POSITIVE);
                min_prob = min_prob.min(prob);
                log_probs[i].insert(gram.to_ascii_uppercase(), prob.log10());
            }
            floors[i] = if min_prob == f64::MAX {
                // Empty table: score everything at a deep but finite floor.
                -10.0
            } else {
                (min_prob / 10.0).log10()
            };
        }
        NGramModel { log_probs, floors }
    }

    /// Sum of `log10 P(gram)` over every length-`n` window of `text`.
    ///
    /// `text` must be in cleaned form (uppercase A-Z). Returns 0.0 when the
    /// text is shorter than `n`.
    pub fn score(&self, text: &str, n: usize) -> f64 {
        assert!((1..=4).contains(&n), "n-gram order must be 1..=4");
        let bytes = text.as_bytes();
        if bytes.len() < n {
            return 0.0;
        }
        let table = &self.log_probs[n - 1];
        let floor = self.floors[n - 1];
        bytes
            .windows(n)
            .map(|w| {
                // Cleaned text is pure ASCII, so the window is valid UTF-8.
                let gram = std::str::from_utf8(w).unwrap_or("");
                table.get(gram).copied().unwrap_or(floor)
            })
            .sum()
    }

    /// The unseen-n-gram floor for order `n`, in log10 space.
    pub fn floor(&self, n: usize) -> f64 {
        self.floors[n - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model() -> NGramModel {
        let mono: HashMap<String, f64> =
            [("T".to_string(), 9.0), ("H".to_string(), 6.0), ("E".to_string(), 12.0)]
                .into_iter()
                .collect();
        let bi: HashMap<String, f64> = [("TH".to_string(), 3.5)].into_iter().collect();
        let tri: HashMap<String, f64> = [("THE".to_string(), 1.8)].into_iter().collect();
        let quad: HashMap<String, f64> = [("THEQ".to_string(), 0.3)].into_iter().collect();
        NGramModel::from_percentages([&mono, &bi, &tri, &quad])
    }

    #[test]
    fn test_known_ngram_scores_above_floor() {
        let model = tiny_model();
        let known = model.score("THE", 3);
        let unknown = model.score("XYZ", 3);
        assert!(known > unknown);
        assert_eq!(unknown, model.floor(3));
    }

    #[test]
    fn test_short_text_scores_zero() {
        let model = tiny_model();
        assert_eq!(model.score("TH", 3), 0.0);
        assert_eq!(model.score("", 1), 0.0);
    }

    #[test]
    fn test_score_sums_windows() {
        let model = tiny_model();
        let one = model.score("THEQ", 4);
        let two = model.score("THEQX", 4);
        // Second window "HEQX" is unseen, so the total drops by the floor.
        assert!((two - one - model.floor(4)).abs() < 1e-12);
    }

    #[test]
    fn test_floor_is_tenth_of_minimum() {
        let model = tiny_model();
        let expected = (0.003_f64 / 10.0).log10();
        assert!((model.floor(4) - expected).abs() < 1e-12);
    }
}
