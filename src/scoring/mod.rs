//! Plaintext quality scoring.
//!
//! The primary fitness signal is quadgram log-likelihood under the active
//! language model. Because the shipped tables are top-N rather than
//! exhaustive, absolute scores shift with table density; callers compare
//! candidates relatively, or look at the per-quadgram margin above the
//! unseen-gram floor. Word coverage, when a dictionary is loaded, is a
//! much sharper signal and dominates the combined score.

use std::cmp::Ordering;

use crate::resources::{Dictionary, LanguageModel};

/// Weight that turns word coverage into combined-score points. At 50.0,
/// seventy percent coverage outweighs any plausible quadgram gap between
/// two candidate decryptions of the same text.
pub const COVERAGE_WEIGHT: f64 = 50.0;

/// Word coverage at which a brute-force sweep may stop early.
pub const EARLY_STOP_COVERAGE: f64 = 0.70;

/// Total quadgram log-likelihood of a cleaned candidate plaintext.
pub fn quadgram_score(cleaned: &str, model: &LanguageModel) -> f64 {
    model.ngram_score(cleaned, 4)
}

/// Average per-quadgram margin above the model's unseen-gram floor.
///
/// Near 0.0 for noise; roughly 1.0 for fluent text in the model's
/// language. Robust to table density, unlike the absolute score.
pub fn quadgram_margin(cleaned: &str, model: &LanguageModel) -> f64 {
    let windows = cleaned.len().saturating_sub(3);
    if windows == 0 {
        return 0.0;
    }
    model.ngram_score(cleaned, 4) / windows as f64 - model.ngram_floor(4)
}

/// Fraction of words (three letters or longer) found in the dictionary.
pub fn word_coverage(text: &str, dictionary: &Dictionary) -> f64 {
    let mut total = 0usize;
    let mut valid = 0usize;
    for word in text.split(|c: char| !c.is_ascii_alphabetic()) {
        if word.len() < 3 {
            continue;
        }
        total += 1;
        if dictionary.contains(word) {
            valid += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        valid as f64 / total as f64
    }
}

/// N-gram score plus the weighted coverage bonus.
pub fn combined_score(ngram: f64, coverage: f64) -> f64 {
    ngram + COVERAGE_WEIGHT * coverage
}

/// Map coverage and quadgram margin to a solver confidence.
///
/// Coverage above 0.8 is as close to proof as this engine gets; below the
/// coverage thresholds the margin buckets take over, topping out at 0.7
/// because n-grams alone never justify more.
pub fn confidence_from_evidence(coverage: Option<f64>, margin: f64) -> f64 {
    if let Some(cov) = coverage {
        if cov > 0.80 {
            return 0.98;
        }
        if cov > 0.70 {
            return 0.95;
        }
    }
    if margin > 0.80 {
        0.70
    } else if margin > 0.50 {
        0.50
    } else if margin > 0.25 {
        0.35
    } else {
        0.20
    }
}

/// A total-ordered score. NaN sorts below everything, so a poisoned
/// candidate can never displace a real one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score(pub f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .0
                .partial_cmp(&other.0)
                .unwrap_or(Ordering::Equal),
        }
    }
}
