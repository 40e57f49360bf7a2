//! Statistical measurements over ciphertext.
//!
//! Everything here operates on the cleaned A-Z form (non-letters are
//! ignored, case is folded). The index of coincidence uses the normalized
//! k=26 form throughout: uniform random letters land near 1.0, English
//! plaintext near 1.73.

/// Cipher-family classification from the statistics below.
pub mod classifier;
/// Repeated-trigram examination for polyalphabetic key lengths.
pub mod kasiski;
/// Script gating and shape-score language ranking.
pub mod language;

use std::collections::HashMap;

/// Occurrence counts for A-Z in `text`, case-folded. Non-letters ignored.
pub fn letter_counts(text: &str) -> [u64; 26] {
    let mut counts = [0u64; 26];
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            counts[(c.to_ascii_uppercase() as u8 - b'A') as usize] += 1;
        }
    }
    counts
}

/// Letter distribution of `text` as percentages summing to 100 (or all
/// zero for letterless input).
pub fn letter_percentages(text: &str) -> [f64; 26] {
    let counts = letter_counts(text);
    let total: u64 = counts.iter().sum();
    let mut pct = [0.0f64; 26];
    if total > 0 {
        for i in 0..26 {
            pct[i] = counts[i] as f64 / total as f64 * 100.0;
        }
    }
    pct
}

/// Normalized index of coincidence: `26 · Σ fᵢ(fᵢ−1) / (N(N−1))`.
///
/// 0.0 for fewer than two letters; ≈1.0 for uniform noise; ≈1.73 for
/// English. Invariant under any monoalphabetic substitution.
pub fn index_of_coincidence(text: &str) -> f64 {
    let counts = letter_counts(text);
    let n: u64 = counts.iter().sum();
    if n < 2 {
        return 0.0;
    }
    let coincidences: f64 = counts.iter().map(|&f| (f * f.saturating_sub(1)) as f64).sum();
    26.0 * coincidences / (n as f64 * (n as f64 - 1.0))
}

/// Shannon entropy in bits over the letter distribution of `text`.
/// Bounded above by log2(26) ≈ 4.70.
pub fn entropy(text: &str) -> f64 {
    let counts = letter_counts(text);
    let n: u64 = counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / n as f64;
            -p * p.log2()
        })
        .sum()
}

/// Chi-squared between two 26-entry percentage vectors, summed over the
/// expected distribution's non-zero entries.
pub fn chi_squared_letters(observed_pct: &[f64; 26], expected_pct: &[f64; 26]) -> f64 {
    let mut chi = 0.0;
    for i in 0..26 {
        let expected = expected_pct[i];
        if expected > 0.0 {
            let diff = observed_pct[i] - expected;
            chi += diff * diff / expected;
        }
    }
    chi
}

/// Chi-squared between two n-gram percentage maps, over the expected
/// map's keys. Missing observations count as zero.
pub fn chi_squared(observed: &HashMap<String, f64>, expected: &HashMap<String, f64>) -> f64 {
    let mut chi = 0.0;
    for (gram, &exp) in expected {
        if exp > 0.0 {
            let obs = observed.get(gram).copied().unwrap_or(0.0);
            let diff = obs - exp;
            chi += diff * diff / exp;
        }
    }
    chi
}

/// Chi-squared between two value vectors after sorting both descending.
///
/// Discards the key alignment on purpose: a monoalphabetic substitution
/// permutes which letter carries which frequency but not the multiset of
/// frequencies, so this score still separates languages on enciphered
/// text.
pub fn shape_score(observed: &[f64], expected: &[f64]) -> f64 {
    let mut obs: Vec<f64> = observed.to_vec();
    let mut exp: Vec<f64> = expected.to_vec();
    obs.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    exp.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut chi = 0.0;
    for (i, &e) in exp.iter().enumerate() {
        if e > 0.0 {
            let o = obs.get(i).copied().unwrap_or(0.0);
            let diff = o - e;
            chi += diff * diff / e;
        }
    }
    chi
}

/// Percentage frequencies of every length-`n` window in cleaned `text`.
pub fn ngram_percentages(text: &str, n: usize) -> HashMap<String, f64> {
    let cleaned = crate::textnorm::clean_letters(text);
    let bytes = cleaned.as_bytes();
    let mut counts: HashMap<String, u64> = HashMap::new();
    if bytes.len() >= n {
        for window in bytes.windows(n) {
            if let Ok(gram) = std::str::from_utf8(window) {
                *counts.entry(gram.to_string()).or_insert(0) += 1;
            }
        }
    }
    let total: u64 = counts.values().sum();
    counts
        .into_iter()
        .map(|(gram, count)| (gram, count as f64 / total.max(1) as f64 * 100.0))
        .collect()
}
