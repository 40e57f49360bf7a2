//! Vigenère-sibling key recovery: Beaufort, Gronsfeld, Porta.
//!
//! All three are periodic ciphers whose columns are monoalphabetic, so
//! the Friedman/Kasiski key-length machinery carries over unchanged; only
//! the per-column arithmetic differs. Each variant recovers its best key
//! and the variant whose decryption scores highest is reported. Quagmire
//! keys do not yield to per-column chi-squared with a known alphabet and
//! are left to the hill-climb fallback.

use log::{debug, trace};

use crate::analysis::kasiski;
use crate::analysis::{chi_squared_letters, letter_percentages};
use crate::ciphers::CipherKind;
use crate::errors::EngineError;
use crate::resources::LanguageModel;
use crate::scoring;
use crate::solvers::vigenere::friedman_estimate;
use crate::solvers::{evaluate, result_from_layout, SolveContext, StrategyResult};

/// Acceptance floor on quadgram margin.
const ACCEPT_MARGIN: f64 = 0.40;
/// Acceptance floor on word coverage.
const ACCEPT_COVERAGE: f64 = 0.40;

/// The per-column arithmetic of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    /// plaintext = key − ciphertext.
    Beaufort,
    /// Vigenère with digit shifts 0-9.
    Gronsfeld,
    /// Porta's thirteen reciprocal alphabets.
    Porta,
}

impl Variant {
    /// Number of distinct key symbols per column.
    fn key_space(&self) -> u8 {
        match self {
            Variant::Beaufort => 26,
            Variant::Gronsfeld => 10,
            Variant::Porta => 13,
        }
    }

    /// Decrypt one letter index under key symbol `k`.
    fn decrypt_letter(&self, c: u8, k: u8) -> u8 {
        match self {
            Variant::Beaufort => (k + 26 - c) % 26,
            Variant::Gronsfeld => (c + 26 - k) % 26,
            Variant::Porta => {
                if c < 13 {
                    13 + (c + k) % 13
                } else {
                    (c - 13 + 13 - k) % 13
                }
            }
        }
    }

    /// Render a recovered per-column symbol vector as a key string.
    fn key_string(&self, symbols: &[u8]) -> String {
        match self {
            Variant::Beaufort => symbols.iter().map(|&s| (s + b'A') as char).collect(),
            Variant::Gronsfeld => symbols.iter().map(|&s| (s + b'0') as char).collect(),
            // Each Porta row covers a key-letter pair; report the first.
            Variant::Porta => symbols.iter().map(|&s| (2 * s + b'A') as char).collect(),
        }
    }

    /// The concrete cipher for a recovered key.
    fn cipher(&self, key: String) -> CipherKind {
        match self {
            Variant::Beaufort => CipherKind::Beaufort { key },
            Variant::Gronsfeld => CipherKind::Gronsfeld { key },
            Variant::Porta => CipherKind::Porta { key },
        }
    }
}

/// Try Beaufort, Gronsfeld and Porta; report the best acceptable result.
pub fn crack_polyalphabetic(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    if ctx.cleaned.len() < 16 {
        return Ok(None);
    }

    let target = ctx.pack.language.target_ioc();
    let mut key_lengths: Vec<usize> = Vec::new();
    if let Some(best) = kasiski::examine(ctx.cleaned).best() {
        if best.key_length <= ctx.cleaned.len() / 4 {
            key_lengths.push(best.key_length);
        }
    }
    if let Some(est) = friedman_estimate(ctx.cleaned, target) {
        if !key_lengths.contains(&est.key_length) {
            key_lengths.push(est.key_length);
        }
    }
    if key_lengths.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(f64, StrategyResult)> = None;
    for variant in [Variant::Beaufort, Variant::Gronsfeld, Variant::Porta] {
        for &k in &key_lengths {
            if ctx.out_of_time() {
                break;
            }
            let symbols = recover_key(ctx.cleaned, k, variant, ctx.model());
            let key = variant.key_string(&symbols);
            let candidate = variant.cipher(key.clone()).decode(ctx.original)?;
            let eval = evaluate(&candidate, ctx.pack);
            if eval.coverage.unwrap_or(0.0) <= ACCEPT_COVERAGE && eval.margin <= ACCEPT_MARGIN {
                trace!(
                    "{:?} k={} rejected (margin {:.2})",
                    variant,
                    k,
                    eval.margin
                );
                continue;
            }
            let combined =
                scoring::combined_score(eval.raw_score, eval.coverage.unwrap_or(0.0));
            debug!("{:?} k={} key={} combined {:.2}", variant, k, key, combined);
            if best.as_ref().is_none_or(|(b, _)| combined > *b) {
                let method = variant.cipher(String::new()).method_tag();
                best = Some((
                    combined,
                    result_from_layout(method, Some(key), candidate, &eval),
                ));
            }
        }
    }
    Ok(best.map(|(_, result)| result))
}

/// Recover the best key symbol per column by chi-squared.
fn recover_key(cleaned: &str, k: usize, variant: Variant, model: &LanguageModel) -> Vec<u8> {
    let mut cols = vec![String::new(); k];
    for (i, c) in cleaned.chars().enumerate() {
        cols[i % k].push(c);
    }
    cols.iter()
        .map(|col| {
            (0..variant.key_space())
                .min_by(|&a, &b| {
                    column_fit(col, a, variant, model)
                        .partial_cmp(&column_fit(col, b, variant, model))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(0)
        })
        .collect()
}

/// Chi-squared of one column decrypted under key symbol `k`.
fn column_fit(column: &str, k: u8, variant: Variant, model: &LanguageModel) -> f64 {
    let decrypted: String = column
        .bytes()
        .map(|b| (variant.decrypt_letter(b - b'A', k) + b'A') as char)
        .collect();
    let observed = letter_percentages(&decrypted);
    chi_squared_letters(&observed, model.monogram_pct())
}
