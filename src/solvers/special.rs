//! Single-shot attacks: Atbash, Autokey, Polybius, Baconian.
//!
//! These are cheap to try and either clearly succeed or clearly do not,
//! so each one gates on its own surface evidence and returns `None`
//! rather than a low-quality guess. The Autokey attack is a small
//! dictionary sweep over primer keys people actually use.

use log::{debug, trace};

use crate::ciphers::CipherKind;
use crate::errors::EngineError;
use crate::scoring;
use crate::solvers::{
    dict_confidence, evaluate, result_from_layout, SolveContext, StrategyResult,
};

/// Primer keys for the Autokey sweep.
const AUTOKEY_KEYS: [&str; 7] = ["THE", "AND", "KEY", "SECRET", "MESSAGE", "A", "I"];

/// Quadgram margin below which a keyless decode is not worth reporting.
const ACCEPT_MARGIN: f64 = 0.40;
/// Word coverage at which a keyless decode is reported regardless of
/// its margin.
const ACCEPT_COVERAGE: f64 = 0.40;

/// Apply the Atbash mirror and keep it only if it reads as language.
pub fn crack_atbash(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    if ctx.cleaned.is_empty() {
        return Ok(None);
    }
    let candidate = CipherKind::Atbash.decode(ctx.original)?;
    let eval = evaluate(&candidate, ctx.pack);
    trace!(
        "atbash margin {:.2} coverage {:?}",
        eval.margin,
        eval.coverage
    );
    if eval.coverage.unwrap_or(0.0) > ACCEPT_COVERAGE || eval.margin > ACCEPT_MARGIN {
        return Ok(Some(result_from_layout("atbash", None, candidate, &eval)));
    }
    Ok(None)
}

/// Sweep the primer-key dictionary for an Autokey decryption.
pub fn crack_autokey(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    if ctx.cleaned.len() < 8 {
        return Ok(None);
    }
    let mut best: Option<(f64, StrategyResult)> = None;
    for key in AUTOKEY_KEYS {
        let cipher = CipherKind::Autokey {
            key: key.to_string(),
        };
        let candidate = cipher.decode(ctx.original)?;
        let eval = evaluate(&candidate, ctx.pack);
        let combined = scoring::combined_score(eval.raw_score, eval.coverage.unwrap_or(0.0));
        trace!("autokey primer {}: combined {:.2}", key, combined);
        if eval.coverage.unwrap_or(0.0) > ACCEPT_COVERAGE || eval.margin > ACCEPT_MARGIN {
            if best.as_ref().is_none_or(|(b, _)| combined > *b) {
                best = Some((
                    combined,
                    result_from_layout("autokey", Some(key.to_string()), candidate, &eval),
                ));
            }
        }
    }
    if let Some((_, ref result)) = best {
        debug!("autokey recovered with primer {:?}", result.key);
    }
    Ok(best.map(|(_, result)| result))
}

/// Decode digit pairs through the Polybius grid.
///
/// The decoded stream has no word boundaries, so acceptance leans on the
/// quadgram margin rather than dictionary coverage.
pub fn crack_polybius(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    let Ok(decoded) = CipherKind::Polybius.decode(ctx.original) else {
        return Ok(None);
    };
    if decoded.len() < 4 {
        return Ok(None);
    }
    Ok(keyless_result(ctx, "polybius", decoded))
}

/// Decode five-symbol A/B or 0/1 groups.
pub fn crack_baconian(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    let Ok(decoded) = CipherKind::Baconian.decode(ctx.original) else {
        return Ok(None);
    };
    if decoded.len() < 4 {
        return Ok(None);
    }
    Ok(keyless_result(ctx, "baconian", decoded))
}

/// Score a re-encoded decode whose output carries its own layout.
fn keyless_result(ctx: &SolveContext, method: &str, decoded: String) -> Option<StrategyResult> {
    let eval = evaluate(&decoded, ctx.pack);
    trace!(
        "{} decode margin {:.2} coverage {:?}",
        method,
        eval.margin,
        eval.coverage
    );
    if eval.coverage.unwrap_or(0.0) <= ACCEPT_COVERAGE && eval.margin <= ACCEPT_MARGIN {
        return None;
    }
    Some(StrategyResult {
        plaintext: decoded,
        method: method.to_string(),
        key: None,
        raw_score: eval.raw_score,
        confidence: eval.confidence,
        word_coverage: eval.coverage,
        dict_confidence: eval.coverage.map(dict_confidence),
        language: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Language, Resources};
    use crate::solvers::LangPack;
    use crate::textnorm::clean_letters;

    fn english_pack() -> LangPack {
        let resources = Resources::from_embedded().unwrap();
        LangPack {
            language: Language::English,
            model: resources.model(Language::English).unwrap(),
            dictionary: resources.dictionary(Language::English),
        }
    }

    fn ctx<'a>(original: &'a str, cleaned: &'a str, pack: &'a LangPack) -> SolveContext<'a> {
        SolveContext {
            original,
            cleaned,
            pack,
            language_candidates: &[],
            deadline: None,
            seed: 0,
        }
    }

    #[test]
    fn test_atbash_recovers_mirrored_text() {
        let plaintext = "THE SOLDIERS CAME HOME TO THEIR TOWNS AND VILLAGES";
        let ciphertext = CipherKind::Atbash.encode(plaintext).unwrap();
        let cleaned = clean_letters(&ciphertext);
        let pack = english_pack();
        let result = crack_atbash(&ctx(&ciphertext, &cleaned, &pack))
            .unwrap()
            .unwrap();
        assert_eq!(result.plaintext, plaintext);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_atbash_rejects_noise() {
        let noise = "QXZJKWVPQXZJKWVPQXZJKWVP";
        let cleaned = clean_letters(noise);
        let pack = english_pack();
        assert!(crack_atbash(&ctx(noise, &cleaned, &pack)).unwrap().is_none());
    }

    #[test]
    fn test_autokey_recovers_primer_secret() {
        let plaintext = "THE MESSAGE WILL REACH THE GENERAL BEFORE THE ARMY MOVES NORTH";
        let ciphertext = CipherKind::Autokey {
            key: "SECRET".to_string(),
        }
        .encode(plaintext)
        .unwrap();
        let cleaned = clean_letters(&ciphertext);
        let pack = english_pack();
        let result = crack_autokey(&ctx(&ciphertext, &cleaned, &pack))
            .unwrap()
            .unwrap();
        assert_eq!(result.key.as_deref(), Some("SECRET"));
        assert_eq!(result.plaintext, plaintext);
    }

    #[test]
    fn test_polybius_decodes_digit_pairs() {
        let encoded = CipherKind::Polybius
            .encode("THE WIND BLEW SOFTLY THROUGH THE TALL TREES")
            .unwrap();
        let cleaned = clean_letters(&encoded);
        let pack = english_pack();
        let result = crack_polybius(&ctx(&encoded, &cleaned, &pack))
            .unwrap()
            .unwrap();
        assert_eq!(
            result.plaintext,
            "THEWINDBLEWSOFTLYTHROUGHTHETALLTREES"
        );
    }

    #[test]
    fn test_polybius_ignores_plain_text() {
        let text = "JUST AN ORDINARY SENTENCE";
        let cleaned = clean_letters(text);
        let pack = english_pack();
        assert!(crack_polybius(&ctx(text, &cleaned, &pack)).unwrap().is_none());
    }

    #[test]
    fn test_baconian_decodes_groups() {
        let encoded = CipherKind::Baconian
            .encode("THE NIGHT WATCHMAN MADE HIS ROUNDS")
            .unwrap();
        let cleaned = clean_letters(&encoded);
        let pack = english_pack();
        let result = crack_baconian(&ctx(&encoded, &cleaned, &pack))
            .unwrap()
            .unwrap();
        assert_eq!(clean_letters(&result.plaintext), "THENIGHTWATCHMANMADEHISROUNDS");
    }
}
