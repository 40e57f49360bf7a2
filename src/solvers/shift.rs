//! Brute-force shift attacks.
//!
//! The Caesar sweep tries all 26 rotations of the letter domain; ROT47
//! covers the 94 rotations of printable ASCII. Both stop early on strong
//! dictionary evidence — word coverage at or above 0.70 is treated as
//! solved, which keeps the common case at a handful of decryptions.

use log::{debug, trace};
use rayon::prelude::*;

use crate::ciphers::CipherKind;
use crate::errors::EngineError;
use crate::scoring::{self, EARLY_STOP_COVERAGE};
use crate::solvers::{evaluate, result_from_layout, SolveContext, StrategyResult};

/// Coverage at which the ROT47 sweep commits to a language.
const ROT47_COVERAGE_ACCEPT: f64 = 0.50;
/// Confidence at which the ROT47 sweep commits to a language.
const ROT47_CONFIDENCE_ACCEPT: f64 = 0.80;

/// Try all 26 Caesar shifts and keep the best combined score.
pub fn crack_caesar(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    if ctx.cleaned.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(f64, StrategyResult)> = None;
    for shift in 0..26u8 {
        let candidate = CipherKind::Caesar { shift }.decode(ctx.original)?;
        let eval = evaluate(&candidate, ctx.pack);

        if eval.coverage.is_some_and(|c| c >= EARLY_STOP_COVERAGE) {
            debug!(
                "caesar shift {} reached coverage {:.2}, stopping early",
                shift,
                eval.coverage.unwrap_or(0.0)
            );
            return Ok(Some(result_from_layout(
                "caesar-shift",
                Some(shift.to_string()),
                candidate,
                &eval,
            )));
        }

        let combined = scoring::combined_score(eval.raw_score, eval.coverage.unwrap_or(0.0));
        trace!("caesar shift {}: combined {:.2}", shift, combined);
        if best.as_ref().is_none_or(|(b, _)| combined > *b) {
            best = Some((
                combined,
                result_from_layout(
                    "caesar-shift",
                    Some(shift.to_string()),
                    candidate,
                    &eval,
                ),
            ));
        }
    }
    Ok(best.map(|(_, result)| result))
}

/// Try all 94 ROT47 shifts for each candidate language.
///
/// The per-language sweep runs in parallel and reduces deterministically
/// (best combined score, ties to the lowest shift). The first language
/// whose best shift clears the acceptance bar wins outright; otherwise
/// the best candidate across every language is reported.
pub fn crack_rot47(ctx: &SolveContext) -> Result<Option<StrategyResult>, EngineError> {
    let fallback = std::slice::from_ref(ctx.pack);
    let packs = if ctx.language_candidates.is_empty() {
        fallback
    } else {
        ctx.language_candidates
    };

    let mut global_best: Option<(f64, StrategyResult)> = None;
    for pack in packs {
        if ctx.out_of_time() {
            break;
        }
        let swept: Vec<(f64, u8, String, crate::solvers::Evaluation)> = (1i32..94)
            .into_par_iter()
            .filter_map(|shift| {
                let shift = shift as u8;
                let candidate = CipherKind::Rot47 { shift }.decode(ctx.original).ok()?;
                let eval = evaluate(&candidate, pack);
                let combined =
                    scoring::combined_score(eval.raw_score, eval.coverage.unwrap_or(0.0));
                Some((combined, shift, candidate, eval))
            })
            .collect();

        let best = swept.into_iter().max_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                // On equal scores prefer the lower shift, deterministically.
                .then(b.1.cmp(&a.1))
        });

        let Some((combined, shift, candidate, eval)) = best else {
            continue;
        };
        trace!(
            "rot47 best for {}: shift {} combined {:.2}",
            pack.language,
            shift,
            combined
        );

        let mut result = result_from_layout("rot47", Some(shift.to_string()), candidate, &eval);
        result.language = Some(pack.language);

        if eval.coverage.unwrap_or(0.0) > ROT47_COVERAGE_ACCEPT
            || eval.confidence > ROT47_CONFIDENCE_ACCEPT
        {
            debug!(
                "rot47 accepted in {} at shift {} (coverage {:?})",
                pack.language, shift, eval.coverage
            );
            return Ok(Some(result));
        }
        if global_best.as_ref().is_none_or(|(b, _)| combined > *b) {
            global_best = Some((combined, result));
        }
    }
    Ok(global_best.map(|(_, result)| result))
}
