//! The attack portfolio.
//!
//! Each strategy is a tagged variant rather than a trait object: the
//! orchestrator builds a `Vec<Strategy>` from the classification and
//! dispatches through [`Strategy::execute`]. Every solver is pure with
//! respect to engine state — it sees one language pack, the shared
//! ciphertext views, a soft deadline and a seed, and returns at most one
//! candidate result.

/// Beaufort, Gronsfeld and Porta key recovery.
pub mod polyalphabetic;
/// Caesar and ROT47 brute-force sweeps.
pub mod shift;
/// Atbash, Autokey, Polybius and Baconian attacks.
pub mod special;
/// Hill climbing and simulated annealing over key permutations.
pub mod substitution;
/// Friedman key-length estimation and per-column key recovery.
pub mod vigenere;

use std::sync::Arc;
use std::time::Instant;

use crate::errors::EngineError;
use crate::resources::{Dictionary, Language, LanguageModel};
use crate::scoring;
use crate::textnorm::match_layout;

pub use substitution::SearchMode;

/// One language's scoring resources, bundled for the solvers.
#[derive(Clone)]
pub struct LangPack {
    /// The language these resources describe.
    pub language: Language,
    /// Frequency model, shared immutably.
    pub model: Arc<LanguageModel>,
    /// Dictionary, if one loaded.
    pub dictionary: Option<Arc<Dictionary>>,
}

/// Everything a solver needs for one attempt.
pub struct SolveContext<'a> {
    /// The ciphertext exactly as the caller supplied it.
    pub original: &'a str,
    /// Cleaned A-Z form of the ciphertext.
    pub cleaned: &'a str,
    /// The language currently in scope.
    pub pack: &'a LangPack,
    /// Ranked language candidates for solvers that sweep languages
    /// internally (the ROT47 brute force).
    pub language_candidates: &'a [LangPack],
    /// Soft deadline; solvers check it at iteration windows.
    pub deadline: Option<Instant>,
    /// Seed for the randomized searches.
    pub seed: u64,
}

impl SolveContext<'_> {
    /// The active language model.
    pub fn model(&self) -> &LanguageModel {
        &self.pack.model
    }

    /// The active dictionary, if loaded.
    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.pack.dictionary.as_deref()
    }

    /// Has the soft deadline passed?
    pub fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// A progress snapshot emitted from inside an iterative solver.
#[derive(Debug, Clone)]
pub struct SolverProgress {
    /// Iterations completed so far.
    pub iteration: usize,
    /// Total iterations planned.
    pub total: usize,
    /// Best decryption at this point.
    pub current_plaintext: String,
    /// Score of that decryption.
    pub current_score: f64,
}

/// Callback type for progress snapshots.
pub type ProgressFn<'a> = &'a mut dyn FnMut(SolverProgress);

/// The outcome of one strategy attempt.
#[derive(Debug, Clone)]
pub struct StrategyResult {
    /// Recovered plaintext with the original layout re-applied.
    pub plaintext: String,
    /// Method tag, e.g. `caesar-shift` or `vigenere`.
    pub method: String,
    /// Recovered key, when the method has one.
    pub key: Option<String>,
    /// Raw quadgram log-likelihood of the cleaned plaintext.
    pub raw_score: f64,
    /// Solver confidence in [0, 1].
    pub confidence: f64,
    /// Dictionary word coverage, when a dictionary was available.
    pub word_coverage: Option<f64>,
    /// Confidence contribution of the dictionary evidence alone.
    pub dict_confidence: Option<f64>,
    /// Set when the solver itself selected the language (ROT47 sweeps all
    /// candidates); `None` means the orchestrator's current language.
    pub language: Option<Language>,
}

/// Scoring evidence for one candidate plaintext.
pub(crate) struct Evaluation {
    /// Quadgram log-likelihood of the cleaned candidate.
    pub raw_score: f64,
    /// Per-quadgram margin above the floor.
    pub margin: f64,
    /// Word coverage, if a dictionary was available.
    pub coverage: Option<f64>,
    /// Confidence derived from coverage and margin.
    pub confidence: f64,
}

/// Score a layout-restored candidate against one language pack.
pub(crate) fn evaluate(candidate: &str, pack: &LangPack) -> Evaluation {
    let cleaned = crate::textnorm::clean_letters(candidate);
    let raw_score = scoring::quadgram_score(&cleaned, &pack.model);
    let margin = scoring::quadgram_margin(&cleaned, &pack.model);
    let coverage = pack
        .dictionary
        .as_deref()
        .map(|dict| scoring::word_coverage(candidate, dict));
    Evaluation {
        raw_score,
        margin,
        coverage,
        confidence: scoring::confidence_from_evidence(coverage, margin),
    }
}

/// Assemble a [`StrategyResult`] from a cleaned plaintext and evidence.
pub(crate) fn result_from_cleaned(
    ctx: &SolveContext,
    method: &str,
    key: Option<String>,
    cleaned_plaintext: &str,
) -> StrategyResult {
    let plaintext = match_layout(ctx.original, cleaned_plaintext);
    let eval = evaluate(&plaintext, ctx.pack);
    StrategyResult {
        plaintext,
        method: method.to_string(),
        key,
        raw_score: eval.raw_score,
        confidence: eval.confidence,
        word_coverage: eval.coverage,
        dict_confidence: eval.coverage.map(dict_confidence),
        language: None,
    }
}

/// Assemble a [`StrategyResult`] from an already layout-preserving
/// plaintext and its evidence.
pub(crate) fn result_from_layout(
    method: &str,
    key: Option<String>,
    plaintext: String,
    eval: &Evaluation,
) -> StrategyResult {
    StrategyResult {
        plaintext,
        method: method.to_string(),
        key,
        raw_score: eval.raw_score,
        confidence: eval.confidence,
        word_coverage: eval.coverage,
        dict_confidence: eval.coverage.map(dict_confidence),
        language: None,
    }
}

/// Dictionary evidence as a confidence term: coverage, discounted when
/// there were barely any words to check.
pub(crate) fn dict_confidence(coverage: f64) -> f64 {
    coverage.clamp(0.0, 1.0)
}

/// A search strategy the orchestrator can schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Apply the Atbash mirror and score it.
    Atbash,
    /// Brute-force all 26 Caesar shifts.
    CaesarBrute,
    /// Brute-force all 94 ROT47 shifts across the language candidates.
    Rot47Brute,
    /// Friedman key-length estimation plus per-column recovery.
    Vigenere {
        /// Key length suggested by the Kasiski examination, if any.
        suggested_key_length: Option<usize>,
    },
    /// Autokey with a small dictionary of primer keys.
    Autokey,
    /// Beaufort, Gronsfeld and Porta key recovery.
    Polyalphabetic,
    /// Decode digit pairs through the Polybius grid.
    Polybius,
    /// Decode five-symbol A/B (or 0/1) groups.
    Baconian,
    /// Heuristic search over the 26! permutation space.
    Substitution {
        /// Hill climbing or simulated annealing.
        mode: SearchMode,
    },
}

impl Strategy {
    /// Stable display name for logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Atbash => "atbash",
            Strategy::CaesarBrute => "caesar-brute-force",
            Strategy::Rot47Brute => "rot47-brute-force",
            Strategy::Vigenere { .. } => "vigenere-friedman",
            Strategy::Autokey => "autokey-dictionary",
            Strategy::Polyalphabetic => "advanced-polyalphabetic",
            Strategy::Polybius => "polybius-square",
            Strategy::Baconian => "baconian",
            Strategy::Substitution {
                mode: SearchMode::HillClimb,
            } => "substitution-hill-climb",
            Strategy::Substitution {
                mode: SearchMode::Annealing,
            } => "substitution-annealing",
        }
    }

    /// Run the strategy. `Ok(None)` means it completed without finding a
    /// plausible plaintext; `Err` is a genuine failure the orchestrator
    /// reports and survives.
    pub fn execute(
        &self,
        ctx: &SolveContext,
        progress: ProgressFn,
    ) -> Result<Option<StrategyResult>, EngineError> {
        match self {
            Strategy::Atbash => special::crack_atbash(ctx),
            Strategy::CaesarBrute => shift::crack_caesar(ctx),
            Strategy::Rot47Brute => shift::crack_rot47(ctx),
            Strategy::Vigenere {
                suggested_key_length,
            } => vigenere::crack_vigenere(ctx, *suggested_key_length),
            Strategy::Autokey => special::crack_autokey(ctx),
            Strategy::Polyalphabetic => polyalphabetic::crack_polyalphabetic(ctx),
            Strategy::Polybius => special::crack_polybius(ctx),
            Strategy::Baconian => special::crack_baconian(ctx),
            Strategy::Substitution { mode } => {
                substitution::crack_substitution(ctx, *mode, progress)
            }
        }
    }
}
