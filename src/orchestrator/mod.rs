//! The attack orchestrator.
//!
//! Drives the whole pipeline: language candidates, one classification to
//! pick the strategy portfolio, then a nested loop over (language,
//! strategy) pairs under a soft time budget. Individual strategy
//! failures are reported on the event stream and never abort the
//! portfolio; the caller always gets a [`FinalResult`], even if it is the
//! `method = "none"` sentinel.

/// Status events and sinks for the streaming surface.
pub mod events;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::analysis::classifier::{
    self, count_polybius_pairs, max_two_symbol_run, CipherFamily, Classification,
};
use crate::analysis::language::{detect_language, TOP_CANDIDATES};
use crate::config::{LanguageChoice, Options};
use crate::resources::{Dictionary, Language, Resources};
use crate::scoring::Score;
use crate::solvers::{
    LangPack, SearchMode, SolveContext, SolverProgress, Strategy, StrategyResult,
};
use events::{ChannelSink, EventSink, Stage, StatusEvent};

/// Inner early exit: stop everything once a strategy result is this good.
const INNER_EXIT_CONFIDENCE: f64 = 0.85;
/// Inner early exit coverage requirement.
const INNER_EXIT_COVERAGE: f64 = 0.50;
/// Outer early exit: stop trying further languages once the best result
/// is this good.
const OUTER_EXIT_CONFIDENCE: f64 = 0.80;
/// Outer early exit coverage requirement.
const OUTER_EXIT_COVERAGE: f64 = 0.40;

/// Dictionary evidence attached to a final result.
#[derive(Debug, Clone)]
pub struct DictionaryValidation {
    /// Language whose dictionary was consulted.
    pub language: Language,
    /// Words of three letters or more that were checked.
    pub words_total: usize,
    /// How many of them the dictionary knew.
    pub words_valid: usize,
    /// `words_valid / words_total`.
    pub word_coverage: f64,
    /// Coverage damped when there were almost no words to check.
    pub confidence: f64,
}

/// What an `auto_decrypt` call hands back.
#[derive(Debug, Clone)]
pub struct FinalResult {
    /// Recovered plaintext; empty for the failure sentinel.
    pub plaintext: String,
    /// Method tag of the winning strategy, or `none`.
    pub method: String,
    /// Recovered key, when the method has one.
    pub key: Option<String>,
    /// Raw quadgram score of the plaintext.
    pub raw_score: f64,
    /// Winning strategy's confidence in [0, 1].
    pub confidence: f64,
    /// Word coverage observed by the winning strategy.
    pub word_coverage: Option<f64>,
    /// Classifier's top family tag.
    pub cipher_type: String,
    /// Classifier's confidence in that family.
    pub detection_confidence: f64,
    /// Language the result was scored against.
    pub language: Option<Language>,
    /// `confidence + 0.5·coverage + 0.3·dict_confidence`.
    pub combined_score: f64,
    /// Final dictionary validation, when a dictionary was available.
    pub dictionary_validation: Option<DictionaryValidation>,
    /// Dominant failure cause, when the engine could not decrypt.
    pub error: Option<String>,
}

impl FinalResult {
    /// Did the engine actually produce a plaintext?
    pub fn succeeded(&self) -> bool {
        self.method != "none"
    }

    /// The failure sentinel.
    fn sentinel(cipher_type: &str, detection_confidence: f64, error: &str) -> FinalResult {
        FinalResult {
            plaintext: String::new(),
            method: "none".to_string(),
            key: None,
            raw_score: 0.0,
            confidence: 0.0,
            word_coverage: None,
            cipher_type: cipher_type.to_string(),
            detection_confidence,
            language: None,
            combined_score: 0.0,
            dictionary_validation: None,
            error: Some(error.to_string()),
        }
    }
}

/// Emit the terminal `failed` event with its sentinel attached and
/// return the sentinel.
fn fail(
    sink: &mut dyn EventSink,
    cipher_type: &str,
    detection_confidence: f64,
    cause: &str,
) -> FinalResult {
    let sentinel = FinalResult::sentinel(cipher_type, detection_confidence, cause);
    sink.emit(StatusEvent {
        stage: Stage::Failed,
        message: cause.to_string(),
        progress: 100.0,
        language: None,
        strategy: None,
        result: Some(Box::new(sentinel.clone())),
    });
    sentinel
}

/// Check a plaintext against one language's dictionary.
fn validate_against_dictionary(
    plaintext: &str,
    language: Language,
    dictionary: &Dictionary,
) -> DictionaryValidation {
    let mut words_total = 0usize;
    let mut words_valid = 0usize;
    for word in plaintext.split(|c: char| !c.is_ascii_alphabetic()) {
        if word.len() < 3 {
            continue;
        }
        words_total += 1;
        if dictionary.contains(word) {
            words_valid += 1;
        }
    }
    let coverage = if words_total == 0 {
        0.0
    } else {
        words_valid as f64 / words_total as f64
    };
    DictionaryValidation {
        language,
        words_total,
        words_valid,
        word_coverage: coverage,
        // A couple of lucky hits in a two-word text should not read as
        // proof, so the confidence ramps in with the sample size.
        confidence: coverage * (words_total.min(5) as f64 / 5.0),
    }
}

/// Strategy portfolio for a classified family.
fn strategies_for(family: &CipherFamily, text: &str) -> Vec<Strategy> {
    let has_nonletter_ascii = text
        .chars()
        .any(|c| ('!'..='~').contains(&c) && !c.is_ascii_alphabetic());
    let polybius_hint = count_polybius_pairs(text) >= 5;
    let baconian_hint = max_two_symbol_run(text) >= 5;

    let mut strategies = Vec::new();
    match family {
        CipherFamily::CaesarShift => {
            strategies.push(Strategy::Atbash);
            if has_nonletter_ascii {
                strategies.push(Strategy::Rot47Brute);
            }
            strategies.push(Strategy::CaesarBrute);
        }
        CipherFamily::VigenereLike {
            suggested_key_length,
        } => {
            strategies.push(Strategy::Vigenere {
                suggested_key_length: *suggested_key_length,
            });
            strategies.push(Strategy::Autokey);
            strategies.push(Strategy::Polyalphabetic);
            strategies.push(Strategy::Substitution {
                mode: SearchMode::HillClimb,
            });
            strategies.push(Strategy::CaesarBrute);
        }
        CipherFamily::MonoalphabeticSubstitution => {
            strategies.push(Strategy::Atbash);
            if polybius_hint {
                strategies.push(Strategy::Polybius);
            }
            if baconian_hint {
                strategies.push(Strategy::Baconian);
            }
            strategies.push(Strategy::CaesarBrute);
            if has_nonletter_ascii {
                strategies.push(Strategy::Rot47Brute);
            }
            strategies.push(Strategy::Substitution {
                mode: SearchMode::HillClimb,
            });
            strategies.push(Strategy::Substitution {
                mode: SearchMode::Annealing,
            });
        }
        // No transposition recovery is implemented; the permutation
        // search is the only strategy with a chance here.
        CipherFamily::Transposition => {
            strategies.push(Strategy::Substitution {
                mode: SearchMode::HillClimb,
            });
        }
        CipherFamily::RandomOrUnknown => {
            strategies.push(Strategy::Atbash);
            if polybius_hint {
                strategies.push(Strategy::Polybius);
            }
            if baconian_hint {
                strategies.push(Strategy::Baconian);
            }
            strategies.push(Strategy::CaesarBrute);
            strategies.push(Strategy::Autokey);
            strategies.push(Strategy::Substitution {
                mode: SearchMode::HillClimb,
            });
        }
        CipherFamily::Unknown { .. } => {}
    }
    strategies
}

/// Assemble a [`FinalResult`] from a strategy result and its validation.
fn finalize(
    strategy_result: StrategyResult,
    language: Language,
    classification: &Classification,
    validation: Option<DictionaryValidation>,
    combined_score: f64,
) -> FinalResult {
    FinalResult {
        plaintext: strategy_result.plaintext,
        method: strategy_result.method,
        key: strategy_result.key,
        raw_score: strategy_result.raw_score,
        confidence: strategy_result.confidence,
        word_coverage: strategy_result.word_coverage,
        cipher_type: classification.top().family.tag().to_string(),
        detection_confidence: classification.top().confidence,
        language: Some(language),
        combined_score,
        dictionary_validation: validation,
        error: None,
    }
}

/// Run the full pipeline, narrating through `sink`.
pub(crate) fn run(
    resources: &Arc<Resources>,
    text: &str,
    opts: &Options,
    sink: &mut dyn EventSink,
) -> FinalResult {
    if text.trim().is_empty() {
        return fail(sink, "unknown", 0.0, "input is empty");
    }

    let cleaned = crate::textnorm::clean_letters(text);

    // Step A: language candidates.
    let ranked: Vec<Language> = match opts.language {
        LanguageChoice::Fixed(language) => {
            vec![language]
        }
        LanguageChoice::Auto => {
            sink.emit(StatusEvent::new(
                Stage::LanguageDetection,
                "ranking candidate languages",
                2.0,
            ));
            let ranked = detect_language(text, resources);
            if let Some(top) = ranked.first() {
                sink.emit(
                    StatusEvent::new(
                        Stage::LanguageDetected,
                        format!("best language candidate: {}", top.language),
                        5.0,
                    )
                    .with_language(top.language),
                );
            }
            ranked.into_iter().map(|c| c.language).collect()
        }
    };
    if ranked.is_empty() {
        return fail(sink, "unknown", 0.0, "no language models loaded");
    }

    let build_pack = |language: Language| -> Option<LangPack> {
        Some(LangPack {
            language,
            model: resources.model(language)?,
            dictionary: if opts.use_dictionary {
                resources.dictionary(language)
            } else {
                None
            },
        })
    };
    // The full ranking feeds the ROT47 sweep; the portfolio loop uses the
    // top candidates only.
    let all_packs: Vec<LangPack> = ranked.iter().filter_map(|&l| build_pack(l)).collect();
    if all_packs.is_empty() {
        return fail(sink, "unknown", 0.0, "no language models loaded");
    }
    let portfolio_count = if opts.try_multiple {
        TOP_CANDIDATES.min(all_packs.len())
    } else {
        1
    };
    let packs = &all_packs[..portfolio_count];
    // The ROT47 sweep walks language candidates itself, so it gets the
    // full ranking when multiple languages are in play — its surviving
    // letters skew the shape score, so the true language often ranks
    // below the portfolio cut. Disabling try_multiple restricts the
    // sweep to the same single language as the rest of the portfolio.
    let sweep_packs: &[LangPack] = if opts.try_multiple { &all_packs } else { packs };

    // Step B: one classification to choose the portfolio.
    sink.emit(StatusEvent::new(
        Stage::CipherDetection,
        "classifying cipher family",
        8.0,
    ));
    let classification = classifier::classify(text, packs[0].dictionary.as_deref());
    let top = classification.top().clone();
    sink.emit(StatusEvent::new(
        Stage::CipherDetected,
        format!(
            "most likely family: {} ({:.0}%)",
            top.family.tag(),
            top.confidence * 100.0
        ),
        12.0,
    ));

    if let CipherFamily::Unknown { reason } = &top.family {
        return fail(sink, "unknown", top.confidence, reason);
    }

    // Step C: strategy selection.
    let strategies = strategies_for(&top.family, text);
    sink.emit(StatusEvent::new(
        Stage::StrategiesSelected,
        format!(
            "selected {} strategies: {}",
            strategies.len(),
            strategies
                .iter()
                .map(Strategy::name)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        15.0,
    ));

    // Step D: the (language, strategy) execution loop.
    let deadline = Instant::now() + Duration::from_millis(opts.max_time_ms);
    let total_cells = (packs.len() * strategies.len()).max(1) as f64;
    let cell_progress =
        |cell: usize, frac: f64| 15.0 + (cell as f64 + frac.clamp(0.0, 1.0)) / total_cells * 80.0;

    // NaN-proof, first-wins ordering: a later result must strictly beat
    // the incumbent's combined score to replace it.
    let mut best: Option<(Score, FinalResult)> = None;
    let mut timed_out = false;

    'languages: for (lang_idx, pack) in packs.iter().enumerate() {
        sink.emit(
            StatusEvent::new(
                Stage::TryingLanguage,
                format!("trying language {}", pack.language),
                cell_progress(lang_idx * strategies.len(), 0.0),
            )
            .with_language(pack.language),
        );

        for (strat_idx, strategy) in strategies.iter().enumerate() {
            let cell = lang_idx * strategies.len() + strat_idx;
            if Instant::now() >= deadline {
                debug!("time budget exhausted, stopping the portfolio");
                timed_out = true;
                break 'languages;
            }
            sink.emit(
                StatusEvent::new(
                    Stage::TryingStrategy,
                    format!("running {}", strategy.name()),
                    cell_progress(cell, 0.0),
                )
                .with_language(pack.language)
                .with_strategy(strategy.name()),
            );

            let ctx = SolveContext {
                original: text,
                cleaned: &cleaned,
                pack,
                language_candidates: sweep_packs,
                deadline: Some(deadline),
                seed: 0xC1A0_5EED ^ (cell as u64),
            };
            let mut solving_sink = |p: SolverProgress| {
                let frac = p.iteration as f64 / p.total.max(1) as f64;
                sink.emit(
                    StatusEvent::new(
                        Stage::Solving,
                        format!("iteration {}/{}", p.iteration, p.total),
                        cell_progress(cell, frac),
                    )
                    .with_strategy(strategy.name()),
                );
            };

            match strategy.execute(&ctx, &mut solving_sink) {
                Ok(Some(result)) => {
                    let language = result.language.unwrap_or(pack.language);
                    let validation = if opts.use_dictionary {
                        resources.dictionary(language).map(|dict| {
                            validate_against_dictionary(&result.plaintext, language, &dict)
                        })
                    } else {
                        None
                    };
                    let coverage = validation
                        .as_ref()
                        .map(|v| v.word_coverage)
                        .or(result.word_coverage)
                        .unwrap_or(0.0);
                    let dict_conf = validation.as_ref().map(|v| v.confidence).unwrap_or(0.0);
                    let combined = result.confidence + 0.5 * coverage + 0.3 * dict_conf;

                    sink.emit(
                        StatusEvent::new(
                            Stage::StrategyComplete,
                            format!(
                                "{} produced a candidate (confidence {:.2})",
                                strategy.name(),
                                result.confidence
                            ),
                            cell_progress(cell, 1.0),
                        )
                        .with_language(language)
                        .with_strategy(strategy.name()),
                    );

                    let exits_inner =
                        result.confidence > INNER_EXIT_CONFIDENCE && coverage > INNER_EXIT_COVERAGE;
                    let final_result =
                        finalize(result, language, &classification, validation, combined);
                    if best.as_ref().is_none_or(|(b, _)| Score(combined) > *b) {
                        best = Some((Score(combined), final_result));
                    }

                    if exits_inner {
                        sink.emit(StatusEvent::new(
                            Stage::EarlyStop,
                            "confident result found, stopping",
                            cell_progress(cell, 1.0),
                        ));
                        break 'languages;
                    }
                }
                Ok(None) => {
                    sink.emit(
                        StatusEvent::new(
                            Stage::StrategyFailed,
                            format!("{} found no candidate", strategy.name()),
                            cell_progress(cell, 1.0),
                        )
                        .with_language(pack.language)
                        .with_strategy(strategy.name()),
                    );
                }
                Err(e) => {
                    warn!("strategy {} failed: {}", strategy.name(), e);
                    sink.emit(
                        StatusEvent::new(
                            Stage::StrategyFailed,
                            format!("{} failed: {}", strategy.name(), e),
                            cell_progress(cell, 1.0),
                        )
                        .with_language(pack.language)
                        .with_strategy(strategy.name()),
                    );
                }
            }
        }

        if let Some((_, result)) = &best {
            if result.confidence > OUTER_EXIT_CONFIDENCE
                && result.word_coverage.unwrap_or(0.0) > OUTER_EXIT_COVERAGE
            {
                sink.emit(StatusEvent::new(
                    Stage::EarlyStop,
                    "good result found, skipping remaining languages",
                    cell_progress((lang_idx + 1) * strategies.len(), 0.0),
                ));
                break 'languages;
            }
        }
        sink.emit(
            StatusEvent::new(
                Stage::LanguageComplete,
                format!("finished language {}", pack.language),
                cell_progress((lang_idx + 1) * strategies.len(), 0.0),
            )
            .with_language(pack.language),
        );
    }

    // Step E: aggregation.
    match best {
        Some((_, result)) => {
            sink.emit(StatusEvent {
                stage: Stage::Complete,
                message: format!("decrypted with {}", result.method),
                progress: 100.0,
                language: result.language,
                strategy: None,
                result: Some(Box::new(result.clone())),
            });
            result
        }
        None => {
            let cause = if timed_out {
                "time budget exceeded"
            } else {
                "no successful decryption"
            };
            fail(sink, top.family.tag(), top.confidence, cause)
        }
    }
}

/// Spawn the pipeline on a worker thread and hand back its event stream.
pub(crate) fn run_streaming(
    resources: Arc<Resources>,
    text: String,
    opts: Options,
) -> impl Iterator<Item = StatusEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut sink = ChannelSink::new(tx);
        let _ = run(&resources, &text, &opts, &mut sink);
    });
    rx.into_iter()
}
