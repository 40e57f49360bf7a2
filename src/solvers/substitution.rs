//! Heuristic search over monoalphabetic keys.
//!
//! The state is a decryption map (cipher letter → plain letter) and the
//! objective is the quadgram log-likelihood of the decryption. Hill
//! climbing sweeps every one of the 325 possible swaps and accepts only
//! strict improvements; simulated annealing walks random swaps under a
//! geometric temperature schedule and keeps the global best it ever saw.
//!
//! The first restart warms up from frequency order — mapping the most
//! common ciphertext letter to the language's most common letter and so
//! on — which on ordinary prose usually lands within a few swaps of the
//! answer. Further restarts begin from random permutations.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::errors::EngineError;
use crate::resources::LanguageModel;
use crate::scoring;
use crate::solvers::{result_from_cleaned, ProgressFn, SolveContext, SolverProgress, StrategyResult};

/// Which search drives the permutation walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Strict-improvement swap sweeps.
    HillClimb,
    /// Metropolis acceptance under a cooling schedule.
    Annealing,
}

/// Objective evaluations allowed per hill-climb restart.
const HILL_CLIMB_MAX_EVALS: usize = 5_000;
/// Hill-climb restarts (the first is the frequency warm start).
const HILL_CLIMB_RESTARTS: usize = 2;
/// Simulated-annealing iterations.
const ANNEALING_ITERATIONS: usize = 20_000;
/// Initial annealing temperature.
const ANNEALING_T0: f64 = 10.0;
/// Final annealing temperature.
const ANNEALING_T_MIN: f64 = 0.1;
/// Fewest letters worth running a statistical key search on.
const MIN_LETTERS: usize = 30;

/// Attack a monoalphabetic substitution with the chosen search.
pub fn crack_substitution(
    ctx: &SolveContext,
    mode: SearchMode,
    progress: ProgressFn,
) -> Result<Option<StrategyResult>, EngineError> {
    if ctx.cleaned.len() < MIN_LETTERS {
        trace!(
            "substitution search skipped: {} letters is below the minimum {}",
            ctx.cleaned.len(),
            MIN_LETTERS
        );
        return Ok(None);
    }

    let (key, score) = match mode {
        SearchMode::HillClimb => hill_climb_search(ctx, progress),
        SearchMode::Annealing => annealing_search(ctx, progress),
    };
    debug!("substitution {:?} finished with score {:.2}", mode, score);

    let plaintext = apply_key(ctx.cleaned, &key);
    let key_string: String = key.iter().map(|&p| (p + b'A') as char).collect();
    let method = match mode {
        SearchMode::HillClimb => "substitution-hill-climb",
        SearchMode::Annealing => "substitution-annealing",
    };
    Ok(Some(result_from_cleaned(
        ctx,
        method,
        Some(key_string),
        &plaintext,
    )))
}

/// Decrypt cleaned text through a cipher→plain map.
fn apply_key(cleaned: &str, key: &[u8; 26]) -> String {
    cleaned
        .bytes()
        .map(|b| (key[(b - b'A') as usize] + b'A') as char)
        .collect()
}

/// Quadgram objective for a candidate key.
fn objective(cleaned: &str, key: &[u8; 26], model: &LanguageModel) -> f64 {
    scoring::quadgram_score(&apply_key(cleaned, key), model)
}

/// Warm-start key: ciphertext letters by observed frequency mapped onto
/// the language's letters by expected frequency.
fn frequency_key(cleaned: &str, model: &LanguageModel) -> [u8; 26] {
    let counts = crate::analysis::letter_counts(cleaned);
    let mut cipher_order: Vec<usize> = (0..26).collect();
    cipher_order.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));

    let mut key = [0u8; 26];
    for (rank, &cipher_idx) in cipher_order.iter().enumerate() {
        key[cipher_idx] = model.frequency_order()[rank] as u8 - b'A';
    }
    key
}

/// A uniformly random permutation key.
fn random_key(rng: &mut StdRng) -> [u8; 26] {
    let mut key: [u8; 26] = std::array::from_fn(|i| i as u8);
    key.shuffle(rng);
    key
}

/// Restart loop around strict-improvement swap sweeps.
fn hill_climb_search(ctx: &SolveContext, progress: ProgressFn) -> ([u8; 26], f64) {
    let model = ctx.model();
    let total = HILL_CLIMB_MAX_EVALS * HILL_CLIMB_RESTARTS;
    let emit_every = (total / 50).max(1);
    let mut rng = StdRng::seed_from_u64(ctx.seed);

    let mut best_key = frequency_key(ctx.cleaned, model);
    let mut best_score = f64::MIN;

    for restart in 0..HILL_CLIMB_RESTARTS {
        let mut key = if restart == 0 {
            frequency_key(ctx.cleaned, model)
        } else {
            random_key(&mut rng)
        };
        let mut score = objective(ctx.cleaned, &key, model);
        let mut evals = 0usize;
        let mut improved = true;

        'restart: while improved && evals < HILL_CLIMB_MAX_EVALS {
            improved = false;
            for i in 0..25 {
                for j in (i + 1)..26 {
                    key.swap(i, j);
                    let candidate = objective(ctx.cleaned, &key, model);
                    evals += 1;
                    if candidate > score {
                        score = candidate;
                        improved = true;
                    } else {
                        key.swap(i, j);
                    }
                    let global_iteration = restart * HILL_CLIMB_MAX_EVALS + evals;
                    if global_iteration % emit_every == 0 {
                        progress(SolverProgress {
                            iteration: global_iteration,
                            total,
                            current_plaintext: apply_key(ctx.cleaned, &key),
                            current_score: score,
                        });
                    }
                    if evals >= HILL_CLIMB_MAX_EVALS || ctx.out_of_time() {
                        break 'restart;
                    }
                }
            }
        }

        trace!(
            "hill climb restart {}: score {:.2} after {} evaluations",
            restart,
            score,
            evals
        );
        if score > best_score {
            best_score = score;
            best_key = key;
        }
        if ctx.out_of_time() {
            break;
        }
    }
    (best_key, best_score)
}

/// Metropolis walk under a geometric cooling schedule, tracking the
/// global best rather than the final state.
fn annealing_search(ctx: &SolveContext, progress: ProgressFn) -> ([u8; 26], f64) {
    let model = ctx.model();
    let total = ANNEALING_ITERATIONS;
    let emit_every = (total / 50).max(1);
    let mut rng = StdRng::seed_from_u64(ctx.seed);

    let mut key = frequency_key(ctx.cleaned, model);
    let mut current = objective(ctx.cleaned, &key, model);
    let mut best_key = key;
    let mut best_score = current;

    let decay = ANNEALING_T_MIN / ANNEALING_T0;
    for iteration in 0..total {
        let temperature = ANNEALING_T0 * decay.powf(iteration as f64 / total as f64);
        let i = rng.random_range(0..26usize);
        let j = rng.random_range(0..26usize);
        if i == j {
            continue;
        }

        key.swap(i, j);
        let candidate = objective(ctx.cleaned, &key, model);
        let delta = candidate - current;
        if delta > 0.0 || rng.random::<f64>() < acceptance(delta, temperature) {
            current = candidate;
            if candidate > best_score {
                best_score = candidate;
                best_key = key;
            }
        } else {
            key.swap(i, j);
        }

        if iteration % emit_every == 0 {
            progress(SolverProgress {
                iteration,
                total,
                current_plaintext: apply_key(ctx.cleaned, &best_key),
                current_score: best_score,
            });
            if ctx.out_of_time() {
                break;
            }
        }
    }
    (best_key, best_score)
}

/// Metropolis acceptance probability for a worsening move, with the
/// exponent clamped so extreme deltas cannot overflow.
fn acceptance(delta: f64, temperature: f64) -> f64 {
    if temperature <= 0.0 {
        return 0.0;
    }
    let exponent = delta / temperature;
    if exponent < -50.0 {
        0.0
    } else {
        exponent.exp()
    }
}
