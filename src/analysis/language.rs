//! Language detection on (possibly enciphered) text.
//!
//! Two stages. A script gate first narrows the candidate models by
//! counting Latin, Cyrillic and CJK characters; then the surviving models
//! are ranked by a weighted shape score, which compares sorted frequency
//! vectors and therefore keeps working when the text is hidden behind a
//! monoalphabetic substitution.
//!
//! The shape stage measures n-grams over a model-consumable form of the
//! input: Cyrillic text is romanized first, because the Russian tables
//! are built over that same ASCII transliteration. CJK ideographs carry
//! no per-letter statistics any of the models can consume, so for them
//! the gate's routing to the pinyin model is the whole signal; romanized
//! Chinese input ranks through the shape stage like any Latin text.

use std::borrow::Cow;

use log::{debug, trace};

use crate::analysis::{ngram_percentages, shape_score};
use crate::resources::{Language, Resources, Script};
use crate::textnorm::transliterate_cyrillic;

/// A language candidate with its weighted shape score (lower is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LangCandidate {
    /// The candidate language.
    pub language: Language,
    /// Weighted shape score across n-gram orders 1-4.
    pub shape_score: f64,
}

/// How many candidates the engine forwards to the attack portfolio.
pub const TOP_CANDIDATES: usize = 5;

/// Rank every available language model against `text`, best first.
pub fn detect_language(text: &str, resources: &Resources) -> Vec<LangCandidate> {
    let available = resources.languages();
    let script = dominant_script(text);

    let candidates: Vec<Language> = match script {
        Some(Script::Cyrillic) => available
            .into_iter()
            .filter(|l| l.script() == Script::Cyrillic)
            .collect(),
        Some(Script::Cjk) => available
            .into_iter()
            .filter(|l| l.script() == Script::Cjk)
            .collect(),
        // Romanized models stay in play for Latin text, so only the
        // Cyrillic-script model is gated out.
        Some(Script::Latin) => available
            .into_iter()
            .filter(|l| l.script() != Script::Cyrillic)
            .collect(),
        None => available,
    };

    let scored_text: Cow<'_, str> = if script == Some(Script::Cyrillic) {
        Cow::Owned(transliterate_cyrillic(text))
    } else {
        Cow::Borrowed(text)
    };

    let observed: Vec<Vec<f64>> = (1..=4)
        .map(|n| ngram_percentages(&scored_text, n).into_values().collect())
        .collect();

    let mut ranked: Vec<LangCandidate> = candidates
        .into_iter()
        .filter_map(|language| resources.model(language))
        .map(|model| {
            let scores: Vec<f64> = (1..=4)
                .map(|n| shape_score(&observed[n - 1], model.sorted_percentages(n)))
                .collect();
            let weighted =
                (scores[0] + 2.0 * scores[1] + 2.0 * scores[2] + scores[3]) / 6.0;
            trace!("shape score for {}: {:.3}", model.language, weighted);
            LangCandidate {
                language: model.language,
                shape_score: weighted,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.shape_score
            .partial_cmp(&b.shape_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(
        "language ranking: {:?}",
        ranked
            .iter()
            .map(|c| (c.language, c.shape_score))
            .collect::<Vec<_>>()
    );
    ranked
}

/// The script class covering more than half of the non-space characters
/// of `text`, if any.
fn dominant_script(text: &str) -> Option<Script> {
    let mut latin = 0usize;
    let mut cyrillic = 0usize;
    let mut cjk = 0usize;
    let mut total = 0usize;

    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c) {
            latin += 1;
        } else if ('\u{0400}'..='\u{04FF}').contains(&c) {
            cyrillic += 1;
        } else if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
            cjk += 1;
        }
    }

    if total == 0 {
        return None;
    }
    let half = total / 2;
    if cyrillic > half {
        Some(Script::Cyrillic)
    } else if cjk > half {
        Some(Script::Cjk)
    } else if latin > half {
        Some(Script::Latin)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resources;

    fn resources() -> Resources {
        Resources::from_embedded().unwrap()
    }

    #[test]
    fn test_detects_english_plaintext() {
        let text = "The quick brown fox jumps over the lazy dog and then the dog \
                    chases the fox through the forest until both of them are tired";
        let ranked = detect_language(text, &resources());
        assert!(!ranked.is_empty());
        assert_eq!(ranked[0].language, Language::English);
    }

    #[test]
    fn test_scores_are_ascending() {
        let ranked = detect_language("HELLO WORLD THIS IS A TEST MESSAGE", &resources());
        for pair in ranked.windows(2) {
            assert!(pair[0].shape_score <= pair[1].shape_score);
        }
    }

    #[test]
    fn test_detection_survives_substitution() {
        // Caesar shift keeps the frequency shape, so the ranking should
        // still put English near the front.
        let text = "WKH TXLFN EURZQ IRA MXPSV RYHU WKH ODCB GRJ DQG WKHQ WKH GRJ \
                    FKDVHV WKH IRA WKURXJK WKH IRUHVW XQWLO ERWK RI WKHP DUH WLUHG";
        let ranked = detect_language(text, &resources());
        let position = ranked
            .iter()
            .position(|c| c.language == Language::English)
            .unwrap();
        assert!(position < TOP_CANDIDATES, "english ranked {}", position);
    }

    #[test]
    fn test_cyrillic_gate_restricts_to_russian() {
        let ranked = detect_language("ПРИВЕТ МИР КАК ДЕЛА СЕГОДНЯ", &resources());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].language, Language::Russian);
        assert!(ranked[0].shape_score.is_finite());
    }

    #[test]
    fn test_cyrillic_shape_score_reflects_content() {
        // The score must come from the romanized input, not collapse to
        // a constant once the non-ASCII letters are stripped: ordinary
        // Russian words should fit the model far better than a wall of
        // repeated rare letters.
        let resources = resources();
        let prose = detect_language(
            "ПРИВЕТ МИР КАК ДЕЛА СЕГОДНЯ ВЕЧЕРОМ МЫ ИДЕМ ДОМОЙ",
            &resources,
        );
        let junk = detect_language("ШШШШШ ЩЩЩЩЩ ЖЖЖЖЖ ЦЦЦЦЦ ШШШШШ", &resources);
        assert_ne!(prose[0].shape_score, junk[0].shape_score);
        assert!(prose[0].shape_score < junk[0].shape_score);
    }

    #[test]
    fn test_latin_gate_excludes_russian() {
        let ranked = detect_language("PLAIN LATIN TEXT ONLY HERE", &resources());
        assert!(ranked.iter().all(|c| c.language != Language::Russian));
    }
}
