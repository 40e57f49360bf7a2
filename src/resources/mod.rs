//! Language resources: frequency models and dictionaries.
//!
//! Frequency tables and dictionaries ship embedded in the binary and are
//! parsed once at engine construction. Dictionaries additionally honor a
//! small ordered search path on disk so users can drop in bigger word
//! lists without rebuilding; a missing file just means no-dictionary mode
//! for that language.

/// Per-language word sets with case-insensitive membership.
pub mod dictionary;
/// N-gram log-probability tables with an unseen-gram floor.
pub mod ngram;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use include_dir::{include_dir, Dir};
use log::{debug, warn};
use serde::Deserialize;

use crate::errors::EngineError;
pub use dictionary::Dictionary;
pub use ngram::NGramModel;

/// Embedded copy of the `resources/` directory.
static RESOURCE_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/resources");

/// How many sorted percentages per n-gram order feed the shape score.
const SHAPE_TOP_N: usize = 30;

/// Languages the engine ships models for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    /// English
    English,
    /// Spanish
    Spanish,
    /// French
    French,
    /// German
    German,
    /// Italian
    Italian,
    /// Portuguese
    Portuguese,
    /// Russian (ASCII transliteration)
    Russian,
    /// Romanized Mandarin (pinyin)
    ChinesePinyin,
}

/// Script class used by the language-detection gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Latin letters.
    Latin,
    /// Cyrillic letters.
    Cyrillic,
    /// CJK ideographs.
    Cjk,
}

impl Language {
    /// Every supported language, in canonical order.
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
        Language::ChinesePinyin,
    ];

    /// Short ISO-style code, as accepted on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::ChinesePinyin => "zh",
        }
    }

    /// Resource-file stem, e.g. `english` in `english.json`.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::German => "german",
            Language::Italian => "italian",
            Language::Portuguese => "portuguese",
            Language::Russian => "russian",
            Language::ChinesePinyin => "chinese-pinyin",
        }
    }

    /// Parse a language from a code (`en`) or a full name (`english`).
    pub fn from_code(s: &str) -> Option<Language> {
        let s = s.to_ascii_lowercase();
        Language::ALL
            .iter()
            .find(|l| l.code() == s || l.resource_name() == s)
            .copied()
    }

    /// Expected index of coincidence (normalized, k=26) for plaintext in
    /// this language. English sits near 1.73; the Romance languages and the
    /// transliterated models are flatter-keyed and land near 1.94.
    pub fn target_ioc(&self) -> f64 {
        match self {
            Language::English => 1.73,
            _ => 1.94,
        }
    }

    /// Native script of the language, for the detection gate.
    pub fn script(&self) -> Script {
        match self {
            Language::Russian => Script::Cyrillic,
            Language::ChinesePinyin => Script::Cjk,
            _ => Script::Latin,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.resource_name())
    }
}

/// On-disk shape of a frequency table file.
#[derive(Debug, Deserialize)]
struct FrequencyTable {
    /// Letter → percentage, summing to roughly 100.
    monograms: HashMap<String, f64>,
    /// Digraph → percentage (top-N list).
    bigrams: HashMap<String, f64>,
    /// Trigram → percentage (top-N list).
    trigrams: HashMap<String, f64>,
    /// Quadgram → percentage (top-N list).
    quadgrams: HashMap<String, f64>,
}

/// Immutable statistical model for one language.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    /// Which language this model describes.
    pub language: Language,
    /// Monogram percentages indexed by letter (A=0).
    monogram_pct: [f64; 26],
    /// Percentages sorted descending, per n-gram order (index `n - 1`).
    sorted_pcts: [Vec<f64>; 4],
    /// Letters sorted by monogram percentage, most frequent first.
    frequency_order: [char; 26],
    /// Log-probability tables.
    ngrams: NGramModel,
}

impl LanguageModel {
    /// Build a model from a parsed frequency table.
    fn from_table(language: Language, table: &FrequencyTable) -> LanguageModel {
        let mut monogram_pct = [0.0f64; 26];
        for (letter, pct) in &table.monograms {
            if let Some(c) = letter.chars().next() {
                let c = c.to_ascii_uppercase();
                if c.is_ascii_uppercase() {
                    monogram_pct[(c as u8 - b'A') as usize] = *pct;
                }
            }
        }

        let mut order: Vec<usize> = (0..26).collect();
        order.sort_by(|&a, &b| {
            monogram_pct[b]
                .partial_cmp(&monogram_pct[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut frequency_order = ['A'; 26];
        for (rank, idx) in order.iter().enumerate() {
            frequency_order[rank] = (b'A' + *idx as u8) as char;
        }

        // Shape vectors are capped at a common length; tables shipped at
        // different densities would otherwise be compared on their size
        // rather than their shape.
        let sorted = |map: &HashMap<String, f64>, cap: usize| {
            let mut v: Vec<f64> = map.values().copied().collect();
            v.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            v.truncate(cap);
            v
        };

        LanguageModel {
            language,
            monogram_pct,
            sorted_pcts: [
                sorted(&table.monograms, 26),
                sorted(&table.bigrams, SHAPE_TOP_N),
                sorted(&table.trigrams, SHAPE_TOP_N),
                sorted(&table.quadgrams, SHAPE_TOP_N),
            ],
            frequency_order,
            ngrams: NGramModel::from_percentages([
                &table.monograms,
                &table.bigrams,
                &table.trigrams,
                &table.quadgrams,
            ]),
        }
    }

    /// Parse a model straight from frequency-table JSON.
    pub fn from_json(language: Language, json: &str) -> Result<LanguageModel, EngineError> {
        let table: FrequencyTable = serde_json::from_str(json)
            .map_err(|e| EngineError::ResourceMissing(format!("{}: {}", language, e)))?;
        Ok(LanguageModel::from_table(language, &table))
    }

    /// Σ log10 P over all length-`n` windows of cleaned `text`.
    pub fn ngram_score(&self, text: &str, n: usize) -> f64 {
        self.ngrams.score(text, n)
    }

    /// The unseen-gram floor for order `n`, in log10 space.
    pub fn ngram_floor(&self, n: usize) -> f64 {
        self.ngrams.floor(n)
    }

    /// Monogram percentages indexed by letter (A=0).
    pub fn monogram_pct(&self) -> &[f64; 26] {
        &self.monogram_pct
    }

    /// Percentages for order `n`, sorted descending. Used by shape scoring.
    pub fn sorted_percentages(&self, n: usize) -> &[f64] {
        &self.sorted_pcts[n - 1]
    }

    /// Letters sorted by expected frequency, most frequent first.
    pub fn frequency_order(&self) -> &[char; 26] {
        &self.frequency_order
    }
}

/// All models and dictionaries the engine can reach, shared immutably.
///
/// Models are loaded eagerly at construction; dictionaries load lazily the
/// first time a language asks for one and are cached, including negative
/// results.
pub struct Resources {
    /// Frequency models keyed by language.
    models: HashMap<Language, Arc<LanguageModel>>,
    /// Lazily loaded dictionaries; `None` records a failed load.
    dictionaries: RwLock<HashMap<Language, Option<Arc<Dictionary>>>>,
}

impl Resources {
    /// Build resources from pre-constructed models. Dictionaries start
    /// empty and can be injected with [`Resources::insert_dictionary`].
    pub fn new(models: Vec<LanguageModel>) -> Resources {
        Resources {
            models: models
                .into_iter()
                .map(|m| (m.language, Arc::new(m)))
                .collect(),
            dictionaries: RwLock::new(HashMap::new()),
        }
    }

    /// Load every embedded frequency table.
    pub fn from_embedded() -> Result<Resources, EngineError> {
        let mut models = Vec::new();
        for language in Language::ALL {
            let path = format!("frequencies/{}.json", language.resource_name());
            let file = RESOURCE_DIR
                .get_file(&path)
                .ok_or_else(|| EngineError::ResourceMissing(path.clone()))?;
            let json = file
                .contents_utf8()
                .ok_or_else(|| EngineError::ResourceMissing(path.clone()))?;
            models.push(LanguageModel::from_json(language, json)?);
        }
        Ok(Resources::new(models))
    }

    /// Languages with a loaded model, in canonical order.
    pub fn languages(&self) -> Vec<Language> {
        Language::ALL
            .iter()
            .filter(|l| self.models.contains_key(l))
            .copied()
            .collect()
    }

    /// The model for `language`, if loaded.
    pub fn model(&self, language: Language) -> Option<Arc<LanguageModel>> {
        self.models.get(&language).cloned()
    }

    /// Inject a dictionary, bypassing the file search. Used by tests and by
    /// embedders with their own word lists.
    pub fn insert_dictionary(&self, language: Language, dictionary: Dictionary) {
        self.dictionaries
            .write()
            .expect("dictionary lock poisoned")
            .insert(language, Some(Arc::new(dictionary)));
    }

    /// The dictionary for `language`, loading it on first use.
    ///
    /// Search order: `resources/dictionaries/` under the working directory,
    /// then `~/.sibyl/dictionaries/`, then the embedded copy. Returns `None`
    /// when nothing loads, and remembers that outcome.
    pub fn dictionary(&self, language: Language) -> Option<Arc<Dictionary>> {
        if let Some(cached) = self
            .dictionaries
            .read()
            .expect("dictionary lock poisoned")
            .get(&language)
        {
            return cached.clone();
        }
        let loaded = load_dictionary(language).map(Arc::new);
        if loaded.is_none() {
            debug!("no dictionary available for {}", language);
        }
        self.dictionaries
            .write()
            .expect("dictionary lock poisoned")
            .entry(language)
            .or_insert(loaded)
            .clone()
    }
}

/// Best-effort dictionary load for one language.
fn load_dictionary(language: Language) -> Option<Dictionary> {
    let file_name = format!("{}-dictionary.json", language.resource_name());

    for dir in search_paths() {
        let path = dir.join(&file_name);
        if let Ok(json) = std::fs::read_to_string(&path) {
            match Dictionary::from_json(&json) {
                Some(dict) if !dict.is_empty() => {
                    debug!("loaded dictionary for {} from {:?}", language, path);
                    return Some(dict);
                }
                _ => warn!("ignoring malformed dictionary at {:?}", path),
            }
        }
    }

    let embedded = format!("dictionaries/{}", file_name);
    let json = RESOURCE_DIR.get_file(&embedded)?.contents_utf8()?;
    Dictionary::from_json(json).filter(|d| !d.is_empty())
}

/// Ordered on-disk search locations for dictionary overrides.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("resources/dictionaries")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".sibyl").join("dictionaries"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_resources_load_all_languages() {
        let resources = Resources::from_embedded().unwrap();
        assert_eq!(resources.languages().len(), Language::ALL.len());
    }

    #[test]
    fn test_monogram_percentages_sum_to_roughly_100() {
        let resources = Resources::from_embedded().unwrap();
        for language in Language::ALL {
            let model = resources.model(language).unwrap();
            let total: f64 = model.monogram_pct().iter().sum();
            assert!(
                (95.0..105.0).contains(&total),
                "{} monograms sum to {}",
                language,
                total
            );
        }
    }

    #[test]
    fn test_english_frequency_order_starts_with_e_and_t() {
        let resources = Resources::from_embedded().unwrap();
        let model = resources.model(Language::English).unwrap();
        assert_eq!(model.frequency_order()[0], 'E');
        assert_eq!(model.frequency_order()[1], 'T');
    }

    #[test]
    fn test_english_dictionary_is_available_embedded() {
        let resources = Resources::from_embedded().unwrap();
        let dict = resources.dictionary(Language::English).unwrap();
        assert!(dict.contains("THE"));
        assert!(dict.contains("quick"));
    }

    #[test]
    fn test_missing_dictionary_degrades_to_none() {
        let resources = Resources::from_embedded().unwrap();
        // No dictionary ships for the transliterated Russian model.
        assert!(resources.dictionary(Language::Russian).is_none());
        // The negative result is cached, not retried.
        assert!(resources.dictionary(Language::Russian).is_none());
    }

    #[test]
    fn test_injected_dictionary_wins() {
        let resources = Resources::from_embedded().unwrap();
        resources.insert_dictionary(
            Language::Italian,
            Dictionary::from_words(["CIAO", "MONDO"]),
        );
        let dict = resources.dictionary(Language::Italian).unwrap();
        assert!(dict.contains("ciao"));
    }

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("en"), Some(Language::English));
        assert_eq!(Language::from_code("SPANISH"), Some(Language::Spanish));
        assert_eq!(Language::from_code("zh"), Some(Language::ChinesePinyin));
        assert_eq!(Language::from_code("xx"), None);
    }

    #[test]
    fn test_ngram_score_prefers_english_text() {
        let resources = Resources::from_embedded().unwrap();
        let model = resources.model(Language::English).unwrap();
        let english = model.ngram_score("THEQUICKBROWNFOX", 4);
        let noise = model.ngram_score("QXZJKWVQXZJKWVQX", 4);
        assert!(english > noise);
    }
}
