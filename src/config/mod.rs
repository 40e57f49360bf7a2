//! Engine options.
//!
//! One plain struct, threaded by reference through the orchestrator. The
//! defaults match the behavior most callers want: auto language detection,
//! the full strategy portfolio, a one minute budget and dictionary scoring
//! enabled.

use crate::resources::Language;

/// Which language(s) the engine should assume for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageChoice {
    /// Rank candidate languages statistically and try the best ones.
    #[default]
    Auto,
    /// Only use the given language.
    Fixed(Language),
}

/// Options for a single `auto_decrypt` call.
#[derive(Debug, Clone)]
pub struct Options {
    /// Language selection mode.
    pub language: LanguageChoice,
    /// Try multiple language candidates instead of stopping after the first.
    pub try_multiple: bool,
    /// Soft time budget in milliseconds, checked between strategies and at
    /// solver iteration windows.
    pub max_time_ms: u64,
    /// Use dictionaries for word-coverage scoring when they are available.
    pub use_dictionary: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            language: LanguageChoice::Auto,
            try_multiple: true,
            max_time_ms: 60_000,
            use_dictionary: true,
        }
    }
}
