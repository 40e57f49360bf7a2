//! Sibyl is an automated cryptanalysis engine for classical ciphers.
//!
//! Given an opaque ciphertext it identifies the most likely cipher
//! family, drives a portfolio of attacks across candidate languages
//! under a time budget, and reports the best plaintext together with the
//! statistical and dictionary evidence behind it.
// Warns in case we forget to include documentation
#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

/// Statistical measurements, Kasiski examination, language detection and
/// the cipher-family classifier.
pub mod analysis;
/// Cipher encoders/decoders as one sum type; used by solvers for
/// primitives and by tests to synthesize ciphertexts.
pub mod ciphers;
/// CLI argument parsing.
pub mod cli;
/// CLI output formatting for consistent, colored result rendering.
pub mod cli_pretty_printing;
/// Engine options.
pub mod config;
/// Typed errors observable at the API boundary.
pub mod errors;
/// The attack orchestrator and its streaming event surface.
pub mod orchestrator;
/// Language models and dictionaries.
pub mod resources;
/// Plaintext quality scoring.
pub mod scoring;
/// The solver portfolio.
pub mod solvers;
/// Text normalization helpers.
pub mod textnorm;

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;

pub use analysis::classifier::{CipherFamily, Classification, ClassifierStats, FamilyCandidate};
pub use analysis::language::LangCandidate;
pub use config::{LanguageChoice, Options};
pub use errors::EngineError;
pub use orchestrator::events::{Stage, StatusEvent};
pub use orchestrator::{DictionaryValidation, FinalResult};
pub use resources::{Language, Resources};

/// Embedded resources, parsed once per process and shared by every
/// engine built through [`Engine::with_default_resources`].
static DEFAULT_RESOURCES: Lazy<Result<Arc<Resources>, EngineError>> =
    Lazy::new(|| Resources::from_embedded().map(Arc::new));

/// The cryptanalysis engine: immutable resources plus the pipeline.
///
/// Construction loads every language model once; everything after that is
/// read-only and cheap to share.
///
/// ```rust
/// use sibyl::{Engine, Options};
///
/// let engine = Engine::with_default_resources().unwrap();
/// let ciphertext = "WKH TXLFN EURZQ IRA MXPSV RYHU WKH ODCB GRJ \
///                   DQG UXQV DZDB LQWR WKH IRUHVW";
/// let result = engine.auto_decrypt(ciphertext, &Options::default());
/// assert!(result.succeeded());
/// assert_eq!(result.method, "caesar-shift");
/// assert!(result.plaintext.starts_with("THE QUICK BROWN FOX"));
/// ```
///
/// Too-short inputs never panic; they come back as the `none` sentinel:
///
/// ```rust
/// use sibyl::{Engine, Options};
///
/// let engine = Engine::with_default_resources().unwrap();
/// let result = engine.auto_decrypt("HELLO", &Options::default());
/// assert!(!result.succeeded());
/// assert_eq!(result.method, "none");
/// ```
pub struct Engine {
    /// Shared language models and dictionaries.
    resources: Arc<Resources>,
}

impl Engine {
    /// Build an engine around caller-supplied resources. Tests inject
    /// their own models and dictionaries through here.
    pub fn new(resources: Resources) -> Engine {
        Engine {
            resources: Arc::new(resources),
        }
    }

    /// Build an engine from the embedded language tables. The tables are
    /// parsed once per process; further engines share them.
    ///
    /// # Errors
    /// Returns [`EngineError::ResourceMissing`] if an embedded frequency
    /// table is absent or malformed.
    pub fn with_default_resources() -> Result<Engine, EngineError> {
        match &*DEFAULT_RESOURCES {
            Ok(resources) => Ok(Engine {
                resources: Arc::clone(resources),
            }),
            Err(e) => Err(e.clone()),
        }
    }

    /// The resource store backing this engine.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Analyze `ciphertext` and return the best decryption found within
    /// the options' budget. Never panics and never returns nothing: on
    /// failure the result carries `method = "none"` and an error cause.
    pub fn auto_decrypt(&self, ciphertext: &str, opts: &Options) -> FinalResult {
        debug!("auto_decrypt on {} chars", ciphertext.chars().count());
        let mut sink = orchestrator::events::NullSink;
        orchestrator::run(&self.resources, ciphertext, opts, &mut sink)
    }

    /// Like [`Engine::auto_decrypt`], but returns a blocking iterator of
    /// status events. The terminal event is always `complete` or
    /// `failed` and carries the final result.
    pub fn auto_decrypt_stream(
        &self,
        ciphertext: &str,
        opts: Options,
    ) -> impl Iterator<Item = StatusEvent> {
        orchestrator::run_streaming(self.resources.clone(), ciphertext.to_string(), opts)
    }

    /// Classify `ciphertext` into ranked cipher families. The language
    /// hint only selects which dictionary powers the classifier's
    /// word-level heuristics.
    pub fn classify(&self, ciphertext: &str, language_hint: Option<Language>) -> Classification {
        let dictionary = self
            .resources
            .dictionary(language_hint.unwrap_or(Language::English));
        analysis::classifier::classify(ciphertext, dictionary.as_deref())
    }

    /// Rank candidate languages for `ciphertext`, best first.
    pub fn detect_language(&self, ciphertext: &str) -> Vec<LangCandidate> {
        analysis::language::detect_language(ciphertext, &self.resources)
    }
}
