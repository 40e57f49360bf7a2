//! Status events for the streaming surface.
//!
//! The orchestrator narrates its progress through an [`EventSink`]. The
//! blocking entry point plugs in a no-op sink; the streaming entry point
//! plugs in a channel whose receiving end is handed to the caller as a
//! plain iterator. Suspension points are the natural checkpoints of the
//! pipeline: solver iteration windows, strategy boundaries and language
//! boundaries.

use std::sync::mpsc::Sender;

use crate::orchestrator::FinalResult;
use crate::resources::Language;

/// Pipeline stage of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Ranking candidate languages.
    LanguageDetection,
    /// Language candidates chosen.
    LanguageDetected,
    /// Running the cipher-family classifier.
    CipherDetection,
    /// Classifier produced its ranking.
    CipherDetected,
    /// Strategy portfolio assembled.
    StrategiesSelected,
    /// Starting work on one language candidate.
    TryingLanguage,
    /// Starting one strategy.
    TryingStrategy,
    /// Periodic snapshot from inside an iterative solver.
    Solving,
    /// A strategy produced a candidate plaintext.
    StrategyComplete,
    /// A strategy found nothing or failed internally.
    StrategyFailed,
    /// An early-exit rule fired.
    EarlyStop,
    /// All strategies for one language finished.
    LanguageComplete,
    /// Terminal: the engine returned a result.
    Complete,
    /// Terminal: no decryption was produced.
    Failed,
}

impl Stage {
    /// Kebab-case name, stable for machine consumption.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::LanguageDetection => "language-detection",
            Stage::LanguageDetected => "language-detected",
            Stage::CipherDetection => "cipher-detection",
            Stage::CipherDetected => "cipher-detected",
            Stage::StrategiesSelected => "strategies-selected",
            Stage::TryingLanguage => "trying-language",
            Stage::TryingStrategy => "trying-strategy",
            Stage::Solving => "solving",
            Stage::StrategyComplete => "strategy-complete",
            Stage::StrategyFailed => "strategy-failed",
            Stage::EarlyStop => "early-stop",
            Stage::LanguageComplete => "language-complete",
            Stage::Complete => "complete",
            Stage::Failed => "failed",
        }
    }

    /// Is this a terminal stage?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }
}

/// One progress event from the pipeline.
#[derive(Debug, Clone)]
pub struct StatusEvent {
    /// Where in the pipeline this event was emitted.
    pub stage: Stage,
    /// Human-readable description.
    pub message: String,
    /// Overall progress in [0, 100].
    pub progress: f64,
    /// Language in scope, when one is.
    pub language: Option<Language>,
    /// Strategy in scope, when one is.
    pub strategy: Option<String>,
    /// The final result, attached to the terminal `Complete` event.
    pub result: Option<Box<FinalResult>>,
}

impl StatusEvent {
    /// A bare event with just a stage, message and progress.
    pub fn new(stage: Stage, message: impl Into<String>, progress: f64) -> StatusEvent {
        StatusEvent {
            stage,
            message: message.into(),
            progress,
            language: None,
            strategy: None,
            result: None,
        }
    }

    /// Attach the language in scope.
    pub fn with_language(mut self, language: Language) -> StatusEvent {
        self.language = Some(language);
        self
    }

    /// Attach the strategy in scope.
    pub fn with_strategy(mut self, strategy: &str) -> StatusEvent {
        self.strategy = Some(strategy.to_string());
        self
    }
}

/// Receives pipeline events.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: StatusEvent);
}

/// Sink that drops everything; used by the blocking entry point.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: StatusEvent) {}
}

/// Sink that forwards events over an mpsc channel to the stream iterator.
/// A disconnected receiver (the caller dropped the iterator) is fine;
/// sends just become no-ops and the pipeline runs to completion.
pub struct ChannelSink {
    sender: Sender<StatusEvent>,
}

impl ChannelSink {
    /// Wrap a channel sender.
    pub fn new(sender: Sender<StatusEvent>) -> ChannelSink {
        ChannelSink { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: StatusEvent) {
        let _ = self.sender.send(event);
    }
}
