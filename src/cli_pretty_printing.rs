//! CLI output formatting.
//!
//! All user-facing printing for the binary lives here so the formatting
//! stays consistent: results on stdout, progress and diagnostics on
//! stderr.

use colored::Colorize;

use crate::orchestrator::events::StatusEvent;
use crate::orchestrator::FinalResult;

/// Print a final result to stdout.
pub fn print_result(result: &FinalResult) {
    if result.succeeded() {
        println!("{}", "Decryption succeeded".green().bold());
        println!("  {} {}", "method:".dimmed(), result.method);
        if let Some(key) = &result.key {
            println!("  {} {}", "key:".dimmed(), key);
        }
        if let Some(language) = result.language {
            println!("  {} {}", "language:".dimmed(), language);
        }
        println!(
            "  {} {} ({:.0}% detection)",
            "cipher type:".dimmed(),
            result.cipher_type,
            result.detection_confidence * 100.0
        );
        println!("  {} {:.2}", "confidence:".dimmed(), result.confidence);
        if let Some(validation) = &result.dictionary_validation {
            println!(
                "  {} {}/{} words ({:.0}%)",
                "dictionary:".dimmed(),
                validation.words_valid,
                validation.words_total,
                validation.word_coverage * 100.0
            );
        }
        println!();
        println!("{}", result.plaintext);
    } else {
        eprintln!("{}", "No decryption found".red().bold());
        if let Some(error) = &result.error {
            eprintln!("  {} {}", "cause:".dimmed(), error);
        }
        eprintln!(
            "  {} {} ({:.0}%)",
            "best cipher-type guess:".dimmed(),
            result.cipher_type,
            result.detection_confidence * 100.0
        );
    }
}

/// Print one progress event to stderr.
pub fn progress_event(event: &StatusEvent) {
    let line = format!(
        "[{:>3.0}%] {:<20} {}",
        event.progress,
        event.stage.as_str(),
        event.message
    );
    eprintln!("{}", line.dimmed());
}

/// Print a bad-input message to stderr.
pub fn bad_input(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::events::Stage;

    #[test]
    fn test_progress_event_does_not_panic() {
        progress_event(&StatusEvent::new(Stage::Solving, "iteration 10/100", 42.0));
    }
}
