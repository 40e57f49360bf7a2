//! CLI argument parsing.
//!
//! Turns command-line arguments into the ciphertext plus an [`Options`]
//! for the library. Bad input (no ciphertext, unreadable file, unknown
//! language code) is reported as an error string so the binary can exit
//! with code 2.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{LanguageChoice, Options};
use crate::resources::Language;

/// Automated cryptanalysis for classical ciphers.
#[derive(Parser, Debug)]
#[command(name = "sibyl", version, about)]
pub struct Args {
    /// File containing the ciphertext. Reads stdin when neither a file
    /// nor --text is given.
    pub file: Option<PathBuf>,

    /// Ciphertext given inline instead of a file.
    #[arg(short, long)]
    pub text: Option<String>,

    /// Language: auto, or a code like en, es, fr, de, it, pt, ru, zh.
    #[arg(short, long, default_value = "auto")]
    pub language: String,

    /// Soft time budget in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 60_000)]
    pub max_time: u64,

    /// Disable dictionary word-coverage scoring.
    #[arg(long)]
    pub no_dict: bool,

    /// Only attack with the single best language candidate.
    #[arg(long)]
    pub single_language: bool,

    /// Print pipeline progress events to stderr while solving.
    #[arg(long)]
    pub progress: bool,
}

/// Parse the process arguments into (ciphertext, options, progress flag).
///
/// # Errors
/// Returns a human-readable message when the ciphertext cannot be read
/// or the language is not recognized.
pub fn parse_cli_args() -> Result<(String, Options, bool), String> {
    let args = Args::parse();
    resolve(args)
}

/// Turn parsed arguments into library inputs.
fn resolve(args: Args) -> Result<(String, Options, bool), String> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            buffer
        }
    };
    if text.trim().is_empty() {
        return Err("no ciphertext given".to_string());
    }

    let language = if args.language.eq_ignore_ascii_case("auto") {
        LanguageChoice::Auto
    } else {
        match Language::from_code(&args.language) {
            Some(language) => LanguageChoice::Fixed(language),
            None => return Err(format!("unknown language {:?}", args.language)),
        }
    };

    let opts = Options {
        language,
        try_multiple: !args.single_language,
        max_time_ms: args.max_time,
        use_dictionary: !args.no_dict,
    };
    Ok((text, opts, args.progress))
}
