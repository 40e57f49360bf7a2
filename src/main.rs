use log::debug;
use sibyl::cli::parse_cli_args;
use sibyl::{cli_pretty_printing, Engine};

fn main() {
    env_logger::init();

    let (text, opts, show_progress) = match parse_cli_args() {
        Ok(parsed) => parsed,
        Err(message) => {
            cli_pretty_printing::bad_input(&message);
            std::process::exit(2);
        }
    };

    let engine = match Engine::with_default_resources() {
        Ok(engine) => engine,
        Err(e) => {
            cli_pretty_printing::bad_input(&e.to_string());
            std::process::exit(2);
        }
    };

    let result = if show_progress {
        let mut final_result = None;
        for event in engine.auto_decrypt_stream(&text, opts) {
            cli_pretty_printing::progress_event(&event);
            if let Some(result) = event.result {
                final_result = Some(*result);
            }
        }
        match final_result {
            Some(result) => result,
            None => {
                cli_pretty_printing::bad_input("event stream ended without a result");
                std::process::exit(2);
            }
        }
    } else {
        engine.auto_decrypt(&text, &opts)
    };

    debug!(
        "finished: method={} confidence={:.2}",
        result.method, result.confidence
    );
    cli_pretty_printing::print_result(&result);

    if result.succeeded() && result.confidence >= 0.5 {
        std::process::exit(0);
    }
    std::process::exit(1);
}
