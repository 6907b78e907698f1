// Entrypoint for `progress`: evaluates the deliverable checklist and
// writes `.progress.json` at the project root. Takes no arguments;
// PROGRESS_ROOT and PROGRESS_CONFIG override the defaults.

use chrono::Local;
use projkit::config::TrackerConfig;
use projkit::{logging, progress};
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();

    let config = TrackerConfig::from_env();

    if !config.checklist.is_file() {
        eprintln!("Error: checklist not found: {}", config.checklist.display());
        return ExitCode::SUCCESS;
    }

    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    match progress::run(&config, Local::now(), color, &mut stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
