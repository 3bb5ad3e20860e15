//! Slateboard replay shell entry point.

use slateboard_app::{AppConfig, USAGE};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let config = match AppConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match slateboard_app::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Replay failed: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
