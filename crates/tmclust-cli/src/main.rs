mod cli;
mod commands;
mod error;
mod logging;
mod utils;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(e) = logging::setup_logging(args.verbose, args.quiet, args.log_file.as_deref()) {
        eprintln!("Error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match commands::cluster::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
