//! bootcheck CLI entry point.

use bootcheck::cli::{self, Cli, EXIT_ERROR};
use bootcheck::logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
