//! Precompiled chunk tool
//!
//! Entry point for `chunkc`. Parses CLI arguments and delegates to the
//! command implementations.

use std::io;

use chunk_cli::Cli;
use clap::Parser as ClapParser;

fn main() {
    let cli = Cli::parse();
    chunk_cli::init_logging(cli.verbose);

    let stdout = io::stdout();
    if let Err(e) = chunk_cli::run(&cli, &mut stdout.lock()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
