//! Sealpack - a self-extracting, password-protected package
//!
//! Decrypts the embedded payload and unpacks it into `./multi_sae_test_package`.

use std::process::ExitCode;

use clap::Parser;

use sealpack_cli::cli::Cli;
use sealpack_cli::{app, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    app::run(cli)
}
