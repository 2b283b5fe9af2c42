//! Sealpack packer
//!
//! Seals a directory into the base64 payload that `sealpack` embeds.

use std::process::ExitCode;

use clap::Parser;
use secrecy::SecretString;
use tracing::debug;

use sealpack_cli::cli::PackCli;
use sealpack_cli::errors::CliError;
use sealpack_cli::logging;
use sealpack_cli::prompt::prompt_new_password;
use sealpack_core::extractor::ensure_non_empty;
use sealpack_core::{build_payload, write_payload};

fn main() -> ExitCode {
    let cli = PackCli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error={}", err);
            match err.downcast_ref::<CliError>() {
                Some(cli_err) => cli_err.exit_status(),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: PackCli) -> anyhow::Result<()> {
    let password = match cli.password {
        Some(password) => SecretString::from(password),
        None => prompt_new_password()
            .map_err(|e| CliError::PasswordUnavailable(e.to_string()))?,
    };
    let password = ensure_non_empty(password).map_err(CliError::from)?;

    let payload = build_payload(&cli.source, &password).map_err(CliError::from)?;
    debug!(output = %cli.output.display(), "writing payload");
    write_payload(&cli.output, &payload, cli.force).map_err(CliError::from)?;

    println!("status=ok");
    println!("output={}", cli.output.display());
    println!("fingerprint={}", payload.fingerprint());
    Ok(())
}
