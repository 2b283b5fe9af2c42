//! The extraction run: banner, password, extraction, report.

use std::path::Path;
use std::process::ExitCode;

use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, warn};

use sealpack_core::extractor::DEFAULT_OUTPUT_DIR;
use sealpack_core::{
    Cancellation, ExtractionReport, ExtractorConfig, FixedPassword, PackageExtractor,
    PasswordSource, Result, VERSION,
};

use crate::assets::embedded_payload;
use crate::cli::Cli;
use crate::errors::CliError;
use crate::prompt::TerminalPrompt;
use crate::signals;
use crate::ui::{self, Badge, UiContext, UiFlags};

const PASSWORD_PROMPT: &str = "Package password";
const RETRY_HINT: &str = "Re-run sealpack to try again";
const OCCUPIED_HINT: &str = "Move or remove the existing output directory";

/// Run the extractor and report the outcome.
///
/// Never exits the process itself, so temporary files are dropped before
/// `main` returns. SIGINT, SIGTERM and SIGHUP cancel the run instead of
/// killing it.
pub fn run(cli: Cli) -> ExitCode {
    let ctx = UiContext::from_env(UiFlags {
        json: cli.json,
        no_color: cli.no_color,
        ascii: cli.ascii,
        quiet: cli.quiet,
    });

    let cancellation = Cancellation::new();
    let _signals = signals::install(&cancellation)
        .inspect_err(|err| warn!(error = %err, "could not install signal handlers"))
        .ok();

    match extract(cli.password, &ctx, cancellation) {
        Ok(report) => {
            report_success(&ctx, &report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_failure(&ctx, &err);
            err.exit_status()
        }
    }
}

fn extract(
    password: Option<String>,
    ctx: &UiContext,
    cancellation: Cancellation,
) -> std::result::Result<ExtractionReport, CliError> {
    let extractor = PackageExtractor::new(embedded_payload()?, ExtractorConfig::default())
        .with_cancellation(cancellation.clone());
    ui::print(
        ctx,
        &ui::banner(
            ctx,
            DEFAULT_OUTPUT_DIR,
            VERSION,
            &extractor.payload().fingerprint(),
        ),
    );

    let inner: Box<dyn PasswordSource> = match password {
        Some(password) => {
            debug!("password taken from the command line");
            Box::new(FixedPassword::new(password))
        }
        None => Box::new(TerminalPrompt::new(PASSWORD_PROMPT, cancellation)),
    };
    let mut source = Announced { inner, ctx };

    Ok(extractor.extract(&mut source)?)
}

/// Prints the "decrypting" status once a password has been obtained.
struct Announced<'a> {
    inner: Box<dyn PasswordSource>,
    ctx: &'a UiContext,
}

impl PasswordSource for Announced<'_> {
    fn acquire(&mut self) -> Result<SecretString> {
        let password = self.inner.acquire()?;
        ui::print(
            self.ctx,
            &ui::status(self.ctx, Badge::Info, "Decrypting package"),
        );
        Ok(password)
    }
}

#[derive(Serialize)]
struct JsonSuccess {
    status: &'static str,
    output_dir: String,
    entry_point: Option<String>,
    entries: Vec<String>,
}

#[derive(Serialize)]
struct JsonFailure {
    status: &'static str,
    error: JsonError,
}

#[derive(Serialize)]
struct JsonError {
    kind: &'static str,
    message: String,
    exit_code: u8,
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// The output directory as the user should type it: relative to the
/// working directory.
fn relative_output_dir(report: &ExtractionReport) -> String {
    report
        .output_dir
        .strip_prefix(".")
        .map(display_path)
        .unwrap_or_else(|_| display_path(&report.output_dir))
}

fn report_success(ctx: &UiContext, report: &ExtractionReport) {
    let output_dir = relative_output_dir(report);

    if ctx.mode.is_json() {
        let body = JsonSuccess {
            status: "ok",
            output_dir,
            entry_point: report
                .entry_point_present
                .then(|| display_path(&report.entry_point)),
            entries: report
                .unpacked
                .entries
                .iter()
                .map(|entry| display_path(entry))
                .collect(),
        };
        print_json(&body);
        return;
    }

    if ctx.quiet {
        println!("{}", output_dir);
        return;
    }

    let entries = report.unpacked.entries.len().to_string();
    let files = report.unpacked.files.to_string();
    ui::print(
        ctx,
        &ui::receipt(
            ctx,
            "Package extracted",
            &[
                ("Output dir", output_dir.as_str()),
                ("Entries", entries.as_str()),
                ("Files", files.as_str()),
            ],
        ),
    );

    if report.entry_point_present {
        let entry_point = report
            .entry_point
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        ui::print(
            ctx,
            &ui::hint(ctx, &format!("cd {} && ./{}", output_dir, entry_point)),
        );
    } else {
        ui::print(
            ctx,
            &ui::status(
                ctx,
                Badge::Warn,
                &format!(
                    "Entry point {} not found in the package",
                    display_path(&report.entry_point)
                ),
            ),
        );
    }
}

fn report_failure(ctx: &UiContext, err: &CliError) {
    if ctx.mode.is_json() {
        let body = JsonFailure {
            status: "error",
            error: JsonError {
                kind: err.kind(),
                message: err.to_string(),
                exit_code: err.exit_code(),
            },
        };
        print_json(&body);
        return;
    }

    ui::print_error(ctx, &err.to_string(), error_hint(err));
}

fn error_hint(err: &CliError) -> Option<&'static str> {
    match err {
        CliError::DecryptionFailed | CliError::PasswordUnavailable(_) => Some(RETRY_HINT),
        CliError::OutputDirOccupied(_) => Some(OCCUPIED_HINT),
        _ => None,
    }
}

fn print_json<T: Serialize>(body: &T) {
    match serde_json::to_string(body) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("error=Failed to encode JSON output: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealpack_core::archive::UnpackReport;
    use sealpack_core::fs::OutputDirState;
    use std::path::PathBuf;

    fn sample_report(entry_point_present: bool) -> ExtractionReport {
        ExtractionReport {
            output_dir: PathBuf::from(".").join(DEFAULT_OUTPUT_DIR),
            output_dir_state: OutputDirState::Created,
            entry_point: PathBuf::from(".")
                .join(DEFAULT_OUTPUT_DIR)
                .join("multi_sae_test.sh"),
            entry_point_present,
            unpacked: UnpackReport {
                entries: vec![PathBuf::from("multi_sae_test.sh")],
                files: 1,
            },
        }
    }

    #[test]
    fn test_relative_output_dir_strips_current_dir() {
        assert_eq!(relative_output_dir(&sample_report(true)), DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn test_json_success_shape() {
        let report = sample_report(false);
        let body = JsonSuccess {
            status: "ok",
            output_dir: relative_output_dir(&report),
            entry_point: report
                .entry_point_present
                .then(|| display_path(&report.entry_point)),
            entries: vec!["multi_sae_test.sh".to_string()],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["output_dir"], DEFAULT_OUTPUT_DIR);
        assert!(value["entry_point"].is_null());
        assert_eq!(value["entries"][0], "multi_sae_test.sh");
    }

    #[test]
    fn test_json_failure_shape() {
        let err = CliError::DecryptionFailed;
        let body = JsonFailure {
            status: "error",
            error: JsonError {
                kind: err.kind(),
                message: err.to_string(),
                exit_code: err.exit_code(),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["kind"], "decryption_failed");
        assert_eq!(value["error"]["message"], "invalid password or corrupted package");
        assert_eq!(value["error"]["exit_code"], 1);
    }

    #[test]
    fn test_occupied_hint_only_for_non_empty_output_dir() {
        let occupied = CliError::from(sealpack_core::SealError::OutputDirOccupied(
            PathBuf::from(DEFAULT_OUTPUT_DIR),
        ));
        assert_eq!(error_hint(&occupied), Some(OCCUPIED_HINT));

        let denied = CliError::Filesystem(
            "Failed to create multi_sae_test_package: Permission denied (os error 13)"
                .to_string(),
        );
        assert_eq!(error_hint(&denied), None);
        assert_eq!(error_hint(&CliError::Interrupted), None);
        assert_eq!(error_hint(&CliError::DecryptionFailed), Some(RETRY_HINT));
    }
}
