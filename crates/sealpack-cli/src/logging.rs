//! Diagnostic logging to stderr.

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` enables debug output for
/// the sealpack crates and the default shows warnings only.
pub fn init_tracing(verbose: bool) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("sealpack_core=debug,sealpack_cli=debug")
    } else {
        EnvFilter::new("warn")
    };

    // A second install (tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();

    debug!(verbose, "logging initialized");
}
