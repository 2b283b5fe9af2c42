//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use sealpack_core::VERSION;

use crate::constants::DEFAULT_PAYLOAD_OUTPUT;

/// Sealpack - unpack the password-protected test package into ./multi_sae_test_package
#[derive(Parser, Debug)]
#[command(name = "sealpack")]
#[command(author, version = VERSION, about, long_about = None)]
pub struct Cli {
    /// Password (prompted for, without echo, when omitted)
    #[arg(value_name = "PASSWORD", allow_hyphen_values = true)]
    pub password: Option<String>,

    /// Quiet mode (print only the output directory)
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit a single JSON object on stdout
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long)]
    pub ascii: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Sealpack packer - seal a directory into the payload embedded by `sealpack`
#[derive(Parser, Debug)]
#[command(name = "sealpack-pack")]
#[command(author, version = VERSION, about, long_about = None)]
pub struct PackCli {
    /// Directory whose contents become the package
    #[arg(value_name = "SOURCE_DIR")]
    pub source: PathBuf,

    /// Where to write the base64 payload
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_PAYLOAD_OUTPUT)]
    pub output: PathBuf,

    /// Password (prompted for with confirmation when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Replace an existing payload file
    #[arg(long)]
    pub force: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
        PackCli::command().debug_assert();
    }

    #[test]
    fn test_password_positional() {
        let cli = Cli::try_parse_from(["sealpack", "correct-horse"]).unwrap();
        assert_eq!(cli.password.as_deref(), Some("correct-horse"));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_password_may_start_with_hyphen() {
        let cli = Cli::try_parse_from(["sealpack", "-x9pass"]).unwrap();
        assert_eq!(cli.password.as_deref(), Some("-x9pass"));
    }

    #[test]
    fn test_flags_without_password() {
        let cli = Cli::try_parse_from(["sealpack", "--json", "--quiet"]).unwrap();
        assert!(cli.password.is_none());
        assert!(cli.json);
        assert!(cli.quiet);
    }

    #[test]
    fn test_extra_positional_rejected() {
        assert!(Cli::try_parse_from(["sealpack", "one", "two"]).is_err());
    }

    #[test]
    fn test_pack_defaults() {
        let cli = PackCli::try_parse_from(["sealpack-pack", "fixtures"]).unwrap();
        assert_eq!(cli.source, PathBuf::from("fixtures"));
        assert_eq!(cli.output, PathBuf::from(DEFAULT_PAYLOAD_OUTPUT));
        assert!(!cli.force);
    }
}
