//! CLI command definitions for the `chatrelay` binary.
//!
//! `serve` starts the HTTP relay; the other commands operate on the same
//! message store directly from the terminal.

pub mod message;
pub mod status;

use chatrelay_types::config::BootstrapPolicy;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Relay browser chat messages to a completion API and keep the transcript.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (overrides config.toml and PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config.toml).
        #[arg(long)]
        host: Option<String>,

        /// Clear the stored transcript on startup.
        #[arg(long)]
        fresh: bool,
    },

    /// Print the stored transcript, oldest first.
    #[command(alias = "log")]
    History,

    /// Send one message and print the assistant's reply.
    Send {
        /// Message text.
        content: String,
    },

    /// Show store and gateway status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Commands {
    /// Store bootstrap policy for this command.
    ///
    /// Only `serve` may clear the transcript (`--fresh` or the configured
    /// policy). Every other command opens the store as-is.
    pub fn bootstrap_policy(&self, configured: BootstrapPolicy) -> BootstrapPolicy {
        match self {
            Commands::Serve { fresh: true, .. } => BootstrapPolicy::Fresh,
            Commands::Serve { .. } => configured,
            _ => BootstrapPolicy::Persistent,
        }
    }
}

impl Cli {
    /// Tracing filter directive for the requested verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,chatrelay=debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from(["chatrelay", "serve", "--port", "8080", "--fresh"]);
        match cli.command {
            Commands::Serve { port, host, fresh } => {
                assert_eq!(port, Some(8080));
                assert_eq!(host, None);
                assert!(fresh);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_only_serve_applies_fresh_bootstrap() {
        let fresh = BootstrapPolicy::Fresh;
        let persistent = BootstrapPolicy::Persistent;

        let serve = Cli::parse_from(["chatrelay", "serve"]).command;
        assert_eq!(serve.bootstrap_policy(fresh), fresh);
        assert_eq!(serve.bootstrap_policy(persistent), persistent);

        let serve_fresh = Cli::parse_from(["chatrelay", "serve", "--fresh"]).command;
        assert_eq!(serve_fresh.bootstrap_policy(persistent), fresh);

        for args in [
            vec!["chatrelay", "history"],
            vec!["chatrelay", "status"],
            vec!["chatrelay", "send", "hello"],
        ] {
            let command = Cli::parse_from(args).command;
            assert_eq!(command.bootstrap_policy(fresh), persistent);
        }
    }

    #[test]
    fn test_log_directive_by_verbosity() {
        assert_eq!(Cli::parse_from(["chatrelay", "status"]).log_directive(), "warn");
        assert_eq!(
            Cli::parse_from(["chatrelay", "--quiet", "status"]).log_directive(),
            "error"
        );
        assert_eq!(
            Cli::parse_from(["chatrelay", "-v", "status"]).log_directive(),
            "info,chatrelay=debug"
        );
        assert_eq!(Cli::parse_from(["chatrelay", "status", "-vv"]).log_directive(), "trace");
    }
}
