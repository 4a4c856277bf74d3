//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use turing_api::config::DEFAULT_PORT;
use turing_models::{
    AgentRole, InterrogatorStyle, DEFAULT_CONVINCER_MODEL, DEFAULT_INTERROGATOR_MODEL,
    DEFAULT_TURN_LIMIT,
};
use turing_persistence::HistoryMode;

use crate::config;

/// Turing Arena - an AI tries to pass as human, another AI tries to catch it
#[derive(Parser, Debug)]
#[command(name = "turing-arena")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = config::STATE_DIR_ENV, global = true)]
    pub state_dir: Option<PathBuf>,

    /// What to keep in history: full or redacted
    #[arg(long, env = config::HISTORY_MODE_ENV, default_value = "full", global = true)]
    pub history_mode: HistoryMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the REST API
    Serve {
        /// Host to bind to
        #[arg(long, env = config::HOST_ENV, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, env = config::PORT_ENV, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Allowed CORS origin (repeatable, default any)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Run one conversation in the terminal
    Run {
        /// Number of exchanges before the verdict (clamped to 3-30)
        #[arg(short, long, default_value_t = DEFAULT_TURN_LIMIT)]
        turns: u32,

        /// Persona preset id for the Convincer (maya, dev, rosa, tom, priya)
        #[arg(long)]
        persona: Option<String>,

        /// Interrogator style
        #[arg(long, default_value = "neutral")]
        style: InterrogatorStyle,

        #[arg(long, default_value = DEFAULT_INTERROGATOR_MODEL)]
        interrogator_model: String,

        #[arg(long, default_value = DEFAULT_CONVINCER_MODEL)]
        convincer_model: String,

        /// Take a seat yourself (interrogator or convincer)
        #[arg(long)]
        human: Option<AgentRole>,

        /// Print the final conversation as JSON
        #[arg(long)]
        json: bool,
    },

    /// List completed conversations
    History {
        /// Maximum number of entries
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Returns the state directory path, using default if not specified.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(config::default_state_dir)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::parse_from(["turing-arena", "serve"]);
        match cli.command {
            Commands::Serve { port, cors_origins, .. } => {
                assert_eq!(port, DEFAULT_PORT);
                assert!(cors_origins.is_empty());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from([
            "turing-arena",
            "run",
            "--turns",
            "5",
            "--persona",
            "rosa",
            "--style",
            "tricky",
            "--human",
            "convincer",
        ]);
        match cli.command {
            Commands::Run {
                turns,
                persona,
                style,
                human,
                interrogator_model,
                ..
            } => {
                assert_eq!(turns, 5);
                assert_eq!(persona.as_deref(), Some("rosa"));
                assert_eq!(style, InterrogatorStyle::Tricky);
                assert_eq!(human, Some(AgentRole::Convincer));
                assert_eq!(interrogator_model, DEFAULT_INTERROGATOR_MODEL);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_history_mode_and_verbose() {
        let cli = Cli::parse_from(["turing-arena", "-vv", "--history-mode", "redacted", "history"]);
        assert_eq!(cli.history_mode, HistoryMode::Redacted);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_cli_rejects_unknown_style() {
        assert!(Cli::try_parse_from(["turing-arena", "run", "--style", "rude"]).is_err());
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
