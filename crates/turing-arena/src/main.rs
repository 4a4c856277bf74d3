//! Turing Arena entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use turing_arena::cli::Cli;
use turing_arena::commands::{self, Context};
use turing_arena::config;

#[tokio::main]
async fn main() {
    // Provider keys may live in .env.local
    let _ = dotenvy::from_filename(config::ENV_FILE);

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let state_dir = cli.state_dir();
    let ctx = Context {
        state_dir: &state_dir,
        history_mode: cli.history_mode,
    };

    if let Err(e) = commands::execute(cli.command, &ctx).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
