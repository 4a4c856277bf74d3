//! Shared configuration for the arena.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.turing-arena/
//! └── history.json   # Completed conversations
//! ```
//!
//! # Environment Variables
//!
//! - `TURING_STATE_DIR`: Override the state directory
//! - `TURING_HOST` / `TURING_PORT`: HTTP bind address
//! - `TURING_HISTORY_MODE`: `full` or `redacted`
//! - `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `OPENROUTER_API_KEY`: provider keys

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use turing_persistence::HISTORY_FILE;

/// Environment variable for a custom state directory.
pub const STATE_DIR_ENV: &str = "TURING_STATE_DIR";

pub const HOST_ENV: &str = "TURING_HOST";

pub const PORT_ENV: &str = "TURING_PORT";

pub const HISTORY_MODE_ENV: &str = "TURING_HISTORY_MODE";

/// Dotenv file loaded at startup, if present.
pub const ENV_FILE: &str = ".env.local";

const DEFAULT_STATE_DIR: &str = ".turing-arena";

/// Default state directory: `~/.turing-arena`, or `./.turing-arena` without
/// a home directory.
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_STATE_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

/// History file inside `state_dir`.
pub fn history_path(state_dir: &Path) -> PathBuf {
    state_dir.join(HISTORY_FILE)
}

/// Creates the state directory if needed.
pub fn ensure_state_dir(state_dir: &Path) -> io::Result<()> {
    if !state_dir.exists() {
        fs::create_dir_all(state_dir)?;
    }
    Ok(())
}
