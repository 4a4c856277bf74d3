//! Persistence layer for the reverse Turing test arena.
//!
//! Completed conversations are kept in a single JSON history file that is
//! rewritten atomically (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use turing_persistence::{HistoryMode, HistoryStore};
//!
//! let store = HistoryStore::in_dir("/home/user/.turing-arena").with_mode(HistoryMode::Redacted);
//! for conversation in store.list().unwrap() {
//!     println!("{} {:?}", conversation.id, conversation.verdict);
//! }
//! ```

pub mod atomic;
pub mod error;
pub mod history_store;

pub use error::{PersistenceError, Result};
pub use history_store::{HistoryMode, HistoryStore, HISTORY_FILE};
