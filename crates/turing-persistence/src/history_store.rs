//! History of completed conversations.
//!
//! All snapshots live in one JSON array:
//! ```text
//! state_dir/
//! └── history.json
//! ```
//! Upserts rewrite the whole file atomically. Within one process writes are
//! serialized; across processes the last writer wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use turing_models::{Conversation, ConversationId};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// Default history file name inside the state directory.
pub const HISTORY_FILE: &str = "history.json";

/// How much of a conversation is written to history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Everything, including both agents' private memories.
    #[default]
    Full,
    /// Transcript and verdict only; agent memories are stripped.
    Redacted,
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Redacted => write!(f, "redacted"),
        }
    }
}

impl std::str::FromStr for HistoryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "redacted" => Ok(Self::Redacted),
            other => Err(format!("unknown history mode: {}", other)),
        }
    }
}

/// Flat-file store of conversation snapshots.
pub struct HistoryStore {
    path: PathBuf,
    mode: HistoryMode,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: HistoryMode::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store at `<state_dir>/history.json`.
    pub fn in_dir(state_dir: impl AsRef<Path>) -> Self {
        Self::new(state_dir.as_ref().join(HISTORY_FILE))
    }

    pub fn with_mode(mut self, mode: HistoryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    /// Loads every stored snapshot in file order. A missing file is empty.
    pub fn load_all(&self) -> Result<Vec<Conversation>> {
        Ok(read_json_optional(&self.path)?.unwrap_or_default())
    }

    /// Inserts or replaces the snapshot with the same id.
    pub fn upsert(&self, conversation: &Conversation) -> Result<()> {
        let snapshot = match self.mode {
            HistoryMode::Full => conversation.clone(),
            HistoryMode::Redacted => conversation.redacted(),
        };

        // A poisoned lock only means another writer panicked; the file is
        // still whole because writes are atomic.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut all = self.load_all()?;
        match all.iter_mut().find(|c| c.id == snapshot.id) {
            Some(existing) => *existing = snapshot,
            None => all.push(snapshot),
        }
        atomic_write_json(&self.path, &all)?;

        debug!(
            conversation_id = %conversation.id,
            entries = all.len(),
            mode = %self.mode,
            "History upserted"
        );
        Ok(())
    }

    /// Completed conversations, newest first.
    pub fn list(&self) -> Result<Vec<Conversation>> {
        let mut completed: Vec<Conversation> = self
            .load_all()?
            .into_iter()
            .filter(Conversation::is_completed)
            .collect();
        completed.sort_by(|a, b| {
            b.completed_at
                .unwrap_or(b.created_at)
                .cmp(&a.completed_at.unwrap_or(a.created_at))
        });
        Ok(completed)
    }

    /// Looks up one snapshot by id.
    pub fn get(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        Ok(self.load_all()?.into_iter().find(|c| &c.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;
    use turing_models::{
        AgentRole, AgentState, ConversationConfig, ConversationStatus, Message,
    };

    fn completed(minutes_ago: i64) -> Conversation {
        let mut conv = Conversation::new(
            ConversationConfig::default(),
            AgentState::new(AgentRole::Interrogator, "gpt-4o", "ask"),
            AgentState::new(AgentRole::Convincer, "gpt-4o", "pretend"),
        );
        conv.transcript
            .push(Message::from_agent(AgentRole::Interrogator, "hi"));
        conv.status = ConversationStatus::Completed;
        conv.completed_at = Some(Utc::now() - Duration::minutes(minutes_ago));
        conv
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path());
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path());
        let mut conv = completed(0);

        store.upsert(&conv).unwrap();
        conv.transcript
            .push(Message::from_agent(AgentRole::Convincer, "hey"));
        store.upsert(&conv).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].transcript.len(), 2);
        assert_eq!(store.get(&conv.id).unwrap(), Some(conv));
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path());
        let old = completed(30);
        let new = completed(1);
        let mut active = completed(0);
        active.status = ConversationStatus::Active;

        store.upsert(&old).unwrap();
        store.upsert(&new).unwrap();
        store.upsert(&active).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![new.id, old.id]);
    }

    #[test]
    fn test_redacted_mode_strips_memory() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path()).with_mode(HistoryMode::Redacted);
        let conv = completed(0);

        store.upsert(&conv).unwrap();

        let stored = store.get(&conv.id).unwrap().unwrap();
        assert!(stored.interrogator.messages.is_empty());
        assert_eq!(stored.transcript, conv.transcript);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Redacted".parse::<HistoryMode>().unwrap(), HistoryMode::Redacted);
        assert!("partial".parse::<HistoryMode>().is_err());
    }
}
