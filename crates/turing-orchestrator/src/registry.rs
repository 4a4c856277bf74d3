//! In-memory registry of live conversations.
//!
//! Each conversation sits behind its own `tokio::sync::Mutex`, so operations
//! on one id are serialized while different ids proceed in parallel. The map
//! lock is only held for lookups and inserts, never across a model call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use turing_models::{Conversation, ConversationId};

use crate::error::{OrchestratorError, Result};

/// Shared handle to one conversation.
pub type ConversationHandle = Arc<Mutex<Conversation>>;

/// When live conversations may be dropped from memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryPolicy {
    /// Completed conversations older than this are evicted.
    pub completed_ttl: Duration,
    /// Hard cap on entries.
    pub max_conversations: usize,
}

impl Default for RegistryPolicy {
    fn default() -> Self {
        Self {
            completed_ttl: Duration::from_secs(60 * 60),
            max_conversations: 256,
        }
    }
}

struct Entry {
    handle: ConversationHandle,
    completed_at: Option<Instant>,
}

/// Map of conversation id to handle, with explicit eviction.
pub struct ConversationRegistry {
    entries: RwLock<HashMap<ConversationId, Entry>>,
    policy: RegistryPolicy,
}

impl ConversationRegistry {
    pub fn new(policy: RegistryPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> RegistryPolicy {
        self.policy
    }

    /// Adds a conversation, evicting completed entries to make room.
    ///
    /// Fails with `CapacityExceeded` if the registry is full of live ones.
    pub async fn insert(&self, conversation: Conversation) -> Result<ConversationHandle> {
        let mut entries = self.entries.write().await;
        Self::sweep_expired(&mut entries, self.policy.completed_ttl, Instant::now());

        while entries.len() >= self.policy.max_conversations {
            let oldest = entries
                .iter()
                .filter_map(|(id, e)| e.completed_at.map(|at| (id.clone(), at)))
                .min_by_key(|(_, at)| *at)
                .map(|(id, _)| id);

            match oldest {
                Some(id) => {
                    debug!(conversation_id = %id, "Evicting completed conversation for capacity");
                    entries.remove(&id);
                }
                None => {
                    return Err(OrchestratorError::CapacityExceeded(
                        self.policy.max_conversations,
                    ))
                }
            }
        }

        let id = conversation.id.clone();
        let handle = Arc::new(Mutex::new(conversation));
        entries.insert(
            id,
            Entry {
                handle: Arc::clone(&handle),
                completed_at: None,
            },
        );
        Ok(handle)
    }

    pub async fn get(&self, id: &ConversationId) -> Option<ConversationHandle> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|e| Arc::clone(&e.handle))
    }

    /// Starts the TTL clock for a conversation that just completed.
    pub async fn mark_completed(&self, id: &ConversationId) {
        if let Some(entry) = self.entries.write().await.get_mut(id) {
            entry.completed_at.get_or_insert_with(Instant::now);
        }
    }

    /// Drops completed conversations older than the TTL. Returns how many went.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        Self::sweep_expired(&mut entries, self.policy.completed_ttl, Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn sweep_expired(
        entries: &mut HashMap<ConversationId, Entry>,
        ttl: Duration,
        now: Instant,
    ) -> usize {
        let before = entries.len();
        entries.retain(|_, e| match e.completed_at {
            Some(at) => now.saturating_duration_since(at) < ttl,
            None => true,
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "Evicted expired conversations");
        }
        evicted
    }
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::new(RegistryPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turing_models::{AgentRole, AgentState, ConversationConfig};

    fn conversation() -> Conversation {
        Conversation::new(
            ConversationConfig::default(),
            AgentState::new(AgentRole::Interrogator, "m", "s"),
            AgentState::new(AgentRole::Convincer, "m", "s"),
        )
    }

    fn policy(ttl: Duration, max: usize) -> RegistryPolicy {
        RegistryPolicy {
            completed_ttl: ttl,
            max_conversations: max,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = ConversationRegistry::default();
        let conv = conversation();
        let id = conv.id.clone();

        registry.insert(conv).await.unwrap();

        let handle = registry.get(&id).await.unwrap();
        assert_eq!(handle.lock().await.id, id);
        assert!(registry.get(&ConversationId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_full_of_live_conversations() {
        let registry = ConversationRegistry::new(policy(Duration::from_secs(3600), 2));
        registry.insert(conversation()).await.unwrap();
        registry.insert(conversation()).await.unwrap();

        let err = registry.insert(conversation()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::CapacityExceeded(2)));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_completed() {
        let registry = ConversationRegistry::new(policy(Duration::from_secs(3600), 2));
        let first = conversation();
        let second = conversation();
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        registry.insert(first).await.unwrap();
        registry.insert(second).await.unwrap();
        registry.mark_completed(&first_id).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        registry.mark_completed(&second_id).await;

        registry.insert(conversation()).await.unwrap();

        assert!(registry.get(&first_id).await.is_none());
        assert!(registry.get(&second_id).await.is_some());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_ttl_evicts_only_completed() {
        let registry = ConversationRegistry::new(policy(Duration::ZERO, 10));
        let done = conversation();
        let live = conversation();
        let (done_id, live_id) = (done.id.clone(), live.id.clone());
        registry.insert(done).await.unwrap();
        registry.insert(live).await.unwrap();
        registry.mark_completed(&done_id).await;

        assert_eq!(registry.evict_expired().await, 1);
        assert!(registry.get(&done_id).await.is_none());
        assert!(registry.get(&live_id).await.is_some());
    }
}
