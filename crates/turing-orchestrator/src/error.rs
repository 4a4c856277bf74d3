//! Error types for the orchestrator.

use thiserror::Error;

use turing_models::{AgentRole, ConversationId};

/// Orchestrator-specific errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No conversation with this id in the registry or history.
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    /// Operation not allowed in the conversation's current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A human tried to speak out of turn.
    #[error("Not your turn: expected {expected}, got {submitted}")]
    TurnOrder {
        expected: AgentRole,
        submitted: AgentRole,
    },

    /// Rejected input, such as an empty human message.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] turing_agent::AgentError),

    /// History could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(#[from] turing_persistence::PersistenceError),

    /// A blocking history task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Registry is full of conversations that cannot be evicted.
    #[error("Too many live conversations (limit {0})")]
    CapacityExceeded(usize),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
