//! Core data models for the reverse Turing test arena.
//!
//! This crate provides the fundamental data types shared by every layer:
//! conversation ids, transcript messages, experiment configuration,
//! personas, per-agent state and verdicts.

pub mod config;
pub mod conversation;
pub mod ids;
pub mod message;
pub mod persona;
pub mod verdict;

// Re-export main types
pub use config::{
    clamp_turn_limit, ConversationConfig, InterrogatorStyle, DEFAULT_CONVINCER_MODEL,
    DEFAULT_INTERROGATOR_MODEL, DEFAULT_TURN_LIMIT, MAX_TURN_LIMIT, MIN_TURN_LIMIT,
};
pub use conversation::{AgentState, ChatTurn, Conversation, ConversationStatus};
pub use ids::{ConversationId, MessageId};
pub use message::{AgentRole, ChatRole, Message, SuspicionAnalysis};
pub use persona::{CustomPersona, Persona, PersonaPreset, PERSONA_PRESETS};
pub use verdict::{Verdict, VerdictLabel};
