//! Conversation orchestration for the reverse Turing test arena.
//!
//! This crate provides the [`Orchestrator`], which sequences turns between an
//! Interrogator and a Convincer (either of which may be a human), enforces
//! the turn limit and produces the final verdict.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use turing_agent::ProviderRouter;
//! use turing_models::ConversationConfig;
//! use turing_orchestrator::Orchestrator;
//! use turing_persistence::HistoryStore;
//!
//! # async fn example() -> turing_orchestrator::Result<()> {
//! let orchestrator = Orchestrator::new(
//!     Arc::new(ProviderRouter::from_env()),
//!     Arc::new(HistoryStore::in_dir("/tmp/arena")),
//! );
//!
//! let conversation = orchestrator.create(ConversationConfig::default()).await?;
//! let mut conversation = orchestrator.start(&conversation.id).await?;
//! while !conversation.is_completed() {
//!     conversation = orchestrator.advance(&conversation.id).await?;
//! }
//! println!("{:?}", conversation.verdict);
//! # Ok(())
//! # }
//! ```

mod error;
mod orchestrator;
mod registry;

pub use error::{OrchestratorError, Result};
pub use orchestrator::Orchestrator;
pub use registry::{ConversationHandle, ConversationRegistry, RegistryPolicy};
