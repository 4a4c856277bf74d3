//! REST API for the reverse Turing test arena.
//!
//! Thin axum boundary over the orchestrator:
//! - Conversation lifecycle (create, start, advance, human message, end)
//! - History of completed conversations
//! - Persona presets and the model catalog
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use turing_agent::ProviderRouter;
//! use turing_api::{serve, ApiConfig, AppState};
//! use turing_orchestrator::Orchestrator;
//! use turing_persistence::HistoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::new(
//!         Arc::new(ProviderRouter::from_env()),
//!         Arc::new(HistoryStore::in_dir("/tmp/arena")),
//!     );
//!     serve(AppState::new(ApiConfig::default(), orchestrator)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::{ApiConfig, CorsPolicy};
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
