//! Agents for the reverse Turing test arena.
//!
//! This crate holds everything that talks to a language model: the two
//! seats ([`InterrogatorAgent`], [`ConvincerAgent`]), their system prompts,
//! the provider-routing [`LlmGateway`], the side-channel analysis parser,
//! verdict adjudication and the "AI tell" [`PatternAnalyzer`].
//!
//! # Core Types
//!
//! - [`Agent`]: produces one turn from private memory
//! - [`LlmGateway`]: `generate(messages, temperature, model) -> text`
//! - [`ProviderRouter`]: gateway that routes model ids to OpenAI,
//!   Anthropic or OpenRouter
//! - [`ParsedReply`]: visible reply plus optional [`SuspicionAnalysis`]
//!
//! [`SuspicionAnalysis`]: turing_models::SuspicionAnalysis

pub mod agent;
pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod patterns;
pub mod prompts;
pub mod verdict;

pub use agent::{
    build_convincer_state, build_interrogator_state, Agent, AgentReply, ConvincerAgent,
    InterrogatorAgent, CONVINCER_TEMPERATURE, INTERROGATOR_TEMPERATURE,
};
pub use analysis::{parse_interrogator_output, ParsedReply};
pub use client::{AnthropicClient, LlmGateway, OpenAiCompatibleClient, ProviderRouter};
pub use config::{ModelInfo, Provider, ProviderKeys, MODEL_CATALOG};
pub use error::{AgentError, Result};
pub use patterns::{LearnedPattern, PatternAnalyzer};
pub use prompts::{
    convincer_system_prompt, interrogator_system_prompt, ANALYSIS_DELIMITER, MAX_LEARNED_PATTERNS,
};
pub use verdict::{adjudicate, parse_verdict, VERDICT_TEMPERATURE};
