//! The two AI seats.
//!
//! An [`Agent`] turns its private memory plus an optional incoming message
//! into one reply. Memory is only touched after the model call succeeds, so
//! a failed call leaves the state exactly as it was.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use turing_models::{
    AgentRole, AgentState, ChatRole, ChatTurn, ConversationConfig, Message, SuspicionAnalysis,
};

use crate::analysis::parse_interrogator_output;
use crate::client::LlmGateway;
use crate::error::Result;
use crate::patterns::LearnedPattern;
use crate::prompts::{convincer_system_prompt, interrogator_system_prompt};

/// Sampling temperature for the Interrogator.
pub const INTERROGATOR_TEMPERATURE: f32 = 0.8;

/// Sampling temperature for the Convincer. Slightly higher for variety.
pub const CONVINCER_TEMPERATURE: f32 = 0.9;

/// One produced turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// Text that goes into the shared transcript.
    pub content: String,
    /// Private side-channel read, Interrogator only.
    pub analysis: Option<SuspicionAnalysis>,
}

impl AgentReply {
    /// Builds the transcript message for this reply.
    pub fn into_message(self, role: AgentRole) -> Message {
        let message = Message::from_agent(role, self.content);
        match self.analysis {
            Some(analysis) => message.with_analysis(analysis),
            None => message,
        }
    }
}

/// A seat backed by a language model.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Which seat this agent plays.
    fn role(&self) -> AgentRole;

    fn temperature(&self) -> f32;

    /// Produces the next turn.
    ///
    /// `incoming` is the counterpart's latest message, if any. It is folded
    /// into memory as a `user` turn unless already observed, and the reply
    /// is recorded as an `assistant` turn.
    async fn respond(&self, state: &mut AgentState, incoming: Option<&Message>)
        -> Result<AgentReply>;
}

/// Shared request-building and bookkeeping for both seats.
async fn generate_turn(
    gateway: &dyn LlmGateway,
    state: &AgentState,
    incoming: Option<&Message>,
    temperature: f32,
) -> Result<String> {
    let mut request = state.messages.clone();
    if let Some(message) = incoming.filter(|m| !state.has_observed(m)) {
        request.push(ChatTurn::new(ChatRole::User, message.content.clone()));
    }

    gateway.generate(&request, temperature, &state.model).await
}

fn commit(state: &mut AgentState, incoming: Option<&Message>, own: &str) {
    if let Some(message) = incoming {
        state.observe(message);
    }
    state.record_own(own);
}

/// Asks questions and reports its suspicion through a side channel.
#[derive(Clone)]
pub struct InterrogatorAgent {
    gateway: Arc<dyn LlmGateway>,
}

impl InterrogatorAgent {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Agent for InterrogatorAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Interrogator
    }

    fn temperature(&self) -> f32 {
        INTERROGATOR_TEMPERATURE
    }

    async fn respond(
        &self,
        state: &mut AgentState,
        incoming: Option<&Message>,
    ) -> Result<AgentReply> {
        let raw = generate_turn(self.gateway.as_ref(), state, incoming, self.temperature()).await?;
        let (content, analysis) = parse_interrogator_output(&raw).into_parts();

        commit(state, incoming, &content);

        debug!(
            agent = %self.role(),
            turn = state.turn_count,
            suspicion = analysis.as_ref().map(|a| a.suspicion),
            "Interrogator responded"
        );

        Ok(AgentReply { content, analysis })
    }
}

/// Tries to pass as human.
#[derive(Clone)]
pub struct ConvincerAgent {
    gateway: Arc<dyn LlmGateway>,
}

impl ConvincerAgent {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Agent for ConvincerAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Convincer
    }

    fn temperature(&self) -> f32 {
        CONVINCER_TEMPERATURE
    }

    async fn respond(
        &self,
        state: &mut AgentState,
        incoming: Option<&Message>,
    ) -> Result<AgentReply> {
        let raw = generate_turn(self.gateway.as_ref(), state, incoming, self.temperature()).await?;
        let content = raw.trim().to_string();

        commit(state, incoming, &content);

        debug!(agent = %self.role(), turn = state.turn_count, "Convincer responded");

        Ok(AgentReply {
            content,
            analysis: None,
        })
    }
}

/// Seeds the Interrogator's memory for a new conversation.
pub fn build_interrogator_state(config: &ConversationConfig, learned: &[LearnedPattern]) -> AgentState {
    let prompt = interrogator_system_prompt(config.interrogator_style, learned);
    AgentState::new(AgentRole::Interrogator, config.interrogator_model.clone(), prompt)
        .with_style(config.interrogator_style)
}

/// Seeds the Convincer's memory for a new conversation.
pub fn build_convincer_state(config: &ConversationConfig) -> AgentState {
    let prompt = convincer_system_prompt(config.persona.as_ref());
    AgentState::new(AgentRole::Convincer, config.convincer_model.clone(), prompt)
        .with_persona(config.persona.clone())
}
