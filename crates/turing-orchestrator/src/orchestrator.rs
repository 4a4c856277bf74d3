//! The conversation state machine.
//!
//! `idle → active → completed`. Every operation locks its conversation,
//! works on a clone and writes the clone back only when it succeeds, so a
//! failed model call leaves transcript, memories and status untouched.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use turing_agent::{
    adjudicate, build_convincer_state, build_interrogator_state, Agent, ConvincerAgent,
    InterrogatorAgent, LearnedPattern, LlmGateway, PatternAnalyzer, MAX_LEARNED_PATTERNS,
};
use turing_models::{
    AgentRole, Conversation, ConversationConfig, ConversationId, ConversationStatus, Message,
};
use turing_persistence::HistoryStore;

use crate::error::{OrchestratorError, Result};
use crate::registry::{ConversationHandle, ConversationRegistry, RegistryPolicy};

/// Runs reverse Turing test conversations.
pub struct Orchestrator {
    registry: ConversationRegistry,
    history: Arc<HistoryStore>,
    gateway: Arc<dyn LlmGateway>,
    interrogator: InterrogatorAgent,
    convincer: ConvincerAgent,
    analyzer: PatternAnalyzer,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn LlmGateway>, history: Arc<HistoryStore>) -> Self {
        Self {
            registry: ConversationRegistry::default(),
            history,
            interrogator: InterrogatorAgent::new(Arc::clone(&gateway)),
            convincer: ConvincerAgent::new(Arc::clone(&gateway)),
            gateway,
            analyzer: PatternAnalyzer::new(),
        }
    }

    pub fn with_policy(mut self, policy: RegistryPolicy) -> Self {
        self.registry = ConversationRegistry::new(policy);
        self
    }

    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    /// Creates an idle conversation. No model calls are made.
    pub async fn create(&self, config: ConversationConfig) -> Result<Conversation> {
        let learned = self.learned_patterns().await;
        let interrogator = build_interrogator_state(&config, &learned);
        let convincer = build_convincer_state(&config);
        let conversation = Conversation::new(config, interrogator, convincer);

        self.registry.insert(conversation.clone()).await?;

        info!(
            conversation_id = %conversation.id,
            turn_limit = conversation.config.turn_limit,
            human_role = ?conversation.config.human_role,
            learned = learned.len(),
            "Conversation created"
        );
        Ok(conversation)
    }

    /// Activates an idle conversation and lets an AI Interrogator open.
    pub async fn start(&self, id: &ConversationId) -> Result<Conversation> {
        let handle = self.handle(id).await?;
        let mut guard = handle.lock().await;
        require_status(&guard, ConversationStatus::Idle, "start")?;

        let mut working = guard.clone();
        working.status = ConversationStatus::Active;
        if !working.config.is_human(AgentRole::Interrogator) {
            self.take_ai_turn(&mut working, AgentRole::Interrogator)
                .await?;
        }

        info!(conversation_id = %id, "Conversation started");
        *guard = working;
        Ok(guard.clone())
    }

    /// Produces the next AI turn, or finalizes once the turn limit is hit.
    ///
    /// When the next speaker is a human, nothing happens.
    pub async fn advance(&self, id: &ConversationId) -> Result<Conversation> {
        let handle = self.handle(id).await?;
        let mut guard = handle.lock().await;
        require_status(&guard, ConversationStatus::Active, "advance")?;

        let mut working = guard.clone();
        self.step(&mut working).await?;

        self.commit(&mut guard, working).await;
        Ok(guard.clone())
    }

    /// Records a message typed by the human participant.
    ///
    /// The AI counterpart answers within the same call unless the turn limit
    /// is reached, in which case the conversation is finalized. Nothing is
    /// kept when the counterpart's model call fails.
    pub async fn submit_human_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> Result<Conversation> {
        let content = content.trim();
        if content.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "message content must not be empty".to_string(),
            ));
        }

        let handle = self.handle(id).await?;
        let mut guard = handle.lock().await;
        require_status(&guard, ConversationStatus::Active, "accept messages")?;

        let human = guard.config.human_role.ok_or_else(|| {
            OrchestratorError::InvalidState("no human participant configured".to_string())
        })?;
        let expected = guard.next_speaker();
        if human != expected {
            return Err(OrchestratorError::TurnOrder {
                expected,
                submitted: human,
            });
        }

        let mut working = guard.clone();
        if working.turn_limit_reached() {
            // Every exchange is used up: the line is not appended and the
            // verdict is taken on the transcript as it stands.
            debug!(conversation_id = %id, agent = %human, "Turn limit reached, finalizing");
            self.finalize(&mut working).await?;
        } else {
            let incoming = working.last_from(human.counterpart()).cloned();
            let state = working.agent_mut(human);
            if let Some(message) = &incoming {
                state.observe(message);
            }
            state.record_own(content);
            working.transcript.push(Message::from_human(human, content));

            debug!(
                conversation_id = %id,
                agent = %human,
                turn = working.current_turn(),
                "Human message recorded"
            );

            self.step(&mut working).await?;
        }

        self.commit(&mut guard, working).await;
        Ok(guard.clone())
    }

    /// Adjudicates the verdict and completes the conversation.
    pub async fn end(&self, id: &ConversationId) -> Result<Conversation> {
        let handle = self.handle(id).await?;
        let mut guard = handle.lock().await;
        require_status(&guard, ConversationStatus::Active, "end")?;

        let mut working = guard.clone();
        self.finalize(&mut working).await?;

        self.commit(&mut guard, working).await;
        Ok(guard.clone())
    }

    /// Looks a conversation up in the registry, then in history.
    pub async fn get(&self, id: &ConversationId) -> Result<Conversation> {
        if let Some(handle) = self.registry.get(id).await {
            return Ok(handle.lock().await.clone());
        }
        let key = id.clone();
        self.with_history(move |h| h.get(&key))
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(id.clone()))
    }

    /// Completed conversations, newest first.
    pub async fn history(&self) -> Result<Vec<Conversation>> {
        self.with_history(HistoryStore::list).await
    }

    /// Runs a history file operation on the blocking pool.
    async fn with_history<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&HistoryStore) -> turing_persistence::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let history = Arc::clone(&self.history);
        Ok(tokio::task::spawn_blocking(move || op(&history)).await??)
    }

    async fn handle(&self, id: &ConversationId) -> Result<ConversationHandle> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| OrchestratorError::NotFound(id.clone()))
    }

    async fn commit(&self, slot: &mut Conversation, working: Conversation) {
        let completed = working.is_completed();
        *slot = working;
        if completed {
            self.registry.mark_completed(&slot.id).await;
        }
    }

    async fn learned_patterns(&self) -> Vec<LearnedPattern> {
        match self.with_history(HistoryStore::load_all).await {
            Ok(history) => self.analyzer.aggregate(&history, MAX_LEARNED_PATTERNS),
            Err(e) => {
                warn!(error = %e, "Could not read history for learned patterns");
                Vec::new()
            }
        }
    }

    async fn step(&self, working: &mut Conversation) -> Result<()> {
        if working.turn_limit_reached() {
            return self.finalize(working).await;
        }

        let next = working.next_speaker();
        if working.config.is_human(next) {
            debug!(conversation_id = %working.id, agent = %next, "Waiting for human");
            return Ok(());
        }
        self.take_ai_turn(working, next).await
    }

    async fn take_ai_turn(&self, working: &mut Conversation, role: AgentRole) -> Result<()> {
        let agent: &dyn Agent = match role {
            AgentRole::Interrogator => &self.interrogator,
            AgentRole::Convincer => &self.convincer,
        };
        let incoming = working.last_from(role.counterpart()).cloned();

        let reply = agent
            .respond(working.agent_mut(role), incoming.as_ref())
            .await?;
        working.transcript.push(reply.into_message(role));

        debug!(
            conversation_id = %working.id,
            agent = %role,
            turn = working.current_turn(),
            "Turn appended"
        );
        Ok(())
    }

    async fn finalize(&self, working: &mut Conversation) -> Result<()> {
        if let Some(last) = working.last_from(AgentRole::Convincer).cloned() {
            working.interrogator.observe(&last);
        }

        let verdict = adjudicate(self.gateway.as_ref(), &working.interrogator).await?;
        working.verdict = Some(verdict);
        working.status = ConversationStatus::Completed;
        working.completed_at = Some(Utc::now());

        let snapshot = working.clone();
        self.with_history(move |h| h.upsert(&snapshot)).await?;

        if let Some(verdict) = &working.verdict {
            info!(
                conversation_id = %working.id,
                verdict = %verdict.verdict,
                confidence = verdict.confidence,
                turns = working.current_turn(),
                "Conversation completed"
            );
        }
        Ok(())
    }
}

fn require_status(
    conversation: &Conversation,
    required: ConversationStatus,
    action: &str,
) -> Result<()> {
    if conversation.status == required {
        Ok(())
    } else {
        Err(OrchestratorError::InvalidState(format!(
            "cannot {} a conversation that is {}",
            action, conversation.status
        )))
    }
}
