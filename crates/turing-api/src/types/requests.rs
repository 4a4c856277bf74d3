//! Request DTOs for the API.
//!
//! Requests are lenient: out-of-range turn limits are clamped and blank
//! strings fall back to defaults. Only values that cannot mean anything are
//! rejected.

use serde::Deserialize;

use turing_agent::Provider;
use turing_models::{
    AgentRole, ConversationConfig, CustomPersona, InterrogatorStyle, Persona, DEFAULT_TURN_LIMIT,
    MAX_TURN_LIMIT, MIN_TURN_LIMIT,
};

use crate::error::{ApiError, Result};

/// Persona selection: a preset id or inline fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonaSelection {
    Preset(String),
    Custom(CustomPersona),
}

impl PersonaSelection {
    /// Resolves the selection. A blank preset id means no persona.
    pub fn resolve(self) -> Result<Option<Persona>> {
        match self {
            Self::Preset(id) if id.trim().is_empty() => Ok(None),
            Self::Preset(id) => Persona::preset(id.trim())
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown persona preset: {}", id))),
            Self::Custom(custom) => Ok(Some(custom.resolve())),
        }
    }
}

/// Create conversation request. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateConversationRequest {
    pub turn_limit: Option<i64>,
    pub persona: Option<PersonaSelection>,
    pub interrogator_model: Option<String>,
    pub convincer_model: Option<String>,
    /// neutral, aggressive, casual, philosophical or tricky.
    pub interrogator_style: Option<String>,
    /// interrogator or convincer.
    pub human_role: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn routable_model(model: String) -> Result<String> {
    match Provider::for_model(&model) {
        Some(_) => Ok(model),
        None => Err(ApiError::BadRequest(format!("unsupported model: {}", model))),
    }
}

impl CreateConversationRequest {
    /// Validates the request and builds the conversation configuration.
    pub fn into_config(self) -> Result<ConversationConfig> {
        let defaults = ConversationConfig::default();

        let turn_limit = self
            .turn_limit
            .map(|t| t.clamp(MIN_TURN_LIMIT as i64, MAX_TURN_LIMIT as i64) as u32)
            .unwrap_or(DEFAULT_TURN_LIMIT);

        let persona = match self.persona {
            Some(selection) => selection.resolve()?,
            None => None,
        };

        let interrogator_model = non_blank(self.interrogator_model)
            .map(routable_model)
            .transpose()?
            .unwrap_or(defaults.interrogator_model);
        let convincer_model = non_blank(self.convincer_model)
            .map(routable_model)
            .transpose()?
            .unwrap_or(defaults.convincer_model);

        let interrogator_style = non_blank(self.interrogator_style)
            .map(|s| s.parse::<InterrogatorStyle>())
            .transpose()
            .map_err(ApiError::BadRequest)?
            .unwrap_or_default();

        let human_role = non_blank(self.human_role)
            .map(|r| r.parse::<AgentRole>())
            .transpose()
            .map_err(ApiError::BadRequest)?;

        Ok(ConversationConfig {
            turn_limit,
            persona,
            interrogator_model,
            convincer_model,
            interrogator_style,
            human_role,
        })
    }
}

/// Human stand-in message.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMessageRequest {
    pub content: String,
}

impl SubmitMessageRequest {
    /// Returns the trimmed content, rejecting blank messages.
    pub fn content(&self) -> Result<&str> {
        match self.content.trim() {
            "" => Err(ApiError::BadRequest("message content must not be empty".into())),
            content => Ok(content),
        }
    }
}
