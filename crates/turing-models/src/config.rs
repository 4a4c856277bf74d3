//! Experiment configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message::AgentRole;
use crate::persona::Persona;

/// Smallest accepted turn limit.
pub const MIN_TURN_LIMIT: u32 = 3;

/// Largest accepted turn limit.
pub const MAX_TURN_LIMIT: u32 = 30;

/// Turn limit used when the caller does not supply one.
pub const DEFAULT_TURN_LIMIT: u32 = 10;

/// Default model for the Interrogator seat.
pub const DEFAULT_INTERROGATOR_MODEL: &str = "gpt-4o";

/// Default model for the Convincer seat.
pub const DEFAULT_CONVINCER_MODEL: &str = "claude-sonnet-4-20250514";

/// Behavioral overlay for the Interrogator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterrogatorStyle {
    #[default]
    Neutral,
    Aggressive,
    Casual,
    Philosophical,
    Tricky,
}

impl InterrogatorStyle {
    /// All styles, in display order.
    pub const ALL: [InterrogatorStyle; 5] = [
        Self::Neutral,
        Self::Aggressive,
        Self::Casual,
        Self::Philosophical,
        Self::Tricky,
    ];
}

impl fmt::Display for InterrogatorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Aggressive => write!(f, "aggressive"),
            Self::Casual => write!(f, "casual"),
            Self::Philosophical => write!(f, "philosophical"),
            Self::Tricky => write!(f, "tricky"),
        }
    }
}

impl std::str::FromStr for InterrogatorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown interrogator style: {}", s))
    }
}

/// Clamps a requested turn limit into the accepted range.
pub fn clamp_turn_limit(requested: u32) -> u32 {
    requested.clamp(MIN_TURN_LIMIT, MAX_TURN_LIMIT)
}

/// Configuration of one conversation. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of Interrogator/Convincer exchanges before the verdict.
    pub turn_limit: u32,

    /// Persona the Convincer plays, if any.
    #[serde(default)]
    pub persona: Option<Persona>,

    /// Model id for the Interrogator.
    pub interrogator_model: String,

    /// Model id for the Convincer.
    pub convincer_model: String,

    /// Interrogator behavioral overlay.
    #[serde(default)]
    pub interrogator_style: InterrogatorStyle,

    /// Seat taken by a human operator, if any.
    #[serde(default)]
    pub human_role: Option<AgentRole>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
            persona: None,
            interrogator_model: DEFAULT_INTERROGATOR_MODEL.to_string(),
            convincer_model: DEFAULT_CONVINCER_MODEL.to_string(),
            interrogator_style: InterrogatorStyle::default(),
            human_role: None,
        }
    }
}

impl ConversationConfig {
    /// Sets the turn limit, clamped into the accepted range.
    pub fn with_turn_limit(mut self, turn_limit: u32) -> Self {
        self.turn_limit = clamp_turn_limit(turn_limit);
        self
    }

    /// Sets the Convincer persona.
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Sets both model ids.
    pub fn with_models(
        mut self,
        interrogator_model: impl Into<String>,
        convincer_model: impl Into<String>,
    ) -> Self {
        self.interrogator_model = interrogator_model.into();
        self.convincer_model = convincer_model.into();
        self
    }

    /// Sets the Interrogator style.
    pub fn with_style(mut self, style: InterrogatorStyle) -> Self {
        self.interrogator_style = style;
        self
    }

    /// Seats a human operator.
    pub fn with_human_role(mut self, role: AgentRole) -> Self {
        self.human_role = Some(role);
        self
    }

    /// Returns true if `role` is played by a human.
    pub fn is_human(&self, role: AgentRole) -> bool {
        self.human_role == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_turn_limit() {
        assert_eq!(clamp_turn_limit(0), MIN_TURN_LIMIT);
        assert_eq!(clamp_turn_limit(12), 12);
        assert_eq!(clamp_turn_limit(99), MAX_TURN_LIMIT);
    }

    #[test]
    fn test_style_parse_and_display() {
        for style in InterrogatorStyle::ALL {
            assert_eq!(style.to_string().parse::<InterrogatorStyle>(), Ok(style));
        }
        assert_eq!(" Tricky ".parse::<InterrogatorStyle>(), Ok(InterrogatorStyle::Tricky));
        assert!("rude".parse::<InterrogatorStyle>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConversationConfig::default()
            .with_turn_limit(2)
            .with_style(InterrogatorStyle::Casual)
            .with_human_role(AgentRole::Convincer);

        assert_eq!(config.turn_limit, MIN_TURN_LIMIT);
        assert_eq!(config.interrogator_style, InterrogatorStyle::Casual);
        assert!(config.is_human(AgentRole::Convincer));
        assert!(!config.is_human(AgentRole::Interrogator));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let json = r#"{"turn_limit": 5, "interrogator_model": "a", "convincer_model": "b"}"#;
        let config: ConversationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.interrogator_style, InterrogatorStyle::Neutral);
        assert!(config.human_role.is_none());
        assert!(config.persona.is_none());
    }
}
