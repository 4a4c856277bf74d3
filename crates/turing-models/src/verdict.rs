//! The Interrogator's final judgment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human or AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    Human,
    Ai,
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

/// Structured verdict produced once, when a conversation is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: VerdictLabel,
    /// Confidence in the label, 0 to 100.
    pub confidence: u8,
    pub reasoning: String,
}

impl Verdict {
    /// Reasoning attached to the fallback verdict.
    pub const UNPARSEABLE_REASONING: &'static str = "Unable to parse verdict response";

    /// The fixed verdict used when the model's answer cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            verdict: VerdictLabel::Ai,
            confidence: 50,
            reasoning: Self::UNPARSEABLE_REASONING.to_string(),
        }
    }
}
