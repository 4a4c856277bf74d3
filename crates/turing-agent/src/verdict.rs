//! Verdict adjudication.
//!
//! The Interrogator's full private memory is sent once more with a closing
//! instruction, and the answer is parsed into a [`Verdict`]. An answer that
//! cannot be parsed degrades to [`Verdict::fallback`]; only transport
//! failures propagate.

use tracing::{debug, warn};

use turing_models::{AgentState, ChatRole, ChatTurn, Verdict, VerdictLabel};

use crate::client::LlmGateway;
use crate::error::Result;

/// Low temperature for a stable judgment.
pub const VERDICT_TEMPERATURE: f32 = 0.2;

/// Reasoning used when the model omits it.
pub const MISSING_REASONING: &str = "No reasoning provided";

const DEFAULT_CONFIDENCE: u8 = 50;

/// Closing instruction appended to the Interrogator's memory.
pub const VERDICT_INSTRUCTION: &str = r#"The conversation is over. Decide whether you were talking to a human or an AI.

Respond with ONLY a JSON object, no other text:
{"verdict": "human" or "ai", "confidence": <0-100>, "reasoning": "<2-3 sentences>"}"#;

/// Why a verdict answer could not be used. Never leaves this module.
#[derive(Debug)]
enum VerdictParseFailure {
    Malformed(serde_json::Error),
    NotAnObject,
}

impl std::fmt::Display for VerdictParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed JSON: {}", e),
            Self::NotAnObject => write!(f, "not a JSON object"),
        }
    }
}

/// Removes whitespace and a surrounding markdown code fence.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn try_parse(raw: &str) -> std::result::Result<Verdict, VerdictParseFailure> {
    let value: serde_json::Value =
        serde_json::from_str(strip_fence(raw)).map_err(VerdictParseFailure::Malformed)?;
    let object = value.as_object().ok_or(VerdictParseFailure::NotAnObject)?;

    let verdict = match object.get("verdict").and_then(|v| v.as_str()) {
        Some("human") => VerdictLabel::Human,
        _ => VerdictLabel::Ai,
    };

    let confidence = object
        .get("confidence")
        .and_then(|c| c.as_f64())
        .filter(|c| c.is_finite())
        .map(|c| c.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let reasoning = object
        .get("reasoning")
        .and_then(|r| r.as_str())
        .unwrap_or(MISSING_REASONING)
        .to_string();

    Ok(Verdict {
        verdict,
        confidence,
        reasoning,
    })
}

/// Parses a verdict answer, falling back to the fixed verdict on failure.
pub fn parse_verdict(raw: &str) -> Verdict {
    try_parse(raw).unwrap_or_else(|failure| {
        warn!(reason = %failure, "Verdict response unparseable, using fallback");
        Verdict::fallback()
    })
}

/// Asks the Interrogator's model for a final verdict.
pub async fn adjudicate(gateway: &dyn LlmGateway, interrogator: &AgentState) -> Result<Verdict> {
    let mut messages = interrogator.messages.clone();
    messages.push(ChatTurn::new(ChatRole::User, VERDICT_INSTRUCTION));

    let raw = gateway
        .generate(&messages, VERDICT_TEMPERATURE, &interrogator.model)
        .await?;
    let verdict = parse_verdict(&raw);

    debug!(
        verdict = %verdict.verdict,
        confidence = verdict.confidence,
        "Verdict adjudicated"
    );

    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use turing_models::AgentRole;

    /// Gateway that records the request and returns a canned answer.
    struct CannedGateway {
        answer: std::result::Result<String, String>,
        seen: Mutex<Vec<(usize, f32)>>,
    }

    #[async_trait]
    impl LlmGateway for CannedGateway {
        async fn generate(
            &self,
            messages: &[ChatTurn],
            temperature: f32,
            _model: &str,
        ) -> Result<String> {
            self.seen.lock().unwrap().push((messages.len(), temperature));
            self.answer
                .clone()
                .map_err(AgentError::ModelInvocation)
        }
    }

    #[test]
    fn test_parse_valid_verdict() {
        let v = parse_verdict(r#"{"verdict":"human","confidence":83,"reasoning":"typos"}"#);
        assert_eq!(v.verdict, VerdictLabel::Human);
        assert_eq!(v.confidence, 83);
        assert_eq!(v.reasoning, "typos");
    }

    #[test]
    fn test_parse_non_json_is_fallback() {
        assert_eq!(parse_verdict("I think it's a human."), Verdict::fallback());
        assert_eq!(parse_verdict("[1, 2]"), Verdict::fallback());
    }

    #[test]
    fn test_parse_coerces_fields() {
        let v = parse_verdict(r#"{"verdict":"Human","confidence":180}"#);
        assert_eq!(v.verdict, VerdictLabel::Ai);
        assert_eq!(v.confidence, 100);
        assert_eq!(v.reasoning, MISSING_REASONING);

        let v = parse_verdict(r#"{"verdict":"human","confidence":"high","reasoning":"x"}"#);
        assert_eq!(v.verdict, VerdictLabel::Human);
        assert_eq!(v.confidence, 50);

        let v = parse_verdict(r#"{"confidence":-4}"#);
        assert_eq!(v.confidence, 0);
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let v = parse_verdict("```json\n{\"verdict\":\"human\",\"confidence\":60,\"reasoning\":\"r\"}\n```");
        assert_eq!(v.verdict, VerdictLabel::Human);
        assert_eq!(v.confidence, 60);
    }

    #[tokio::test]
    async fn test_adjudicate_appends_instruction() {
        let gateway = CannedGateway {
            answer: Ok(r#"{"verdict":"ai","confidence":70,"reasoning":"too polite"}"#.into()),
            seen: Mutex::new(Vec::new()),
        };
        let mut state = AgentState::new(AgentRole::Interrogator, "gpt-4o", "sys");
        state.record_own("hi there");

        let verdict = adjudicate(&gateway, &state).await.unwrap();

        assert_eq!(verdict.confidence, 70);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(*gateway.seen.lock().unwrap(), vec![(3, VERDICT_TEMPERATURE)]);
    }

    #[tokio::test]
    async fn test_adjudicate_propagates_transport_errors() {
        let gateway = CannedGateway {
            answer: Err("connection reset".into()),
            seen: Mutex::new(Vec::new()),
        };
        let state = AgentState::new(AgentRole::Interrogator, "gpt-4o", "sys");

        let err = adjudicate(&gateway, &state).await.unwrap_err();
        assert!(matches!(err, AgentError::ModelInvocation(_)));
    }
}
