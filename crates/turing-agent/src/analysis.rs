//! Splits raw Interrogator output into a visible reply and a private analysis.
//!
//! Parsing is best-effort and never fails: output that does not carry a
//! readable analysis is still a usable reply.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::trace;

use turing_models::SuspicionAnalysis;

use crate::prompts::ANALYSIS_DELIMITER;

/// Outcome of splitting one raw Interrogator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// Visible reply plus a readable analysis.
    Parsed {
        response: String,
        analysis: SuspicionAnalysis,
    },
    /// Visible reply only.
    Unparsed { response: String },
}

impl ParsedReply {
    /// The text the counterpart gets to see.
    pub fn response(&self) -> &str {
        match self {
            Self::Parsed { response, .. } | Self::Unparsed { response } => response,
        }
    }

    pub fn analysis(&self) -> Option<&SuspicionAnalysis> {
        match self {
            Self::Parsed { analysis, .. } => Some(analysis),
            Self::Unparsed { .. } => None,
        }
    }

    pub fn into_parts(self) -> (String, Option<SuspicionAnalysis>) {
        match self {
            Self::Parsed { response, analysis } => (response, Some(analysis)),
            Self::Unparsed { response } => (response, None),
        }
    }
}

#[derive(Deserialize)]
struct RawAnalysis {
    thought: Option<String>,
    #[serde(default)]
    suspicion: serde_json::Value,
}

fn thought_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""thought"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("thought regex must compile")
    })
}

fn suspicion_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""?suspicion"?\s*:\s*(-?\d+(?:\.\d+)?)"#).expect("suspicion regex must compile")
    })
}

/// Reads a number out of a JSON value, accepting numeric strings.
fn as_score(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(|f| f.round() as i64),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

/// Finds the outermost `{...}` span in `text`.
fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_analysis(tail: &str) -> Option<SuspicionAnalysis> {
    if let Some(object) = json_object_span(tail) {
        if let Ok(raw) = serde_json::from_str::<RawAnalysis>(object) {
            if let Some(score) = as_score(&raw.suspicion) {
                return Some(SuspicionAnalysis::new(raw.thought.unwrap_or_default(), score));
            }
        }
    }

    // Models sometimes emit almost-JSON (trailing commas, single fields).
    let score = suspicion_regex()
        .captures(tail)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|f| f.round() as i64)?;
    let thought = thought_regex()
        .captures(tail)
        .map(|c| c[1].replace("\\\"", "\""))
        .unwrap_or_default();

    Some(SuspicionAnalysis::new(thought, score))
}

/// Splits raw Interrogator output on [`ANALYSIS_DELIMITER`].
///
/// - No delimiter: the whole trimmed output is the reply.
/// - Delimiter present: the text before it is the reply (or the whole
///   output if that text is empty); the text after it is parsed as the
///   analysis.
pub fn parse_interrogator_output(raw: &str) -> ParsedReply {
    let Some((before, after)) = raw.split_once(ANALYSIS_DELIMITER) else {
        return ParsedReply::Unparsed {
            response: raw.trim().to_string(),
        };
    };

    let response = match before.trim() {
        "" => raw.trim().to_string(),
        visible => visible.to_string(),
    };

    match parse_analysis(after) {
        Some(analysis) => ParsedReply::Parsed { response, analysis },
        None => {
            trace!("Analysis section present but unreadable");
            ParsedReply::Unparsed { response }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_output() {
        let raw = "Where did you grow up?\n---ANALYSIS---\n{\"thought\": \"opening\", \"suspicion\": 40}";
        let parsed = parse_interrogator_output(raw);

        assert_eq!(parsed.response(), "Where did you grow up?");
        let analysis = parsed.analysis().unwrap();
        assert_eq!(analysis.thought, "opening");
        assert_eq!(analysis.suspicion, 40);
    }

    #[test]
    fn test_no_delimiter() {
        let parsed = parse_interrogator_output("  just a question?  ");
        assert_eq!(
            parsed,
            ParsedReply::Unparsed {
                response: "just a question?".to_string()
            }
        );
    }

    #[test]
    fn test_code_fenced_analysis() {
        let raw = "hmm ok\n---ANALYSIS---\n```json\n{\"thought\": \"too neat\", \"suspicion\": \"85\"}\n```";
        let (response, analysis) = parse_interrogator_output(raw).into_parts();
        assert_eq!(response, "hmm ok");
        assert_eq!(analysis.unwrap().suspicion, 85);
    }

    #[test]
    fn test_almost_json_falls_back_to_regex() {
        let raw = "nice.\n---ANALYSIS---\n{\"thought\": \"said \\\"lol\\\" a lot\", \"suspicion\": 250,}";
        let analysis = parse_interrogator_output(raw).analysis().cloned().unwrap();
        assert_eq!(analysis.thought, "said \"lol\" a lot");
        assert_eq!(analysis.suspicion, 100);
    }

    #[test]
    fn test_unreadable_analysis_keeps_reply() {
        let raw = "what's your dog's name?\n---ANALYSIS---\nI think they are human";
        let parsed = parse_interrogator_output(raw);
        assert_eq!(parsed.response(), "what's your dog's name?");
        assert!(parsed.analysis().is_none());
    }

    #[test]
    fn test_empty_visible_part_uses_raw() {
        let raw = "---ANALYSIS---\n{\"thought\": \"x\", \"suspicion\": 10}";
        let parsed = parse_interrogator_output(raw);
        assert_eq!(parsed.response(), raw.trim());
        assert_eq!(parsed.analysis().unwrap().suspicion, 10);
    }
}
