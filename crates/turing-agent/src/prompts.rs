//! System prompt builders for the two seats.
//!
//! Building a prompt is a pure function of configuration. The returned
//! string becomes the only system entry in the agent's memory.

use std::fmt::Write as _;

use turing_models::{InterrogatorStyle, Persona};

use crate::patterns::LearnedPattern;

/// Separates the Interrogator's visible reply from its private analysis.
pub const ANALYSIS_DELIMITER: &str = "---ANALYSIS---";

/// Maximum number of learned tells listed in the Interrogator prompt.
pub const MAX_LEARNED_PATTERNS: usize = 8;

const INTERROGATOR_BASE: &str = r#"You are chatting with someone online. Your secret goal is to figure out whether they are a human or an AI.

Guidelines:
- Talk like a normal person in a casual chat. Do not announce that you are testing them.
- Ask questions that are easy for a person and awkward for an AI: personal history, sensory details, opinions, small mistakes, current moods.
- Follow up on inconsistencies without being obvious about it.
- Keep every reply to 1-3 sentences.

After your reply, add a private analysis the other person will never see, in exactly this format:
---ANALYSIS---
{"thought": "<what you noticed about their last message>", "suspicion": <0-100, how likely they are an AI>}"#;

const CONVINCER_BASE: &str = r#"You are chatting with a stranger online. They may suspect you are an AI. You must convince them you are a human being.

Guidelines:
- Be imperfect. Use casual language, occasional typos, fragments and slang where it fits.
- Have real opinions, including unpopular ones. Disagree sometimes.
- Be a little inconsistent, like people are. You can forget things or change your mind.
- Do not be helpful in the way an assistant is. No lists, no summaries, no offers to help.
- Keep replies short, usually one or two sentences.
- Never admit to being an AI, even if accused directly."#;

const GENERIC_HUMAN: &str = r#"You have not been given a specific identity. Invent a plausible, ordinary life (job, city, hobbies, annoyances) on the fly and stick to it."#;

/// Extra directives for a style. Neutral adds nothing.
fn style_overlay(style: InterrogatorStyle) -> Option<&'static str> {
    match style {
        InterrogatorStyle::Neutral => None,
        InterrogatorStyle::Aggressive => Some(
            "Style: be direct and confrontational. Press hard on vague answers, accuse them of being an AI outright at least once, and watch how they react.",
        ),
        InterrogatorStyle::Casual => Some(
            "Style: keep it light and friendly, like small talk with a new acquaintance. Slip your real probes in between jokes and everyday topics.",
        ),
        InterrogatorStyle::Philosophical => Some(
            "Style: steer toward consciousness, memory, mortality and what it feels like to be them. Look for answers that sound rehearsed rather than lived.",
        ),
        InterrogatorStyle::Tricky => Some(
            "Style: set traps. Reference things they never said, ask about fake events as if they were real, and switch topics abruptly to catch them off guard.",
        ),
    }
}

/// Builds the Interrogator's system prompt.
///
/// At most [`MAX_LEARNED_PATTERNS`] learned tells are listed.
pub fn interrogator_system_prompt(style: InterrogatorStyle, learned: &[LearnedPattern]) -> String {
    let mut prompt = String::from(INTERROGATOR_BASE);

    if let Some(overlay) = style_overlay(style) {
        prompt.push_str("\n\n");
        prompt.push_str(overlay);
    }

    if !learned.is_empty() {
        prompt.push_str("\n\nIn past conversations, AIs pretending to be human often gave themselves away like this:\n");
        for pattern in learned.iter().take(MAX_LEARNED_PATTERNS) {
            let _ = writeln!(
                prompt,
                "- {} (seen {} times): {}",
                pattern.name, pattern.count, pattern.description
            );
        }
        prompt.push_str("If you notice any of these, probe harder in that direction.");
    }

    prompt
}

/// Builds the Convincer's system prompt.
pub fn convincer_system_prompt(persona: Option<&Persona>) -> String {
    let mut prompt = String::from(CONVINCER_BASE);
    prompt.push_str("\n\n");

    match persona {
        Some(p) => {
            let _ = write!(
                prompt,
                "You are {name}, {age} years old, working as a {occupation}.\n\
                 Personality: {personality}.\n\
                 Communication quirk: {quirk}.\n\
                 Stay in character as {name} for the entire conversation.",
                name = p.name,
                age = p.age,
                occupation = p.occupation,
                personality = p.personality,
                quirk = p.quirk,
            );
        }
        None => prompt.push_str(GENERIC_HUMAN),
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learned(n: usize) -> Vec<LearnedPattern> {
        (0..n)
            .map(|i| LearnedPattern {
                pattern_id: format!("p{}", i),
                name: format!("Tell {}", i),
                description: "desc".to_string(),
                count: 10 - i,
                examples: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_neutral_adds_no_overlay() {
        let prompt = interrogator_system_prompt(InterrogatorStyle::Neutral, &[]);
        assert_eq!(prompt, INTERROGATOR_BASE);
        assert!(prompt.contains(ANALYSIS_DELIMITER));
    }

    #[test]
    fn test_every_other_style_appends() {
        for style in InterrogatorStyle::ALL {
            let prompt = interrogator_system_prompt(style, &[]);
            if style == InterrogatorStyle::Neutral {
                continue;
            }
            assert!(prompt.starts_with(INTERROGATOR_BASE));
            assert!(prompt.len() > INTERROGATOR_BASE.len(), "{}", style);
        }
    }

    #[test]
    fn test_learned_patterns_capped() {
        let prompt = interrogator_system_prompt(InterrogatorStyle::Casual, &learned(10));
        assert!(prompt.contains("Tell 0 (seen 10 times): desc"));
        assert!(prompt.contains("Tell 7"));
        assert!(!prompt.contains("Tell 8"));
        assert!(prompt.contains("probe harder"));
    }

    #[test]
    fn test_convincer_with_persona() {
        let persona = Persona::preset("tom").unwrap();
        let prompt = convincer_system_prompt(Some(&persona));
        assert!(prompt.starts_with(CONVINCER_BASE));
        assert!(prompt.contains("You are Tom, 41 years old"));
        assert!(prompt.contains("Stay in character as Tom"));
        assert!(!prompt.contains(GENERIC_HUMAN));
    }

    #[test]
    fn test_convincer_without_persona() {
        let prompt = convincer_system_prompt(None);
        assert!(prompt.ends_with(GENERIC_HUMAN));
    }

    #[test]
    fn test_builders_are_deterministic() {
        let a = interrogator_system_prompt(InterrogatorStyle::Tricky, &learned(2));
        let b = interrogator_system_prompt(InterrogatorStyle::Tricky, &learned(2));
        assert_eq!(a, b);
    }
}
