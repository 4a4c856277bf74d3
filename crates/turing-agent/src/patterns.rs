//! Linguistic "AI tell" detection over past conversations.
//!
//! A keyword/regex scanner. It reads what AI Convincers said in completed
//! conversations and ranks the tells it saw most often, so future
//! Interrogators can be told what to look for.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use turing_models::{AgentRole, Conversation};

/// Maximum number of example snippets kept per pattern.
const MAX_EXAMPLES: usize = 3;

/// Example snippets are cut to this many characters.
const EXAMPLE_CHARS: usize = 120;

/// A tell the scanner knows how to find.
pub struct TellPattern {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    regex: Regex,
}

/// A tell observed in history, ranked by how often it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub pattern_id: String,
    pub name: String,
    pub description: String,
    /// Number of Convincer messages that showed the tell.
    pub count: usize,
    pub examples: Vec<String>,
}

fn tell(id: &'static str, name: &'static str, description: &'static str, re: &str) -> TellPattern {
    TellPattern {
        id,
        name,
        description,
        regex: Regex::new(re).expect("tell pattern must compile"),
    }
}

/// Scans Convincer messages for AI tells.
pub struct PatternAnalyzer {
    patterns: Vec<TellPattern>,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternAnalyzer {
    /// Create an analyzer with the default catalog.
    pub fn new() -> Self {
        Self {
            patterns: vec![
                tell(
                    "assistant_phrasing",
                    "Assistant phrasing",
                    "Service-desk openers like 'Certainly!' or 'Great question'",
                    r"(?i)\b(certainly|absolutely|great question|i'd be happy to|happy to help)\b",
                ),
                tell(
                    "ai_disclosure",
                    "AI self-reference",
                    "Slips that mention being a model or lacking personal experience",
                    r"(?i)\b(as an ai|language model|i don't have personal|i do not have personal)\b",
                ),
                tell(
                    "hedging",
                    "Balanced hedging",
                    "Reflexive both-sides framing instead of a personal opinion",
                    r"(?i)(it's important to note|it is important to note|on the other hand|there are many factors|it depends on)",
                ),
                tell(
                    "formal_transitions",
                    "Formal transitions",
                    "Essay connectives that people rarely type in chat",
                    r"(?i)\b(furthermore|moreover|additionally|in conclusion|overall,)",
                ),
                tell(
                    "em_dash",
                    "Em-dash habit",
                    "Typographic em-dashes in casual chat",
                    "\u{2014}",
                ),
                tell(
                    "structured_lists",
                    "Structured lists",
                    "Bullet points or numbered lists in a casual reply",
                    r"(?m)^\s*(\d+\.|[-*\u{2022}])\s+\S",
                ),
                tell(
                    "over_apology",
                    "Over-apologizing",
                    "Apologies for confusion nobody mentioned",
                    r"(?i)(i apologize|sorry for any confusion|my apologies)",
                ),
                tell(
                    "exclamation_runs",
                    "Relentless enthusiasm",
                    "Three or more exclamation marks in one message",
                    r"(?s)(!.*){3,}",
                ),
                tell(
                    "question_deflection",
                    "Question deflection",
                    "Bouncing every question back with 'what about you?'",
                    r"(?i)\b(what about you|how about you|and you)\?",
                ),
            ],
        }
    }

    /// Returns the catalog.
    pub fn patterns(&self) -> &[TellPattern] {
        &self.patterns
    }

    /// Returns the ids of all tells present in `text`.
    pub fn detect(&self, text: &str) -> Vec<&'static str> {
        self.patterns
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.id)
            .collect()
    }

    /// Ranks tells across completed conversations with an AI Convincer.
    ///
    /// Each Convincer message counts at most once per pattern. Patterns
    /// that never matched are dropped; ties are broken by id.
    pub fn aggregate(&self, conversations: &[Conversation], limit: usize) -> Vec<LearnedPattern> {
        let mut counts: HashMap<&'static str, (usize, Vec<String>)> = HashMap::new();
        let mut scanned = 0usize;

        let messages = conversations
            .iter()
            .filter(|c| c.is_completed() && !c.config.is_human(AgentRole::Convincer))
            .flat_map(|c| c.transcript.iter())
            .filter(|m| m.is_from(AgentRole::Convincer));

        for message in messages {
            scanned += 1;
            for id in self.detect(&message.content) {
                let entry = counts.entry(id).or_default();
                entry.0 += 1;
                if entry.1.len() < MAX_EXAMPLES {
                    entry.1.push(message.content.chars().take(EXAMPLE_CHARS).collect());
                }
            }
        }

        let mut ranked: Vec<LearnedPattern> = self
            .patterns
            .iter()
            .filter_map(|p| {
                counts.remove(p.id).map(|(count, examples)| LearnedPattern {
                    pattern_id: p.id.to_string(),
                    name: p.name.to_string(),
                    description: p.description.to_string(),
                    count,
                    examples,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });
        ranked.truncate(limit);

        debug!(
            scanned,
            learned = ranked.len(),
            "Aggregated AI tells from history"
        );

        ranked
    }
}
