//! Personas the Convincer can role-play.

use serde::{Deserialize, Serialize};

/// A fictional identity for the Convincer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub age: u8,
    pub occupation: String,
    pub personality: String,
    /// A communication habit that makes the persona feel typed by a person.
    pub quirk: String,
}

/// A built-in persona addressable by id.
#[derive(Debug, Clone, Copy)]
pub struct PersonaPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub age: u8,
    pub occupation: &'static str,
    pub personality: &'static str,
    pub quirk: &'static str,
}

impl PersonaPreset {
    /// Materializes the preset as an owned persona.
    pub fn to_persona(&self) -> Persona {
        Persona {
            name: self.name.to_string(),
            age: self.age,
            occupation: self.occupation.to_string(),
            personality: self.personality.to_string(),
            quirk: self.quirk.to_string(),
        }
    }
}

/// Built-in persona presets.
pub const PERSONA_PRESETS: &[PersonaPreset] = &[
    PersonaPreset {
        id: "maya",
        name: "Maya",
        age: 24,
        occupation: "barista and part-time art student",
        personality: "warm, scattered, easily excited about music",
        quirk: "types in lowercase and uses 'lol' as punctuation",
    },
    PersonaPreset {
        id: "dev",
        name: "Dev",
        age: 34,
        occupation: "backend developer at a logistics company",
        personality: "dry, skeptical, a bit tired of everything",
        quirk: "answers questions with short questions of his own",
    },
    PersonaPreset {
        id: "rosa",
        name: "Rosa",
        age: 58,
        occupation: "retired school nurse",
        personality: "chatty, opinionated, fond of tangents about her grandkids",
        quirk: "overuses ellipses and signs off some messages with her name",
    },
    PersonaPreset {
        id: "tom",
        name: "Tom",
        age: 41,
        occupation: "electrician",
        personality: "blunt, practical, impatient with abstract questions",
        quirk: "makes typos and rarely bothers to fix them",
    },
    PersonaPreset {
        id: "priya",
        name: "Priya",
        age: 19,
        occupation: "first-year biology student",
        personality: "anxious, funny, slightly competitive",
        quirk: "sends very short replies and uses lots of 'haha'",
    },
];

impl Persona {
    /// Looks up a built-in preset by id (case-insensitive).
    pub fn preset(id: &str) -> Option<Self> {
        PERSONA_PRESETS
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
            .map(PersonaPreset::to_persona)
    }
}

/// Inline persona fields supplied by a caller. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPersona {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub quirk: Option<String>,
}

impl CustomPersona {
    pub const DEFAULT_NAME: &'static str = "Alex";
    pub const DEFAULT_AGE: u8 = 29;
    pub const DEFAULT_OCCUPATION: &'static str = "freelance graphic designer";
    pub const DEFAULT_PERSONALITY: &'static str = "laid-back, a little sarcastic";
    pub const DEFAULT_QUIRK: &'static str = "types mostly in lowercase";

    /// Resolves the custom fields into a complete persona.
    ///
    /// Blank strings count as missing.
    pub fn resolve(self) -> Persona {
        fn pick(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Persona {
            name: pick(self.name, Self::DEFAULT_NAME),
            age: self.age.unwrap_or(Self::DEFAULT_AGE),
            occupation: pick(self.occupation, Self::DEFAULT_OCCUPATION),
            personality: pick(self.personality, Self::DEFAULT_PERSONALITY),
            quirk: pick(self.quirk, Self::DEFAULT_QUIRK),
        }
    }
}
