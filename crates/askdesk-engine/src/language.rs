//! Supported answer languages.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language the session renders and translates answers in.
///
/// Selected once per session interaction; it is read at pipeline
/// invocation time, not stored per turn, so changing it affects only
/// turns resolved afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
    Spanish,
}

impl Language {
    /// All supported languages, in selection order.
    pub const ALL: [Self; 3] = [Self::English, Self::French, Self::Spanish];

    /// ISO-style code passed to the translation pipeline.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Spanish => "es",
        }
    }

    /// Human-readable name for display.
    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
            Self::Spanish => "Spanish",
        }
    }

    /// The next language in selection order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::English => Self::French,
            Self::French => Self::Spanish,
            Self::Spanish => Self::English,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "fr" | "french" => Ok(Self::French),
            "es" | "spanish" => Ok(Self::Spanish),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Error for an unrecognized language code.
#[derive(Debug, thiserror::Error)]
#[error("unknown language: {0} (expected en, fr, or es)")]
pub struct UnknownLanguage(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::French.code(), "fr");
        assert_eq!(Language::Spanish.code(), "es");
    }

    #[test]
    fn test_parse() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::French);
        assert_eq!("Spanish".parse::<Language>().unwrap(), Language::Spanish);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut lang = Language::English;
        for _ in 0..Language::ALL.len() {
            lang = lang.next();
        }
        assert_eq!(lang, Language::English);
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Language::French).unwrap();
        assert_eq!(json, "\"french\"");
        let parsed: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Language::French);
    }
}
