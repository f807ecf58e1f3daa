//! AI operation requests
//!
//! Typed parameters for polish, rewrite, suggest and analyze. These are
//! request-scoped and never persisted.

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display` and `FromStr` for a lowercase option enum.
macro_rules! option_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Unknown {}: {}. Valid values: {}",
                        $label,
                        s,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

// =============================================================================
// Polish
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolishStyle {
    Formal,
    Casual,
    #[default]
    Literary,
    Modern,
}

option_enum!(PolishStyle, "polish style", {
    Formal => "formal",
    Casual => "casual",
    Literary => "literary",
    Modern => "modern",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolishFocus {
    Grammar,
    Style,
    Flow,
    #[default]
    All,
}

option_enum!(PolishFocus, "polish focus", {
    Grammar => "grammar",
    Style => "style",
    Flow => "flow",
    All => "all",
});

/// Options shared by single, chapter and batch polishing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolishOptions {
    #[serde(default)]
    pub style: Option<PolishStyle>,
    #[serde(default)]
    pub focus: Option<PolishFocus>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolishRequest {
    pub text: String,
    #[serde(default)]
    pub style: Option<PolishStyle>,
    #[serde(default)]
    pub focus: Option<PolishFocus>,
    #[serde(default)]
    pub context: Option<String>,
}

impl PolishRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            focus: None,
            context: None,
        }
    }

    /// Build a request for `text` using shared batch/chapter options
    pub fn with_options(text: impl Into<String>, options: &PolishOptions) -> Self {
        Self {
            text: text.into(),
            style: options.style,
            focus: options.focus,
            context: options.context.clone(),
        }
    }
}

// =============================================================================
// Rewrite
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteTone {
    #[default]
    Serious,
    Humorous,
    Dramatic,
    Romantic,
}

option_enum!(RewriteTone, "rewrite tone", {
    Serious => "serious",
    Humorous => "humorous",
    Dramatic => "dramatic",
    Romantic => "romantic",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteLength {
    Shorter,
    Longer,
    #[default]
    Same,
}

option_enum!(RewriteLength, "rewrite length", {
    Shorter => "shorter",
    Longer => "longer",
    Same => "same",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    First,
    Third,
}

option_enum!(Perspective, "perspective", {
    First => "first",
    Third => "third",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub text: String,
    #[serde(default)]
    pub tone: Option<RewriteTone>,
    #[serde(default)]
    pub length: Option<RewriteLength>,
    #[serde(default)]
    pub perspective: Option<Perspective>,
    #[serde(default)]
    pub context: Option<String>,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
            length: None,
            perspective: None,
            context: None,
        }
    }
}

// =============================================================================
// Suggest
// =============================================================================

/// What a suggestion request should focus on.
///
/// `Grammar` and `Style` back the corresponding text-analysis facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Plot,
    Character,
    Dialogue,
    Description,
    Grammar,
    Style,
}

option_enum!(SuggestionKind, "suggestion type", {
    Plot => "plot",
    Character => "character",
    Dialogue => "dialogue",
    Description => "description",
    Grammar => "grammar",
    Style => "style",
});

impl SuggestionKind {
    /// Kinds a user may ask for directly; `Grammar` and `Style` stay internal to analysis.
    pub const REQUESTABLE: &'static [SuggestionKind] = &[
        SuggestionKind::Plot,
        SuggestionKind::Character,
        SuggestionKind::Dialogue,
        SuggestionKind::Description,
    ];

    /// Parse a user-supplied suggestion type, rejecting analysis-only kinds.
    pub fn parse_requestable(s: &str) -> Result<Self, String> {
        let kind: SuggestionKind = s.parse()?;
        if Self::REQUESTABLE.contains(&kind) {
            Ok(kind)
        } else {
            let valid: Vec<&str> = Self::REQUESTABLE.iter().map(|k| k.as_str()).collect();
            Err(format!(
                "Unknown suggestion type: {}. Valid values: {}",
                s,
                valid.join(", ")
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    #[serde(default)]
    pub context: Option<String>,
}

impl SuggestionRequest {
    pub fn new(text: impl Into<String>, kind: SuggestionKind) -> Self {
        Self {
            text: text.into(),
            kind,
            context: None,
        }
    }
}

// =============================================================================
// Analyze
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Any AI operation a caller can request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum AiOperationRequest {
    Polish(PolishRequest),
    Rewrite(RewriteRequest),
    Suggest(SuggestionRequest),
    Analyze(AnalyzeRequest),
}

impl AiOperationRequest {
    /// The text the operation acts on
    pub fn text(&self) -> &str {
        match self {
            Self::Polish(r) => &r.text,
            Self::Rewrite(r) => &r.text,
            Self::Suggest(r) => &r.text,
            Self::Analyze(r) => &r.text,
        }
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Polish(r) => r.context.as_deref(),
            Self::Rewrite(r) => r.context.as_deref(),
            Self::Suggest(r) => r.context.as_deref(),
            Self::Analyze(r) => r.context.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_from_str() {
        assert_eq!("Formal".parse::<PolishStyle>(), Ok(PolishStyle::Formal));
        assert_eq!("flow".parse::<PolishFocus>(), Ok(PolishFocus::Flow));
        assert_eq!("third".parse::<Perspective>(), Ok(Perspective::Third));
        let err = "gothic".parse::<RewriteTone>().unwrap_err();
        assert!(err.contains("serious, humorous, dramatic, romantic"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PolishStyle::default(), PolishStyle::Literary);
        assert_eq!(PolishFocus::default(), PolishFocus::All);
        assert_eq!(RewriteTone::default(), RewriteTone::Serious);
        assert_eq!(RewriteLength::default(), RewriteLength::Same);
    }

    #[test]
    fn test_operation_request_tagged() {
        let json = serde_json::json!({
            "operation": "suggest",
            "text": "She opened the door.",
            "type": "dialogue"
        });
        let request: AiOperationRequest = serde_json::from_value(json).unwrap();
        match &request {
            AiOperationRequest::Suggest(r) => assert_eq!(r.kind, SuggestionKind::Dialogue),
            other => panic!("unexpected request: {:?}", other),
        }
        assert_eq!(request.text(), "She opened the door.");
        assert_eq!(request.context(), None);
    }

    #[test]
    fn test_polish_with_options() {
        let options = PolishOptions {
            style: Some(PolishStyle::Modern),
            focus: None,
            context: Some("a ghost story".into()),
        };
        let request = PolishRequest::with_options("text", &options);
        assert_eq!(request.style, Some(PolishStyle::Modern));
        assert_eq!(request.context.as_deref(), Some("a ghost story"));
    }

    #[test]
    fn test_requestable_suggestion_kinds() {
        assert_eq!(
            SuggestionKind::parse_requestable("Dialogue").unwrap(),
            SuggestionKind::Dialogue
        );

        let err = SuggestionKind::parse_requestable("grammar").unwrap_err();
        assert!(err.contains("plot, character, dialogue, description"));
        assert!(!err.contains("style"));
        assert!(SuggestionKind::parse_requestable("style").is_err());
        assert!(SuggestionKind::parse_requestable("poetry").is_err());
    }
}
