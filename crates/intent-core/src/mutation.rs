//! Semantic classification of a mutation.

use serde::{Deserialize, Serialize};

/// What kind of change a mutation represents.
///
/// Whole-file writes must declare one when governance is active; every other
/// mutation defaults to [`MutationClass::IntentEvolution`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationClass {
    /// Syntax-level change that keeps the same intent (refactor).
    AstRefactor,
    /// New behavior in service of the intent (feature).
    #[default]
    IntentEvolution,
}

impl MutationClass {
    /// Wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AstRefactor => "AST_REFACTOR",
            Self::IntentEvolution => "INTENT_EVOLUTION",
        }
    }

    /// Parse a declared value. Surrounding whitespace is ignored; anything
    /// other than the two wire values yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "AST_REFACTOR" => Some(Self::AstRefactor),
            "INTENT_EVOLUTION" => Some(Self::IntentEvolution),
            _ => None,
        }
    }

    /// All variants.
    #[must_use]
    pub fn all() -> &'static [MutationClass] {
        &[Self::AstRefactor, Self::IntentEvolution]
    }
}

impl std::fmt::Display for MutationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
