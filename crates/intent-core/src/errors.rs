//! Governance veto payloads.
//!
//! A [`ToolErrorPayload`] is a *value* pushed back to the agent as an error
//! tool result, never a Rust error. Every payload carries a `suggestion` so
//! an autonomous caller can self-correct.

use serde::{Deserialize, Serialize};

/// Machine-readable veto code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorCode {
    /// Target path is outside the selected intent's owned scope.
    ScopeViolation,
    /// No intent has been selected.
    IntentRequired,
    /// The selected intent is missing or not in the registry.
    IntentInvalid,
    /// The selected intent is frozen by the ignore list.
    IntentIgnored,
    /// A human declined the operation.
    UserRejected,
    /// A whole-file write did not declare a valid mutation class.
    MutationClassRequired,
}

impl ToolErrorCode {
    /// Wire value, e.g. `SCOPE_VIOLATION`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScopeViolation => "SCOPE_VIOLATION",
            Self::IntentRequired => "INTENT_REQUIRED",
            Self::IntentInvalid => "INTENT_INVALID",
            Self::IntentIgnored => "INTENT_IGNORED",
            Self::UserRejected => "USER_REJECTED",
            Self::MutationClassRequired => "MUTATION_CLASS_REQUIRED",
        }
    }

    /// Short snake-case label used in the payload's `error` field.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ScopeViolation => "scope_violation",
            Self::IntentRequired => "intent_required",
            Self::IntentInvalid => "intent_invalid",
            Self::IntentIgnored => "intent_ignored",
            Self::UserRejected => "user_rejected",
            Self::MutationClassRequired => "mutation_class_required",
        }
    }
}

impl std::fmt::Display for ToolErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured veto returned to the agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolErrorPayload {
    /// Snake-case label of the code.
    pub error: String,
    /// Machine-readable code.
    pub code: ToolErrorCode,
    /// Human-readable explanation.
    pub message: String,
    /// Intent involved, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
    /// Path involved, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// What the agent should do next.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ToolErrorPayload {
    fn new(code: ToolErrorCode, message: impl Into<String>, suggestion: &str) -> Self {
        Self {
            error: code.label().to_string(),
            code,
            message: message.into(),
            intent_id: None,
            path: None,
            suggestion: Some(suggestion.to_string()),
        }
    }

    /// Target path is outside the intent's owned scope.
    #[must_use]
    pub fn scope_violation(intent_id: &str, path: &str) -> Self {
        let mut payload = Self::new(
            ToolErrorCode::ScopeViolation,
            format!(
                "Scope Violation: {intent_id} is not authorized to edit {path}. Request scope expansion."
            ),
            "Either choose a file within the intent's owned_scope or ask the user to expand the intent scope in .orchestration/active_intents.yaml",
        );
        payload.intent_id = Some(intent_id.to_string());
        payload.path = Some(path.to_string());
        payload
    }

    /// Gatekeeper: no intent selected, or the selected ID is not in the registry.
    #[must_use]
    pub fn intent_invalid() -> Self {
        Self::new(
            ToolErrorCode::IntentInvalid,
            "You must cite a valid active Intent ID.",
            "Call select_active_intent(intent_id) with an intent_id from .orchestration/active_intents.yaml",
        )
    }

    /// No intent has been selected yet.
    #[must_use]
    pub fn intent_required() -> Self {
        Self::new(
            ToolErrorCode::IntentRequired,
            "You must cite a valid active Intent ID. Call select_active_intent(intent_id) first to load context before using other tools.",
            "Call select_active_intent with an intent_id from .orchestration/active_intents.yaml",
        )
    }

    /// The intent is frozen by `.intentignore`.
    #[must_use]
    pub fn intent_ignored(intent_id: &str) -> Self {
        let mut payload = Self::new(
            ToolErrorCode::IntentIgnored,
            format!(
                "Intent {intent_id} is listed in .intentignore. Changes to this intent are excluded."
            ),
            "Choose a different intent or ask the user to remove this intent from .intentignore",
        );
        payload.intent_id = Some(intent_id.to_string());
        payload
    }

    /// A human declined. `feedback` replaces the default message when given.
    #[must_use]
    pub fn user_rejected(feedback: Option<&str>) -> Self {
        Self::new(
            ToolErrorCode::UserRejected,
            feedback.unwrap_or("The user rejected this operation."),
            "Adjust your approach and retry, or ask the user for guidance",
        )
    }

    /// A whole-file write is missing a valid mutation class.
    #[must_use]
    pub fn mutation_class_required() -> Self {
        Self::new(
            ToolErrorCode::MutationClassRequired,
            "write_to_file requires mutation_class: use AST_REFACTOR (syntax change, same intent) or INTENT_EVOLUTION (new feature).",
            "Call write_to_file with mutation_class set to AST_REFACTOR or INTENT_EVOLUTION",
        )
    }

    /// Serialize to the JSON string sent to the agent.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

impl std::fmt::Display for ToolErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
