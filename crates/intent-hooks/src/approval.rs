//! Human approval channel.
//!
//! The channel is whatever UI the host uses to ask a person about a
//! destructive call. Only an explicit [`ApprovalDecision::Approved`] lets the
//! call through.

use async_trait::async_trait;

/// What the human is asked to approve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalRequest {
    /// Tool being invoked.
    pub tool: String,
    /// Target path, when the tool has one.
    pub path: Option<String>,
    /// Selected intent, if any.
    pub intent_id: Option<String>,
}

impl ApprovalRequest {
    /// Prompt text, e.g. `Allow this change? write_to_file → src/a.ts (Intent: INT-1)`.
    #[must_use]
    pub fn description(&self) -> String {
        let mut text = format!("Allow this change? {}", self.tool);
        if let Some(path) = &self.path {
            text.push_str(" → ");
            text.push_str(path);
        }
        if let Some(intent_id) = &self.intent_id {
            text.push_str(" (Intent: ");
            text.push_str(intent_id);
            text.push(')');
        }
        text
    }
}

/// The human's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Go ahead.
    Approved,
    /// Explicit rejection, optionally with feedback for the agent.
    Rejected {
        /// Free-text feedback.
        feedback: Option<String>,
    },
    /// No answer: prompt dismissed or timed out.
    Dismissed,
}

impl ApprovalDecision {
    /// Message carried by the `USER_REJECTED` veto. `None` for approvals and
    /// for dismissals (which use the default rejection text).
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { feedback } => {
                Some(feedback.as_deref().unwrap_or("User rejected the operation."))
            }
            Self::Approved | Self::Dismissed => None,
        }
    }
}

/// Interactive approval surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApprovalChannel: Send + Sync {
    /// Ask a human. Blocks the pipeline until an answer arrives.
    async fn request(&self, request: &ApprovalRequest) -> ApprovalDecision;
}
