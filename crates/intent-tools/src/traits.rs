//! The trait every governance-owned tool implements.

use async_trait::async_trait;
use intent_core::tools::{Tool, ToolResult};
use intent_hooks::GovernedSession;
use serde_json::Value;

/// A tool implemented by the governance layer rather than the host.
///
/// Each tool provides:
/// - **Schema** via [`definition()`](IntentTool::definition), sent to the model
/// - **Execution** via [`execute()`](IntentTool::execute), invoked with raw JSON arguments
#[async_trait]
pub trait IntentTool: Send + Sync {
    /// Tool name, the exact string sent to and from the model.
    fn name(&self) -> &str;

    /// Generate the [`Tool`] schema for the model.
    fn definition(&self) -> Tool;

    /// Execute against a session. The result is also pushed to the session's
    /// reporter.
    async fn execute(&self, params: Value, session: &GovernedSession) -> ToolResult;
}
