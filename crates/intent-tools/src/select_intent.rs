//! `select_active_intent`: the handshake that precedes any governed work.
//!
//! The agent cites an intent ID; a valid one becomes the session's selected
//! intent and the agent receives that intent's context document. Invalid
//! citations count as mistakes but are not errors, so the agent can simply
//! retry with one of the listed IDs.

use async_trait::async_trait;
use intent_core::constants::{ACTIVE_INTENTS_FILENAME, SELECT_ACTIVE_INTENT};
use intent_core::intent::valid_intent_ids;
use intent_core::tools::{SelectActiveIntentArgs, Tool, ToolResult, text_result};
use intent_hooks::GovernedSession;
use intent_settings::GovernanceSettings;
use intent_store::{SidecarPaths, build_intent_context, load_active_intents, render_intent_context};
use serde_json::Value;
use tracing::{debug, info};

use crate::schema::{ToolSchemaBuilder, intent_id_property};
use crate::traits::IntentTool;

const INVALID_INTENT: &str = "You must cite a valid active Intent ID.";

/// The intent-selection tool.
pub struct SelectActiveIntentTool {
    settings: GovernanceSettings,
}

impl SelectActiveIntentTool {
    /// Create the tool. The sidecar location and history limits come from
    /// `settings`.
    pub fn new(settings: GovernanceSettings) -> Self {
        Self { settings }
    }

    fn sidecar_paths(&self, session: &GovernedSession) -> Option<SidecarPaths> {
        session
            .workspace_root()
            .map(|root| SidecarPaths::new(root, &self.settings.sidecar_dir))
    }

    async fn select(&self, params: Value, session: &GovernedSession) -> ToolResult {
        // Non-string or missing IDs decode to blank.
        let args: SelectActiveIntentArgs = serde_json::from_value(params).unwrap_or_default();
        let intent_id = args.intent_id.as_deref().unwrap_or_default().trim();

        if intent_id.is_empty() {
            let mistakes = session.record_mistake();
            debug!(mistakes, "blank intent id");
            return text_result(INVALID_INTENT, false);
        }

        let paths = self.sidecar_paths(session);
        let context = match paths.as_ref() {
            Some(paths) => {
                build_intent_context(paths, intent_id, self.settings.recent_history_limit).await
            }
            None => None,
        };

        let Some(context) = context else {
            let mistakes = session.record_mistake();
            let intents = match paths.as_ref() {
                Some(paths) => load_active_intents(paths).await,
                None => Vec::new(),
            };
            let valid = valid_intent_ids(&intents);
            debug!(intent_id, mistakes, known = valid.len(), "unknown intent id");
            let hint = if valid.is_empty() {
                format!(
                    " No intents in {}/{ACTIVE_INTENTS_FILENAME}.",
                    self.settings.sidecar_dir
                )
            } else {
                format!(" Valid IDs: {}", valid.join(", "))
            };
            return text_result(format!("{INVALID_INTENT}{hint}"), false);
        };

        session.reset_mistakes();
        session.select_intent(intent_id);
        info!(intent_id, history = context.recent_history.len(), "intent selected");
        text_result(
            render_intent_context(&context, self.settings.history_summary_limit),
            false,
        )
    }
}

#[async_trait]
impl IntentTool for SelectActiveIntentTool {
    fn name(&self) -> &str {
        SELECT_ACTIVE_INTENT
    }

    fn definition(&self) -> Tool {
        ToolSchemaBuilder::new(
            SELECT_ACTIVE_INTENT,
            "Load the context for an active intent before proceeding. You MUST call this tool \
first with a valid intent_id from the active intents list. Do not write code or use other tools \
until you have received the intent context.\n\n\
Parameters:\n\
- intent_id: (required) The ID of the active intent to load. Must match an entry in \
.orchestration/active_intents.yaml.\n\n\
Example: Loading context for a specific intent\n\
{ \"intent_id\": \"fix-login-bug\" }",
        )
        .required_property("intent_id", intent_id_property())
        .additional_properties(false)
        .build()
    }

    async fn execute(&self, params: Value, session: &GovernedSession) -> ToolResult {
        let result = self.select(params, session).await;
        session.report(result.content.clone(), result.is_error);
        result
    }
}
