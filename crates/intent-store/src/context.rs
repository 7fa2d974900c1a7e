//! Intent context builder.
//!
//! Composes the registry entry and recent ledger activity for one intent
//! into the `<intent_context>` document the agent receives when it selects
//! that intent. This document is how an agent learns its declared
//! boundaries.

use std::fmt::Write as _;

use intent_core::intent::{IntentSpec, find_intent};
use intent_core::trace::TraceEntry;
use serde::Serialize;

use crate::active_intents::load_active_intents;
use crate::agent_trace::recent_for_intent;
use crate::paths::SidecarPaths;

/// Everything known about one intent, in structured form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntentContext {
    /// The registry entry.
    pub intent: IntentSpec,
    /// Legacy scope description, trimmed (empty when absent).
    pub scope: String,
    /// Ownership globs.
    pub owned_scope: Vec<String>,
    /// Rules the agent must follow.
    pub constraints: Vec<String>,
    /// Definition of done.
    pub acceptance_criteria: Vec<String>,
    /// Files the intent is expected to touch (the owned scope patterns).
    pub related_files: Vec<String>,
    /// Recent ledger entries for this intent, newest first.
    pub recent_history: Vec<TraceEntry>,
}

/// Build the context for `intent_id`, or `None` if it is not in the registry.
pub async fn build_intent_context(
    paths: &SidecarPaths,
    intent_id: &str,
    history_limit: usize,
) -> Option<IntentContext> {
    let intents = load_active_intents(paths).await;
    let intent = find_intent(&intents, intent_id)?.clone();
    let recent_history = recent_for_intent(paths, intent.id.as_str(), history_limit).await;

    Some(IntentContext {
        scope: intent.legacy_scope().unwrap_or_default().to_string(),
        owned_scope: intent.owned_scope.clone(),
        constraints: intent.constraints.clone(),
        acceptance_criteria: intent.acceptance_criteria.clone(),
        related_files: intent.owned_scope.clone(),
        recent_history,
        intent,
    })
}

/// Render the `<intent_context>` document.
///
/// At most `summary_limit` history entries are summarized, each as
/// `timestamp path, path`, joined with `; `.
#[must_use]
pub fn render_intent_context(context: &IntentContext, summary_limit: usize) -> String {
    let intent = &context.intent;
    let mut out = String::from("<intent_context>\n");

    if let Some(name) = intent.display_name() {
        let _ = writeln!(out, "  <name>{}</name>", escape_xml(name));
    }
    if let Some(status) = intent.display_status() {
        let _ = writeln!(out, "  <status>{}</status>", escape_xml(status));
    }
    push_list(&mut out, "owned_scope", &context.owned_scope);
    if !context.scope.is_empty() {
        let _ = writeln!(out, "  <scope>{}</scope>", escape_xml(&context.scope));
    }
    push_list(&mut out, "constraints", &context.constraints);
    push_list(&mut out, "acceptance_criteria", &context.acceptance_criteria);
    push_list(&mut out, "related_files", &context.related_files);

    let summary = context
        .recent_history
        .iter()
        .take(summary_limit)
        .map(|entry| {
            let files: Vec<&str> = entry.touched_paths().collect();
            format!("{} {}", entry.timestamp, files.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");
    if !summary.is_empty() {
        let _ = writeln!(out, "  <recent_history>{}</recent_history>", escape_xml(&summary));
    }

    out.push_str("</intent_context>");
    out
}

fn push_list(out: &mut String, tag: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  <{tag}>");
    for item in items {
        let _ = writeln!(out, "    - {}", escape_xml(item));
    }
    let _ = writeln!(out, "  </{tag}>");
}

/// Escape text for embedding in the context document.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
