//! Governance engine.
//!
//! Wraps one tool call: pre-checks, execution, post-checks. The registry and
//! ignore list are re-read on every call so edits to the sidecar files take
//! effect on the very next tool call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use intent_core::errors::ToolErrorPayload;
use intent_core::intent::{IntentSpec, find_intent};
use intent_core::tools::ToolCall;
use intent_core::trace::{TraceEntry, TraceEntryParams};
use intent_settings::GovernanceSettings;
use intent_store::{
    SidecarPaths, add_path_to_intent_map, append_trace_entry, load_active_intents,
    load_intentignore,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::approval::{ApprovalChannel, ApprovalDecision, ApprovalRequest};
use crate::scope::path_matches_owned_scope;
use crate::session::GovernedSession;

/// Outcome of a governed call.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict<T> {
    /// All checks passed and the action ran.
    Executed(T),
    /// A pre-check blocked the call; the action never ran.
    Vetoed(ToolErrorPayload),
}

impl<T> Verdict<T> {
    /// Whether the action ran.
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    /// The veto payload, if blocked.
    pub fn veto(&self) -> Option<&ToolErrorPayload> {
        match self {
            Self::Vetoed(payload) => Some(payload),
            Self::Executed(_) => None,
        }
    }
}

/// Intent-scoped governance around agent tool calls.
pub struct GovernanceEngine {
    settings: GovernanceSettings,
    approval: Arc<dyn ApprovalChannel>,
}

impl GovernanceEngine {
    /// Create an engine.
    pub fn new(settings: GovernanceSettings, approval: Arc<dyn ApprovalChannel>) -> Self {
        Self { settings, approval }
    }

    /// Active settings.
    pub fn settings(&self) -> &GovernanceSettings {
        &self.settings
    }

    /// Sidecar paths for the session's workspace, when one is known.
    pub fn sidecar_paths(&self, session: &GovernedSession) -> Option<SidecarPaths> {
        session
            .workspace_root()
            .map(|root| SidecarPaths::new(root, &self.settings.sidecar_dir))
    }

    /// Decode a raw invocation, then [`govern`](Self::govern) it.
    ///
    /// Malformed arguments are read as absent fields, so they surface as
    /// vetoes from the pre-checks rather than as errors.
    pub async fn govern_invocation<F, Fut, T, E>(
        &self,
        session: &GovernedSession,
        tool_name: &str,
        arguments: Value,
        execute: F,
    ) -> Result<Verdict<T>, E>
    where
        F: FnOnce(ToolCall) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let call = ToolCall::from_invocation(tool_name, arguments);
        self.govern(session, &call, || execute(call.clone())).await
    }

    /// Run the pre-checks, then `execute`, then the post-checks.
    ///
    /// A veto increments the session's mistake counter, reports the payload
    /// as an error result, and returns [`Verdict::Vetoed`] without running
    /// `execute`. Errors from `execute` are returned unchanged and skip the
    /// post-checks.
    #[instrument(skip_all, fields(tool = call.name(), intent_id = ?session.current_intent()))]
    pub async fn govern<F, Fut, T, E>(
        &self,
        session: &GovernedSession,
        call: &ToolCall,
        execute: F,
    ) -> Result<Verdict<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(payload) = self.pre_check(session, call).await {
            let mistakes = session.record_mistake();
            debug!(code = %payload.code, mistakes, "tool call vetoed");
            session.report(payload.to_json(), true);
            return Ok(Verdict::Vetoed(payload));
        }

        let output = execute().await?;
        self.post_check(session, call).await;
        Ok(Verdict::Executed(output))
    }

    /// Evaluate the pre-check pipeline without side effects on the session.
    /// Returns the first veto, or `None` when the call may proceed.
    pub async fn pre_check(
        &self,
        session: &GovernedSession,
        call: &ToolCall,
    ) -> Option<ToolErrorPayload> {
        if !self.settings.reasoning_loop_enabled {
            return None;
        }
        let paths = self.sidecar_paths(session);
        let current = session.current_intent();

        // Loaded lazily: select_active_intent never reads it.
        let mut registry: Option<Vec<IntentSpec>> = None;

        // 1. Gatekeeper
        if !call.is_intent_selection() {
            let Some(intent_id) = current.as_deref() else {
                debug!("no intent selected");
                return Some(ToolErrorPayload::intent_invalid());
            };
            let intents = registry.insert(load_registry(paths.as_ref()).await);
            if find_intent(intents, intent_id).is_none() {
                debug!(intent_id, "selected intent not in registry");
                return Some(ToolErrorPayload::intent_invalid());
            }
        }

        if !call.is_destructive() {
            return None;
        }

        // 2. Ignore list
        if let (Some(intent_id), Some(paths)) = (current.as_deref(), paths.as_ref()) {
            if load_intentignore(paths).await.contains(intent_id) {
                return Some(ToolErrorPayload::intent_ignored(intent_id));
            }
        }

        // 3. Scope
        if let (Some(intent_id), Some(target)) = (current.as_deref(), call.scope_path()) {
            if registry.is_none() {
                registry = Some(load_registry(paths.as_ref()).await);
            }
            let owned_scope = registry
                .as_deref()
                .and_then(|intents| find_intent(intents, intent_id))
                .map(|spec| spec.owned_scope.as_slice())
                .unwrap_or_default();
            if owned_scope.is_empty() {
                debug!(intent_id, "intent has no owned scope, scope check skipped");
            } else if !path_matches_owned_scope(target, owned_scope) {
                return Some(ToolErrorPayload::scope_violation(intent_id, target));
            }
        }

        // 4. Mutation class
        if call.requires_mutation_class() && call.declared_mutation_class().is_none() {
            return Some(ToolErrorPayload::mutation_class_required());
        }

        // 5. Human approval
        let request = ApprovalRequest {
            tool: call.name().to_string(),
            path: call.target_path().map(str::to_string),
            intent_id: current,
        };
        let decision = self.request_approval(&request).await;
        if decision == ApprovalDecision::Approved {
            return None;
        }
        Some(ToolErrorPayload::user_rejected(decision.rejection_message()))
    }

    async fn request_approval(&self, request: &ApprovalRequest) -> ApprovalDecision {
        let pending = self.approval.request(request);
        match self.settings.approval_timeout_ms {
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), pending).await {
                Ok(decision) => decision,
                Err(_) => {
                    warn!(tool = %request.tool, timeout_ms = ms, "approval timed out");
                    ApprovalDecision::Dismissed
                }
            },
            None => pending.await,
        }
    }

    /// Ledger the mutation and, in governed mode, update the intent map.
    ///
    /// Runs for mutating calls whenever a workspace root is known, even with
    /// governance off. Storage failures are logged and swallowed.
    pub async fn post_check(&self, session: &GovernedSession, call: &ToolCall) {
        if !call.is_mutating() {
            return;
        }
        let Some(paths) = self.sidecar_paths(session) else {
            return;
        };

        let intent_id = call
            .declared_intent_id()
            .map(str::to_string)
            .or_else(|| session.current_intent());
        let relative_path = call.target_path();

        if let (Some(path), Some(content)) = (relative_path, call.content_for_hash()) {
            let entry = TraceEntry::build(TraceEntryParams {
                intent_id: intent_id.clone(),
                relative_path: path.to_string(),
                content: content.to_string(),
                mutation_class: Some(call.declared_mutation_class().unwrap_or_default()),
                session_log_id: Some(session.session_id().to_string()),
                model_id: session.model_id().map(str::to_string),
                ..TraceEntryParams::default()
            });
            append_trace_entry(&paths, &entry).await;
        }

        if !self.settings.reasoning_loop_enabled {
            return;
        }
        if let (Some(intent_id), Some(path)) = (intent_id.as_deref(), relative_path) {
            let intents = load_active_intents(&paths).await;
            let name = find_intent(&intents, intent_id).and_then(IntentSpec::display_name);
            add_path_to_intent_map(&paths, intent_id, name, path).await;
        }
    }
}

async fn load_registry(paths: Option<&SidecarPaths>) -> Vec<IntentSpec> {
    match paths {
        Some(paths) => load_active_intents(paths).await,
        None => Vec::new(),
    }
}
