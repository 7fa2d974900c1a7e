//! Governed session state.
//!
//! Each agent task owns one [`GovernedSession`] and passes it into every
//! governance call. The selected intent and mistake counter live here, not
//! in process-wide state, so concurrent sessions on the same workspace
//! cannot see each other's selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use intent_core::ids::SessionId;
use intent_core::tools::{ToolResult, text_result};
use parking_lot::Mutex;

/// Sink for results pushed back to the agent.
pub trait ResultReporter: Send + Sync {
    /// Deliver one result.
    fn report(&self, result: ToolResult);
}

/// A reporter that keeps every result in memory.
#[derive(Default)]
pub struct RecordingReporter {
    results: Mutex<Vec<ToolResult>>,
}

impl RecordingReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All results reported so far.
    pub fn results(&self) -> Vec<ToolResult> {
        self.results.lock().clone()
    }

    /// The most recent result.
    pub fn last(&self) -> Option<ToolResult> {
        self.results.lock().last().cloned()
    }
}

impl ResultReporter for RecordingReporter {
    fn report(&self, result: ToolResult) {
        self.results.lock().push(result);
    }
}

#[derive(Default)]
struct SessionState {
    current_intent_id: Option<String>,
    consecutive_mistakes: u32,
}

struct SessionInner {
    session_id: SessionId,
    model_id: Option<String>,
    workspace_root: Option<PathBuf>,
    reporter: Arc<dyn ResultReporter>,
    state: Mutex<SessionState>,
}

/// Per-task governance context. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct GovernedSession {
    inner: Arc<SessionInner>,
}

impl GovernedSession {
    /// Create a session. An empty root counts as unknown.
    pub fn new(workspace_root: Option<PathBuf>, reporter: Arc<dyn ResultReporter>) -> Self {
        let workspace_root = workspace_root.filter(|root| !root.as_os_str().is_empty());
        Self {
            inner: Arc::new(SessionInner {
                session_id: SessionId::new(),
                model_id: None,
                workspace_root,
                reporter,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// Builder: set the session ID (recorded as the ledger conversation URL).
    #[must_use]
    pub fn with_session_id(self, session_id: SessionId) -> Self {
        self.rebuild(|inner| inner.session_id = session_id)
    }

    /// Builder: set the model identifier recorded in the ledger.
    #[must_use]
    pub fn with_model_id(self, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        self.rebuild(|inner| inner.model_id = Some(model_id))
    }

    fn rebuild(self, apply: impl FnOnce(&mut SessionInner)) -> Self {
        let mut inner = match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner,
            Err(shared) => {
                let (current_intent_id, consecutive_mistakes) = {
                    let state = shared.state.lock();
                    (state.current_intent_id.clone(), state.consecutive_mistakes)
                };
                SessionInner {
                    session_id: shared.session_id.clone(),
                    model_id: shared.model_id.clone(),
                    workspace_root: shared.workspace_root.clone(),
                    reporter: Arc::clone(&shared.reporter),
                    state: Mutex::new(SessionState {
                        current_intent_id,
                        consecutive_mistakes,
                    }),
                }
            }
        };
        apply(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    /// Model identifier, when known.
    #[must_use]
    pub fn model_id(&self) -> Option<&str> {
        self.inner.model_id.as_deref()
    }

    /// Workspace root, when known.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.inner.workspace_root.as_deref()
    }

    /// Currently selected intent, if any.
    pub fn current_intent(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .current_intent_id
            .clone()
            .filter(|id| !id.is_empty())
    }

    /// Select an intent. Surrounding whitespace is dropped so the
    /// gatekeeper sees the same ID the registry holds.
    pub fn select_intent(&self, intent_id: impl Into<String>) {
        let intent_id = intent_id.into();
        self.inner.state.lock().current_intent_id = Some(intent_id.trim().to_string());
    }

    /// Drop the current selection.
    pub fn clear_intent(&self) {
        self.inner.state.lock().current_intent_id = None;
    }

    /// Consecutive mistakes since the last successful selection.
    pub fn consecutive_mistakes(&self) -> u32 {
        self.inner.state.lock().consecutive_mistakes
    }

    /// Increment the mistake counter and return the new value.
    pub fn record_mistake(&self) -> u32 {
        let mut state = self.inner.state.lock();
        state.consecutive_mistakes = state.consecutive_mistakes.saturating_add(1);
        state.consecutive_mistakes
    }

    /// Reset the mistake counter to zero.
    pub fn reset_mistakes(&self) {
        self.inner.state.lock().consecutive_mistakes = 0;
    }

    /// Push a result to the agent.
    pub fn report(&self, content: impl Into<String>, is_error: bool) {
        self.inner.reporter.report(text_result(content, is_error));
    }
}

impl std::fmt::Debug for GovernedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernedSession")
            .field("session_id", &self.inner.session_id)
            .field("workspace_root", &self.inner.workspace_root)
            .field("current_intent", &self.current_intent())
            .field("consecutive_mistakes", &self.consecutive_mistakes())
            .finish_non_exhaustive()
    }
}
