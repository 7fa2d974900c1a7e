//! Sidecar file locations for one workspace.

use std::path::{Path, PathBuf};

use intent_core::constants::{
    ACTIVE_INTENTS_FILENAME, AGENT_TRACE_FILENAME, DEFAULT_SIDECAR_DIR, INTENT_MAP_FILENAME,
    INTENTIGNORE_FILENAME,
};

/// Resolved sidecar paths for a workspace root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidecarPaths {
    root: PathBuf,
    dir: PathBuf,
}

impl SidecarPaths {
    /// Sidecar directory `sidecar_dir` under `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>, sidecar_dir: impl AsRef<Path>) -> Self {
        let root = workspace_root.into();
        let dir = root.join(sidecar_dir);
        Self { root, dir }
    }

    /// The default `.orchestration` sidecar directory.
    pub fn with_default_dir(workspace_root: impl Into<PathBuf>) -> Self {
        Self::new(workspace_root, DEFAULT_SIDECAR_DIR)
    }

    /// Workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sidecar directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `active_intents.yaml` inside the sidecar directory.
    #[must_use]
    pub fn active_intents(&self) -> PathBuf {
        self.dir.join(ACTIVE_INTENTS_FILENAME)
    }

    /// Legacy `active_intents.yaml` at the workspace root.
    #[must_use]
    pub fn legacy_active_intents(&self) -> PathBuf {
        self.root.join(ACTIVE_INTENTS_FILENAME)
    }

    /// `.intentignore`.
    #[must_use]
    pub fn intentignore(&self) -> PathBuf {
        self.dir.join(INTENTIGNORE_FILENAME)
    }

    /// `agent_trace.jsonl`.
    #[must_use]
    pub fn agent_trace(&self) -> PathBuf {
        self.dir.join(AGENT_TRACE_FILENAME)
    }

    /// `intent_map.md`.
    #[must_use]
    pub fn intent_map(&self) -> PathBuf {
        self.dir.join(INTENT_MAP_FILENAME)
    }
}
