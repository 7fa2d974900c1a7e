//! Settings type definitions.

use std::path::{Path, PathBuf};

use intent_core::constants::DEFAULT_SIDECAR_DIR;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Governance configuration.
///
/// All field names are camelCase on the wire and every field has a default,
/// so partial JSON is accepted:
///
/// ```json
/// { "reasoningLoopEnabled": true, "approvalTimeoutMs": 60000 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernanceSettings {
    /// Governed mode. When off, only ledgering of mutating tools runs.
    pub reasoning_loop_enabled: bool,
    /// Sidecar directory name under the workspace root.
    pub sidecar_dir: String,
    /// Ledger entries pulled into an intent context.
    pub recent_history_limit: usize,
    /// How many of those entries are summarized in the rendered document.
    pub history_summary_limit: usize,
    /// Approval wait limit; an unanswered prompt counts as a rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_timeout_ms: Option<u64>,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            reasoning_loop_enabled: false,
            sidecar_dir: DEFAULT_SIDECAR_DIR.to_string(),
            recent_history_limit: 20,
            history_summary_limit: 10,
            approval_timeout_ms: None,
        }
    }
}

impl GovernanceSettings {
    /// Builder: turn governed mode on or off.
    #[must_use]
    pub fn with_reasoning_loop(mut self, enabled: bool) -> Self {
        self.reasoning_loop_enabled = enabled;
        self
    }

    /// Sidecar directory for a workspace.
    #[must_use]
    pub fn sidecar_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.sidecar_dir)
    }

    /// Reject values that cannot be honored.
    pub fn validate(&self) -> Result<()> {
        let dir = self.sidecar_dir.trim();
        if dir.is_empty() {
            return Err(SettingsError::InvalidValue("sidecarDir must not be empty".into()));
        }
        if Path::new(dir).is_absolute() || dir.split(['/', '\\']).any(|part| part == "..") {
            return Err(SettingsError::InvalidValue(format!(
                "sidecarDir must stay inside the workspace: {dir}"
            )));
        }
        if self.history_summary_limit > self.recent_history_limit {
            return Err(SettingsError::InvalidValue(format!(
                "historySummaryLimit ({}) exceeds recentHistoryLimit ({})",
                self.history_summary_limit, self.recent_history_limit
            )));
        }
        Ok(())
    }
}
