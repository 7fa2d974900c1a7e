//! Trace ledger: `agent_trace.jsonl`.
//!
//! One JSON entry per line, appended under the workspace writer lock and
//! never rewritten. Ledger failures are logged and swallowed so that an
//! audit problem never blocks the agent's work.

use intent_core::trace::TraceEntry;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::{Result, StoreError};
use crate::locks::lock_workspace;
use crate::paths::SidecarPaths;

/// Append an entry. Failures are logged as warnings.
pub async fn append_trace_entry(paths: &SidecarPaths, entry: &TraceEntry) {
    if let Err(err) = try_append_trace_entry(paths, entry).await {
        warn!(error = %err, entry_id = %entry.id, "failed to append agent trace");
    }
}

/// Strict variant of [`append_trace_entry`].
pub async fn try_append_trace_entry(paths: &SidecarPaths, entry: &TraceEntry) -> Result<()> {
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');

    let _guard = lock_workspace(paths.dir()).await;
    tokio::fs::create_dir_all(paths.dir())
        .await
        .map_err(|e| StoreError::io(paths.dir(), e))?;

    let path = paths.agent_trace();
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .map_err(|e| StoreError::io(&path, e))?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| StoreError::io(&path, e))?;
    file.flush().await.map_err(|e| StoreError::io(&path, e))?;

    debug!(entry_id = %entry.id, intent_id = ?entry.intent_id, "appended trace entry");
    Ok(())
}

/// Up to `limit` most recent entries for `intent_id`, newest first.
///
/// Lines are scanned newest first until `limit` matches are found. A missing
/// or unreadable file yields an empty list, as does a malformed line reached
/// by the scan.
pub async fn recent_for_intent(paths: &SidecarPaths, intent_id: &str, limit: usize) -> Vec<TraceEntry> {
    match try_recent_for_intent(paths, intent_id, limit).await {
        Ok(entries) => entries,
        Err(err) => {
            if !err.is_not_found() {
                warn!(error = %err, "unreadable agent trace, returning no history");
            }
            Vec::new()
        }
    }
}

/// Strict variant of [`recent_for_intent`].
pub async fn try_recent_for_intent(
    paths: &SidecarPaths,
    intent_id: &str,
    limit: usize,
) -> Result<Vec<TraceEntry>> {
    let path = paths.agent_trace();
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| StoreError::io(&path, e))?;

    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let mut entries = Vec::new();
    for &(index, line) in lines.iter().rev() {
        if entries.len() >= limit {
            break;
        }
        let ledger_err = |source| StoreError::Ledger {
            path: path.clone(),
            line: index + 1,
            source,
        };
        let value: Value = serde_json::from_str(line).map_err(ledger_err)?;
        if value.get("intent_id").and_then(Value::as_str) != Some(intent_id) {
            continue;
        }
        entries.push(serde_json::from_value(value).map_err(ledger_err)?);
    }
    Ok(entries)
}
