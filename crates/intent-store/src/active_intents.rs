//! Intent registry reader.
//!
//! The registry is re-read on every call so edits take effect on the next
//! tool call. Two top-level shapes are accepted: `active_intents: [...]` and
//! the legacy `intents: [...]`. Entries without a string `id` are dropped.

use std::path::Path;

use intent_core::intent::{self, IntentSpec};
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::errors::{Result, StoreError};
use crate::paths::SidecarPaths;

/// Load the registry: sidecar copy first, then the legacy root copy.
///
/// Missing or unparseable files yield an empty list.
pub async fn load_active_intents(paths: &SidecarPaths) -> Vec<IntentSpec> {
    match try_load_registry(&paths.active_intents()).await {
        Ok(intents) => intents,
        Err(primary) => {
            if !primary.is_not_found() {
                warn!(error = %primary, "unreadable intent registry, trying legacy location");
            }
            match try_load_registry(&paths.legacy_active_intents()).await {
                Ok(intents) => intents,
                Err(err) => {
                    if !err.is_not_found() {
                        warn!(error = %err, "unreadable legacy intent registry");
                    }
                    debug!("no intent registry found");
                    Vec::new()
                }
            }
        }
    }
}

/// Read and parse one registry file.
pub async fn try_load_registry(path: &Path) -> Result<Vec<IntentSpec>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    parse_active_intents(&content).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// IDs of the loaded registry, in order, skipping empty ones.
pub async fn valid_intent_ids(paths: &SidecarPaths) -> Vec<String> {
    intent::valid_intent_ids(&load_active_intents(paths).await)
}

/// Parse registry YAML.
///
/// An empty document, a missing list, or a list of the wrong type all parse
/// to an empty registry.
pub fn parse_active_intents(content: &str) -> std::result::Result<Vec<IntentSpec>, serde_yaml::Error> {
    let doc: Value = serde_yaml::from_str(content)?;
    let list = match doc.get("active_intents") {
        Some(v) if !v.is_null() => Some(v),
        _ => doc.get("intents"),
    };
    let Some(Value::Sequence(entries)) = list else {
        return Ok(Vec::new());
    };

    let mut intents = Vec::with_capacity(entries.len());
    for entry in entries {
        if !matches!(entry.get("id"), Some(Value::String(_))) {
            continue;
        }
        match serde_yaml::from_value::<IntentSpec>(entry.clone()) {
            Ok(spec) => intents.push(spec),
            Err(err) => warn!(error = %err, "skipping malformed intent entry"),
        }
    }
    Ok(intents)
}
