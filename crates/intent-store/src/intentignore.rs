//! Ignore list reader: intent IDs frozen from further mutation.

use std::collections::HashSet;

use tracing::warn;

use crate::errors::{Result, StoreError};
use crate::paths::SidecarPaths;

/// Load `.intentignore`. Missing or unreadable file yields an empty set.
pub async fn load_intentignore(paths: &SidecarPaths) -> HashSet<String> {
    match try_load_intentignore(paths).await {
        Ok(ids) => ids,
        Err(err) => {
            if !err.is_not_found() {
                warn!(error = %err, "unreadable .intentignore, treating as empty");
            }
            HashSet::new()
        }
    }
}

/// Strict variant of [`load_intentignore`].
pub async fn try_load_intentignore(paths: &SidecarPaths) -> Result<HashSet<String>> {
    let path = paths.intentignore();
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| StoreError::io(&path, e))?;
    Ok(parse_intentignore(&content))
}

/// One ID per line; everything from `#` onward is a comment.
pub fn parse_intentignore(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before).trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
