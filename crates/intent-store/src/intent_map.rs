//! Spatial index: `intent_map.md`.
//!
//! ```text
//! ## INT-001: JWT auth migration
//! - src/auth/login.ts
//! - src/middleware/jwt.ts
//!
//! ## INT-002
//! - docs/api.md
//! ```
//!
//! Sections are identified by intent ID only; the display name after `: `
//! is cosmetic. Every update rewrites the whole section, so re-adding a
//! path is a no-op and sections never fragment.

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::{Result, StoreError};
use crate::locks::lock_workspace;
use crate::paths::SidecarPaths;

/// A located section: line range `[start, end)` and the heading's name.
struct Section {
    start: usize,
    end: usize,
    name: Option<String>,
}

fn heading_pattern(intent_id: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(r"^## {}(?:: (.*))?$", regex::escape(intent_id)))
}

fn find_section(lines: &[&str], heading: &Regex) -> Option<Section> {
    let start = lines.iter().position(|line| heading.is_match(line))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.starts_with("## "))
        .map_or(lines.len(), |offset| start + 1 + offset);
    let name = heading
        .captures(lines[start])
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty());
    Some(Section { start, end, name })
}

fn bullet_paths(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('-').unwrap_or(line).trim()
        })
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn render_section(intent_id: &str, name: Option<&str>, paths: &[String]) -> String {
    let mut out = format!("## {intent_id}");
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        out.push_str(": ");
        out.push_str(name);
    }
    out.push('\n');
    for path in paths {
        out.push_str("- ");
        out.push_str(path);
        out.push('\n');
    }
    out
}

/// Paths listed under an intent's heading, in document order.
pub fn existing_paths_for_intent(document: &str, intent_id: &str) -> Vec<String> {
    let Ok(heading) = heading_pattern(intent_id) else {
        return Vec::new();
    };
    let lines: Vec<&str> = document.lines().collect();
    find_section(&lines, &heading)
        .map(|s| bullet_paths(&lines[s.start + 1..s.end]))
        .unwrap_or_default()
}

/// Replace the intent's section in `document` (or append one).
///
/// When `name` is `None`, a name already on the existing heading is kept.
pub fn upsert_section(
    document: &str,
    intent_id: &str,
    name: Option<&str>,
    paths: &[String],
) -> std::result::Result<String, regex::Error> {
    let heading = heading_pattern(intent_id)?;
    let lines: Vec<&str> = document.lines().collect();

    let Some(section) = find_section(&lines, &heading) else {
        let new_section = render_section(intent_id, name, paths);
        let existing = document.trim_end();
        return Ok(if existing.is_empty() {
            new_section
        } else {
            format!("{existing}\n\n{new_section}")
        });
    };

    let name = name.or(section.name.as_deref());
    let new_section = render_section(intent_id, name, paths);
    let before = lines[..section.start].join("\n");
    let after = lines[section.end..].join("\n");

    let mut out = String::new();
    if !before.trim().is_empty() {
        out.push_str(before.trim_end());
        out.push_str("\n\n");
    }
    out.push_str(&new_section);
    if !after.trim().is_empty() {
        out.push('\n');
        out.push_str(after.trim());
        out.push('\n');
    }
    Ok(out)
}

async fn read_map(paths: &SidecarPaths) -> Result<String> {
    let path = paths.intent_map();
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(StoreError::io(&path, e)),
    }
}

async fn write_map(paths: &SidecarPaths, content: &str) -> Result<()> {
    tokio::fs::create_dir_all(paths.dir())
        .await
        .map_err(|e| StoreError::io(paths.dir(), e))?;
    let path = paths.intent_map();
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| StoreError::io(&path, e))
}

/// Current map document; empty when missing or unreadable.
pub async fn load_intent_map(paths: &SidecarPaths) -> String {
    read_map(paths).await.unwrap_or_else(|err| {
        warn!(error = %err, "failed to read intent_map.md");
        String::new()
    })
}

/// Replace an intent's section with an explicit path list. Failures are
/// logged as warnings.
pub async fn write_intent_map_section(
    paths: &SidecarPaths,
    intent_id: &str,
    name: Option<&str>,
    relative_paths: &[String],
) {
    if let Err(err) = try_write_intent_map_section(paths, intent_id, name, relative_paths).await {
        warn!(error = %err, intent_id, "failed to update intent_map.md");
    }
}

/// Strict variant of [`write_intent_map_section`].
pub async fn try_write_intent_map_section(
    paths: &SidecarPaths,
    intent_id: &str,
    name: Option<&str>,
    relative_paths: &[String],
) -> Result<()> {
    let _guard = lock_workspace(paths.dir()).await;
    let existing = read_map(paths).await?;
    let updated = upsert_section(&existing, intent_id, name, relative_paths)?;
    write_map(paths, &updated).await
}

/// Add one path to an intent's section. Failures are logged as warnings.
pub async fn add_path_to_intent_map(
    paths: &SidecarPaths,
    intent_id: &str,
    name: Option<&str>,
    relative_path: &str,
) {
    if let Err(err) = try_add_path_to_intent_map(paths, intent_id, name, relative_path).await {
        warn!(error = %err, intent_id, path = relative_path, "failed to update intent_map.md");
    }
}

/// Strict variant of [`add_path_to_intent_map`]. Returns `true` if the map
/// changed, `false` if the path was already listed.
pub async fn try_add_path_to_intent_map(
    paths: &SidecarPaths,
    intent_id: &str,
    name: Option<&str>,
    relative_path: &str,
) -> Result<bool> {
    let _guard = lock_workspace(paths.dir()).await;
    let existing = read_map(paths).await?;
    let mut listed = existing_paths_for_intent(&existing, intent_id);
    if listed.iter().any(|p| p == relative_path) {
        debug!(intent_id, path = relative_path, "path already in intent map");
        return Ok(false);
    }
    listed.push(relative_path.to_string());
    let updated = upsert_section(&existing, intent_id, name, &listed)?;
    write_map(paths, &updated).await?;
    Ok(true)
}
