//! Subcommand implementations. Each returns the text to print plus whether
//! the command should exit non-zero.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use intent_core::constants::ACTIVE_INTENTS_FILENAME;
use intent_core::errors::ToolErrorPayload;
use intent_core::intent::find_intent;
use intent_hooks::path_matches_owned_scope;
use intent_settings::GovernanceSettings;
use intent_store::agent_trace::try_recent_for_intent;
use intent_store::{
    SidecarPaths, build_intent_context, load_active_intents, load_intent_map, load_intentignore,
    render_intent_context,
};

/// Command output.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub output: String,
    pub blocked: bool,
}

impl Report {
    fn ok(output: String) -> Self {
        Self {
            output,
            blocked: false,
        }
    }
}

/// A workspace and the settings used to read its sidecar.
pub struct Workspace {
    paths: SidecarPaths,
    settings: GovernanceSettings,
}

impl Workspace {
    pub fn new(root: PathBuf, settings: GovernanceSettings) -> Self {
        Self {
            paths: SidecarPaths::new(root, &settings.sidecar_dir),
            settings,
        }
    }

    fn registry_label(&self) -> String {
        format!("{}/{ACTIVE_INTENTS_FILENAME}", self.settings.sidecar_dir)
    }

    /// `intents`: one tab-separated `id name status` line per intent.
    pub async fn intents(&self) -> Report {
        let intents = load_active_intents(&self.paths).await;
        if intents.is_empty() {
            return Report::ok(format!("No intents in {}.\n", self.registry_label()));
        }
        let mut out = String::new();
        for intent in &intents {
            let _ = writeln!(
                out,
                "{}\t{}\t{}",
                intent.id,
                intent.display_name().unwrap_or("-"),
                intent.display_status().unwrap_or("-")
            );
        }
        Report::ok(out)
    }

    /// `context <ID>`: the document `select_active_intent` would return.
    pub async fn context(&self, intent_id: &str) -> Result<Report> {
        let context =
            build_intent_context(&self.paths, intent_id, self.settings.recent_history_limit)
                .await
                .ok_or_else(|| anyhow!("unknown intent {intent_id} (not in {})", self.registry_label()))?;
        let mut out = render_intent_context(&context, self.settings.history_summary_limit);
        out.push('\n');
        Ok(Report::ok(out))
    }

    /// `history <ID>`: ledger entries for the intent, newest first, one JSON
    /// object per line.
    pub async fn history(&self, intent_id: &str, limit: Option<usize>) -> Result<Report> {
        let limit = limit.unwrap_or(self.settings.recent_history_limit);
        let entries = match try_recent_for_intent(&self.paths, intent_id.trim(), limit).await {
            Ok(entries) => entries,
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => return Err(err).context("Failed to read agent trace"),
        };
        let mut out = String::new();
        for entry in &entries {
            let line = serde_json::to_string(entry).context("Failed to serialize trace entry")?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(Report::ok(out))
    }

    /// `map`: the intent map document as stored.
    pub async fn map(&self) -> Report {
        Report::ok(load_intent_map(&self.paths).await)
    }

    /// `check <ID> <PATH>`: dry-run the gatekeeper, ignore list and scope
    /// stages for a write to `path`. Blocked outcomes exit non-zero.
    pub async fn check(&self, intent_id: &str, path: &str) -> Result<Report> {
        let intent_id = intent_id.trim();
        let intents = load_active_intents(&self.paths).await;
        let mut out = format!("intent: {intent_id}\npath: {path}\n");

        let Some(intent) = find_intent(&intents, intent_id) else {
            let veto = ToolErrorPayload::intent_invalid();
            let _ = writeln!(out, "verdict: blocked ({})\n{}", veto.code, veto.message);
            return Ok(Report { output: out, blocked: true });
        };

        let ignored = load_intentignore(&self.paths).await.contains(intent_id);
        let _ = writeln!(out, "ignored: {}", if ignored { "yes" } else { "no" });

        let inside = if intent.owned_scope.is_empty() {
            let _ = writeln!(out, "scope: unrestricted");
            true
        } else {
            let inside = path_matches_owned_scope(path, &intent.owned_scope);
            let _ = writeln!(
                out,
                "scope: {} ({})",
                if inside { "inside" } else { "outside" },
                intent.owned_scope.join(", ")
            );
            inside
        };

        let veto = if ignored {
            Some(ToolErrorPayload::intent_ignored(intent_id))
        } else if !inside {
            Some(ToolErrorPayload::scope_violation(intent_id, path))
        } else {
            None
        };
        let blocked = veto.is_some();
        match veto {
            Some(veto) => {
                let _ = writeln!(out, "verdict: blocked ({})\n{}", veto.code, veto.message);
            }
            None => out.push_str("verdict: allowed\n"),
        }
        Ok(Report { output: out, blocked })
    }
}

#[cfg(test)]
mod tests {
    use intent_core::trace::{TraceEntry, TraceEntryParams};
    use intent_store::{add_path_to_intent_map, append_trace_entry};

    use super::*;

    const REGISTRY: &str = r#"
active_intents:
  - id: INT-1
    name: JWT auth
    status: IN_PROGRESS
    owned_scope: ["src/auth/**"]
  - id: INT-2
"#;

    fn workspace(registry: Option<&str>, ignore: Option<&str>) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join(".orchestration");
        std::fs::create_dir_all(&sidecar).unwrap();
        if let Some(registry) = registry {
            std::fs::write(sidecar.join("active_intents.yaml"), registry).unwrap();
        }
        if let Some(ignore) = ignore {
            std::fs::write(sidecar.join(".intentignore"), ignore).unwrap();
        }
        let ws = Workspace::new(dir.path().to_path_buf(), GovernanceSettings::default());
        (dir, ws)
    }

    fn entry(intent: &str, path: &str) -> TraceEntry {
        TraceEntry::build(TraceEntryParams {
            intent_id: Some(intent.into()),
            relative_path: path.into(),
            content: "x".into(),
            ..TraceEntryParams::default()
        })
    }

    #[tokio::test]
    async fn intents_lists_id_name_status() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let report = ws.intents().await;
        assert_eq!(report.output, "INT-1\tJWT auth\tIN_PROGRESS\nINT-2\t-\t-\n");
        assert!(!report.blocked);
    }

    #[tokio::test]
    async fn intents_reports_empty_registry() {
        let (_dir, ws) = workspace(None, None);
        assert_eq!(
            ws.intents().await.output,
            "No intents in .orchestration/active_intents.yaml.\n"
        );
    }

    #[tokio::test]
    async fn context_renders_document() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let report = ws.context("INT-1").await.unwrap();
        assert!(report.output.starts_with("<intent_context>\n  <name>JWT auth</name>"));
        assert!(report.output.ends_with("</intent_context>\n"));
    }

    #[tokio::test]
    async fn context_of_unknown_intent_is_an_error() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let err = ws.context("INT-9").await.unwrap_err();
        assert!(err.to_string().contains("unknown intent INT-9"));
    }

    #[tokio::test]
    async fn history_prints_json_lines_newest_first() {
        let (dir, ws) = workspace(Some(REGISTRY), None);
        let paths = SidecarPaths::with_default_dir(dir.path());
        append_trace_entry(&paths, &entry("INT-1", "a.rs")).await;
        append_trace_entry(&paths, &entry("INT-2", "b.rs")).await;
        append_trace_entry(&paths, &entry("INT-1", "c.rs")).await;

        let report = ws.history("INT-1", None).await.unwrap();
        let paths: Vec<String> = report
            .output
            .lines()
            .map(|line| {
                let entry: TraceEntry = serde_json::from_str(line).unwrap();
                entry.files[0].relative_path.clone()
            })
            .collect();
        assert_eq!(paths, vec!["c.rs", "a.rs"]);

        let limited = ws.history("INT-1", Some(1)).await.unwrap();
        assert_eq!(limited.output.lines().count(), 1);
    }

    #[tokio::test]
    async fn history_without_ledger_is_empty() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        assert_eq!(ws.history("INT-1", None).await.unwrap(), Report::default());
    }

    #[tokio::test]
    async fn history_surfaces_corrupt_ledger() {
        let (dir, ws) = workspace(Some(REGISTRY), None);
        std::fs::write(dir.path().join(".orchestration/agent_trace.jsonl"), "{nope\n").unwrap();
        let err = ws.history("INT-1", None).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read agent trace"));
    }

    #[tokio::test]
    async fn map_prints_document() {
        let (dir, ws) = workspace(Some(REGISTRY), None);
        assert_eq!(ws.map().await.output, "");
        let paths = SidecarPaths::with_default_dir(dir.path());
        add_path_to_intent_map(&paths, "INT-1", Some("JWT auth"), "src/auth/a.ts").await;
        assert_eq!(ws.map().await.output, "## INT-1: JWT auth\n- src/auth/a.ts\n");
    }

    #[tokio::test]
    async fn check_inside_scope_is_allowed() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let report = ws.check("INT-1", "/src/auth/login.ts").await.unwrap();
        assert!(!report.blocked);
        assert!(report.output.contains("scope: inside (src/auth/**)"));
        assert!(report.output.ends_with("verdict: allowed\n"));
    }

    #[tokio::test]
    async fn check_outside_scope_is_blocked() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let report = ws.check("INT-1", "src/db/models.ts").await.unwrap();
        assert!(report.blocked);
        assert!(report.output.contains("verdict: blocked (SCOPE_VIOLATION)"));
    }

    #[tokio::test]
    async fn check_empty_scope_is_unrestricted() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let report = ws.check("INT-2", "anything/at/all").await.unwrap();
        assert!(!report.blocked);
        assert!(report.output.contains("scope: unrestricted"));
    }

    #[tokio::test]
    async fn check_ignored_intent_is_blocked() {
        let (_dir, ws) = workspace(Some(REGISTRY), Some("INT-1 # frozen\n"));
        let report = ws.check("INT-1", "src/auth/login.ts").await.unwrap();
        assert!(report.blocked);
        assert!(report.output.contains("ignored: yes"));
        assert!(report.output.contains("verdict: blocked (INTENT_IGNORED)"));
    }

    #[tokio::test]
    async fn check_unknown_intent_is_blocked_invalid() {
        let (_dir, ws) = workspace(Some(REGISTRY), None);
        let report = ws.check("INT-9", "src/auth/login.ts").await.unwrap();
        assert!(report.blocked);
        assert!(report.output.contains("verdict: blocked (INTENT_INVALID)"));
    }
}
