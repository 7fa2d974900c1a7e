//! End-to-end behavior of the governance pipeline against a real sidecar.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_matches::assert_matches;
use async_trait::async_trait;
use intent_core::errors::{ToolErrorCode, ToolErrorPayload};
use intent_core::mutation::MutationClass;
use intent_core::tools::ToolCall;
use intent_core::trace::TraceEntry;
use intent_hooks::{
    ApprovalChannel, ApprovalDecision, ApprovalRequest, GovernanceEngine, GovernedSession,
    RecordingReporter, Verdict,
};
use intent_settings::GovernanceSettings;
use mockall::mock;
use serde_json::json;

mock! {
    Approval {}

    #[async_trait]
    impl ApprovalChannel for Approval {
        async fn request(&self, request: &ApprovalRequest) -> ApprovalDecision;
    }
}

const REGISTRY: &str = r#"
active_intents:
  - id: INT-1
    name: JWT auth
    owned_scope:
      - "src/auth/**"
  - id: INT-2
    name: Free roam
    owned_scope: []
  - id: INT-3
    owned_scope: ["docs/**"]
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────────────────────────

struct Harness {
    dir: tempfile::TempDir,
    session: GovernedSession,
    reporter: Arc<RecordingReporter>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join(".orchestration");
        std::fs::create_dir_all(&sidecar).unwrap();
        std::fs::write(sidecar.join("active_intents.yaml"), REGISTRY).unwrap();
        let reporter = Arc::new(RecordingReporter::new());
        let session = GovernedSession::new(Some(dir.path().to_path_buf()), reporter.clone())
            .with_model_id("test-model");
        Self {
            dir,
            session,
            reporter,
        }
    }

    fn sidecar(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(".orchestration").join(name)
    }

    fn ignore(&self, content: &str) {
        std::fs::write(self.sidecar(".intentignore"), content).unwrap();
    }

    fn ledger(&self) -> Vec<TraceEntry> {
        let path = self.sidecar("agent_trace.jsonl");
        if !path.exists() {
            return Vec::new();
        }
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn intent_map(&self) -> String {
        std::fs::read_to_string(self.sidecar("intent_map.md")).unwrap_or_default()
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }
}

fn approve_all() -> Arc<dyn ApprovalChannel> {
    let mut mock = MockApproval::new();
    let _ = mock.expect_request().returning(|_| ApprovalDecision::Approved);
    Arc::new(mock)
}

fn never_asked() -> Arc<dyn ApprovalChannel> {
    let mut mock = MockApproval::new();
    let _ = mock.expect_request().never();
    Arc::new(mock)
}

fn governed(approval: Arc<dyn ApprovalChannel>) -> GovernanceEngine {
    GovernanceEngine::new(GovernanceSettings::default().with_reasoning_loop(true), approval)
}

fn ungoverned() -> GovernanceEngine {
    GovernanceEngine::new(GovernanceSettings::default(), never_asked())
}

fn call(name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall::from_invocation(name, args)
}

fn write(path: &str, content: &str) -> ToolCall {
    call(
        "write_to_file",
        json!({"path": path, "content": content, "mutation_class": "INTENT_EVOLUTION"}),
    )
}

/// Runs `call` through `engine`, counting executions.
async fn run(
    engine: &GovernanceEngine,
    session: &GovernedSession,
    call: &ToolCall,
) -> (Verdict<()>, usize) {
    let executed = AtomicUsize::new(0);
    let verdict: Result<Verdict<()>, std::convert::Infallible> = engine
        .govern(session, call, || async {
            let _ = executed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
    let Ok(verdict) = verdict;
    (verdict, executed.load(Ordering::SeqCst))
}

/// Like [`run`], from a raw `(name, arguments)` invocation.
async fn invoke(
    engine: &GovernanceEngine,
    session: &GovernedSession,
    name: &str,
    arguments: serde_json::Value,
) -> (Verdict<()>, usize) {
    let executed = AtomicUsize::new(0);
    let verdict: Result<Verdict<()>, std::convert::Infallible> = engine
        .govern_invocation(session, name, arguments, |_call| async {
            let _ = executed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
    let Ok(verdict) = verdict;
    (verdict, executed.load(Ordering::SeqCst))
}

fn veto_code(verdict: &Verdict<()>) -> Option<ToolErrorCode> {
    verdict.veto().map(|p| p.code)
}

// ─────────────────────────────────────────────────────────────────────────────
// Gatekeeper
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_selected_intent_is_vetoed_invalid() {
    let h = Harness::new();
    let engine = governed(never_asked());

    let (verdict, executed) = run(&engine, &h.session, &write("src/auth/a.ts", "x")).await;

    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::IntentInvalid));
    assert_eq!(executed, 0);
    assert_eq!(h.session.consecutive_mistakes(), 1);

    let reported = h.reporter.last().unwrap();
    assert!(reported.is_error);
    let payload: ToolErrorPayload = serde_json::from_str(&reported.content).unwrap();
    assert_eq!(payload.code, ToolErrorCode::IntentInvalid);
    assert!(payload.suggestion.is_some());
}

#[tokio::test]
async fn registry_edits_take_effect_on_next_call() {
    let h = Harness::new();
    let engine = governed(approve_all());
    h.session.select_intent("INT-9");

    let (verdict, _) = run(&engine, &h.session, &write("x.txt", "x")).await;
    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::IntentInvalid));

    std::fs::write(
        h.sidecar("active_intents.yaml"),
        "active_intents:\n  - id: INT-9\n",
    )
    .unwrap();
    let (verdict, executed) = run(&engine, &h.session, &write("x.txt", "x")).await;
    assert!(verdict.is_executed());
    assert_eq!(executed, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn in_scope_write_is_allowed() {
    let h = Harness::new();
    let engine = governed(approve_all());
    h.session.select_intent("INT-1");

    let (verdict, executed) = run(&engine, &h.session, &write("src/auth/login.ts", "x")).await;
    assert!(verdict.is_executed());
    assert_eq!(executed, 1);
    assert_eq!(h.session.consecutive_mistakes(), 0);
}

#[tokio::test]
async fn out_of_scope_write_is_a_scope_violation() {
    let h = Harness::new();
    let engine = governed(never_asked());
    h.session.select_intent("INT-1");

    let (verdict, executed) = run(&engine, &h.session, &write("src/db/models.ts", "x")).await;
    assert_eq!(executed, 0);
    let payload = verdict.veto().unwrap();
    assert_eq!(payload.code, ToolErrorCode::ScopeViolation);
    assert_eq!(payload.intent_id.as_deref(), Some("INT-1"));
    assert_eq!(payload.path.as_deref(), Some("src/db/models.ts"));
}

#[tokio::test]
async fn edit_tools_are_scope_checked_by_file_path() {
    let h = Harness::new();
    let engine = governed(never_asked());
    h.session.select_intent("INT-1");

    for tool in ["edit_file", "search_replace", "edit"] {
        let c = call(tool, json!({"file_path": "README.md", "new_string": "y"}));
        let (verdict, _) = run(&engine, &h.session, &c).await;
        assert_eq!(veto_code(&verdict), Some(ToolErrorCode::ScopeViolation), "{tool}");
    }
    let c = call("apply_diff", json!({"path": "README.md", "diff": "@@"}));
    let (verdict, _) = run(&engine, &h.session, &c).await;
    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::ScopeViolation));
}

// ─────────────────────────────────────────────────────────────────────────────
// Ignore list
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ignored_intent_blocks_even_in_scope() {
    let h = Harness::new();
    h.ignore("# frozen\nINT-1   # shipped in 2.0\n");
    let engine = governed(never_asked());
    h.session.select_intent("INT-1");

    let (verdict, executed) = run(&engine, &h.session, &write("src/auth/login.ts", "x")).await;
    assert_eq!(executed, 0);
    let payload = verdict.veto().unwrap();
    assert_eq!(payload.code, ToolErrorCode::IntentIgnored);
    assert_eq!(payload.intent_id.as_deref(), Some("INT-1"));
}

#[tokio::test]
async fn ignore_list_runs_before_scope() {
    let h = Harness::new();
    h.ignore("INT-1\n");
    let engine = governed(never_asked());
    h.session.select_intent("INT-1");

    let (verdict, _) = run(&engine, &h.session, &write("src/db/models.ts", "x")).await;
    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::IntentIgnored));
}

#[tokio::test]
async fn ignore_list_does_not_touch_read_only_tools() {
    let h = Harness::new();
    h.ignore("INT-1\n");
    let engine = governed(never_asked());
    h.session.select_intent("INT-1");

    let c = call("read_file", json!({"path": "src/auth/login.ts"}));
    let (verdict, executed) = run(&engine, &h.session, &c).await;
    assert!(verdict.is_executed());
    assert_eq!(executed, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Empty scope, mutation class, approval
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_scope_still_requires_mutation_class() {
    let h = Harness::new();
    let engine = governed(never_asked());
    h.session.select_intent("INT-2");

    let c = call("write_to_file", json!({"path": "anywhere/at/all.txt", "content": "x"}));
    let (verdict, executed) = run(&engine, &h.session, &c).await;
    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::MutationClassRequired));
    assert_eq!(executed, 0);

    let c = call(
        "write_to_file",
        json!({"path": "anywhere/at/all.txt", "content": "x", "mutation_class": "FEATURE"}),
    );
    let (verdict, _) = run(&engine, &h.session, &c).await;
    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::MutationClassRequired));
}

#[tokio::test]
async fn empty_scope_rejected_at_approval_writes_no_ledger() {
    let h = Harness::new();
    let mut mock = MockApproval::new();
    let _ = mock
        .expect_request()
        .withf(|req| {
            req.description() == "Allow this change? write_to_file → anywhere.txt (Intent: INT-2)"
        })
        .times(1)
        .returning(|_| ApprovalDecision::Rejected {
            feedback: Some("not now".into()),
        });
    let engine = governed(Arc::new(mock));
    h.session.select_intent("INT-2");

    let (verdict, executed) = run(&engine, &h.session, &write("anywhere.txt", "x")).await;
    assert_eq!(executed, 0);
    let payload = verdict.veto().unwrap();
    assert_eq!(payload.code, ToolErrorCode::UserRejected);
    assert_eq!(payload.message, "not now");
    assert!(h.ledger().is_empty());
    assert_eq!(h.session.consecutive_mistakes(), 1);
}

#[tokio::test]
async fn dismissed_approval_is_a_rejection() {
    let h = Harness::new();
    let mut mock = MockApproval::new();
    let _ = mock
        .expect_request()
        .returning(|_| ApprovalDecision::Dismissed);
    let engine = governed(Arc::new(mock));
    h.session.select_intent("INT-2");

    let (verdict, _) = run(&engine, &h.session, &write("a.txt", "x")).await;
    assert_matches!(verdict, Verdict::Vetoed(p) if p.message == "The user rejected this operation.");
}

#[tokio::test]
async fn vetoes_accumulate_mistakes() {
    let h = Harness::new();
    let engine = governed(never_asked());

    for _ in 0..3 {
        let _ = run(&engine, &h.session, &write("a.txt", "x")).await;
    }
    assert_eq!(h.session.consecutive_mistakes(), 3);
    assert_eq!(h.reporter.results().len(), 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Post-checks
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ungoverned_mutation_is_still_ledgered_with_default_class() {
    let h = Harness::new();
    let engine = ungoverned();

    let c = call("edit", json!({"file_path": "src/x.rs", "new_string": "fn x() {}"}));
    let (verdict, executed) = run(&engine, &h.session, &c).await;
    assert!(verdict.is_executed());
    assert_eq!(executed, 1);

    let ledger = h.ledger();
    assert_eq!(ledger.len(), 1);
    let entry = &ledger[0];
    assert_eq!(entry.mutation_class, Some(MutationClass::IntentEvolution));
    assert!(entry.intent_id.is_none());
    assert_eq!(entry.files[0].relative_path, "src/x.rs");
    let conv = &entry.files[0].conversations[0];
    assert_eq!(conv.url.as_deref(), Some(h.session.session_id().as_str()));
    assert_eq!(conv.contributor.model_identifier.as_deref(), Some("test-model"));
    assert_eq!(
        conv.ranges[0].content_hash,
        intent_core::compute_content_hash("fn x() {}")
    );
    // Ungoverned: no spatial index.
    assert!(h.intent_map().is_empty());
}

#[tokio::test]
async fn governed_write_ledgers_and_maps_with_intent_name() {
    let h = Harness::new();
    let engine = governed(approve_all());
    h.session.select_intent("INT-1");

    let c = call(
        "write_to_file",
        json!({"path": "src/auth/login.ts", "content": "x", "mutation_class": "AST_REFACTOR"}),
    );
    let _ = run(&engine, &h.session, &c).await;
    let _ = run(&engine, &h.session, &c).await;
    let _ = run(&engine, &h.session, &write("src/auth/jwt.ts", "y")).await;

    let ledger = h.ledger();
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[0].intent_id.as_deref(), Some("INT-1"));
    assert_eq!(ledger[0].mutation_class, Some(MutationClass::AstRefactor));
    assert_eq!(ledger[2].mutation_class, Some(MutationClass::IntentEvolution));

    assert_eq!(
        h.intent_map(),
        "## INT-1: JWT auth\n- src/auth/login.ts\n- src/auth/jwt.ts\n"
    );
}

#[tokio::test]
async fn explicit_intent_argument_wins_for_attribution() {
    let h = Harness::new();
    let engine = ungoverned();
    h.session.select_intent("INT-1");

    let c = call(
        "apply_diff",
        json!({"path": "docs/a.md", "diff": "@@ -1 +1 @@", "intent_id": "INT-3"}),
    );
    let _ = run(&engine, &h.session, &c).await;

    let ledger = h.ledger();
    assert_eq!(ledger[0].intent_id.as_deref(), Some("INT-3"));
}

#[tokio::test]
async fn patch_is_ledgered_under_patch_label() {
    let h = Harness::new();
    let engine = ungoverned();
    let c = call("apply_patch", json!({"patch": "*** Begin Patch"}));
    let _ = run(&engine, &h.session, &c).await;

    let ledger = h.ledger();
    assert_eq!(ledger[0].files[0].relative_path, "patch");
}

#[tokio::test]
async fn edits_without_content_are_not_ledgered() {
    let h = Harness::new();
    let engine = ungoverned();
    let c = call("edit_file", json!({"file_path": "src/x.rs"}));
    let (verdict, _) = run(&engine, &h.session, &c).await;
    assert!(verdict.is_executed());
    assert!(h.ledger().is_empty());
}

#[tokio::test]
async fn commands_are_never_ledgered() {
    let h = Harness::new();
    let engine = ungoverned();
    let c = call("execute_command", json!({"command": "cargo fmt"}));
    let _ = run(&engine, &h.session, &c).await;
    assert!(h.ledger().is_empty());
    assert!(!h.root().join(".orchestration/agent_trace.jsonl").exists());
}

// ─────────────────────────────────────────────────────────────────────────────
// Malformed arguments and host tools
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_string_mutation_class_is_vetoed_and_reported() {
    let h = Harness::new();
    let engine = governed(never_asked());
    h.session.select_intent("INT-1");

    let (verdict, executed) = invoke(
        &engine,
        &h.session,
        "write_to_file",
        json!({"path": "src/auth/a.ts", "content": "x", "mutation_class": 1}),
    )
    .await;

    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::MutationClassRequired));
    assert_eq!(executed, 0);
    assert_eq!(h.session.consecutive_mistakes(), 1);
    let reported = h.reporter.last().unwrap();
    assert!(reported.is_error);
    assert!(reported.content.contains("MUTATION_CLASS_REQUIRED"));
}

#[tokio::test]
async fn write_without_path_skips_scope_and_ledger() {
    let h = Harness::new();
    let engine = governed(approve_all());
    h.session.select_intent("INT-1");

    let (verdict, executed) = invoke(
        &engine,
        &h.session,
        "write_to_file",
        json!({"content": "x", "mutation_class": "AST_REFACTOR"}),
    )
    .await;

    assert!(verdict.is_executed());
    assert_eq!(executed, 1);
    assert!(h.ledger().is_empty());
    assert!(h.intent_map().is_empty());
}

#[tokio::test]
async fn null_content_hashes_as_empty() {
    let h = Harness::new();
    let engine = governed(approve_all());
    h.session.select_intent("INT-1");

    let (verdict, _) = invoke(
        &engine,
        &h.session,
        "write_to_file",
        json!({"path": "src/auth/a.ts", "content": null, "mutation_class": "AST_REFACTOR"}),
    )
    .await;

    assert!(verdict.is_executed());
    let ledger = h.ledger();
    assert_eq!(
        ledger[0].files[0].conversations[0].ranges[0].content_hash,
        intent_core::compute_content_hash("")
    );
}

#[tokio::test]
async fn non_string_intent_argument_falls_back_to_selection() {
    let h = Harness::new();
    let engine = ungoverned();
    h.session.select_intent("INT-1");

    let (verdict, executed) = invoke(
        &engine,
        &h.session,
        "write_to_file",
        json!({"path": "src/auth/a.ts", "content": "x", "intent_id": 5}),
    )
    .await;

    assert!(verdict.is_executed());
    assert_eq!(executed, 1);
    assert_eq!(h.ledger()[0].intent_id.as_deref(), Some("INT-1"));
}

#[tokio::test]
async fn padded_mutation_class_is_ledgered_as_declared() {
    let h = Harness::new();
    let engine = governed(approve_all());
    h.session.select_intent("INT-1");

    let c = call(
        "write_to_file",
        json!({"path": "src/auth/a.ts", "content": "x", "mutation_class": " AST_REFACTOR "}),
    );
    let (verdict, _) = run(&engine, &h.session, &c).await;

    assert!(verdict.is_executed());
    assert_eq!(h.ledger()[0].mutation_class, Some(MutationClass::AstRefactor));
}

#[tokio::test]
async fn host_tool_runs_in_both_modes() {
    let h = Harness::new();

    let (verdict, executed) =
        invoke(&ungoverned(), &h.session, "new_rule", json!({"rule": "x"})).await;
    assert!(verdict.is_executed());
    assert_eq!(executed, 1);

    let engine = governed(never_asked());
    let (verdict, executed) =
        invoke(&engine, &h.session, "browser_action", json!({"action": "launch"})).await;
    assert_eq!(veto_code(&verdict), Some(ToolErrorCode::IntentInvalid));
    assert_eq!(executed, 0);

    h.session.select_intent("INT-3");
    h.ignore("INT-3\n");
    let (verdict, executed) =
        invoke(&engine, &h.session, "browser_action", json!({"action": "launch"})).await;
    assert!(verdict.is_executed());
    assert_eq!(executed, 1);
    assert!(h.ledger().is_empty());
}
