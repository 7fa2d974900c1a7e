//! Fixed names shared across crates.

/// Default sidecar directory under the workspace root.
pub const DEFAULT_SIDECAR_DIR: &str = ".orchestration";

/// Intent registry file name (sidecar, with a legacy copy at the workspace root).
pub const ACTIVE_INTENTS_FILENAME: &str = "active_intents.yaml";

/// Denylist of frozen intent IDs.
pub const INTENTIGNORE_FILENAME: &str = ".intentignore";

/// Append-only trace ledger.
pub const AGENT_TRACE_FILENAME: &str = "agent_trace.jsonl";

/// Intent → files spatial index.
pub const INTENT_MAP_FILENAME: &str = "intent_map.md";

/// Prefix for content hashes in the ledger.
pub const CONTENT_HASH_PREFIX: &str = "sha256:";

/// Ledger label used as the path of a structured patch (no single target file).
pub const PATCH_LABEL: &str = "patch";

/// Name of the intent-selection tool. The gatekeeper never applies to it.
pub const SELECT_ACTIVE_INTENT: &str = "select_active_intent";
