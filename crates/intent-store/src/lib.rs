//! # intent-store
//!
//! Sidecar storage for intent governance. One sidecar directory per
//! workspace (`.orchestration/` by default) holds:
//!
//! - `active_intents.yaml`: the intent registry (read-only here)
//! - `.intentignore`: frozen intent IDs (read-only here)
//! - `agent_trace.jsonl`: the append-only trace ledger
//! - `intent_map.md`: the intent → files spatial index
//!
//! Reads degrade to empty results when files are missing or corrupt; writes
//! log a warning and never fail the caller. Each forgiving entry point has a
//! strict `try_*` counterpart returning [`StoreError`].
//!
//! Ledger appends and map rewrites for the same sidecar directory are
//! serialized through an in-process lock registry ([`locks`]).

#![deny(unsafe_code)]

pub mod active_intents;
pub mod agent_trace;
pub mod context;
pub mod errors;
pub mod intent_map;
pub mod intentignore;
pub mod locks;
pub mod paths;

pub use active_intents::{load_active_intents, parse_active_intents, valid_intent_ids};
pub use agent_trace::{append_trace_entry, recent_for_intent};
pub use context::{IntentContext, build_intent_context, render_intent_context};
pub use errors::{Result, StoreError};
pub use intent_map::{
    add_path_to_intent_map, existing_paths_for_intent, load_intent_map, write_intent_map_section,
};
pub use intentignore::{load_intentignore, parse_intentignore};
pub use paths::SidecarPaths;
