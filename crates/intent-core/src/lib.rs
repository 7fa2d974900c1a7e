//! # intent-core
//!
//! Foundation types for intent-scoped governance of agent tool calls.
//!
//! This crate provides the shared vocabulary that the other crates depend on:
//!
//! - **Branded IDs**: `SessionId`, `TraceId` as newtypes for type safety
//! - **Intents**: [`IntentSpec`](intent::IntentSpec), one declared unit of work
//! - **Tool calls**: the closed [`ToolCall`](tools::ToolCall) variant type with
//!   safe/destructive/mutating classification and path/content extraction
//! - **Trace entries**: the append-only ledger record with content hashing
//! - **Veto payloads**: [`ToolErrorPayload`](errors::ToolErrorPayload) returned
//!   to the agent when a governance check blocks a call
//! - **Logging**: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod intent;
pub mod logging;
pub mod mutation;
pub mod tools;
pub mod trace;

pub use errors::{ToolErrorCode, ToolErrorPayload};
pub use ids::{SessionId, TraceId};
pub use intent::IntentSpec;
pub use mutation::MutationClass;
pub use tools::{Tool, ToolCall, ToolClass, ToolParameterSchema, ToolResult};
pub use trace::{TraceEntry, TraceEntryParams, compute_content_hash};
