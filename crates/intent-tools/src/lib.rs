//! # intent-tools
//!
//! Tools the governance layer itself exposes to the agent.
//!
//! - **`select_active_intent`**: validates an intent ID against the registry,
//!   selects it on the session, and returns the intent context document
//! - **Schema fragments**: `intent_id` and `mutation_class` argument schemas
//!   a host merges into its mutating tools' definitions

#![deny(unsafe_code)]

pub mod schema;
pub mod select_intent;
pub mod traits;

pub use schema::{ToolSchemaBuilder, intent_id_property, mutation_class_property, with_governance_args};
pub use select_intent::SelectActiveIntentTool;
pub use traits::IntentTool;
