//! # intent-hooks
//!
//! Governance around a single agent tool call.
//!
//! [`GovernanceEngine::govern`] runs the pre-check pipeline in a fixed
//! order, each stage a hard veto:
//!
//! 1. **Gatekeeper**: a valid intent must be selected (all tools except
//!    `select_active_intent`)
//! 2. **Ignore list**: the selected intent must not be frozen
//! 3. **Scope**: the target path must fall inside the intent's owned scope
//! 4. **Mutation class**: whole-file writes must declare one
//! 5. **Approval**: a human must approve every destructive call
//!
//! then executes the call and ledgers mutating calls afterwards. A veto is a
//! value ([`Verdict::Vetoed`]), reported to the agent through the session's
//! [`ResultReporter`]; it never becomes an `Err`.

#![deny(unsafe_code)]

pub mod approval;
pub mod engine;
pub mod scope;
pub mod session;

pub use approval::{ApprovalChannel, ApprovalDecision, ApprovalRequest};
pub use engine::{GovernanceEngine, Verdict};
pub use scope::path_matches_owned_scope;
pub use session::{GovernedSession, RecordingReporter, ResultReporter};
