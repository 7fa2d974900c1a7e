//! # intent-settings
//!
//! Governance configuration, loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`GovernanceSettings::default()`]
//! 2. **User file**: `~/.intent/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `INTENT_*` overrides (highest priority)
//!
//! Unlike the registry and ledger, settings are read once per process; the
//! host passes the loaded value into the governance engine.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::GovernanceSettings;
