//! Trace ledger records.
//!
//! One [`TraceEntry`] is written per qualifying mutation and never edited
//! afterwards. Each range carries a content hash computed over the literal
//! content attributed to it, so an entry stays valid when that content later
//! moves to different lines.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::CONTENT_HASH_PREFIX;
use crate::ids::TraceId;
use crate::mutation::MutationClass;

/// Spatial hash of a piece of content: `sha256:<hex>`.
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut out = String::with_capacity(CONTENT_HASH_PREFIX.len() + digest.len() * 2);
    out.push_str(CONTENT_HASH_PREFIX);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// A `{type, value}` tag linking an entry or file to another artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRelated {
    /// Tag kind, e.g. `intent`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tag value, e.g. the intent ID.
    pub value: String,
}

impl TraceRelated {
    /// An `intent` tag.
    #[must_use]
    pub fn intent(intent_id: impl Into<String>) -> Self {
        Self {
            kind: "intent".into(),
            value: intent_id.into(),
        }
    }
}

/// One attributed range of a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRange {
    /// First line (1-based).
    pub start_line: u32,
    /// Last line (1-based, inclusive).
    pub end_line: u32,
    /// `sha256:<hex>` of the range content.
    pub content_hash: String,
}

/// Who produced a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    /// An AI model.
    #[serde(rename = "AI")]
    Ai,
    /// A person.
    #[serde(rename = "human")]
    Human,
}

/// Contributor of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContributor {
    /// AI or human.
    pub entity_type: EntityType,
    /// Model that produced the change, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
}

/// One session contributing ranges to a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConversation {
    /// Session log identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Who made the change.
    pub contributor: TraceContributor,
    /// Attributed ranges.
    pub ranges: Vec<TraceRange>,
}

/// One file touched by an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFile {
    /// Path relative to the workspace root.
    pub relative_path: String,
    /// Contributing conversations.
    pub conversations: Vec<TraceConversation>,
    /// Tags for this file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<TraceRelated>,
}

/// Version-control context of an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceVcs {
    /// Revision the change was made against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
}

/// A single append-only ledger record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Globally unique entry ID.
    pub id: TraceId,
    /// ISO-8601 creation time.
    pub timestamp: String,
    /// Intent the change was made under; absent for ungoverned changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
    /// Entry-level tags; mirrors `intent_id` as an `intent` tag when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<TraceRelated>,
    /// Refactor vs. feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_class: Option<MutationClass>,
    /// Version-control context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<TraceVcs>,
    /// Files touched.
    pub files: Vec<TraceFile>,
}

/// Inputs for [`TraceEntry::build`].
#[derive(Clone, Debug, Default)]
pub struct TraceEntryParams {
    /// Intent the change belongs to.
    pub intent_id: Option<String>,
    /// Path relative to the workspace root.
    pub relative_path: String,
    /// Literal content attributed to the range.
    pub content: String,
    /// Declared class; defaults to [`MutationClass::IntentEvolution`].
    pub mutation_class: Option<MutationClass>,
    /// First line of the range (default 1).
    pub start_line: Option<u32>,
    /// Last line of the range (default 1).
    pub end_line: Option<u32>,
    /// Session log identifier.
    pub session_log_id: Option<String>,
    /// Model identifier of the contributor.
    pub model_id: Option<String>,
    /// VCS revision.
    pub revision_id: Option<String>,
}

impl TraceEntry {
    /// Build a new entry with a fresh ID and the current timestamp.
    #[must_use]
    pub fn build(params: TraceEntryParams) -> Self {
        let range = TraceRange {
            start_line: params.start_line.unwrap_or(1),
            end_line: params.end_line.unwrap_or(1),
            content_hash: compute_content_hash(&params.content),
        };
        let related: Vec<TraceRelated> = params
            .intent_id
            .iter()
            .map(TraceRelated::intent)
            .collect();

        let file = TraceFile {
            relative_path: params.relative_path,
            conversations: vec![TraceConversation {
                url: params.session_log_id,
                contributor: TraceContributor {
                    entity_type: EntityType::Ai,
                    model_identifier: params.model_id,
                },
                ranges: vec![range],
            }],
            related: related.clone(),
        };

        Self {
            id: TraceId::new(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            intent_id: params.intent_id,
            related,
            mutation_class: Some(params.mutation_class.unwrap_or_default()),
            vcs: params.revision_id.map(|revision_id| TraceVcs {
                revision_id: Some(revision_id),
            }),
            files: vec![file],
        }
    }

    /// Relative paths of all files in this entry.
    pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.relative_path.as_str())
    }
}
