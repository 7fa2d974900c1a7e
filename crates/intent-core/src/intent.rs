//! Intent specification: one declared unit of work.
//!
//! Intents are authored by humans in the sidecar registry and are read-only
//! to the governance layer. Deserialization is lenient about shape so that
//! older registries keep loading: scalar fields of any scalar type are read
//! as strings, and list fields given as a single value become one-element
//! lists.

use serde::{Deserialize, Deserializer, Serialize};

/// A single intent from the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSpec {
    /// Unique, stable identifier.
    pub id: String,
    /// Optional display label.
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-text lifecycle status.
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Ownership globs. Empty means scope enforcement is skipped for this intent.
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub owned_scope: Vec<String>,
    /// Free-text rules the agent must follow.
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    /// Definition of done.
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,
    /// Legacy single-sentence scope description (display only, never matched).
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl IntentSpec {
    /// Create an intent with only an ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Builder: set the owned scope.
    #[must_use]
    pub fn with_owned_scope<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owned_scope = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Trimmed, non-empty display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Trimmed, non-empty status.
    #[must_use]
    pub fn display_status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    /// Trimmed, non-empty legacy scope description.
    #[must_use]
    pub fn legacy_scope(&self) -> Option<&str> {
        non_blank(self.scope.as_deref())
    }
}

/// Find an intent by ID. Duplicates are not deduplicated: the first match wins.
#[must_use]
pub fn find_intent<'a>(intents: &'a [IntentSpec], id: &str) -> Option<&'a IntentSpec> {
    let id = id.trim();
    intents.iter().find(|spec| spec.id == id)
}

/// Project the non-empty IDs of a registry, in registry order.
#[must_use]
pub fn valid_intent_ids(intents: &[IntentSpec]) -> Vec<String> {
    intents
        .iter()
        .filter(|spec| !spec.id.is_empty())
        .map(|spec| spec.id.clone())
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient field readers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value.into_string()],
        Some(OneOrMany::Many(values)) => values.into_iter().map(Scalar::into_string).collect(),
    })
}
