//! Governed tool calls and tool schema types.
//!
//! Every governed capability is one variant of [`ToolCall`], carrying its own
//! typed argument record; anything else the host exposes is
//! [`ToolCall::Other`]. Raw `(name, arguments)` pairs are decoded once at the
//! boundary by [`ToolCall::from_invocation`]; everything downstream
//! (classification, scope paths, ledger extraction) is a total match over
//! the variants.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{PATCH_LABEL, SELECT_ACTIVE_INTENT};
use crate::mutation::MutationClass;

// ─────────────────────────────────────────────────────────────────────────────
// Tool schema
// ─────────────────────────────────────────────────────────────────────────────

/// JSON Schema-compatible parameter definition for a tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Top-level JSON Schema type.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property definitions (when type is `object`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Catch-all for additional JSON Schema properties.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A tool definition that can be sent to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: ToolParameterSchema,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool result
// ─────────────────────────────────────────────────────────────────────────────

/// Payload pushed back to the agent for one tool call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Text content.
    pub content: String,
    /// Whether the call failed or was blocked.
    #[serde(default)]
    pub is_error: bool,
}

/// Create a plain text result.
#[must_use]
pub fn text_result(text: impl Into<String>, is_error: bool) -> ToolResult {
    ToolResult {
        content: text.into(),
        is_error,
    }
}

/// Create an error result.
#[must_use]
pub fn error_result(message: impl Into<String>) -> ToolResult {
    text_result(message, true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument records
// ─────────────────────────────────────────────────────────────────────────────
//
// Every field is optional and read leniently: a value of the wrong JSON type
// decodes as absent. Malformed arguments therefore reach the pre-checks (and
// become vetoes) instead of failing at the boundary.

/// Arguments of `select_active_intent`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectActiveIntentArgs {
    /// Intent to select. Validated by the tool, not at decode time.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
}

/// Arguments of `write_to_file`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteToFileArgs {
    /// Target path, relative to the workspace root.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Full new file content. Absent or non-string content hashes as `""`.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Declared mutation class, as sent by the agent.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub mutation_class: Option<String>,
    /// Explicit intent attribution.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
}

/// Arguments of the targeted edit tools (`edit_file`, `search_replace`, `edit`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEditArgs {
    /// Target path, relative to the workspace root.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Text being replaced.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub old_string: Option<String>,
    /// Replacement text.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub new_string: Option<String>,
    /// Declared mutation class.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub mutation_class: Option<String>,
    /// Explicit intent attribution.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
}

/// Arguments of `apply_diff`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyDiffArgs {
    /// Target path, relative to the workspace root.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Diff body.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Declared mutation class.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub mutation_class: Option<String>,
    /// Explicit intent attribution.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
}

/// Arguments of `apply_patch`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyPatchArgs {
    /// Multi-file patch body.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    /// Declared mutation class.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub mutation_class: Option<String>,
    /// Explicit intent attribution.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,
}

/// Arguments of `execute_command`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteCommandArgs {
    /// Shell command line.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Working directory override.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

/// Arguments of `new_task`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaskArgs {
    /// Mode of the spawned subtask.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Instructions for the subtask.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Arguments of `run_slash_command`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSlashCommandArgs {
    /// Command name.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Raw command arguments.
    #[serde(default, deserialize_with = "string_or_none", skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Decode an argument record. Non-object arguments read as an empty object.
fn decode<T: DeserializeOwned + Default>(arguments: Value) -> T {
    match arguments {
        Value::Object(_) => serde_json::from_value(arguments).unwrap_or_default(),
        _ => T::default(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read-only tools
// ─────────────────────────────────────────────────────────────────────────────

/// Tools with no file writes, shell execution, or destructive side effects.
/// Their arguments are never inspected by governance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadOnlyTool {
    /// `read_file`
    ReadFile,
    /// `list_files`
    ListFiles,
    /// `search_files`
    SearchFiles,
    /// `codebase_search`
    CodebaseSearch,
    /// `read_command_output`
    ReadCommandOutput,
    /// `ask_followup_question`
    AskFollowupQuestion,
    /// `attempt_completion`
    AttemptCompletion,
    /// `switch_mode`
    SwitchMode,
    /// `access_mcp_resource`
    AccessMcpResource,
    /// `use_mcp_tool`
    UseMcpTool,
}

impl ReadOnlyTool {
    /// Wire name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ReadFile => "read_file",
            Self::ListFiles => "list_files",
            Self::SearchFiles => "search_files",
            Self::CodebaseSearch => "codebase_search",
            Self::ReadCommandOutput => "read_command_output",
            Self::AskFollowupQuestion => "ask_followup_question",
            Self::AttemptCompletion => "attempt_completion",
            Self::SwitchMode => "switch_mode",
            Self::AccessMcpResource => "access_mcp_resource",
            Self::UseMcpTool => "use_mcp_tool",
        }
    }

    /// All read-only tools.
    #[must_use]
    pub fn all() -> &'static [ReadOnlyTool] {
        &[
            Self::ReadFile,
            Self::ListFiles,
            Self::SearchFiles,
            Self::CodebaseSearch,
            Self::ReadCommandOutput,
            Self::AskFollowupQuestion,
            Self::AttemptCompletion,
            Self::SwitchMode,
            Self::AccessMcpResource,
            Self::UseMcpTool,
        ]
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.name() == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ToolCall
// ─────────────────────────────────────────────────────────────────────────────

/// Governance class of a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolClass {
    /// Read-only; never touched by the destructive pre-checks.
    Safe,
    /// Writes, deletes, or executes; subject to ignore/scope/approval.
    Destructive,
}

/// One decoded tool invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolCall {
    /// Any read-only tool. Arguments are passed through untouched.
    ReadOnly {
        /// Which tool.
        tool: ReadOnlyTool,
        /// Raw arguments.
        arguments: Value,
    },
    /// `select_active_intent`
    SelectActiveIntent(SelectActiveIntentArgs),
    /// `write_to_file`
    WriteToFile(WriteToFileArgs),
    /// `edit_file`
    EditFile(FileEditArgs),
    /// `search_replace`
    SearchReplace(FileEditArgs),
    /// `edit`
    Edit(FileEditArgs),
    /// `apply_diff`
    ApplyDiff(ApplyDiffArgs),
    /// `apply_patch`
    ApplyPatch(ApplyPatchArgs),
    /// `execute_command`
    ExecuteCommand(ExecuteCommandArgs),
    /// `new_task`
    NewTask(NewTaskArgs),
    /// `run_slash_command`
    RunSlashCommand(RunSlashCommandArgs),
    /// A host tool outside the governed sets (`browser_action`,
    /// `update_todo_list`, ...). Gatekeeper-checked only, never ledgered.
    Other {
        /// Wire name as invoked.
        name: String,
        /// Raw arguments.
        arguments: Value,
    },
}

impl ToolCall {
    /// Decode a raw invocation. Never fails: unknown names become
    /// [`ToolCall::Other`] and malformed arguments decode as absent fields.
    #[must_use]
    pub fn from_invocation(name: &str, arguments: Value) -> Self {
        if let Some(tool) = ReadOnlyTool::from_name(name) {
            return Self::ReadOnly { tool, arguments };
        }

        match name {
            SELECT_ACTIVE_INTENT => Self::SelectActiveIntent(decode(arguments)),
            "write_to_file" => Self::WriteToFile(decode(arguments)),
            "edit_file" => Self::EditFile(decode(arguments)),
            "search_replace" => Self::SearchReplace(decode(arguments)),
            "edit" => Self::Edit(decode(arguments)),
            "apply_diff" => Self::ApplyDiff(decode(arguments)),
            "apply_patch" => Self::ApplyPatch(decode(arguments)),
            "execute_command" => Self::ExecuteCommand(decode(arguments)),
            "new_task" => Self::NewTask(decode(arguments)),
            "run_slash_command" => Self::RunSlashCommand(decode(arguments)),
            other => Self::Other {
                name: other.to_string(),
                arguments,
            },
        }
    }

    /// Wire name of the tool.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ReadOnly { tool, .. } => tool.name(),
            Self::SelectActiveIntent(_) => SELECT_ACTIVE_INTENT,
            Self::WriteToFile(_) => "write_to_file",
            Self::EditFile(_) => "edit_file",
            Self::SearchReplace(_) => "search_replace",
            Self::Edit(_) => "edit",
            Self::ApplyDiff(_) => "apply_diff",
            Self::ApplyPatch(_) => "apply_patch",
            Self::ExecuteCommand(_) => "execute_command",
            Self::NewTask(_) => "new_task",
            Self::RunSlashCommand(_) => "run_slash_command",
            Self::Other { name, .. } => name.as_str(),
        }
    }

    /// Safe or destructive.
    #[must_use]
    pub fn class(&self) -> ToolClass {
        match self {
            Self::ReadOnly { .. } | Self::SelectActiveIntent(_) | Self::Other { .. } => {
                ToolClass::Safe
            }
            Self::WriteToFile(_)
            | Self::EditFile(_)
            | Self::SearchReplace(_)
            | Self::Edit(_)
            | Self::ApplyDiff(_)
            | Self::ApplyPatch(_)
            | Self::ExecuteCommand(_)
            | Self::NewTask(_)
            | Self::RunSlashCommand(_) => ToolClass::Destructive,
        }
    }

    /// Whether this call writes, deletes, or executes.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.class() == ToolClass::Destructive
    }

    /// Content-producing writes; these are ledgered after execution.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::WriteToFile(_)
                | Self::EditFile(_)
                | Self::SearchReplace(_)
                | Self::Edit(_)
                | Self::ApplyDiff(_)
                | Self::ApplyPatch(_)
        )
    }

    /// Whether this is the intent-selection tool (exempt from the gatekeeper).
    #[must_use]
    pub fn is_intent_selection(&self) -> bool {
        matches!(self, Self::SelectActiveIntent(_))
    }

    /// Whether a valid mutation class must be declared (whole-file writes only).
    #[must_use]
    pub fn requires_mutation_class(&self) -> bool {
        matches!(self, Self::WriteToFile(_))
    }

    /// Path used for the ledger, the spatial index, and the approval prompt.
    ///
    /// A structured patch has no single target and is labelled `patch`.
    /// `None` when the call carries no string path.
    #[must_use]
    pub fn target_path(&self) -> Option<&str> {
        match self {
            Self::WriteToFile(args) => args.path.as_deref(),
            Self::EditFile(args) | Self::SearchReplace(args) | Self::Edit(args) => {
                args.file_path.as_deref()
            }
            Self::ApplyDiff(args) => args.path.as_deref(),
            Self::ApplyPatch(_) => Some(PATCH_LABEL),
            Self::ReadOnly { .. }
            | Self::SelectActiveIntent(_)
            | Self::ExecuteCommand(_)
            | Self::NewTask(_)
            | Self::RunSlashCommand(_)
            | Self::Other { .. } => None,
        }
    }

    /// Workspace path checked against the intent's owned scope.
    ///
    /// `None` for calls without a single real target file: commands,
    /// subtasks, slash commands, structured patches, and writes that carry
    /// no path.
    #[must_use]
    pub fn scope_path(&self) -> Option<&str> {
        match self {
            Self::ApplyPatch(_) => None,
            other => other.target_path().filter(|p| !p.is_empty()),
        }
    }

    /// Content hashed into the ledger entry.
    #[must_use]
    pub fn content_for_hash(&self) -> Option<&str> {
        match self {
            Self::WriteToFile(args) => Some(args.content.as_deref().unwrap_or_default()),
            Self::EditFile(args) | Self::SearchReplace(args) | Self::Edit(args) => {
                args.new_string.as_deref()
            }
            Self::ApplyDiff(args) => args.diff.as_deref(),
            Self::ApplyPatch(args) => args.patch.as_deref(),
            Self::ReadOnly { .. }
            | Self::SelectActiveIntent(_)
            | Self::ExecuteCommand(_)
            | Self::NewTask(_)
            | Self::RunSlashCommand(_)
            | Self::Other { .. } => None,
        }
    }

    /// Explicit `intent_id` argument of a mutating call.
    #[must_use]
    pub fn declared_intent_id(&self) -> Option<&str> {
        let raw = match self {
            Self::WriteToFile(args) => args.intent_id.as_deref(),
            Self::EditFile(args) | Self::SearchReplace(args) | Self::Edit(args) => {
                args.intent_id.as_deref()
            }
            Self::ApplyDiff(args) => args.intent_id.as_deref(),
            Self::ApplyPatch(args) => args.intent_id.as_deref(),
            _ => None,
        };
        raw.filter(|id| !id.is_empty())
    }

    /// Declared mutation class, if it is one of the valid values.
    #[must_use]
    pub fn declared_mutation_class(&self) -> Option<MutationClass> {
        let raw = match self {
            Self::WriteToFile(args) => args.mutation_class.as_deref(),
            Self::EditFile(args) | Self::SearchReplace(args) | Self::Edit(args) => {
                args.mutation_class.as_deref()
            }
            Self::ApplyDiff(args) => args.mutation_class.as_deref(),
            Self::ApplyPatch(args) => args.mutation_class.as_deref(),
            _ => None,
        };
        raw.and_then(MutationClass::parse)
    }
}
