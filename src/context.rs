//! Render context handed to templates and hooks.
//! The context is a plain serializable snapshot; it never holds the live
//! stack and command objects.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::command::Command;
use crate::project::Project;
use crate::stack::StackInfo;

/// Parameters supplied for one command invocation.
pub type UserOptions = Map<String, Value>;

/// Key of the overwrite policy flag inside `UserOptions`.
pub const OVERRIDE_OPTION: &str = "override";

/// Whether `options` ask for existing destinations to be replaced.
///
/// Any truthy JSON value counts: `true`, non-zero numbers, non-empty strings.
pub fn is_override(options: &UserOptions) -> bool {
    match options.get(OVERRIDE_OPTION) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Project fields visible to templates.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub name: String,
    pub location_path: PathBuf,
    pub features: Vec<String>,
}

/// Command fields visible to templates.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandContext {
    pub name: String,
    pub path: PathBuf,
}

/// Acyclic snapshot of everything a template or hook may look at.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub project: ProjectContext,
    pub stack: StackInfo,
    pub command: CommandContext,
    pub user_options: UserOptions,
}

impl RenderContext {
    pub fn new(project: &Project, command: &Command, user_options: &UserOptions) -> Self {
        Self {
            project: ProjectContext {
                name: project.name.clone(),
                location_path: project.location_path.clone(),
                features: project.features.iter().cloned().collect(),
            },
            stack: command.stack().clone(),
            command: CommandContext {
                name: command.name().to_string(),
                path: command.template_path().to_path_buf(),
            },
            user_options: user_options.clone(),
        }
    }

    /// Serializes the snapshot into the value templates are rendered against.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
