//! Stack customization loading.
//! A stack may ship a `dexa.json`, `dexa.yml` or `dexa.yaml` file at its root
//! that adds descriptions and hook scripts to the commands discovered from its
//! folder layout. The file is validated once, when the stack is loaded.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::command::CommandKind;
use crate::constants::CUSTOMIZATION_FILES;
use crate::error::{Error, Result};
use crate::hooks::{CommandHooks, Hook, ScriptHook};

/// Keys a customization may not redefine on a command.
const COMMAND_IDENTITY_KEYS: [&str; 3] = ["name", "templatePath", "stack"];

/// Keys a customization may not redefine on a stack.
const STACK_IDENTITY_KEYS: [&str; 5] = ["name", "origin", "locationPath", "predefined", "private"];

/// What a customization contributes to one command.
#[derive(Debug, Clone, Default)]
pub struct CommandCustomization {
    pub description: Option<String>,
    pub hooks: CommandHooks,
}

impl CommandCustomization {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_pre_action(mut self, hook: impl Hook + 'static) -> Self {
        self.hooks.pre_action = Some(Arc::new(hook));
        self
    }

    pub fn with_action(mut self, hook: impl Hook + 'static) -> Self {
        self.hooks.action = Some(Arc::new(hook));
        self
    }

    pub fn with_post_action(mut self, hook: impl Hook + 'static) -> Self {
        self.hooks.post_action = Some(Arc::new(hook));
        self
    }
}

/// Normalized customization of a whole stack: `{init, add, generate}`.
#[derive(Debug, Clone, Default)]
pub struct Customization {
    pub init: CommandCustomization,
    pub add: IndexMap<String, CommandCustomization>,
    pub generate: IndexMap<String, CommandCustomization>,
}

impl Customization {
    /// Customization entry for a command, if any.
    pub fn for_command(&self, kind: CommandKind, name: &str) -> Option<&CommandCustomization> {
        match kind {
            CommandKind::Init => Some(&self.init),
            CommandKind::Add => self.add.get(name),
            CommandKind::Generate => self.generate.get(name),
        }
    }

    /// Customized names of `kind` commands.
    pub fn names(&self, kind: CommandKind) -> Vec<&str> {
        match kind {
            CommandKind::Init => vec!["init"],
            CommandKind::Add => self.add.keys().map(String::as_str).collect(),
            CommandKind::Generate => self.generate.keys().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CustomizationFile {
    #[serde(default)]
    init: CommandEntry,
    #[serde(default)]
    add: IndexMap<String, CommandEntry>,
    #[serde(default)]
    generate: IndexMap<String, CommandEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CommandEntry {
    description: Option<String>,
    #[serde(rename = "preAction", alias = "pre_action")]
    pre_action: Option<String>,
    action: Option<String>,
    #[serde(rename = "postAction", alias = "post_action")]
    post_action: Option<String>,
}

/// JSON schema every customization document must satisfy.
pub fn customization_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "init": { "$ref": "#/$defs/command" },
            "add": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/command" }
            },
            "generate": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/command" }
            }
        },
        "$defs": {
            "command": {
                "type": "object",
                "properties": {
                    "description": { "type": "string" },
                    "preAction": { "type": "string" },
                    "pre_action": { "type": "string" },
                    "action": { "type": "string" },
                    "postAction": { "type": "string" },
                    "post_action": { "type": "string" }
                }
            }
        }
    })
}

/// Finds the customization file of a stack, if it has one.
pub fn find_customization_file<P: AsRef<Path>>(stack_root: P) -> Option<std::path::PathBuf> {
    CUSTOMIZATION_FILES
        .iter()
        .map(|file| stack_root.as_ref().join(file))
        .find(|path| path.is_file())
}

/// Loads and validates the customization of the stack at `stack_root`.
///
/// # Returns
/// * `Result<Customization>` - Empty defaults when the stack has no
///   customization file
///
/// # Errors
/// * `Error::CustomizationError` if the file cannot be parsed, does not match
///   the schema or names a hook script that does not exist
pub fn load_customization<P: AsRef<Path>>(stack_root: P) -> Result<Customization> {
    let stack_root = stack_root.as_ref();
    let Some(path) = find_customization_file(stack_root) else {
        debug!("No customization file in {}", stack_root.display());
        return Ok(Customization::default());
    };

    debug!("Loading customization from {}", path.display());
    let content = std::fs::read_to_string(&path)?;
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    parse_customization(&content, stack_root, &file_name)
}

/// Parses a customization document, JSON first and YAML second.
pub fn parse_customization(content: &str, stack_root: &Path, file_name: &str) -> Result<Customization> {
    if content.trim().is_empty() {
        return Ok(Customization::default());
    }
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => serde_yaml::from_str(content).map_err(|e| {
            Error::CustomizationError(format!("{file_name}: invalid format: {e}"))
        })?,
    };
    if value.is_null() {
        return Ok(Customization::default());
    }

    validate(&value, file_name)?;
    warn_identity_keys(&value, file_name);

    let file: CustomizationFile = serde_json::from_value(value)
        .map_err(|e| Error::CustomizationError(format!("{file_name}: invalid schema: {e}")))?;

    Ok(Customization {
        init: resolve_entry(file.init, stack_root)?,
        add: resolve_entries(file.add, stack_root)?,
        generate: resolve_entries(file.generate, stack_root)?,
    })
}

fn validate(value: &Value, file_name: &str) -> Result<()> {
    let validator = jsonschema::validator_for(&customization_schema())
        .map_err(|e| Error::CustomizationError(format!("invalid customization schema: {e}")))?;
    let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::CustomizationError(format!("{file_name}: {}", errors.join("; "))))
    }
}

fn warn_identity_keys(value: &Value, file_name: &str) {
    let Some(root) = value.as_object() else { return };
    for key in STACK_IDENTITY_KEYS.iter().filter(|k| root.contains_key(**k)) {
        warn!("{file_name}: ignoring stack identity field '{key}'");
    }

    let commands = root
        .get("init")
        .into_iter()
        .chain(["add", "generate"].iter().filter_map(|kind| root.get(*kind)).flat_map(|m| {
            m.as_object().into_iter().flat_map(|entries| entries.values())
        }));
    for entry in commands.filter_map(Value::as_object) {
        for key in COMMAND_IDENTITY_KEYS.iter().filter(|k| entry.contains_key(**k)) {
            warn!("{file_name}: ignoring command identity field '{key}'");
        }
    }
}

fn resolve_entries(
    entries: IndexMap<String, CommandEntry>,
    stack_root: &Path,
) -> Result<IndexMap<String, CommandCustomization>> {
    entries
        .into_iter()
        .map(|(name, entry)| Ok((name, resolve_entry(entry, stack_root)?)))
        .collect()
}

fn resolve_entry(entry: CommandEntry, stack_root: &Path) -> Result<CommandCustomization> {
    Ok(CommandCustomization {
        description: entry.description,
        hooks: CommandHooks {
            pre_action: script_hook(entry.pre_action, stack_root)?,
            action: script_hook(entry.action, stack_root)?,
            post_action: script_hook(entry.post_action, stack_root)?,
        },
    })
}

fn script_hook(script: Option<String>, stack_root: &Path) -> Result<Option<Arc<dyn Hook>>> {
    let Some(script) = script else { return Ok(None) };
    let path = stack_root.join(&script);
    if !path.is_file() {
        return Err(Error::CustomizationError(format!(
            "hook script '{}' not found",
            path.display()
        )));
    }
    Ok(Some(Arc::new(ScriptHook::new(path))))
}
