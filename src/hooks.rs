//! Lifecycle hooks attached to commands.
//! A hook is any `Hook` implementation; stacks declare hooks as executable
//! scripts that receive the render context as JSON on stdin.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::command::Command;
use crate::context::{RenderContext, UserOptions};
use crate::error::{Error, Result};
use crate::project::Project;

/// Lifecycle stage a hook runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HookStage {
    PreAction,
    Action,
    PostAction,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::PreAction => write!(f, "preAction"),
            HookStage::Action => write!(f, "action"),
            HookStage::PostAction => write!(f, "postAction"),
        }
    }
}

/// Inputs handed to a hook.
pub struct HookArgs<'a> {
    pub stage: HookStage,
    pub project: &'a Project,
    pub command: &'a Command,
    /// Shared with the later stages; a preAction may insert derived values.
    pub user_options: &'a mut UserOptions,
    /// Result of the action stage, only set for postAction.
    pub action_result: Option<&'a Value>,
}

impl HookArgs<'_> {
    /// Snapshot of the invocation, safe to serialize.
    pub fn context(&self) -> RenderContext {
        RenderContext::new(self.project, self.command, self.user_options)
    }
}

/// A callback run at one lifecycle stage of a command.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Runs the hook. The returned value is the action result when the hook
    /// is an action and is ignored otherwise.
    async fn call(&self, args: HookArgs<'_>) -> Result<Value>;
}

/// The optional hooks of one command.
#[derive(Clone, Default)]
pub struct CommandHooks {
    pub pre_action: Option<Arc<dyn Hook>>,
    pub action: Option<Arc<dyn Hook>>,
    pub post_action: Option<Arc<dyn Hook>>,
}

impl fmt::Debug for CommandHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHooks")
            .field("pre_action", &self.pre_action.is_some())
            .field("action", &self.action.is_some())
            .field("post_action", &self.post_action.is_some())
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptInput<'a> {
    stage: HookStage,
    #[serde(flatten)]
    context: RenderContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_result: Option<&'a Value>,
}

/// Hook backed by an executable script from the stack.
///
/// The script runs inside the project directory with the stage and render
/// context as JSON on stdin. A JSON object printed by a preAction script is
/// merged into the user options; whatever an action script prints becomes the
/// action result.
#[derive(Debug, Clone)]
pub struct ScriptHook {
    script: PathBuf,
}

impl ScriptHook {
    pub fn new<P: AsRef<Path>>(script: P) -> Self {
        Self { script: script.as_ref().to_path_buf() }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

#[async_trait]
impl Hook for ScriptHook {
    async fn call(&self, mut args: HookArgs<'_>) -> Result<Value> {
        let input = ScriptInput {
            stage: args.stage,
            context: args.context(),
            action_result: args.action_result,
        };
        let payload = serde_json::to_vec(&input)?;

        debug!("Running {} hook '{}'.", args.stage, self.script.display());
        let mut child = tokio::process::Command::new(&self.script)
            .current_dir(&args.project.location_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                Error::HookError(format!("failed to start '{}': {e}", self.script.display()))
            })?;

        // stdin is fed while stdout is drained so neither pipe can fill up and
        // block the script.
        let stdin = child.stdin.take();
        let write_input = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&payload).await {
                // A script that never reads its input may exit before the write completes.
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };
        let (written, output) = tokio::join!(write_input, child.wait_with_output());
        let output = output?;
        written?;
        if !output.status.success() {
            return Err(Error::HookError(format!(
                "{} hook '{}' failed with status: {}",
                args.stage,
                self.script.display(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(stdout).map_err(|e| {
            Error::HookError(format!(
                "{} hook '{}' printed invalid JSON: {e}",
                args.stage,
                self.script.display()
            ))
        })?;

        if args.stage == HookStage::PreAction {
            if let Value::Object(map) = &value {
                args.user_options.extend(map.clone());
            }
        }
        Ok(value)
    }
}
