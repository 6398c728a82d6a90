//! Commands: one renderable unit of a stack (`init`, or one `add`/`generate`
//! variant) bound to a template directory and optional lifecycle hooks.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::{RenderContext, UserOptions};
use crate::customization::CommandCustomization;
use crate::error::Result;
use crate::hooks::{CommandHooks, HookArgs, HookStage};
use crate::project::Project;
use crate::render::{render_tree, RenderedFile};
use crate::renderer::MiniJinjaRenderer;
use crate::stack::StackInfo;

/// The three kinds of commands a stack can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Init,
    Add,
    Generate,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Init => write!(f, "init"),
            CommandKind::Add => write!(f, "add"),
            CommandKind::Generate => write!(f, "generate"),
        }
    }
}

/// A command discovered in a stack.
///
/// Name, template path and stack are fixed at discovery; a customization may
/// only contribute the description and the hooks.
#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    name: String,
    description: String,
    template_path: PathBuf,
    stack: StackInfo,
    ignore: GlobSet,
    hooks: CommandHooks,
}

impl Command {
    pub(crate) fn new(
        kind: CommandKind,
        name: impl Into<String>,
        template_path: PathBuf,
        stack: StackInfo,
        ignore: GlobSet,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            template_path,
            stack,
            ignore,
            hooks: CommandHooks::default(),
        }
    }

    /// Merges a customization into the discovered command.
    pub(crate) fn customize(mut self, customization: &CommandCustomization) -> Self {
        if let Some(description) = &customization.description {
            self.description = description.clone();
        }
        let hooks = &customization.hooks;
        if hooks.pre_action.is_some() {
            self.hooks.pre_action = hooks.pre_action.clone();
        }
        if hooks.action.is_some() {
            self.hooks.action = hooks.action.clone();
        }
        if hooks.post_action.is_some() {
            self.hooks.post_action = hooks.post_action.clone();
        }
        self
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Identity of the stack this command belongs to.
    pub fn stack(&self) -> &StackInfo {
        &self.stack
    }

    pub fn hooks(&self) -> &CommandHooks {
        &self.hooks
    }

    /// Default action: renders the whole template tree into the project.
    pub async fn render(
        &self,
        project: &Project,
        user_options: &UserOptions,
    ) -> Result<Vec<RenderedFile>> {
        let context = RenderContext::new(project, self, user_options).to_value()?;
        let engine = MiniJinjaRenderer::new();
        render_tree(
            &self.template_path,
            &project.location_path,
            &self.ignore,
            user_options,
            &context,
            &engine,
        )
        .await
    }

    /// Runs the command lifecycle: preAction, action, postAction.
    ///
    /// Stages run strictly in order and the first failure stops the rest.
    /// Without a custom action the template tree is rendered and the result is
    /// `{"renderedFiles": [...]}`.
    pub async fn apply(&self, project: &Project, user_options: &mut UserOptions) -> Result<Value> {
        debug!("Applying {} command '{}' of stack '{}'.", self.kind, self.name, self.stack.name);

        if let Some(hook) = &self.hooks.pre_action {
            hook.call(HookArgs {
                stage: HookStage::PreAction,
                project,
                command: self,
                user_options: &mut *user_options,
                action_result: None,
            })
            .await?;
        }

        let action_result = match &self.hooks.action {
            Some(hook) => {
                hook.call(HookArgs {
                    stage: HookStage::Action,
                    project,
                    command: self,
                    user_options: &mut *user_options,
                    action_result: None,
                })
                .await?
            }
            None => {
                let rendered_files = self.render(project, user_options).await?;
                json!({ "renderedFiles": rendered_files })
            }
        };

        if let Some(hook) = &self.hooks.post_action {
            hook.call(HookArgs {
                stage: HookStage::PostAction,
                project,
                command: self,
                user_options: &mut *user_options,
                action_result: Some(&action_result),
            })
            .await?;
        }

        Ok(action_result)
    }
}
