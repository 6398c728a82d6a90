//! Projects created from a stack.
//! A project remembers its name, the stack it was created with and the `add`
//! features applied to it in a `.dexarc` file at its root.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

use crate::command::{Command, CommandKind};
use crate::constants::PROJECT_FILE;
use crate::context::UserOptions;
use crate::error::{Error, Result};
use crate::stack::{Stack, StackInfo};

/// Stack a project was created with, enough to fetch it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackReference {
    pub name: String,
    pub origin: String,
    #[serde(default)]
    pub private: bool,
}

impl From<&StackInfo> for StackReference {
    fn from(info: &StackInfo) -> Self {
        Self {
            name: info.name.clone(),
            origin: info.origin.clone(),
            private: info.private,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub stack_reference: StackReference,
    /// Names of the applied `add` commands.
    #[serde(default)]
    pub features: IndexSet<String>,
    /// Project root; not persisted.
    #[serde(skip)]
    pub location_path: PathBuf,
}

impl Project {
    pub fn new<P: AsRef<Path>>(name: impl Into<String>, stack: &StackInfo, location_path: P) -> Self {
        Self {
            name: name.into(),
            stack_reference: stack.into(),
            features: IndexSet::new(),
            location_path: location_path.as_ref().to_path_buf(),
        }
    }

    /// Path of the project state file.
    pub fn state_file(&self) -> PathBuf {
        self.location_path.join(PROJECT_FILE)
    }

    /// Loads the project rooted at `location_path`.
    ///
    /// # Errors
    /// * `Error::ProjectNotFound` if the folder has no `.dexarc` file
    pub fn load<P: AsRef<Path>>(location_path: P) -> Result<Self> {
        let location_path = location_path.as_ref();
        let state_file = location_path.join(PROJECT_FILE);
        if !state_file.is_file() {
            return Err(Error::ProjectNotFound {
                location: location_path.display().to_string(),
                rcfile: PROJECT_FILE.to_string(),
            });
        }

        debug!("Loading project from {}", state_file.display());
        let content = std::fs::read_to_string(&state_file)?;
        let mut project: Project = serde_json::from_str(&content)?;
        project.location_path = location_path.to_path_buf();
        Ok(project)
    }

    /// Writes the project state file.
    pub async fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(self.state_file(), content).await?;
        Ok(())
    }

    /// Creates a project in `destination` from the stack's init command.
    ///
    /// The state file is written once the init command succeeded.
    pub async fn init<P: AsRef<Path>>(
        name: impl Into<String>,
        stack: &mut Stack,
        destination: P,
        user_options: &mut UserOptions,
    ) -> Result<(Self, Value)> {
        let destination = destination.as_ref();
        fs::create_dir_all(destination).await?;

        let project = Project::new(name, stack.info(), destination);
        debug!(
            "Creating project '{}' in '{}' using stack '{}'.",
            project.name,
            destination.display(),
            stack.name()
        );

        let command = stack.command(CommandKind::Init, "init")?;
        let result = command.apply(&project, user_options).await?;
        project.save().await?;
        Ok((project, result))
    }

    /// Applies an `add` command and records it as a feature.
    ///
    /// The feature is recorded, and the state file saved, only when the
    /// command succeeded. Applying a feature twice records it once.
    pub async fn add_feature(
        &mut self,
        command: &Command,
        user_options: &mut UserOptions,
    ) -> Result<Value> {
        let result = command.apply(self, user_options).await?;
        self.features.insert(command.name().to_string());
        self.save().await?;
        Ok(result)
    }

    /// Applies a `generate` command. Generated elements are not recorded.
    pub async fn generate(&self, command: &Command, user_options: &mut UserOptions) -> Result<Value> {
        command.apply(self, user_options).await
    }
}
