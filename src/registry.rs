//! Registry of known stacks.
//! Combines the predefined stacks shipped with dexa and the user-defined ones
//! persisted in the registry file. One registry value is built per invocation
//! and passed to whoever needs it.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::PREDEFINED_STACKS;
use crate::error::{Error, Result};
use crate::loader::{StackFetcher, StackOrigin};
use crate::project::Project;
use crate::prompt::Prompter;
use crate::stack::{Stack, StackInfo};

/// One user-defined stack as stored in the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub name: String,
    pub origin: String,
    pub location_path: PathBuf,
    #[serde(default)]
    pub private: bool,
}

impl From<&StackInfo> for RegistryEntry {
    fn from(info: &StackInfo) -> Self {
        Self {
            name: info.name.clone(),
            origin: info.origin.clone(),
            location_path: info.location_path.clone(),
            private: info.private,
        }
    }
}

impl From<RegistryEntry> for StackInfo {
    fn from(entry: RegistryEntry) -> Self {
        Self {
            name: entry.name,
            predefined: false,
            origin: entry.origin,
            location_path: entry.location_path,
            private: entry.private,
        }
    }
}

/// Predefined and user-defined stacks, keyed by name.
#[derive(Debug)]
pub struct StackRegistry {
    config: Config,
    stacks: Vec<Stack>,
}

impl StackRegistry {
    /// Loads every known stack; commands are not discovered yet.
    ///
    /// A missing registry file means there are no user-defined stacks.
    pub fn load(config: Config) -> Result<Self> {
        let mut stacks: Vec<Stack> = PREDEFINED_STACKS
            .iter()
            .map(|name| Stack::predefined(name, config.predefined_stacks_dir.join(name)))
            .collect();

        if config.registry_file.is_file() {
            debug!("Loading stacks from {}", config.registry_file.display());
            let content = fs::read_to_string(&config.registry_file)?;
            let entries: Vec<RegistryEntry> = serde_json::from_str(&content)?;
            for entry in entries {
                if stacks.iter().any(|s| s.name() == entry.name) {
                    warn!("Ignoring duplicated stack '{}' in registry", entry.name);
                    continue;
                }
                stacks.push(Stack::new(entry.into()));
            }
        }

        Ok(Self { config, stacks })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn names(&self) -> Vec<&str> {
        self.stacks.iter().map(Stack::name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Stack> {
        self.stacks.iter_mut().find(|s| s.name() == name)
    }

    /// Like `get_mut`, failing with `StackDoesNotExist`.
    pub fn stack_mut(&mut self, name: &str) -> Result<&mut Stack> {
        self.get_mut(name).ok_or_else(|| Error::StackDoesNotExist { name: name.to_string() })
    }

    /// Writes the user-defined stacks to the registry file.
    pub fn save(&self) -> Result<()> {
        let entries: Vec<RegistryEntry> = self
            .stacks
            .iter()
            .filter(|s| !s.is_predefined())
            .map(|s| RegistryEntry::from(s.info()))
            .collect();

        if let Some(parent) = self.config.registry_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config.registry_file, serde_json::to_string_pretty(&entries)?)?;
        debug!("Saved {} stacks to {}", entries.len(), self.config.registry_file.display());
        Ok(())
    }

    /// Registers a new stack and persists the registry.
    ///
    /// An origin that exists on disk is referenced in place; anything else is
    /// fetched into the managed stacks folder first. Nothing is registered if
    /// fetching fails.
    ///
    /// # Errors
    /// * `Error::StackAlreadyExists` if `name` is taken
    /// * `Error::InvalidStackName` if `name` cannot be used as a folder name
    pub fn add_new_stack(
        &mut self,
        name: &str,
        origin: &str,
        is_private: bool,
        fetcher: &dyn StackFetcher,
    ) -> Result<&mut Stack> {
        validate_stack_name(name)?;
        if self.get(name).is_some() {
            return Err(Error::StackAlreadyExists { name: name.to_string() });
        }

        let origin = StackOrigin::from_string(origin);
        debug!("Adding stack '{}' from the {}", name, origin);
        let info = match origin {
            StackOrigin::Local(path) => {
                let path = path.canonicalize()?;
                StackInfo {
                    name: name.to_string(),
                    predefined: false,
                    origin: path.display().to_string(),
                    location_path: path,
                    private: is_private,
                }
            }
            StackOrigin::Remote(repo) => {
                let location_path = self.config.user_stacks_dir.join(name);
                fetcher.fetch(&repo, is_private, &location_path)?;
                StackInfo {
                    name: name.to_string(),
                    predefined: false,
                    origin: repo,
                    location_path,
                    private: is_private,
                }
            }
        };

        self.stacks.push(Stack::new(info));
        self.save()?;
        let index = self.stacks.len() - 1;
        Ok(&mut self.stacks[index])
    }

    /// Removes a user-defined stack and persists the registry.
    ///
    /// Managed stack folders are deleted; local folders stay on disk.
    pub fn delete_stack_by_name(&mut self, name: &str) -> Result<()> {
        let index = self
            .stacks
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| Error::StackDoesNotExist { name: name.to_string() })?;
        if self.stacks[index].is_predefined() {
            return Err(Error::PredefinedStack { name: name.to_string() });
        }

        self.stacks[index].cleanup()?;
        self.stacks.remove(index);
        self.save()
    }

    /// Finds the stack a project was created with, offering to add it back
    /// from the recorded origin when it is not installed.
    ///
    /// # Returns
    /// * `Result<Option<&mut Stack>>` - `None` when the user declines
    pub fn ensure_stack_from_project(
        &mut self,
        project: &Project,
        prompt: &dyn Prompter,
        fetcher: &dyn StackFetcher,
    ) -> Result<Option<&mut Stack>> {
        let reference = &project.stack_reference;
        if self.get(&reference.name).is_none() {
            let proceed = prompt.confirm(
                false,
                format!(
                    "The stack {} is not installed locally. Do you want to add it?",
                    reference.name
                ),
            )?;
            if !proceed {
                return Ok(None);
            }
            self.add_new_stack(&reference.name, &reference.origin, reference.private, fetcher)?;
        }
        Ok(self.get_mut(&reference.name))
    }
}

/// Stack names double as folder names: an ASCII letter or digit followed by
/// letters, digits, `.`, `_` or `-`.
pub fn validate_stack_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidStackName { name: name.to_string() })
    }
}
