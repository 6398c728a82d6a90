//! Configuration handling for dexa.
//! Resolves where predefined stacks live, where remote stacks are materialized
//! and where the registry of user-defined stacks is persisted.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::REGISTRY_FILE;

/// Environment variable overriding the dexa home directory.
pub const HOME_ENV: &str = "DEXA_HOME";

/// Environment variable overriding the predefined stacks directory.
pub const PREDEFINED_STACKS_ENV: &str = "DEXA_PREDEFINED_STACKS";

/// Filesystem locations used by the stack registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the bundled stacks, one folder per predefined stack.
    pub predefined_stacks_dir: PathBuf,
    /// Directory remote stacks are cloned into, one folder per stack name.
    pub user_stacks_dir: PathBuf,
    /// JSON file listing the user-defined stacks.
    pub registry_file: PathBuf,
}

impl Config {
    /// Builds a configuration rooted at `home`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(home: P, predefined_stacks_dir: Q) -> Self {
        let home = home.as_ref();
        Self {
            predefined_stacks_dir: predefined_stacks_dir.as_ref().to_path_buf(),
            user_stacks_dir: home.join("stacks"),
            registry_file: home.join(REGISTRY_FILE),
        }
    }

    /// Resolves the configuration from the environment.
    ///
    /// # Notes
    /// - `DEXA_HOME` wins, then `~/.dexa`, then `.dexa` in the working directory
    /// - `DEXA_PREDEFINED_STACKS` wins over the `stacks/predefined` folder shipped
    ///   with the crate
    pub fn from_env() -> Self {
        let home = env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|dir| dir.join(".dexa")))
            .unwrap_or_else(|| PathBuf::from(".dexa"));
        let predefined = env::var_os(PREDEFINED_STACKS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_predefined_stacks_dir);

        debug!(
            "Using dexa home '{}' and predefined stacks from '{}'.",
            home.display(),
            predefined.display()
        );
        Self::new(home, predefined)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_predefined_stacks_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("stacks").join("predefined")
}
