//! Error handling for dexa.
//! Defines the error taxonomy and the result alias used throughout the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Custom error types for dexa operations.
///
/// Variants up to and including `InvalidPath` are domain errors: they describe
/// a situation the user can fix and are rendered as one short line. Everything
/// else wraps an underlying failure and is reported with full detail.
#[derive(Error, Debug)]
pub enum Error {
    /// The working directory has no project state file.
    #[error("The folder \"{location}\" does not contain a dexa project or its \"{rcfile}\" file cannot be found.")]
    ProjectNotFound { location: String, rcfile: String },

    #[error("Stack {name} already exists")]
    StackAlreadyExists { name: String },

    #[error("Stack {name} does not exist")]
    StackDoesNotExist { name: String },

    #[error("Stack {name} is predefined and cannot be removed")]
    PredefinedStack { name: String },

    #[error("Invalid stack name '{name}': use letters, digits, '.', '_' or '-'")]
    InvalidStackName { name: String },

    /// A stack origin that is neither a folder on disk nor a git remote.
    #[error("Stack origin '{origin}' is neither an existing folder nor a git repository")]
    InvalidOrigin { origin: String },

    #[error("Stack {stack} has no {kind} command named '{name}'")]
    CommandNotFound { stack: String, kind: String, name: String },

    /// Raised per file when `override` is unset and the target is present.
    #[error("Destination '{}' already exists. Use the override option to replace it", path.display())]
    DestinationAlreadyExists { path: PathBuf },

    /// A rendered destination path escaped the project or became empty.
    #[error("Invalid destination path '{path}' rendered from '{source_path}'")]
    InvalidPath { path: String, source_path: String },

    #[error("Customization error: {0}")]
    CustomizationError(String),

    #[error("Hook execution error: {0}")]
    HookError(String),

    #[error("Template rendering error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Git error: {0}")]
    Git2Error(#[from] git2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a domain condition rather than an underlying failure.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::ProjectNotFound { .. }
                | Error::StackAlreadyExists { .. }
                | Error::StackDoesNotExist { .. }
                | Error::PredefinedStack { .. }
                | Error::InvalidStackName { .. }
                | Error::InvalidOrigin { .. }
                | Error::CommandNotFound { .. }
                | Error::DestinationAlreadyExists { .. }
                | Error::InvalidPath { .. }
        )
    }
}

/// Convenience type alias for Results with dexa's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Domain errors are printed as their message; anything else is printed with
/// its debug representation so the underlying cause is visible.
pub fn default_error_handler(err: Error) -> ! {
    if err.is_domain() {
        eprintln!("{err}");
    } else {
        eprintln!("Something went wrong!");
        eprintln!("{err}");
        eprintln!("{err:?}");
    }
    std::process::exit(1);
}
