//! dexa scaffolds new projects and extends existing ones from reusable stacks.
//! A stack is a folder of templates with `init`, `add` and `generate`
//! commands discovered from its layout, optionally customized with hooks.

/// Command-line interface of the `dx` binary
pub mod cli;

/// Commands and their preAction/action/postAction lifecycle
pub mod command;

/// Filesystem locations used by the registry
pub mod config;

/// Common constants
pub mod constants;

/// Render context snapshot and user options
pub mod context;

/// Stack customization files (dexa.json, dexa.yml, dexa.yaml)
pub mod customization;

/// Error types and handling
pub mod error;

/// Lifecycle hooks
pub mod hooks;

/// Ignore patterns for template walks
pub mod ignore;

/// Stack origins and remote materialization
pub mod loader;

/// Logger setup
pub mod logger;

/// Destination path resolution
pub mod paths;

/// Projects and their state file
pub mod project;

/// User interaction
pub mod prompt;

/// Stack registry
pub mod registry;

/// File rendering and template tree rendering
pub mod render;

/// Template engine adapter
pub mod renderer;

/// Stacks and command discovery
pub mod stack;

/// Template tree walking
pub mod walker;
