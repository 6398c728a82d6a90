//! Command-line interface implementation for dexa.
//! Provides argument parsing and help text formatting using clap.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use serde_json::Value;

use crate::context::{UserOptions, OVERRIDE_OPTION};

/// Command-line arguments structure for dexa.
#[derive(Parser, Debug)]
#[command(name = "dx", author, version, about = "dexa: scaffold and extend projects from reusable stacks", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the commands that render templates.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Allow dexa to override any existing files
    #[arg(short = 'o', long = "override")]
    pub override_files: bool,

    /// Extra option passed to templates and hooks, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, Value)>,
}

impl RenderArgs {
    /// User options for one invocation.
    pub fn user_options(&self) -> UserOptions {
        let mut options = UserOptions::new();
        for (key, value) in &self.set {
            options.insert(key.clone(), value.clone());
        }
        if self.override_files {
            options.insert(OVERRIDE_OPTION.to_string(), Value::Bool(true));
        }
        options
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a new project using the specified stack
    Init {
        /// Name of the stack to use, as per "dx stack list"
        #[arg(value_name = "STACK")]
        stack: String,

        /// Name of the new project. If omitted, the current folder is used
        #[arg(value_name = "PROJECT")]
        project: Option<String>,

        /// Folder where the project will be initialized. Defaults to the current folder
        #[arg(short, long, value_name = "DESTINATION")]
        path: Option<PathBuf>,

        /// Skip the confirmation when the destination already exists
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Adds a stack feature to the project in the current folder
    Add {
        /// Feature to add. Lists the available features when omitted
        #[arg(value_name = "FEATURE")]
        feature: Option<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Generates a new element in the project in the current folder
    Generate {
        /// Generator to run. Lists the available generators when omitted
        #[arg(value_name = "GENERATOR", requires = "name")]
        generator: Option<String>,

        /// Name of the new element being generated, required with GENERATOR
        #[arg(value_name = "NAME", requires = "generator")]
        name: Option<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Manages the installed stacks
    #[command(subcommand)]
    Stack(StackCommands),
}

#[derive(Subcommand, Debug)]
pub enum StackCommands {
    /// Lists all currently installed stacks
    List,

    /// Adds a new stack from a local folder or a git repository
    Add {
        /// Name of the new stack
        #[arg(value_name = "NAME")]
        name: String,

        /// Local folder or git repository containing the stack
        #[arg(value_name = "ORIGIN")]
        origin: String,

        /// Use ssh credentials to access a private repository
        #[arg(long)]
        private: bool,
    },

    /// Deletes an installed stack
    Delete {
        /// Name of the stack to remove, as per "dx stack list"
        #[arg(value_name = "NAME")]
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Parses `KEY=VALUE`; the value is read as JSON when possible and as a plain
/// string otherwise.
pub fn parse_key_value(s: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid KEY=VALUE: no '=' found in '{s}'"))?;
    if key.is_empty() {
        return Err(anyhow!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    let value = serde_json::from_str(value)
        .or_else(|_| serde_json::to_value(value))
        .with_context(|| format!("invalid value for '{key}'"))?;
    Ok((key.to_string(), value))
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                eprintln!("{e}");
                let _ = Args::command().print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
