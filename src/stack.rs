//! Stacks and command discovery.
//! A stack is a folder laid out as `init/`, `add/<name>/` and
//! `generate/<name>/`, optionally customized by a file at its root. Commands
//! are discovered from that layout and merged with the customization.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandKind};
use crate::constants::{ADD_DIR, GENERATE_DIR, INIT_DIR};
use crate::customization::{load_customization, Customization};
use crate::error::{Error, Result};
use crate::ignore::build_ignore_set;

/// Identity of a stack. Commands and render contexts hold copies of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackInfo {
    pub name: String,
    pub predefined: bool,
    /// Local path or remote reference the stack was added from.
    pub origin: String,
    /// Local folder holding the stack files.
    pub location_path: PathBuf,
    /// Fetch remote origins with ssh credentials.
    pub private: bool,
}

impl StackInfo {
    /// Whether the stack folder is referenced in place rather than managed.
    pub fn is_local(&self) -> bool {
        self.location_path == Path::new(&self.origin)
    }
}

/// Commands discovered in a stack.
#[derive(Debug, Clone)]
pub struct StackCommands {
    pub init: Command,
    pub add: IndexMap<String, Command>,
    pub generate: IndexMap<String, Command>,
}

impl StackCommands {
    pub fn get(&self, kind: CommandKind, name: &str) -> Option<&Command> {
        match kind {
            CommandKind::Init => (name == self.init.name()).then_some(&self.init),
            CommandKind::Add => self.add.get(name),
            CommandKind::Generate => self.generate.get(name),
        }
    }

    /// Commands of one kind, ordered by name.
    pub fn of_kind(&self, kind: CommandKind) -> Vec<&Command> {
        match kind {
            CommandKind::Init => vec![&self.init],
            CommandKind::Add => self.add.values().collect(),
            CommandKind::Generate => self.generate.values().collect(),
        }
    }

    pub fn names(&self, kind: CommandKind) -> Vec<&str> {
        self.of_kind(kind).into_iter().map(Command::name).collect()
    }
}

/// A stack known to the registry.
#[derive(Debug, Clone)]
pub struct Stack {
    info: StackInfo,
    commands: Option<StackCommands>,
}

impl Stack {
    /// Creates a stack whose commands are not yet discovered.
    pub fn new(info: StackInfo) -> Self {
        Self { info, commands: None }
    }

    /// A stack bundled with dexa, living in `location_path`.
    pub fn predefined<P: AsRef<Path>>(name: &str, location_path: P) -> Self {
        let location_path = location_path.as_ref().to_path_buf();
        Self::new(StackInfo {
            name: name.to_string(),
            predefined: true,
            origin: location_path.display().to_string(),
            location_path,
            private: false,
        })
    }

    pub fn info(&self) -> &StackInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn origin(&self) -> &str {
        &self.info.origin
    }

    pub fn location_path(&self) -> &Path {
        &self.info.location_path
    }

    pub fn is_predefined(&self) -> bool {
        self.info.predefined
    }

    pub fn is_private(&self) -> bool {
        self.info.private
    }

    /// Discovered commands, `None` until `load_commands` ran.
    pub fn commands(&self) -> Option<&StackCommands> {
        self.commands.as_ref()
    }

    /// Discovers the commands using the stack's customization file.
    pub fn load_commands(&mut self) -> Result<&StackCommands> {
        let customization = load_customization(&self.info.location_path)?;
        self.load_commands_with(&customization)
    }

    /// Discovers the commands and merges them with `customization`.
    pub fn load_commands_with(&mut self, customization: &Customization) -> Result<&StackCommands> {
        let commands = discover_commands(&self.info, customization)?;
        Ok(self.commands.insert(commands))
    }

    /// Looks up a command, discovering the commands first if needed.
    pub fn command(&mut self, kind: CommandKind, name: &str) -> Result<&Command> {
        if self.commands.is_none() {
            self.load_commands()?;
        }
        self.commands
            .as_ref()
            .and_then(|commands| commands.get(kind, name))
            .ok_or_else(|| Error::CommandNotFound {
                stack: self.info.name.clone(),
                kind: kind.to_string(),
                name: name.to_string(),
            })
    }

    /// Removes the managed stack folder. Local stacks are left on disk.
    pub fn cleanup(&self) -> Result<()> {
        if self.info.is_local() {
            debug!("Keeping local stack folder '{}'.", self.info.location_path.display());
            return Ok(());
        }
        match fs::remove_dir_all(&self.info.location_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(Error::IoError(e)),
            _ => Ok(()),
        }
    }
}

/// Builds the command table of a stack from its folder layout.
pub fn discover_commands(info: &StackInfo, customization: &Customization) -> Result<StackCommands> {
    let root = &info.location_path;
    if !root.is_dir() {
        return Err(Error::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("stack folder '{}' not found", root.display()),
        )));
    }

    let init_dir = root.join(INIT_DIR);
    let (init_path, init_is_root) =
        if init_dir.is_dir() { (init_dir, false) } else { (root.clone(), true) };
    debug!("Stack '{}' init template: {}", info.name, init_path.display());

    let init = Command::new(
        CommandKind::Init,
        "init",
        init_path,
        info.clone(),
        build_ignore_set(root, init_is_root)?,
    );
    let init = match customization.for_command(CommandKind::Init, "init") {
        Some(custom) => init.customize(custom),
        None => init,
    };

    let add = discover_kind(info, customization, CommandKind::Add, ADD_DIR)?;
    let generate = discover_kind(info, customization, CommandKind::Generate, GENERATE_DIR)?;

    Ok(StackCommands { init, add, generate })
}

fn discover_kind(
    info: &StackInfo,
    customization: &Customization,
    kind: CommandKind,
    dir: &str,
) -> Result<IndexMap<String, Command>> {
    let mut commands = IndexMap::new();
    for (name, path) in subdirectories(&info.location_path.join(dir))? {
        let command = Command::new(
            kind,
            name.clone(),
            path,
            info.clone(),
            build_ignore_set(&info.location_path, false)?,
        );
        let command = match customization.for_command(kind, &name) {
            Some(custom) => command.customize(custom),
            None => command,
        };
        commands.insert(name, command);
    }

    for name in customization.names(kind) {
        if !commands.contains_key(name) {
            warn!("Stack '{}' customizes unknown {kind} command '{name}'", info.name);
        }
    }
    Ok(commands)
}

/// Immediate subdirectories of `dir` as `(name, path)`, sorted by name.
/// A missing `dir` yields no entries.
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::IoError(e)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            dirs.push((name.to_string(), entry.path()));
        }
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}
