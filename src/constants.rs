//! Common constants used throughout dexa.

/// Customization file names looked up at a stack root, first match wins.
pub const CUSTOMIZATION_FILES: [&str; 3] = ["dexa.json", "dexa.yml", "dexa.yaml"];

/// Ignore file read from a stack root.
pub const IGNORE_FILE: &str = ".dexaignore";

/// Project state file kept at the root of every generated project.
pub const PROJECT_FILE: &str = ".dexarc";

/// Registry file holding the user-defined stacks.
pub const REGISTRY_FILE: &str = "stacks.json";

/// Suffix marking a template file as renderable.
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Names of the stacks bundled with dexa.
pub const PREDEFINED_STACKS: [&str; 1] = ["hello-world"];

/// Folder names of the command kinds inside a stack.
pub const INIT_DIR: &str = "init";
pub const ADD_DIR: &str = "add";
pub const GENERATE_DIR: &str = "generate";
pub const HOOKS_DIR: &str = "hooks";
