use std::fs;
use std::path::Path;

use dexa::command::CommandKind;
use dexa::customization::{CommandCustomization, Customization};
use dexa::error::Error;
use dexa::stack::{Stack, StackInfo};
use tempfile::TempDir;

fn local_stack(root: &Path, name: &str) -> Stack {
    Stack::new(StackInfo {
        name: name.to_string(),
        predefined: false,
        origin: root.display().to_string(),
        location_path: root.to_path_buf(),
        private: false,
    })
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn templates_only_stack(root: &Path) {
    write(root, "init/index.js", "console.log('hi');\n");
    write(root, "add/unit-test/test/index.test.js", "");
    write(root, "add/lint/.eslintrc", "{}");
    write(root, "generate/greeter/__name__.js.j2", "");
    write(root, "generate/README.md", "not a command\n");
}

#[test]
fn test_discovers_commands_from_layout() {
    let temp_dir = TempDir::new().unwrap();
    templates_only_stack(temp_dir.path());

    let mut stack = local_stack(temp_dir.path(), "templates-only");
    let commands = stack.load_commands().unwrap();

    assert_eq!(commands.init.name(), "init");
    assert_eq!(commands.init.template_path(), temp_dir.path().join("init"));
    assert_eq!(commands.init.description(), "");
    assert_eq!(commands.names(CommandKind::Add), vec!["lint", "unit-test"]);
    assert_eq!(commands.names(CommandKind::Generate), vec!["greeter"]);

    let greeter = commands.get(CommandKind::Generate, "greeter").unwrap();
    assert_eq!(greeter.kind(), CommandKind::Generate);
    assert_eq!(greeter.template_path(), temp_dir.path().join("generate/greeter"));
    assert_eq!(greeter.stack().name, "templates-only");
}

#[test]
fn test_init_only_stack_uses_root() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "index.js", "");

    let mut stack = local_stack(temp_dir.path(), "init-only");
    let commands = stack.load_commands().unwrap();

    assert_eq!(commands.init.template_path(), temp_dir.path());
    assert!(commands.add.is_empty());
    assert!(commands.generate.is_empty());
}

#[test]
fn test_discovery_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    templates_only_stack(temp_dir.path());
    let mut stack = local_stack(temp_dir.path(), "templates-only");

    let first: Vec<(String, std::path::PathBuf)> = stack
        .load_commands()
        .unwrap()
        .of_kind(CommandKind::Add)
        .iter()
        .map(|c| (c.name().to_string(), c.template_path().to_path_buf()))
        .collect();
    let second: Vec<(String, std::path::PathBuf)> = stack
        .load_commands()
        .unwrap()
        .of_kind(CommandKind::Add)
        .iter()
        .map(|c| (c.name().to_string(), c.template_path().to_path_buf()))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_customization_only_adds_description_and_hooks() {
    let temp_dir = TempDir::new().unwrap();
    templates_only_stack(temp_dir.path());

    let mut customization = Customization {
        init: CommandCustomization::default().with_description("Creates the app"),
        ..Default::default()
    };
    customization.generate.insert(
        "greeter".to_string(),
        CommandCustomization::default().with_description("Adds a greeter"),
    );
    customization.add.insert(
        "missing".to_string(),
        CommandCustomization::default().with_description("No folder for this one"),
    );

    let mut stack = local_stack(temp_dir.path(), "custom");
    let commands = stack.load_commands_with(&customization).unwrap();

    assert_eq!(commands.init.description(), "Creates the app");
    assert_eq!(commands.init.template_path(), temp_dir.path().join("init"));
    let greeter = commands.get(CommandKind::Generate, "greeter").unwrap();
    assert_eq!(greeter.description(), "Adds a greeter");
    assert_eq!(greeter.name(), "greeter");
    assert_eq!(greeter.stack().location_path, temp_dir.path());
    assert_eq!(commands.get(CommandKind::Add, "unit-test").unwrap().description(), "");
    // customizations only decorate commands that exist on disk
    assert!(commands.get(CommandKind::Add, "missing").is_none());
}

#[test]
fn test_identity_keys_in_file_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    templates_only_stack(temp_dir.path());
    write(
        temp_dir.path(),
        "dexa.json",
        r#"{
            "name": "renamed",
            "origin": "github:someone/else",
            "locationPath": "/elsewhere",
            "predefined": true,
            "private": true,
            "init": { "name": "other", "templatePath": "/etc", "description": "Init it" }
        }"#,
    );

    let mut stack = local_stack(temp_dir.path(), "custom");
    let commands = stack.load_commands().unwrap();

    assert_eq!(commands.init.name(), "init");
    assert_eq!(commands.init.template_path(), temp_dir.path().join("init"));
    assert_eq!(commands.init.description(), "Init it");
    assert_eq!(stack.name(), "custom");
    assert_eq!(stack.origin(), temp_dir.path().display().to_string());
    assert_eq!(stack.location_path(), temp_dir.path());
    assert!(!stack.is_predefined());
    assert!(!stack.is_private());
}

#[test]
fn test_command_lookup_is_lazy() {
    let temp_dir = TempDir::new().unwrap();
    templates_only_stack(temp_dir.path());
    let mut stack = local_stack(temp_dir.path(), "lazy");

    assert!(stack.commands().is_none());
    assert_eq!(stack.command(CommandKind::Add, "lint").unwrap().name(), "lint");
    assert!(stack.commands().is_some());

    let err = stack.command(CommandKind::Generate, "nope").unwrap_err();
    assert!(matches!(err, Error::CommandNotFound { ref name, .. } if name == "nope"));
    assert!(err.is_domain());
}

#[test]
fn test_missing_stack_folder_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut stack = local_stack(&temp_dir.path().join("gone"), "gone");

    assert!(matches!(stack.load_commands(), Err(Error::IoError(_))));
}

#[test]
fn test_invalid_customization_fails_discovery() {
    let temp_dir = TempDir::new().unwrap();
    templates_only_stack(temp_dir.path());
    write(temp_dir.path(), "dexa.yml", "add: [1, 2]\n");

    let mut stack = local_stack(temp_dir.path(), "broken");
    assert!(matches!(stack.load_commands(), Err(Error::CustomizationError(_))));
}

#[test]
fn test_bundled_hello_world_stack() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("stacks/predefined/hello-world");
    let mut stack = Stack::predefined("hello-world", &root);
    let commands = stack.load_commands().unwrap();

    assert!(!commands.init.description().is_empty());
    assert_eq!(commands.names(CommandKind::Add), vec!["unit-test"]);
    assert_eq!(commands.names(CommandKind::Generate), vec!["greeter"]);
}
