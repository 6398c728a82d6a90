use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use dexa::config::Config;
use dexa::error::{Error, Result};
use dexa::loader::StackFetcher;
use dexa::project::{Project, StackReference};
use dexa::prompt::FixedPrompter;
use dexa::registry::{RegistryEntry, StackRegistry};
use indexmap::IndexSet;
use tempfile::TempDir;

/// Fetcher materializing a minimal stack instead of cloning.
#[derive(Default)]
struct FakeFetcher {
    fetched: RefCell<Vec<String>>,
    fail: bool,
}

impl StackFetcher for FakeFetcher {
    fn fetch(&self, origin: &str, _is_private: bool, destination: &Path) -> Result<()> {
        self.fetched.borrow_mut().push(origin.to_string());
        if self.fail {
            return Err(Error::Git2Error(git2::Error::from_str(&format!("cannot fetch {origin}"))));
        }
        fs::create_dir_all(destination.join("init"))?;
        fs::write(destination.join("init/README.md"), "fetched\n")?;
        Ok(())
    }
}

fn predefined_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("stacks/predefined")
}

fn registry(home: &Path) -> StackRegistry {
    StackRegistry::load(Config::new(home, predefined_dir())).unwrap()
}

#[test]
fn test_predefined_stacks_are_always_known() {
    let home = TempDir::new().unwrap();
    let registry = registry(home.path());

    let stack = registry.get("hello-world").unwrap();
    assert!(stack.is_predefined());
    assert_eq!(stack.location_path(), predefined_dir().join("hello-world"));
    assert!(!home.path().join("stacks.json").exists());
}

#[test]
fn test_add_local_stack_is_persisted() {
    let home = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    fs::create_dir_all(local.path().join("init")).unwrap();
    let fetcher = FakeFetcher::default();

    let mut registry = registry(home.path());
    let origin = local.path().display().to_string();
    let stack = registry.add_new_stack("mine", &origin, false, &fetcher).unwrap();
    let canonical = local.path().canonicalize().unwrap();
    assert_eq!(stack.location_path(), canonical);
    assert!(stack.info().is_local());
    assert!(fetcher.fetched.borrow().is_empty());

    let content = fs::read_to_string(home.path().join("stacks.json")).unwrap();
    let entries: Vec<RegistryEntry> = serde_json::from_str(&content).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "mine");
    assert_eq!(entries[0].location_path, canonical);

    let reloaded = self::registry(home.path());
    assert_eq!(reloaded.names(), vec!["hello-world", "mine"]);
}

#[test]
fn test_add_remote_stack_uses_fetcher() {
    let home = TempDir::new().unwrap();
    let fetcher = FakeFetcher::default();
    let mut registry = registry(home.path());

    let stack = registry.add_new_stack("remote", "github:someone/stack", true, &fetcher).unwrap();
    assert_eq!(stack.location_path(), home.path().join("stacks/remote"));
    assert_eq!(stack.origin(), "github:someone/stack");
    assert!(stack.is_private());
    assert!(!stack.info().is_local());
    assert_eq!(*fetcher.fetched.borrow(), vec!["github:someone/stack"]);
    assert!(home.path().join("stacks/remote/init/README.md").exists());
}

#[test]
fn test_failed_fetch_registers_nothing() {
    let home = TempDir::new().unwrap();
    let fetcher = FakeFetcher { fail: true, ..Default::default() };
    let mut registry = registry(home.path());

    assert!(registry.add_new_stack("remote", "github:someone/stack", false, &fetcher).is_err());
    assert!(registry.get("remote").is_none());
    assert!(!home.path().join("stacks.json").exists());
}

#[test]
fn test_duplicate_and_invalid_names() {
    let home = TempDir::new().unwrap();
    let fetcher = FakeFetcher::default();
    let mut registry = registry(home.path());

    let result = registry.add_new_stack("hello-world", "github:a/b", false, &fetcher);
    assert!(matches!(result, Err(Error::StackAlreadyExists { .. })));

    for name in ["../escape", "", ".hidden", "-flag", "my stack", "a/b", "ñame"] {
        let result = registry.add_new_stack(name, "github:a/b", false, &fetcher);
        assert!(matches!(result, Err(Error::InvalidStackName { .. })), "{name:?} was accepted");
    }
    assert!(fetcher.fetched.borrow().is_empty());

    registry.add_new_stack("My_stack-2.0", "github:a/b", false, &fetcher).unwrap();
    assert_eq!(*fetcher.fetched.borrow(), vec!["github:a/b".to_string()]);
}

#[test]
fn test_delete_stacks() {
    let home = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    let fetcher = FakeFetcher::default();
    let mut registry = registry(home.path());
    registry
        .add_new_stack("local", &local.path().display().to_string(), false, &fetcher)
        .unwrap();
    registry.add_new_stack("remote", "github:a/b", false, &fetcher).unwrap();

    assert!(matches!(
        registry.delete_stack_by_name("hello-world"),
        Err(Error::PredefinedStack { .. })
    ));
    assert!(matches!(
        registry.delete_stack_by_name("unknown"),
        Err(Error::StackDoesNotExist { .. })
    ));

    registry.delete_stack_by_name("local").unwrap();
    assert!(local.path().exists());

    registry.delete_stack_by_name("remote").unwrap();
    assert!(!home.path().join("stacks/remote").exists());

    assert_eq!(self::registry(home.path()).names(), vec!["hello-world"]);
}

#[test]
fn test_ensure_stack_from_project() {
    let home = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    let fetcher = FakeFetcher::default();
    let mut registry = registry(home.path());

    let project = Project {
        name: "app".to_string(),
        stack_reference: StackReference {
            name: "shared".to_string(),
            origin: "github:team/shared".to_string(),
            private: false,
        },
        features: IndexSet::new(),
        location_path: project_dir.path().to_path_buf(),
    };

    let declined = registry.ensure_stack_from_project(&project, &FixedPrompter(false), &fetcher);
    assert!(declined.unwrap().is_none());
    assert!(fetcher.fetched.borrow().is_empty());

    let stack = registry
        .ensure_stack_from_project(&project, &FixedPrompter(true), &fetcher)
        .unwrap()
        .unwrap();
    assert_eq!(stack.name(), "shared");
    assert_eq!(*fetcher.fetched.borrow(), vec!["github:team/shared"]);

    // already installed: no second fetch
    registry.ensure_stack_from_project(&project, &FixedPrompter(false), &fetcher).unwrap();
    assert_eq!(fetcher.fetched.borrow().len(), 1);
}
