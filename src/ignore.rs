//! File and directory ignore pattern handling for stack templates.
//! Patterns are matched against paths relative to a command's template root.

use std::fs::read_to_string;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

use crate::constants::{
    ADD_DIR, CUSTOMIZATION_FILES, GENERATE_DIR, HOOKS_DIR, IGNORE_FILE,
};
use crate::error::{Error, Result};

/// Patterns ignored in every template tree.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 4] =
    [".git/**", ".DS_Store", "**/.DS_Store", IGNORE_FILE];

/// Builds the ignore set for one command's template tree.
///
/// # Arguments
/// * `stack_root` - Root of the stack; its `.dexaignore` is read if present
/// * `template_is_stack_root` - The template tree is the whole stack folder, so
///   the stack's own layout (command folders, hooks, customization) is skipped
///
/// # Notes
/// - Blank lines and lines starting with `#` in `.dexaignore` are skipped
/// - Invalid patterns result in a `CustomizationError`
pub fn build_ignore_set<P: AsRef<Path>>(
    stack_root: P,
    template_is_stack_root: bool,
) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORE_PATTERNS {
        builder.add(glob(pattern)?);
    }

    if template_is_stack_root {
        for dir in [ADD_DIR, GENERATE_DIR, HOOKS_DIR] {
            builder.add(glob(&format!("{dir}/**"))?);
        }
        for file in CUSTOMIZATION_FILES {
            builder.add(glob(file)?);
        }
    }

    let ignore_path = stack_root.as_ref().join(IGNORE_FILE);
    if let Ok(contents) = read_to_string(&ignore_path) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(glob(line)?);
        }
    } else {
        debug!("{} does not exist", ignore_path.display());
    }

    builder
        .build()
        .map_err(|e| Error::CustomizationError(format!("{IGNORE_FILE} loading failed: {e}")))
}

fn glob(pattern: &str) -> Result<Glob> {
    Glob::new(pattern)
        .map_err(|e| Error::CustomizationError(format!("{IGNORE_FILE} loading failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_ignore_file() {
        let temp_dir = TempDir::new().unwrap();
        let set = build_ignore_set(temp_dir.path(), false).unwrap();

        assert!(set.is_match(".git/config"));
        assert!(set.is_match("src/.DS_Store"));
        assert!(!set.is_match("add/unit-test/test.js"));
        assert!(!set.is_match("dexa.json"));
    }

    #[test]
    fn test_stack_root_layout_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let set = build_ignore_set(temp_dir.path(), true).unwrap();

        assert!(set.is_match("add/unit-test/test.js"));
        assert!(set.is_match("generate/greeter/x.js.j2"));
        assert!(set.is_match("hooks/pre.sh"));
        assert!(set.is_match("dexa.yml"));
        assert!(!set.is_match("src/index.js"));
    }

    #[test]
    fn test_ignore_file_patterns() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(IGNORE_FILE),
            "# build output\n*.pyc\n\nnode_modules/**\n",
        )
        .unwrap();

        let set = build_ignore_set(temp_dir.path(), false).unwrap();
        assert!(set.is_match("file.pyc"));
        assert!(set.is_match("node_modules/left-pad/index.js"));
        assert!(set.is_match(IGNORE_FILE));
        assert!(!set.is_match("index.js"));
    }
}
