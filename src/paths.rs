//! Destination path resolution for template files.
//! Maps a source file inside a command's template tree to its place inside the
//! project, stripping the template marker and substituting `__token__`s.

use std::path::{Component, Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::constants::TEMPLATE_SUFFIX;
use crate::context::UserOptions;
use crate::error::{Error, Result};

/// Whether `filename` carries the template marker suffix.
///
/// A file named exactly like the marker is not a template.
pub fn is_template_path(filename: &str) -> bool {
    filename.len() > TEMPLATE_SUFFIX.len() && filename.ends_with(TEMPLATE_SUFFIX)
}

/// Text substituted for an option value inside a path.
pub fn stringify_option(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Replaces every `__key__` in `path` with the value of `key` in `options`.
///
/// The path is scanned once, so substituted values are never scanned again.
/// When several keys match at the same position the longest one wins.
pub fn substitute_tokens(path: &str, options: &UserOptions) -> String {
    let mut substituted = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find("__") {
        substituted.push_str(&rest[..start]);
        let candidate = &rest[start + 2..];
        let matched = options
            .iter()
            .filter(|(key, _)| {
                !key.is_empty()
                    && candidate
                        .strip_prefix(key.as_str())
                        .is_some_and(|after| after.starts_with("__"))
            })
            .max_by_key(|(key, _)| key.len());
        match matched {
            Some((key, value)) => {
                substituted.push_str(&stringify_option(value));
                rest = &candidate[key.len() + 2..];
            }
            None => {
                substituted.push('_');
                rest = &rest[start + 1..];
            }
        }
    }
    substituted.push_str(rest);
    substituted
}

/// Checks that a rendered relative path stays a well-formed relative path.
///
/// Empty paths, absolute paths, empty segments and `..` are rejected so a
/// substituted value cannot point outside the project.
pub fn is_rendered_path_valid(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') || Path::new(path).has_root() {
        return false;
    }
    path.split('/')
        .all(|segment| !segment.is_empty() && segment != "..")
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Computes where `source` lands inside `destination_root`.
///
/// # Arguments
/// * `template_root` - Root of the command's template tree
/// * `source` - File inside `template_root`
/// * `destination_root` - Project directory
/// * `options` - User options providing `__token__` values
///
/// # Returns
/// * `Result<(PathBuf, bool)>` - Destination path and whether the source must
///   be rendered through the template engine
pub fn resolve_destination(
    template_root: &Path,
    source: &Path,
    destination_root: &Path,
    options: &UserOptions,
) -> Result<(PathBuf, bool)> {
    let relative = source.strip_prefix(template_root).map_err(|_| Error::InvalidPath {
        path: source.display().to_string(),
        source_path: source.display().to_string(),
    })?;
    let relative = relative_to_string(relative).ok_or_else(|| Error::InvalidPath {
        path: relative.display().to_string(),
        source_path: source.display().to_string(),
    })?;

    let is_template = relative.rsplit('/').next().is_some_and(is_template_path);
    let stripped = if is_template {
        relative.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&relative)
    } else {
        &relative
    };

    let rendered = substitute_tokens(stripped, options);
    if !is_rendered_path_valid(&rendered) {
        return Err(Error::InvalidPath {
            path: rendered,
            source_path: source.display().to_string(),
        });
    }

    debug!("Resolved '{}' to '{}'.", relative, rendered);
    Ok((destination_root.join(rendered), is_template))
}

/// Joins the components of a relative path with `/`.
fn relative_to_string(path: &Path) -> Option<String> {
    let parts = path
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
