//! Enumerates the files of a command's template tree.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Lists every regular file under `template_root`, dotfiles included.
///
/// Directories are not returned; empty directories are therefore not
/// reproduced. Symbolic links are followed and listed under their own path,
/// so a linked file is rendered like a regular one; a dangling link is an
/// error. Paths matching `ignore` (relative to `template_root`) are skipped.
/// The result is sorted so callers see a stable order.
pub fn template_files<P: AsRef<Path>>(template_root: P, ignore: &GlobSet) -> Result<Vec<PathBuf>> {
    let template_root = template_root.as_ref();
    let mut files = Vec::new();

    for entry in WalkDir::new(template_root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(template_root).unwrap_or(path);
        if ignore.is_match(relative) {
            debug!("Skipping ignored file {}", relative.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}
