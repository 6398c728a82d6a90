//! Per-file rendering and the concurrent render of a whole template tree.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use globset::GlobSet;
use log::debug;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::context::{is_override, UserOptions};
use crate::error::{Error, Result};
use crate::paths::resolve_destination;
use crate::renderer::TemplateRenderer;
use crate::walker::template_files;

/// How a source file reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Bytes copied verbatim
    Copied,
    /// Rendered through the template engine
    Templated,
}

/// A destination produced from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: RenderMode,
}

/// Copies or renders one file into place.
///
/// # Arguments
/// * `source` - Template file
/// * `destination` - Resolved target path
/// * `is_template` - Render through `engine` instead of copying
/// * `context` - Serialized render context
/// * `engine` - Template engine
/// * `overwrite` - Replace an existing destination instead of failing
///
/// # Errors
/// * `Error::DestinationAlreadyExists` if `destination` exists and `overwrite`
///   is false; the existing file is left untouched
pub async fn render_file(
    source: &Path,
    destination: &Path,
    is_template: bool,
    context: &serde_json::Value,
    engine: &dyn TemplateRenderer,
    overwrite: bool,
) -> Result<RenderedFile> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mode = if is_template {
        let content = fs::read_to_string(source).await?;
        let rendered = engine.render(&source.display().to_string(), &content, context)?;
        write_file(destination, rendered.as_bytes(), overwrite).await?;
        debug!("Rendered {}", destination.display());
        RenderMode::Templated
    } else {
        copy_file(source, destination, overwrite).await?;
        debug!("Copied {}", destination.display());
        RenderMode::Copied
    };

    Ok(RenderedFile {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        mode,
    })
}

/// Renders every file of a template tree into `destination_root`.
///
/// Files are processed concurrently; the first failure aborts the render and
/// files already written stay in place.
pub async fn render_tree(
    template_root: &Path,
    destination_root: &Path,
    ignore: &GlobSet,
    options: &UserOptions,
    context: &serde_json::Value,
    engine: &dyn TemplateRenderer,
) -> Result<Vec<RenderedFile>> {
    debug!(
        "Rendering template '{}' into '{}'.",
        template_root.display(),
        destination_root.display()
    );
    let files = template_files(template_root, ignore)?;
    let overwrite = is_override(options);

    let jobs = files.iter().map(|source| async move {
        let (destination, is_template) =
            resolve_destination(template_root, source, destination_root, options)?;
        render_file(source, &destination, is_template, context, engine, overwrite).await
    });

    try_join_all(jobs).await
}

async fn open_new(path: &Path) -> Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| already_exists(e, path))
}

async fn write_file(path: &Path, content: &[u8], overwrite: bool) -> Result<()> {
    if overwrite {
        return Ok(fs::write(path, content).await?);
    }
    let mut file = open_new(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    Ok(())
}

async fn copy_file(source: &Path, destination: &Path, overwrite: bool) -> Result<()> {
    if overwrite {
        fs::copy(source, destination).await?;
        return Ok(());
    }
    let mut reader = fs::File::open(source).await?;
    let mut writer = open_new(destination).await?;
    tokio::io::copy(&mut reader, &mut writer).await?;
    writer.flush().await?;
    drop(writer);

    let permissions = fs::metadata(source).await?.permissions();
    fs::set_permissions(destination, permissions).await?;
    Ok(())
}

fn already_exists(err: std::io::Error, path: &Path) -> Error {
    if err.kind() == ErrorKind::AlreadyExists {
        Error::DestinationAlreadyExists { path: path.to_path_buf() }
    } else {
        Error::IoError(err)
    }
}
