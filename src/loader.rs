//! Stack origin classification and materialization.
//! Local folders are referenced in place; remote references are cloned with
//! git into a managed folder.
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Where a stack comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOrigin {
    /// Existing local folder
    Local(PathBuf),
    /// Git reference: URL, `git@host:path` or `github:user/repo`
    Remote(String),
}

impl std::fmt::Display for StackOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackOrigin::Local(path) => write!(f, "local path: '{}'", path.display()),
            StackOrigin::Remote(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl StackOrigin {
    /// Classifies `origin`: anything that exists on disk is a local folder.
    pub fn from_string(origin: &str) -> Self {
        let path = PathBuf::from(origin);
        if path.exists() {
            Self::Local(path)
        } else {
            Self::Remote(origin.to_string())
        }
    }
}

/// Expands host shorthands into a URL git understands.
///
/// `github:user/repo`, `gitlab:user/repo` and `bitbucket:user/repo` become
/// HTTPS URLs, or SSH ones for private stacks.
pub fn normalize_remote(origin: &str, is_private: bool) -> String {
    const HOSTS: [(&str, &str); 3] = [
        ("github:", "github.com"),
        ("gitlab:", "gitlab.com"),
        ("bitbucket:", "bitbucket.org"),
    ];
    for (prefix, host) in HOSTS {
        if let Some(repo) = origin.strip_prefix(prefix) {
            return if is_private {
                format!("git@{host}:{repo}.git")
            } else {
                format!("https://{host}/{repo}")
            };
        }
    }
    origin.to_string()
}

/// Whether `origin` looks like something git can clone.
pub fn is_git_url(origin: &str) -> bool {
    if let Ok(url) = Url::parse(origin) {
        if matches!(url.scheme(), "https" | "http" | "git" | "ssh" | "file") {
            return true;
        }
    }
    origin.starts_with("git@")
        || ["github:", "gitlab:", "bitbucket:"].iter().any(|p| origin.starts_with(p))
}

/// Materializes a remote stack into a local folder.
pub trait StackFetcher {
    /// Fetches `origin` into `destination`, replacing anything already there.
    fn fetch(&self, origin: &str, is_private: bool, destination: &Path) -> Result<()>;
}

/// Fetcher cloning git repositories with git2.
#[derive(Debug, Default)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl StackFetcher for GitFetcher {
    fn fetch(&self, origin: &str, is_private: bool, destination: &Path) -> Result<()> {
        if !is_git_url(origin) {
            return Err(Error::InvalidOrigin { origin: origin.to_string() });
        }
        let repo_url = normalize_remote(origin, is_private);

        if destination.exists() {
            debug!("Replacing existing directory '{}'.", destination.display());
            fs::remove_dir_all(destination)?;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!("Cloning '{}' to '{}'.", repo_url, destination.display());

        let mut fetch_opts = git2::FetchOptions::new();
        if is_private {
            let mut callbacks = git2::RemoteCallbacks::new();
            callbacks.credentials(|_url, username_from_url, _allowed_types| {
                let username = username_from_url.unwrap_or("git");
                git2::Cred::ssh_key_from_agent(username).or_else(|_| {
                    let key = dirs::home_dir().unwrap_or_default().join(".ssh").join("id_rsa");
                    git2::Cred::ssh_key(username, None, &key, None)
                })
            });
            fetch_opts.remote_callbacks(callbacks);
        }
        fetch_opts.depth(1);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(&repo_url, destination)?;

        // Stacks are plain template folders, not working copies.
        let git_dir = destination.join(".git");
        if git_dir.exists() {
            fs::remove_dir_all(git_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_origin_display() {
        let local = StackOrigin::Local(PathBuf::from("/path/to/stack"));
        assert_eq!(format!("{local}"), "local path: '/path/to/stack'");

        let remote = StackOrigin::Remote("git@github.com:user/repo".to_string());
        assert_eq!(format!("{remote}"), "git repository: 'git@github.com:user/repo'");
    }

    #[test]
    fn test_existing_folder_is_local() {
        let temp_dir = TempDir::new().unwrap();
        let origin = temp_dir.path().display().to_string();
        assert_eq!(
            StackOrigin::from_string(&origin),
            StackOrigin::Local(temp_dir.path().to_path_buf())
        );
        assert_eq!(
            StackOrigin::from_string("https://github.com/user/repo"),
            StackOrigin::Remote("https://github.com/user/repo".to_string())
        );
    }

    #[test]
    fn test_normalize_remote() {
        assert_eq!(normalize_remote("github:user/repo", false), "https://github.com/user/repo");
        assert_eq!(normalize_remote("github:user/repo", true), "git@github.com:user/repo.git");
        assert_eq!(
            normalize_remote("https://example.com/repo.git", true),
            "https://example.com/repo.git"
        );
    }

    #[test]
    fn test_is_git_url() {
        assert!(is_git_url("https://github.com/user/repo.git"));
        assert!(is_git_url("git@github.com:user/repo.git"));
        assert!(is_git_url("github:user/repo"));
        assert!(!is_git_url("./missing/folder"));
    }

    #[test]
    fn test_fetch_rejects_non_git_origin() {
        let temp_dir = TempDir::new().unwrap();
        let result = GitFetcher::new().fetch("./missing/folder", false, &temp_dir.path().join("s"));
        assert!(matches!(
            result,
            Err(Error::InvalidOrigin { origin }) if origin == "./missing/folder"
        ));
    }
}
