//! Resolving the git working tree an invocation operates on.

use std::path::{Path, PathBuf};

use git2::{Repository, Status};
use tracing::debug;

use crate::error::PipelineError;

/// A git working tree plus the directory the invocation was scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Top-level directory of the working tree.
    pub root: PathBuf,
    /// Directory git commands run in (inside `root`).
    pub dir: PathBuf,
}

impl Workspace {
    /// Resolve a workspace from an optional directory.
    ///
    /// `None` falls back to the current directory. Fails with
    /// `WorkspaceMissing` when no directory is available, the directory does
    /// not exist, or it is not inside a non-bare git working tree.
    pub fn resolve(dir: Option<&Path>) -> Result<Self, PipelineError> {
        let dir = match dir {
            Some(d) => d.to_path_buf(),
            None => std::env::current_dir()
                .map_err(|_| PipelineError::WorkspaceMissing { path: None })?,
        };

        let missing = || PipelineError::WorkspaceMissing {
            path: Some(dir.clone()),
        };

        let dir = dir.canonicalize().map_err(|_| missing())?;
        let repo = Repository::discover(&dir).map_err(|_| missing())?;
        let root = repo
            .workdir()
            .ok_or_else(missing)?
            .canonicalize()
            .map_err(|_| missing())?;

        debug!(root = %root.display(), dir = %dir.display(), "Resolved workspace");
        Ok(Self { root, dir })
    }

    /// Whether `path` (inside the working tree) is tracked by git.
    ///
    /// Untracked, ignored or missing files report `false`.
    pub fn is_tracked(&self, path: &Path) -> bool {
        let Ok(repo) = Repository::open(&self.root) else {
            return false;
        };
        let Some(relative) = path
            .canonicalize()
            .ok()
            .and_then(|p| p.strip_prefix(&self.root).ok().map(Path::to_path_buf))
        else {
            return false;
        };

        match repo.status_file(&relative) {
            Ok(status) => !status.intersects(Status::WT_NEW | Status::IGNORED),
            Err(_) => false,
        }
    }
}
