//! Per-run scratch directory

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::debug;

use crate::error::Result;

/// Holds every intermediate artifact of one assembly run. The directory and
/// everything in it is removed when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates the directory under `root`, or the system temp dir
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("epoa-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!("Workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn form(&self) -> PathBuf {
        self.path().join("form.pdf")
    }

    pub fn addendum(&self) -> PathBuf {
        self.path().join("addendum.pdf")
    }

    /// Redacted copy of the evidence file at `index` in the record
    pub fn evidence(&self, index: usize) -> PathBuf {
        self.path().join(format!("evidence-{index}.pdf"))
    }

    pub fn merged(&self) -> PathBuf {
        self.path().join("merged.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(Some(root.path())).unwrap();
        assert!(workspace.path().starts_with(root.path()));
        assert!(workspace.evidence(2).ends_with("evidence-2.pdf"));
        assert!(workspace.form().ends_with("form.pdf"));
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(Some(root.path())).unwrap();
        std::fs::write(workspace.form(), b"%PDF-1.5").unwrap();
        let path = workspace.path().to_path_buf();

        drop(workspace);
        assert!(!path.exists());
    }
}
