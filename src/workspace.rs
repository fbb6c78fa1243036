use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The scoped temporary directory all intermediate files of one run live in.
///
/// The directory and everything in it is removed when the workspace is dropped,
/// whether the run succeeded or not.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create() -> Result<Workspace> {
        let dir = tempfile::Builder::new()
            .prefix("codebook-")
            .tempdir()
            .with_context(|| "Failed to create temporary working directory")?;
        log::debug!("working in {}", dir.path().display());
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.file(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read_to_string(&self, name: &str) -> Result<String> {
        let path = self.file(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Copy `name` out of the workspace into `dest_dir`, returning the new path.
    pub fn export(&self, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let from = self.file(name);
        if !from.is_file() {
            return Err(anyhow!("{} was never produced", from.display()));
        }
        std::fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create output directory {}", dest_dir.display()))?;
        let to = dest_dir.join(name);
        std::fs::copy(&from, &to).with_context(|| {
            format!("Failed to copy {} to {}", from.display(), to.display())
        })?;
        Ok(to)
    }
}
