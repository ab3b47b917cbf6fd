//! Per-invocation scratch directory for downloads and extraction.

use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::github::InstallError;

/// A temporary directory namespaced by the current process ID.
///
/// The directory and everything in it are removed when the workspace is
/// dropped, on both success and error paths.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    path: Utf8PathBuf,
}

impl Workspace {
    /// Creates `tally-install-{pid}-XXXXXX` under `root`, or under the system
    /// temporary directory when `root` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Io`] when the root cannot be created, the
    /// directory cannot be made, or its path is not UTF-8.
    pub fn create(root: Option<&Utf8Path>) -> Result<Self, InstallError> {
        let prefix = format!("tally-install-{}-", std::process::id());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|error| {
                    InstallError::io(&format!("create temp root {root}"), &error)
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|error| InstallError::io("create workspace", &error))?;

        let path = utf8_path(dir.path())?;
        tracing::debug!("created workspace {path}");
        Ok(Self { dir, path })
    }

    /// Workspace root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Removes the workspace now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Io`] when removal fails.
    pub fn close(self) -> Result<(), InstallError> {
        self.dir
            .close()
            .map_err(|error| InstallError::io("remove workspace", &error))
    }
}

fn utf8_path(path: &Path) -> Result<Utf8PathBuf, InstallError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|raw| InstallError::Io {
        message: format!("workspace path is not UTF-8: {}", raw.display()),
    })
}
