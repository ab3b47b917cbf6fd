//! Unpacks the artifact and installs the `tally` executable.

use std::fs;
use std::io;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use zip::ZipArchive;

use super::fetcher::ArtifactHandle;
use crate::github::InstallError;

/// Name of the executable inside the artifact and in the install directory.
pub const BINARY_NAME: &str = "tally";

/// Permission bits applied to the installed executable.
#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// Directory the archive is unpacked into, relative to the workspace.
const EXTRACT_DIR: &str = "extracted";

/// Spawn attempts when the kernel reports the fresh executable as busy.
const SPAWN_ATTEMPTS: u32 = 3;

/// A verified installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Absolute location of the installed executable.
    pub path: Utf8PathBuf,
    /// Output of `tally version`.
    pub version: String,
}

/// Places the `tally` executable into an install directory.
#[derive(Debug, Clone)]
pub struct Installer {
    install_dir: Utf8PathBuf,
}

impl Installer {
    /// Installer targeting `install_dir`.
    #[must_use]
    pub const fn new(install_dir: Utf8PathBuf) -> Self {
        Self { install_dir }
    }

    /// Path the executable is installed to.
    #[must_use]
    pub fn target_path(&self) -> Utf8PathBuf {
        self.install_dir.join(BINARY_NAME)
    }

    /// Unpacks `artifact`, installs `tally`, and smoke-tests it.
    ///
    /// The existing binary is replaced by a rename, so it is never left
    /// half-written. A failed smoke test leaves the new binary in place.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidArchive`] when the archive is corrupt,
    /// contains unsafe paths, or lacks a single `tally` entry;
    /// [`InstallError::Io`] when the binary cannot be placed; and
    /// [`InstallError::VerificationFailed`] when `tally version` fails.
    pub fn install(&self, artifact: &ArtifactHandle) -> Result<InstalledBinary, InstallError> {
        let extract_dir = artifact.workspace().path().join(EXTRACT_DIR);
        let extracted = extract_binary(artifact.archive_path(), &extract_dir)?;
        let path = self.place(&extracted)?;
        tracing::info!("installed {path}");

        let version = verify(&path)?;
        Ok(InstalledBinary { path, version })
    }

    fn place(&self, source: &Utf8Path) -> Result<Utf8PathBuf, InstallError> {
        fs::create_dir_all(&self.install_dir).map_err(|error| {
            InstallError::io(&format!("create {}", self.install_dir), &error)
        })?;

        let target = self.target_path();
        let staging = self
            .install_dir
            .join(format!(".{BINARY_NAME}.{}.partial", std::process::id()));

        let staged = copy_executable(source, &staging)
            .and_then(|()| fs::rename(&staging, &target))
            .map_err(|error| InstallError::io(&format!("install {target}"), &error));
        if staged.is_err() {
            if let Err(error) = fs::remove_file(&staging) {
                tracing::debug!("could not remove {staging}: {error}");
            }
        }
        staged?;

        Ok(target)
    }
}

fn copy_executable(source: &Utf8Path, staging: &Utf8Path) -> io::Result<()> {
    fs::copy(source, staging)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging, fs::Permissions::from_mode(EXECUTABLE_MODE))?;
    }
    Ok(())
}

/// Unpacks every entry of `archive_path` under `dest` and returns the path
/// of the single `tally` file.
fn extract_binary(archive_path: &Utf8Path, dest: &Utf8Path) -> Result<Utf8PathBuf, InstallError> {
    let invalid = |message: String| InstallError::InvalidArchive { message };

    let file = fs::File::open(archive_path)
        .map_err(|error| InstallError::io(&format!("open {archive_path}"), &error))?;
    let mut archive =
        ZipArchive::new(file).map_err(|error| invalid(format!("not a zip archive: {error}")))?;

    let mut found: Vec<Utf8PathBuf> = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|error| invalid(format!("entry {index}: {error}")))?;
        let relative = entry
            .enclosed_name()
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
            .ok_or_else(|| invalid(format!("unsafe entry path '{}'", entry.name())))?;
        let out_path = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|error| InstallError::io(&format!("create {out_path}"), &error))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| InstallError::io(&format!("create {parent}"), &error))?;
        }
        let mut out_file = fs::File::create(&out_path)
            .map_err(|error| InstallError::io(&format!("create {out_path}"), &error))?;
        io::copy(&mut entry, &mut out_file)
            .map_err(|error| invalid(format!("extract {relative}: {error}")))?;

        if relative.file_name() == Some(BINARY_NAME) {
            found.push(out_path);
        }
    }

    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(invalid(format!("no '{BINARY_NAME}' executable in archive"))),
        count => Err(invalid(format!(
            "archive contains {count} '{BINARY_NAME}' entries"
        ))),
    }
}

/// Runs `{path} version` once and returns its trimmed output.
fn verify(path: &Utf8Path) -> Result<String, InstallError> {
    let failed = |message: String| InstallError::VerificationFailed {
        path: path.to_owned(),
        message,
    };

    let output = spawn_version(path).map_err(|error| failed(error.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!(
            "'{BINARY_NAME} version' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    tracing::info!("verified {path}: {version}");
    Ok(version)
}

fn spawn_version(path: &Utf8Path) -> io::Result<std::process::Output> {
    let mut attempt = 1;
    loop {
        match Command::new(path).arg("version").output() {
            // A concurrent fork may still hold the staging file open.
            Err(error)
                if error.kind() == io::ErrorKind::ExecutableFileBusy
                    && attempt < SPAWN_ATTEMPTS =>
            {
                attempt += 1;
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            result => return result,
        }
    }
}
