//! Adds the install directory to the user's shell `PATH`.
//!
//! The profile is edited by appending a marked block. The edit is idempotent:
//! a profile that already contains the export line is left untouched.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};

use crate::github::InstallError;

/// Comment line written above the `PATH` export.
pub const PROFILE_MARKER: &str = "# Added by tally installer";

/// Outcome of [`ensure_on_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathUpdate {
    /// The block was appended.
    Appended,
    /// The profile already exported the directory.
    AlreadyPresent,
}

/// The export line for `install_dir`.
#[must_use]
pub fn path_line(install_dir: &Utf8Path) -> String {
    format!("export PATH=\"{install_dir}:$PATH\"")
}

/// Picks the profile for the current process's `SHELL` and `HOME`.
///
/// # Errors
///
/// Returns [`InstallError::Configuration`] when `HOME` is unset.
pub fn default_profile_path() -> Result<Utf8PathBuf, InstallError> {
    let shell = std::env::var("SHELL").ok();
    let home = std::env::var("HOME").ok();
    profile_path(shell.as_deref(), home.as_deref())
}

/// Picks the profile file for a login shell.
///
/// zsh uses `~/.zshrc`, bash uses `~/.bashrc`, and anything else falls back
/// to `~/.profile`.
///
/// # Errors
///
/// Returns [`InstallError::Configuration`] when `home` is absent or empty.
pub fn profile_path(shell: Option<&str>, home: Option<&str>) -> Result<Utf8PathBuf, InstallError> {
    let home = home
        .filter(|value| !value.is_empty())
        .ok_or_else(|| InstallError::Configuration {
            message: "HOME is not set; cannot locate a shell profile".to_owned(),
        })?;

    let file_name = match shell.and_then(|value| Utf8Path::new(value).file_name()) {
        Some("zsh") => ".zshrc",
        Some("bash") => ".bashrc",
        _ => ".profile",
    };
    Ok(Utf8PathBuf::from(home).join(file_name))
}

/// Whether `install_dir` is already one of the `PATH` entries.
#[must_use]
pub fn is_on_path(path_var: Option<&str>, install_dir: &Utf8Path) -> bool {
    let wanted = install_dir.as_str().trim_end_matches('/');
    path_var.is_some_and(|value| {
        value
            .split(':')
            .any(|entry| entry.trim_end_matches('/') == wanted)
    })
}

/// Appends the `PATH` block for `install_dir` to `profile` unless the export
/// line is already present. Creates the profile if it does not exist.
///
/// # Errors
///
/// Returns [`InstallError::Io`] when the profile's directory cannot be opened
/// or the profile cannot be read or written.
pub fn ensure_on_path(
    profile: &Utf8Path,
    install_dir: &Utf8Path,
) -> Result<PathUpdate, InstallError> {
    let parent = profile
        .parent()
        .filter(|value| !value.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = profile.file_name().ok_or_else(|| InstallError::Io {
        message: format!("invalid profile path '{profile}'"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        InstallError::Io {
            message: format!("failed to open profile directory '{parent}': {error}"),
        }
    })?;

    let existing = match dir.read_to_string(file_name) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(error) => {
            return Err(InstallError::Io {
                message: format!("failed to read profile '{profile}': {error}"),
            });
        }
    };

    let line = path_line(install_dir);
    if existing.contains(&line) {
        tracing::debug!("{profile} already exports {install_dir}");
        return Ok(PathUpdate::AlreadyPresent);
    }

    let mut block = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        block.push('\n');
    }
    block.push('\n');
    block.push_str(PROFILE_MARKER);
    block.push('\n');
    block.push_str(&line);
    block.push('\n');

    let mut file = dir
        .open_with(file_name, OpenOptions::new().create(true).append(true))
        .map_err(|error| InstallError::Io {
            message: format!("failed to open profile '{profile}': {error}"),
        })?;
    file.write_all(block.as_bytes())
        .map_err(|error| InstallError::Io {
            message: format!("failed to update profile '{profile}': {error}"),
        })?;

    tracing::info!("added {install_dir} to PATH in {profile}");
    Ok(PathUpdate::Appended)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn sandbox() -> Result<(TempDir, Utf8PathBuf), Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let base = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .map_err(|_| "temp directory path must be UTF-8")?;
        Ok((temp_dir, base))
    }

    #[rstest]
    #[case::zsh(Some("/bin/zsh"), "/home/u/.zshrc")]
    #[case::bash(Some("/usr/local/bin/bash"), "/home/u/.bashrc")]
    #[case::fish(Some("/usr/bin/fish"), "/home/u/.profile")]
    #[case::unset(None, "/home/u/.profile")]
    fn chooses_profile_for_shell(#[case] shell: Option<&str>, #[case] expected: &str) -> TestResult {
        let path = profile_path(shell, Some("/home/u"))?;
        if path != Utf8PathBuf::from(expected) {
            return Err(format!("expected {expected}, got {path}").into());
        }
        Ok(())
    }

    #[test]
    fn missing_home_is_a_configuration_error() {
        assert!(matches!(
            profile_path(Some("/bin/bash"), None),
            Err(InstallError::Configuration { .. })
        ));
    }

    #[rstest]
    #[case::present(Some("/usr/bin:/home/u/.local/bin"), true)]
    #[case::trailing_slash(Some("/home/u/.local/bin/:/usr/bin"), true)]
    #[case::prefix_only(Some("/home/u/.local/bin2"), false)]
    #[case::unset(None, false)]
    fn detects_directory_on_path(#[case] path_var: Option<&str>, #[case] expected: bool) {
        assert_eq!(
            is_on_path(path_var, Utf8Path::new("/home/u/.local/bin")),
            expected
        );
    }

    #[test]
    fn appends_block_once_when_called_twice() -> TestResult {
        let (_temp_dir, base) = sandbox()?;
        let profile = base.join(".bashrc");
        std::fs::write(&profile, "alias ll='ls -l'")?;
        let install_dir = Utf8Path::new("/home/u/.local/bin");

        let first = ensure_on_path(&profile, install_dir)?;
        let second = ensure_on_path(&profile, install_dir)?;

        let content = std::fs::read_to_string(&profile)?;
        let expected = "alias ll='ls -l'\n\n# Added by tally installer\n\
                        export PATH=\"/home/u/.local/bin:$PATH\"\n";
        if first != PathUpdate::Appended || second != PathUpdate::AlreadyPresent {
            return Err(format!("unexpected outcomes {first:?}, {second:?}").into());
        }
        if content != expected {
            return Err(format!("expected {expected:?}, got {content:?}").into());
        }
        Ok(())
    }

    #[test]
    fn creates_missing_profile() -> TestResult {
        let (_temp_dir, base) = sandbox()?;
        let profile = base.join(".zshrc");

        ensure_on_path(&profile, Utf8Path::new("/opt/tally/bin"))?;

        let content = std::fs::read_to_string(&profile)?;
        if !content.contains(PROFILE_MARKER) || !content.contains("/opt/tally/bin:$PATH") {
            return Err(format!("block missing from {content:?}").into());
        }
        Ok(())
    }

    #[test]
    fn existing_export_is_left_alone() -> TestResult {
        let (_temp_dir, base) = sandbox()?;
        let profile = base.join(".profile");
        let original = "export PATH=\"/opt/tally/bin:$PATH\"\n";
        std::fs::write(&profile, original)?;

        let outcome = ensure_on_path(&profile, Utf8Path::new("/opt/tally/bin"))?;

        if outcome != PathUpdate::AlreadyPresent || std::fs::read_to_string(&profile)? != original {
            return Err("profile should be unchanged".into());
        }
        Ok(())
    }
}
