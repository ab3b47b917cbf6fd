//! Platform detection for selecting the correct build artifact.

use std::fmt;
use std::process::Command;

use crate::github::InstallError;

/// Operating systems with published builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux kernels.
    Linux,
    /// Darwin kernels.
    MacOs,
}

impl Os {
    /// Name used in artifact tags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }
}

/// CPU architectures with published builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit x86.
    Amd64,
    /// 64-bit ARM.
    Arm64,
}

impl Arch {
    /// Name used in artifact tags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

/// Canonical `{os}-{arch}` tag naming a build variant.
///
/// # Example
///
/// ```
/// use tally_pr_install::platform::PlatformTag;
///
/// let tag = PlatformTag::from_uname("Darwin", "arm64").expect("supported");
/// assert_eq!(tag.to_string(), "macos-arm64");
/// assert_eq!(tag.artifact_name(), "tally-macos-arm64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTag {
    os: Os,
    arch: Arch,
}

impl PlatformTag {
    /// Maps `uname -s` / `uname -m` output onto a platform tag.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedPlatform`] for any kernel or
    /// architecture without a published build.
    pub fn from_uname(kernel: &str, machine: &str) -> Result<Self, InstallError> {
        let os = match kernel.trim() {
            "Linux" => Os::Linux,
            "Darwin" => Os::MacOs,
            other => {
                return Err(InstallError::UnsupportedPlatform {
                    detail: format!("operating system '{other}'"),
                });
            }
        };

        let arch = match machine.trim() {
            "x86_64" | "amd64" => Arch::Amd64,
            "arm64" | "aarch64" => Arch::Arm64,
            other => {
                return Err(InstallError::UnsupportedPlatform {
                    detail: format!("architecture '{other}'"),
                });
            }
        };

        Ok(Self { os, arch })
    }

    /// Operating system component.
    #[must_use]
    pub const fn os(self) -> Os {
        self.os
    }

    /// Architecture component.
    #[must_use]
    pub const fn arch(self) -> Arch {
        self.arch
    }

    /// Name of the workflow artifact built for this platform.
    #[must_use]
    pub fn artifact_name(self) -> String {
        format!("tally-{self}")
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

/// Detects the running platform by asking `uname`.
///
/// # Errors
///
/// Returns [`InstallError::UnsupportedPlatform`] when `uname` cannot be run or
/// reports an unsupported platform.
pub fn detect() -> Result<PlatformTag, InstallError> {
    let kernel = uname("-s")?;
    let machine = uname("-m")?;
    PlatformTag::from_uname(&kernel, &machine)
}

fn uname(flag: &str) -> Result<String, InstallError> {
    let output = Command::new("uname").arg(flag).output().map_err(|error| {
        InstallError::UnsupportedPlatform {
            detail: format!("could not run uname {flag}: {error}"),
        }
    })?;

    if !output.status.success() {
        return Err(InstallError::UnsupportedPlatform {
            detail: format!("uname {flag} exited with {}", output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}
