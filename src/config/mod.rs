//! Installer configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.tally-install.toml` in the current directory
//!    or home directory, or `tally-install.toml` in the XDG config directory
//! 3. **Environment variables** – `TALLY_REPO`, `TALLY_TOKEN`,
//!    `TALLY_INSTALL_DIR`, `TALLY_TMP_DIR`, `TALLY_API_URL`, `TALLY_WORKFLOW`,
//!    or the legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--repo`, `--token`, `--install-dir`, ...
//!
//! The pull request number and the optional `OWNER/REPO` are positional and
//! handled by the binary before these layers are merged.
//!
//! # Configuration File
//!
//! ```toml
//! repo = "my-fork/tally"
//! install_dir = "/opt/tally/bin"
//! workflow = "build.yml"
//! no_modify_path = true
//! ```

use std::env;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::{
    CredentialSource, DEFAULT_WORKFLOW, ExplicitToken, GhCliCredentials, InstallError,
    PersonalAccessToken, RepositorySpec, locator::parse_api_base,
};

/// Installer configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use tally_pr_install::InstallerConfig;
///
/// let config = InstallerConfig::load().expect("failed to load configuration");
/// let install_dir = config.resolve_install_dir().expect("HOME is set");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TALLY",
    discovery(
        dotfile_name = ".tally-install.toml",
        config_file_name = "tally-install.toml",
        app_name = "tally-install"
    )
)]
pub struct InstallerConfig {
    /// Repository to query, in `owner/repo` form.
    ///
    /// Overrides auto-detection but loses to the positional `OWNER/REPO`.
    ///
    /// Can be provided via:
    /// - CLI: `--repo <OWNER/REPO>` or `-r <OWNER/REPO>`
    /// - Environment: `TALLY_REPO`
    /// - Config file: `repo = "..."`
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Token for GitHub API authentication.
    ///
    /// When absent, the token is read from `gh auth token`. `gh` must be
    /// installed and logged in even when a token is given.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `TALLY_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Directory the `tally` binary is installed into.
    ///
    /// Defaults to `~/.local/bin`.
    #[ortho_config(cli_short = 'i')]
    pub install_dir: Option<String>,

    /// Root under which the per-invocation workspace is created.
    ///
    /// Defaults to the system temporary directory.
    #[ortho_config(cli_short = 'T')]
    pub tmp_dir: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise or test servers.
    #[ortho_config(cli_short = 'a')]
    pub api_url: Option<String>,

    /// Workflow file whose runs publish the build artifacts.
    #[ortho_config(cli_short = 'w')]
    pub workflow: String,

    /// Skips editing the shell profile.
    ///
    /// Can be provided via:
    /// - CLI: `--no-modify-path` / `-n`
    /// - Config file: `no_modify_path = true`
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so there is no `TALLY_NO_MODIFY_PATH`.
    #[ortho_config(cli_short = 'n')]
    pub no_modify_path: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            repo: None,
            token: None,
            install_dir: None,
            tmp_dir: None,
            api_url: None,
            workflow: DEFAULT_WORKFLOW.to_owned(),
            no_modify_path: false,
        }
    }
}

impl InstallerConfig {
    /// Flags that consume the following argument as their value.
    pub const VALUE_FLAGS: &'static [&'static str] = &[
        "--repo",
        "-r",
        "--token",
        "-t",
        "--install-dir",
        "-i",
        "--tmp-dir",
        "-T",
        "--api-url",
        "-a",
        "--workflow",
        "-w",
        "--config-path",
    ];

    /// Resolves an explicit token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable.
    ///
    /// Returns `None` when neither is set, meaning `gh` supplies the token.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        let legacy = env::var("GITHUB_TOKEN").ok();
        self.resolve_token_with(legacy.as_deref())
    }

    fn resolve_token_with(&self, legacy: Option<&str>) -> Option<String> {
        self.token
            .as_deref()
            .or(legacy)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    }

    /// Picks the credential source. `gh` must be installed and logged in
    /// either way; a configured token only replaces the one `gh` would supply.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::NotAuthenticated`] when the explicit token is
    /// blank.
    pub fn credentials(&self) -> Result<Box<dyn CredentialSource>, InstallError> {
        self.credentials_with(GhCliCredentials::default())
    }

    pub(crate) fn credentials_with(
        &self,
        cli: GhCliCredentials,
    ) -> Result<Box<dyn CredentialSource>, InstallError> {
        match self.resolve_token() {
            Some(token) => Ok(Box::new(ExplicitToken::new(
                cli,
                PersonalAccessToken::new(token)?,
            ))),
            None => Ok(Box::new(cli)),
        }
    }

    /// Parses the configured repository override.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidRepository`] when the override is not in
    /// `owner/repo` form.
    pub fn repository_override(&self) -> Result<Option<RepositorySpec>, InstallError> {
        self.repo
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|value| RepositorySpec::parse(value.trim()))
            .transpose()
    }

    /// Returns the install directory, defaulting to `~/.local/bin`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Configuration`] when no directory is configured
    /// and `HOME` is unset.
    pub fn resolve_install_dir(&self) -> Result<Utf8PathBuf, InstallError> {
        let home = env::var("HOME").ok();
        self.resolve_install_dir_with(home.as_deref())
    }

    pub(crate) fn resolve_install_dir_with(
        &self,
        home: Option<&str>,
    ) -> Result<Utf8PathBuf, InstallError> {
        if let Some(dir) = self.install_dir.as_deref().filter(|v| !v.is_empty()) {
            return Ok(Utf8PathBuf::from(dir));
        }

        home.filter(|v| !v.is_empty())
            .map(|home| Utf8PathBuf::from(home).join(".local").join("bin"))
            .ok_or_else(|| InstallError::Configuration {
                message: "unable to resolve install directory: \
                          neither --install-dir nor HOME is set"
                    .to_owned(),
            })
    }

    /// Returns the configured workspace root, if any.
    #[must_use]
    pub fn tmp_root(&self) -> Option<Utf8PathBuf> {
        self.tmp_dir
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(Utf8PathBuf::from)
    }

    /// Returns the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Configuration`] when the override is not a
    /// valid URL.
    pub fn api_base(&self) -> Result<Url, InstallError> {
        parse_api_base(self.api_url.as_deref().filter(|v| !v.is_empty()))
    }

    /// Returns the workflow file name, falling back to the default when blank.
    #[must_use]
    pub fn workflow(&self) -> &str {
        let trimmed = self.workflow.trim();
        if trimmed.is_empty() {
            DEFAULT_WORKFLOW
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests;
