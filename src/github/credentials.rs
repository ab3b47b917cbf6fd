//! Credential sources for GitHub API access.
//!
//! The installer delegates authentication to the GitHub CLI: `gh` must be
//! installed and logged in before any network call is attempted. A configured
//! token only replaces the token `gh` would hand out; the login check still
//! runs.

use std::ffi::OsString;
use std::io;
use std::process::{Command, Output};

use super::error::InstallError;
use super::locator::PersonalAccessToken;

/// Supplies the token used to authenticate GitHub API requests.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialSource {
    /// Checks preconditions and returns a usable token.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::MissingClient`] or
    /// [`InstallError::NotAuthenticated`] when no token can be obtained.
    fn token(&self) -> Result<PersonalAccessToken, InstallError>;
}

/// A token that has already passed the login check.
#[derive(Debug, Clone)]
pub struct StaticCredentials(PersonalAccessToken);

impl StaticCredentials {
    /// Wraps an explicit token.
    #[must_use]
    pub const fn new(token: PersonalAccessToken) -> Self {
        Self(token)
    }
}

impl CredentialSource for StaticCredentials {
    fn token(&self) -> Result<PersonalAccessToken, InstallError> {
        Ok(self.0.clone())
    }
}

/// Credentials obtained from a logged-in GitHub CLI.
#[derive(Debug, Clone)]
pub struct GhCliCredentials {
    program: OsString,
}

impl Default for GhCliCredentials {
    fn default() -> Self {
        Self {
            program: OsString::from("gh"),
        }
    }
}

impl GhCliCredentials {
    /// Uses a specific `gh` executable instead of the one on `PATH`.
    #[must_use]
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Fails unless `gh` is installed and `gh auth status` succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::MissingClient`] when `gh` cannot be spawned and
    /// [`InstallError::NotAuthenticated`] when it reports no login.
    pub fn ensure_logged_in(&self) -> Result<(), InstallError> {
        let status = self.run(&["auth", "status"])?;
        if status.status.success() {
            Ok(())
        } else {
            Err(InstallError::NotAuthenticated {
                message: last_line(&status.stderr),
            })
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, InstallError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|error| match error.kind() {
                io::ErrorKind::NotFound => InstallError::MissingClient,
                _ => InstallError::io("failed to run gh", &error),
            })
    }
}

fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("not logged in to any GitHub hosts")
        .to_owned()
}

impl CredentialSource for GhCliCredentials {
    fn token(&self) -> Result<PersonalAccessToken, InstallError> {
        self.ensure_logged_in()?;

        let token = self.run(&["auth", "token"])?;
        if !token.status.success() {
            return Err(InstallError::NotAuthenticated {
                message: last_line(&token.stderr),
            });
        }

        tracing::debug!("using token from gh auth token");
        PersonalAccessToken::new(String::from_utf8_lossy(&token.stdout))
    }
}

/// A configured token, handed out only once `gh` passes its login check.
#[derive(Debug, Clone)]
pub struct ExplicitToken {
    cli: GhCliCredentials,
    token: PersonalAccessToken,
}

impl ExplicitToken {
    /// Gates `token` behind the login check of `cli`.
    #[must_use]
    pub const fn new(cli: GhCliCredentials, token: PersonalAccessToken) -> Self {
        Self { cli, token }
    }
}

impl CredentialSource for ExplicitToken {
    fn token(&self) -> Result<PersonalAccessToken, InstallError> {
        self.cli.ensure_logged_in()?;
        tracing::debug!("gh is logged in; using the configured token");
        Ok(self.token.clone())
    }
}
