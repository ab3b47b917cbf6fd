//! Scenario state and installer invocation for the install flow BDD tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tally_pr_install::github::{CredentialSource, ExplicitToken, GhCliCredentials};
use tally_pr_install::pipeline::{InstallContext, InstallReport, PathIntegration, run_install};
use tally_pr_install::{
    InstallError, PersonalAccessToken, PlatformTag, PullRequestNumber, PullRequestRef,
    RepositorySpec, Resolution, ResolutionMethod, github::locator::parse_api_base,
};
use tempfile::TempDir;

use super::fake_github::FakeGitHub;
use super::harness::OWNER_REPO;

/// How the scenario authenticates.
#[derive(Debug, Clone)]
pub(crate) enum CredentialChoice {
    /// A configured token alongside a logged-in `gh`.
    Token(String),
    /// A `gh` executable that does not exist.
    MissingCli,
}

#[derive(ScenarioState, Default)]
pub(crate) struct InstallState {
    pub(crate) github: Slot<FakeGitHub>,
    pub(crate) sandbox: Slot<TempDir>,
    pub(crate) credentials: Slot<CredentialChoice>,
    pub(crate) report: Slot<InstallReport>,
    pub(crate) error: Slot<InstallError>,
}

impl InstallState {
    /// Starts the fake GitHub API on first use.
    pub(crate) fn github(&self) -> Result<FakeGitHub, InstallError> {
        if let Some(github) = self.github.get() {
            return Ok(github);
        }
        let github = FakeGitHub::start().map_err(|error| InstallError::Io {
            message: format!("failed to start mock server: {error}"),
        })?;
        self.github.set(github.clone());
        Ok(github)
    }

    /// Root of the scenario's scratch directory, created on first use.
    pub(crate) fn sandbox_root(&self) -> Result<Utf8PathBuf, InstallError> {
        if self.sandbox.with_ref(|_| ()).is_none() {
            let dir = TempDir::new().map_err(|error| InstallError::Io {
                message: format!("failed to create sandbox: {error}"),
            })?;
            self.sandbox.set(dir);
        }

        let root: PathBuf = self
            .sandbox
            .with_ref(|dir| dir.path().to_path_buf())
            .ok_or_else(|| InstallError::Io {
                message: "sandbox not initialised".to_owned(),
            })?;
        Utf8PathBuf::from_path_buf(root).map_err(|raw| InstallError::Io {
            message: format!("sandbox path is not UTF-8: {}", raw.display()),
        })
    }

    /// Directory the scenario installs into.
    pub(crate) fn install_dir(&self) -> Result<Utf8PathBuf, InstallError> {
        Ok(self.sandbox_root()?.join("bin"))
    }

    /// Shell profile the scenario edits.
    pub(crate) fn profile(&self) -> Result<Utf8PathBuf, InstallError> {
        Ok(self.sandbox_root()?.join(".bashrc"))
    }
}

/// Runs the installer pipeline against the mock server and records the
/// outcome in the state.
pub(crate) fn run_installer(state: &InstallState, pr: u64) -> Result<(), InstallError> {
    let github = state.github()?;
    let repository = RepositorySpec::parse(OWNER_REPO)?;
    let root = state.sandbox_root()?;
    let context = InstallContext {
        resolution: Resolution::new(repository.clone(), ResolutionMethod::Explicit),
        pull_request: PullRequestRef::new(repository, PullRequestNumber::new(pr)?),
        platform: PlatformTag::from_uname("Linux", "x86_64")?,
        install_dir: state.install_dir()?,
        tmp_root: Some(root.join("tmp")),
        workflow: "build.yml".to_owned(),
        api_base: parse_api_base(Some(&github.uri()))?,
        path_integration: PathIntegration::Profile(state.profile()?),
    };

    let credentials: Box<dyn CredentialSource> = match state.credentials.get() {
        Some(CredentialChoice::Token(token)) => Box::new(ExplicitToken::new(
            logged_in_gh(&root)?,
            PersonalAccessToken::new(token)?,
        )),
        Some(CredentialChoice::MissingCli) | None => Box::new(GhCliCredentials::with_program(
            root.join("missing-gh").into_std_path_buf(),
        )),
    };

    match github.block_on(run_install(&context, credentials.as_ref())) {
        Ok(report) => {
            drop(state.error.take());
            state.report.set(report);
        }
        Err(error) => {
            drop(state.report.take());
            state.error.set(error);
        }
    }
    Ok(())
}

/// Writes a `gh` stand-in whose `auth status` succeeds.
fn logged_in_gh(root: &Utf8Path) -> Result<GhCliCredentials, InstallError> {
    let path = root.join("gh");
    fs::write(&path, "#!/bin/sh\nexit 0\n")
        .and_then(|()| fs::set_permissions(&path, fs::Permissions::from_mode(0o755)))
        .map_err(|error| InstallError::Io {
            message: format!("failed to write fake gh: {error}"),
        })?;
    Ok(GhCliCredentials::with_program(path.into_std_path_buf()))
}
