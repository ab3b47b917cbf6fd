//! Gateways for locating builds and downloading artifacts from GitHub.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests.

mod actions;
mod client;
mod error_mapping;

pub use actions::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::InstallError;
use crate::github::locator::{PullRequestRef, RepositorySpec};
use crate::github::models::{ArtifactSummary, HeadCommit, WorkflowRun};

/// Gateway exposing the GitHub endpoints the installer relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildGateway: Send + Sync {
    /// Fetch the head commit of a pull request.
    ///
    /// Returns `Ok(None)` when the pull request does not exist or reports no
    /// head SHA.
    async fn pull_request_head(
        &self,
        pull_request: &PullRequestRef,
    ) -> Result<Option<HeadCommit>, InstallError>;

    /// List successful runs of `workflow` for the given head commit.
    ///
    /// Results are returned in API order; callers must not assume any
    /// particular ordering.
    async fn successful_runs(
        &self,
        repository: &RepositorySpec,
        workflow: &str,
        head: &HeadCommit,
    ) -> Result<Vec<WorkflowRun>, InstallError>;

    /// List the artifacts of a run whose name matches `name`.
    async fn run_artifacts(
        &self,
        repository: &RepositorySpec,
        run_id: u64,
        name: &str,
    ) -> Result<Vec<ArtifactSummary>, InstallError>;

    /// Download an artifact as a zip archive.
    async fn download_artifact(
        &self,
        repository: &RepositorySpec,
        artifact_id: u64,
    ) -> Result<Vec<u8>, InstallError>;
}
