//! GitHub build lookup and artifact download.
//!
//! This module wraps Octocrab to find the head commit of a pull request, pick
//! the most recent successful workflow run for it, and download the run's
//! artifacts. Errors are mapped into user-friendly variants so that callers can
//! surface precise failures without exposing Octocrab internals.

pub mod build_locator;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use build_locator::{BuildLocator, DEFAULT_WORKFLOW, LocatedBuild};
pub use credentials::{CredentialSource, ExplicitToken, GhCliCredentials, StaticCredentials};
pub use error::InstallError;
pub use gateway::{BuildGateway, OctocrabGateway};
pub use locator::{
    PersonalAccessToken, PullRequestNumber, PullRequestRef, RepositoryName, RepositoryOwner,
    RepositorySpec,
};
pub use models::{ArtifactSummary, HeadCommit, WorkflowRun};

#[cfg(test)]
pub use gateway::MockBuildGateway;
