//! Locates the most recent successful CI build for a pull request.

use std::cmp::Reverse;

use super::error::InstallError;
use super::gateway::BuildGateway;
use super::locator::PullRequestRef;
use super::models::{HeadCommit, WorkflowRun};

/// Workflow file whose runs publish the `tally-*` artifacts.
pub const DEFAULT_WORKFLOW: &str = "build.yml";

/// A successful run together with the commit it was selected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBuild {
    /// Pull request head at lookup time.
    pub head: HeadCommit,
    /// Most recently created successful run for `head`.
    pub run: WorkflowRun,
}

/// Resolves a pull request to a workflow run through a gateway.
pub struct BuildLocator<'client, Gateway>
where
    Gateway: BuildGateway,
{
    client: &'client Gateway,
    workflow: String,
}

impl<'client, Gateway> BuildLocator<'client, Gateway>
where
    Gateway: BuildGateway,
{
    /// Create a locator that searches runs of `workflow`.
    #[must_use]
    pub fn new(client: &'client Gateway, workflow: impl Into<String>) -> Self {
        Self {
            client,
            workflow: workflow.into(),
        }
    }

    /// Finds the newest successful run for the pull request's head commit.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::PullRequestNotFound`] when the PR has no head
    /// commit (no run lookup is attempted), [`InstallError::NoSuccessfulBuild`]
    /// when no successful run exists, and propagates gateway failures.
    pub async fn locate(&self, pull_request: &PullRequestRef) -> Result<LocatedBuild, InstallError> {
        let repository = pull_request.repository();
        let head = self
            .client
            .pull_request_head(pull_request)
            .await?
            .ok_or_else(|| InstallError::PullRequestNotFound {
                repository: repository.to_string(),
                number: pull_request.number().get(),
            })?;
        tracing::info!("PR #{} head is {head}", pull_request.number());

        let runs = self
            .client
            .successful_runs(repository, &self.workflow, &head)
            .await?;

        let run = select_newest_success(runs).ok_or_else(|| InstallError::NoSuccessfulBuild {
            number: pull_request.number().get(),
            head_sha: head.to_string(),
            checks_url: pull_request.checks_url(),
        })?;
        tracing::info!("found successful run {} for {head}", run.id);

        Ok(LocatedBuild { head, run })
    }
}

/// Picks the most recently created successful run.
///
/// The runs API does not document its ordering, so runs are sorted here by
/// creation time (newest first, higher run ID on ties). Runs without a
/// timestamp sort last.
pub(crate) fn select_newest_success(runs: Vec<WorkflowRun>) -> Option<WorkflowRun> {
    runs.into_iter()
        .filter(WorkflowRun::is_successful)
        .min_by_key(|run| (Reverse(run.created_at), Reverse(run.id)))
}
