//! Octocrab implementation of the build gateway.

use async_trait::async_trait;
use octocrab::Octocrab;
use url::Url;

use crate::github::error::InstallError;
use crate::github::locator::{PersonalAccessToken, PullRequestRef, RepositorySpec};
use crate::github::models::{
    ApiArtifact, ApiArtifacts, ApiPullRequest, ApiWorkflowRun, ApiWorkflowRuns, ArtifactSummary,
    HeadCommit, WorkflowRun,
};

use super::BuildGateway;
use super::client::{build_download_client, build_octocrab_client};
use super::error_mapping::{
    extract_github_message, is_not_found, map_http_error, map_octocrab_error, map_reqwest_error,
};

/// Page size for run and artifact listings; GitHub's maximum.
const PER_PAGE: &str = "100";

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
    downloads: reqwest::Client,
    api_base: Url,
    token: PersonalAccessToken,
}

impl OctocrabGateway {
    /// Builds a gateway for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::Configuration` when the base URI cannot be parsed,
    /// `InstallError::Api` when Octocrab fails to construct a client, or
    /// `InstallError::Network` when the download client cannot be built.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, InstallError> {
        let client = build_octocrab_client(token, api_base.as_str())?;
        let downloads = build_download_client()?;
        Ok(Self {
            client,
            downloads,
            api_base: api_base.clone(),
            token: token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl BuildGateway for OctocrabGateway {
    async fn pull_request_head(
        &self,
        pull_request: &PullRequestRef,
    ) -> Result<Option<HeadCommit>, InstallError> {
        match self
            .client
            .get::<ApiPullRequest, _, _>(pull_request.pull_request_path(), None::<&()>)
            .await
        {
            Ok(payload) => Ok(payload.into_head_commit()),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(map_octocrab_error("pull request", &error)),
        }
    }

    async fn successful_runs(
        &self,
        repository: &RepositorySpec,
        workflow: &str,
        head: &HeadCommit,
    ) -> Result<Vec<WorkflowRun>, InstallError> {
        let query_params = [
            ("head_sha", head.as_str()),
            ("status", "success"),
            ("per_page", PER_PAGE),
        ];

        let payload = match self
            .client
            .get::<ApiWorkflowRuns, _, _>(
                repository.workflow_runs_path(workflow),
                Some(&query_params),
            )
            .await
        {
            Ok(payload) => payload,
            // A missing workflow file means no build could ever have succeeded.
            Err(error) if is_not_found(&error) => return Ok(Vec::new()),
            Err(error) => return Err(map_octocrab_error("workflow runs", &error)),
        };

        Ok(payload
            .workflow_runs
            .into_iter()
            .filter_map(ApiWorkflowRun::into_run)
            .collect())
    }

    async fn run_artifacts(
        &self,
        repository: &RepositorySpec,
        run_id: u64,
        name: &str,
    ) -> Result<Vec<ArtifactSummary>, InstallError> {
        let query_params = [("name", name), ("per_page", PER_PAGE)];

        let payload = self
            .client
            .get::<ApiArtifacts, _, _>(repository.run_artifacts_path(run_id), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("run artifacts", &error))?;

        Ok(payload
            .artifacts
            .into_iter()
            .map(ApiArtifact::into)
            .filter(|artifact: &ArtifactSummary| artifact.name == name)
            .collect())
    }

    async fn download_artifact(
        &self,
        repository: &RepositorySpec,
        artifact_id: u64,
    ) -> Result<Vec<u8>, InstallError> {
        let url = self.endpoint(&repository.artifact_zip_path(artifact_id));
        tracing::debug!("downloading artifact {artifact_id} from {url}");

        let response = self
            .downloads
            .get(&url)
            .bearer_auth(self.token.value())
            .header(http::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|error| map_reqwest_error("download artifact", &error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(
                "download artifact",
                status,
                extract_github_message(&body),
            ));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|error| map_reqwest_error("download artifact", &error))
    }
}
