//! Downloads the platform artifact of a workflow run.

use camino::{Utf8Path, Utf8PathBuf};

use super::workspace::Workspace;
use crate::github::{ArtifactSummary, BuildGateway, InstallError, RepositorySpec, WorkflowRun};
use crate::platform::PlatformTag;

/// File name the downloaded archive is stored under inside the workspace.
const ARCHIVE_FILE_NAME: &str = "artifact.zip";

/// A downloaded artifact archive.
///
/// The handle owns the workspace holding the archive; dropping the handle
/// removes both.
#[derive(Debug)]
pub struct ArtifactHandle {
    name: String,
    archive_path: Utf8PathBuf,
    workspace: Workspace,
}

impl ArtifactHandle {
    /// Artifact name, `tally-{platform}`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the downloaded zip archive.
    #[must_use]
    pub fn archive_path(&self) -> &Utf8Path {
        &self.archive_path
    }

    /// Scratch directory the archive lives in.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Removes the workspace now, logging when that fails.
    pub fn discard(self) {
        let path = self.workspace.path().to_owned();
        if let Err(error) = self.workspace.close() {
            tracing::warn!("could not remove {path}: {error}");
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(name: &str, archive_path: Utf8PathBuf, workspace: Workspace) -> Self {
        Self {
            name: name.to_owned(),
            archive_path,
            workspace,
        }
    }
}

/// Fetches run artifacts through a [`BuildGateway`].
pub struct ArtifactFetcher<'client, Gateway>
where
    Gateway: BuildGateway,
{
    client: &'client Gateway,
    tmp_root: Option<Utf8PathBuf>,
}

impl<'client, Gateway> ArtifactFetcher<'client, Gateway>
where
    Gateway: BuildGateway,
{
    /// Creates a fetcher whose workspaces live under `tmp_root`, or the
    /// system temporary directory when `None`.
    #[must_use]
    pub const fn new(client: &'client Gateway, tmp_root: Option<Utf8PathBuf>) -> Self {
        Self { client, tmp_root }
    }

    /// Downloads `tally-{platform}` from `run` into a fresh workspace.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::DownloadFailed`] carrying the run URL when the
    /// artifact is missing or expired, or when listing or downloading fails.
    /// Returns [`InstallError::Io`] when the workspace cannot be prepared.
    pub async fn fetch(
        &self,
        run: &WorkflowRun,
        repository: &RepositorySpec,
        platform: PlatformTag,
    ) -> Result<ArtifactHandle, InstallError> {
        let name = platform.artifact_name();
        let run_url = run
            .html_url
            .clone()
            .unwrap_or_else(|| repository.run_web_url(run.id));
        let download_failed = |message: String| InstallError::DownloadFailed {
            artifact: name.clone(),
            run_url: run_url.clone(),
            message,
        };

        let workspace = Workspace::create(self.tmp_root.as_deref())?;

        let artifacts = self
            .client
            .run_artifacts(repository, run.id, &name)
            .await
            .map_err(|error| download_failed(error.to_string()))?;
        let artifact = pick_artifact(artifacts, &name).map_err(download_failed)?;
        tracing::info!("downloading {name} (artifact {})", artifact.id);

        let bytes = self
            .client
            .download_artifact(repository, artifact.id)
            .await
            .map_err(|error| download_failed(error.to_string()))?;

        let archive_path = workspace.path().join(ARCHIVE_FILE_NAME);
        std::fs::write(&archive_path, &bytes)
            .map_err(|error| download_failed(format!("write {archive_path}: {error}")))?;
        tracing::debug!("saved {} bytes to {archive_path}", bytes.len());

        Ok(ArtifactHandle {
            name,
            archive_path,
            workspace,
        })
    }
}

fn pick_artifact(
    artifacts: Vec<ArtifactSummary>,
    name: &str,
) -> Result<ArtifactSummary, String> {
    let mut saw_expired = false;
    for artifact in artifacts.into_iter().filter(|artifact| artifact.name == name) {
        if artifact.expired {
            saw_expired = true;
            continue;
        }
        return Ok(artifact);
    }

    Err(if saw_expired {
        format!("artifact {name} has expired")
    } else {
        format!("run has no artifact named {name}")
    })
}
