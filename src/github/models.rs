//! Data models for pull request heads, workflow runs, and artifacts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Commit at the tip of a pull request at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeadCommit(String);

impl HeadCommit {
    /// Creates a head commit from a SHA string.
    #[must_use]
    pub const fn new(sha: String) -> Self {
        Self(sha)
    }

    /// Returns the SHA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeadCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A GitHub Actions workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// Run identifier.
    pub id: u64,
    /// Commit the run was triggered for.
    pub head_sha: String,
    /// Run status (`queued`, `in_progress`, `completed`, ...).
    pub status: Option<String>,
    /// Terminal conclusion (`success`, `failure`, ...).
    pub conclusion: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Web URL for the run.
    pub html_url: Option<String>,
}

impl WorkflowRun {
    /// Returns true unless the run reports a non-success conclusion.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.conclusion
            .as_deref()
            .is_none_or(|conclusion| conclusion == "success")
    }
}

/// An artifact uploaded by a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    /// Artifact identifier.
    pub id: u64,
    /// Artifact name, e.g. `tally-linux-amd64`.
    pub name: String,
    /// Whether the artifact has passed its retention period.
    pub expired: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) head: Option<ApiHead>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiHead {
    pub(super) sha: Option<String>,
}

impl ApiPullRequest {
    pub(super) fn into_head_commit(self) -> Option<HeadCommit> {
        self.head
            .and_then(|head| head.sha)
            .filter(|sha| !sha.trim().is_empty())
            .map(HeadCommit::new)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiWorkflowRuns {
    #[serde(default)]
    pub(super) workflow_runs: Vec<ApiWorkflowRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiWorkflowRun {
    pub(super) id: Option<u64>,
    pub(super) head_sha: Option<String>,
    pub(super) status: Option<String>,
    pub(super) conclusion: Option<String>,
    pub(super) created_at: Option<DateTime<Utc>>,
    pub(super) html_url: Option<String>,
}

impl ApiWorkflowRun {
    /// Converts the API payload, dropping entries with a null run ID.
    pub(super) fn into_run(self) -> Option<WorkflowRun> {
        Some(WorkflowRun {
            id: self.id?,
            head_sha: self.head_sha.unwrap_or_default(),
            status: self.status,
            conclusion: self.conclusion,
            created_at: self.created_at,
            html_url: self.html_url,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiArtifacts {
    #[serde(default)]
    pub(super) artifacts: Vec<ApiArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiArtifact {
    pub(super) id: u64,
    pub(super) name: String,
    #[serde(default)]
    pub(super) expired: bool,
}

impl From<ApiArtifact> for ArtifactSummary {
    fn from(value: ApiArtifact) -> Self {
        Self {
            id: value.id,
            name: value.name,
            expired: value.expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pull_request_without_head_sha_has_no_head_commit() {
        let payload: ApiPullRequest =
            serde_json::from_value(json!({ "head": { "sha": "" } })).expect("valid payload");
        assert_eq!(payload.into_head_commit(), None);

        let missing: ApiPullRequest =
            serde_json::from_value(json!({ "number": 42 })).expect("valid payload");
        assert_eq!(missing.into_head_commit(), None);
    }

    #[test]
    fn workflow_run_with_null_id_is_dropped() {
        let payload: ApiWorkflowRuns = serde_json::from_value(json!({
            "total_count": 2,
            "workflow_runs": [
                { "id": null, "head_sha": "abc123" },
                { "id": 999, "head_sha": "abc123", "conclusion": "success",
                  "created_at": "2025-01-15T10:00:00Z" }
            ]
        }))
        .expect("valid payload");

        let runs: Vec<WorkflowRun> = payload
            .workflow_runs
            .into_iter()
            .filter_map(ApiWorkflowRun::into_run)
            .collect();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs.first().map(|run| run.id), Some(999));
    }

    #[test]
    fn failed_conclusion_is_not_successful() {
        let run = WorkflowRun {
            id: 1,
            head_sha: "abc".to_owned(),
            status: Some("completed".to_owned()),
            conclusion: Some("failure".to_owned()),
            created_at: None,
            html_url: None,
        };
        assert!(!run.is_successful());
    }
}
