//! Fake GitHub payloads for the install flow BDD tests.

use serde_json::{Value, json};
use tally_pr_install::install::test_support::{fake_tally_script, zip_archive};

/// Repository every scenario queries.
pub(crate) const OWNER_REPO: &str = "owner/repo";

/// Artifact name for the fixed `linux-amd64` platform used in scenarios.
pub(crate) const ARTIFACT_NAME: &str = "tally-linux-amd64";

/// Builds a workflow-runs listing with `older` created an hour before
/// `newer`. The older run is listed first so ordering comes from timestamps,
/// not response order.
pub(crate) fn runs_payload(head_sha: &str, older: u64, newer: u64) -> Value {
    let run = |id: u64, created_at: &str| {
        json!({
            "id": id,
            "head_sha": head_sha,
            "status": "completed",
            "conclusion": "success",
            "created_at": created_at,
            "html_url": format!("https://github.com/{OWNER_REPO}/actions/runs/{id}")
        })
    };

    json!({
        "total_count": 2,
        "workflow_runs": [
            run(older, "2026-01-15T10:00:00Z"),
            run(newer, "2026-01-15T11:00:00Z")
        ]
    })
}

/// A zip archive holding a `tally` script whose `version` prints `version`.
#[expect(
    clippy::expect_used,
    reason = "integration test helper; allow-expect-in-tests does not cover integration tests"
)]
pub(crate) fn zip_with_tally(version: &str) -> Vec<u8> {
    let script = fake_tally_script(version);
    zip_archive(&[("tally", script.as_bytes())]).expect("zip archive should build")
}
