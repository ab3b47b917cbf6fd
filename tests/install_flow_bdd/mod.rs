//! Support modules for the install flow BDD tests.

pub(crate) mod fake_github;
pub(crate) mod harness;
pub(crate) mod state;

pub(crate) use harness::{ARTIFACT_NAME, OWNER_REPO, runs_payload, zip_with_tally};
pub(crate) use state::{CredentialChoice, InstallState, run_installer};
