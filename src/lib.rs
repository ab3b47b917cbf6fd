//! Installs the `tally` binary built by CI for an open pull request.
//!
//! The library resolves which repository to query, finds the newest
//! successful workflow run for the pull request head, downloads the artifact
//! matching this machine, installs and smoke-tests the executable, and puts
//! its directory on the user's `PATH`.

pub mod config;
pub mod github;
pub mod install;
pub mod local;
pub mod pipeline;
pub mod platform;
pub mod resolver;
pub mod shell_profile;

pub use config::InstallerConfig;
pub use github::{
    BuildGateway, BuildLocator, CredentialSource, ExplicitToken, GhCliCredentials, InstallError,
    OctocrabGateway, PersonalAccessToken, PullRequestNumber, PullRequestRef, RepositorySpec,
    StaticCredentials,
};
pub use pipeline::{InstallContext, InstallReport, PathIntegration, install_with_gateway, run_install};
pub use platform::PlatformTag;
pub use resolver::{Resolution, ResolutionMethod, RepositoryResolver};
