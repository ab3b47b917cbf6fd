//! End-to-end installation of a pull request build.
//!
//! Stages run strictly in order and the first failure ends the run:
//! credentials, build lookup, artifact download, installation, and `PATH`
//! integration. Every stage reads the same immutable [`InstallContext`].

use camino::Utf8PathBuf;
use url::Url;

use crate::github::{
    BuildGateway, BuildLocator, CredentialSource, HeadCommit, InstallError, OctocrabGateway,
    PullRequestRef, WorkflowRun,
};
use crate::install::{ArtifactFetcher, InstalledBinary, Installer};
use crate::platform::PlatformTag;
use crate::resolver::Resolution;
use crate::shell_profile::{self, PathUpdate};

/// What to do about the user's `PATH` after installing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathIntegration {
    /// Leave shell profiles alone.
    Skip,
    /// Ensure this profile exports the install directory.
    Profile(Utf8PathBuf),
}

/// Everything one invocation needs, fixed before the first network call.
#[derive(Debug, Clone)]
pub struct InstallContext {
    /// Repository and how it was chosen.
    pub resolution: Resolution,
    /// Pull request in the resolved repository.
    pub pull_request: PullRequestRef,
    /// Platform of this machine.
    pub platform: PlatformTag,
    /// Directory `tally` is installed into.
    pub install_dir: Utf8PathBuf,
    /// Root for the temporary workspace.
    pub tmp_root: Option<Utf8PathBuf>,
    /// Workflow file whose runs are searched.
    pub workflow: String,
    /// GitHub API base URL.
    pub api_base: Url,
    /// Shell profile handling.
    pub path_integration: PathIntegration,
}

/// Result of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Pull request head the build was selected for.
    pub head: HeadCommit,
    /// Workflow run the artifact came from.
    pub run: WorkflowRun,
    /// Artifact that was installed.
    pub artifact: String,
    /// Installed executable and its reported version.
    pub binary: InstalledBinary,
    /// Profile edit, if one was attempted.
    pub path_update: Option<(Utf8PathBuf, PathUpdate)>,
}

/// Obtains a token and installs through the real GitHub API.
///
/// The credential check happens before any network request.
///
/// # Errors
///
/// Returns the first [`InstallError`] raised by any stage.
pub async fn run_install<Credentials>(
    context: &InstallContext,
    credentials: &Credentials,
) -> Result<InstallReport, InstallError>
where
    Credentials: CredentialSource + ?Sized,
{
    let token = credentials.token()?;
    let gateway = OctocrabGateway::for_token(&token, &context.api_base)?;
    install_with_gateway(context, &gateway).await
}

/// Installs using an already-authenticated gateway.
///
/// # Errors
///
/// Returns the first [`InstallError`] raised by any stage.
pub async fn install_with_gateway<Gateway>(
    context: &InstallContext,
    gateway: &Gateway,
) -> Result<InstallReport, InstallError>
where
    Gateway: BuildGateway,
{
    let repository = context.resolution.repository();
    tracing::info!(
        "installing PR #{} from {repository} for {}",
        context.pull_request.number(),
        context.platform
    );

    let located = BuildLocator::new(gateway, context.workflow.as_str())
        .locate(&context.pull_request)
        .await?;

    let artifact = ArtifactFetcher::new(gateway, context.tmp_root.clone())
        .fetch(&located.run, repository, context.platform)
        .await?;

    let binary = Installer::new(context.install_dir.clone()).install(&artifact)?;
    let artifact_name = artifact.name().to_owned();
    artifact.discard();

    let path_update = match &context.path_integration {
        PathIntegration::Skip => None,
        PathIntegration::Profile(profile) => Some((
            profile.clone(),
            shell_profile::ensure_on_path(profile, &context.install_dir)?,
        )),
    };

    Ok(InstallReport {
        head: located.head,
        run: located.run,
        artifact: artifact_name,
        binary,
        path_update,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::github::credentials::MockCredentialSource;
    use crate::github::{
        ArtifactSummary, MockBuildGateway, PullRequestNumber, RepositorySpec, locator,
    };
    use crate::install::test_support::{fake_tally_script, zip_archive};
    use crate::resolver::ResolutionMethod;

    struct Fixture {
        _root: TempDir,
        root: Utf8PathBuf,
        context: InstallContext,
    }

    fn fixture(path_integration: bool) -> Fixture {
        let root_dir = TempDir::new().expect("should create temp directory");
        let root = Utf8PathBuf::from_path_buf(root_dir.path().to_path_buf()).expect("UTF-8 path");
        let repository = RepositorySpec::parse("owner/repo").expect("valid spec");
        let context = InstallContext {
            resolution: Resolution::new(repository.clone(), ResolutionMethod::Explicit),
            pull_request: PullRequestRef::new(
                repository,
                PullRequestNumber::new(42).expect("positive"),
            ),
            platform: PlatformTag::from_uname("Linux", "aarch64").expect("supported"),
            install_dir: root.join("bin"),
            tmp_root: Some(root.join("tmp")),
            workflow: "build.yml".to_owned(),
            api_base: locator::parse_api_base(None).expect("default URL"),
            path_integration: if path_integration {
                PathIntegration::Profile(root.join(".bashrc"))
            } else {
                PathIntegration::Skip
            },
        };
        Fixture {
            _root: root_dir,
            root,
            context,
        }
    }

    fn successful_gateway() -> MockBuildGateway {
        let mut gateway = MockBuildGateway::new();
        gateway
            .expect_pull_request_head()
            .returning(|_| Ok(Some(HeadCommit::new("abc123".to_owned()))));
        gateway.expect_successful_runs().returning(|_, _, _| {
            Ok(vec![WorkflowRun {
                id: 9,
                head_sha: "abc123".to_owned(),
                status: Some("completed".to_owned()),
                conclusion: Some("success".to_owned()),
                created_at: None,
                html_url: None,
            }])
        });
        gateway
            .expect_run_artifacts()
            .withf(|_, _, name| name == "tally-linux-arm64")
            .returning(|_, _, name| {
                Ok(vec![ArtifactSummary {
                    id: 1,
                    name: name.to_owned(),
                    expired: false,
                }])
            });
        gateway.expect_download_artifact().returning(|_, _| {
            let script = fake_tally_script("tally 0.9.0");
            Ok(zip_archive(&[("tally", script.as_bytes())]).expect("zip builds"))
        });
        gateway
    }

    #[tokio::test]
    async fn installs_and_updates_profile() {
        let fixture = fixture(true);

        let report = install_with_gateway(&fixture.context, &successful_gateway())
            .await
            .expect("install should succeed");

        assert_eq!(report.run.id, 9);
        assert_eq!(report.artifact, "tally-linux-arm64");
        assert_eq!(report.binary.version, "tally 0.9.0");
        assert_eq!(
            report.path_update,
            Some((fixture.root.join(".bashrc"), PathUpdate::Appended))
        );
        let leftovers = std::fs::read_dir(fixture.root.join("tmp"))
            .expect("tmp root exists")
            .count();
        assert_eq!(leftovers, 0, "workspace should be removed");
    }

    #[tokio::test]
    async fn skipped_path_integration_leaves_profile_alone() {
        let fixture = fixture(false);

        let report = install_with_gateway(&fixture.context, &successful_gateway())
            .await
            .expect("install should succeed");

        assert_eq!(report.path_update, None);
        assert!(!fixture.root.join(".bashrc").exists());
    }

    #[tokio::test]
    async fn missing_pull_request_stops_before_download() {
        let fixture = fixture(true);
        let mut gateway = MockBuildGateway::new();
        gateway.expect_pull_request_head().returning(|_| Ok(None));
        gateway.expect_successful_runs().times(0);
        gateway.expect_download_artifact().times(0);

        let error = install_with_gateway(&fixture.context, &gateway)
            .await
            .expect_err("should fail");

        assert!(matches!(error, InstallError::PullRequestNotFound { number: 42, .. }));
        assert!(!fixture.context.install_dir.exists());
    }

    #[tokio::test]
    async fn credential_failure_happens_before_any_request() {
        let fixture = fixture(true);
        let mut credentials = MockCredentialSource::new();
        credentials
            .expect_token()
            .times(1)
            .returning(|| Err(InstallError::MissingClient));

        let error = run_install(&fixture.context, &credentials)
            .await
            .expect_err("should fail");

        assert_eq!(error, InstallError::MissingClient);
    }
}
