//! Error types surfaced by the installer pipeline.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while resolving, downloading, or installing a PR build.
///
/// Every variant is fatal for the invocation. Variants that have an obvious
/// remediation expose it through [`InstallError::hint`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstallError {
    /// The CLI did not include a pull request number.
    #[error("pull request number is required")]
    MissingPullRequestNumber,

    /// An unsupported CLI argument was supplied.
    #[error("unrecognised argument: {argument}")]
    InvalidArgument {
        /// The flag or value that the CLI does not accept.
        argument: String,
    },

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer: {value}")]
    InvalidPullRequestNumber {
        /// The rejected input.
        value: String,
    },

    /// The repository is not in `owner/repo` form.
    #[error("repository must be in owner/repo form: {value}")]
    InvalidRepository {
        /// The rejected input.
        value: String,
    },

    /// The `gh` client is not installed.
    #[error("the GitHub CLI (gh) is required but was not found")]
    MissingClient,

    /// The `gh` client is installed but not logged in.
    #[error("the GitHub CLI (gh) is not authenticated: {message}")]
    NotAuthenticated {
        /// Output reported by `gh auth status`.
        message: String,
    },

    /// The host operating system or CPU architecture has no published build.
    #[error("unsupported platform: {detail}")]
    UnsupportedPlatform {
        /// The unrecognised kernel name or machine architecture.
        detail: String,
    },

    /// The pull request does not exist or has no head commit.
    #[error("pull request #{number} not found in {repository}")]
    PullRequestNotFound {
        /// Repository in `owner/repo` form.
        repository: String,
        /// Pull request number.
        number: u64,
    },

    /// No successful workflow run exists for the pull request head.
    #[error("no successful build found for PR #{number} (head {head_sha})")]
    NoSuccessfulBuild {
        /// Pull request number.
        number: u64,
        /// Commit the lookup was made for.
        head_sha: String,
        /// Page listing the PR's CI checks.
        checks_url: String,
    },

    /// The build artifact could not be downloaded.
    #[error("failed to download artifact {artifact}: {message}")]
    DownloadFailed {
        /// Artifact name that was requested.
        artifact: String,
        /// Web URL of the workflow run.
        run_url: String,
        /// Underlying failure.
        message: String,
    },

    /// The downloaded archive did not contain the expected executable.
    #[error("artifact archive is invalid: {message}")]
    InvalidArchive {
        /// Details about what was wrong with the archive.
        message: String,
    },

    /// The installed binary failed its smoke test.
    #[error("installed binary at {path} failed verification: {message}")]
    VerificationFailed {
        /// Location of the installed binary.
        path: Utf8PathBuf,
        /// Spawn error or captured output.
        message: String,
    },

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

impl InstallError {
    /// Returns a remediation hint to print after the error, when one exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingClient => {
                Some("Install it from https://cli.github.com/ and run 'gh auth login'".to_owned())
            }
            Self::NotAuthenticated { .. } => Some("Run 'gh auth login' and try again".to_owned()),
            Self::MissingPullRequestNumber => {
                Some("Usage: tally-pr-install <PR_NUMBER> [OWNER/REPO]".to_owned())
            }
            Self::PullRequestNotFound { repository, .. } => Some(format!(
                "Check the PR number or repository: https://github.com/{repository}/pulls"
            )),
            Self::NoSuccessfulBuild { checks_url, .. } => Some(format!(
                "The build may still be running or may have failed. Check: {checks_url}"
            )),
            Self::DownloadFailed { run_url, .. } => Some(format!(
                "Check the workflow run and re-run the installer once it completes: {run_url}"
            )),
            _ => None,
        }
    }

    pub(crate) fn io(context: &str, error: &std::io::Error) -> Self {
        Self::Io {
            message: format!("{context}: {error}"),
        }
    }
}
