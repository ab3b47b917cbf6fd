//! Identity wrappers for repositories, pull requests, and API endpoints.

use std::fmt;

use url::Url;

use super::error::InstallError;

/// Public GitHub API endpoint used when no override is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('/') && !segment.chars().any(char::is_whitespace)
}

/// A repository in `owner/name` form.
///
/// # Example
///
/// ```
/// use tally_pr_install::github::locator::RepositorySpec;
///
/// let spec = RepositorySpec::parse("octo/tally").expect("valid spec");
/// assert_eq!(spec.owner().as_str(), "octo");
/// assert_eq!(spec.to_string(), "octo/tally");
/// assert!(RepositorySpec::parse("octo/tally/extra").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    owner: RepositoryOwner,
    name: RepositoryName,
}

impl RepositorySpec {
    /// Parses `owner/name`, requiring exactly two non-empty segments.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidRepository`] when the input has the
    /// wrong number of segments, an empty segment, or embedded whitespace.
    pub fn parse(input: &str) -> Result<Self, InstallError> {
        let invalid = || InstallError::InvalidRepository {
            value: input.to_owned(),
        };

        let (owner, name) = input.split_once('/').ok_or_else(invalid)?;
        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: RepositoryOwner(owner.to_owned()),
            name: RepositoryName(name.to_owned()),
        })
    }

    /// Builds a spec from segments already known to be valid, such as
    /// compiled-in constants.
    pub(crate) fn from_trusted_parts(owner: &str, name: &str) -> Self {
        debug_assert!(is_valid_segment(owner) && is_valid_segment(name));
        Self {
            owner: RepositoryOwner(owner.to_owned()),
            name: RepositoryName(name.to_owned()),
        }
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }

    pub(crate) fn repos_path(&self) -> String {
        format!("/repos/{}/{}", self.owner.as_str(), self.name.as_str())
    }

    pub(crate) fn workflow_runs_path(&self, workflow: &str) -> String {
        format!("{}/actions/workflows/{workflow}/runs", self.repos_path())
    }

    pub(crate) fn run_artifacts_path(&self, run_id: u64) -> String {
        format!("{}/actions/runs/{run_id}/artifacts", self.repos_path())
    }

    pub(crate) fn artifact_zip_path(&self, artifact_id: u64) -> String {
        format!("{}/actions/artifacts/{artifact_id}/zip", self.repos_path())
    }

    /// Web URL of a workflow run, used when the API omits `html_url`.
    #[must_use]
    pub fn run_web_url(&self, run_id: u64) -> String {
        format!("https://github.com/{self}/actions/runs/{run_id}")
    }
}

impl fmt::Display for RepositorySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner.as_str(), self.name.as_str())
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidPullRequestNumber`] for zero.
    pub fn new(value: u64) -> Result<Self, InstallError> {
        if value == 0 {
            return Err(InstallError::InvalidPullRequestNumber {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Parses a PR number, tolerating a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidPullRequestNumber`] when the input is not
    /// a positive integer.
    pub fn parse(input: &str) -> Result<Self, InstallError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map_err(|_| InstallError::InvalidPullRequestNumber {
                value: input.to_owned(),
            })
            .and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pull request in a resolved repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    repository: RepositorySpec,
    number: PullRequestNumber,
}

impl PullRequestRef {
    /// Pairs a repository with a pull request number.
    #[must_use]
    pub const fn new(repository: RepositorySpec, number: PullRequestNumber) -> Self {
        Self { repository, number }
    }

    /// Repository the pull request belongs to.
    #[must_use]
    pub const fn repository(&self) -> &RepositorySpec {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    pub(crate) fn pull_request_path(&self) -> String {
        format!("{}/pulls/{}", self.repository.repos_path(), self.number)
    }

    /// Web page listing the CI checks for this pull request.
    #[must_use]
    pub fn checks_url(&self) -> String {
        format!(
            "https://github.com/{}/pull/{}/checks",
            self.repository, self.number
        )
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::NotAuthenticated`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, InstallError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InstallError::NotAuthenticated {
                message: "token is empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalAccessToken(***)")
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Parses the API base URL, defaulting to the public GitHub API.
///
/// # Errors
///
/// Returns [`InstallError::Configuration`] when the override is not a valid
/// absolute URL.
pub fn parse_api_base(api_url: Option<&str>) -> Result<Url, InstallError> {
    let raw = api_url.unwrap_or(DEFAULT_API_BASE);
    Url::parse(raw).map_err(|error| InstallError::Configuration {
        message: format!("invalid API URL '{raw}': {error}"),
    })
}
