//! Git remote URL parsing for `github.com` origins.

use url::Url;

use super::error::LocalDiscoveryError;
use crate::github::RepositorySpec;

const GITHUB_HOST: &str = "github.com";

/// Extracts `owner/repo` from an SSH or HTTPS `github.com` remote URL.
///
/// Accepted forms:
/// - `git@github.com:owner/repo.git`
/// - `ssh://git@github.com/owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// The `.git` suffix and a trailing slash are optional.
///
/// # Errors
///
/// Returns [`LocalDiscoveryError::ForeignHost`] for other hosts and
/// [`LocalDiscoveryError::UnrecognisedRemote`] when the URL has no
/// `owner/repo` path.
pub fn parse_github_remote(url: &str) -> Result<RepositorySpec, LocalDiscoveryError> {
    let trimmed = url.trim();
    let invalid = || LocalDiscoveryError::UnrecognisedRemote {
        url: url.to_owned(),
    };

    let (host, path) = split_scp_style(trimmed)
        .or_else(|| split_url_style(trimmed))
        .ok_or_else(invalid)?;

    if !host.eq_ignore_ascii_case(GITHUB_HOST) {
        return Err(LocalDiscoveryError::ForeignHost { host });
    }

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    RepositorySpec::parse(path).map_err(|_| invalid())
}

/// Splits `user@host:path` into host and path.
fn split_scp_style(url: &str) -> Option<(String, String)> {
    if url.contains("://") {
        return None;
    }
    let (user_host, path) = url.split_once(':')?;
    let (_, host) = user_host.split_once('@')?;
    Some((host.to_owned(), path.to_owned()))
}

/// Splits `scheme://[user@]host[:port]/path` into host and path.
fn split_url_style(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_owned();
    Some((host, parsed.path().to_owned()))
}
