//! Reading the GitHub origin of the checkout containing a directory.

use std::path::Path;

use git2::{ErrorCode, Repository};

use super::error::LocalDiscoveryError;
use super::remote::parse_github_remote;
use crate::github::RepositorySpec;

/// Remote consulted by the checkout heuristic.
pub const ORIGIN_REMOTE: &str = "origin";

/// Returns the repository that `origin` points at for the working tree
/// containing `start`.
///
/// Parent directories are searched the way `git` itself does. Bare
/// repositories have no working tree and count as no checkout.
///
/// # Errors
///
/// Returns [`LocalDiscoveryError::OutsideCheckout`] when no working tree is
/// found, [`LocalDiscoveryError::NoOrigin`] when `origin` is not configured,
/// and the errors of [`parse_github_remote`] for unusable URLs.
pub fn origin_repository(start: &Path) -> Result<RepositorySpec, LocalDiscoveryError> {
    let checkout = Repository::discover(start).map_err(|error| match error.code() {
        ErrorCode::NotFound => LocalDiscoveryError::OutsideCheckout,
        _ => error.into(),
    })?;
    if checkout.is_bare() {
        return Err(LocalDiscoveryError::OutsideCheckout);
    }

    let origin = checkout
        .find_remote(ORIGIN_REMOTE)
        .map_err(|error| match error.code() {
            ErrorCode::NotFound => LocalDiscoveryError::NoOrigin,
            _ => error.into(),
        })?;

    let url = origin
        .url()
        .ok_or_else(|| LocalDiscoveryError::UnrecognisedRemote {
            url: String::from_utf8_lossy(origin.url_bytes()).into_owned(),
        })?;
    parse_github_remote(url)
}
