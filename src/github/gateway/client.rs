//! HTTP client construction helpers for the gateway implementation.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::InstallError;
use crate::github::locator::PersonalAccessToken;

use super::error_mapping::map_octocrab_error;

/// User agent sent with raw artifact downloads; GitHub rejects requests
/// without one.
const USER_AGENT: &str = concat!("tally-pr-install/", env!("CARGO_PKG_VERSION"));

/// Builds an Octocrab client for the given token and API base URL.
///
/// # Errors
///
/// Returns `InstallError::Configuration` when the base URI cannot be parsed or
/// `InstallError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: &PersonalAccessToken,
    api_base: &str,
) -> Result<Octocrab, InstallError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| InstallError::Configuration {
            message: format!("invalid API URL '{api_base}': {error}"),
        })?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| InstallError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}

/// Builds the plain HTTP client used for artifact downloads.
///
/// Redirects are followed so that the signed blob-storage URL GitHub returns
/// for artifact archives is fetched transparently.
pub(super) fn build_download_client() -> Result<reqwest::Client, InstallError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|error| InstallError::Network {
            message: format!("build download client failed: {error}"),
        })
}
