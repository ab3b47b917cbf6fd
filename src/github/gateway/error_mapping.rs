//! Translation of transport failures into [`InstallError`] variants.

use http::StatusCode;

use crate::github::error::InstallError;

/// Whether GitHub rejected the request for lack of credentials.
///
/// GitHub answers 403 both for bad tokens and for tokens missing a scope.
const fn rejects_credentials(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// True when GitHub answered 404.
pub(super) fn is_not_found(error: &octocrab::Error) -> bool {
    status_of(error) == Some(StatusCode::NOT_FOUND)
}

fn status_of(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Maps an Octocrab failure during `operation`.
pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> InstallError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            map_http_error(operation, source.status_code, Some(source.message.clone()))
        }
        octocrab::Error::Http { .. }
        | octocrab::Error::Hyper { .. }
        | octocrab::Error::Service { .. } => InstallError::Network {
            message: format!("{operation}: {error}"),
        },
        _ => InstallError::Api {
            message: format!("{operation}: {error}"),
        },
    }
}

/// Maps a non-success HTTP status, with GitHub's `message` when it sent one.
pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    github_message: Option<String>,
) -> InstallError {
    let detail = github_message.map_or_else(String::new, |text| format!(": {text}"));
    if rejects_credentials(status) {
        InstallError::Authentication {
            message: format!("{operation} was refused ({status}){detail}"),
        }
    } else {
        InstallError::Api {
            message: format!("{operation} returned {status}{detail}"),
        }
    }
}

pub(super) fn map_reqwest_error(operation: &str, error: &reqwest::Error) -> InstallError {
    InstallError::Network {
        message: format!("{operation}: {error}"),
    }
}

/// Pulls `message` out of a GitHub JSON error body.
pub(super) fn extract_github_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(ToOwned::to_owned)
}
