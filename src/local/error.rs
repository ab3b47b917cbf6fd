//! Why a checkout could not supply a repository.

use thiserror::Error;

/// Reasons the checkout heuristic comes up empty.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocalDiscoveryError {
    /// No working tree contains the directory.
    #[error("not inside a Git working tree")]
    OutsideCheckout,

    /// The checkout has no `origin` remote.
    #[error("checkout has no 'origin' remote")]
    NoOrigin,

    /// `origin` exists but is not an `owner/repo` URL.
    #[error("cannot read owner/repo from remote URL {url}")]
    UnrecognisedRemote {
        /// URL as configured on the remote.
        url: String,
    },

    /// `origin` is hosted somewhere other than `github.com`.
    #[error("remote host {host} is not github.com")]
    ForeignHost {
        /// Host part of the remote URL.
        host: String,
    },

    /// libgit2 failed while reading the checkout.
    #[error("git: {message}")]
    Git {
        /// Message reported by libgit2.
        message: String,
    },
}

impl From<git2::Error> for LocalDiscoveryError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}
