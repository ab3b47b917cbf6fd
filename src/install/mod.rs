//! Artifact download and local installation.

pub mod fetcher;
pub mod installer;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workspace;

pub use fetcher::{ArtifactFetcher, ArtifactHandle};
pub use installer::{BINARY_NAME, InstalledBinary, Installer};
pub use workspace::Workspace;
