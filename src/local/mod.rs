//! Local Git checkout inspection for the last-resort repository heuristic.
//!
//! ```no_run
//! use std::path::Path;
//! use tally_pr_install::local::origin_repository;
//!
//! if let Ok(repository) = origin_repository(Path::new(".")) {
//!     println!("origin is {repository}");
//! }
//! ```

mod discovery;
mod error;
mod remote;

pub use discovery::{ORIGIN_REMOTE, origin_repository};
pub use error::LocalDiscoveryError;
pub use remote::parse_github_remote;
