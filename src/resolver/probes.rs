//! Independent heuristics that guess the repository the installer came from.
//!
//! Each probe is stateless and read-only. A probe that cannot see anything
//! useful returns `None`; none of them can fail the resolution.

use std::path::PathBuf;

use camino::Utf8PathBuf;

use super::history::{HISTORY_TAIL_LINES, tail_lines};
use super::pattern::{first_repository, last_repository};
use super::process::ProcessTable;
use crate::github::RepositorySpec;
use crate::local::origin_repository;

/// Maximum number of ancestors inspected by [`AncestryProbe`].
pub const MAX_ANCESTOR_GENERATIONS: usize = 5;

/// The heuristic that produced an auto-detected repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// Recent shell history.
    ShellHistory,
    /// A running `curl` process.
    ProcessTable,
    /// A command line among this process's ancestors.
    ProcessAncestry,
    /// The `origin` remote of the current checkout.
    LocalCheckout,
}

impl Heuristic {
    /// Human-readable description of the signal.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ShellHistory => "shell history",
            Self::ProcessTable => "running curl process",
            Self::ProcessAncestry => "parent process",
            Self::LocalCheckout => "local git checkout",
        }
    }
}

/// A best-effort signal for the repository to query.
pub trait RepositoryProbe {
    /// Which heuristic this probe implements.
    fn heuristic(&self) -> Heuristic;

    /// Returns a repository if the signal is present.
    fn probe(&self) -> Option<RepositorySpec>;
}

/// Searches the tail of the shell history, newest line first.
#[derive(Debug, Clone)]
pub struct HistoryProbe {
    path: Option<Utf8PathBuf>,
}

impl HistoryProbe {
    /// Probe the given history file, if any.
    #[must_use]
    pub const fn new(path: Option<Utf8PathBuf>) -> Self {
        Self { path }
    }
}

impl RepositoryProbe for HistoryProbe {
    fn heuristic(&self) -> Heuristic {
        Heuristic::ShellHistory
    }

    fn probe(&self) -> Option<RepositorySpec> {
        let path = self.path.as_deref()?;
        tail_lines(path, HISTORY_TAIL_LINES)
            .iter()
            .rev()
            .find_map(|line| last_repository(line))
    }
}

/// Scans `curl` command lines across the whole process table.
///
/// The first match in listing order wins, which is not necessarily the most
/// recent `curl` when several installers run at once.
pub struct ProcessTableProbe<'table> {
    table: &'table dyn ProcessTable,
}

impl<'table> ProcessTableProbe<'table> {
    /// Probe the given process table.
    #[must_use]
    pub const fn new(table: &'table dyn ProcessTable) -> Self {
        Self { table }
    }
}

impl RepositoryProbe for ProcessTableProbe<'_> {
    fn heuristic(&self) -> Heuristic {
        Heuristic::ProcessTable
    }

    fn probe(&self) -> Option<RepositorySpec> {
        self.table
            .command_lines()
            .iter()
            .filter(|line| line.to_ascii_lowercase().contains("curl"))
            .find_map(|line| first_repository(line))
    }
}

/// Walks up the process tree from a starting PID.
pub struct AncestryProbe<'table> {
    table: &'table dyn ProcessTable,
    start_pid: u32,
}

impl<'table> AncestryProbe<'table> {
    /// Probe ancestors beginning with `start_pid` (normally the parent PID).
    #[must_use]
    pub const fn new(table: &'table dyn ProcessTable, start_pid: u32) -> Self {
        Self { table, start_pid }
    }
}

impl RepositoryProbe for AncestryProbe<'_> {
    fn heuristic(&self) -> Heuristic {
        Heuristic::ProcessAncestry
    }

    fn probe(&self) -> Option<RepositorySpec> {
        let mut pid = self.start_pid;
        for _ in 0..MAX_ANCESTOR_GENERATIONS {
            if pid <= 1 {
                return None;
            }
            if let Some(found) = self
                .table
                .command_line(pid)
                .and_then(|line| first_repository(&line))
            {
                return Some(found);
            }
            pid = self.table.parent_pid(pid)?;
        }
        None
    }
}

/// Reads the `origin` remote of the checkout containing a directory.
#[derive(Debug, Clone)]
pub struct CheckoutProbe {
    directory: PathBuf,
}

impl CheckoutProbe {
    /// Probe the checkout containing `directory`.
    #[must_use]
    pub const fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

impl RepositoryProbe for CheckoutProbe {
    fn heuristic(&self) -> Heuristic {
        Heuristic::LocalCheckout
    }

    fn probe(&self) -> Option<RepositorySpec> {
        match origin_repository(&self.directory) {
            Ok(repository) => Some(repository),
            Err(error) => {
                tracing::debug!("checkout probe found nothing: {error}");
                None
            }
        }
    }
}
