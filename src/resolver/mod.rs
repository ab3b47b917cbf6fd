//! Works out which GitHub repository to query for pull request builds.
//!
//! The installer may run from a fork's copy of the one-line bootstrap, so the
//! repository is not statically known. Resolution takes the first answer
//! from an ordered chain: an explicit argument, a configured override, the
//! auto-detection probes in [`probes`], and finally [`DEFAULT_REPOSITORY`].
//! Resolution itself never fails.

pub mod history;
pub mod pattern;
pub mod probes;
pub mod process;

use std::fmt;
use std::path::PathBuf;

use crate::github::RepositorySpec;

pub use probes::{
    AncestryProbe, CheckoutProbe, Heuristic, HistoryProbe, ProcessTableProbe, RepositoryProbe,
};
pub use process::{ProcessTable, PsProcessTable};

/// Repository used when nothing more specific is known.
pub const DEFAULT_REPOSITORY: &str = "tally-cli/tally";

const DEFAULT_OWNER: &str = "tally-cli";
const DEFAULT_NAME: &str = "tally";

/// Returns [`DEFAULT_REPOSITORY`] as a parsed spec.
#[must_use]
pub fn default_repository() -> RepositorySpec {
    RepositorySpec::from_trusted_parts(DEFAULT_OWNER, DEFAULT_NAME)
}

/// How the repository was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    /// Given as a positional argument.
    Explicit,
    /// Given through `--repo`, `TALLY_REPO`, or the configuration file.
    Override,
    /// Found by one of the auto-detection heuristics.
    AutoDetect(Heuristic),
    /// Nothing matched; the compiled-in default was used.
    Default,
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit argument"),
            Self::Override => f.write_str("override"),
            Self::AutoDetect(heuristic) => write!(f, "auto-detected from {}", heuristic.describe()),
            Self::Default => f.write_str("default"),
        }
    }
}

/// The chosen repository together with how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    repository: RepositorySpec,
    method: ResolutionMethod,
}

impl Resolution {
    /// Pairs a repository with the method that selected it.
    #[must_use]
    pub const fn new(repository: RepositorySpec, method: ResolutionMethod) -> Self {
        Self { repository, method }
    }

    /// The repository to query.
    #[must_use]
    pub const fn repository(&self) -> &RepositorySpec {
        &self.repository
    }

    /// How the repository was chosen.
    #[must_use]
    pub const fn method(&self) -> ResolutionMethod {
        self.method
    }

    /// Whether the repository was guessed rather than given by the user.
    #[must_use]
    pub const fn is_guess(&self) -> bool {
        matches!(
            self.method,
            ResolutionMethod::AutoDetect(_) | ResolutionMethod::Default
        )
    }
}

/// Inputs the system probes read from the invoking environment.
#[derive(Debug, Clone, Default)]
pub struct ProbeEnvironment {
    /// Value of `HISTFILE`.
    pub histfile: Option<String>,
    /// Value of `SHELL`.
    pub shell: Option<String>,
    /// Value of `HOME`.
    pub home: Option<String>,
    /// Directory to inspect for a local checkout.
    pub working_dir: Option<PathBuf>,
    /// PID the ancestry walk starts from.
    pub parent_pid: Option<u32>,
}

impl ProbeEnvironment {
    /// Captures the environment of the current process.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            histfile: std::env::var("HISTFILE").ok(),
            shell: std::env::var("SHELL").ok(),
            home: std::env::var("HOME").ok(),
            working_dir: std::env::current_dir().ok(),
            parent_pid: parent_pid(),
        }
    }
}

#[cfg(unix)]
fn parent_pid() -> Option<u32> {
    Some(std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn parent_pid() -> Option<u32> {
    None
}

/// Ordered chain of repository sources.
///
/// # Example
///
/// ```
/// use tally_pr_install::github::RepositorySpec;
/// use tally_pr_install::resolver::{RepositoryResolver, ResolutionMethod};
///
/// let fork = RepositorySpec::parse("fork/tally").expect("valid spec");
/// let resolution = RepositoryResolver::new().with_override(Some(fork)).resolve();
///
/// assert_eq!(resolution.repository().to_string(), "fork/tally");
/// assert_eq!(resolution.method(), ResolutionMethod::Override);
/// ```
#[derive(Default)]
pub struct RepositoryResolver<'env> {
    explicit: Option<RepositorySpec>,
    override_repository: Option<RepositorySpec>,
    probes: Vec<Box<dyn RepositoryProbe + 'env>>,
}

impl<'env> RepositoryResolver<'env> {
    /// Creates a resolver with no sources besides the default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the positional repository argument.
    #[must_use]
    pub fn with_explicit(mut self, repository: Option<RepositorySpec>) -> Self {
        self.explicit = repository;
        self
    }

    /// Sets the configured override.
    #[must_use]
    pub fn with_override(mut self, repository: Option<RepositorySpec>) -> Self {
        self.override_repository = repository;
        self
    }

    /// Appends a probe; probes run in the order they are added.
    #[must_use]
    pub fn with_probe(mut self, probe: impl RepositoryProbe + 'env) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Appends the history, process-table, ancestry, and checkout probes.
    #[must_use]
    pub fn with_system_probes(
        self,
        table: &'env dyn ProcessTable,
        environment: &ProbeEnvironment,
    ) -> Self {
        let history_path = history::history_file(
            environment.histfile.as_deref(),
            environment.shell.as_deref(),
            environment.home.as_deref(),
        );

        let mut resolver = self
            .with_probe(HistoryProbe::new(history_path))
            .with_probe(ProcessTableProbe::new(table));
        if let Some(pid) = environment.parent_pid {
            resolver = resolver.with_probe(AncestryProbe::new(table, pid));
        }
        if let Some(dir) = &environment.working_dir {
            resolver = resolver.with_probe(CheckoutProbe::new(dir.clone()));
        }
        resolver
    }

    /// Picks the repository from the first source that yields one.
    #[must_use]
    pub fn resolve(&self) -> Resolution {
        if let Some(repository) = &self.explicit {
            return Resolution::new(repository.clone(), ResolutionMethod::Explicit);
        }
        if let Some(repository) = &self.override_repository {
            return Resolution::new(repository.clone(), ResolutionMethod::Override);
        }

        for probe in &self.probes {
            if let Some(repository) = probe.probe() {
                let heuristic = probe.heuristic();
                tracing::debug!("repository {repository} found via {}", heuristic.describe());
                return Resolution::new(repository, ResolutionMethod::AutoDetect(heuristic));
            }
            tracing::debug!("no repository from {}", probe.heuristic().describe());
        }

        Resolution::new(default_repository(), ResolutionMethod::Default)
    }
}
