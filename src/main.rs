//! `tally-pr-install` CLI entrypoint.

mod cli;

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use tally_pr_install::github::{CredentialSource, StaticCredentials};
use tally_pr_install::pipeline::{InstallContext, PathIntegration, run_install};
use tally_pr_install::resolver::{ProbeEnvironment, PsProcessTable, RepositoryResolver};
use tally_pr_install::{
    InstallError, InstallerConfig, PullRequestNumber, PullRequestRef, RepositorySpec, platform,
    shell_profile,
};
use tracing_subscriber::EnvFilter;

use cli::output::{write_error, write_install_summary_to, write_resolution_to};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            write_error(&error);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), InstallError> {
    let (positionals, filtered) = extract_positional_args(std::env::args_os());
    let config = load_config(filtered)?;
    let request = PositionalRequest::parse(&positionals)?;

    let token = config.credentials()?.token()?;

    let probe_environment = ProbeEnvironment::from_process();
    let process_table = PsProcessTable;
    let resolution = RepositoryResolver::new()
        .with_explicit(request.repository)
        .with_override(config.repository_override()?)
        .with_system_probes(&process_table, &probe_environment)
        .resolve();
    write_resolution_to(&mut io::stdout().lock(), &resolution)?;

    let platform = platform::detect()?;
    let install_dir = config.resolve_install_dir()?;
    let path_integration = path_integration(&config, &install_dir)?;

    let context = InstallContext {
        pull_request: PullRequestRef::new(resolution.repository().clone(), request.number),
        resolution,
        platform,
        install_dir,
        tmp_root: config.tmp_root(),
        workflow: config.workflow().to_owned(),
        api_base: config.api_base()?,
        path_integration,
    };

    let report = run_install(&context, &StaticCredentials::new(token)).await?;
    write_install_summary_to(&mut io::stdout().lock(), &context, &report)
}

fn path_integration(
    config: &InstallerConfig,
    install_dir: &camino::Utf8Path,
) -> Result<PathIntegration, InstallError> {
    if config.no_modify_path {
        return Ok(PathIntegration::Skip);
    }
    let path_var = std::env::var("PATH").ok();
    if shell_profile::is_on_path(path_var.as_deref(), install_dir) {
        tracing::debug!("{install_dir} is already on PATH");
        return Ok(PathIntegration::Skip);
    }
    Ok(PathIntegration::Profile(shell_profile::default_profile_path()?))
}

/// Loads configuration from the filtered CLI arguments, environment, and
/// files.
///
/// # Errors
///
/// Returns [`InstallError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config(args: Vec<OsString>) -> Result<InstallerConfig, InstallError> {
    use ortho_config::OrthoConfig;

    InstallerConfig::load_from_iter(args).map_err(|error| InstallError::Configuration {
        message: error.to_string(),
    })
}

/// The positional `PR_NUMBER [OWNER/REPO]` arguments.
#[derive(Debug, PartialEq, Eq)]
struct PositionalRequest {
    number: PullRequestNumber,
    repository: Option<RepositorySpec>,
}

impl PositionalRequest {
    fn parse(positionals: &[String]) -> Result<Self, InstallError> {
        match positionals {
            [] => Err(InstallError::MissingPullRequestNumber),
            [number] => Ok(Self {
                number: PullRequestNumber::parse(number)?,
                repository: None,
            }),
            [number, repository] => Ok(Self {
                number: PullRequestNumber::parse(number)?,
                repository: Some(RepositorySpec::parse(repository.trim())?),
            }),
            [_, _, extra, ..] => Err(InstallError::InvalidArgument {
                argument: extra.clone(),
            }),
        }
    }
}

/// Separates positional arguments from flags so that ortho-config only sees
/// the flags it declares.
///
/// The program name is always kept. Values following a flag listed in
/// [`InstallerConfig::VALUE_FLAGS`] stay with their flag; everything after
/// `--` is positional.
fn extract_positional_args(
    args: impl IntoIterator<Item = OsString>,
) -> (Vec<String>, Vec<OsString>) {
    let mut iter = args.into_iter();
    let mut filtered: Vec<OsString> = iter.next().into_iter().collect();
    let mut positionals = Vec::new();
    let mut after_separator = false;

    while let Some(arg) = iter.next() {
        let text = arg.to_string_lossy().into_owned();
        if after_separator {
            positionals.push(text);
            continue;
        }
        if text == "--" {
            after_separator = true;
            continue;
        }
        if text.starts_with('-') && text.len() > 1 {
            let takes_value = InstallerConfig::VALUE_FLAGS.contains(&text.as_str());
            filtered.push(arg);
            if takes_value {
                filtered.extend(iter.next());
            }
            continue;
        }
        positionals.push(text);
    }

    (positionals, filtered)
}
