//! Output formatting utilities for the installer CLI.

use std::io::{self, Write};

use tally_pr_install::pipeline::InstallReport;
use tally_pr_install::shell_profile::PathUpdate;
use tally_pr_install::{InstallContext, InstallError, Resolution};

/// Length of the abbreviated commit SHA shown to users.
const SHORT_SHA_LEN: usize = 7;

fn io_error(error: &io::Error) -> InstallError {
    InstallError::Io {
        message: error.to_string(),
    }
}

/// Writes which repository will be queried and how it was chosen.
pub fn write_resolution_to<W: Write>(
    writer: &mut W,
    resolution: &Resolution,
) -> Result<(), InstallError> {
    writeln!(
        writer,
        "Using repository {} ({})",
        resolution.repository(),
        resolution.method()
    )
    .map_err(|e| io_error(&e))?;

    if resolution.is_guess() {
        writeln!(
            writer,
            "Pass OWNER/REPO or --repo if this is not the repository you meant."
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the post-install summary.
pub fn write_install_summary_to<W: Write>(
    writer: &mut W,
    context: &InstallContext,
    report: &InstallReport,
) -> Result<(), InstallError> {
    let sha = report.head.as_str();
    let short_sha = sha.get(..SHORT_SHA_LEN).unwrap_or(sha);
    let run_url = report
        .run
        .html_url
        .clone()
        .unwrap_or_else(|| context.resolution.repository().run_web_url(report.run.id));

    writeln!(
        writer,
        "Installed {} from PR #{} (commit {short_sha})",
        report.artifact,
        context.pull_request.number()
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer, "  Run:     {run_url}").map_err(|e| io_error(&e))?;
    writeln!(writer, "  Binary:  {}", report.binary.path).map_err(|e| io_error(&e))?;
    writeln!(writer, "  Version: {}", report.binary.version).map_err(|e| io_error(&e))?;

    match &report.path_update {
        Some((profile, PathUpdate::Appended)) => writeln!(
            writer,
            "Added {} to PATH in {profile}. Restart your shell or run: source {profile}",
            context.install_dir
        ),
        Some((profile, PathUpdate::AlreadyPresent)) => {
            writeln!(writer, "{profile} already adds {} to PATH.", context.install_dir)
        }
        None => Ok(()),
    }
    .map_err(|e| io_error(&e))
}

/// Writes an error and its remediation hint to stderr.
pub fn write_error(error: &InstallError) {
    let mut stderr = io::stderr().lock();
    if writeln!(stderr, "error: {error}").is_err() {
        return;
    }
    if let Some(hint) = error.hint() {
        if writeln!(stderr, "hint: {hint}").is_err() {
            return;
        }
    }
}
