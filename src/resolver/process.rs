//! Read-only access to the host process table.
//!
//! Process inspection is best-effort: other users' processes may be hidden,
//! and the shell that piped the bootstrap script may already have exited.
//! Every query therefore returns an empty result instead of an error.

use std::process::Command;

/// Snapshot-style queries over running processes.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessTable {
    /// Command lines of all visible processes, in listing order.
    fn command_lines(&self) -> Vec<String>;

    /// Parent PID of `pid`, if the process is visible.
    fn parent_pid(&self, pid: u32) -> Option<u32>;

    /// Full command line of `pid`, if the process is visible.
    fn command_line(&self, pid: u32) -> Option<String>;
}

/// Process table backed by the POSIX `ps` utility.
#[derive(Debug, Default, Clone, Copy)]
pub struct PsProcessTable;

impl PsProcessTable {
    fn ps(args: &[&str]) -> Option<String> {
        let output = match Command::new("ps").args(args).output() {
            Ok(output) => output,
            Err(error) => {
                tracing::debug!("could not run ps: {error}");
                return None;
            }
        };

        if !output.status.success() {
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ProcessTable for PsProcessTable {
    fn command_lines(&self) -> Vec<String> {
        Self::ps(&["-A", "-o", "args="])
            .map(|listing| {
                listing
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parent_pid(&self, pid: u32) -> Option<u32> {
        Self::ps(&["-o", "ppid=", "-p", &pid.to_string()])?
            .trim()
            .parse()
            .ok()
    }

    fn command_line(&self, pid: u32) -> Option<String> {
        let line = Self::ps(&["-o", "args=", "-p", &pid.to_string()])?;
        let trimmed = line.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}
