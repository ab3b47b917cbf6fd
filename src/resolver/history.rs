//! Shell history lookup.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

/// Number of trailing history lines searched for the bootstrap command.
pub const HISTORY_TAIL_LINES: usize = 5;

/// Resolves the invoking shell's history file.
///
/// `HISTFILE` wins when set; otherwise the default for the login shell named
/// by `SHELL` is used (`~/.zsh_history` for zsh, `~/.bash_history` for
/// everything else). Returns `None` when no home directory is known.
#[must_use]
pub fn history_file(
    histfile: Option<&str>,
    shell: Option<&str>,
    home: Option<&str>,
) -> Option<Utf8PathBuf> {
    if let Some(path) = histfile.filter(|value| !value.is_empty()) {
        return Some(Utf8PathBuf::from(path));
    }

    let home = Utf8PathBuf::from(home.filter(|value| !value.is_empty())?);
    let is_zsh = shell
        .and_then(|value| Utf8Path::new(value).file_name())
        .is_some_and(|name| name == "zsh");

    Some(if is_zsh {
        home.join(".zsh_history")
    } else {
        home.join(".bash_history")
    })
}

/// Reads the last `count` lines of a history file.
///
/// Unreadable or missing files yield no lines. Invalid UTF-8 (zsh metafied
/// history) is replaced rather than rejected.
#[must_use]
pub fn tail_lines(path: &Utf8Path, count: usize) -> Vec<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::debug!("history file {path} unreadable: {error}");
            return Vec::new();
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines
        .get(start..)
        .unwrap_or_default()
        .iter()
        .map(|line| (*line).to_owned())
        .collect()
}
