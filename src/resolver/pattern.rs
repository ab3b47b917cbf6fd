//! Detection of installer bootstrap URLs in free-form text.

use std::sync::LazyLock;

use regex::Regex;

use crate::github::RepositorySpec;

/// Matches `raw.githubusercontent.com/<owner>/<repo>/` as written by the
/// one-line `curl ... | sh` bootstrap.
static RAW_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"raw\.githubusercontent\.com/([^/\s'"]+)/([^/\s'"]+)/"#).ok()
});

/// Returns every repository referenced by a raw-content URL in `text`, in
/// the order they appear.
///
/// Matches that do not form a valid `owner/repo` are skipped.
pub fn find_repositories(text: &str) -> Vec<RepositorySpec> {
    let Some(regex) = RAW_URL.as_ref() else {
        return Vec::new();
    };

    regex
        .captures_iter(text)
        .filter_map(|captures| {
            let owner = captures.get(1)?.as_str();
            let name = captures.get(2)?.as_str();
            RepositorySpec::parse(&format!("{owner}/{name}")).ok()
        })
        .collect()
}

/// Returns the first repository referenced in `text`.
pub fn first_repository(text: &str) -> Option<RepositorySpec> {
    find_repositories(text).into_iter().next()
}

/// Returns the last repository referenced in `text`.
pub fn last_repository(text: &str) -> Option<RepositorySpec> {
    find_repositories(text).into_iter().next_back()
}
