//! Helpers for building artifact archives in tests.
//!
//! # Examples
//!
//! ```
//! use tally_pr_install::install::test_support::{fake_tally_script, zip_archive};
//!
//! let script = fake_tally_script("tally 1.2.3");
//! let bytes = zip_archive(&[("tally", script.as_bytes())]).expect("zip builds");
//! assert!(bytes.starts_with(b"PK"));
//! ```

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;

/// Builds an in-memory zip archive with the given `(path, contents)` entries.
///
/// # Errors
///
/// Returns the underlying [`zip::result::ZipError`] if writing fails.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o644);

    for (path, contents) in entries {
        writer.start_file(*path, options)?;
        writer.write_all(contents)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// A shell script standing in for the `tally` binary; `version` prints
/// `output`.
#[must_use]
pub fn fake_tally_script(output: &str) -> String {
    format!("#!/bin/sh\nif [ \"$1\" = \"version\" ]; then\n  echo '{output}'\nfi\n")
}

/// A `tally` stand-in whose `version` command exits with `code`.
#[must_use]
pub fn failing_tally_script(code: u8) -> String {
    format!("#!/bin/sh\necho 'broken build' >&2\nexit {code}\n")
}
