//! `.env` file loading
//!
//! Lines are parsed with `dotenvy`, which strips quotes. Values are loaded
//! literally: `$` never starts a variable reference, so secrets such as SMTP
//! passwords and refresh tokens survive intact (`\$` also reads as `$`).
//! Unlike `dotenvy::from_path`, a malformed line does not stop the load: it is
//! skipped and the remaining lines still apply. Variables already present in
//! the process environment always win.

use std::env;
use std::fs;
use std::path::Path;

/// Stand-in for `$` while dotenvy parses, so it cannot trigger substitution
const LITERAL_DOLLAR: char = '\u{E000}';

fn hide_dollars(contents: &str) -> String {
    contents
        .replace("\\$", "$")
        .replace('$', &LITERAL_DOLLAR.to_string())
}

fn restore_dollars(value: &str) -> String {
    value.replace(LITERAL_DOLLAR, "$")
}

/// Summary of a `.env` load
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvFileReport {
    /// Variables written to the process environment
    pub applied: usize,
    /// Variables left alone because they were already set
    pub preserved: usize,
    /// Lines that could not be parsed
    pub skipped: usize,
}

/// Apply the variables in `path` to the process environment
///
/// A missing file is not an error and yields an empty report.
///
/// # Errors
/// Returns the `dotenvy` error if the file exists but cannot be read.
pub fn load_env_file(path: &Path) -> Result<EnvFileReport, dotenvy::Error> {
    let mut report = EnvFileReport::default();
    if !path.exists() {
        return Ok(report);
    }

    let contents = fs::read_to_string(path).map_err(dotenvy::Error::Io)?;
    let contents = hide_dollars(&contents);

    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        match item {
            Ok((key, value)) => {
                let value = restore_dollars(&value);
                if env::var_os(&key).is_some() {
                    report.preserved += 1;
                } else {
                    env::set_var(&key, value);
                    report.applied += 1;
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping malformed .env line");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}
