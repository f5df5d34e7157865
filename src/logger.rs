//! Session logger - append-only log file mirrored to the console
//!
//! Every call opens `text/log.txt` in append mode, writes the formatted
//! line, closes the file, and writes the identical text to standard output.
//! No file handle is held across calls, so the log file's tail always
//! matches the most recent console line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::session::Session;
use crate::store::Category;
use crate::{Error, Result};

/// Log file name under the `text/` category.
pub const LOG_FILE: &str = "log.txt";

/// Formatting options for a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Inserted between values (default `" "`)
    pub separator: String,
    /// Appended after the last value (default `"\n"`)
    pub terminator: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            separator: " ".to_owned(),
            terminator: "\n".to_owned(),
        }
    }
}

/// Line logger for one session.
///
/// Obtained from [`Session::logger`]. Append-only; this is the only
/// component that writes to an existing artifact rather than replacing it.
#[derive(Debug, Clone, Copy)]
pub struct Logger<'s> {
    session: &'s Session,
}

impl<'s> Logger<'s> {
    pub(crate) const fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Path of the session log file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.session.path().join(Category::Log.dir()).join(LOG_FILE)
    }

    /// Append one value as a line, mirrored to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the log file cannot be opened or
    /// written (e.g. analyse session over an absent tree).
    pub fn log(&self, value: impl std::fmt::Display) -> Result<()> {
        self.log_with(&[&value], &LogOptions::default())
    }

    /// Append several values joined by the options' separator and closed by
    /// its terminator, mirrored to stdout.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Logger::log`].
    pub fn log_with(&self, values: &[&dyn std::fmt::Display], options: &LogOptions) -> Result<()> {
        let mut text = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                text.push_str(&options.separator);
            }
            text.push_str(&value.to_string());
        }
        text.push_str(&options.terminator);
        self.append(&text)
    }

    /// One write for both sinks: the file gets the bytes first, then stdout
    /// gets the identical text.
    fn append(&self, text: &str) -> Result<()> {
        let path = self.path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::fs(&path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| Error::fs(&path, e))?;

        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scratch_session(root: &std::path::Path) -> Session {
        let now = chrono::Local.with_ymd_and_hms(2023, 7, 18, 14, 5, 0).unwrap();
        Session::create_in(root, now).unwrap()
    }

    #[test]
    fn test_log_appends_line() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let logger = session.logger();

        logger.log("hello").unwrap();
        let contents = std::fs::read_to_string(logger.path()).unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[test]
    fn test_log_tail_is_latest_line() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let logger = session.logger();

        logger.log("first").unwrap();
        logger.log("second").unwrap();

        let contents = std::fs::read_to_string(logger.path()).unwrap();
        assert_eq!(contents.lines().last(), Some("second"));
    }

    #[test]
    fn test_log_with_separator_and_terminator() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let logger = session.logger();

        let options = LogOptions {
            separator: ", ".to_owned(),
            terminator: ";\n".to_owned(),
        };
        logger.log_with(&[&"epoch", &3, &0.25], &options).unwrap();

        let contents = std::fs::read_to_string(logger.path()).unwrap();
        assert_eq!(contents, "epoch, 3, 0.25;\n");
    }

    #[test]
    fn test_log_on_absent_tree_fails() {
        let session = Session::open("definitely/not/here");
        let err = session.logger().log("x").unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }
}
