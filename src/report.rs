//! Run report - structural summary of a session's directory tree
//!
//! The tree itself is the only persisted state; there is no index file. A
//! report is reconstructed by listing directories at call time: the session
//! path, the configuration mapping, entry counts for the four fixed
//! categories, then a count for every custom category `save_data` has
//! introduced.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::session::{Session, FIXED_SUBDIRS};
use crate::store::{entry_count, Category};
use crate::{Error, Result};

/// Snapshot of what a session has produced, in report print order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    path: PathBuf,
    config: Map<String, Value>,
    plots: usize,
    arrays: usize,
    compressed_arrays: usize,
    text_files: usize,
    custom: Vec<(String, usize)>,
}

impl Report {
    /// Session path the report was taken over.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configuration mapping at report time.
    #[must_use]
    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Entry count of `image/`.
    #[must_use]
    pub const fn plot_count(&self) -> usize {
        self.plots
    }

    /// Entry count of `array/`.
    #[must_use]
    pub const fn array_count(&self) -> usize {
        self.arrays
    }

    /// Entry count of `compressed-array/`.
    #[must_use]
    pub const fn compressed_array_count(&self) -> usize {
        self.compressed_arrays
    }

    /// Entry count of `text/`.
    #[must_use]
    pub const fn text_count(&self) -> usize {
        self.text_files
    }

    /// Custom category names and counts, in directory-listing order.
    #[must_use]
    pub fn custom_counts(&self) -> &[(String, usize)] {
        &self.custom
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Report")?;
        writeln!(f, "----------")?;
        writeln!(f, "Output folder: {}", self.path.display())?;
        writeln!(f, "Config: {}", Value::Object(self.config.clone()))?;
        writeln!(f, "Plots: {}", self.plots)?;
        writeln!(f, "Arrays: {}", self.arrays)?;
        writeln!(f, "Compressed arrays: {}", self.compressed_arrays)?;
        writeln!(f, "Text files: {}", self.text_files)?;
        for (name, count) in &self.custom {
            writeln!(f, "{name} files: {count}")?;
        }
        write!(f, "End of report")
    }
}

/// Read-back component summarizing one session.
///
/// Obtained from [`Session::reporter`]. Purely informational; no side
/// effects on stored artifacts.
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'s> {
    session: &'s Session,
}

impl<'s> Reporter<'s> {
    pub(crate) const fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Collect the structural summary by listing the session tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the session root or any fixed
    /// subdirectory cannot be listed (e.g. analyse session over an absent
    /// or incomplete tree).
    pub fn report(&self) -> Result<Report> {
        let root = self.session.path();
        let store = self.session.store();

        let plots = entry_count(&store.category_dir(Category::Plot))?;
        let arrays = entry_count(&store.category_dir(Category::Array))?;
        let compressed_arrays = entry_count(&store.category_dir(Category::CompressedArray))?;
        let text_files = entry_count(&store.category_dir(Category::Log))?;

        let mut custom = Vec::new();
        let entries = fs::read_dir(root).map_err(|e| Error::fs(root, e))?;
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if FIXED_SUBDIRS.contains(&name) {
                continue;
            }
            custom.push((name.to_owned(), entry_count(&path)?));
        }

        Ok(Report {
            path: root.to_path_buf(),
            config: self.session.config().clone(),
            plots,
            arrays,
            compressed_arrays,
            text_files,
            custom,
        })
    }

    /// Collect the summary and print it to standard output.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Reporter::report`].
    pub fn print(&self) -> Result<()> {
        println!("{}", self.report()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scratch_session(root: &Path) -> Session {
        let now = chrono::Local.with_ymd_and_hms(2023, 7, 18, 14, 5, 0).unwrap();
        Session::create_in(root, now).unwrap()
    }

    #[test]
    fn test_fresh_session_reports_zero_counts() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());
        let report = session.reporter().report().unwrap();

        assert_eq!(report.plot_count(), 0);
        assert_eq!(report.array_count(), 0);
        assert_eq!(report.compressed_array_count(), 0);
        assert_eq!(report.text_count(), 0);
        assert!(report.custom_counts().is_empty());
    }

    #[test]
    fn test_report_counts_match_tree() {
        let root = tempfile::tempdir().unwrap();
        let session = scratch_session(root.path());

        session.logger().log("one line").unwrap();
        session
            .store()
            .save_array(&[1.0, 2.0, 3.0], "a", false)
            .unwrap();

        let report = session.reporter().report().unwrap();
        assert_eq!(report.plot_count(), 0);
        assert_eq!(report.array_count(), 1);
        assert_eq!(report.compressed_array_count(), 0);
        assert_eq!(report.text_count(), 1);
    }

    #[test]
    fn test_display_banner_format() {
        let root = tempfile::tempdir().unwrap();
        let mut session = scratch_session(root.path());
        session.set_config("seed", serde_json::json!(7));

        let text = session.reporter().report().unwrap().to_string();
        assert!(text.starts_with("Run Report\n----------\n"));
        assert!(text.contains("Output folder: "));
        assert!(text.contains("Config: {\"seed\":7}"));
        assert!(text.ends_with("End of report"));
    }

    #[test]
    fn test_report_on_absent_tree_fails() {
        let session = Session::open("nowhere/at/all");
        assert!(matches!(
            session.reporter().report(),
            Err(Error::Filesystem { .. })
        ));
    }
}
