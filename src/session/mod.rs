//! Run session - unique, time-bucketed output directory for one process run
//!
//! A [`Session`] is the root entity everything else hangs off: a resolved
//! output path plus a caller-populated configuration mapping. Write-mode
//! sessions allocate `out/<year>/<month>/<day>/<hour>-<minute>/<seq>` and
//! create the fixed artifact subdirectories; analyse-mode sessions point at a
//! pre-existing tree and never touch the filesystem.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use runout::Session;
//!
//! let mut session = Session::create()?;
//! session.set_config("learning_rate", serde_json::json!(0.01));
//!
//! session.logger().log("run started")?;
//! session.store().save_array(&[1.0, 2.0, 3.0], "loss", false)?;
//! session.reporter().print()?;
//! # Ok::<(), runout::Error>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, Timelike};
use serde_json::{Map, Value};

use crate::logger::Logger;
use crate::report::Reporter;
use crate::store::ArtifactStore;
use crate::{Error, Result};

/// Default root for write-mode sessions, relative to the working directory.
pub const DEFAULT_ROOT: &str = "out";

/// Fixed subdirectories created under every write-session path, in report
/// order: logs, uncompressed arrays, compressed archives, plot images.
pub const FIXED_SUBDIRS: [&str; 4] = ["text", "array", "compressed-array", "image"];

/// Session construction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Freshly allocated directory tree owned by this process.
    Write,
    /// Read-only view of a pre-existing session directory.
    Analyse,
}

/// One run's artifact root path plus its configuration mapping.
///
/// Created once per process run (write mode) or opened against an existing
/// path (analyse mode) and owned by the caller for the process lifetime.
/// There is no deletion API; removing the tree is the caller's business.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    config: Map<String, Value>,
    mode: SessionMode,
}

/// Build the time bucket `<root>/<year>/<month>/<day>/<hour>-<minute>` for a
/// given timestamp.
///
/// Pure path arithmetic: the wall clock enters only through the `now`
/// argument, so allocation is testable with fixed timestamps. Components are
/// not zero-padded (`out/2023/7/18/14-5`).
#[must_use]
pub fn bucket_path(root: &Path, now: &DateTime<Local>) -> PathBuf {
    root.join(now.year().to_string())
        .join(now.month().to_string())
        .join(now.day().to_string())
        .join(format!("{}-{}", now.hour(), now.minute()))
}

/// Allocate the next free sequence directory under `bucket`.
///
/// Probes `bucket/1`, `bucket/2`, ... with `fs::create_dir`, which creates
/// exclusively and fails with `AlreadyExists` on a taken slot. Creation and
/// the existence check are one syscall, so two in-process allocators cannot
/// select the same index.
fn allocate(bucket: &Path) -> Result<PathBuf> {
    let mut seq: u32 = 1;
    loop {
        let candidate = bucket.join(seq.to_string());
        match fs::create_dir(&candidate) {
            Ok(()) => {
                tracing::debug!(path = %candidate.display(), seq, "allocated run directory");
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => seq += 1,
            Err(e) => return Err(Error::fs(candidate, e)),
        }
    }
}

impl Session {
    /// Create a write-mode session under [`DEFAULT_ROOT`] using the current
    /// local time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if any directory creation fails
    /// (permissions, disk full, missing parent). Partial creation is not
    /// rolled back.
    pub fn create() -> Result<Self> {
        Self::create_in(Path::new(DEFAULT_ROOT), Local::now())
    }

    /// Create a write-mode session under an explicit root using the current
    /// local time.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Session::create`].
    pub fn create_at(root: impl AsRef<Path>) -> Result<Self> {
        Self::create_in(root.as_ref(), Local::now())
    }

    /// Create a write-mode session under `root` for the given timestamp.
    ///
    /// This is the allocation entry point the convenience constructors feed;
    /// taking `now` as an argument keeps sequence discovery and directory
    /// creation testable without real wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the bucket, the sequence directory,
    /// or any of the four fixed subdirectories cannot be created.
    pub fn create_in(root: &Path, now: DateTime<Local>) -> Result<Self> {
        let bucket = bucket_path(root, &now);
        fs::create_dir_all(&bucket).map_err(|e| Error::fs(&bucket, e))?;

        let path = allocate(&bucket)?;
        for sub in FIXED_SUBDIRS {
            let dir = path.join(sub);
            fs::create_dir(&dir).map_err(|e| Error::fs(dir, e))?;
        }

        Ok(Self {
            path,
            config: Map::new(),
            mode: SessionMode::Write,
        })
    }

    /// Open an analyse-mode session over a pre-existing run directory.
    ///
    /// Records `path` as the session root without creating or validating
    /// anything. Subsequent loads and reports assume the expected structure
    /// and fail with not-found errors if it is absent.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Map::new(),
            mode: SessionMode::Analyse,
        }
    }

    /// Get the resolved session path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the construction mode.
    #[must_use]
    pub const fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Get the configuration mapping.
    #[must_use]
    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Get mutable access to the configuration mapping.
    ///
    /// Keys and values are caller-defined and not validated.
    pub fn config_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.config
    }

    /// Insert one configuration entry, replacing any previous value.
    pub fn set_config(&mut self, key: impl Into<String>, value: Value) {
        self.config.insert(key.into(), value);
    }

    /// Artifact save/load operations rooted at this session.
    #[must_use]
    pub const fn store(&self) -> ArtifactStore<'_> {
        ArtifactStore::new(self)
    }

    /// Line logger appending to `text/log.txt` and mirroring to stdout.
    #[must_use]
    pub const fn logger(&self) -> Logger<'_> {
        Logger::new(self)
    }

    /// Structural summary of what this session has produced so far.
    #[must_use]
    pub const fn reporter(&self) -> Reporter<'_> {
        Reporter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2023, 7, 18, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_bucket_path_format() {
        let bucket = bucket_path(Path::new("out"), &fixed_now());
        assert_eq!(bucket, PathBuf::from("out/2023/7/18/14-5"));
    }

    #[test]
    fn test_bucket_path_no_zero_padding() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap();
        let bucket = bucket_path(Path::new("out"), &now);
        assert_eq!(bucket, PathBuf::from("out/2024/1/2/3-4"));
    }

    #[test]
    fn test_create_makes_fixed_subdirs() {
        let root = tempfile::tempdir().unwrap();
        let session = Session::create_in(root.path(), fixed_now()).unwrap();

        assert!(session.path().is_dir());
        for sub in FIXED_SUBDIRS {
            assert!(session.path().join(sub).is_dir(), "missing {sub}");
        }
        assert_eq!(session.mode(), SessionMode::Write);
    }

    #[test]
    fn test_sequence_numbers_strictly_increase() {
        let root = tempfile::tempdir().unwrap();
        let now = fixed_now();

        let paths: Vec<PathBuf> = (0..3)
            .map(|_| Session::create_in(root.path(), now).unwrap().path().to_path_buf())
            .collect();

        let bucket = bucket_path(root.path(), &now);
        assert_eq!(paths[0], bucket.join("1"));
        assert_eq!(paths[1], bucket.join("2"));
        assert_eq!(paths[2], bucket.join("3"));
    }

    #[test]
    fn test_allocate_skips_taken_slots() {
        let root = tempfile::tempdir().unwrap();
        let now = fixed_now();
        let bucket = bucket_path(root.path(), &now);
        fs::create_dir_all(bucket.join("1")).unwrap();
        fs::create_dir_all(bucket.join("2")).unwrap();

        let session = Session::create_in(root.path(), now).unwrap();
        assert_eq!(session.path(), bucket.join("3"));
    }

    #[test]
    fn test_open_does_not_create() {
        let session = Session::open("out/2023/7/18/14-5/1");
        assert_eq!(session.mode(), SessionMode::Analyse);
        assert!(!session.path().exists());
    }

    #[test]
    fn test_config_round_trip() {
        let mut session = Session::open("somewhere");
        session.set_config("batch_size", serde_json::json!(32));
        assert_eq!(session.config()["batch_size"], serde_json::json!(32));

        session.config_mut().remove("batch_size");
        assert!(session.config().is_empty());
    }
}
