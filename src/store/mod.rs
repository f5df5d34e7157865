//! Artifact store - category-specific save/load rooted at a session path
//!
//! [`ArtifactStore`] is a stateless borrow of a [`Session`]: every operation
//! resolves paths under the session root at call time and performs blocking
//! filesystem IO. Writers stage into a temp file in the destination directory
//! and rename into place, so a save either fully materializes under its final
//! name or leaves nothing behind.
//!
//! Category layout under the session root:
//!
//! ```text
//! text/              -> log.txt
//! array/             -> <name>.json
//! compressed-array/  -> <name>.json.lz4
//! image/             -> <name>.png or plot_<k>.png
//! <format>/          -> <name>.<format> (save_data categories)
//! ```

mod array;
mod custom;
mod plot;

pub use array::{ArchiveCompression, ArrayData};
pub use custom::FormatCodec;
pub use plot::{LineStyle, Marker, Plot, Plot3d, PlotRenderer, PlotStyle, Series2d, Series3d};

use std::fs;
use std::path::{Path, PathBuf};

use crate::session::Session;
use crate::{Error, Result};

/// Fixed artifact categories and the subdirectories they persist under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Plot images (`image/`)
    Plot,
    /// Single-array files (`array/`)
    Array,
    /// Multi-member compressed archives (`compressed-array/`)
    CompressedArray,
    /// Line-oriented log text (`text/`)
    Log,
}

impl Category {
    /// Subdirectory name under the session root.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Plot => "image",
            Self::Array => "array",
            Self::CompressedArray => "compressed-array",
            Self::Log => "text",
        }
    }
}

/// Category-specific save/load operations against one session's directory
/// tree.
///
/// Obtained from [`Session::store`]. Holds no state of its own; safe to
/// re-create per call.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactStore<'s> {
    session: &'s Session,
}

impl<'s> ArtifactStore<'s> {
    pub(crate) const fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Resolve the directory for a fixed category under the session root.
    #[must_use]
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.session.path().join(category.dir())
    }
}

/// Reject names that would escape the category directory or vanish entirely.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Count directory entries. Auto-indexed artifacts take
/// `entry_count(dir) + 1` at call time; numbering is only monotonic if no
/// entries are removed externally between calls.
pub(crate) fn entry_count(dir: &Path) -> Result<usize> {
    let entries = fs::read_dir(dir).map_err(|e| Error::fs(dir, e))?;
    Ok(entries.filter_map(|entry| entry.ok()).count())
}

/// Write bytes atomically: stage into `<name>.tmp` alongside the target,
/// then rename over it. The temp file is removed on failure so a botched
/// save leaves no partial artifact visible.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::fs(tmp, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::fs(path, e));
    }
    Ok(())
}

/// Read a whole artifact, mapping an absent file to [`Error::NotFound`].
fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::fs(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dirs() {
        assert_eq!(Category::Plot.dir(), "image");
        assert_eq!(Category::Array.dir(), "array");
        assert_eq!(Category::CompressedArray.dir(), "compressed-array");
        assert_eq!(Category::Log.dir(), "text");
    }

    #[test]
    fn test_validate_name_rejects_separators() {
        assert!(validate_name("ok_name-1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
    }

    #[test]
    fn test_write_atomic_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x.json");
        write_atomic(&target, b"[1,2]").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"[1,2]");
        assert_eq!(entry_count(dir.path()).unwrap(), 1);
    }

    #[test]
    fn test_read_artifact_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_entry_count_missing_dir_is_filesystem_error() {
        let err = entry_count(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }
}
