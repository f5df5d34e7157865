//! Format-agnostic persistence through caller-supplied codecs
//!
//! `save_data`/`load_data` extend the store with open-ended categories: each
//! [`FormatCodec`] names a format tag and supplies the encode/decode pair,
//! and the store maps the tag to `<session_root>/<format>/<name>.<format>`.
//! Both directions share one path mapping, so a codec pair that are true
//! inverses always round-trips.

use std::fs;
use std::path::{Path, PathBuf};

use super::{read_artifact, validate_name, write_atomic, ArtifactStore};
use crate::session::FIXED_SUBDIRS;
use crate::{Error, Result};

/// Encode/decode capability for one caller-defined format.
///
/// The tag returned by `format` names both the category subdirectory under
/// the session root and the file extension, e.g. a `"csv"` codec persists
/// `csv/<name>.csv`. Tabular or otherwise - the store never interprets the
/// encoded bytes.
pub trait FormatCodec {
    /// Value type this codec persists.
    type Value;

    /// Format tag, e.g. `"csv"`.
    fn format(&self) -> &str;

    /// Encode a value into the bytes stored on disk.
    ///
    /// # Errors
    /// Returns error if the value cannot be encoded.
    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>>;

    /// Decode stored bytes back into a value.
    ///
    /// # Errors
    /// Returns error if the bytes do not parse as this format.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Value>;
}

/// The one format-to-path mapping shared by save and load:
/// `<session_root>/<format>/<name>.<format>`.
fn data_path(root: &Path, format: &str, name: &str) -> PathBuf {
    root.join(format).join(format!("{name}.{format}"))
}

/// Format tags become directory names, so they get the same hygiene rules as
/// artifact names, plus the four fixed subdirectories are reserved.
fn validate_format(format: &str) -> Result<()> {
    if format.is_empty()
        || format == "."
        || format == ".."
        || format.contains('/')
        || format.contains('\\')
        || FIXED_SUBDIRS.contains(&format)
    {
        return Err(Error::InvalidFormat(format.to_owned()));
    }
    Ok(())
}

impl ArtifactStore<'_> {
    /// Encode a value with the codec and persist it under the codec's format
    /// category, creating the category directory on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] / [`Error::InvalidFormat`] for
    /// malformed identifiers, the codec's error if encoding fails, or
    /// [`Error::Filesystem`] on directory creation or write failure.
    pub fn save_data<C: FormatCodec>(
        &self,
        value: &C::Value,
        name: &str,
        codec: &C,
    ) -> Result<PathBuf> {
        validate_name(name)?;
        validate_format(codec.format())?;

        // Only the category directory is created here; the session root must
        // already exist. `AlreadyExists` is the steady state after first use.
        let dir = self.session.path().join(codec.format());
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(Error::fs(&dir, e)),
        }

        let path = data_path(self.session.path(), codec.format(), name);
        let bytes = codec.encode(value)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(path = %path.display(), format = codec.format(), "saved data");
        Ok(path)
    }

    /// Load a value previously persisted by [`ArtifactStore::save_data`]
    /// with a codec of the same format tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the artifact is absent, or the codec's
    /// error if decoding fails.
    pub fn load_data<C: FormatCodec>(&self, name: &str, codec: &C) -> Result<C::Value> {
        validate_name(name)?;
        validate_format(codec.format())?;

        let path = data_path(self.session.path(), codec.format(), name);
        let bytes = read_artifact(&path)?;
        codec.decode(&bytes)
    }
}
