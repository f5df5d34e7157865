//! Array save/load - single JSON payloads and compressed multi-member archives
//!
//! Uncompressed arrays are one JSON number-array per file under `array/`.
//! Compressed artifacts are a name-to-array mapping serialized as JSON and
//! compressed as a whole under `compressed-array/`; an archive with exactly
//! one member loads back as the bare array, anything else loads as the
//! mapping.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{read_artifact, validate_name, write_atomic, ArtifactStore, Category};
use crate::{Error, Result};

/// Compression algorithm for archive payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveCompression {
    /// LZ4 - Fast compression, good for frequent checkpoints (default)
    #[default]
    Lz4,
    /// ZSTD - Better ratio, slower
    Zstd,
}

impl ArchiveCompression {
    /// File extension recording both the payload and compression layers
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Lz4 => "json.lz4",
            Self::Zstd => "json.zst",
        }
    }

    /// Compress an archive payload using this algorithm
    ///
    /// # Errors
    /// Returns error if compression fails (e.g., ZSTD internal error)
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
            Self::Zstd => zstd::encode_all(data, 3)
                .map_err(|e| Error::Codec(format!("ZSTD compression failed: {e}"))),
        }
    }

    /// Decompress an archive payload using this algorithm
    ///
    /// # Errors
    /// Returns error if decompression fails (e.g., corrupted data)
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| Error::Codec(format!("LZ4 decompression failed: {e}"))),
            Self::Zstd => zstd::decode_all(data)
                .map_err(|e| Error::Codec(format!("ZSTD decompression failed: {e}"))),
        }
    }
}

/// Contents of a loaded array artifact.
///
/// Uncompressed loads are always [`ArrayData::Single`]. Compressed loads
/// collapse a one-member archive to [`ArrayData::Single`] and return
/// [`ArrayData::Members`] otherwise; callers branch on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// The lone stored array
    Single(Vec<f64>),
    /// Member name to array mapping from a multi-member archive
    Members(BTreeMap<String, Vec<f64>>),
}

impl ArrayData {
    /// Unwrap a single array, `None` for a multi-member mapping.
    #[must_use]
    pub fn into_single(self) -> Option<Vec<f64>> {
        match self {
            Self::Single(array) => Some(array),
            Self::Members(_) => None,
        }
    }

    /// Borrow the member mapping, `None` for a single array.
    #[must_use]
    pub const fn members(&self) -> Option<&BTreeMap<String, Vec<f64>>> {
        match self {
            Self::Members(members) => Some(members),
            Self::Single(_) => None,
        }
    }
}

impl ArtifactStore<'_> {
    /// Save a numeric array under the session.
    ///
    /// `compressed == false` writes `array/<name>.json`; `compressed == true`
    /// writes a one-member archive to `compressed-array/` with the artifact
    /// name as the member key. An existing artifact of the same name is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for malformed names and
    /// [`Error::Filesystem`] on write failure.
    pub fn save_array(&self, array: &[f64], name: &str, compressed: bool) -> Result<PathBuf> {
        if compressed {
            let mut members = BTreeMap::new();
            members.insert(name.to_owned(), array.to_vec());
            return self.save_array_members(&members, name);
        }

        validate_name(name)?;
        let path = self
            .category_dir(Category::Array)
            .join(format!("{name}.json"));
        let payload =
            serde_json::to_vec(array).map_err(|e| Error::Codec(format!("array encode: {e}")))?;
        write_atomic(&path, &payload)?;
        tracing::debug!(path = %path.display(), len = array.len(), "saved array");
        Ok(path)
    }

    /// Save several named arrays as one compressed archive with the default
    /// compression.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ArtifactStore::save_array`].
    pub fn save_array_members(
        &self,
        members: &BTreeMap<String, Vec<f64>>,
        name: &str,
    ) -> Result<PathBuf> {
        self.save_array_members_with(members, name, ArchiveCompression::default())
    }

    /// Save several named arrays as one compressed archive with an explicit
    /// compression algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`], [`Error::Codec`] on payload encode or
    /// compression failure, or [`Error::Filesystem`] on write failure.
    pub fn save_array_members_with(
        &self,
        members: &BTreeMap<String, Vec<f64>>,
        name: &str,
        compression: ArchiveCompression,
    ) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self
            .category_dir(Category::CompressedArray)
            .join(format!("{name}.{}", compression.extension()));
        let payload =
            serde_json::to_vec(members).map_err(|e| Error::Codec(format!("archive encode: {e}")))?;
        let bytes = compression.compress(&payload)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(
            path = %path.display(),
            members = members.len(),
            "saved compressed archive"
        );
        Ok(path)
    }

    /// Load an array artifact saved by [`ArtifactStore::save_array`] or
    /// [`ArtifactStore::save_array_members`].
    ///
    /// Compressed loads probe both compression extensions (LZ4 first), so
    /// either save-side choice round-trips.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the artifact is absent and
    /// [`Error::Codec`] if the stored payload cannot be decoded.
    pub fn load_array(&self, name: &str, compressed: bool) -> Result<ArrayData> {
        validate_name(name)?;

        if !compressed {
            let path = self
                .category_dir(Category::Array)
                .join(format!("{name}.json"));
            let bytes = read_artifact(&path)?;
            let array: Vec<f64> = serde_json::from_slice(&bytes)
                .map_err(|e| Error::Codec(format!("array decode at {}: {e}", path.display())))?;
            return Ok(ArrayData::Single(array));
        }

        let dir = self.category_dir(Category::CompressedArray);
        for compression in [ArchiveCompression::Lz4, ArchiveCompression::Zstd] {
            let path = dir.join(format!("{name}.{}", compression.extension()));
            match read_artifact(&path) {
                Ok(bytes) => {
                    let payload = compression.decompress(&bytes)?;
                    let mut members: BTreeMap<String, Vec<f64>> =
                        serde_json::from_slice(&payload).map_err(|e| {
                            Error::Codec(format!("archive decode at {}: {e}", path.display()))
                        })?;
                    if members.len() == 1 {
                        let key = members.keys().next().cloned().unwrap_or_default();
                        if let Some(array) = members.remove(&key) {
                            return Ok(ArrayData::Single(array));
                        }
                    }
                    return Ok(ArrayData::Members(members));
                }
                Err(Error::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        Err(Error::NotFound {
            path: dir.join(format!("{name}.{}", ArchiveCompression::default().extension())),
        })
    }
}
