//! Snapshot files for the flat index.
//!
//! Two files make up a snapshot:
//! - vectors: `PVEC` magic, version (u32), dimension (u32), count (u64),
//!   then `count * dimension` f32 values, all little-endian
//! - ids: JSON array of strings, positionally matching the vectors
//!
//! Both are written to temp files in the target directory, synced, and then
//! renamed over their targets, so a crash mid-write leaves the previous
//! snapshot intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::IndexError;

const MAGIC_BYTES: &[u8; 4] = b"PVEC";
const FORMAT_VERSION: u32 = 1;
const HEADER_SIZE: usize = 20;
const BYTES_PER_F32: usize = 4;

/// Locations of the two snapshot files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub vectors: PathBuf,
    pub ids: PathBuf,
}

impl SnapshotPaths {
    pub fn new(vectors: impl Into<PathBuf>, ids: impl Into<PathBuf>) -> Self {
        Self {
            vectors: vectors.into(),
            ids: ids.into(),
        }
    }

    /// Both files exist on disk.
    pub fn exist(&self) -> bool {
        self.vectors.exists() && self.ids.exists()
    }
}

/// In-memory content of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub dimension: usize,
    pub vectors: Vec<f32>,
    pub ids: Vec<String>,
}

fn encode_vectors(dimension: usize, vectors: &[f32]) -> Result<Vec<u8>, IndexError> {
    let dim = u32::try_from(dimension)
        .map_err(|_| IndexError::Serialization(format!("dimension {dimension} too large")))?;
    let count = if dimension == 0 {
        0
    } else {
        vectors.len() / dimension
    };

    let mut buf = Vec::with_capacity(HEADER_SIZE + vectors.len() * BYTES_PER_F32);
    buf.extend_from_slice(MAGIC_BYTES);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&dim.to_le_bytes());
    buf.extend_from_slice(&(count as u64).to_le_bytes());
    for value in vectors {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    Ok(buf)
}

fn decode_vectors(bytes: &[u8]) -> Result<(usize, Vec<f32>), IndexError> {
    if bytes.len() < HEADER_SIZE {
        return Err(IndexError::Serialization(format!(
            "vector file truncated: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != MAGIC_BYTES {
        return Err(IndexError::Serialization("bad magic bytes".to_string()));
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[4..8]);
    let version = u32::from_le_bytes(word);
    if version != FORMAT_VERSION {
        return Err(IndexError::Serialization(format!(
            "unsupported format version {version}"
        )));
    }
    word.copy_from_slice(&bytes[8..12]);
    let dimension = u32::from_le_bytes(word) as usize;
    let mut long = [0u8; 8];
    long.copy_from_slice(&bytes[12..20]);
    let count = u64::from_le_bytes(long) as usize;

    let body = &bytes[HEADER_SIZE..];
    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(BYTES_PER_F32))
        .ok_or_else(|| IndexError::Serialization("header overflow".to_string()))?;
    if body.len() != expected {
        return Err(IndexError::Serialization(format!(
            "vector body is {} bytes, header promises {}",
            body.len(),
            expected
        )));
    }

    let vectors = body
        .chunks_exact(BYTES_PER_F32)
        .map(|chunk| {
            let mut w = [0u8; 4];
            w.copy_from_slice(chunk);
            f32::from_le_bytes(w)
        })
        .collect();
    Ok((dimension, vectors))
}

fn temp_in_dir_of(target: &Path) -> Result<NamedTempFile, IndexError> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let tmp = tempfile::Builder::new()
        .prefix(".snapshot-")
        .suffix(".tmp")
        .tempfile_in(&dir)?;
    Ok(tmp)
}

fn staged(target: &Path, bytes: &[u8]) -> Result<NamedTempFile, IndexError> {
    let mut tmp = temp_in_dir_of(target)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Write both snapshot files atomically (each via temp file + rename).
pub fn write_snapshot(
    paths: &SnapshotPaths,
    dimension: usize,
    vectors: &[f32],
    ids: &[String],
) -> Result<(), IndexError> {
    let vector_bytes = encode_vectors(dimension, vectors)?;
    let id_bytes = serde_json::to_vec(ids)?;

    let vectors_tmp = staged(&paths.vectors, &vector_bytes)?;
    let ids_tmp = staged(&paths.ids, &id_bytes)?;

    vectors_tmp
        .persist(&paths.vectors)
        .map_err(|e| IndexError::Io(e.error))?;
    ids_tmp.persist(&paths.ids).map_err(|e| IndexError::Io(e.error))?;

    debug!(
        vectors = ids.len(),
        path = ?paths.vectors,
        "Wrote snapshot"
    );
    Ok(())
}

/// Read a snapshot. Returns `Ok(None)` when either file is missing and an
/// error when the files are unreadable or disagree with each other.
pub fn read_snapshot(
    paths: &SnapshotPaths,
    expected_dimension: usize,
) -> Result<Option<Snapshot>, IndexError> {
    if !paths.exist() {
        return Ok(None);
    }

    let (dimension, vectors) = decode_vectors(&fs::read(&paths.vectors)?)?;
    let ids: Vec<String> = serde_json::from_slice(&fs::read(&paths.ids)?)?;

    if dimension != expected_dimension {
        return Err(IndexError::DimensionMismatch {
            expected: expected_dimension,
            actual: dimension,
        });
    }
    let count = if dimension == 0 {
        0
    } else {
        vectors.len() / dimension
    };
    if count != ids.len() {
        return Err(IndexError::Serialization(format!(
            "snapshot holds {} vectors but {} ids",
            count,
            ids.len()
        )));
    }

    Ok(Some(Snapshot {
        dimension,
        vectors,
        ids,
    }))
}
