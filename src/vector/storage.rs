//! Memory-mapped vector segment storage.
//!
//! Persists one entity partition's vectors to a single segment file and
//! reads them back through a memory map. The byte layout is the crate's
//! stable serialization contract: one little-endian IEEE-754 f32 per
//! dimension, in index order, so a 768-dimensional vector always occupies
//! exactly 3072 bytes and round-trips bit-exactly (including `-0.0`).
//!
//! # Storage Format
//!
//! - Header (16 bytes): magic, version, dimension, vector count
//! - Entries: record ID (u32 LE) followed by the vector bytes

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use crate::types::RecordId;
use crate::vector::types::{VectorDimension, VectorError};

/// Current storage format version.
const STORAGE_VERSION: u32 = 1;

/// Size of the storage header in bytes.
const HEADER_SIZE: usize = 16;

/// Magic bytes to identify vector segment files.
const MAGIC_BYTES: &[u8; 4] = b"JVEC";

/// Number of bytes per f32 value.
const BYTES_PER_F32: usize = 4;

/// Number of bytes per record ID (u32).
const BYTES_PER_ID: usize = 4;

/// Serializes a vector to its on-disk form: one little-endian f32 per
/// component, in index order.
///
/// The output length is always `4 * vector.len()` bytes. Callers validate
/// dimension and NaN-freedom before serializing.
#[must_use]
pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * BYTES_PER_F32);
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Deserializes a vector from its on-disk form.
///
/// Returns an error unless `bytes` is exactly `4 * dimension` long.
pub fn vector_from_bytes(
    bytes: &[u8],
    dimension: VectorDimension,
) -> Result<Vec<f32>, VectorError> {
    let expected = dimension.get() * BYTES_PER_F32;
    if bytes.len() != expected {
        return Err(VectorError::InvalidFormat(format!(
            "Vector payload is {} bytes, expected {expected}",
            bytes.len()
        )));
    }

    let mut vector = Vec::with_capacity(dimension.get());
    for chunk in bytes.chunks_exact(BYTES_PER_F32) {
        vector.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(vector)
}

/// Memory-mapped vector storage for a single partition segment.
///
/// Writes replace the whole segment; reads go through a lazily created
/// memory map.
#[derive(Debug)]
pub struct MmapVectorStorage {
    /// Path to the segment file.
    path: PathBuf,

    /// Memory-mapped file for reading.
    mmap: Option<Mmap>,

    /// Vector dimension (all vectors in a segment share it).
    dimension: VectorDimension,

    /// Number of vectors currently stored.
    vector_count: usize,
}

impl MmapVectorStorage {
    /// Creates storage for a new segment file at `path`.
    ///
    /// Nothing is written until [`write_all`](Self::write_all) is called.
    pub fn create(path: impl Into<PathBuf>, dimension: VectorDimension) -> Self {
        Self {
            path: path.into(),
            mmap: None,
            dimension,
            vector_count: 0,
        }
    }

    /// Opens an existing segment file from disk.
    ///
    /// Returns an error if the file doesn't exist or has an invalid format.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VectorError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(VectorError::Storage(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Vector segment file not found: {}", path.display()),
            )));
        }

        let file = File::open(&path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let (version, dimension, vector_count) = Self::read_header(&mmap)?;

        if version != STORAGE_VERSION {
            return Err(VectorError::VersionMismatch {
                expected: STORAGE_VERSION,
                actual: version,
            });
        }

        Ok(Self {
            path,
            mmap: Some(mmap),
            dimension,
            vector_count,
        })
    }

    /// Writes the full set of vectors for this segment, replacing any
    /// previous file contents.
    pub fn write_all(&mut self, vectors: &[(RecordId, &[f32])]) -> Result<(), VectorError> {
        for (_, vector) in vectors {
            self.dimension.validate_vector(vector)?;
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = BufWriter::new(File::create(&self.path)?);

        // Header
        file.write_all(MAGIC_BYTES)?;
        file.write_all(&STORAGE_VERSION.to_le_bytes())?;
        file.write_all(&(self.dimension.get() as u32).to_le_bytes())?;
        file.write_all(&(vectors.len() as u32).to_le_bytes())?;

        // Entries
        for (id, vector) in vectors {
            file.write_all(&id.to_bytes())?;
            file.write_all(&vector_to_bytes(vector))?;
        }

        file.flush()?;

        self.vector_count = vectors.len();
        self.mmap = None;
        Ok(())
    }

    /// Reads all vectors from the segment in file order.
    pub fn read_all(&mut self) -> Result<Vec<(RecordId, Vec<f32>)>, VectorError> {
        self.ensure_mapped()?;
        let mmap = self
            .mmap
            .as_ref()
            .ok_or_else(|| VectorError::InvalidFormat("Segment not mapped".to_string()))?;

        let dimension = self.dimension.get();
        let entry_size = BYTES_PER_ID + dimension * BYTES_PER_F32;
        let mut vectors = Vec::with_capacity(self.vector_count);

        let mut offset = HEADER_SIZE;
        while offset + entry_size <= mmap.len() {
            let id_bytes = [
                mmap[offset],
                mmap[offset + 1],
                mmap[offset + 2],
                mmap[offset + 3],
            ];
            let id = RecordId::from_bytes(id_bytes).ok_or_else(|| {
                VectorError::InvalidFormat("Invalid record ID in segment".to_string())
            })?;

            let data_start = offset + BYTES_PER_ID;
            let vector =
                vector_from_bytes(&mmap[data_start..data_start + dimension * BYTES_PER_F32],
                    self.dimension)?;

            vectors.push((id, vector));
            offset += entry_size;
        }

        if vectors.len() != self.vector_count {
            return Err(VectorError::InvalidFormat(format!(
                "Segment header claims {} vectors but file contains {}",
                self.vector_count,
                vectors.len()
            )));
        }

        Ok(vectors)
    }

    /// Returns the number of vectors stored.
    #[must_use]
    pub fn vector_count(&self) -> usize {
        self.vector_count
    }

    /// Returns the vector dimension.
    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Checks if the segment file exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    // Private helper methods

    fn read_header(mmap: &Mmap) -> Result<(u32, VectorDimension, usize), VectorError> {
        if mmap.len() < HEADER_SIZE {
            return Err(VectorError::InvalidFormat(
                "File too small to contain header".to_string(),
            ));
        }

        if &mmap[0..4] != MAGIC_BYTES {
            return Err(VectorError::InvalidFormat(
                "Invalid magic bytes".to_string(),
            ));
        }

        let version = u32::from_le_bytes([mmap[4], mmap[5], mmap[6], mmap[7]]);

        let dim_value = u32::from_le_bytes([mmap[8], mmap[9], mmap[10], mmap[11]]);
        let dimension = VectorDimension::new(dim_value as usize)?;

        let vector_count = u32::from_le_bytes([mmap[12], mmap[13], mmap[14], mmap[15]]) as usize;

        Ok((version, dimension, vector_count))
    }

    fn ensure_mapped(&mut self) -> Result<(), VectorError> {
        if self.mmap.is_none() {
            let file = File::open(&self.path)?;
            let mmap = unsafe { MmapOptions::new().map(&file)? };

            let (_, _, count) = Self::read_header(&mmap)?;
            self.vector_count = count;
            self.mmap = Some(mmap);
        }
        Ok(())
    }
}
