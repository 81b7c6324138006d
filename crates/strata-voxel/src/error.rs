//! Chunk store error types.

use crate::rle::RleError;

/// Errors raised by [`crate::ChunkData`] and [`crate::Chunk`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// A local voxel coordinate lies outside `[0, CHUNK_SIZE)`.
    #[error("voxel ({x}, {y}, {z}) is outside the chunk")]
    IndexOutOfRange {
        /// Local X.
        x: usize,
        /// Local Y.
        y: usize,
        /// Local Z.
        z: usize,
    },
    /// The store is frozen; unfreeze it before reading or writing voxels.
    #[error("chunk is frozen")]
    Frozen,
    /// `unfreeze` was called on a store that is not frozen.
    #[error("chunk is not frozen")]
    NotFrozen,
    /// `freeze` was called on a store that is already frozen.
    #[error("chunk is already frozen")]
    AlreadyFrozen,
    /// More distinct materials were written than a palette index can address.
    #[error("palette is full ({distinct} distinct materials)")]
    PaletteFull {
        /// Number of distinct materials already referenced.
        distinct: usize,
    },
    /// The frozen encoding could not be decoded.
    #[error("frozen chunk data is corrupt: {0}")]
    Rle(#[from] RleError),
}

impl StoreError {
    /// Returns `true` for errors caused by calling an operation in the wrong
    /// frozen/unfrozen state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::Frozen | Self::NotFrozen | Self::AlreadyFrozen)
    }
}
