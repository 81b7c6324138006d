use strata_mesh::ExtractError;
use strata_voxel::{ChunkCoord, StoreError};
use thiserror::Error;

/// Failures that abort a streamer tick.
#[derive(Debug, Error, PartialEq)]
pub enum StreamError {
    /// A chunk judged ready had itself or a forward neighbor missing from the store.
    #[error("chunk {0} is not resident")]
    MissingNeighbor(ChunkCoord),
    /// A chunk store operation failed.
    #[error("chunk store error: {0}")]
    Store(#[from] StoreError),
    /// Surface extraction failed for a reason other than a palette miss.
    #[error("surface extraction failed: {0}")]
    Extract(ExtractError),
}

impl From<ExtractError> for StreamError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Store(store) => Self::Store(store),
            other => Self::Extract(other),
        }
    }
}
