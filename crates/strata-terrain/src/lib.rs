//! Density-field generators that fill chunks with terrain.

pub mod flat;
pub mod noise_terrain;

pub use flat::FlatTerrain;
pub use noise_terrain::NoiseTerrain;

use strata_voxel::{Chunk, ChunkCoord, StoreError};

/// Fills a freshly created chunk with densities and materials.
///
/// Implementations must be pure functions of world position and must leave
/// the chunk flushed (via [`Chunk::flush_changes`]) so its palette and
/// visibility are current.
pub trait ChunkGenerator {
    /// Writes every voxel of `chunk`, which sits at `coord` on the chunk grid.
    fn fill(&self, chunk: &mut Chunk, coord: ChunkCoord) -> Result<(), StoreError>;
}

impl<G: ChunkGenerator + ?Sized> ChunkGenerator for &G {
    fn fill(&self, chunk: &mut Chunk, coord: ChunkCoord) -> Result<(), StoreError> {
        (**self).fill(chunk, coord)
    }
}
