//! Voxel chunk storage: palette-compressed density/material fields, the
//! run-length frozen form used for evicted chunks, and per-chunk visibility.

pub mod chunk;
pub mod chunk_data;
pub mod coord;
pub mod error;
pub mod face;
pub mod material;
pub mod rle;

pub use chunk::{Chunk, FloodFillScratch, VisibilityMask};
pub use chunk_data::{CHUNK_AREA, CHUNK_SIZE, CHUNK_VOLUME, ChunkData, ISOLEVEL, PaletteIndex};
pub use coord::{ChunkCoord, ChunkKeyError, FORWARD_OFFSETS, KEY_DELIMITER};
pub use error::StoreError;
pub use face::{Face, FaceSet};
pub use material::{
    CatalogError, MaterialCatalog, MaterialDef, MaterialId, MaterialRecord, PropertyValue,
};
pub use rle::{FrozenRuns, RleError, RunValue};
