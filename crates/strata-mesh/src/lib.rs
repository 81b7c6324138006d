//! Marching Cubes surface extraction for voxel chunks.

pub mod extractor;
pub mod neighbors;
pub mod tables;
pub mod triangles;

pub use extractor::{ExtractError, SurfaceExtractor, polygonise};
pub use neighbors::{CornerSampler, ForwardNeighbors};
pub use triangles::{ColliderBuffers, Triangle, TriangleList};
