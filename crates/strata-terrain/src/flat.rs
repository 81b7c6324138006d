//! Flat terrain: solid below a fixed world height.

use strata_voxel::{CHUNK_SIZE, Chunk, ChunkCoord, MaterialId, MaterialRecord, StoreError};

use crate::ChunkGenerator;

/// A horizontal plane of solid material at `height` (world Y).
///
/// Density is `clamp(height - y, 0, 1)`, so integer heights give a sharp
/// step and fractional heights a partially filled top layer.
#[derive(Clone, Debug)]
pub struct FlatTerrain {
    height: f32,
    material: MaterialRecord,
}

impl FlatTerrain {
    /// Solid `material` everywhere below `height`.
    pub fn new(height: f32, material: MaterialId) -> Self {
        Self {
            height,
            material: MaterialRecord::plain(material),
        }
    }

    /// The surface height in world units.
    pub fn height(&self) -> f32 {
        self.height
    }
}

impl ChunkGenerator for FlatTerrain {
    fn fill(&self, chunk: &mut Chunk, coord: ChunkCoord) -> Result<(), StoreError> {
        let oy = coord.world_origin()[1];
        let data = chunk.data_mut();
        for y in 0..CHUNK_SIZE {
            let density = (self.height - (oy + y as f32)).clamp(0.0, 1.0);
            if density <= 0.0 {
                continue;
            }
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    data.set_voxel(x, y, z, density, &self.material)?;
                }
            }
        }
        chunk.flush_changes()
    }
}
