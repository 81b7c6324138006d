//! Simplex-noise height field terrain.

use noise::{NoiseFn, Simplex};
use strata_config::TerrainConfig;
use strata_voxel::{CHUNK_SIZE, Chunk, ChunkCoord, MaterialCatalog, MaterialRecord, StoreError};

use crate::ChunkGenerator;

/// Rolling terrain from 3D simplex noise.
///
/// At every world position the noise gives a surface height
/// `noise(p / horizontal_scale) * height_amplitude`. Voxels below it are grass
/// with a density that ramps from 0 at the surface to 1 at
/// `surface_thickness` voxels down.
pub struct NoiseTerrain {
    noise: Simplex,
    params: TerrainConfig,
    material: MaterialRecord,
}

impl NoiseTerrain {
    /// Create a generator from terrain settings.
    pub fn new(params: TerrainConfig) -> Self {
        Self {
            noise: Simplex::new(params.seed),
            params,
            material: MaterialRecord::plain(MaterialCatalog::GRASS),
        }
    }

    /// Surface height sampled at world position `(x, y, z)`.
    pub fn surface_height(&self, x: f64, y: f64, z: f64) -> f64 {
        let s = self.params.horizontal_scale;
        self.noise.get([x / s, y / s, z / s]) * self.params.height_amplitude
    }

    /// Density at a world position, or `None` above the surface.
    pub fn density(&self, x: f64, y: f64, z: f64) -> Option<f32> {
        let height = self.surface_height(x, y, z);
        if y >= height {
            return None;
        }
        let ramp = (height - y) as f32 / self.params.surface_thickness;
        Some(ramp.clamp(0.0, 1.0))
    }

    /// Return the current parameters.
    pub fn params(&self) -> &TerrainConfig {
        &self.params
    }
}

impl Default for NoiseTerrain {
    fn default() -> Self {
        Self::new(TerrainConfig::default())
    }
}

impl ChunkGenerator for NoiseTerrain {
    fn fill(&self, chunk: &mut Chunk, coord: ChunkCoord) -> Result<(), StoreError> {
        let [ox, oy, oz] = coord.world_origin().map(f64::from);
        let data = chunk.data_mut();
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 0..CHUNK_SIZE {
                    let world = (ox + x as f64, oy + y as f64, oz + z as f64);
                    if let Some(density) = self.density(world.0, world.1, world.2) {
                        data.set_voxel(x, y, z, density, &self.material)?;
                    }
                }
            }
        }
        chunk.flush_changes()?;
        tracing::trace!(%coord, "generated noise terrain");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::{Face, VisibilityMask};

    fn generate(terrain: &NoiseTerrain, coord: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::new();
        terrain.fill(&mut chunk, coord).expect("fill");
        chunk
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let params = TerrainConfig {
            seed: 7,
            ..Default::default()
        };
        let a = generate(&NoiseTerrain::new(params.clone()), ChunkCoord::new(1, 0, -2));
        let b = generate(&NoiseTerrain::new(params), ChunkCoord::new(1, 0, -2));
        assert_eq!(a.data().dense(), b.data().dense());
    }

    #[test]
    fn test_high_chunk_is_empty_air() {
        // The surface never rises above the amplitude (25 voxels).
        let chunk = generate(&NoiseTerrain::default(), ChunkCoord::new(0, 4, 0));
        assert_eq!(chunk.data().is_empty(), Ok(true));
        assert_eq!(chunk.visibility().pair_count(), 30);
    }

    #[test]
    fn test_deep_chunk_is_filled() {
        let chunk = generate(&NoiseTerrain::default(), ChunkCoord::new(3, -4, 1));
        assert_eq!(chunk.data().is_filled(), Ok(true));
        assert_eq!(*chunk.visibility(), VisibilityMask::NONE);
        assert_eq!(chunk.data().palette_len(), 1);
    }

    /// Flat terrain at y = 0: zero amplitude removes the noise.
    fn level() -> NoiseTerrain {
        NoiseTerrain::new(TerrainConfig {
            height_amplitude: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_surface_chunk_ramps_density() {
        let chunk = generate(&level(), ChunkCoord::new(0, -1, 0));
        let data = chunk.data();
        // Every voxel is below the surface, so air was purged from the palette.
        assert_eq!(data.palette_len(), 1);
        assert!(!data.is_filled().expect("unfrozen"));
        // World y = -1, -2, -3 map to local y = 31, 30, 29.
        let top = data.density_at(0, 31, 0).expect("unfrozen");
        assert!((top - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(data.density_at(0, 29, 0), Ok(1.0));
        // Only the top layer is non-solid.
        assert!(chunk.connects(Face::PosX, Face::PosY));
        assert!(!chunk.connects(Face::NegY, Face::PosY));
    }

    #[test]
    fn test_density_above_and_below_surface() {
        let terrain = level();
        assert_eq!(terrain.density(10.0, 1.0, 10.0), None);
        assert_eq!(terrain.density(10.0, -1.5, 10.0), Some(0.5));
        assert_eq!(terrain.density(10.0, -200.0, 10.0), Some(1.0));
    }
}
