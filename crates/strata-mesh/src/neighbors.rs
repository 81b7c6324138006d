//! Forward-neighbor access for sampling cube corners past a chunk's +X/+Y/+Z
//! boundary.
//!
//! Each chunk stores exactly 32³ voxels, with no duplicated boundary layer.
//! The Marching Cubes cells along the positive faces need corners at local
//! coordinate 32, and those are read from local coordinate 0 of the matching
//! forward neighbor.

use strata_voxel::{CHUNK_AREA, CHUNK_SIZE, Chunk, StoreError};

/// The seven chunks in the positive octant of a chunk.
///
/// Every field is required. A chunk cannot be meshed until all seven exist.
#[derive(Clone, Copy, Debug)]
pub struct ForwardNeighbors<'a> {
    /// +X.
    pub pos_x: &'a Chunk,
    /// +Y.
    pub pos_y: &'a Chunk,
    /// +Z.
    pub pos_z: &'a Chunk,
    /// +X+Z.
    pub pos_xz: &'a Chunk,
    /// +X+Y.
    pub pos_xy: &'a Chunk,
    /// +Y+Z.
    pub pos_yz: &'a Chunk,
    /// +X+Y+Z.
    pub pos_xyz: &'a Chunk,
}

impl<'a> ForwardNeighbors<'a> {
    /// Builds the set from chunks listed in `strata_voxel::FORWARD_OFFSETS`
    /// order: +X, +Y, +Z, +X+Z, +X+Y, +Y+Z, +X+Y+Z.
    pub fn from_array(chunks: [&'a Chunk; 7]) -> Self {
        let [pos_x, pos_y, pos_z, pos_xz, pos_xy, pos_yz, pos_xyz] = chunks;
        Self {
            pos_x,
            pos_y,
            pos_z,
            pos_xz,
            pos_xy,
            pos_yz,
            pos_xyz,
        }
    }
}

// ---------------------------------------------------------------------------
// Corner sampling
// ---------------------------------------------------------------------------

/// Density lookups over a chunk and its forward neighbors, for local
/// coordinates in `[0, CHUNK_SIZE]` on each axis.
///
/// Holds borrowed dense arrays, so construction fails if any of the eight
/// chunks is frozen.
pub struct CornerSampler<'a> {
    /// Indexed by a 3-bit mask of which axes sit at `CHUNK_SIZE`
    /// (bit 0 = X, bit 1 = Y, bit 2 = Z).
    sources: [&'a [f32]; 8],
}

impl<'a> CornerSampler<'a> {
    /// Borrows the density arrays of `center` and its neighbors.
    ///
    /// # Errors
    ///
    /// [`StoreError::Frozen`] if any of the chunks is frozen.
    pub fn new(center: &'a Chunk, neighbors: &ForwardNeighbors<'a>) -> Result<Self, StoreError> {
        let densities = |chunk: &'a Chunk| chunk.data().dense().map(|(d, _)| d);
        Ok(Self {
            sources: [
                densities(center)?,
                densities(neighbors.pos_x)?,
                densities(neighbors.pos_y)?,
                densities(neighbors.pos_xy)?,
                densities(neighbors.pos_z)?,
                densities(neighbors.pos_xz)?,
                densities(neighbors.pos_yz)?,
                densities(neighbors.pos_xyz)?,
            ],
        })
    }

    /// Density at `(x, y, z)`, where each component is in `[0, CHUNK_SIZE]`.
    ///
    /// A component equal to `CHUNK_SIZE` selects the neighbor across that
    /// face and reads its local coordinate 0. With several such components
    /// the diagonal neighbor is used, so the full-corner case takes priority
    /// over the edge cases, which take priority over the single faces.
    pub fn density(&self, x: usize, y: usize, z: usize) -> f32 {
        debug_assert!(x <= CHUNK_SIZE && y <= CHUNK_SIZE && z <= CHUNK_SIZE);
        let (sx, lx) = wrap(x);
        let (sy, ly) = wrap(y);
        let (sz, lz) = wrap(z);
        let source = sx | (sy << 1) | (sz << 2);
        self.sources[source][lx * CHUNK_AREA + ly * CHUNK_SIZE + lz]
    }
}

/// Splits a coordinate in `[0, CHUNK_SIZE]` into (crossed-boundary bit, local coordinate).
fn wrap(c: usize) -> (usize, usize) {
    if c == CHUNK_SIZE { (1, 0) } else { (0, c) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::{MaterialCatalog, MaterialRecord};

    /// A chunk whose every voxel has density `value`.
    fn uniform(value: f32) -> Chunk {
        let mut chunk = Chunk::new();
        let stone = MaterialRecord::plain(MaterialCatalog::STONE);
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    chunk
                        .data_mut()
                        .set_voxel(x, y, z, value, &stone)
                        .expect("write");
                }
            }
        }
        chunk.flush_changes().expect("flush");
        chunk
    }

    #[test]
    fn test_each_boundary_combination_reads_its_neighbor() {
        let center = uniform(0.0);
        let tagged: Vec<Chunk> = (1..=7).map(|i| uniform(i as f32)).collect();
        // FORWARD_OFFSETS order: +X, +Y, +Z, +XZ, +XY, +YZ, +XYZ.
        let neighbors = ForwardNeighbors::from_array([
            &tagged[0], &tagged[1], &tagged[2], &tagged[3], &tagged[4], &tagged[5], &tagged[6],
        ]);
        let sampler = CornerSampler::new(&center, &neighbors).expect("unfrozen");
        let n = CHUNK_SIZE;

        assert_eq!(sampler.density(3, 4, 5), 0.0);
        assert_eq!(sampler.density(n, 4, 5), 1.0);
        assert_eq!(sampler.density(3, n, 5), 2.0);
        assert_eq!(sampler.density(3, 4, n), 3.0);
        assert_eq!(sampler.density(n, 4, n), 4.0);
        assert_eq!(sampler.density(n, n, 5), 5.0);
        assert_eq!(sampler.density(3, n, n), 6.0);
        assert_eq!(sampler.density(n, n, n), 7.0);
    }

    #[test]
    fn test_boundary_reads_neighbor_origin_layer() {
        let center = uniform(0.0);
        let mut pos_x = uniform(0.0);
        pos_x
            .data_mut()
            .set_voxel(0, 7, 9, 0.75, &MaterialRecord::plain(MaterialCatalog::DIRT))
            .expect("write");
        pos_x.flush_changes().expect("flush");
        let air = uniform(0.0);
        let neighbors = ForwardNeighbors::from_array([&pos_x, &air, &air, &air, &air, &air, &air]);
        let sampler = CornerSampler::new(&center, &neighbors).expect("unfrozen");

        assert_eq!(sampler.density(CHUNK_SIZE, 7, 9), 0.75);
        assert_eq!(sampler.density(CHUNK_SIZE, 7, 8), 0.0);
    }

    #[test]
    fn test_frozen_neighbor_rejected() {
        let center = uniform(0.0);
        let mut frozen = uniform(0.0);
        frozen.data_mut().freeze().expect("freeze");
        let air = uniform(0.0);
        let neighbors = ForwardNeighbors::from_array([&air, &air, &air, &air, &air, &air, &frozen]);
        assert!(matches!(
            CornerSampler::new(&center, &neighbors),
            Err(StoreError::Frozen)
        ));
    }
}
