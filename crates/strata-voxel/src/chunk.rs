//! A chunk: voxel storage plus its face-to-face visibility relation.
//!
//! The visibility relation answers "can something entering through face A
//! leave through face B?" without building geometry. It is recomputed by
//! [`Chunk::flush_changes`] after writes and consulted by the streamer's
//! occlusion traversal.

use crate::chunk_data::{CHUNK_AREA, CHUNK_SIZE, CHUNK_VOLUME, ChunkData, ISOLEVEL};
use crate::error::StoreError;
use crate::face::{Face, FaceSet};

const LAST: usize = CHUNK_SIZE - 1;

// ---------------------------------------------------------------------------
// VisibilityMask
// ---------------------------------------------------------------------------

/// For each entry face, the set of faces reachable through non-solid space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityMask([FaceSet; 6]);

impl VisibilityMask {
    /// No face connects to any other.
    pub const NONE: Self = Self([FaceSet::NONE; 6]);

    /// Every face connects to every other face.
    pub fn all_pairs() -> Self {
        let mut mask = Self::NONE;
        for face in Face::ALL {
            mask.0[face.index()] = FaceSet::ALL.without(face);
        }
        mask
    }

    /// Returns `true` if `exit` is reachable after entering through `entry`.
    pub fn connects(&self, entry: Face, exit: Face) -> bool {
        self.0[entry.index()].contains(exit)
    }

    /// Faces reachable from `entry`.
    pub fn reachable_from(&self, entry: Face) -> FaceSet {
        self.0[entry.index()]
    }

    /// Number of connected ordered pairs (0–30).
    pub fn pair_count(&self) -> u32 {
        self.0.iter().map(|set| set.len()).sum()
    }

    /// Records every ordered pair of distinct faces in `faces`.
    fn connect_all(&mut self, faces: FaceSet) {
        for from in faces.iter() {
            self.0[from.index()].0 |= faces.without(from).0;
        }
    }
}

// ---------------------------------------------------------------------------
// Flood fill scratch
// ---------------------------------------------------------------------------

/// Visited flags and an explicit stack for the visibility flood fill.
///
/// Sized to the chunk volume once and reused across every per-face fill.
#[derive(Clone, Debug)]
pub struct FloodFillScratch {
    visited: Vec<bool>,
    stack: Vec<u16>,
}

impl FloodFillScratch {
    /// Allocates buffers for one chunk volume.
    pub fn new() -> Self {
        Self {
            visited: vec![false; CHUNK_VOLUME],
            stack: Vec::with_capacity(CHUNK_VOLUME),
        }
    }

    fn reset(&mut self) {
        self.visited.fill(false);
        self.stack.clear();
    }
}

impl Default for FloodFillScratch {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// One chunk's voxel data together with its visibility relation.
#[derive(Clone, Debug, Default)]
pub struct Chunk {
    data: ChunkData,
    visibility: VisibilityMask,
}

impl Chunk {
    /// Creates an all-air chunk with an empty visibility relation.
    ///
    /// The relation is only meaningful after the first
    /// [`flush_changes`](Self::flush_changes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the voxel storage.
    pub fn data(&self) -> &ChunkData {
        &self.data
    }

    /// Returns the voxel storage mutably.
    ///
    /// Writes made through this are not reflected in [`visibility`](Self::visibility)
    /// until [`flush_changes`](Self::flush_changes) runs.
    pub fn data_mut(&mut self) -> &mut ChunkData {
        &mut self.data
    }

    /// Returns the most recently computed visibility relation.
    pub fn visibility(&self) -> &VisibilityMask {
        &self.visibility
    }

    /// Shorthand for `self.visibility().connects(entry, exit)`.
    pub fn connects(&self, entry: Face, exit: Face) -> bool {
        self.visibility.connects(entry, exit)
    }

    /// Returns `true` while the voxel storage is frozen.
    pub fn is_frozen(&self) -> bool {
        self.data.is_frozen()
    }

    /// Flushes the palette and recomputes the visibility relation.
    pub fn flush_changes(&mut self) -> Result<(), StoreError> {
        self.data.flush()?;
        self.compute_visibility()
    }

    /// Recomputes the visibility relation with freshly allocated scratch space.
    pub fn compute_visibility(&mut self) -> Result<(), StoreError> {
        let mut scratch = FloodFillScratch::new();
        self.compute_visibility_with(&mut scratch)
    }

    /// Recomputes the visibility relation, reusing `scratch` for all six fills.
    ///
    /// Empty chunks connect every face pair and filled chunks connect none,
    /// without running the fill. Otherwise each face is flooded from its
    /// non-solid boundary voxels, and every pair of distinct boundary faces
    /// the flood touches is recorded as connected.
    pub fn compute_visibility_with(
        &mut self,
        scratch: &mut FloodFillScratch,
    ) -> Result<(), StoreError> {
        if self.data.is_empty()? {
            self.visibility = VisibilityMask::all_pairs();
            return Ok(());
        }
        if self.data.is_filled()? {
            self.visibility = VisibilityMask::NONE;
            return Ok(());
        }

        let (densities, _) = self.data.dense()?;
        let mut mask = VisibilityMask::NONE;
        for face in Face::ALL {
            let exposed = flood_from_face(densities, face, scratch);
            mask.connect_all(exposed);
        }
        self.visibility = mask;
        Ok(())
    }
}

/// Boundary faces touched by a voxel at `(x, y, z)`.
fn boundary_faces(x: usize, y: usize, z: usize) -> FaceSet {
    let mut faces = FaceSet::NONE;
    if x == 0 {
        faces.insert(Face::NegX);
    }
    if x == LAST {
        faces.insert(Face::PosX);
    }
    if y == 0 {
        faces.insert(Face::NegY);
    }
    if y == LAST {
        faces.insert(Face::PosY);
    }
    if z == 0 {
        faces.insert(Face::NegZ);
    }
    if z == LAST {
        faces.insert(Face::PosZ);
    }
    faces
}

/// Linear index of the `(u, v)`-th voxel on `face`.
fn face_voxel_index(face: Face, u: usize, v: usize) -> usize {
    let (x, y, z) = match face {
        Face::NegX => (0, u, v),
        Face::PosX => (LAST, u, v),
        Face::NegY => (u, 0, v),
        Face::PosY => (u, LAST, v),
        Face::NegZ => (u, v, 0),
        Face::PosZ => (u, v, LAST),
    };
    x * CHUNK_AREA + y * CHUNK_SIZE + z
}

/// Floods non-solid space reachable from `face` and returns every boundary
/// face the flood reached.
fn flood_from_face(densities: &[f32], face: Face, scratch: &mut FloodFillScratch) -> FaceSet {
    scratch.reset();
    let FloodFillScratch { visited, stack } = scratch;

    for u in 0..CHUNK_SIZE {
        for v in 0..CHUNK_SIZE {
            let index = face_voxel_index(face, u, v);
            if densities[index] < ISOLEVEL {
                visited[index] = true;
                stack.push(index as u16);
            }
        }
    }

    let mut exposed = FaceSet::NONE;
    while let Some(index) = stack.pop() {
        let index = index as usize;
        let (x, y, z) = ChunkData::position_of(index);
        exposed.0 |= boundary_faces(x, y, z).0;

        let mut visit = |n: usize| {
            if !visited[n] && densities[n] < ISOLEVEL {
                visited[n] = true;
                stack.push(n as u16);
            }
        };
        if x < LAST {
            visit(index + CHUNK_AREA);
        }
        if x > 0 {
            visit(index - CHUNK_AREA);
        }
        if y < LAST {
            visit(index + CHUNK_SIZE);
        }
        if y > 0 {
            visit(index - CHUNK_SIZE);
        }
        if z < LAST {
            visit(index + 1);
        }
        if z > 0 {
            visit(index - 1);
        }
    }
    exposed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialCatalog, MaterialRecord};

    fn stone() -> MaterialRecord {
        MaterialRecord::plain(MaterialCatalog::STONE)
    }

    /// Fills every voxel for which `solid` returns true with stone at density 1.
    fn chunk_where(solid: impl Fn(usize, usize, usize) -> bool) -> Chunk {
        let mut chunk = Chunk::new();
        for index in 0..CHUNK_VOLUME {
            let (x, y, z) = ChunkData::position_of(index);
            if solid(x, y, z) {
                chunk
                    .data_mut()
                    .set_voxel(x, y, z, 1.0, &stone())
                    .expect("write");
            }
        }
        chunk.flush_changes().expect("flush");
        chunk
    }

    #[test]
    fn test_empty_chunk_connects_every_pair() {
        let mut chunk = Chunk::new();
        chunk.flush_changes().expect("flush");
        assert_eq!(chunk.visibility().pair_count(), 30);
        for a in Face::ALL {
            for b in Face::ALL {
                assert_eq!(chunk.connects(a, b), a != b);
            }
        }
    }

    #[test]
    fn test_filled_chunk_connects_nothing() {
        let chunk = chunk_where(|_, _, _| true);
        assert!(chunk.data().is_filled().expect("unfrozen"));
        assert_eq!(*chunk.visibility(), VisibilityMask::NONE);
    }

    #[test]
    fn test_hollow_chunk_connects_all_thirty_pairs() {
        // A single interior solid voxel keeps the chunk from being "empty".
        let chunk = chunk_where(|x, y, z| (x, y, z) == (16, 16, 16));
        assert!(!chunk.data().is_empty().expect("unfrozen"));
        assert_eq!(chunk.visibility().pair_count(), 30);
        assert!(chunk.connects(Face::NegY, Face::PosY));
        assert!(!chunk.connects(Face::PosZ, Face::PosZ));
    }

    #[test]
    fn test_tunnel_connects_only_its_ends() {
        // Solid except a straight tunnel along X through the middle.
        let chunk = chunk_where(|_, y, z| !(y == 16 && z == 16));
        assert!(chunk.connects(Face::NegX, Face::PosX));
        assert!(chunk.connects(Face::PosX, Face::NegX));
        assert_eq!(chunk.visibility().pair_count(), 2);
        assert!(!chunk.connects(Face::NegY, Face::PosY));
        assert!(chunk.visibility().reachable_from(Face::PosZ).is_empty());
    }

    #[test]
    fn test_pocket_on_one_face_records_no_self_pair() {
        let chunk = chunk_where(|x, y, z| (x, y, z) != (5, LAST, 5));
        assert_eq!(*chunk.visibility(), VisibilityMask::NONE);
    }

    #[test]
    fn test_bent_passage_connects_entry_and_exit() {
        // Open column up from the bottom at (4, _, 4) to y=20, then a run to +Z.
        let chunk = chunk_where(|x, y, z| {
            let column = x == 4 && z == 4 && y <= 20;
            let run = x == 4 && y == 20 && z >= 4;
            !(column || run)
        });
        assert!(chunk.connects(Face::NegY, Face::PosZ));
        assert!(chunk.connects(Face::PosZ, Face::NegY));
        assert!(!chunk.connects(Face::NegY, Face::PosY));
        assert_eq!(chunk.visibility().pair_count(), 2);
    }

    #[test]
    fn test_scratch_reuse_matches_fresh_computation() {
        let mut scratch = FloodFillScratch::new();
        let mut a = chunk_where(|_, y, z| !(y == 16 && z == 16));
        let mut b = chunk_where(|x, y, z| (x, y, z) == (1, 1, 1));
        let (fresh_a, fresh_b) = (*a.visibility(), *b.visibility());
        a.compute_visibility_with(&mut scratch).expect("visibility");
        b.compute_visibility_with(&mut scratch).expect("visibility");
        assert_eq!(*a.visibility(), fresh_a);
        assert_eq!(*b.visibility(), fresh_b);
    }

    #[test]
    fn test_frozen_chunk_cannot_recompute() {
        let mut chunk = Chunk::new();
        chunk.data_mut().freeze().expect("freeze");
        assert!(chunk.is_frozen());
        assert_eq!(chunk.flush_changes(), Err(StoreError::Frozen));
    }
}
