//! Tick-driven chunk streaming around a moving viewer.
//!
//! Each tick runs four phases in a fixed order, each observing the state the
//! previous one left behind:
//!
//! 1. **Occlusion**: a breadth-first walk from the viewer's chunk through the
//!    per-chunk face connectivity builds the visible set and updates every
//!    mesh's renderable flag.
//! 2. **Eviction**: chunks outside the cubic window around the viewer lose
//!    their mesh and collider and have their voxel stores frozen.
//! 3. **Generation**: the nearest window coordinate that is neither loaded nor
//!    pending is generated (if not already resident) and meshed if ready.
//! 4. **Pending drain**: a capped number of pending chunks that became ready
//!    are meshed.
//!
//! A chunk is *ready* when it is in the visible set and all seven of its
//! forward neighbors are resident, frozen or not.

use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_config::StreamingConfig;
use strata_mesh::{ExtractError, ForwardNeighbors, SurfaceExtractor};
use strata_terrain::ChunkGenerator;
use strata_voxel::{CHUNK_SIZE, Chunk, ChunkCoord, Face};

use crate::error::StreamError;
use crate::frustum::{Aabb, Frustum};
use crate::metrics::{StreamerMetrics, TickReport};
use crate::pending::PendingSet;
use crate::sinks::{ColliderSink, MeshSink};
use crate::viewer::Viewer;

/// Chunks within this distance of the viewer are always expanded by the
/// occlusion walk.
pub const DEFAULT_NEAR_FIELD_RADIUS: u32 = 3;

/// Chunks within this distance of the viewer skip the frustum test.
pub const DEFAULT_FRUSTUM_BYPASS_RADIUS: u32 = 2;

/// Half-extent of the streaming window, in chunks.
pub const DEFAULT_RENDER_DISTANCE: u32 = 5;

/// Where the viewer is placed relative to the origin of the first chunk that
/// produces geometry: centered on X/Z, one chunk height up.
const BOOTSTRAP_OFFSET: Vec3 = Vec3::new(
    CHUNK_SIZE as f32 / 2.0,
    CHUNK_SIZE as f32,
    CHUNK_SIZE as f32 / 2.0,
);

/// Lifecycle stage of one chunk coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkStatus {
    /// Never generated.
    Unknown,
    /// Resident and dense, but neither pending nor meshed.
    Generated,
    /// Waiting for visibility or forward neighbors.
    Pending,
    /// Meshed, with or without geometry.
    Meshed,
    /// Resident with its voxel store run-length encoded.
    Frozen,
}

/// Offsets of the cube `[-radius, radius]³`, nearest first.
///
/// Ties keep x-major, then y, then z order.
pub fn closest_offsets(radius: u32) -> Vec<(i32, i32, i32)> {
    let r = radius as i32;
    let side = (2 * radius as usize) + 1;
    let mut offsets = Vec::with_capacity(side * side * side);
    for x in -r..=r {
        for y in -r..=r {
            for z in -r..=r {
                offsets.push((x, y, z));
            }
        }
    }
    offsets.sort_by_key(|&(x, y, z)| x * x + y * y + z * z);
    offsets
}

/// Returns `true` if `coord` lies in the cubic window of half-extent
/// `radius` around `center`.
fn in_window(center: ChunkCoord, coord: ChunkCoord, radius: i32) -> bool {
    (coord.x - center.x).abs() <= radius
        && (coord.y - center.y).abs() <= radius
        && (coord.z - center.z).abs() <= radius
}

/// Keeps terrain generated, meshed, and evicted around a [`Viewer`].
///
/// `G` fills new chunks, `M` receives meshes, and `C` receives colliders.
/// The streamer exclusively owns every chunk and every handle the sinks
/// return.
pub struct WorldStreamer<G, M, C>
where
    M: MeshSink,
    C: ColliderSink,
{
    generator: G,
    extractor: SurfaceExtractor,
    mesh_sink: M,
    collider_sink: C,
    config: StreamingConfig,
    metrics: StreamerMetrics,

    /// Every generated chunk, frozen or dense.
    chunks: FxHashMap<ChunkCoord, Chunk>,
    meshes: FxHashMap<ChunkCoord, M::Handle>,
    colliders: FxHashMap<ChunkCoord, C::Handle>,
    /// Chunks meshed since they last entered the window.
    loaded: FxHashSet<ChunkCoord>,
    pending: PendingSet,
    visible: FxHashSet<ChunkCoord>,
    offsets: Vec<(i32, i32, i32)>,
    /// Set once the viewer has been placed on the first chunk with geometry.
    viewer_placed: bool,
}

impl<G, M, C> WorldStreamer<G, M, C>
where
    G: ChunkGenerator,
    M: MeshSink,
    C: ColliderSink,
{
    /// Creates a streamer with no resident chunks.
    pub fn new(
        generator: G,
        extractor: SurfaceExtractor,
        mesh_sink: M,
        collider_sink: C,
        config: StreamingConfig,
        metrics: StreamerMetrics,
    ) -> Self {
        let offsets = closest_offsets(config.render_distance);
        Self {
            generator,
            extractor,
            mesh_sink,
            collider_sink,
            config,
            metrics,
            chunks: FxHashMap::default(),
            meshes: FxHashMap::default(),
            colliders: FxHashMap::default(),
            loaded: FxHashSet::default(),
            pending: PendingSet::new(),
            visible: FxHashSet::default(),
            offsets,
            viewer_placed: false,
        }
    }

    /// Runs one occlusion, eviction, generation, and pending-drain cycle.
    ///
    /// The first chunk to produce geometry moves `viewer` on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator fails, a store operation fails, or
    /// a chunk judged ready is missing a neighbor. A palette miss is not an
    /// error; the chunk stays pending and is retried on a later tick.
    pub fn tick(&mut self, viewer: &mut Viewer) -> Result<TickReport, StreamError> {
        let center = viewer.chunk_coord();
        let mut report = TickReport {
            viewer_chunk: center,
            ..TickReport::default()
        };

        self.visible = self.occlusion_pass(center, viewer.frustum.as_ref());
        for (coord, handle) in &self.meshes {
            self.mesh_sink
                .set_renderable(handle, self.visible.contains(coord));
        }
        report.visible = self.visible.len();
        self.metrics.visible_chunks = report.visible;

        report.evicted = self.evict_outside(center)?;

        for _ in 0..self.config.generations_per_tick {
            let Some(coord) = self.next_to_generate(center) else {
                break;
            };
            if !self.chunks.contains_key(&coord) {
                let mut chunk = Chunk::new();
                self.generator.fill(&mut chunk, coord)?;
                self.chunks.insert(coord, chunk);
                self.metrics.chunks_generated += 1;
                report.generated.push(coord);
                tracing::trace!(%coord, "generated chunk");
            }
            if self.is_ready(coord) {
                self.mesh_chunk(coord, viewer, &mut report)?;
            } else {
                self.pending.insert(coord);
            }
        }

        self.drain_pending(viewer, &mut report)?;

        report.pending = self.pending.len();
        tracing::debug!(
            viewer_chunk = %center,
            visible = report.visible,
            evicted = report.evicted,
            generated = report.generated.len(),
            meshed = report.meshed.len(),
            pending = report.pending,
            "streamer tick"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Occlusion
    // -----------------------------------------------------------------------

    /// Walks outward from `center` through connected chunk faces.
    ///
    /// Near-field chunks expand to all six neighbors. Beyond that, a chunk
    /// expands through an exit face only if its visibility mask connects the
    /// face it was entered by to that exit, and the neighbor is near enough
    /// to bypass the frustum or intersects it. Chunks that are not resident
    /// are visited but never expanded, so the walk stops at unloaded space.
    fn occlusion_pass(&self, center: ChunkCoord, frustum: Option<&Frustum>) -> FxHashSet<ChunkCoord> {
        let radius = self.config.render_distance as i32;
        let near_sq = i64::from(self.config.near_field_radius).pow(2);
        let bypass_sq = i64::from(self.config.frustum_bypass_radius).pow(2);

        let mut visited = FxHashSet::default();
        let mut queue: VecDeque<(ChunkCoord, Option<Face>)> = VecDeque::new();
        visited.insert(center);
        queue.push_back((center, None));

        while let Some((coord, entry)) = queue.pop_front() {
            let near = coord.distance_sq(center) <= near_sq;
            let chunk = self.chunks.get(&coord);
            if !near && chunk.is_none() {
                continue;
            }

            for exit in Face::ALL {
                let next = coord.neighbor(exit);
                if visited.contains(&next) || !in_window(center, next, radius) {
                    continue;
                }
                if !near {
                    let connected = match (chunk, entry) {
                        (Some(chunk), Some(entry)) => chunk.connects(entry, exit),
                        _ => true,
                    };
                    if !connected {
                        continue;
                    }
                    let in_view = next.distance_sq(center) <= bypass_sq
                        || frustum.is_none_or(|f| f.intersects(&Aabb::of_chunk(next)));
                    if !in_view {
                        continue;
                    }
                }
                visited.insert(next);
                queue.push_back((next, Some(exit.opposite())));
            }
        }

        visited
    }

    // -----------------------------------------------------------------------
    // Eviction
    // -----------------------------------------------------------------------

    /// Unloads and freezes everything outside the window around `center`.
    /// Returns how many loaded chunks were unloaded.
    fn evict_outside(&mut self, center: ChunkCoord) -> Result<usize, StreamError> {
        let radius = self.config.render_distance as i32;

        let leaving: Vec<ChunkCoord> = self
            .loaded
            .iter()
            .copied()
            .filter(|c| !in_window(center, *c, radius))
            .collect();
        for coord in &leaving {
            self.loaded.remove(coord);
            if let Some(handle) = self.meshes.remove(coord) {
                self.mesh_sink.remove_mesh(handle);
            }
            if let Some(handle) = self.colliders.remove(coord) {
                self.collider_sink.remove_collider(handle);
            }
        }
        self.metrics.evictions += leaving.len() as u64;

        let dropped = self.pending.retain(|c| in_window(center, c, radius));

        let mut frozen = 0usize;
        for (coord, chunk) in &mut self.chunks {
            if chunk.is_frozen() || in_window(center, *coord, radius) {
                continue;
            }
            chunk.data_mut().freeze()?;
            self.metrics.record_freeze(chunk.data().memory_bytes());
            frozen += 1;
        }

        if !leaving.is_empty() || dropped > 0 || frozen > 0 {
            tracing::debug!(
                unloaded = leaving.len(),
                dropped_pending = dropped,
                frozen,
                "evicted chunks outside window"
            );
        }
        Ok(leaving.len())
    }

    // -----------------------------------------------------------------------
    // Generation and meshing
    // -----------------------------------------------------------------------

    /// The nearest window coordinate that is neither loaded nor pending.
    fn next_to_generate(&self, center: ChunkCoord) -> Option<ChunkCoord> {
        self.offsets
            .iter()
            .map(|&(dx, dy, dz)| center.offset(dx, dy, dz))
            .find(|c| !self.loaded.contains(c) && !self.pending.contains(*c))
    }

    /// Visible, resident, and all seven forward neighbors resident.
    fn is_ready(&self, coord: ChunkCoord) -> bool {
        self.visible.contains(&coord)
            && self.chunks.contains_key(&coord)
            && coord
                .forward_neighbors()
                .iter()
                .all(|n| self.chunks.contains_key(n))
    }

    fn drain_pending(&mut self, viewer: &mut Viewer, report: &mut TickReport) -> Result<(), StreamError> {
        let cap = self.config.pending_promotions_per_tick as usize;
        if cap == 0 || self.pending.is_empty() {
            return Ok(());
        }
        let ready: Vec<ChunkCoord> = self
            .pending
            .iter()
            .filter(|c| self.is_ready(*c))
            .take(cap)
            .collect();
        for coord in ready {
            self.mesh_chunk(coord, viewer, report)?;
        }
        Ok(())
    }

    fn chunk_ref(&self, coord: ChunkCoord) -> Result<&Chunk, StreamError> {
        self.chunks
            .get(&coord)
            .ok_or(StreamError::MissingNeighbor(coord))
    }

    /// Meshes `coord`, unfreezing it and its forward neighbors first.
    ///
    /// On success the chunk moves from pending to loaded. A palette miss
    /// leaves it pending and returns `Ok(false)`.
    fn mesh_chunk(
        &mut self,
        coord: ChunkCoord,
        viewer: &mut Viewer,
        report: &mut TickReport,
    ) -> Result<bool, StreamError> {
        let forward = coord.forward_neighbors();
        for c in std::iter::once(coord).chain(forward) {
            let chunk = self
                .chunks
                .get_mut(&c)
                .ok_or(StreamError::MissingNeighbor(c))?;
            if chunk.is_frozen() {
                let bytes = chunk.data().memory_bytes();
                chunk.data_mut().unfreeze()?;
                self.metrics.record_unfreeze(bytes);
                tracing::trace!(coord = %c, "unfroze chunk for meshing");
            }
        }

        let center = self.chunk_ref(coord)?;
        let mut neighbors = [center; 7];
        for (slot, c) in neighbors.iter_mut().zip(forward) {
            *slot = self.chunk_ref(c)?;
        }
        let extracted = self
            .extractor
            .try_extract(center, &ForwardNeighbors::from_array(neighbors));
        let triangles = match extracted {
            Ok(triangles) => triangles,
            Err(ExtractError::PaletteMiss { index }) => {
                tracing::warn!(%coord, index, "palette miss while meshing, chunk left pending");
                self.metrics.palette_miss_retries += 1;
                self.pending.insert(coord);
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };

        self.pending.remove(coord);
        if !triangles.is_empty() {
            let mesh = self.mesh_sink.create_mesh(coord, &triangles);
            self.mesh_sink
                .set_renderable(&mesh, self.visible.contains(&coord));
            if let Some(old) = self.meshes.insert(coord, mesh) {
                self.mesh_sink.remove_mesh(old);
            }

            let collider = self
                .collider_sink
                .create_collider(&triangles.to_collider_buffers(), coord.world_origin());
            if let Some(old) = self.colliders.insert(coord, collider) {
                self.collider_sink.remove_collider(old);
            }

            if !self.viewer_placed {
                self.viewer_placed = true;
                viewer.position = Vec3::from_array(coord.world_origin()) + BOOTSTRAP_OFFSET;
                tracing::info!(%coord, position = ?viewer.position, "placed viewer on first meshed chunk");
            }
        }

        self.loaded.insert(coord);
        self.metrics.chunks_meshed += 1;
        report.meshed.push(coord);
        tracing::trace!(%coord, triangles = triangles.len(), "meshed chunk");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Where `coord` is in its lifecycle.
    pub fn status(&self, coord: ChunkCoord) -> ChunkStatus {
        match self.chunks.get(&coord) {
            None => ChunkStatus::Unknown,
            Some(chunk) if chunk.is_frozen() => ChunkStatus::Frozen,
            Some(_) if self.loaded.contains(&coord) => ChunkStatus::Meshed,
            Some(_) if self.pending.contains(coord) => ChunkStatus::Pending,
            Some(_) => ChunkStatus::Generated,
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Returns `true` if `coord` was reached by the last occlusion pass.
    pub fn is_visible(&self, coord: ChunkCoord) -> bool {
        self.visible.contains(&coord)
    }

    pub fn visible_set(&self) -> &FxHashSet<ChunkCoord> {
        &self.visible
    }

    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn closest_offsets(&self) -> &[(i32, i32, i32)] {
        &self.offsets
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn metrics(&self) -> &StreamerMetrics {
        &self.metrics
    }

    pub fn mesh_sink(&self) -> &M {
        &self.mesh_sink
    }

    pub fn collider_sink(&self) -> &C {
        &self.collider_sink
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use glam::Mat4;
    use strata_mesh::{ColliderBuffers, TriangleList};
    use strata_terrain::FlatTerrain;
    use strata_voxel::{MaterialCatalog, MaterialRecord, StoreError};

    #[derive(Default)]
    struct RecordingMeshes {
        next: u32,
        /// handle -> (coord, triangle count, renderable)
        live: HashMap<u32, (ChunkCoord, usize, bool)>,
        created: Vec<ChunkCoord>,
        removed: Vec<ChunkCoord>,
    }

    impl MeshSink for RecordingMeshes {
        type Handle = u32;

        fn create_mesh(&mut self, coord: ChunkCoord, triangles: &TriangleList) -> u32 {
            self.next += 1;
            self.live.insert(self.next, (coord, triangles.len(), false));
            self.created.push(coord);
            self.next
        }

        fn set_renderable(&mut self, handle: &u32, renderable: bool) {
            if let Some(entry) = self.live.get_mut(handle) {
                entry.2 = renderable;
            }
        }

        fn remove_mesh(&mut self, handle: u32) {
            let (coord, _, _) = self.live.remove(&handle).expect("live mesh");
            self.removed.push(coord);
        }
    }

    impl RecordingMeshes {
        fn renderable(&self, coord: ChunkCoord) -> Option<bool> {
            self.live
                .values()
                .find(|(c, _, _)| *c == coord)
                .map(|(_, _, r)| *r)
        }
    }

    #[derive(Default)]
    struct RecordingColliders {
        next: u32,
        live: HashMap<u32, [f32; 3]>,
        /// (translation, buffers) in creation order.
        created: Vec<([f32; 3], ColliderBuffers)>,
        removed: usize,
    }

    impl ColliderSink for RecordingColliders {
        type Handle = u32;

        fn create_collider(&mut self, buffers: &ColliderBuffers, translation: [f32; 3]) -> u32 {
            self.next += 1;
            self.live.insert(self.next, translation);
            self.created.push((translation, buffers.clone()));
            self.next
        }

        fn remove_collider(&mut self, handle: u32) {
            self.live.remove(&handle).expect("live collider");
            self.removed += 1;
        }
    }

    /// Wraps a generator and records every coordinate it fills.
    struct Counting<G> {
        inner: G,
        filled: RefCell<Vec<ChunkCoord>>,
    }

    impl<G> Counting<G> {
        fn new(inner: G) -> Self {
            Self {
                inner,
                filled: RefCell::new(Vec::new()),
            }
        }
    }

    impl<G: ChunkGenerator> ChunkGenerator for Counting<G> {
        fn fill(&self, chunk: &mut Chunk, coord: ChunkCoord) -> Result<(), StoreError> {
            self.filled.borrow_mut().push(coord);
            self.inner.fill(chunk, coord)
        }
    }

    /// Writes one solid voxel into the origin chunk and never flushes it, so
    /// the voxel's palette slot has no committed record.
    struct Unflushed;

    impl ChunkGenerator for Unflushed {
        fn fill(&self, chunk: &mut Chunk, coord: ChunkCoord) -> Result<(), StoreError> {
            if coord == ChunkCoord::new(0, 0, 0) {
                let stone = MaterialRecord::plain(MaterialCatalog::STONE);
                chunk.data_mut().set_voxel(5, 5, 5, 1.0, &stone)?;
                chunk.compute_visibility()
            } else {
                chunk.flush_changes()
            }
        }
    }

    type TestStreamer<G> = WorldStreamer<G, RecordingMeshes, RecordingColliders>;

    fn streamer<G: ChunkGenerator>(generator: G, config: StreamingConfig) -> TestStreamer<G> {
        WorldStreamer::new(
            generator,
            SurfaceExtractor::new(MaterialCatalog::with_defaults()),
            RecordingMeshes::default(),
            RecordingColliders::default(),
            config,
            StreamerMetrics::new(),
        )
    }

    fn small_config(render_distance: u32) -> StreamingConfig {
        StreamingConfig {
            render_distance,
            ..StreamingConfig::default()
        }
    }

    /// Generates the whole window in one tick and promotes everything ready.
    fn eager_config(render_distance: u32) -> StreamingConfig {
        StreamingConfig {
            render_distance,
            near_field_radius: 0,
            frustum_bypass_radius: 0,
            pending_promotions_per_tick: 10_000,
            generations_per_tick: 10_000,
        }
    }

    fn plane() -> FlatTerrain {
        FlatTerrain::new(10.0, MaterialCatalog::STONE)
    }

    fn air() -> FlatTerrain {
        FlatTerrain::new(-1.0e6, MaterialCatalog::STONE)
    }

    fn solid() -> FlatTerrain {
        FlatTerrain::new(1.0e6, MaterialCatalog::STONE)
    }

    fn origin() -> ChunkCoord {
        ChunkCoord::new(0, 0, 0)
    }

    // -- offsets ------------------------------------------------------------

    #[test]
    fn test_closest_offsets_sorted_by_distance() {
        let offsets = closest_offsets(2);
        assert_eq!(offsets.len(), 125);
        assert_eq!(offsets[0], (0, 0, 0));
        let dist = |&(x, y, z): &(i32, i32, i32)| x * x + y * y + z * z;
        assert!(offsets.windows(2).all(|w| dist(&w[0]) <= dist(&w[1])));
        assert_eq!(offsets[1..7].iter().map(dist).max(), Some(1));
        assert_eq!(*offsets.last().expect("non-empty"), (2, 2, 2));
    }

    #[test]
    fn test_default_radii_match_config_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.near_field_radius, DEFAULT_NEAR_FIELD_RADIUS);
        assert_eq!(config.frustum_bypass_radius, DEFAULT_FRUSTUM_BYPASS_RADIUS);
        assert_eq!(config.render_distance, DEFAULT_RENDER_DISTANCE);
    }

    // -- generation and pending -------------------------------------------------

    #[test]
    fn test_first_tick_generates_viewer_chunk_as_pending() {
        let mut s = streamer(plane(), small_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        let report = s.tick(&mut viewer).expect("tick");

        assert_eq!(report.viewer_chunk, origin());
        assert_eq!(report.generated, vec![origin()]);
        assert!(report.meshed.is_empty());
        assert_eq!(s.status(origin()), ChunkStatus::Pending);
        assert_eq!(s.status(ChunkCoord::new(1, 0, 0)), ChunkStatus::Unknown);
        assert_eq!(s.metrics().chunks_generated, 1);
    }

    #[test]
    fn test_one_generation_per_tick_nearest_first() {
        let mut s = streamer(plane(), small_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        let mut order = Vec::new();
        for _ in 0..7 {
            let report = s.tick(&mut viewer).expect("tick");
            assert!(report.generated.len() <= 1);
            order.extend(report.generated);
        }
        assert_eq!(order[0], origin());
        assert!(order[1..].iter().all(|c| c.distance_sq(origin()) == 1));
    }

    #[test]
    fn test_pending_chunk_meshed_once_neighbors_resident() {
        let mut s = streamer(air(), small_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        // The 27 nearest offsets cover the origin's forward octant, and
        // (1, 1, 1) is the last of them.
        for _ in 0..26 {
            s.tick(&mut viewer).expect("tick");
        }
        assert_eq!(s.status(origin()), ChunkStatus::Pending);

        let report = s.tick(&mut viewer).expect("tick");
        assert_eq!(report.generated, vec![ChunkCoord::new(1, 1, 1)]);
        assert_eq!(report.meshed, vec![origin()]);
        assert_eq!(s.status(origin()), ChunkStatus::Meshed);
    }

    #[test]
    fn test_first_mesh_places_viewer_on_top() {
        let mut s = streamer(plane(), eager_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");

        assert_eq!(s.mesh_sink().created[0], origin());
        assert_eq!(viewer.position, Vec3::new(16.0, 32.0, 16.0));
        assert_eq!(viewer.chunk_coord(), ChunkCoord::new(1, 1, 1));
    }

    #[test]
    fn test_at_most_one_pending_promotion_per_tick() {
        let config = StreamingConfig {
            generations_per_tick: 10_000,
            ..small_config(2)
        };
        let mut s = streamer(air(), config);
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        let report = s.tick(&mut viewer).expect("tick");
        // Nothing new to generate, so only the drain can mesh.
        assert!(report.generated.is_empty());
        assert_eq!(report.meshed.len(), 1);
        assert!(report.pending > 1);
    }

    #[test]
    fn test_air_chunks_load_without_meshes() {
        let mut s = streamer(air(), eager_config(1));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");

        assert_eq!(s.status(origin()), ChunkStatus::Meshed);
        assert_eq!(s.mesh_count(), 0);
        assert!(s.collider_sink().created.is_empty());
        assert_eq!(viewer.position, Vec3::ZERO);
    }

    #[test]
    fn test_colliders_translated_to_chunk_origin() {
        let mut s = streamer(plane(), eager_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");

        let meshes = &s.mesh_sink().created;
        let colliders = &s.collider_sink().created;
        assert!(!meshes.is_empty());
        assert_eq!(meshes.len(), colliders.len());
        for (coord, (translation, buffers)) in meshes.iter().zip(colliders) {
            assert_eq!(*translation, coord.world_origin());
            assert_eq!(coord.y, 0, "only the y = 0 layer crosses the plane");
            let expected: Vec<u32> = (0..buffers.vertices.len() as u32).collect();
            assert_eq!(buffers.indices, expected);
        }
    }

    // -- occlusion ---------------------------------------------------------------

    #[test]
    fn test_near_field_visible_before_anything_loads() {
        let mut s = streamer(plane(), small_config(5));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");

        assert!(s.is_visible(origin()));
        assert!(s.is_visible(ChunkCoord::new(3, 0, 0)));
        // Visited from the near field but not resident, so not expanded.
        assert!(s.is_visible(ChunkCoord::new(4, 0, 0)));
        assert!(!s.is_visible(ChunkCoord::new(5, 0, 0)));
        assert_eq!(s.metrics().visible_chunks, s.visible_set().len());
    }

    #[test]
    fn test_open_space_visible_across_window() {
        let mut s = streamer(air(), eager_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        let report = s.tick(&mut viewer).expect("tick");
        assert_eq!(report.visible, 125);
    }

    #[test]
    fn test_solid_chunks_block_the_walk() {
        let mut s = streamer(solid(), eager_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        let report = s.tick(&mut viewer).expect("tick");

        // The viewer chunk expands to its six neighbors, which are opaque.
        assert_eq!(report.visible, 7);
        assert!(!s.is_visible(ChunkCoord::new(2, 0, 0)));
        // Readiness needs visibility, so the hidden chunk never meshes.
        assert_eq!(s.status(ChunkCoord::new(-2, -2, -2)), ChunkStatus::Pending);
    }

    #[test]
    fn test_frustum_limits_walk_beyond_near_field() {
        let mut s = streamer(air(), eager_config(2));
        let eye = Vec3::new(15.0, 15.0, 15.0);
        let vp = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0)
            * Mat4::look_to_rh(eye, Vec3::NEG_Z, Vec3::Y);
        let mut viewer = Viewer::new(eye);
        viewer.set_view_projection(&vp);
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");

        assert!(s.is_visible(ChunkCoord::new(0, 0, -2)));
        // Direct neighbors of the viewer chunk are always visited.
        assert!(s.is_visible(ChunkCoord::new(0, 0, 1)));
        assert!(!s.is_visible(ChunkCoord::new(0, 0, 2)));
    }

    #[test]
    fn test_renderable_flags_follow_visible_set() {
        let mut s = streamer(plane(), eager_config(3));
        let mut viewer = Viewer::new(Vec3::new(15.0, 15.0, 15.0));
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");
        let side = ChunkCoord::new(2, 0, 0);
        assert_eq!(s.status(side), ChunkStatus::Meshed);

        let eye = Vec3::new(15.0, 15.0, 15.0);
        viewer.position = eye;
        viewer.set_view_projection(
            &(Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0)
                * Mat4::look_to_rh(eye, Vec3::NEG_Z, Vec3::Y)),
        );
        s.tick(&mut viewer).expect("tick");

        assert!(!s.is_visible(side));
        assert_eq!(s.mesh_sink().renderable(side), Some(false));
        assert_eq!(s.mesh_sink().renderable(origin()), Some(true));
    }

    // -- eviction ----------------------------------------------------------------

    #[test]
    fn test_leaving_window_evicts_and_freezes() {
        let mut s = streamer(plane(), eager_config(2));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");
        let meshed = s.mesh_count();
        assert!(meshed > 0);

        viewer.position = Vec3::new(320.0, 0.0, 0.0);
        let report = s.tick(&mut viewer).expect("tick");

        assert!(report.evicted > 0);
        assert_eq!(s.mesh_sink().removed.len(), meshed);
        assert_eq!(s.collider_sink().removed, meshed);
        assert!(s.mesh_sink().live.values().all(|(c, _, _)| c.x >= 8));
        assert_eq!(s.status(origin()), ChunkStatus::Frozen);
        assert!(s.chunk(origin()).expect("resident").is_frozen());
        assert!(s.metrics().chunks_frozen >= 125);
        assert!(s.metrics().frozen_bytes > 0);
        assert!(s.pending.iter().all(|c| in_window(ChunkCoord::new(10, 0, 0), c, 2)));
    }

    #[test]
    fn test_reentry_unfreezes_without_regenerating() {
        let generator = Counting::new(plane());
        let mut s = streamer(&generator, eager_config(1));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");

        viewer.position = Vec3::new(320.0, 0.0, 0.0);
        s.tick(&mut viewer).expect("tick");
        assert_eq!(s.status(origin()), ChunkStatus::Frozen);

        viewer.position = Vec3::ZERO;
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");

        assert_eq!(s.status(origin()), ChunkStatus::Meshed);
        assert!(s.metrics().chunks_unfrozen > 0);
        let filled = generator.filled.borrow();
        let mut unique = filled.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), filled.len(), "a chunk was generated twice");
    }

    // -- errors ------------------------------------------------------------------

    #[test]
    fn test_palette_miss_keeps_chunk_pending() {
        let mut s = streamer(Unflushed, eager_config(1));
        let mut viewer = Viewer::new(Vec3::ZERO);
        s.tick(&mut viewer).expect("tick");
        s.tick(&mut viewer).expect("tick");

        assert_eq!(s.status(origin()), ChunkStatus::Pending);
        assert!(s.metrics().palette_miss_retries >= 1);
        assert!(!s.mesh_sink().created.contains(&origin()));

        let retries = s.metrics().palette_miss_retries;
        s.tick(&mut viewer).expect("tick");
        assert!(s.metrics().palette_miss_retries > retries);
    }
}
