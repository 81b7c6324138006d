//! Streamer counters and per-tick reports.

use strata_voxel::ChunkCoord;

/// Running totals kept across ticks.
///
/// A fresh set is passed in when the streamer is built, so callers decide
/// whether counters carry over between sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamerMetrics {
    pub chunks_generated: u64,
    pub chunks_meshed: u64,
    pub chunks_frozen: u64,
    pub chunks_unfrozen: u64,
    pub evictions: u64,
    pub palette_miss_retries: u64,
    /// Heap bytes currently held by frozen chunk stores.
    pub frozen_bytes: usize,
    /// Size of the visible set after the last occlusion pass.
    pub visible_chunks: usize,
}

impl StreamerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_freeze(&mut self, bytes: usize) {
        self.chunks_frozen += 1;
        self.frozen_bytes += bytes;
    }

    pub(crate) fn record_unfreeze(&mut self, bytes: usize) {
        self.chunks_unfrozen += 1;
        self.frozen_bytes = self.frozen_bytes.saturating_sub(bytes);
    }
}

/// What one call to `WorldStreamer::tick` did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The viewer's chunk at the start of the tick.
    pub viewer_chunk: ChunkCoord,
    /// Chunks in the visible set.
    pub visible: usize,
    /// Chunks unloaded because they left the window.
    pub evicted: usize,
    /// Chunks created and filled by the generator this tick.
    pub generated: Vec<ChunkCoord>,
    /// Chunks meshed this tick, whether or not they produced geometry.
    pub meshed: Vec<ChunkCoord>,
    /// Pending set size at the end of the tick.
    pub pending: usize,
}
