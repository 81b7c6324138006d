//! World streaming: keeps voxel terrain generated, meshed, and visible
//! around a moving viewer, and evicts it again behind them.

pub mod error;
pub mod frustum;
pub mod metrics;
pub mod pending;
pub mod sinks;
pub mod streamer;
pub mod viewer;

pub use error::StreamError;
pub use frustum::{Aabb, Frustum};
pub use metrics::{StreamerMetrics, TickReport};
pub use pending::PendingSet;
pub use sinks::{ColliderSink, MeshSink};
pub use streamer::{
    ChunkStatus, DEFAULT_FRUSTUM_BYPASS_RADIUS, DEFAULT_NEAR_FIELD_RADIUS,
    DEFAULT_RENDER_DISTANCE, WorldStreamer, closest_offsets,
};
pub use viewer::Viewer;
