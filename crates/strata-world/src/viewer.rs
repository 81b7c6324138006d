//! The observer the streamer keeps the world resident around.

use glam::{Mat4, Vec3};
use strata_voxel::ChunkCoord;

use crate::frustum::Frustum;

/// Viewer position plus an optional view frustum.
///
/// Without a frustum the occlusion pass treats every chunk as inside the view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Viewer {
    /// World-space position.
    pub position: Vec3,
    /// Current view frustum, refreshed by the caller each frame.
    pub frustum: Option<Frustum>,
}

impl Viewer {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            frustum: None,
        }
    }

    pub fn with_frustum(mut self, frustum: Frustum) -> Self {
        self.frustum = Some(frustum);
        self
    }

    /// Replaces the frustum with one built from `view_projection`.
    pub fn set_view_projection(&mut self, view_projection: &Mat4) {
        self.frustum = Some(Frustum::from_view_projection(view_projection));
    }

    /// The chunk the viewer currently occupies.
    pub fn chunk_coord(&self) -> ChunkCoord {
        ChunkCoord::from_world(self.position.to_array())
    }
}
