//! Outbound interfaces to the renderer and the physics engine.
//!
//! The streamer owns the handles these return and hands each one back
//! exactly once, when the chunk that produced it is evicted.

use strata_mesh::{ColliderBuffers, TriangleList};
use strata_voxel::ChunkCoord;

/// Receives chunk meshes for rendering.
pub trait MeshSink {
    /// Opaque handle identifying one created mesh.
    type Handle;

    /// Creates a mesh for the chunk at `coord`. Triangle positions are
    /// chunk-local; the mesh belongs at `coord.world_origin()`.
    fn create_mesh(&mut self, coord: ChunkCoord, triangles: &TriangleList) -> Self::Handle;

    /// Shows or hides a mesh.
    fn set_renderable(&mut self, handle: &Self::Handle, renderable: bool);

    /// Destroys a mesh.
    fn remove_mesh(&mut self, handle: Self::Handle);
}

/// Receives static triangle-mesh colliders.
pub trait ColliderSink {
    /// Opaque handle identifying one created collider.
    type Handle;

    /// Creates a fixed collider from `buffers`, translated by `translation`
    /// (the chunk's world origin).
    fn create_collider(&mut self, buffers: &ColliderBuffers, translation: [f32; 3]) -> Self::Handle;

    /// Destroys a collider.
    fn remove_collider(&mut self, handle: Self::Handle);
}

impl<S: MeshSink + ?Sized> MeshSink for &mut S {
    type Handle = S::Handle;

    fn create_mesh(&mut self, coord: ChunkCoord, triangles: &TriangleList) -> Self::Handle {
        (**self).create_mesh(coord, triangles)
    }

    fn set_renderable(&mut self, handle: &Self::Handle, renderable: bool) {
        (**self).set_renderable(handle, renderable);
    }

    fn remove_mesh(&mut self, handle: Self::Handle) {
        (**self).remove_mesh(handle);
    }
}

impl<S: ColliderSink + ?Sized> ColliderSink for &mut S {
    type Handle = S::Handle;

    fn create_collider(&mut self, buffers: &ColliderBuffers, translation: [f32; 3]) -> Self::Handle {
        (**self).create_collider(buffers, translation)
    }

    fn remove_collider(&mut self, handle: Self::Handle) {
        (**self).remove_collider(handle);
    }
}
