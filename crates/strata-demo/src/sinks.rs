//! In-memory mesh and collider sinks that keep only what the summary needs.

use rustc_hash::FxHashMap;
use strata_mesh::{ColliderBuffers, TriangleList};
use strata_voxel::ChunkCoord;
use strata_world::{ColliderSink, MeshSink};

/// A mesh as the demo's stand-in renderer stores it.
#[derive(Debug)]
pub struct StoredMesh {
    pub coord: ChunkCoord,
    pub triangles: usize,
    pub renderable: bool,
}

/// Keeps triangle counts and renderable flags by handle.
#[derive(Debug, Default)]
pub struct MemoryMeshes {
    next_handle: u64,
    meshes: FxHashMap<u64, StoredMesh>,
    pub total_created: usize,
    pub total_removed: usize,
}

impl MemoryMeshes {
    pub fn live(&self) -> usize {
        self.meshes.len()
    }

    pub fn renderable(&self) -> usize {
        self.meshes.values().filter(|m| m.renderable).count()
    }

    pub fn live_triangles(&self) -> usize {
        self.meshes.values().map(|m| m.triangles).sum()
    }
}

impl MeshSink for MemoryMeshes {
    type Handle = u64;

    fn create_mesh(&mut self, coord: ChunkCoord, triangles: &TriangleList) -> u64 {
        self.next_handle += 1;
        self.total_created += 1;
        self.meshes.insert(
            self.next_handle,
            StoredMesh {
                coord,
                triangles: triangles.len(),
                renderable: true,
            },
        );
        self.next_handle
    }

    fn set_renderable(&mut self, handle: &u64, renderable: bool) {
        if let Some(mesh) = self.meshes.get_mut(handle) {
            mesh.renderable = renderable;
        }
    }

    fn remove_mesh(&mut self, handle: u64) {
        match self.meshes.remove(&handle) {
            Some(mesh) => {
                self.total_removed += 1;
                tracing::trace!(coord = %mesh.coord, "mesh removed");
            }
            None => tracing::warn!(handle, "removing unknown mesh"),
        }
    }
}

/// Keeps collider vertex counts by handle.
#[derive(Debug, Default)]
pub struct MemoryColliders {
    next_handle: u64,
    colliders: FxHashMap<u64, usize>,
}

impl MemoryColliders {
    pub fn live(&self) -> usize {
        self.colliders.len()
    }

    pub fn live_vertices(&self) -> usize {
        self.colliders.values().sum()
    }
}

impl ColliderSink for MemoryColliders {
    type Handle = u64;

    fn create_collider(&mut self, buffers: &ColliderBuffers, _translation: [f32; 3]) -> u64 {
        self.next_handle += 1;
        self.colliders.insert(self.next_handle, buffers.vertices.len());
        self.next_handle
    }

    fn remove_collider(&mut self, handle: u64) {
        if self.colliders.remove(&handle).is_none() {
            tracing::warn!(handle, "removing unknown collider");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_mesh::Triangle;

    fn one_triangle() -> TriangleList {
        let mut list = TriangleList::new();
        list.push(Triangle {
            positions: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            color: [1, 2, 3],
        });
        list
    }

    #[test]
    fn test_mesh_lifecycle_counts() {
        let mut meshes = MemoryMeshes::default();
        let a = meshes.create_mesh(ChunkCoord::new(0, 0, 0), &one_triangle());
        let b = meshes.create_mesh(ChunkCoord::new(1, 0, 0), &one_triangle());
        meshes.set_renderable(&b, false);
        assert_eq!(meshes.live(), 2);
        assert_eq!(meshes.renderable(), 1);
        assert_eq!(meshes.live_triangles(), 2);

        meshes.remove_mesh(a);
        assert_eq!(meshes.live(), 1);
        assert_eq!(meshes.total_created, 2);
        assert_eq!(meshes.total_removed, 1);
    }

    #[test]
    fn test_collider_lifecycle_counts() {
        let mut colliders = MemoryColliders::default();
        let buffers = one_triangle().to_collider_buffers();
        let handle = colliders.create_collider(&buffers, [0.0, 0.0, 0.0]);
        assert_eq!(colliders.live_vertices(), 3);
        colliders.remove_collider(handle);
        assert_eq!(colliders.live(), 0);
    }
}
