//! View-frustum planes and chunk bounding boxes for the occlusion pass.

use glam::{Mat4, Vec3, Vec4};
use strata_voxel::{CHUNK_SIZE, ChunkCoord};

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The world-space extent of the voxels stored in the chunk at `coord`.
    pub fn of_chunk(coord: ChunkCoord) -> Self {
        let min = Vec3::from_array(coord.world_origin());
        Self::new(min, min + Vec3::splat(CHUNK_SIZE as f32))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Six planes extracted from a view-projection matrix.
///
/// Each plane is `(a, b, c, d)` with the normal pointing into the frustum,
/// so `dot(normal, p) + d >= 0` for points on the inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extracts normalized planes (Gribb-Hartmann) from a right-handed
    /// view-projection matrix with a `[0, 1]` depth range, as produced by
    /// `Mat4::perspective_rh`.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Returns `true` if any part of `aabb` lies inside all six planes.
    ///
    /// Uses the p-vertex test: for each plane only the box corner furthest
    /// along the plane normal is checked.
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let p = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            normal.dot(p) + plane.w >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_neg_z(eye: Vec3) -> Frustum {
        let view = Mat4::look_to_rh(eye, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 1000.0);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_box_in_front_is_visible() {
        let frustum = looking_down_neg_z(Vec3::ZERO);
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -20.0), Vec3::new(1.0, 1.0, -10.0));
        assert!(frustum.intersects(&aabb));
    }

    #[test]
    fn test_box_behind_is_not_visible() {
        let frustum = looking_down_neg_z(Vec3::ZERO);
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 20.0));
        assert!(!frustum.intersects(&aabb));
    }

    #[test]
    fn test_side_and_far_boxes_culled() {
        let frustum = looking_down_neg_z(Vec3::ZERO);
        let left = Aabb::new(Vec3::new(-500.0, 0.0, -6.0), Vec3::new(-499.0, 1.0, -5.0));
        let above = Aabb::new(Vec3::new(0.0, 499.0, -6.0), Vec3::new(1.0, 500.0, -5.0));
        let beyond = Aabb::new(Vec3::new(0.0, 0.0, -3000.0), Vec3::new(1.0, 1.0, -2000.0));
        assert!(!frustum.intersects(&left));
        assert!(!frustum.intersects(&above));
        assert!(!frustum.intersects(&beyond));
    }

    #[test]
    fn test_straddling_box_is_visible() {
        let frustum = looking_down_neg_z(Vec3::ZERO);
        let aabb = Aabb::new(Vec3::new(-200.0, -1.0, -10.0), Vec3::new(1.0, 1.0, 10.0));
        assert!(frustum.intersects(&aabb));
    }

    #[test]
    fn test_planes_are_normalized() {
        let frustum = looking_down_neg_z(Vec3::new(3.0, 4.0, 5.0));
        for plane in &frustum.planes {
            let len = plane.truncate().length();
            assert!((len - 1.0).abs() < 1e-4, "plane normal not normalized: {len}");
        }
    }

    #[test]
    fn test_chunk_box_spans_its_voxels() {
        let aabb = Aabb::of_chunk(ChunkCoord::new(1, -1, 2));
        assert_eq!(aabb.min, Vec3::new(32.0, -32.0, 64.0));
        assert_eq!(aabb.max, Vec3::new(64.0, 0.0, 96.0));
        assert_eq!(aabb.center(), Vec3::new(48.0, -16.0, 80.0));
        assert_eq!(aabb.extents(), Vec3::splat(16.0));
    }
}
