//! Triangle lists produced by surface extraction and the flat buffers handed
//! to physics.

/// One flat-colored triangle in chunk-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Vertex positions, in winding order.
    pub positions: [[f32; 3]; 3],
    /// Uniform color, 0–255 per channel.
    pub color: [u8; 3],
}

/// The output of one chunk extraction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleList {
    /// Triangles in emission order.
    pub triangles: Vec<Triangle>,
}

/// Unshared vertex and index buffers for a triangle-mesh collider.
///
/// Triangle `i` uses vertices `3i`, `3i + 1`, `3i + 2`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColliderBuffers {
    /// One vertex per triangle corner.
    pub vertices: Vec<[f32; 3]>,
    /// `0..3n` in order.
    pub indices: Vec<u32>,
}

impl TriangleList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if there are no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Appends a triangle.
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Iterates the triangles.
    pub fn iter(&self) -> std::slice::Iter<'_, Triangle> {
        self.triangles.iter()
    }

    /// Per-vertex colors normalized to `[0, 1]`, three per triangle.
    pub fn vertex_colors(&self) -> Vec<[f32; 3]> {
        self.triangles
            .iter()
            .flat_map(|t| {
                let c = t.color.map(|channel| channel as f32 / 255.0);
                [c, c, c]
            })
            .collect()
    }

    /// Builds collider buffers with no vertex sharing.
    pub fn to_collider_buffers(&self) -> ColliderBuffers {
        let vertices: Vec<[f32; 3]> = self
            .triangles
            .iter()
            .flat_map(|t| t.positions)
            .collect();
        let indices = (0..vertices.len() as u32).collect();
        ColliderBuffers { vertices, indices }
    }
}

impl ColliderBuffers {
    /// Number of triangles described.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex positions as one flat `x, y, z, x, y, z, ...` slice.
    pub fn flat_vertices(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl<'a> IntoIterator for &'a TriangleList {
    type Item = &'a Triangle;
    type IntoIter = std::slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.iter()
    }
}
