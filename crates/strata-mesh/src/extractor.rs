//! Marching Cubes surface extraction over one chunk and its forward neighbors.

use strata_voxel::{CHUNK_SIZE, Chunk, ISOLEVEL, MaterialCatalog, PaletteIndex, StoreError};

use crate::neighbors::{CornerSampler, ForwardNeighbors};
use crate::tables::{EDGE_TABLE, TRI_TABLE};
use crate::triangles::{Triangle, TriangleList};

/// Distance below which two densities are treated as equal during edge
/// interpolation.
pub const INTERP_EPSILON: f32 = 1e-5;

/// Unit-cube corner offsets, in table corner order.
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 0, 1],
    [0, 0, 1],
    [0, 1, 0],
    [1, 1, 0],
    [1, 1, 1],
    [0, 1, 1],
];

/// The pair of corners joined by each of the twelve cube edges.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Errors that abort extraction for a chunk.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A voxel refers to a palette slot that has no committed entry.
    #[error("palette index {index} has no material record")]
    PaletteMiss {
        /// The unresolved palette index.
        index: u8,
    },
    /// The chunk or one of its neighbors could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Builds flat-colored triangle lists from chunk density fields.
#[derive(Clone, Debug, Default)]
pub struct SurfaceExtractor {
    catalog: MaterialCatalog,
}

impl SurfaceExtractor {
    /// Creates an extractor that colors triangles from `catalog`.
    pub fn new(catalog: MaterialCatalog) -> Self {
        Self { catalog }
    }

    /// Returns the catalog used for triangle colors.
    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// Extracts the isosurface of `chunk`, logging and returning an empty list
    /// on any failure.
    pub fn extract(&self, chunk: &Chunk, neighbors: &ForwardNeighbors<'_>) -> TriangleList {
        match self.try_extract(chunk, neighbors) {
            Ok(list) => list,
            Err(e) => {
                tracing::error!("surface extraction failed: {e}");
                TriangleList::new()
            }
        }
    }

    /// Extracts the isosurface of `chunk`.
    ///
    /// Positions are chunk-local, in `[0, CHUNK_SIZE]` on each axis. Each
    /// triangle takes the color of the material stored at its cell's origin
    /// voxel.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Store`] if the chunk or a neighbor is frozen.
    /// - [`ExtractError::PaletteMiss`] if a surface cell's material has no
    ///   committed palette entry. No partial result is returned.
    pub fn try_extract(
        &self,
        chunk: &Chunk,
        neighbors: &ForwardNeighbors<'_>,
    ) -> Result<TriangleList, ExtractError> {
        let sampler = CornerSampler::new(chunk, neighbors)?;
        let data = chunk.data();
        let mut out = TriangleList::new();
        let mut values = [0.0f32; 8];

        for rx in 0..CHUNK_SIZE {
            for ry in 0..CHUNK_SIZE {
                for rz in 0..CHUNK_SIZE {
                    for (value, offset) in values.iter_mut().zip(&CORNER_OFFSETS) {
                        *value = sampler.density(rx + offset[0], ry + offset[1], rz + offset[2]);
                    }

                    let below = values.iter().filter(|&&v| v < ISOLEVEL).count();
                    if below == 0 || below == 8 {
                        continue;
                    }

                    let PaletteIndex(index) = data.material_at(rx, ry, rz)?;
                    let record = data
                        .material_record(PaletteIndex(index))?
                        .ok_or(ExtractError::PaletteMiss { index })?;
                    let color = self.catalog.color_or_missing(record.material());

                    let origin = [rx as f32, ry as f32, rz as f32];
                    polygonise(origin, &values, color, &mut out);
                }
            }
        }

        tracing::debug!(triangles = out.len(), "extracted chunk surface");
        Ok(out)
    }
}

/// Triangulates one cell and appends its triangles to `out`.
///
/// `values[i]` is the density at `origin + CORNER_OFFSETS[i]`. Returns the
/// number of triangles appended.
pub fn polygonise(origin: [f32; 3], values: &[f32; 8], color: [u8; 3], out: &mut TriangleList) -> usize {
    let mut cube_index = 0usize;
    for (bit, &v) in values.iter().enumerate() {
        if v < ISOLEVEL {
            cube_index |= 1 << bit;
        }
    }

    let edges = EDGE_TABLE[cube_index];
    if edges == 0 {
        return 0;
    }

    let corner = |i: usize| {
        let o = CORNER_OFFSETS[i];
        [
            origin[0] + o[0] as f32,
            origin[1] + o[1] as f32,
            origin[2] + o[2] as f32,
        ]
    };

    let mut crossings = [[0.0f32; 3]; 12];
    for (edge, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
        if edges & (1 << edge) != 0 {
            crossings[edge] = interpolate(corner(a), corner(b), values[a], values[b]);
        }
    }

    let mut emitted = 0;
    for tri in TRI_TABLE[cube_index].chunks_exact(3) {
        let &[first, second, third] = tri else {
            break;
        };
        if first < 0 {
            break;
        }
        // Reversed relative to the table for outward-facing normals.
        out.push(Triangle {
            positions: [
                crossings[third as usize],
                crossings[second as usize],
                crossings[first as usize],
            ],
            color,
        });
        emitted += 1;
    }
    emitted
}

/// Point on the edge `p1`–`p2` where the density crosses [`ISOLEVEL`].
///
/// Snaps to an endpoint when that endpoint sits on the isolevel or when the
/// two densities are too close to interpolate between.
fn interpolate(p1: [f32; 3], p2: [f32; 3], v1: f32, v2: f32) -> [f32; 3] {
    if (ISOLEVEL - v1).abs() < INTERP_EPSILON {
        return p1;
    }
    if (ISOLEVEL - v2).abs() < INTERP_EPSILON {
        return p2;
    }
    if (v1 - v2).abs() < INTERP_EPSILON {
        return p1;
    }
    let mu = (ISOLEVEL - v1) / (v2 - v1);
    [
        p1[0] + mu * (p2[0] - p1[0]),
        p1[1] + mu * (p2[1] - p1[1]),
        p1[2] + mu * (p2[2] - p1[2]),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
