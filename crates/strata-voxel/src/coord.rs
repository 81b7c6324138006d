//! Integer chunk coordinates and their canonical string keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunk_data::CHUNK_SIZE;
use crate::face::Face;

/// Separator between components of a chunk key.
pub const KEY_DELIMITER: char = ',';

/// Offsets of the seven forward neighbors (the +X/+Y/+Z octant).
///
/// Order: +X, +Y, +Z, +X+Z, +X+Y, +Y+Z, +X+Y+Z.
pub const FORWARD_OFFSETS: [(i32, i32, i32); 7] = [
    (1, 0, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 0),
    (0, 1, 1),
    (1, 1, 1),
];

/// Identifies a chunk's position on the integer chunk grid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Y coordinate.
    pub y: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

/// A chunk key string that does not parse back into three integers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkKeyError {
    /// The key did not have exactly three components.
    #[error("chunk key `{0}` must have three components")]
    ComponentCount(String),
    /// A component was not a valid integer.
    #[error("chunk key `{key}` has a non-integer component `{component}`")]
    BadComponent {
        /// The full key.
        key: String,
        /// The offending component.
        component: String,
    },
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate offset by `(dx, dy, dz)`.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Returns the neighbor sharing `face`.
    pub fn neighbor(self, face: Face) -> Self {
        let (dx, dy, dz) = face.step();
        self.offset(dx, dy, dz)
    }

    /// Returns the seven forward neighbors in [`FORWARD_OFFSETS`] order.
    pub fn forward_neighbors(self) -> [ChunkCoord; 7] {
        FORWARD_OFFSETS.map(|(dx, dy, dz)| self.offset(dx, dy, dz))
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// World-space position of the chunk's minimum corner.
    pub fn world_origin(self) -> [f32; 3] {
        let s = CHUNK_SIZE as f32;
        [self.x as f32 * s, self.y as f32 * s, self.z as f32 * s]
    }

    /// Chunk containing a world-space position, rounding each component of
    /// `pos / CHUNK_SIZE` to the nearest integer.
    pub fn from_world(pos: [f32; 3]) -> Self {
        let s = CHUNK_SIZE as f32;
        Self::new(
            (pos[0] / s).round() as i32,
            (pos[1] / s).round() as i32,
            (pos[2] / s).round() as i32,
        )
    }

    /// Canonical map key: the three components joined by [`KEY_DELIMITER`].
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.x, self.y, self.z
        )
    }
}

impl FromStr for ChunkCoord {
    type Err = ChunkKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let mut parts = key.split(KEY_DELIMITER);
        let mut next = || -> Result<i32, ChunkKeyError> {
            let component = parts
                .next()
                .ok_or_else(|| ChunkKeyError::ComponentCount(key.to_string()))?;
            component.trim().parse().map_err(|_| ChunkKeyError::BadComponent {
                key: key.to_string(),
                component: component.to_string(),
            })
        };
        let coord = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(ChunkKeyError::ComponentCount(key.to_string()));
        }
        Ok(coord)
    }
}
