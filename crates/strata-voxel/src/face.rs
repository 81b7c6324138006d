//! The six faces of a chunk cube and compact sets of them.

use serde::{Deserialize, Serialize};

/// One of the six faces of a chunk.
///
/// The `repr(u8)` discriminant doubles as the bit index inside [`FaceSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Face {
    /// +X face (`x == CHUNK_SIZE - 1`).
    PosX = 0,
    /// −X face (`x == 0`).
    NegX = 1,
    /// +Y face (`y == CHUNK_SIZE - 1`), the top.
    PosY = 2,
    /// −Y face (`y == 0`), the bottom.
    NegY = 3,
    /// +Z face (`z == CHUNK_SIZE - 1`).
    PosZ = 4,
    /// −Z face (`z == 0`).
    NegZ = 5,
}

impl Face {
    /// All six faces in discriminant order.
    pub const ALL: [Face; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Unit step, in chunk coordinates, from a chunk to the neighbor sharing this face.
    pub fn step(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// Returns the opposite face.
    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Returns the face index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Bitmask over the six [`Face`] values.
///
/// Bit 0 = +X, Bit 1 = −X, Bit 2 = +Y, Bit 3 = −Y, Bit 4 = +Z, Bit 5 = −Z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceSet(pub u8);

impl FaceSet {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// All six faces.
    pub const ALL: Self = Self(0b0011_1111);

    /// Returns `true` if `face` is in the set.
    pub fn contains(self, face: Face) -> bool {
        self.0 & (1 << face as u8) != 0
    }

    /// Adds `face` to the set.
    pub fn insert(&mut self, face: Face) {
        self.0 |= 1 << face as u8;
    }

    /// Returns the set without `face`.
    pub fn without(self, face: Face) -> Self {
        Self(self.0 & !(1 << face as u8))
    }

    /// Returns the number of faces in the set (0–6).
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` if no face is in the set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the faces in the set in discriminant order.
    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
        }
    }

    #[test]
    fn test_steps_cancel_with_opposite() {
        for face in Face::ALL {
            let (x, y, z) = face.step();
            let (ox, oy, oz) = face.opposite().step();
            assert_eq!((x + ox, y + oy, z + oz), (0, 0, 0));
        }
    }

    #[test]
    fn test_insert_and_query() {
        let mut set = FaceSet::NONE;
        set.insert(Face::PosZ);
        assert!(set.contains(Face::PosZ));
        assert!(!set.contains(Face::NegZ));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_all_contains_every_face() {
        let mut set = FaceSet::NONE;
        for face in Face::ALL {
            set.insert(face);
        }
        assert_eq!(set, FaceSet::ALL);
        assert_eq!(FaceSet::ALL.iter().count(), 6);
    }

    #[test]
    fn test_without_removes_only_one() {
        let set = FaceSet::ALL.without(Face::NegY);
        assert_eq!(set.len(), 5);
        assert!(!set.contains(Face::NegY));
    }
}
