//! Dense density/material storage for 32×32×32 voxel volumes.
//!
//! Each voxel holds an `f32` density and a `u8` index into the chunk's
//! palette of [`MaterialRecord`]s. New materials are queued as pending
//! entries and committed by [`ChunkData::flush`], which also garbage-collects
//! palette entries no voxel references anymore.
//!
//! Voxels are laid out with Z varying fastest:
//! `index = x * CHUNK_SIZE² + y * CHUNK_SIZE + z`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use static_assertions::{assert_eq_size, const_assert_eq};

use crate::error::StoreError;
use crate::material::MaterialRecord;
use crate::rle::FrozenRuns;

/// Side length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 32;

/// Number of voxels in one chunk layer (32²).
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Total number of voxels in a chunk (32³).
pub const CHUNK_VOLUME: usize = CHUNK_AREA * CHUNK_SIZE;

/// Density at or above which a voxel is solid.
pub const ISOLEVEL: f32 = 0.5;

/// Maximum number of palette entries a `u8` index can address.
const MAX_PALETTE: usize = u8::MAX as usize + 1;

// The bit tricks in `position_of` rely on a power-of-two size.
const_assert_eq!(CHUNK_SIZE, 1 << 5);

/// Index into one chunk's palette.
///
/// Distinct from [`crate::MaterialId`], which indexes the global catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaletteIndex(pub u8);

assert_eq_size!(PaletteIndex, u8);

impl PaletteIndex {
    /// Palette slot reserved for air in a fresh chunk.
    pub const AIR: Self = Self(0);
}

/// Voxel arrays in either their dense or their run-length encoded form.
#[derive(Clone, Debug)]
enum Voxels {
    Dense {
        densities: Vec<f32>,
        materials: Vec<u8>,
    },
    Frozen {
        densities: FrozenRuns<f32>,
        materials: FrozenRuns<u8>,
    },
}

/// Density and material storage for a 32×32×32 chunk.
///
/// While frozen, every voxel and palette accessor returns
/// [`StoreError::Frozen`]; only [`freeze`](Self::freeze),
/// [`unfreeze`](Self::unfreeze), and [`is_frozen`](Self::is_frozen) work.
#[derive(Clone, Debug)]
pub struct ChunkData {
    voxels: Voxels,
    /// Committed palette; position is the palette index.
    palette: Vec<MaterialRecord>,
    /// Content hash → committed palette index.
    palette_reverse: FxHashMap<u64, PaletteIndex>,
    /// Materials written since the last flush, in first-use order.
    pending: Vec<MaterialRecord>,
    /// Content hash → position in `pending`.
    pending_lookup: FxHashMap<u64, usize>,
}

impl ChunkData {
    /// Creates an all-air chunk: zero density everywhere, palette `[air]`.
    pub fn new() -> Self {
        let air = MaterialRecord::air();
        let mut palette_reverse = FxHashMap::default();
        palette_reverse.insert(air.hash(), PaletteIndex::AIR);
        Self {
            voxels: Voxels::Dense {
                densities: vec![0.0; CHUNK_VOLUME],
                materials: vec![PaletteIndex::AIR.0; CHUNK_VOLUME],
            },
            palette: vec![air],
            palette_reverse,
            pending: Vec::new(),
            pending_lookup: FxHashMap::default(),
        }
    }

    /// Converts a local position to a linear voxel index.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if any component is `>= CHUNK_SIZE`.
    pub fn index_of(x: usize, y: usize, z: usize) -> Result<usize, StoreError> {
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return Err(StoreError::IndexOutOfRange { x, y, z });
        }
        Ok(x * CHUNK_AREA + y * CHUNK_SIZE + z)
    }

    /// Inverse of [`index_of`](Self::index_of): `(idx / 32², (idx / 32) % 32, idx % 32)`.
    pub fn position_of(index: usize) -> (usize, usize, usize) {
        (index >> 10, (index >> 5) & 31, index & 31)
    }

    /// Writes one voxel.
    ///
    /// `material` resolves to an existing palette entry, an existing pending
    /// entry, or a new pending entry; the palette itself is not touched until
    /// [`flush`](Self::flush).
    pub fn set_voxel(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        density: f32,
        material: &MaterialRecord,
    ) -> Result<(), StoreError> {
        if self.is_frozen() {
            return Err(StoreError::Frozen);
        }
        let index = Self::index_of(x, y, z)?;
        let slot = self.resolve_slot(material)?;

        let (densities, materials) = self.dense_mut()?;
        densities[index] = density;
        materials[index] = slot;
        Ok(())
    }

    /// Commits pending materials and compacts the palette to the entries in use.
    ///
    /// Runs in O(volume + palette size). Voxel indices are renumbered so the
    /// surviving entries are contiguous from 0; each voxel keeps its material.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.is_frozen() {
            return Err(StoreError::Frozen);
        }

        // Commit pending entries at the indices set_voxel already handed out.
        for record in self.pending.drain(..) {
            let index = PaletteIndex(self.palette.len() as u8);
            self.palette_reverse.insert(record.hash(), index);
            self.palette.push(record);
        }
        self.pending_lookup.clear();

        let Voxels::Dense { materials, .. } = &mut self.voxels else {
            return Err(StoreError::Frozen);
        };

        // Mark.
        let mut used = [false; MAX_PALETTE];
        for &m in materials.iter() {
            used[m as usize] = true;
        }

        // Compact.
        let mut remap = [None::<u8>; MAX_PALETTE];
        let mut palette = Vec::with_capacity(self.palette.len());
        let mut palette_reverse = FxHashMap::default();
        for (old, record) in std::mem::take(&mut self.palette).into_iter().enumerate() {
            if used[old] {
                let new = palette.len() as u8;
                remap[old] = Some(new);
                palette_reverse.insert(record.hash(), PaletteIndex(new));
                palette.push(record);
            }
        }

        // Rewrite; anything unmapped falls back to slot 0.
        for m in materials.iter_mut() {
            *m = remap[*m as usize].unwrap_or(0);
        }

        tracing::trace!(palette = palette.len(), "flushed chunk palette");
        self.palette = palette;
        self.palette_reverse = palette_reverse;
        Ok(())
    }

    /// `true` iff the palette holds at most one entry, that entry is air, and
    /// nothing is pending.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        if self.is_frozen() {
            return Err(StoreError::Frozen);
        }
        Ok(self.pending.is_empty()
            && self.palette.len() <= 1
            && self.palette.first().is_none_or(MaterialRecord::is_air))
    }

    /// `true` iff the chunk is not empty and every density is exactly `1.0`.
    pub fn is_filled(&self) -> Result<bool, StoreError> {
        if self.is_empty()? {
            return Ok(false);
        }
        let (densities, _) = self.dense()?;
        Ok(densities.iter().all(|&d| d == 1.0))
    }

    /// Replaces the dense arrays with their run-length encoding.
    pub fn freeze(&mut self) -> Result<(), StoreError> {
        let Voxels::Dense {
            densities,
            materials,
        } = &self.voxels
        else {
            return Err(StoreError::AlreadyFrozen);
        };
        let frozen = Voxels::Frozen {
            densities: FrozenRuns::encode(densities),
            materials: FrozenRuns::encode(materials),
        };
        // Dropping the dense variant releases its buffers.
        self.voxels = frozen;
        Ok(())
    }

    /// Restores the dense arrays from the run-length encoding.
    pub fn unfreeze(&mut self) -> Result<(), StoreError> {
        let Voxels::Frozen {
            densities,
            materials,
        } = &self.voxels
        else {
            return Err(StoreError::NotFrozen);
        };
        let dense = Voxels::Dense {
            densities: densities.decode(CHUNK_VOLUME)?,
            materials: materials.decode(CHUNK_VOLUME)?,
        };
        self.voxels = dense;
        Ok(())
    }

    /// Returns `true` while the voxel arrays are run-length encoded.
    pub fn is_frozen(&self) -> bool {
        matches!(self.voxels, Voxels::Frozen { .. })
    }

    /// Density at a local position.
    pub fn density_at(&self, x: usize, y: usize, z: usize) -> Result<f32, StoreError> {
        let (densities, _) = self.dense()?;
        Ok(densities[Self::index_of(x, y, z)?])
    }

    /// Density at a linear index.
    pub fn density_at_index(&self, index: usize) -> Result<f32, StoreError> {
        let (densities, _) = self.dense()?;
        densities.get(index).copied().ok_or_else(|| {
            let (x, y, z) = Self::position_of(index);
            StoreError::IndexOutOfRange { x, y, z }
        })
    }

    /// Raw palette index stored at a local position.
    ///
    /// Between a write and the next flush this may point past the committed
    /// palette, at a pending entry.
    pub fn material_at(&self, x: usize, y: usize, z: usize) -> Result<PaletteIndex, StoreError> {
        let (_, materials) = self.dense()?;
        Ok(PaletteIndex(materials[Self::index_of(x, y, z)?]))
    }

    /// Committed palette entry for `index`, or `None` if there is none.
    pub fn material_record(&self, index: PaletteIndex) -> Result<Option<&MaterialRecord>, StoreError> {
        if self.is_frozen() {
            return Err(StoreError::Frozen);
        }
        Ok(self.palette.get(index.0 as usize))
    }

    /// The material record a voxel refers to, looking through pending entries
    /// for voxels written since the last flush.
    pub fn resolved_material_at(
        &self,
        x: usize,
        y: usize,
        z: usize,
    ) -> Result<Option<&MaterialRecord>, StoreError> {
        let slot = self.material_at(x, y, z)?.0 as usize;
        Ok(match slot.checked_sub(self.palette.len()) {
            None => self.palette.get(slot),
            Some(pending) => self.pending.get(pending),
        })
    }

    /// Both dense arrays, for bulk reads.
    pub fn dense(&self) -> Result<(&[f32], &[u8]), StoreError> {
        match &self.voxels {
            Voxels::Dense {
                densities,
                materials,
            } => Ok((densities, materials)),
            Voxels::Frozen { .. } => Err(StoreError::Frozen),
        }
    }

    /// Number of committed palette entries.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    /// Number of materials awaiting a flush.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of runs in the frozen encoding (densities, materials), if frozen.
    pub fn frozen_runs(&self) -> Option<(usize, usize)> {
        match &self.voxels {
            Voxels::Frozen {
                densities,
                materials,
            } => Some((densities.run_count(), materials.run_count())),
            Voxels::Dense { .. } => None,
        }
    }

    /// Approximate heap bytes used by voxel storage in its current form.
    pub fn memory_bytes(&self) -> usize {
        match &self.voxels {
            Voxels::Dense {
                densities,
                materials,
            } => {
                densities.capacity() * std::mem::size_of::<f32>()
                    + materials.capacity() * std::mem::size_of::<u8>()
            }
            Voxels::Frozen {
                densities,
                materials,
            } => densities.byte_len() + materials.byte_len(),
        }
    }

    fn dense_mut(&mut self) -> Result<(&mut [f32], &mut [u8]), StoreError> {
        match &mut self.voxels {
            Voxels::Dense {
                densities,
                materials,
            } => Ok((densities, materials)),
            Voxels::Frozen { .. } => Err(StoreError::Frozen),
        }
    }

    /// Finds the slot a material should be written with, queueing it if new.
    fn resolve_slot(&mut self, material: &MaterialRecord) -> Result<u8, StoreError> {
        let hash = material.hash();
        if let Some(&index) = self.palette_reverse.get(&hash) {
            return Ok(index.0);
        }
        if let Some(&position) = self.pending_lookup.get(&hash) {
            return Ok((self.palette.len() + position) as u8);
        }

        let slot = self.palette.len() + self.pending.len();
        if slot >= MAX_PALETTE {
            return Err(StoreError::PaletteFull { distinct: slot });
        }
        self.pending_lookup.insert(hash, self.pending.len());
        self.pending.push(material.clone());
        Ok(slot as u8)
    }
}

impl Default for ChunkData {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
