//! Material records stored in chunk palettes, and the catalog that resolves
//! a [`MaterialId`] to its display color.
//!
//! A [`MaterialRecord`] is the unit of palette deduplication: two records with
//! the same content hash are the same palette entry. Air is always
//! `MaterialId(0)`.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identifier of a material in the [`MaterialCatalog`].
///
/// Distinct from [`crate::PaletteIndex`], which is local to one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

assert_eq_size!(MaterialId, u16);

impl MaterialId {
    /// The air material.
    pub const AIR: Self = Self(0);
    /// Debug material used when a catalog lookup misses.
    pub const MISSING: Self = Self(255);
}

/// A single value in a material's property bag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Free-form text.
    Text(String),
}

/// A palette entry: a catalog material plus per-voxel properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    material: MaterialId,
    properties: BTreeMap<String, PropertyValue>,
    hash: u64,
}

impl MaterialRecord {
    /// Creates a record and computes its content hash.
    pub fn new(material: MaterialId, properties: BTreeMap<String, PropertyValue>) -> Self {
        let hash = Self::content_hash(material, &properties);
        Self {
            material,
            properties,
            hash,
        }
    }

    /// A record with no properties.
    pub fn plain(material: MaterialId) -> Self {
        Self::new(material, BTreeMap::new())
    }

    /// The air record.
    pub fn air() -> Self {
        Self::plain(MaterialId::AIR)
    }

    /// Returns the catalog material.
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Returns the property bag.
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// Returns the content hash used for palette deduplication.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Returns `true` if this is the property-less air record.
    pub fn is_air(&self) -> bool {
        self.material == MaterialId::AIR && self.properties.is_empty()
    }

    fn content_hash(material: MaterialId, properties: &BTreeMap<String, PropertyValue>) -> u64 {
        let mut hasher = FxHasher::default();
        material.hash(&mut hasher);
        // BTreeMap iterates in key order, so equal bags hash equally.
        for (key, value) in properties {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Display metadata for a catalog material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Human-readable name (e.g. "grass", "stone").
    pub name: String,
    /// Vertex color, 0–255 per channel.
    pub color: [u8; 3],
}

/// Errors that can occur during material registration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The id is already taken.
    #[error("material id {0} is already registered")]
    DuplicateId(u16),
    /// A material with the same name has already been registered.
    #[error("duplicate material name: {0}")]
    DuplicateName(String),
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Maps [`MaterialId`] → [`MaterialDef`].
///
/// Built once at startup. Ids are chosen by the caller, so the catalog is
/// sparse (the default set uses 0–3 and 255).
#[derive(Clone, Debug)]
pub struct MaterialCatalog {
    defs: FxHashMap<MaterialId, MaterialDef>,
    name_to_id: FxHashMap<String, MaterialId>,
}

impl MaterialCatalog {
    /// Grass.
    pub const GRASS: MaterialId = MaterialId(1);
    /// Dirt.
    pub const DIRT: MaterialId = MaterialId(2);
    /// Stone.
    pub const STONE: MaterialId = MaterialId(3);

    /// Creates a catalog containing only air and the missing-material marker.
    pub fn new() -> Self {
        let mut catalog = Self {
            defs: FxHashMap::default(),
            name_to_id: FxHashMap::default(),
        };
        catalog.insert_unchecked(MaterialId::AIR, "air", [0, 0, 0]);
        catalog.insert_unchecked(MaterialId::MISSING, "missing", [255, 0, 255]);
        catalog
    }

    /// The built-in terrain palette: air, grass, dirt, stone, missing.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.insert_unchecked(Self::GRASS, "grass", [52, 207, 93]);
        catalog.insert_unchecked(Self::DIRT, "dirt", [102, 71, 49]);
        catalog.insert_unchecked(Self::STONE, "stone", [61, 61, 61]);
        catalog
    }

    /// Registers a material under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] or [`CatalogError::DuplicateName`]
    /// if either is already taken.
    pub fn register(&mut self, id: MaterialId, def: MaterialDef) -> Result<(), CatalogError> {
        if self.defs.contains_key(&id) {
            return Err(CatalogError::DuplicateId(id.0));
        }
        if self.name_to_id.contains_key(&def.name) {
            return Err(CatalogError::DuplicateName(def.name));
        }
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.insert(id, def);
        Ok(())
    }

    /// Returns the definition for `id`, if registered.
    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.defs.get(&id)
    }

    /// Returns the color for `id`, falling back to the missing-material color.
    pub fn color_or_missing(&self, id: MaterialId) -> [u8; 3] {
        match self.defs.get(&id) {
            Some(def) => def.color,
            None => {
                tracing::warn!(material = id.0, "material not in catalog");
                self.defs
                    .get(&MaterialId::MISSING)
                    .map_or([255, 0, 255], |def| def.color)
            }
        }
    }

    /// Returns the id for a named material, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the number of registered materials.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    fn insert_unchecked(&mut self, id: MaterialId, name: &str, color: [u8; 3]) {
        self.name_to_id.insert(name.to_string(), id);
        self.defs.insert(
            id,
            MaterialDef {
                name: name.to_string(),
                color,
            },
        );
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn wet_grass() -> MaterialRecord {
        let mut props = BTreeMap::new();
        props.insert("wet".to_string(), PropertyValue::Bool(true));
        MaterialRecord::new(MaterialCatalog::GRASS, props)
    }

    #[test]
    fn test_equal_records_hash_equal() {
        assert_eq!(wet_grass().hash(), wet_grass().hash());
        assert_eq!(
            MaterialRecord::plain(MaterialCatalog::STONE).hash(),
            MaterialRecord::plain(MaterialCatalog::STONE).hash()
        );
    }

    #[test]
    fn test_properties_change_hash() {
        assert_ne!(
            wet_grass().hash(),
            MaterialRecord::plain(MaterialCatalog::GRASS).hash()
        );
        assert_ne!(
            MaterialRecord::plain(MaterialCatalog::GRASS).hash(),
            MaterialRecord::plain(MaterialCatalog::DIRT).hash()
        );
    }

    #[test]
    fn test_air_record_is_air() {
        assert!(MaterialRecord::air().is_air());
        assert!(!wet_grass().is_air());
        let mut props = BTreeMap::new();
        props.insert("tint".to_string(), PropertyValue::Int(3));
        assert!(!MaterialRecord::new(MaterialId::AIR, props).is_air());
    }

    #[test]
    fn test_default_catalog_colors() {
        let catalog = MaterialCatalog::with_defaults();
        assert_eq!(catalog.get(MaterialCatalog::GRASS).map(|d| d.color), Some([52, 207, 93]));
        assert_eq!(catalog.lookup_by_name("stone"), Some(MaterialCatalog::STONE));
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_unknown_material_uses_missing_color() {
        let catalog = MaterialCatalog::with_defaults();
        assert_eq!(catalog.color_or_missing(MaterialId(42)), [255, 0, 255]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut catalog = MaterialCatalog::new();
        let sand = MaterialDef {
            name: "sand".to_string(),
            color: [230, 210, 150],
        };
        catalog.register(MaterialId(7), sand.clone()).expect("first registration");
        assert!(matches!(
            catalog.register(MaterialId(7), sand.clone()),
            Err(CatalogError::DuplicateId(7))
        ));
        assert!(matches!(
            catalog.register(MaterialId(8), sand),
            Err(CatalogError::DuplicateName(_))
        ));
    }
}
