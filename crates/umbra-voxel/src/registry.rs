use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::config::{VoxelTypeDef, VoxelTypesConfig};
use super::error::TypeError;
use super::types::{Voxel, VoxelTypeId};

/// Immutable voxel descriptor. Owned by the table, referenced by `VoxelTypeId`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelType {
    pub id: VoxelTypeId,
    pub name: String,
    pub solid: bool,
    pub opaque: bool,
    pub skin: String,
    pub emission: Option<u8>,
}

impl VoxelType {
    #[inline]
    pub fn is_emitter(&self) -> bool {
        self.emission.is_some()
    }
}

/// Append-only arena of voxel types. Ids are dense and never reused.
#[derive(Default, Clone, Debug)]
pub struct VoxelTypeTable {
    types: Vec<VoxelType>,
    by_name: HashMap<String, VoxelTypeId>,
}

impl VoxelTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: VoxelTypeDef) -> Result<VoxelTypeId, TypeError> {
        if def.name.is_empty() {
            return Err(TypeError::EmptyName);
        }
        if self.by_name.contains_key(&def.name) {
            return Err(TypeError::DuplicateName(def.name));
        }
        let emission = match def.emission {
            None | Some(0) => None,
            Some(e) if e <= u8::MAX as u16 => Some(e as u8),
            Some(e) => {
                return Err(TypeError::BadEmission {
                    name: def.name,
                    emission: e,
                });
            }
        };
        let raw = u16::try_from(self.types.len()).map_err(|_| TypeError::TableFull(self.types.len()))?;
        let id = VoxelTypeId(raw);
        let solid = def.solid.unwrap_or(true);
        let ty = VoxelType {
            id,
            skin: def.skin.unwrap_or_else(|| def.name.clone()),
            name: def.name,
            solid,
            opaque: def.opaque.unwrap_or(solid),
            emission,
        };
        self.by_name.insert(ty.name.clone(), id);
        self.types.push(ty);
        Ok(id)
    }

    pub fn from_config(cfg: VoxelTypesConfig) -> Result<Self, TypeError> {
        let mut table = Self::new();
        for def in cfg.types {
            table.register(def)?;
        }
        Ok(table)
    }

    pub fn from_toml_str(src: &str) -> Result<Self, TypeError> {
        let cfg: VoxelTypesConfig = toml::from_str(src)?;
        Self::from_config(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TypeError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| TypeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Small default set used when no types file is configured.
    pub fn builtin() -> Self {
        let defs = vec![
            VoxelTypeDef::solid("stone"),
            VoxelTypeDef::solid("dirt"),
            VoxelTypeDef::solid("grass"),
            VoxelTypeDef::transparent("glass"),
            VoxelTypeDef::emitter("lamp", 240),
        ];
        let mut table = Self::new();
        for def in defs {
            let ok = table.register(def).is_ok();
            debug_assert!(ok, "builtin voxel types are valid");
        }
        table
    }

    #[inline]
    pub fn get(&self, id: VoxelTypeId) -> Option<&VoxelType> {
        self.types.get(id.index())
    }

    pub fn id_by_name(&self, name: &str) -> Option<VoxelTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<VoxelTypeId, TypeError> {
        self.id_by_name(name)
            .ok_or_else(|| TypeError::UnknownName(name.to_string()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoxelType> {
        self.types.iter()
    }

    /// Empty voxels and unknown ids are treated as open space.
    #[inline]
    pub fn is_opaque(&self, v: Voxel) -> bool {
        v.ty.and_then(|id| self.get(id)).map(|t| t.opaque).unwrap_or(false)
    }

    #[inline]
    pub fn is_solid(&self, v: Voxel) -> bool {
        v.ty.and_then(|id| self.get(id)).map(|t| t.solid).unwrap_or(false)
    }

    #[inline]
    pub fn emission(&self, v: Voxel) -> u8 {
        v.ty.and_then(|id| self.get(id)).and_then(|t| t.emission).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_solid_flag() {
        let mut table = VoxelTypeTable::new();
        let id = table
            .register(VoxelTypeDef {
                name: "mist".into(),
                solid: Some(false),
                opaque: None,
                skin: None,
                emission: None,
            })
            .unwrap();
        let ty = table.get(id).unwrap();
        assert!(!ty.solid);
        assert!(!ty.opaque);
        assert_eq!(ty.skin, "mist");
    }

    #[test]
    fn rejects_duplicates_and_bad_emission() {
        let mut table = VoxelTypeTable::new();
        table.register(VoxelTypeDef::solid("stone")).unwrap();
        assert!(matches!(
            table.register(VoxelTypeDef::solid("stone")),
            Err(TypeError::DuplicateName(_))
        ));
        assert!(matches!(
            table.register(VoxelTypeDef::emitter("sun", 300)),
            Err(TypeError::BadEmission { .. })
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn builtin_has_an_emitter() {
        let table = VoxelTypeTable::builtin();
        let lamp = table.require("lamp").unwrap();
        assert_eq!(table.emission(Voxel::of(lamp)), 240);
        assert!(!table.is_opaque(Voxel::of(table.require("glass").unwrap())));
        assert!(!table.is_opaque(Voxel::EMPTY));
    }
}
