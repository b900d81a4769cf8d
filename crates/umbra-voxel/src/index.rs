use std::collections::HashMap;

use super::error::TypeError;
use super::types::{Voxel, VoxelData, VoxelTypeId};

/// Per-volume forward/reverse map between type handles and compact indices.
///
/// Index 0 is reserved for "no type" and never maps to a handle.
#[derive(Clone, Debug)]
pub struct VoxelTypeIndex {
    forward: HashMap<VoxelTypeId, u16>,
    reverse: Vec<Option<VoxelTypeId>>,
}

impl Default for VoxelTypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelTypeIndex {
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: vec![None],
        }
    }

    /// Rebuilds an index from persisted `(index, type)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (u16, VoxelTypeId)>) -> Self {
        let mut idx = Self::new();
        for (i, id) in entries {
            if i == 0 {
                continue;
            }
            let slot = i as usize;
            if idx.reverse.len() <= slot {
                idx.reverse.resize(slot + 1, None);
            }
            idx.reverse[slot] = Some(id);
            idx.forward.insert(id, i);
        }
        idx
    }

    #[inline]
    pub fn index_of(&self, id: VoxelTypeId) -> Option<u16> {
        self.forward.get(&id).copied()
    }

    pub fn get_or_insert(&mut self, id: VoxelTypeId) -> Result<u16, TypeError> {
        if let Some(i) = self.index_of(id) {
            return Ok(i);
        }
        let i = u16::try_from(self.reverse.len()).map_err(|_| TypeError::IndexFull(self.reverse.len()))?;
        self.reverse.push(Some(id));
        self.forward.insert(id, i);
        Ok(i)
    }

    /// A missing entry is a lookup miss, not an error.
    #[inline]
    pub fn resolve(&self, index: u16) -> Option<VoxelTypeId> {
        self.reverse.get(index as usize).copied().flatten()
    }

    pub fn expand(&self, d: VoxelData) -> Voxel {
        Voxel {
            ty: self.resolve(d.type_index),
            data: d.data,
        }
    }

    /// Compact form of `v`, or `None` if its type has no index yet.
    pub fn compact(&self, v: Voxel) -> Option<VoxelData> {
        match v.ty {
            None => Some(VoxelData::new(0, v.data)),
            Some(id) => self.index_of(id).map(|i| VoxelData::new(i, v.data)),
        }
    }

    pub fn compact_or_insert(&mut self, v: Voxel) -> Result<VoxelData, TypeError> {
        match v.ty {
            None => Ok(VoxelData::new(0, v.data)),
            Some(id) => Ok(VoxelData::new(self.get_or_insert(id)?, v.data)),
        }
    }

    /// `(index, type)` pairs in index order, for persistence.
    pub fn entries(&self) -> Vec<(u16, VoxelTypeId)> {
        self.reverse
            .iter()
            .enumerate()
            .filter_map(|(i, id)| id.map(|id| (i as u16, id)))
            .collect()
    }

    /// Number of assigned indices, excluding the reserved slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
