use std::sync::Arc;

use umbra_chunk::VoxelChunk;
use umbra_geom::Coords;
use umbra_voxel::VoxelData;
use umbra_world::VoxelVolume;

/// Per-index opacity and emission, snapshotted from the volume's type index.
pub(crate) struct TypeLookup {
    opaque: Vec<bool>,
    emission: Vec<u8>,
}

impl TypeLookup {
    pub(crate) fn new(volume: &VoxelVolume) -> Self {
        let entries = volume.type_index_entries();
        let len = entries.iter().map(|(i, _)| *i as usize + 1).max().unwrap_or(1);
        let mut opaque = vec![false; len];
        let mut emission = vec![0u8; len];
        for (i, id) in entries {
            if let Some(ty) = volume.types().get(id) {
                opaque[i as usize] = ty.opaque;
                emission[i as usize] = ty.emission.unwrap_or(0);
            }
        }
        Self { opaque, emission }
    }

    #[inline]
    pub(crate) fn is_opaque(&self, d: VoxelData) -> bool {
        self.opaque.get(d.type_index as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub(crate) fn emission(&self, d: VoxelData) -> u8 {
        self.emission.get(d.type_index as usize).copied().unwrap_or(0)
    }
}

/// Light-relevant properties of one cell's voxel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CellInfo {
    pub(crate) opaque: bool,
    pub(crate) emission: u8,
}

/// Voxel-space accessor that remembers the last chunk it resolved.
pub(crate) struct ChunkCursor<'a> {
    volume: &'a VoxelVolume,
    types: &'a TypeLookup,
    cached: Option<Arc<VoxelChunk>>,
}

impl<'a> ChunkCursor<'a> {
    pub(crate) fn new(volume: &'a VoxelVolume, types: &'a TypeLookup) -> Self {
        Self {
            volume,
            types,
            cached: None,
        }
    }

    /// Runs `f` on the chunk holding `global`, its cell index and the cell's
    /// voxel properties. `None` when no chunk exists there.
    #[inline]
    pub(crate) fn with_cell<R>(
        &mut self,
        global: Coords,
        f: impl FnOnce(&VoxelChunk, usize, CellInfo) -> R,
    ) -> Option<R> {
        let key = global.chunk_of();
        if self.cached.as_ref().map(|c| c.coords()) != Some(key) {
            self.cached = self.volume.chunk(key);
        }
        let chunk = self.cached.as_deref()?;
        let i = VoxelChunk::index(global.local_in_chunk())?;
        let d = chunk.voxel_at_index(i);
        let info = CellInfo {
            opaque: self.types.is_opaque(d),
            emission: self.types.emission(d),
        };
        Some(f(chunk, i, info))
    }
}
