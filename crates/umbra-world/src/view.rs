use std::sync::Arc;

use umbra_chunk::{LightChannel, VoxelChunk};
use umbra_geom::Coords;
use umbra_voxel::Voxel;

use crate::volume::VoxelVolume;

/// A chunk seen through its volume: local reads that fall outside the chunk
/// are translated to voxel space and answered by the neighbour.
pub struct ChunkView<'a> {
    volume: &'a VoxelVolume,
    chunk: Arc<VoxelChunk>,
}

impl<'a> ChunkView<'a> {
    pub fn new(volume: &'a VoxelVolume, chunk: Arc<VoxelChunk>) -> Self {
        Self { volume, chunk }
    }

    #[inline]
    pub fn chunk(&self) -> &Arc<VoxelChunk> {
        &self.chunk
    }

    #[inline]
    pub fn volume(&self) -> &'a VoxelVolume {
        self.volume
    }

    #[inline]
    pub fn global(&self, local: Coords) -> Coords {
        Coords::local_to_volume(self.chunk.coords(), local)
    }

    pub fn voxel(&self, local: Coords) -> Voxel {
        match self.chunk.voxel(local) {
            Some(d) => self.volume.expand(d),
            None => self.volume.voxel_at(self.global(local)),
        }
    }

    pub fn light(&self, local: Coords, ch: LightChannel) -> Option<u8> {
        match self.chunk.light(local, ch) {
            Some(l) => Some(l),
            None => self.volume.light_at(self.global(local), ch),
        }
    }

    /// All channels of one cell; `None` when no chunk holds it.
    pub fn light_sample(&self, local: Coords) -> Option<[u8; LightChannel::COUNT]> {
        if local.in_chunk_bounds() {
            return self.chunk.light_sample(local);
        }
        let global = self.global(local);
        let owner = self.volume.chunk_containing(global)?;
        owner.light_sample(global.local_in_chunk())
    }

    #[inline]
    pub fn is_opaque(&self, local: Coords) -> bool {
        self.volume.is_opaque(self.voxel(local))
    }
}
