use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use umbra_geom::{CHUNK_SIZE, Coords};
use umbra_voxel::VoxelData;

use crate::channel::LightChannel;
use crate::error::ChunkError;
use crate::mesh::ChunkMesh;

const S: usize = CHUNK_SIZE as usize;

/// Number of voxels in one chunk.
pub const CHUNK_VOLUME: usize = S * S * S;

fn zeroed_words() -> Box<[AtomicU32]> {
    (0..CHUNK_VOLUME).map(|_| AtomicU32::new(0)).collect()
}

fn zeroed_plane() -> Box<[AtomicU8]> {
    (0..CHUNK_VOLUME).map(|_| AtomicU8::new(0)).collect()
}

/// Dense `CHUNK_SIZE³` block of voxels plus one light plane per channel.
///
/// Cells are atomics read and written with relaxed ordering so the seven
/// lighting workers and the generator can share a chunk through `&self`.
/// Writers partition by chunk or by channel; no two threads race on the same
/// byte in practice.
pub struct VoxelChunk {
    coords: Coords,
    voxels: Box<[AtomicU32]>,
    light: [Box<[AtomicU8]>; LightChannel::COUNT],
    mesh: Mutex<Option<Arc<ChunkMesh>>>,
}

impl std::fmt::Debug for VoxelChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelChunk")
            .field("coords", &self.coords)
            .field("has_mesh", &self.mesh().is_some())
            .finish()
    }
}

impl VoxelChunk {
    pub fn new(coords: Coords) -> Self {
        Self {
            coords,
            voxels: zeroed_words(),
            light: std::array::from_fn(|_| zeroed_plane()),
            mesh: Mutex::new(None),
        }
    }

    #[inline]
    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Voxel-space coordinate of local cell (0,0,0).
    #[inline]
    pub fn origin(&self) -> Coords {
        Coords::local_to_volume(self.coords, Coords::ZERO)
    }

    #[inline]
    pub fn index(local: Coords) -> Option<usize> {
        if !local.in_chunk_bounds() {
            return None;
        }
        Some(local.x as usize + local.y as usize * S + local.z as usize * S * S)
    }

    #[inline]
    pub fn local_from_index(i: usize) -> Coords {
        Coords::new((i % S) as i32, ((i / S) % S) as i32, (i / (S * S)) as i32)
    }

    #[inline]
    pub fn voxel(&self, local: Coords) -> Option<VoxelData> {
        Self::index(local).map(|i| self.voxel_at_index(i))
    }

    #[inline]
    pub fn voxel_at_index(&self, i: usize) -> VoxelData {
        VoxelData::from_bits(self.voxels[i].load(Ordering::Relaxed))
    }

    /// Returns `false` when `local` lies outside the chunk.
    #[inline]
    pub fn set_voxel(&self, local: Coords, v: VoxelData) -> bool {
        match Self::index(local) {
            Some(i) => {
                self.voxels[i].store(v.to_bits(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Overwrites every voxel; `data` is in index order.
    pub fn fill_voxels(&self, data: &[VoxelData]) -> Result<(), ChunkError> {
        if data.len() != CHUNK_VOLUME {
            return Err(ChunkError::BufferLength {
                got: data.len(),
                expected: CHUNK_VOLUME,
            });
        }
        for (slot, v) in self.voxels.iter().zip(data) {
            slot.store(v.to_bits(), Ordering::Relaxed);
        }
        Ok(())
    }

    /// Snapshot of the voxel buffer in index order.
    pub fn raw_voxels(&self) -> Vec<VoxelData> {
        self.voxels
            .iter()
            .map(|w| VoxelData::from_bits(w.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn is_all_empty(&self) -> bool {
        self.voxels.iter().all(|w| w.load(Ordering::Relaxed) >> 16 == 0)
    }

    #[inline]
    pub fn light(&self, local: Coords, ch: LightChannel) -> Option<u8> {
        Self::index(local).map(|i| self.light_at_index(i, ch))
    }

    #[inline]
    pub fn light_at_index(&self, i: usize, ch: LightChannel) -> u8 {
        self.light[ch.index()][i].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_light(&self, local: Coords, ch: LightChannel, value: u8) -> bool {
        match Self::index(local) {
            Some(i) => {
                self.set_light_at_index(i, ch, value);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn set_light_at_index(&self, i: usize, ch: LightChannel, value: u8) {
        self.light[ch.index()][i].store(value, Ordering::Relaxed);
    }

    /// All seven channel values of one cell.
    pub fn light_sample(&self, local: Coords) -> Option<[u8; LightChannel::COUNT]> {
        let i = Self::index(local)?;
        Some(LightChannel::ALL.map(|ch| self.light_at_index(i, ch)))
    }

    pub fn light_plane(&self, ch: LightChannel) -> Vec<u8> {
        self.light[ch.index()]
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }

    pub fn clear_light(&self, ch: LightChannel) {
        for b in self.light[ch.index()].iter() {
            b.store(0, Ordering::Relaxed);
        }
    }

    pub fn mesh(&self) -> Option<Arc<ChunkMesh>> {
        self.mesh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replaces the mesh and returns the previous one. Inconsistent buffers
    /// are rejected and leave the current mesh in place.
    pub fn set_mesh(&self, mesh: ChunkMesh) -> Result<Option<Arc<ChunkMesh>>, ChunkError> {
        mesh.validate()?;
        let mut slot = self.mesh.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.replace(Arc::new(mesh)))
    }

    pub fn take_mesh(&self) -> Option<Arc<ChunkMesh>> {
        self.mesh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshPart;

    #[test]
    fn new_chunk_is_zeroed() {
        let c = VoxelChunk::new(Coords::new(1, -2, 3));
        assert!(c.is_all_empty());
        assert_eq!(c.light(Coords::new(5, 5, 5), LightChannel::Point), Some(0));
        assert_eq!(c.origin(), Coords::new(32, -64, 96));
        assert!(c.mesh().is_none());
    }

    #[test]
    fn out_of_bounds_accessors_miss() {
        let c = VoxelChunk::new(Coords::ZERO);
        assert_eq!(c.voxel(Coords::new(-1, 0, 0)), None);
        assert_eq!(c.light(Coords::new(0, 32, 0), LightChannel::Yp), None);
        assert!(!c.set_voxel(Coords::new(0, 0, 32), VoxelData::new(1, 0)));
        assert!(!c.set_light(Coords::new(32, 0, 0), LightChannel::Xp, 9));
    }

    #[test]
    fn channels_are_separate_planes() {
        let c = VoxelChunk::new(Coords::ZERO);
        let p = Coords::new(3, 4, 5);
        assert!(c.set_light(p, LightChannel::Zn, 200));
        assert_eq!(c.light(p, LightChannel::Zn), Some(200));
        for ch in LightChannel::ALL {
            if ch != LightChannel::Zn {
                assert_eq!(c.light(p, ch), Some(0));
            }
        }
        c.clear_light(LightChannel::Zn);
        assert_eq!(c.light(p, LightChannel::Zn), Some(0));
    }

    #[test]
    fn set_mesh_rejects_inconsistent_parts() {
        let c = VoxelChunk::new(Coords::ZERO);
        let mut mesh = ChunkMesh::new(Coords::ZERO);
        mesh.parts.insert(
            "stone".into(),
            MeshPart {
                pos: vec![0.0; 9],
                norm: vec![0.0; 9],
                uv: vec![0.0; 6],
                light: vec![0; 14],
                idx: vec![0, 1, 2],
            },
        );
        assert!(matches!(
            c.set_mesh(mesh.clone()),
            Err(ChunkError::MeshNotReady { .. })
        ));
        assert!(c.mesh().is_none());

        if let Some(part) = mesh.parts.get_mut("stone") {
            part.light = vec![0; 21];
        }
        assert!(c.set_mesh(mesh).unwrap().is_none());
        assert_eq!(c.mesh().map(|m| m.triangle_count()), Some(1));
        assert!(c.take_mesh().is_some());
        assert!(!c.has_mesh());
    }

    #[test]
    fn fill_voxels_checks_length() {
        let c = VoxelChunk::new(Coords::ZERO);
        assert_eq!(
            c.fill_voxels(&[VoxelData::EMPTY; 4]),
            Err(ChunkError::BufferLength {
                got: 4,
                expected: CHUNK_VOLUME
            })
        );
    }
}
