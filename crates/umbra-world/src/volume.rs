use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use umbra_chunk::{LightChannel, VoxelChunk};
use umbra_geom::{Coords, Region, Vec3};
use umbra_voxel::{Voxel, VoxelData, VoxelType, VoxelTypeIndex, VoxelTypeTable};

use crate::error::VolumeError;
use crate::raycast::{self, RayHit};
use crate::view::ChunkView;

struct RegionCache {
    region: Region,
    stale: bool,
}

/// Sparse map of chunks keyed by chunk coordinate.
///
/// Lock order is always `chunks` before `region`.
pub struct VoxelVolume {
    chunks: RwLock<HashMap<Coords, Arc<VoxelChunk>>>,
    types: Arc<VoxelTypeTable>,
    index: RwLock<VoxelTypeIndex>,
    region: Mutex<RegionCache>,
    disposed: AtomicBool,
}

/// Read guard over the chunk map. Structural changes wait until it drops.
pub struct ChunkGuard<'a> {
    map: RwLockReadGuard<'a, HashMap<Coords, Arc<VoxelChunk>>>,
}

impl<'a> ChunkGuard<'a> {
    pub fn iter(&self) -> hash_map::Iter<'_, Coords, Arc<VoxelChunk>> {
        self.map.iter()
    }

    pub fn get(&self, coords: Coords) -> Option<&Arc<VoxelChunk>> {
        self.map.get(&coords)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl VoxelVolume {
    pub fn new(types: Arc<VoxelTypeTable>) -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            types,
            index: RwLock::new(VoxelTypeIndex::new()),
            region: Mutex::new(RegionCache {
                region: Region::empty(),
                stale: false,
            }),
            disposed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn types(&self) -> &Arc<VoxelTypeTable> {
        &self.types
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<Coords, Arc<VoxelChunk>>> {
        self.chunks.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates a zeroed chunk at `coords`.
    pub fn add_chunk(&self, coords: Coords) -> Result<Arc<VoxelChunk>, VolumeError> {
        if self.is_disposed() {
            return Err(VolumeError::Disposed);
        }
        let mut map = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        let slot = match map.entry(coords) {
            hash_map::Entry::Occupied(_) => return Err(VolumeError::DuplicateChunk(coords)),
            hash_map::Entry::Vacant(v) => v,
        };
        let chunk = Arc::clone(slot.insert(Arc::new(VoxelChunk::new(coords))));
        let mut cache = self.region.lock().unwrap_or_else(PoisonError::into_inner);
        if !cache.stale {
            cache.region.expand_to_include(coords);
        }
        Ok(chunk)
    }

    pub fn remove_chunk(&self, coords: Coords) -> Option<Arc<VoxelChunk>> {
        let mut map = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        let removed = map.remove(&coords);
        if removed.is_some() {
            self.region
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .stale = true;
        }
        removed
    }

    /// Drops every chunk and refuses further additions. Workers holding a
    /// chunk handle keep it alive until they notice.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        let mut map = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        map.clear();
        let mut cache = self.region.lock().unwrap_or_else(PoisonError::into_inner);
        cache.region = Region::empty();
        cache.stale = false;
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn chunk(&self, coords: Coords) -> Option<Arc<VoxelChunk>> {
        self.read_map().get(&coords).cloned()
    }

    pub fn contains_chunk(&self, coords: Coords) -> bool {
        self.read_map().contains_key(&coords)
    }

    /// Chunk owning voxel-space `global`.
    pub fn chunk_containing(&self, global: Coords) -> Option<Arc<VoxelChunk>> {
        self.chunk(global.chunk_of())
    }

    pub fn chunk_count(&self) -> usize {
        self.read_map().len()
    }

    pub fn chunk_coords(&self) -> Vec<Coords> {
        let mut out: Vec<Coords> = self.read_map().keys().copied().collect();
        out.sort();
        out
    }

    pub fn enumerate(&self) -> ChunkGuard<'_> {
        ChunkGuard {
            map: self.read_map(),
        }
    }

    /// Chunk-space bounds of all chunks, recomputed lazily after a removal.
    pub fn region(&self) -> Region {
        let map = self.read_map();
        let mut cache = self.region.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.stale {
            let mut r = Region::empty();
            for c in map.keys() {
                r.expand_to_include(*c);
            }
            cache.region = r;
            cache.stale = false;
        }
        cache.region
    }

    pub fn voxel_region(&self) -> Region {
        self.region().voxel_region()
    }

    pub fn view(&self, chunk: Arc<VoxelChunk>) -> ChunkView<'_> {
        ChunkView::new(self, chunk)
    }

    #[inline]
    pub fn expand(&self, d: VoxelData) -> Voxel {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .expand(d)
    }

    /// Compact form of `v`, assigning a per-volume index on first use.
    pub fn compact(&self, v: Voxel) -> Result<VoxelData, VolumeError> {
        if let Some(d) = self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .compact(v)
        {
            return Ok(d);
        }
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        Ok(index.compact_or_insert(v)?)
    }

    pub fn type_index_entries(&self) -> Vec<(u16, umbra_voxel::VoxelTypeId)> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
    }

    pub fn voxel_type(&self, v: Voxel) -> Option<&VoxelType> {
        v.ty.and_then(|id| self.types.get(id))
    }

    #[inline]
    pub fn is_opaque(&self, v: Voxel) -> bool {
        self.types.is_opaque(v)
    }

    /// Empty when no chunk owns `global`.
    pub fn voxel_at(&self, global: Coords) -> Voxel {
        match self.chunk_containing(global) {
            Some(chunk) => chunk
                .voxel(global.local_in_chunk())
                .map(|d| self.expand(d))
                .unwrap_or(Voxel::EMPTY),
            None => Voxel::EMPTY,
        }
    }

    /// `Ok(false)` when no chunk owns `global`.
    pub fn set_voxel(&self, global: Coords, v: Voxel) -> Result<bool, VolumeError> {
        let Some(chunk) = self.chunk_containing(global) else {
            return Ok(false);
        };
        let d = self.compact(v)?;
        Ok(chunk.set_voxel(global.local_in_chunk(), d))
    }

    /// `None` is the NULL light: no chunk holds data for `global`.
    pub fn light_at(&self, global: Coords, ch: LightChannel) -> Option<u8> {
        self.chunk_containing(global)?
            .light(global.local_in_chunk(), ch)
    }

    pub fn set_light(&self, global: Coords, ch: LightChannel, value: u8) -> bool {
        match self.chunk_containing(global) {
            Some(chunk) => chunk.set_light(global.local_in_chunk(), ch, value),
            None => false,
        }
    }

    /// Steps a DDA ray through existing chunks until `hit` accepts a voxel
    /// or `range` is exhausted.
    pub fn raycast<F>(&self, origin: Vec3, dir: Vec3, range: f32, hit: F) -> Option<RayHit>
    where
        F: FnMut(Voxel) -> bool,
    {
        raycast::cast(self, origin, dir, range, hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume() -> VoxelVolume {
        VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()))
    }

    #[test]
    fn duplicate_add_fails_fast() {
        let v = volume();
        v.add_chunk(Coords::ZERO).unwrap();
        assert!(matches!(
            v.add_chunk(Coords::ZERO),
            Err(VolumeError::DuplicateChunk(c)) if c == Coords::ZERO
        ));
        assert_eq!(v.chunk_count(), 1);
    }

    #[test]
    fn region_recomputes_after_removal() {
        let v = volume();
        for c in [Coords::new(0, 0, 0), Coords::new(3, 1, 0), Coords::new(-2, 0, 5)] {
            v.add_chunk(c).unwrap();
        }
        assert_eq!(v.region(), Region::new(Coords::new(-2, 0, 0), Coords::new(4, 2, 6)));
        assert!(v.remove_chunk(Coords::new(3, 1, 0)).is_some());
        assert_eq!(v.region(), Region::new(Coords::new(-2, 0, 0), Coords::new(1, 1, 6)));
        assert!(v.remove_chunk(Coords::new(3, 1, 0)).is_none());
    }

    #[test]
    fn reads_outside_chunks_are_empty_and_null() {
        let v = volume();
        v.add_chunk(Coords::ZERO).unwrap();
        let outside = Coords::new(-1, 0, 0);
        assert_eq!(v.voxel_at(outside), Voxel::EMPTY);
        assert_eq!(v.light_at(outside, LightChannel::Yp), None);
        assert!(!v.set_light(outside, LightChannel::Yp, 5));
        let stone = v.types().require("stone").unwrap();
        assert!(!v.set_voxel(outside, Voxel::of(stone)).unwrap());
        assert_eq!(v.light_at(Coords::new(0, 0, 0), LightChannel::Yp), Some(0));
    }

    #[test]
    fn set_voxel_round_trips_through_index() {
        let v = volume();
        v.add_chunk(Coords::new(-1, -1, -1)).unwrap();
        let lamp = Voxel::with_data(v.types().require("lamp").unwrap(), 7);
        let at = Coords::new(-3, -32, -1);
        assert!(v.set_voxel(at, lamp).unwrap());
        assert_eq!(v.voxel_at(at), lamp);
        assert_eq!(v.type_index_entries().len(), 1);
    }

    #[test]
    fn dispose_refuses_new_chunks() {
        let v = volume();
        v.add_chunk(Coords::ZERO).unwrap();
        v.dispose();
        assert_eq!(v.chunk_count(), 0);
        assert!(matches!(v.add_chunk(Coords::ZERO), Err(VolumeError::Disposed)));
    }
}
