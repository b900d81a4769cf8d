use std::collections::HashMap;

use rayon::prelude::*;
use umbra_chunk::{LightChannel, VoxelChunk};
use umbra_geom::{CHUNK_SIZE, Coords, Face};
use umbra_world::VoxelVolume;

use crate::channel::MAX_LIGHT;
use crate::cursor::TypeLookup;
use crate::engine::LightPropagator;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub sun_cells: usize,
    pub emitters: usize,
}

#[inline]
fn cross_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// First chunk met per column when entering the volume through `face`.
pub(crate) fn outermost_chunks(coords: &[Coords], face: Face) -> Vec<Coords> {
    let axis = face.axis();
    let mut columns: HashMap<Coords, Coords> = HashMap::new();
    for &c in coords {
        let key = c.with_axis(axis, 0);
        columns
            .entry(key)
            .and_modify(|best| {
                let further = if face.is_positive() {
                    c.axis(axis) > best.axis(axis)
                } else {
                    c.axis(axis) < best.axis(axis)
                };
                if further {
                    *best = c;
                }
            })
            .or_insert(c);
    }
    let mut out: Vec<Coords> = columns.into_values().collect();
    out.sort();
    out
}

/// Local cells of the chunk layer facing `face`.
pub(crate) fn face_layer(face: Face) -> impl Iterator<Item = Coords> {
    let axis = face.axis();
    let layer = if face.is_positive() { CHUNK_SIZE - 1 } else { 0 };
    let (b, c) = cross_axes(axis);
    (0..CHUNK_SIZE).flat_map(move |v| {
        (0..CHUNK_SIZE).map(move |u| Coords::ZERO.with_axis(axis, layer).with_axis(b, u).with_axis(c, v))
    })
}

/// Whether voxel `global` sits on the sun-facing layer of the outermost
/// chunk of its column for `face`.
pub(crate) fn on_sun_boundary(volume: &VoxelVolume, global: Coords, face: Face) -> bool {
    let axis = face.axis();
    let local = global.local_in_chunk();
    let layer = if face.is_positive() { CHUNK_SIZE - 1 } else { 0 };
    if local.axis(axis) != layer {
        return false;
    }
    let chunk = global.chunk_of();
    if !volume.contains_chunk(chunk) {
        return false;
    }
    let key = chunk.with_axis(axis, 0);
    !volume.chunk_coords().into_iter().any(|c| {
        c.with_axis(axis, 0) == key
            && if face.is_positive() {
                c.axis(axis) > chunk.axis(axis)
            } else {
                c.axis(axis) < chunk.axis(axis)
            }
    })
}

fn emitters_in(chunk: &VoxelChunk, types: &TypeLookup) -> Vec<(Coords, u8)> {
    (0..umbra_chunk::CHUNK_VOLUME)
        .filter_map(|i| {
            let e = types.emission(chunk.voxel_at_index(i));
            (e > 0).then(|| (VoxelChunk::local_from_index(i), e))
        })
        .collect()
}

impl LightPropagator {
    /// Writes sunlight on every outward boundary and emitter light at every
    /// emitting voxel, queueing all of it. Call `run` afterwards.
    pub fn seed_volume(&mut self, volume: &VoxelVolume) -> SeedStats {
        let types = TypeLookup::new(volume);
        let coords = volume.chunk_coords();
        let mut stats = SeedStats::default();

        for ch in LightChannel::SUN {
            let Some(face) = ch.sun_face() else {
                continue;
            };
            let prop = self.channel_mut(ch);
            for c in outermost_chunks(&coords, face) {
                let Some(chunk) = volume.chunk(c) else {
                    continue;
                };
                for local in face_layer(face) {
                    let open = chunk
                        .voxel(local)
                        .is_some_and(|d| !types.is_opaque(d));
                    if open && prop.seed_cell(&chunk, local, MAX_LIGHT) {
                        stats.sun_cells += 1;
                    }
                }
            }
        }

        let found: Vec<(Coords, Vec<(Coords, u8)>)> = coords
            .par_iter()
            .filter_map(|c| {
                let chunk = volume.chunk(*c)?;
                let list = emitters_in(&chunk, &types);
                (!list.is_empty()).then_some((*c, list))
            })
            .collect();
        let point = self.channel_mut(LightChannel::Point);
        for (c, list) in found {
            let Some(chunk) = volume.chunk(c) else {
                continue;
            };
            for (local, level) in list {
                if point.seed_cell(&chunk, local, level) {
                    stats.emitters += 1;
                }
            }
        }
        stats
    }
}
