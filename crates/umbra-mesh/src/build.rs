use std::sync::Arc;
use std::time::Instant;

use umbra_chunk::{CHUNK_VOLUME, ChunkMesh, LightChannel, VoxelChunk};
use umbra_geom::{Face, Region, Vec3};
use umbra_voxel::Voxel;
use umbra_world::VoxelVolume;

use crate::quad::push_face;

/// Sample used where a face looks out of the volume: open sky on every sun
/// channel, no emitter light.
pub const OUTSIDE_LIGHT: [u8; LightChannel::COUNT] = [255, 255, 255, 255, 255, 255, 0];

#[inline]
fn face_visible(volume: &VoxelVolume, here: Voxel, there: Voxel) -> bool {
    if there.is_empty() {
        return true;
    }
    !volume.is_opaque(there) && there.ty != here.ty
}

/// Emits one quad per visible voxel face of `chunk`, grouped by skin.
///
/// Light is sampled once per face, from the cell the face looks into, and
/// the same seven-channel sample is written to all four of its vertices.
pub fn build_chunk_mesh(volume: &VoxelVolume, chunk: Arc<VoxelChunk>) -> ChunkMesh {
    let start = Instant::now();
    let coords = chunk.coords();
    let view = volume.view(chunk);
    let mut mesh = ChunkMesh::new(coords);
    let mut bounds = Region::empty();

    for i in 0..CHUNK_VOLUME {
        let d = view.chunk().voxel_at_index(i);
        if d.is_empty() {
            continue;
        }
        let here = volume.expand(d);
        let Some(ty) = volume.voxel_type(here) else {
            continue;
        };
        let local = VoxelChunk::local_from_index(i);
        let global = view.global(local);
        let origin = Vec3::new(global.x as f32, global.y as f32, global.z as f32);
        for face in Face::ALL {
            let n = local.step(face);
            if !face_visible(volume, here, view.voxel(n)) {
                continue;
            }
            let light = view.light_sample(n).unwrap_or(OUTSIDE_LIGHT);
            let part = mesh.parts.entry(ty.skin.clone()).or_default();
            push_face(part, face, origin, light);
            bounds.expand_to_include(global);
        }
    }
    mesh.bounds = bounds;
    log::trace!(
        target: "mesh",
        "chunk {} meshed: {} triangles in {:?}",
        coords,
        mesh.triangle_count(),
        start.elapsed()
    );
    mesh
}

