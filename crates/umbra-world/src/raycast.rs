use std::sync::Arc;

use umbra_chunk::VoxelChunk;
use umbra_geom::{Coords, Face, Vec3};
use umbra_voxel::Voxel;

use crate::volume::VoxelVolume;

#[derive(Clone, Debug)]
pub struct RayHit {
    pub voxel: Voxel,
    /// Voxel-space cell that was hit.
    pub coords: Coords,
    /// Cell the ray was in before entering `coords`.
    pub previous: Coords,
    pub chunk: Arc<VoxelChunk>,
    /// Face of the hit cell the ray entered through.
    pub normal: Face,
    pub distance: f32,
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::INFINITY } else { 1.0 / v.abs() }
}

pub(crate) fn cast<F>(
    volume: &VoxelVolume,
    origin: Vec3,
    dir: Vec3,
    range: f32,
    mut hit: F,
) -> Option<RayHit>
where
    F: FnMut(Voxel) -> bool,
{
    if dir.length() < 1e-6 {
        return None;
    }
    let d = dir.normalized();
    let base = origin.floor();
    let mut cell = Coords::new(base.x as i32, base.y as i32, base.z as i32);

    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for a in 0..3 {
        let da = d.axis(a);
        let frac = origin.axis(a) - base.axis(a);
        let inv = inv_or_max(da);
        if da > 0.0 {
            step[a] = 1;
            t_delta[a] = inv;
            t_max[a] = (1.0 - frac) * inv;
        } else if da < 0.0 {
            step[a] = -1;
            t_delta[a] = inv;
            t_max[a] = frac * inv;
        }
    }

    loop {
        let axis = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] { 0 } else { 2 }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };
        if step[axis] == 0 {
            return None;
        }
        let previous = cell;
        cell = cell.with_axis(axis, cell.axis(axis) + step[axis]);
        let distance = t_max[axis];
        t_max[axis] += t_delta[axis];
        if distance >= range {
            return None;
        }
        let Some(chunk) = volume.chunk_containing(cell) else {
            continue;
        };
        let voxel = chunk
            .voxel(cell.local_in_chunk())
            .map(|v| volume.expand(v))
            .unwrap_or(Voxel::EMPTY);
        if hit(voxel) {
            let entered = Face::from_delta(previous - cell).unwrap_or(Face::PosY);
            return Some(RayHit {
                voxel,
                coords: cell,
                previous,
                chunk,
                normal: entered,
                distance,
            });
        }
    }
}
