use umbra_chunk::{LightChannel, MeshPart};
use umbra_geom::{Face, Vec3};

/// Corners of the unit face of the cell at `origin`, counter-clockwise seen
/// from outside.
pub fn face_corners(face: Face, origin: Vec3) -> [Vec3; 4] {
    let o = origin;
    let v = |dx: f32, dy: f32, dz: f32| Vec3::new(o.x + dx, o.y + dy, o.z + dz);
    match face {
        Face::PosY => [v(0.0, 1.0, 0.0), v(0.0, 1.0, 1.0), v(1.0, 1.0, 1.0), v(1.0, 1.0, 0.0)],
        Face::NegY => [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 0.0, 1.0), v(0.0, 0.0, 1.0)],
        Face::PosX => [v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, 1.0), v(1.0, 0.0, 1.0)],
        Face::NegX => [v(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0), v(0.0, 1.0, 1.0), v(0.0, 1.0, 0.0)],
        Face::PosZ => [v(0.0, 0.0, 1.0), v(1.0, 0.0, 1.0), v(1.0, 1.0, 1.0), v(0.0, 1.0, 1.0)],
        Face::NegZ => [v(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0)],
    }
}

#[inline]
fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(a.y * b.z - a.z * b.y, a.z * b.x - a.x * b.z, a.x * b.y - a.y * b.x)
}

/// Appends one face as two triangles. Winding is flipped if it disagrees
/// with the face normal.
pub fn push_face(part: &mut MeshPart, face: Face, origin: Vec3, light: [u8; LightChannel::COUNT]) {
    let n = face.normal();
    let mut vs = face_corners(face, origin);
    let mut uvs = [(0.0f32, 0.0f32), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    if cross(vs[1] - vs[0], vs[2] - vs[0]).dot(n) < 0.0 {
        vs.swap(1, 3);
        uvs.swap(1, 3);
    }
    let base = part.vertex_count() as u32;
    for (p, uv) in vs.iter().zip(uvs) {
        part.pos.extend_from_slice(&[p.x, p.y, p.z]);
        part.norm.extend_from_slice(&[n.x, n.y, n.z]);
        part.uv.extend_from_slice(&[uv.0, uv.1]);
        part.light.extend_from_slice(&light);
    }
    part.idx
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winding_matches_normal_on_every_face() {
        for face in Face::ALL {
            let mut part = MeshPart::default();
            push_face(&mut part, face, Vec3::ZERO, [0; 7]);
            assert_eq!(part.vertex_count(), 4);
            let p = |i: usize| {
                let k = part.idx[i] as usize * 3;
                Vec3::new(part.pos[k], part.pos[k + 1], part.pos[k + 2])
            };
            let c = cross(p(1) - p(0), p(2) - p(0));
            assert!(c.dot(face.normal()) > 0.0, "{face:?}");
        }
    }
}
