use umbra_geom::{CHUNK_SIZE, Coords, Face};
use umbra_world::VoxelVolume;

/// Chunks whose geometry depends on the voxel at `global`: its own chunk, and
/// for an edit on a chunk face, the existing chunk across that face.
pub fn affected_chunks(volume: &VoxelVolume, global: Coords) -> Vec<Coords> {
    let chunk = global.chunk_of();
    let local = global.local_in_chunk();
    let mut out = vec![chunk];
    for face in Face::ALL {
        let l = local.axis(face.axis());
        let on_face = if face.is_positive() {
            l == CHUNK_SIZE - 1
        } else {
            l == 0
        };
        if !on_face {
            continue;
        }
        let n = chunk.step(face);
        if volume.contains_chunk(n) {
            out.push(n);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use umbra_voxel::VoxelTypeTable;

    fn volume() -> VoxelVolume {
        let v = VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()));
        for x in -1..=1 {
            for y in -1..=1 {
                v.add_chunk(Coords::new(x, y, 0)).unwrap();
            }
        }
        v
    }

    #[test]
    fn interior_edit_touches_one_chunk() {
        let v = volume();
        assert_eq!(affected_chunks(&v, Coords::new(5, 5, 5)), vec![Coords::ZERO]);
    }

    #[test]
    fn top_face_edit_includes_upper_neighbour() {
        let v = volume();
        let mut got = affected_chunks(&v, Coords::new(5, 31, 5));
        got.sort();
        assert_eq!(got, vec![Coords::ZERO, Coords::new(0, 1, 0)]);
    }

    #[test]
    fn corner_edit_includes_each_face_neighbour() {
        let v = volume();
        let mut got = affected_chunks(&v, Coords::new(0, 0, 0));
        got.sort();
        // no chunk at z = -1
        assert_eq!(got, vec![Coords::new(-1, 0, 0), Coords::new(0, -1, 0), Coords::ZERO]);
    }

    #[test]
    fn negative_coordinates_use_floor_chunks() {
        let v = volume();
        let mut got = affected_chunks(&v, Coords::new(-1, -32, 7));
        got.sort();
        assert_eq!(
            got,
            vec![Coords::new(-1, -1, 0), Coords::new(0, -1, 0)]
        );
    }
}
