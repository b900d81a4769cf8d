use std::sync::Arc;

use proptest::prelude::*;
use umbra_edit::affected_chunks;
use umbra_geom::{CHUNK_SIZE, Coords, Face};
use umbra_voxel::VoxelTypeTable;
use umbra_world::VoxelVolume;

fn grid() -> VoxelVolume {
    let v = VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()));
    for x in -1..=1 {
        for y in -1..=1 {
            for z in -1..=1 {
                v.add_chunk(Coords::new(x, y, z)).unwrap();
            }
        }
    }
    v
}

proptest! {
    #[test]
    fn affected_set_is_own_chunk_plus_boundary_faces(
        x in -CHUNK_SIZE..2 * CHUNK_SIZE,
        y in -CHUNK_SIZE..2 * CHUNK_SIZE,
        z in -CHUNK_SIZE..2 * CHUNK_SIZE,
    ) {
        let v = grid();
        let global = Coords::new(x, y, z);
        let own = global.chunk_of();
        let got = affected_chunks(&v, global);
        prop_assert_eq!(got[0], own);
        for &c in &got[1..] {
            let face = Face::from_delta(c - own);
            prop_assert!(face.is_some(), "{} is not a face neighbour of {}", c, own);
            prop_assert!(v.contains_chunk(c));
            // the edited voxel sits on the shared face
            let across = global.step(face.unwrap());
            prop_assert_eq!(across.chunk_of(), c);
        }
        let on_faces = Face::ALL
            .iter()
            .filter(|&&f| (global.step(f)).chunk_of() != own && v.contains_chunk(own.step(f)))
            .count();
        prop_assert_eq!(got.len(), 1 + on_faces);
    }
}
