use std::sync::Arc;

use proptest::prelude::*;
use umbra_chunk::LightChannel;
use umbra_geom::Coords;
use umbra_lighting::{LightPropagator, light_volume};
use umbra_voxel::config::VoxelTypeDef;
use umbra_voxel::{Voxel, VoxelTypeTable};
use umbra_world::VoxelVolume;

fn volume() -> VoxelVolume {
    let v = VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()));
    v.add_chunk(Coords::ZERO).unwrap();
    v
}

// builtin types plus a non-opaque emitter dimmer than the lamp
fn volume_with_torch() -> VoxelVolume {
    let mut types = VoxelTypeTable::builtin();
    types
        .register(VoxelTypeDef {
            name: "torch".into(),
            solid: Some(false),
            opaque: None,
            skin: None,
            emission: Some(180),
        })
        .unwrap();
    let v = VoxelVolume::new(Arc::new(types));
    v.add_chunk(Coords::ZERO).unwrap();
    v
}

fn planes(v: &VoxelVolume) -> Vec<Vec<u8>> {
    let chunk = v.chunk(Coords::ZERO).unwrap();
    LightChannel::ALL.iter().map(|ch| chunk.light_plane(*ch)).collect()
}

fn cell() -> impl Strategy<Value = Coords> {
    (0i32..32, 0i32..32, 0i32..32).prop_map(|(x, y, z)| Coords::new(x, y, z))
}

fn edit(v: &VoxelVolume, at: Coords, new: Voxel) {
    let old = v.voxel_at(at);
    v.set_voxel(at, new).unwrap();
    let mut prop = LightPropagator::new();
    prop.on_voxel_changed(v, at, old, new);
    prop.run(v);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    // removing a lamp leaves the same field as never placing it
    #[test]
    fn removed_emitter_matches_fresh(kept in cell(), removed in cell()) {
        prop_assume!(kept != removed);
        let a = volume();
        let lamp = Voxel::of(a.types().require("lamp").unwrap());
        a.set_voxel(kept, lamp).unwrap();
        a.set_voxel(removed, lamp).unwrap();
        light_volume(&a);
        edit(&a, removed, Voxel::EMPTY);

        let b = volume();
        b.set_voxel(kept, lamp).unwrap();
        light_volume(&b);
        prop_assert_eq!(planes(&a), planes(&b));
    }

    // placing an opaque voxel after lighting matches lighting it in place
    #[test]
    fn placed_opaque_matches_fresh(blocks in prop::collection::vec(cell(), 1..6)) {
        let a = volume();
        let stone = Voxel::of(a.types().require("stone").unwrap());
        light_volume(&a);
        for at in &blocks {
            edit(&a, *at, stone);
        }

        let b = volume();
        for at in &blocks {
            b.set_voxel(*at, stone).unwrap();
        }
        light_volume(&b);
        prop_assert_eq!(planes(&a), planes(&b));
    }

    // lighting an emitter added by edit matches seeding it
    #[test]
    fn added_emitter_matches_fresh(at in cell()) {
        let a = volume();
        let lamp = Voxel::of(a.types().require("lamp").unwrap());
        light_volume(&a);
        edit(&a, at, lamp);

        let b = volume();
        b.set_voxel(at, lamp).unwrap();
        light_volume(&b);
        prop_assert_eq!(planes(&a), planes(&b));
    }

    // a dimmer transparent emitter survives removal of a brighter one nearby
    #[test]
    fn removed_emitter_next_to_transparent_emitter_matches_fresh(
        torch_at in cell(),
        offset in (-3i32..=3, -3i32..=3, -3i32..=3),
        remove_torch in any::<bool>(),
    ) {
        let lamp_at = torch_at.offset(offset.0, offset.1, offset.2);
        prop_assume!(lamp_at != torch_at && lamp_at.in_chunk_bounds());
        let a = volume_with_torch();
        let torch = Voxel::of(a.types().require("torch").unwrap());
        let lamp = Voxel::of(a.types().require("lamp").unwrap());
        a.set_voxel(torch_at, torch).unwrap();
        a.set_voxel(lamp_at, lamp).unwrap();
        light_volume(&a);

        let b = volume_with_torch();
        if remove_torch {
            edit(&a, torch_at, Voxel::EMPTY);
            b.set_voxel(lamp_at, lamp).unwrap();
        } else {
            edit(&a, lamp_at, Voxel::EMPTY);
            b.set_voxel(torch_at, torch).unwrap();
        }
        light_volume(&b);
        prop_assert_eq!(planes(&a), planes(&b));
    }
}
