use std::sync::Arc;

use super::*;
use crate::seed::{face_layer, on_sun_boundary, outermost_chunks};
use umbra_chunk::LightChannel;
use umbra_geom::{CHUNK_SIZE, Coords, Face};
use umbra_voxel::config::VoxelTypeDef;
use umbra_voxel::{Voxel, VoxelTypeTable};
use umbra_world::VoxelVolume;

fn single_chunk() -> VoxelVolume {
    let v = VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()));
    v.add_chunk(Coords::ZERO).unwrap();
    v
}

fn stone(v: &VoxelVolume) -> Voxel {
    Voxel::of(v.types().require("stone").unwrap())
}

#[test]
fn decrement_is_a_sixteenth() {
    assert_eq!(LIGHT_DECREMENT, 15);
    assert_eq!(ChannelTraits::of(LightChannel::Yp).privileged, Some(Face::PosY));
    assert_eq!(ChannelTraits::of(LightChannel::Point).privileged, None);
}

#[test]
fn top_seeded_sun_decays_downward() {
    let v = single_chunk();
    light_volume(&v);
    for d in 0..CHUNK_SIZE {
        let y = CHUNK_SIZE - 1 - d;
        let expect = (255 - d * 15).max(0) as u8;
        assert_eq!(v.light_at(Coords::new(7, y, 9), LightChannel::Yp), Some(expect), "depth {d}");
    }
}

#[test]
fn opaque_floor_blocks_sun_below() {
    let v = single_chunk();
    let s = stone(&v);
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            v.set_voxel(Coords::new(x, 28, z), s).unwrap();
        }
    }
    light_volume(&v);
    assert_eq!(v.light_at(Coords::new(4, 31, 4), LightChannel::Yp), Some(255));
    assert_eq!(v.light_at(Coords::new(4, 29, 4), LightChannel::Yp), Some(225));
    for y in 0..28 {
        assert_eq!(v.light_at(Coords::new(4, y, 4), LightChannel::Yp), Some(0));
    }
}

#[test]
fn converged_volume_is_a_fixed_point() {
    let v = single_chunk();
    let lamp = Voxel::of(v.types().require("lamp").unwrap());
    v.set_voxel(Coords::new(16, 3, 16), lamp).unwrap();
    let first = light_volume(&v);
    assert!(first.contains(&Coords::ZERO));

    let before: Vec<Vec<u8>> = LightChannel::ALL
        .iter()
        .map(|ch| v.chunk(Coords::ZERO).unwrap().light_plane(*ch))
        .collect();
    let mut prop = LightPropagator::new();
    assert!(prop.run(&v).is_empty());
    prop.seed_volume(&v);
    assert!(prop.run(&v).is_empty());
    let after: Vec<Vec<u8>> = LightChannel::ALL
        .iter()
        .map(|ch| v.chunk(Coords::ZERO).unwrap().light_plane(*ch))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn emitter_lights_point_channel_only_around_it() {
    let v = single_chunk();
    let lamp = Voxel::of(v.types().require("lamp").unwrap());
    let at = Coords::new(10, 10, 10);
    v.set_voxel(at, lamp).unwrap();
    light_volume(&v);
    assert_eq!(v.light_at(at, LightChannel::Point), Some(240));
    assert_eq!(v.light_at(at.offset(1, 0, 0), LightChannel::Point), Some(225));
    assert_eq!(v.light_at(at.offset(2, 1, 0), LightChannel::Point), Some(195));
    assert_eq!(v.light_at(Coords::new(31, 31, 31), LightChannel::Point), Some(0));
}

#[test]
fn outermost_chunk_per_column() {
    let cs = [
        Coords::new(0, 0, 0),
        Coords::new(0, 1, 0),
        Coords::new(0, 3, 0),
        Coords::new(1, -2, 0),
    ];
    assert_eq!(
        outermost_chunks(&cs, Face::PosY),
        vec![Coords::new(0, 3, 0), Coords::new(1, -2, 0)]
    );
    assert_eq!(
        outermost_chunks(&cs, Face::NegY),
        vec![Coords::new(0, 0, 0), Coords::new(1, -2, 0)]
    );
    assert_eq!(outermost_chunks(&cs, Face::PosX).len(), 4);
}

#[test]
fn face_layer_covers_one_plane() {
    let cells: Vec<Coords> = face_layer(Face::NegZ).collect();
    assert_eq!(cells.len(), (CHUNK_SIZE * CHUNK_SIZE) as usize);
    assert!(cells.iter().all(|c| c.z == 0 && c.in_chunk_bounds()));
}

#[test]
fn sun_boundary_requires_outermost_chunk() {
    let v = VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()));
    v.add_chunk(Coords::new(0, 0, 0)).unwrap();
    v.add_chunk(Coords::new(0, 1, 0)).unwrap();
    assert!(on_sun_boundary(&v, Coords::new(3, 63, 3), Face::PosY));
    assert!(!on_sun_boundary(&v, Coords::new(3, 31, 3), Face::PosY));
    assert!(on_sun_boundary(&v, Coords::new(3, 0, 3), Face::NegY));
    assert!(!on_sun_boundary(&v, Coords::new(3, 62, 3), Face::PosY));
}

#[test]
fn light_crosses_chunk_faces() {
    let v = VoxelVolume::new(Arc::new(VoxelTypeTable::builtin()));
    v.add_chunk(Coords::new(0, 0, 0)).unwrap();
    v.add_chunk(Coords::new(1, 0, 0)).unwrap();
    let lamp = Voxel::of(v.types().require("lamp").unwrap());
    v.set_voxel(Coords::new(31, 5, 5), lamp).unwrap();
    let touched = light_volume(&v);
    assert!(touched.contains(&Coords::new(1, 0, 0)));
    assert_eq!(v.light_at(Coords::new(32, 5, 5), LightChannel::Point), Some(225));
    assert_eq!(v.light_at(Coords::new(35, 5, 5), LightChannel::Point), Some(180));
}

fn with_torch() -> VoxelVolume {
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

#[test]
fn full_sun_keeps_full_strength_along_its_axis() {
    let v = single_chunk();
    let chunk = v.chunk(Coords::ZERO).unwrap();
    let at = Coords::new(16, 10, 16);
    let mut prop = LightPropagator::new();
    assert!(prop.channel_mut(LightChannel::Yp).seed_cell(&chunk, at, MAX_LIGHT));
    prop.run(&v);
    for y in 10..CHUNK_SIZE {
        assert_eq!(v.light_at(Coords::new(16, y, 16), LightChannel::Yp), Some(255), "y={y}");
    }
    assert_eq!(v.light_at(at.offset(0, -1, 0), LightChannel::Yp), Some(240));
    assert_eq!(v.light_at(at.offset(1, 0, 0), LightChannel::Yp), Some(240));
    assert_eq!(v.light_at(at.offset(0, 0, -1), LightChannel::Yp), Some(240));
    // other channels untouched
    assert_eq!(v.light_at(at, LightChannel::Yn), Some(0));

    // equal-strength neighbours only retract along the privileged axis
    prop.queue_for_depropagation(&v, LightChannel::Yp, at);
    prop.run(&v);
    for y in 0..CHUNK_SIZE {
        assert_eq!(v.light_at(Coords::new(16, y, 16), LightChannel::Yp), Some(0), "y={y}");
    }
    assert!(chunk.light_plane(LightChannel::Yp).iter().all(|&l| l == 0));
}

#[test]
fn full_sun_off_axis_is_refilled_not_retracted() {
    let v = single_chunk();
    let chunk = v.chunk(Coords::ZERO).unwrap();
    let mut prop = LightPropagator::new();
    // two full-strength cells side by side; removing one leaves the other
    let a = Coords::new(8, 5, 8);
    let b = Coords::new(9, 5, 8);
    prop.channel_mut(LightChannel::Yp).seed_cell(&chunk, a, MAX_LIGHT);
    prop.channel_mut(LightChannel::Yp).seed_cell(&chunk, b, MAX_LIGHT);
    prop.run(&v);
    prop.queue_for_depropagation(&v, LightChannel::Yp, a);
    prop.run(&v);
    assert_eq!(v.light_at(b, LightChannel::Yp), Some(255));
    assert_eq!(v.light_at(a, LightChannel::Yp), Some(240));
}

#[test]
fn transparent_emitter_keeps_its_own_light_after_brighter_source_goes() {
    let v = with_torch();
    let torch = Voxel::of(v.types().require("torch").unwrap());
    let lamp = Voxel::of(v.types().require("lamp").unwrap());
    let torch_at = Coords::new(10, 10, 10);
    let lamp_at = Coords::new(12, 10, 10);
    v.set_voxel(torch_at, torch).unwrap();
    v.set_voxel(lamp_at, lamp).unwrap();
    light_volume(&v);
    assert_eq!(v.light_at(torch_at, LightChannel::Point), Some(210));

    v.set_voxel(lamp_at, Voxel::EMPTY).unwrap();
    let mut prop = LightPropagator::new();
    prop.on_voxel_changed(&v, lamp_at, lamp, Voxel::EMPTY);
    prop.run(&v);
    assert_eq!(v.light_at(torch_at, LightChannel::Point), Some(180));
    assert_eq!(v.light_at(torch_at.offset(1, 0, 0), LightChannel::Point), Some(165));
    assert_eq!(v.light_at(lamp_at, LightChannel::Point), Some(150));
}
