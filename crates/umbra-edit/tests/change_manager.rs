use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rayon::ThreadPoolBuilder;
use umbra_chunk::LightChannel;
use umbra_edit::{ChangeManager, ChangeStats, EditError};
use umbra_geom::Coords;
use umbra_lighting::light_volume;
use umbra_voxel::{Voxel, VoxelTypeTable};
use umbra_world::{FlatTerrain, TerrainSource, VoxelVolume};

fn manager(volume: &Arc<VoxelVolume>) -> ChangeManager {
    let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    ChangeManager::new(Arc::clone(volume), Arc::new(pool)).unwrap()
}

fn wait_for(mgr: &ChangeManager, done: impl Fn(&ChangeStats) -> bool) -> ChangeStats {
    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        let stats = mgr.stats();
        if done(&stats) {
            return stats;
        }
        assert!(Instant::now() < deadline, "change manager stalled at {stats:?}");
        thread::sleep(Duration::from_millis(2));
    }
}

const SHAFT_X: i32 = 32;
const SHAFT_Z: i32 = 5;

/// Two stone chunks side by side with an open vertical shaft along the -x
/// face of the second one.
fn shaft_volume() -> Arc<VoxelVolume> {
    let volume = Arc::new(VoxelVolume::new(Arc::new(VoxelTypeTable::builtin())));
    let stone = Voxel::of(volume.types().require("stone").unwrap());
    for c in [Coords::ZERO, Coords::new(1, 0, 0)] {
        volume.add_chunk(c).unwrap();
    }
    for x in 0..64 {
        for y in 0..32 {
            for z in 0..32 {
                if x == SHAFT_X && z == SHAFT_Z {
                    continue;
                }
                volume.set_voxel(Coords::new(x, y, z), stone).unwrap();
            }
        }
    }
    light_volume(&volume);
    volume
}

#[test]
fn opaque_voxel_in_lit_shaft_darkens_everything_below() {
    let volume = shaft_volume();
    let yp = |y| volume.light_at(Coords::new(SHAFT_X, y, SHAFT_Z), LightChannel::Yp);
    assert_eq!(yp(31), Some(255));
    assert_eq!(yp(30), Some(240));
    assert_eq!(yp(20), Some(90));

    let mgr = manager(&volume);
    let stone = Voxel::of(volume.types().require("stone").unwrap());
    mgr.request_single_change(Coords::new(SHAFT_X, 30, SHAFT_Z), stone)
        .unwrap();
    let stats = wait_for(&mgr, |s| s.batches >= 1);
    assert_eq!(stats.applied, 1);

    assert_eq!(yp(31), Some(255));
    for y in 0..=30 {
        assert_eq!(yp(y), Some(0), "y={y}");
    }
    let dirty: HashSet<Coords> = mgr.drain_results().into_iter().map(|m| m.coords).collect();
    assert_eq!(dirty, HashSet::from([Coords::ZERO, Coords::new(1, 0, 0)]));
}

#[test]
fn edits_without_an_owning_chunk_are_skipped() {
    let volume = shaft_volume();
    let mgr = manager(&volume);
    let stone = Voxel::of(volume.types().require("stone").unwrap());
    mgr.request_single_change(Coords::new(500, 0, 0), stone).unwrap();
    mgr.request_single_change(Coords::new(SHAFT_X, 10, SHAFT_Z), stone)
        .unwrap();
    let stats = wait_for(&mgr, |s| s.applied + s.skipped >= 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.applied, 1);
    assert_eq!(volume.voxel_at(Coords::new(SHAFT_X, 10, SHAFT_Z)), stone);
}

#[test]
fn breaking_the_surface_relights_and_installs_meshes() {
    let volume = Arc::new(VoxelVolume::new(Arc::new(VoxelTypeTable::builtin())));
    let chunk = volume.add_chunk(Coords::ZERO).unwrap();
    FlatTerrain::new(volume.types(), 20)
        .unwrap()
        .fill(&volume, &chunk)
        .unwrap();
    light_volume(&volume);
    let cell = Coords::new(10, 19, 10);
    assert_eq!(volume.light_at(cell, LightChannel::Yp), Some(0));

    let mgr = manager(&volume);
    mgr.request_single_change(cell, Voxel::EMPTY).unwrap();
    wait_for(&mgr, |s| s.batches >= 1);
    assert_eq!(volume.light_at(cell, LightChannel::Yp), Some(75));
    assert!(!chunk.has_mesh());
    assert_eq!(mgr.apply_results(), 1);
    assert!(chunk.has_mesh());
}

#[test]
fn requests_after_shutdown_are_rejected() {
    let volume = shaft_volume();
    let mut mgr = manager(&volume);
    mgr.shutdown();
    assert!(!mgr.is_running());
    let err = mgr
        .request_single_change(Coords::new(1, 1, 1), Voxel::EMPTY)
        .unwrap_err();
    assert!(matches!(err, EditError::ShutDown));
    // idempotent
    mgr.shutdown();
}
