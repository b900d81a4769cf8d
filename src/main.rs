//! Headless driver: generate, light and mesh a world, then run scripted edits.

mod config;

use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use umbra_edit::ChangeManager;
use umbra_geom::{CHUNK_SIZE, Coords, Vec3};
use umbra_runtime::{Pipeline, Pools};
use umbra_voxel::Voxel;
use umbra_world::{TerrainSource, VoxelVolume};

use crate::config::{AppConfig, CliArgs};

const POLL: Duration = Duration::from_millis(5);
const EDIT_TIMEOUT: Duration = Duration::from_secs(30);

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.format_timestamp_millis().init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let mut cfg = AppConfig::load(args.config.as_deref())?;
    cfg.apply_cli_overrides(&args)?;
    init_logging(cfg.log_level.as_deref());

    let types = Arc::new(cfg.types.load()?);
    log::info!("loaded {} voxel types", types.len());
    let volume = Arc::new(VoxelVolume::new(types));
    let pools = Pools::new(&cfg.runtime)?;
    let terrain: Arc<dyn TerrainSource> = Arc::from(cfg.world.terrain.build(volume.types())?);
    let region = cfg.world.region();

    let start = Instant::now();
    log::info!(
        "generating {} chunks with {} terrain",
        region.volume(),
        terrain.name()
    );
    let pipeline = Pipeline::standard(&pools, Arc::clone(&volume), region, terrain);
    let state = pipeline.run_to_completion(POLL)?;
    log::info!(
        "ms={} world ready: state={:?} chunks={} triangles={}",
        start.elapsed().as_millis(),
        state,
        volume.chunk_count(),
        triangle_count(&volume)
    );

    if cfg.script.edits > 0 {
        run_scripted_edits(&volume, &pools, cfg.script.edits)?;
    }
    volume.dispose();
    Ok(())
}

fn triangle_count(volume: &VoxelVolume) -> usize {
    let guard = volume.enumerate();
    guard
        .iter()
        .filter_map(|(_, chunk)| chunk.mesh())
        .map(|m| m.triangle_count())
        .sum()
}

/// Aims straight down along a diagonal of the world, breaking the first solid
/// voxel on even steps and placing a lamp where the ray came from on odd ones.
fn run_scripted_edits(volume: &Arc<VoxelVolume>, pools: &Pools, count: usize) -> Result<(), Box<dyn Error>> {
    let lamp = volume.types().id_by_name("lamp").map(Voxel::of);
    let bounds = volume.voxel_region();
    let top = bounds.max.y as f32 + 0.5;
    let range = (bounds.size().y + 1) as f32;
    let mut mgr = ChangeManager::new(Arc::clone(volume), Arc::clone(&pools.compute))?;

    let start = Instant::now();
    let mut requested = 0;
    for i in 0..count {
        let step = (i as i32 * 7) % CHUNK_SIZE;
        let column = Coords::new(bounds.min.x + step + 1, 0, bounds.min.z + step + 1);
        let origin = Vec3::new(column.x as f32 + 0.5, top, column.z as f32 + 0.5);
        let Some(hit) = volume.raycast(origin, Vec3::new(0.0, -1.0, 0.0), range, |v| !v.is_empty()) else {
            log::warn!("no surface under column {column}");
            continue;
        };
        let (at, voxel) = match (i % 2, lamp) {
            (1, Some(lamp)) => (hit.previous, lamp),
            _ => (hit.coords, Voxel::EMPTY),
        };
        log::debug!("edit {i}: {at} -> {voxel:?}");
        mgr.request_single_change(at, voxel)?;
        requested += 1;
    }

    let deadline = Instant::now() + EDIT_TIMEOUT;
    let mut installed = 0;
    loop {
        installed += mgr.apply_results();
        let stats = mgr.stats();
        if stats.applied + stats.skipped >= requested {
            installed += mgr.apply_results();
            log::info!(
                "ms={} edits applied={} skipped={} batches={} meshes_installed={}",
                start.elapsed().as_millis(),
                stats.applied,
                stats.skipped,
                stats.batches,
                installed
            );
            break;
        }
        if Instant::now() > deadline {
            log::error!("change worker still busy after {:?}: {stats:?}", EDIT_TIMEOUT);
            break;
        }
        thread::sleep(POLL);
    }
    mgr.shutdown();
    Ok(())
}
