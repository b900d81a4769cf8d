use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashSet;
use rayon::ThreadPool;
use rayon::prelude::*;
use umbra_chunk::ChunkMesh;
use umbra_geom::Coords;
use umbra_lighting::LightPropagator;
use umbra_mesh::build_chunk_mesh;
use umbra_voxel::Voxel;
use umbra_world::VoxelVolume;

use crate::dirty::affected_chunks;
use crate::error::EditError;
use crate::signal::WakeSignal;

/// Replace the voxel at `global` with `voxel`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EditRequest {
    pub global: Coords,
    pub voxel: Voxel,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeStats {
    pub applied: usize,
    pub skipped: usize,
    pub batches: usize,
    pub remeshed: usize,
}

#[derive(Default)]
struct Counters {
    applied: AtomicUsize,
    skipped: AtomicUsize,
    batches: AtomicUsize,
    remeshed: AtomicUsize,
}

struct Shared {
    volume: Arc<VoxelVolume>,
    compute: Arc<ThreadPool>,
    signal: WakeSignal,
    abort: AtomicBool,
    counters: Counters,
}

/// Serializes single-voxel edits on a dedicated thread. Each wake applies
/// every pending request, relights, and rebuilds geometry for the chunks
/// that changed. Meshes come back through `drain_results`.
pub struct ChangeManager {
    shared: Arc<Shared>,
    tx: Sender<EditRequest>,
    results: Receiver<ChunkMesh>,
    worker: Option<JoinHandle<()>>,
}

impl ChangeManager {
    pub fn new(volume: Arc<VoxelVolume>, compute: Arc<ThreadPool>) -> Result<Self, EditError> {
        let (tx, rx) = unbounded();
        let (res_tx, results) = unbounded();
        let shared = Arc::new(Shared {
            volume,
            compute,
            signal: WakeSignal::new(),
            abort: AtomicBool::new(false),
            counters: Counters::default(),
        });
        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("umbra-edit".to_string())
                .spawn(move || worker_loop(&shared, &rx, &res_tx))
                .map_err(EditError::Spawn)?
        };
        Ok(Self {
            shared,
            tx,
            results,
            worker: Some(worker),
        })
    }

    /// Queues an edit and wakes the worker. Never blocks.
    pub fn request_single_change(&self, global: Coords, voxel: Voxel) -> Result<(), EditError> {
        if self.worker.is_none() {
            return Err(EditError::ShutDown);
        }
        self.tx
            .send(EditRequest { global, voxel })
            .map_err(|_| EditError::ShutDown)?;
        self.shared.signal.notify();
        Ok(())
    }

    /// Meshes rebuilt since the last call.
    pub fn drain_results(&self) -> Vec<ChunkMesh> {
        self.results.try_iter().collect()
    }

    /// Installs rebuilt meshes into their chunks; returns how many were taken.
    pub fn apply_results(&self) -> usize {
        let mut applied = 0;
        for mesh in self.results.try_iter() {
            let c = mesh.coords;
            let Some(chunk) = self.shared.volume.chunk(c) else {
                log::debug!(target: "edit", "chunk {c} gone before its mesh arrived");
                continue;
            };
            match chunk.set_mesh(mesh) {
                Ok(_) => applied += 1,
                Err(e) => log::warn!(target: "edit", "mesh for {c} rejected: {e}"),
            }
        }
        applied
    }

    pub fn stats(&self) -> ChangeStats {
        let c = &self.shared.counters;
        ChangeStats {
            applied: c.applied.load(Ordering::Acquire),
            skipped: c.skipped.load(Ordering::Acquire),
            batches: c.batches.load(Ordering::Acquire),
            remeshed: c.remeshed.load(Ordering::Acquire),
        }
    }

    pub fn volume(&self) -> &Arc<VoxelVolume> {
        &self.shared.volume
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stops the worker after its current batch and joins it.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.abort.store(true, Ordering::Relaxed);
        self.shared.signal.notify();
        if worker.join().is_err() {
            log::error!(target: "edit", "change worker panicked");
        }
    }
}

impl Drop for ChangeManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared, rx: &Receiver<EditRequest>, results: &Sender<ChunkMesh>) {
    log::debug!(target: "edit", "change worker started");
    loop {
        shared.signal.wait();
        if shared.abort.load(Ordering::Relaxed) {
            break;
        }
        let pending: Vec<EditRequest> = rx.try_iter().collect();
        if pending.is_empty() {
            continue;
        }
        run_isolated(shared, pending, results, process_batch);
    }
    log::debug!(target: "edit", "change worker stopped");
}

type BatchFn = fn(&Shared, Vec<EditRequest>, &Sender<ChunkMesh>);

/// Runs one batch so that a panic inside it is logged and counted instead of
/// ending the worker. Returns false if the batch panicked.
fn run_isolated(shared: &Shared, pending: Vec<EditRequest>, results: &Sender<ChunkMesh>, batch: BatchFn) -> bool {
    let n = pending.len();
    match panic::catch_unwind(AssertUnwindSafe(|| batch(shared, pending, results))) {
        Ok(()) => true,
        Err(payload) => {
            log::error!(
                target: "edit",
                "edit batch of {n} requests panicked: {}",
                panic_message(payload.as_ref())
            );
            shared.counters.skipped.fetch_add(n, Ordering::AcqRel);
            shared.counters.batches.fetch_add(1, Ordering::AcqRel);
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Most recent request per location first; older duplicates are dropped.
pub(crate) fn coalesce(pending: Vec<EditRequest>) -> (Vec<EditRequest>, usize) {
    let mut seen = HashSet::with_capacity(pending.len());
    let mut stack = Vec::with_capacity(pending.len());
    let mut dropped = 0;
    for req in pending.into_iter().rev() {
        if seen.insert(req.global) {
            stack.push(req);
        } else {
            dropped += 1;
        }
    }
    (stack, dropped)
}

fn process_batch(shared: &Shared, pending: Vec<EditRequest>, results: &Sender<ChunkMesh>) {
    let start = Instant::now();
    let volume = shared.volume.as_ref();
    let counters = &shared.counters;
    let (stack, duplicates) = coalesce(pending);
    counters.skipped.fetch_add(duplicates, Ordering::AcqRel);

    let mut lights = LightPropagator::new();
    let mut dirty: HashSet<Coords> = HashSet::new();
    let mut applied = 0;
    for req in &stack {
        let old = volume.voxel_at(req.global);
        match volume.set_voxel(req.global, req.voxel) {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(target: "edit", "no chunk owns {}; edit skipped", req.global);
                counters.skipped.fetch_add(1, Ordering::AcqRel);
                continue;
            }
            Err(e) => {
                log::error!(target: "edit", "edit at {} failed: {e}", req.global);
                counters.skipped.fetch_add(1, Ordering::AcqRel);
                continue;
            }
        }
        applied += 1;
        if old == req.voxel {
            continue;
        }
        lights.on_voxel_changed(volume, req.global, old, req.voxel);
        dirty.extend(affected_chunks(volume, req.global));
    }

    let lit = shared.compute.install(|| lights.run(volume));
    dirty.extend(lit);

    let targets: Vec<Coords> = dirty.iter().copied().collect();
    let meshes: Vec<ChunkMesh> = shared.compute.install(|| {
        targets
            .par_iter()
            .filter_map(|&c| volume.chunk(c).map(|chunk| build_chunk_mesh(volume, chunk)))
            .collect()
    });
    let remeshed = meshes.len();
    for mesh in meshes {
        if results.send(mesh).is_err() {
            break;
        }
    }

    counters.applied.fetch_add(applied, Ordering::AcqRel);
    counters.remeshed.fetch_add(remeshed, Ordering::AcqRel);
    counters.batches.fetch_add(1, Ordering::AcqRel);
    log::debug!(
        target: "edit",
        "ms={} edits={} duplicates={} dirty={} remeshed={}",
        start.elapsed().as_millis(),
        stack.len(),
        duplicates,
        dirty.len(),
        remeshed
    );
}
