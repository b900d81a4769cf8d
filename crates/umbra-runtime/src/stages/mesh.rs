use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::prelude::*;
use umbra_chunk::ChunkMesh;
use umbra_geom::Coords;
use umbra_mesh::build_chunk_mesh;
use umbra_world::VoxelVolume;

use crate::error::PipelineError;
use crate::task::{Stage, StageContext};

const MAX_BATCH: usize = 64;

/// Builds geometry for chunks as they stream in. Meshes are installed into
/// their chunks by `update` on the owning thread.
pub struct MeshReadiness {
    tx: Sender<ChunkMesh>,
    rx: Receiver<ChunkMesh>,
    built: AtomicUsize,
    installed: AtomicUsize,
}

impl Default for MeshReadiness {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshReadiness {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            built: AtomicUsize::new(0),
            installed: AtomicUsize::new(0),
        }
    }

    pub fn built(&self) -> usize {
        self.built.load(Ordering::Relaxed)
    }

    pub fn installed(&self) -> usize {
        self.installed.load(Ordering::Relaxed)
    }
}

impl Stage for MeshReadiness {
    fn name(&self) -> &'static str {
        "mesh"
    }

    fn process(&self, ctx: &mut StageContext<'_>) -> Result<(), PipelineError> {
        let mut input = ctx.take_input()?;
        let volume = ctx.volume.as_ref();
        while let Some(first) = input.next() {
            ctx.check_abort()?;
            let mut batch: Vec<Coords> = vec![first];
            while batch.len() < MAX_BATCH {
                match input.try_next() {
                    Some(c) => batch.push(c),
                    None => break,
                }
            }
            let meshes: Vec<ChunkMesh> = ctx.compute.install(|| {
                batch
                    .par_iter()
                    .filter_map(|&c| volume.chunk(c).map(|chunk| build_chunk_mesh(volume, chunk)))
                    .collect()
            });
            if meshes.len() < batch.len() && volume.is_disposed() {
                return Err(PipelineError::Disposed);
            }
            for mesh in meshes {
                let c = mesh.coords;
                self.built.fetch_add(1, Ordering::Relaxed);
                if self.tx.send(mesh).is_err() {
                    return Err(PipelineError::Disposed);
                }
                ctx.output.register(c);
                ctx.output.emit(c);
            }
        }
        if let Some(e) = input.failure() {
            return Err(e);
        }
        Ok(())
    }

    fn update(&self, volume: &VoxelVolume) -> usize {
        let mut applied = 0;
        for mesh in self.rx.try_iter() {
            let c = mesh.coords;
            let Some(chunk) = volume.chunk(c) else {
                continue;
            };
            match chunk.set_mesh(mesh) {
                Ok(_) => applied += 1,
                Err(e) => log::warn!(target: "pipeline", "mesh for {c} rejected: {e}"),
            }
        }
        self.installed.fetch_add(applied, Ordering::Relaxed);
        applied
    }
}
