use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use umbra_geom::{Coords, Region};
use umbra_world::TerrainSource;

use crate::error::PipelineError;
use crate::task::{Stage, StageContext};

/// Allocates every chunk of a region up front, then fills them in parallel
/// and emits each as soon as it is filled.
pub struct TerrainGenerator {
    region: Region,
    source: Arc<dyn TerrainSource>,
}

impl TerrainGenerator {
    pub fn new(region: Region, source: Arc<dyn TerrainSource>) -> Self {
        Self { region, source }
    }
}

impl Stage for TerrainGenerator {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn process(&self, ctx: &mut StageContext<'_>) -> Result<(), PipelineError> {
        let ctx = &*ctx;
        let volume = ctx.volume.as_ref();
        let coords: Vec<Coords> = self.region.iter().collect();
        for &c in &coords {
            volume.add_chunk(c)?;
            ctx.output.register(c);
        }
        log::info!(
            target: "pipeline",
            "terrain: {} chunks allocated over {:?}..{:?} ({})",
            coords.len(),
            self.region.min,
            self.region.max,
            self.source.name()
        );

        let solid = AtomicUsize::new(0);
        ctx.compute.install(|| {
            coords.par_iter().try_for_each(|&c| -> Result<(), PipelineError> {
                ctx.check_abort()?;
                let chunk = volume.chunk(c).ok_or(PipelineError::Disposed)?;
                let n = self.source.fill(volume, &chunk)?;
                solid.fetch_add(n, Ordering::Relaxed);
                ctx.output.emit(c);
                Ok(())
            })
        })?;
        log::debug!(target: "pipeline", "terrain: {} solid voxels", solid.load(Ordering::Relaxed));
        Ok(())
    }
}
