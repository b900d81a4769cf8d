use umbra_lighting::light_volume;

use crate::error::PipelineError;
use crate::task::{Stage, StageContext};

/// Waits for the whole volume, lights it, then emits every chunk.
#[derive(Default)]
pub struct LightCalculator;

impl LightCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for LightCalculator {
    fn name(&self) -> &'static str {
        "light"
    }

    fn process(&self, ctx: &mut StageContext<'_>) -> Result<(), PipelineError> {
        let mut input = ctx.take_input()?;
        let chunks = input.wait_for_all()?;
        ctx.check_abort()?;
        let volume = ctx.volume.as_ref();
        if volume.is_disposed() {
            return Err(PipelineError::Disposed);
        }
        for &c in &chunks {
            ctx.output.register(c);
        }
        let touched = ctx.compute.install(|| light_volume(volume));
        if volume.is_disposed() {
            return Err(PipelineError::Disposed);
        }
        log::info!(
            target: "pipeline",
            "light: {} chunks lit, {} touched",
            chunks.len(),
            touched.len()
        );
        for c in chunks {
            ctx.output.emit(c);
        }
        Ok(())
    }
}
