use std::sync::Arc;
use std::thread;

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;

use crate::error::PipelineError;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Threads running stage bodies.
    pub stage_workers: usize,
    /// Threads for data-parallel batches; 0 uses available parallelism.
    pub compute_workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stage_workers: 4,
            compute_workers: 0,
        }
    }
}

/// Stage bodies block on their input, so they get their own pool; the
/// compute pool only ever runs non-blocking batches.
#[derive(Clone)]
pub struct Pools {
    pub stage: Arc<ThreadPool>,
    pub compute: Arc<ThreadPool>,
}

impl Pools {
    pub fn new(cfg: &RuntimeConfig) -> Result<Self, PipelineError> {
        let compute_workers = if cfg.compute_workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            cfg.compute_workers
        };
        let stage = ThreadPoolBuilder::new()
            .num_threads(cfg.stage_workers.max(1))
            .thread_name(|i| format!("umbra-stage-{i}"))
            .build()
            .map_err(|e| PipelineError::Pool {
                pool: "stage",
                message: e.to_string(),
            })?;
        let compute = ThreadPoolBuilder::new()
            .num_threads(compute_workers)
            .thread_name(|i| format!("umbra-compute-{i}"))
            .build()
            .map_err(|e| PipelineError::Pool {
                pool: "compute",
                message: e.to_string(),
            })?;
        log::info!(
            target: "pipeline",
            "pools ready: stage={} compute={}",
            stage.current_num_threads(),
            compute.current_num_threads()
        );
        Ok(Self {
            stage: Arc::new(stage),
            compute: Arc::new(compute),
        })
    }
}
