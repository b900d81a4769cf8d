use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Instant;

use rayon::ThreadPool;
use umbra_world::VoxelVolume;

use crate::error::PipelineError;
use crate::pools::Pools;
use crate::production::{Input, Output, StreamEnd};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    NotStarted,
    Running,
    Completed,
    Aborted,
    Failed,
}

impl TaskState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Aborted | TaskState::Failed)
    }
}

/// What a stage body sees while it runs.
pub struct StageContext<'a> {
    pub volume: &'a Arc<VoxelVolume>,
    pub output: &'a Output,
    pub compute: &'a ThreadPool,
    input: Option<Input>,
    abort: &'a AtomicBool,
    stage: &'static str,
}

impl<'a> StageContext<'a> {
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn check_abort(&self) -> Result<(), PipelineError> {
        if self.is_aborted() {
            Err(PipelineError::Aborted)
        } else {
            Ok(())
        }
    }

    /// The upstream stream. Only chained stages have one.
    pub fn take_input(&mut self) -> Result<Input, PipelineError> {
        self.input.take().ok_or_else(|| PipelineError::Stage {
            stage: self.stage,
            message: "stage needs an upstream producer".to_string(),
        })
    }
}

/// One pipeline step. `process` runs on the stage pool; `update` runs on the
/// thread that owns the pipeline.
pub trait Stage: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn process(&self, ctx: &mut StageContext<'_>) -> Result<(), PipelineError>;

    /// Applies results that may only be touched on the owning thread and
    /// returns how many were applied. Must not block.
    fn update(&self, _volume: &VoxelVolume) -> usize {
        0
    }
}

struct Status {
    state: Mutex<(TaskState, Option<PipelineError>)>,
    changed: Condvar,
    abort: AtomicBool,
}

impl Status {
    fn set(&self, state: TaskState, error: Option<PipelineError>) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = (state, error);
        drop(guard);
        self.changed.notify_all();
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

/// A stage running on the stage pool, plus the stream it produces.
pub struct Task {
    stage: Arc<dyn Stage>,
    status: Arc<Status>,
    output: Output,
    volume: Arc<VoxelVolume>,
    pools: Pools,
}

impl Task {
    /// Starts a stage with no upstream.
    pub fn spawn<S: Stage>(pools: &Pools, volume: Arc<VoxelVolume>, stage: S) -> Task {
        Self::start(pools, volume, Arc::new(stage), None)
    }

    /// Starts `stage` consuming this task's output, sharing its volume.
    pub fn then<S: Stage>(&self, stage: S) -> Task {
        Self::start(
            &self.pools,
            Arc::clone(&self.volume),
            Arc::new(stage),
            Some(self.output.subscribe()),
        )
    }

    fn start(pools: &Pools, volume: Arc<VoxelVolume>, stage: Arc<dyn Stage>, input: Option<Input>) -> Task {
        let name = stage.name();
        let status = Arc::new(Status {
            state: Mutex::new((TaskState::NotStarted, None)),
            changed: Condvar::new(),
            abort: AtomicBool::new(false),
        });
        let output = Output::new(name);
        let task = Task {
            stage: Arc::clone(&stage),
            status: Arc::clone(&status),
            output: output.clone(),
            volume: Arc::clone(&volume),
            pools: pools.clone(),
        };
        let compute = Arc::clone(&pools.compute);
        pools.stage.spawn(move || {
            status.set(TaskState::Running, None);
            let start = Instant::now();
            let mut ctx = StageContext {
                volume: &volume,
                output: &output,
                compute: &compute,
                input,
                abort: &status.abort,
                stage: name,
            };
            let result = if ctx.is_aborted() {
                Err(PipelineError::Aborted)
            } else {
                panic::catch_unwind(AssertUnwindSafe(|| stage.process(&mut ctx))).unwrap_or_else(|payload| {
                    Err(PipelineError::Panicked {
                        stage: name,
                        message: panic_message(payload.as_ref()),
                    })
                })
            };
            let ms = start.elapsed().as_millis();
            match result {
                Ok(()) => {
                    output.complete();
                    log::info!(target: "pipeline", "ms={} stage={} emitted={}", ms, name, output.emitted());
                    status.set(TaskState::Completed, None);
                }
                Err(PipelineError::Disposed) => {
                    log::debug!(target: "pipeline", "stage {name} stopped: volume disposed");
                    output.close(StreamEnd::Aborted);
                    status.set(TaskState::Aborted, None);
                }
                Err(PipelineError::Aborted) => {
                    log::info!(target: "pipeline", "stage {name} aborted after {ms} ms");
                    output.close(StreamEnd::Aborted);
                    status.set(TaskState::Aborted, None);
                }
                Err(e @ PipelineError::UpstreamFailed { .. }) => {
                    log::warn!(target: "pipeline", "stage {name} stopped: {e}");
                    output.close(StreamEnd::Failed);
                    status.set(TaskState::Failed, Some(e));
                }
                Err(e) => {
                    log::error!(target: "pipeline", "stage {name} failed: {e}");
                    output.close(StreamEnd::Failed);
                    status.set(TaskState::Failed, Some(e));
                }
            }
        });
        task
    }

    pub fn name(&self) -> &'static str {
        self.stage.name()
    }

    pub fn stage(&self) -> &Arc<dyn Stage> {
        &self.stage
    }

    pub fn volume(&self) -> &Arc<VoxelVolume> {
        &self.volume
    }

    /// A fresh reader over everything this task has produced or will produce.
    pub fn output(&self) -> Input {
        self.output.subscribe()
    }

    pub fn state(&self) -> TaskState {
        self.status
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .0
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Blocks until the task reaches a terminal state.
    pub fn wait(&self) -> Result<TaskState, PipelineError> {
        let mut guard = self.status.state.lock().unwrap_or_else(PoisonError::into_inner);
        while !guard.0.is_terminal() {
            guard = self
                .status
                .changed
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match &*guard {
            (TaskState::Failed, Some(e)) => Err(e.clone()),
            (TaskState::Failed, None) => Err(PipelineError::Stage {
                stage: self.name(),
                message: "failed without an error".to_string(),
            }),
            (state, _) => Ok(*state),
        }
    }

    /// Error recorded by a failed task.
    pub fn error(&self) -> Option<PipelineError> {
        self.status
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .1
            .clone()
    }

    /// Asks the stage to stop at its next check.
    pub fn abort(&self) {
        self.status.abort.store(true, Ordering::Relaxed);
    }

    pub fn update(&self) -> usize {
        self.stage.update(&self.volume)
    }
}
