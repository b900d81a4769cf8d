use std::sync::Arc;
use std::thread;
use std::time::Duration;

use umbra_geom::Region;
use umbra_world::{TerrainSource, VoxelVolume};

use crate::error::PipelineError;
use crate::pools::Pools;
use crate::production::Input;
use crate::stages::{LightCalculator, MeshReadiness, TerrainGenerator};
use crate::task::{Stage, Task, TaskState};

/// A linear chain of tasks sharing one volume.
pub struct Pipeline {
    tasks: Vec<Task>,
}

impl Pipeline {
    pub fn start<S: Stage>(pools: &Pools, volume: Arc<VoxelVolume>, first: S) -> Self {
        Self {
            tasks: vec![Task::spawn(pools, volume, first)],
        }
    }

    pub fn then<S: Stage>(mut self, stage: S) -> Self {
        if let Some(last) = self.tasks.last() {
            let next = last.then(stage);
            self.tasks.push(next);
        }
        self
    }

    /// Terrain generation, then lighting, then mesh readiness over `region`.
    pub fn standard(
        pools: &Pools,
        volume: Arc<VoxelVolume>,
        region: Region,
        terrain: Arc<dyn TerrainSource>,
    ) -> Self {
        Self::start(pools, volume, TerrainGenerator::new(region, terrain))
            .then(LightCalculator::new())
            .then(MeshReadiness::new())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Reader over the last stage's output.
    pub fn output(&self) -> Option<Input> {
        self.tasks.last().map(Task::output)
    }

    /// Runs every stage's owning-thread hook once.
    pub fn update(&self) -> usize {
        self.tasks.iter().map(Task::update).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(Task::is_finished)
    }

    pub fn abort(&self) {
        for t in &self.tasks {
            t.abort();
        }
    }

    /// Waits for every task. A failure reports the stage that started it
    /// rather than the downstream stages it took down.
    pub fn wait(&self) -> Result<TaskState, PipelineError> {
        let mut outcome = Ok(TaskState::Completed);
        let mut root_cause: Option<PipelineError> = None;
        for t in &self.tasks {
            match t.wait() {
                Err(PipelineError::UpstreamFailed { .. }) if root_cause.is_some() => {}
                Err(e) => {
                    if root_cause.is_none() {
                        root_cause = Some(e);
                    }
                }
                Ok(state) => outcome = Ok(state),
            }
        }
        match root_cause {
            Some(e) => Err(e),
            None => outcome,
        }
    }

    /// Pumps `update` on the calling thread until every task is finished.
    pub fn run_to_completion(&self, poll: Duration) -> Result<TaskState, PipelineError> {
        while !self.is_finished() {
            self.update();
            thread::sleep(poll);
        }
        self.update();
        self.wait()
    }
}
