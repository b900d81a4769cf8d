//! Producer/consumer task pipeline that generates, lights and meshes a volume.
#![forbid(unsafe_code)]

mod error;
mod pipeline;
mod pools;
mod production;
pub mod stages;
mod task;

pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use pools::{Pools, RuntimeConfig};
pub use production::{Input, Output, StreamEnd};
pub use task::{Stage, StageContext, Task, TaskState};
