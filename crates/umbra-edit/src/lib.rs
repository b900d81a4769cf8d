//! Live voxel edits applied off the main thread with incremental relighting.
#![forbid(unsafe_code)]

mod dirty;
mod error;
mod manager;
mod signal;

pub use dirty::affected_chunks;
pub use error::EditError;
pub use manager::{ChangeManager, ChangeStats, EditRequest};
pub use signal::WakeSignal;
