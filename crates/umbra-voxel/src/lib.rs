//! Voxel type table, per-volume type index and compact voxel encoding.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod index;
pub mod registry;
pub mod types;

pub use error::TypeError;
pub use index::VoxelTypeIndex;
pub use registry::{VoxelType, VoxelTypeTable};
pub use types::{Voxel, VoxelData, VoxelTypeId};
