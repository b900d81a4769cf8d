//! Sparse chunked volume, neighbour-aware chunk views, raycasting and terrain sources.
#![forbid(unsafe_code)]

mod error;
mod raycast;
pub mod terrain;
mod view;
mod volume;

pub use error::VolumeError;
pub use raycast::RayHit;
pub use terrain::{FlatTerrain, NoiseTerrain, TerrainMode, TerrainParams, TerrainSource};
pub use view::ChunkView;
pub use volume::{ChunkGuard, VoxelVolume};
