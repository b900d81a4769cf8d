//! Fixed-size voxel chunk: packed voxel words, seven light planes and a mesh slot.
#![forbid(unsafe_code)]

mod channel;
mod chunk;
mod error;
mod mesh;

pub use channel::LightChannel;
pub use chunk::{CHUNK_VOLUME, VoxelChunk};
pub use error::ChunkError;
pub use mesh::{ChunkMesh, MeshPart};
