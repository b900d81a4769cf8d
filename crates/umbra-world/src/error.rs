use thiserror::Error;
use umbra_chunk::ChunkError;
use umbra_geom::Coords;
use umbra_voxel::TypeError;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("chunk {0} already exists")]
    DuplicateChunk(Coords),
    #[error("volume has been disposed")]
    Disposed,
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
}
