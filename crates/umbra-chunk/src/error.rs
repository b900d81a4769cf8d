use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("mesh part `{part}` is not ready: {reason}")]
    MeshNotReady { part: String, reason: &'static str },
    #[error("voxel buffer has {got} entries, expected {expected}")]
    BufferLength { got: usize, expected: usize },
}
