use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("voxel type `{0}` is defined more than once")]
    DuplicateName(String),
    #[error("voxel type name must not be empty")]
    EmptyName,
    #[error("voxel type `{name}` has emission {emission}, expected 1..=255 or none")]
    BadEmission { name: String, emission: u16 },
    #[error("unknown voxel type `{0}`")]
    UnknownName(String),
    #[error("voxel type table is full ({0} entries)")]
    TableFull(usize),
    #[error("voxel type index is full ({0} entries)")]
    IndexFull(usize),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse voxel types: {0}")]
    Parse(#[from] toml::de::Error),
}
