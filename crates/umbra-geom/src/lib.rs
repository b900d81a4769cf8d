//! Integer coordinates, bounding regions and minimal float geometry for the voxel crates.
#![forbid(unsafe_code)]

mod coords;
mod face;
mod region;
mod vec3;

pub use coords::{CHUNK_SIZE, Coords};
pub use face::Face;
pub use region::{Region, RegionIter};
pub use vec3::Vec3;
