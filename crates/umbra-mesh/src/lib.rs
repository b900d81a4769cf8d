//! CPU face-culled chunk geometry carrying a per-face sample of all light channels.
#![forbid(unsafe_code)]

mod build;
mod quad;

pub use build::{OUTSIDE_LIGHT, build_chunk_mesh};
pub use quad::{face_corners, push_face};
