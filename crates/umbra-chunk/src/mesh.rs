use std::collections::HashMap;

use umbra_geom::{Coords, Region};

use crate::channel::LightChannel;
use crate::error::ChunkError;

/// Flat vertex streams for one skin. Each vertex carries all seven light
/// samples so the renderer can mix channels itself.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshPart {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub light: Vec<u8>,
    pub idx: Vec<u32>,
}

impl MeshPart {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Light samples of vertex `v`, indexed by `LightChannel::index`.
    pub fn vertex_light(&self, v: usize) -> Option<[u8; LightChannel::COUNT]> {
        let s = self.light.get(v * LightChannel::COUNT..(v + 1) * LightChannel::COUNT)?;
        let mut out = [0u8; LightChannel::COUNT];
        out.copy_from_slice(s);
        Some(out)
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.pos.len() % 3 != 0 {
            return Err("position stream is not a multiple of 3");
        }
        let n = self.vertex_count();
        if self.norm.len() != n * 3 {
            return Err("normal count differs from vertex count");
        }
        if self.uv.len() != n * 2 {
            return Err("uv count differs from vertex count");
        }
        if self.light.len() != n * LightChannel::COUNT {
            return Err("light sample count differs from vertex count");
        }
        if self.idx.len() % 3 != 0 {
            return Err("index stream is not a list of triangles");
        }
        if self.idx.iter().any(|&i| i as usize >= n) {
            return Err("index out of range");
        }
        Ok(())
    }
}

/// Renderer-facing geometry of one chunk, grouped by skin key.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub coords: Coords,
    /// Voxel-space bounds of the emitted geometry.
    pub bounds: Region,
    pub parts: HashMap<String, MeshPart>,
}

impl ChunkMesh {
    pub fn new(coords: Coords) -> Self {
        Self {
            coords,
            bounds: Region::empty(),
            parts: HashMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ChunkError> {
        for (skin, part) in &self.parts {
            part.check().map_err(|reason| ChunkError::MeshNotReady {
                part: skin.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.values().map(MeshPart::triangle_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.values().all(MeshPart::is_empty)
    }
}
