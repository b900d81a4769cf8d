use std::collections::HashMap;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;
use umbra_chunk::{CHUNK_VOLUME, VoxelChunk};
use umbra_geom::Coords;
use umbra_voxel::{Voxel, VoxelData, VoxelTypeId, VoxelTypeTable};

use crate::error::VolumeError;
use crate::volume::VoxelVolume;

/// Supplies voxel content for generated chunks.
pub trait TerrainSource: Send + Sync {
    fn voxel_at(&self, global: Coords) -> Voxel;

    fn name(&self) -> &'static str;

    /// Fills `chunk` from `voxel_at` and returns the number of non-empty voxels.
    fn fill(&self, volume: &VoxelVolume, chunk: &VoxelChunk) -> Result<usize, VolumeError> {
        let mut compacted: HashMap<Voxel, VoxelData> = HashMap::new();
        let mut buf = Vec::with_capacity(CHUNK_VOLUME);
        let mut filled = 0usize;
        for i in 0..CHUNK_VOLUME {
            let local = VoxelChunk::local_from_index(i);
            let v = self.voxel_at(Coords::local_to_volume(chunk.coords(), local));
            let d = match compacted.get(&v) {
                Some(d) => *d,
                None => {
                    let d = volume.compact(v)?;
                    compacted.insert(v, d);
                    d
                }
            };
            if !d.is_empty() {
                filled += 1;
            }
            buf.push(d);
        }
        chunk.fill_voxels(&buf)?;
        Ok(filled)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerrainMode {
    Flat,
    #[default]
    Noise,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub mode: TerrainMode,
    pub seed: i32,
    /// Top of the solid layer for flat worlds (exclusive, voxel space).
    pub flat_height: i32,
    pub base_height: i32,
    pub amplitude: f32,
    pub frequency: f32,
    /// Chance that a surface column carries an emitter on top.
    pub lamp_density: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Noise,
            seed: 1337,
            flat_height: 20,
            base_height: 24,
            amplitude: 10.0,
            frequency: 0.02,
            lamp_density: 0.002,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Palette {
    stone: VoxelTypeId,
    dirt: VoxelTypeId,
    grass: VoxelTypeId,
    lamp: Option<VoxelTypeId>,
}

impl Palette {
    fn resolve(types: &VoxelTypeTable) -> Result<Self, VolumeError> {
        Ok(Self {
            stone: types.require("stone")?,
            dirt: types.require("dirt")?,
            grass: types.require("grass")?,
            lamp: types.id_by_name("lamp"),
        })
    }

    #[inline]
    fn layered(&self, y: i32, height: i32) -> Voxel {
        if y >= height {
            Voxel::EMPTY
        } else if y == height - 1 {
            Voxel::of(self.grass)
        } else if y >= height - 4 {
            Voxel::of(self.dirt)
        } else {
            Voxel::of(self.stone)
        }
    }
}

impl TerrainParams {
    pub fn build(&self, types: &VoxelTypeTable) -> Result<Box<dyn TerrainSource>, VolumeError> {
        let palette = Palette::resolve(types)?;
        Ok(match self.mode {
            TerrainMode::Flat => Box::new(FlatTerrain {
                height: self.flat_height,
                palette,
            }),
            TerrainMode::Noise => Box::new(NoiseTerrain::new(self, palette)),
        })
    }
}

/// Horizontal layers of stone, dirt and grass below `height`.
pub struct FlatTerrain {
    height: i32,
    palette: Palette,
}

impl FlatTerrain {
    pub fn new(types: &VoxelTypeTable, height: i32) -> Result<Self, VolumeError> {
        Ok(Self {
            height,
            palette: Palette::resolve(types)?,
        })
    }
}

impl TerrainSource for FlatTerrain {
    fn voxel_at(&self, global: Coords) -> Voxel {
        self.palette.layered(global.y, self.height)
    }

    fn name(&self) -> &'static str {
        "flat"
    }
}

/// Heightfield terrain from 2D OpenSimplex noise with sparse surface lamps.
pub struct NoiseTerrain {
    noise: FastNoiseLite,
    seed: i32,
    base_height: i32,
    amplitude: f32,
    lamp_density: f32,
    palette: Palette,
}

// splitmix-style column hash in [0, 1)
#[inline]
fn column_hash(seed: i32, x: i32, z: i32) -> f32 {
    let mut h = (seed as u64) ^ ((x as u32 as u64) << 32) ^ (z as u32 as u64);
    h = h.wrapping_add(0x9E37_79B9_7F4A_7C15);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    (h >> 40) as f32 / (1u64 << 24) as f32
}

impl NoiseTerrain {
    fn new(params: &TerrainParams, palette: Palette) -> Self {
        let mut noise = FastNoiseLite::with_seed(params.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(params.frequency));
        Self {
            noise,
            seed: params.seed,
            base_height: params.base_height,
            amplitude: params.amplitude,
            lamp_density: params.lamp_density,
            palette,
        }
    }

    pub fn with_types(types: &VoxelTypeTable, params: &TerrainParams) -> Result<Self, VolumeError> {
        Ok(Self::new(params, Palette::resolve(types)?))
    }

    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let n = self.noise.get_noise_2d(x as f32, z as f32);
        self.base_height + (n * self.amplitude).round() as i32
    }
}

impl TerrainSource for NoiseTerrain {
    fn voxel_at(&self, global: Coords) -> Voxel {
        let h = self.height_at(global.x, global.z);
        if global.y == h {
            if let Some(lamp) = self.palette.lamp {
                if column_hash(self.seed, global.x, global.z) < self.lamp_density {
                    return Voxel::of(lamp);
                }
            }
        }
        self.palette.layered(global.y, h)
    }

    fn name(&self) -> &'static str {
        "noise"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_layers_top_down() {
        let types = VoxelTypeTable::builtin();
        let t = FlatTerrain::new(&types, 10).unwrap();
        let name = |y| {
            t.voxel_at(Coords::new(0, y, 0))
                .ty
                .and_then(|id| types.get(id))
                .map(|ty| ty.name.clone())
        };
        assert_eq!(name(10), None);
        assert_eq!(name(9).as_deref(), Some("grass"));
        assert_eq!(name(6).as_deref(), Some("dirt"));
        assert_eq!(name(5).as_deref(), Some("stone"));
        assert_eq!(name(-100).as_deref(), Some("stone"));
    }

    #[test]
    fn column_hash_is_unit_interval() {
        for x in -50..50 {
            let h = column_hash(7, x, x * 3);
            assert!((0.0..1.0).contains(&h));
        }
    }

    #[test]
    fn missing_palette_type_is_an_error() {
        let types = VoxelTypeTable::new();
        assert!(TerrainParams::default().build(&types).is_err());
    }
}
