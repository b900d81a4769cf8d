use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use umbra_geom::{Coords, Region};
use umbra_runtime::RuntimeConfig;
use umbra_voxel::{TypeError, VoxelTypeTable};
use umbra_world::{TerrainMode, TerrainParams};

pub const DEFAULT_CONFIG_PATH: &str = "config/umbra.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown terrain mode `{0}` (expected `flat` or `noise`)")]
    Mode(String),
    #[error("chunk extent must be positive on every axis, got {0:?}")]
    Extent([i32; 3]),
    #[error(transparent)]
    Types(#[from] TypeError),
}

#[derive(Parser, Debug, Default)]
#[command(name = "umbra", about = "Generate, light and edit a chunked voxel world")]
pub struct CliArgs {
    /// Config file; defaults to config/umbra.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace or an env_logger filter string).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Chunk extent of the generated region, as x,y,z.
    #[arg(long, value_delimiter = ',', num_args = 3)]
    pub chunks: Option<Vec<i32>>,

    #[arg(long)]
    pub seed: Option<i32>,

    /// Terrain mode: flat or noise.
    #[arg(long)]
    pub mode: Option<String>,

    #[arg(long)]
    pub stage_workers: Option<usize>,

    #[arg(long)]
    pub compute_workers: Option<usize>,

    /// Voxel type definitions (TOML).
    #[arg(long)]
    pub types: Option<PathBuf>,

    /// Number of scripted edits to run after generation.
    #[arg(long)]
    pub edits: Option<usize>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub chunks: [i32; 3],
    #[serde(flatten)]
    pub terrain: TerrainParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunks: [4, 2, 4],
            terrain: TerrainParams::default(),
        }
    }
}

impl WorldConfig {
    /// Chunk-space region, centred on the origin in x and z.
    pub fn region(&self) -> Region {
        let [x, y, z] = self.chunks;
        let min = Coords::new(-(x / 2), 0, -(z / 2));
        Region::new(min, min + Coords::new(x, y, z))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    pub path: Option<PathBuf>,
}

impl TypesConfig {
    pub fn load(&self) -> Result<VoxelTypeTable, ConfigError> {
        match &self.path {
            Some(p) => Ok(VoxelTypeTable::load_from_path(p)?),
            None => Ok(VoxelTypeTable::builtin()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub edits: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { edits: 8 }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub world: WorldConfig,
    pub runtime: RuntimeConfig,
    pub types: TypesConfig,
    pub script: ScriptConfig,
}

impl AppConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Explicit path, else the default file if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(ref level) = args.log_level {
            self.log_level = Some(level.clone());
        }
        if let Some(ref c) = args.chunks {
            if let [x, y, z] = c[..] {
                self.world.chunks = [x, y, z];
            }
        }
        if let Some(seed) = args.seed {
            self.world.terrain.seed = seed;
        }
        if let Some(ref mode) = args.mode {
            self.world.terrain.mode = parse_mode(mode)?;
        }
        if let Some(n) = args.stage_workers {
            self.runtime.stage_workers = n;
        }
        if let Some(n) = args.compute_workers {
            self.runtime.compute_workers = n;
        }
        if let Some(ref p) = args.types {
            self.types.path = Some(p.clone());
        }
        if let Some(n) = args.edits {
            self.script.edits = n;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.chunks.iter().any(|&n| n <= 0) {
            return Err(ConfigError::Extent(self.world.chunks));
        }
        Ok(())
    }
}

fn parse_mode(s: &str) -> Result<TerrainMode, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "flat" => Ok(TerrainMode::Flat),
        "noise" => Ok(TerrainMode::Noise),
        _ => Err(ConfigError::Mode(s.to_string())),
    }
}
