use serde::Deserialize;

// Top-level voxel types file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct VoxelTypesConfig {
    #[serde(default)]
    pub types: Vec<VoxelTypeDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VoxelTypeDef {
    pub name: String,
    #[serde(default)]
    pub solid: Option<bool>,
    // Defaults to `solid` when absent.
    #[serde(default)]
    pub opaque: Option<bool>,
    // Renderer-side skin key; defaults to the type name.
    #[serde(default)]
    pub skin: Option<String>,
    // Point-light level, 1..=255.
    #[serde(default)]
    pub emission: Option<u16>,
}

impl VoxelTypeDef {
    pub fn solid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid: Some(true),
            opaque: Some(true),
            skin: None,
            emission: None,
        }
    }

    pub fn transparent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid: Some(true),
            opaque: Some(false),
            skin: None,
            emission: None,
        }
    }

    pub fn emitter(name: &str, level: u16) -> Self {
        Self {
            name: name.to_string(),
            solid: Some(true),
            opaque: Some(true),
            skin: None,
            emission: Some(level),
        }
    }
}
