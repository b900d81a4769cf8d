mod light;
mod mesh;
mod terrain;

pub use light::LightCalculator;
pub use mesh::MeshReadiness;
pub use terrain::TerrainGenerator;
