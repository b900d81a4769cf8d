//! Per-channel flood-fill light propagation over a `VoxelVolume`.
#![forbid(unsafe_code)]

mod channel;
mod cursor;
mod engine;
mod propagator;
mod relight;
mod seed;

pub use channel::{ChannelTraits, LIGHT_DECREMENT, MAX_LIGHT};
pub use engine::{LightPropagator, light_volume};
pub use propagator::ChannelPropagator;
pub use seed::SeedStats;

#[cfg(test)]
mod tests;
