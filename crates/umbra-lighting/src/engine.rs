use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use rayon::prelude::*;
use umbra_chunk::LightChannel;
use umbra_geom::Coords;
use umbra_world::VoxelVolume;

use crate::cursor::TypeLookup;
use crate::propagator::ChannelPropagator;

/// The seven channel propagators of one volume.
pub struct LightPropagator {
    channels: [ChannelPropagator; LightChannel::COUNT],
}

impl Default for LightPropagator {
    fn default() -> Self {
        Self::new()
    }
}

impl LightPropagator {
    pub fn new() -> Self {
        Self {
            channels: LightChannel::ALL.map(ChannelPropagator::new),
        }
    }

    #[inline]
    pub fn channel(&self, ch: LightChannel) -> &ChannelPropagator {
        &self.channels[ch.index()]
    }

    #[inline]
    pub fn channel_mut(&mut self, ch: LightChannel) -> &mut ChannelPropagator {
        &mut self.channels[ch.index()]
    }

    pub fn pending(&self) -> usize {
        self.channels.iter().map(ChannelPropagator::pending).sum()
    }

    pub fn queue_for_propagation(&mut self, ch: LightChannel, cell: Coords) {
        self.channel_mut(ch).queue_for_propagation(cell);
    }

    pub fn queue_for_depropagation(&mut self, volume: &VoxelVolume, ch: LightChannel, cell: Coords) {
        self.channel_mut(ch).queue_for_depropagation(volume, cell);
    }

    pub fn queue_neighbors_for_propagation(&mut self, ch: LightChannel, cell: Coords) {
        self.channel_mut(ch).queue_neighbors_for_propagation(cell);
    }

    pub fn queue_neighbors_for_depropagation(&mut self, volume: &VoxelVolume, ch: LightChannel, cell: Coords) {
        self.channel_mut(ch).queue_neighbors_for_depropagation(volume, cell);
    }

    /// Runs all channels in parallel on the current rayon pool and returns the
    /// chunks whose light changed.
    pub fn run(&mut self, volume: &VoxelVolume) -> HashSet<Coords> {
        let start = Instant::now();
        let pending = self.pending();
        let types = TypeLookup::new(volume);
        let touched = Mutex::new(HashSet::new());
        self.channels.par_iter_mut().for_each(|prop| {
            let mut local = HashSet::new();
            prop.run(volume, &types, &mut local);
            touched
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(local);
        });
        let touched = touched.into_inner().unwrap_or_else(PoisonError::into_inner);
        log::debug!(
            target: "lighting",
            "propagated {} queued cells, {} chunks touched in {:?}",
            pending,
            touched.len(),
            start.elapsed()
        );
        touched
    }
}

/// Seeds the whole volume and runs every channel to convergence.
pub fn light_volume(volume: &VoxelVolume) -> HashSet<Coords> {
    let mut prop = LightPropagator::new();
    let stats = prop.seed_volume(volume);
    log::info!(
        target: "lighting",
        "seeded {} sun cells and {} emitters over {} chunks",
        stats.sun_cells,
        stats.emitters,
        volume.chunk_count()
    );
    prop.run(volume)
}
