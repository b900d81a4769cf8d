use std::collections::{HashSet, VecDeque};

use umbra_chunk::{LightChannel, VoxelChunk};
use umbra_geom::Coords;
use umbra_world::VoxelVolume;

use crate::channel::{ChannelTraits, LIGHT_DECREMENT, MAX_LIGHT};
use crate::cursor::{ChunkCursor, TypeLookup};

enum Retract {
    Cascade(u8),
    // cascades, but the cell keeps its own emission and re-spreads it
    Reseed(u8),
    Refill,
    Keep,
}

/// Work queues of one light channel.
pub struct ChannelPropagator {
    traits: ChannelTraits,
    propagate: VecDeque<Coords>,
    depropagate: VecDeque<(Coords, u8)>,
    // chunks written by queue_* calls before the next run
    touched: HashSet<Coords>,
}

impl ChannelPropagator {
    pub fn new(channel: LightChannel) -> Self {
        Self {
            traits: ChannelTraits::of(channel),
            propagate: VecDeque::new(),
            depropagate: VecDeque::new(),
            touched: HashSet::new(),
        }
    }

    #[inline]
    pub fn channel(&self) -> LightChannel {
        self.traits.channel
    }

    #[inline]
    pub fn traits(&self) -> ChannelTraits {
        self.traits
    }

    pub fn pending(&self) -> usize {
        self.propagate.len() + self.depropagate.len()
    }

    pub fn queue_for_propagation(&mut self, cell: Coords) {
        self.propagate.push_back(cell);
    }

    pub fn queue_neighbors_for_propagation(&mut self, cell: Coords) {
        for (_, n) in cell.neighbors() {
            self.propagate.push_back(n);
        }
    }

    /// Zeroes `cell` and schedules retraction of the light it held.
    pub fn queue_for_depropagation(&mut self, volume: &VoxelVolume, cell: Coords) {
        let ch = self.traits.channel;
        let Some(chunk) = volume.chunk_containing(cell) else {
            return;
        };
        let local = cell.local_in_chunk();
        let Some(old) = chunk.light(local, ch) else {
            return;
        };
        if old == 0 {
            return;
        }
        chunk.set_light(local, ch, 0);
        self.touched.insert(chunk.coords());
        self.depropagate.push_back((cell, old));
    }

    pub fn queue_neighbors_for_depropagation(&mut self, volume: &VoxelVolume, cell: Coords) {
        for (_, n) in cell.neighbors() {
            self.queue_for_depropagation(volume, n);
        }
    }

    /// Writes `level` into `local` of `chunk` if it raises it, and queues the
    /// cell either way.
    pub(crate) fn seed_cell(&mut self, chunk: &VoxelChunk, local: Coords, level: u8) -> bool {
        let Some(current) = chunk.light(local, self.traits.channel) else {
            return false;
        };
        if current < level {
            chunk.set_light(local, self.traits.channel, level);
            self.touched.insert(chunk.coords());
        }
        self.propagate
            .push_back(Coords::local_to_volume(chunk.coords(), local));
        true
    }

    /// Drains depropagation, then propagation, to a fixed point. Every chunk
    /// whose light changed is added to `touched`.
    pub(crate) fn run(&mut self, volume: &VoxelVolume, types: &TypeLookup, touched: &mut HashSet<Coords>) {
        touched.extend(self.touched.drain());
        let traits = self.traits;
        let ch = traits.channel;
        let mut cursor = ChunkCursor::new(volume, types);

        while let Some((cell, original)) = self.depropagate.pop_front() {
            for (face, n) in cell.neighbors() {
                let step = cursor.with_cell(n, |chunk, i, info| {
                    let l = chunk.light_at_index(i, ch);
                    // only the point channel carries voxel emission
                    let own = if ch == LightChannel::Point { info.emission } else { 0 };
                    if info.opaque && own == 0 {
                        return Retract::Keep;
                    }
                    if l <= own {
                        return if l != 0 { Retract::Refill } else { Retract::Keep };
                    }
                    if l < original || (original == MAX_LIGHT && traits.is_privileged(face)) {
                        chunk.set_light_at_index(i, ch, own);
                        if own > 0 { Retract::Reseed(l) } else { Retract::Cascade(l) }
                    } else if l >= original {
                        Retract::Refill
                    } else {
                        Retract::Keep
                    }
                });
                match step {
                    Some(Retract::Cascade(l)) => {
                        touched.insert(n.chunk_of());
                        self.depropagate.push_back((n, l));
                    }
                    Some(Retract::Reseed(l)) => {
                        touched.insert(n.chunk_of());
                        self.depropagate.push_back((n, l));
                        self.propagate.push_back(n);
                    }
                    Some(Retract::Refill) => self.propagate.push_back(n),
                    _ => {}
                }
            }
        }

        while let Some(cell) = self.propagate.pop_front() {
            let Some(level) = cursor.with_cell(cell, |chunk, i, _| chunk.light_at_index(i, ch)) else {
                continue;
            };
            if level <= LIGHT_DECREMENT {
                continue;
            }
            let next = level - LIGHT_DECREMENT;
            for (face, n) in cell.neighbors() {
                let raised = cursor
                    .with_cell(n, |chunk, i, info| {
                        if info.opaque {
                            return false;
                        }
                        let l = chunk.light_at_index(i, ch);
                        let target = if level == MAX_LIGHT && traits.is_privileged(face) {
                            if l == MAX_LIGHT {
                                return false;
                            }
                            MAX_LIGHT
                        } else if l < next {
                            next
                        } else {
                            return false;
                        };
                        chunk.set_light_at_index(i, ch, target);
                        true
                    })
                    .unwrap_or(false);
                if raised {
                    touched.insert(n.chunk_of());
                    self.propagate.push_back(n);
                }
            }
        }
    }
}
