use umbra_chunk::LightChannel;
use umbra_geom::Coords;
use umbra_voxel::Voxel;
use umbra_world::VoxelVolume;

use crate::channel::MAX_LIGHT;
use crate::engine::LightPropagator;
use crate::seed::on_sun_boundary;

impl LightPropagator {
    /// Queues the light updates implied by `cell` changing from `old` to
    /// `new`. The volume must already hold `new`. Call `run` afterwards.
    pub fn on_voxel_changed(&mut self, volume: &VoxelVolume, cell: Coords, old: Voxel, new: Voxel) {
        let types = volume.types();
        let was_opaque = types.is_opaque(old);
        let now_opaque = types.is_opaque(new);

        if now_opaque && !was_opaque {
            for ch in LightChannel::ALL {
                self.queue_for_depropagation(volume, ch, cell);
            }
        } else if was_opaque && !now_opaque {
            for ch in LightChannel::ALL {
                self.queue_neighbors_for_propagation(ch, cell);
            }
            if let Some(chunk) = volume.chunk_containing(cell) {
                for ch in LightChannel::SUN {
                    let Some(face) = ch.sun_face() else {
                        continue;
                    };
                    if on_sun_boundary(volume, cell, face) {
                        self.channel_mut(ch)
                            .seed_cell(&chunk, cell.local_in_chunk(), MAX_LIGHT);
                    }
                }
            }
        }

        let old_emission = types.emission(old);
        let new_emission = types.emission(new);
        if old_emission != new_emission {
            let point = self.channel_mut(LightChannel::Point);
            if old_emission > 0 {
                // no-op when the opacity branch already zeroed the cell
                point.queue_for_depropagation(volume, cell);
            }
            if new_emission > 0 {
                if let Some(chunk) = volume.chunk_containing(cell) {
                    point.seed_cell(&chunk, cell.local_in_chunk(), new_emission);
                }
            }
        }
    }
}
