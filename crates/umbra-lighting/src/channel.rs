use umbra_chunk::LightChannel;
use umbra_geom::Face;

/// Full-strength light. Tie-breaks in both passes depend on this exact value.
pub const MAX_LIGHT: u8 = 255;

/// Attenuation per step.
pub const LIGHT_DECREMENT: u8 = MAX_LIGHT / 16;

/// Behaviour switches of one channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelTraits {
    pub channel: LightChannel,
    /// Direction in which full-strength light does not attenuate.
    pub privileged: Option<Face>,
}

impl ChannelTraits {
    pub fn of(channel: LightChannel) -> Self {
        Self {
            channel,
            privileged: channel.sun_face(),
        }
    }

    #[inline]
    pub fn is_privileged(&self, step: Face) -> bool {
        self.privileged == Some(step)
    }
}
