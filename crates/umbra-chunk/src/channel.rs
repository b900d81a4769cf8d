use std::fmt;

use umbra_geom::Face;

/// One of the seven independent light fields stored per voxel.
///
/// The six sun channels are named after the signed axis they are privileged
/// along; `Point` carries emitter light and has no preferred direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightChannel {
    Xp = 0,
    Xn = 1,
    Yp = 2,
    Yn = 3,
    Zp = 4,
    Zn = 5,
    Point = 6,
}

impl LightChannel {
    pub const COUNT: usize = 7;

    pub const ALL: [LightChannel; 7] = [
        LightChannel::Xp,
        LightChannel::Xn,
        LightChannel::Yp,
        LightChannel::Yn,
        LightChannel::Zp,
        LightChannel::Zn,
        LightChannel::Point,
    ];

    pub const SUN: [LightChannel; 6] = [
        LightChannel::Xp,
        LightChannel::Xn,
        LightChannel::Yp,
        LightChannel::Yn,
        LightChannel::Zp,
        LightChannel::Zn,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<LightChannel> {
        Self::ALL.get(i).copied()
    }

    /// Signed axis a sun channel is named after; `None` for `Point`.
    #[inline]
    pub fn sun_face(self) -> Option<Face> {
        match self {
            LightChannel::Xp => Some(Face::PosX),
            LightChannel::Xn => Some(Face::NegX),
            LightChannel::Yp => Some(Face::PosY),
            LightChannel::Yn => Some(Face::NegY),
            LightChannel::Zp => Some(Face::PosZ),
            LightChannel::Zn => Some(Face::NegZ),
            LightChannel::Point => None,
        }
    }

    #[inline]
    pub fn sun_for(face: Face) -> LightChannel {
        match face {
            Face::PosX => LightChannel::Xp,
            Face::NegX => LightChannel::Xn,
            Face::PosY => LightChannel::Yp,
            Face::NegY => LightChannel::Yn,
            Face::PosZ => LightChannel::Zp,
            Face::NegZ => LightChannel::Zn,
        }
    }

    #[inline]
    pub fn is_sun(self) -> bool {
        self != LightChannel::Point
    }

    pub fn name(self) -> &'static str {
        match self {
            LightChannel::Xp => "x+",
            LightChannel::Xn => "x-",
            LightChannel::Yp => "y+",
            LightChannel::Yn => "y-",
            LightChannel::Zp => "z+",
            LightChannel::Zn => "z-",
            LightChannel::Point => "point",
        }
    }
}

impl fmt::Display for LightChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
