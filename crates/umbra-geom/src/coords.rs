use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::face::Face;

/// Edge length of a chunk in voxels.
pub const CHUNK_SIZE: i32 = 32;

/// Integer triple used both as a chunk-space and a voxel-space key.
///
/// Which space a value lives in depends on context; the conversion helpers
/// below are the only place the two meet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coords {
    pub const ZERO: Coords = Coords::new(0, 0, 0);
    pub const ONE: Coords = Coords::new(1, 1, 1);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn step(self, face: Face) -> Self {
        self + face.delta()
    }

    /// The six face neighbours, in `Face::ALL` order.
    #[inline]
    pub fn neighbors(self) -> [(Face, Coords); 6] {
        Face::ALL.map(|f| (f, self.step(f)))
    }

    #[inline]
    pub fn axis(self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    pub fn with_axis(mut self, axis: usize, v: i32) -> Self {
        match axis {
            0 => self.x = v,
            1 => self.y = v,
            _ => self.z = v,
        }
        self
    }

    #[inline]
    pub fn min(self, o: Coords) -> Self {
        Self::new(self.x.min(o.x), self.y.min(o.y), self.z.min(o.z))
    }

    #[inline]
    pub fn max(self, o: Coords) -> Self {
        Self::new(self.x.max(o.x), self.y.max(o.y), self.z.max(o.z))
    }

    #[inline]
    pub fn all_lt(self, o: Coords) -> bool {
        self.x < o.x && self.y < o.y && self.z < o.z
    }

    #[inline]
    pub fn all_le(self, o: Coords) -> bool {
        self.x <= o.x && self.y <= o.y && self.z <= o.z
    }

    #[inline]
    pub fn all_ge(self, o: Coords) -> bool {
        o.all_le(self)
    }

    #[inline]
    pub fn all_gt(self, o: Coords) -> bool {
        o.all_lt(self)
    }

    /// Euclidean division, so negative voxel coordinates floor toward -inf.
    #[inline]
    pub fn div_euclid(self, d: i32) -> Self {
        Self::new(self.x.div_euclid(d), self.y.div_euclid(d), self.z.div_euclid(d))
    }

    #[inline]
    pub fn rem_euclid(self, d: i32) -> Self {
        Self::new(self.x.rem_euclid(d), self.y.rem_euclid(d), self.z.rem_euclid(d))
    }

    /// Chunk coordinate owning the voxel at `self` (voxel space).
    #[inline]
    pub fn chunk_of(self) -> Coords {
        self.div_euclid(CHUNK_SIZE)
    }

    /// Chunk-local position of global voxel `self` inside its owning chunk.
    #[inline]
    pub fn local_in_chunk(self) -> Coords {
        self.rem_euclid(CHUNK_SIZE)
    }

    /// Global voxel coordinate of `local` inside chunk `chunk`.
    #[inline]
    pub fn local_to_volume(chunk: Coords, local: Coords) -> Coords {
        chunk * CHUNK_SIZE + local
    }

    /// Chunk-local coordinate of `global` relative to chunk `chunk`. The result is
    /// only in `[0, CHUNK_SIZE)` when `chunk == global.chunk_of()`.
    #[inline]
    pub fn volume_to_local(chunk: Coords, global: Coords) -> Coords {
        global - chunk * CHUNK_SIZE
    }

    #[inline]
    pub fn in_chunk_bounds(self) -> bool {
        self.all_ge(Coords::ZERO) && self.all_lt(Coords::splat(CHUNK_SIZE))
    }

    #[inline]
    pub fn distance_sq(self, other: Coords) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        let dz = i64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for Coords {
    fn from(v: (i32, i32, i32)) -> Self {
        Self::new(v.0, v.1, v.2)
    }
}

impl From<[i32; 3]> for Coords {
    fn from(v: [i32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Coords> for (i32, i32, i32) {
    fn from(c: Coords) -> Self {
        (c.x, c.y, c.z)
    }
}

macro_rules! componentwise {
    ($tr:ident, $f:ident, $op:tt) => {
        impl $tr for Coords {
            type Output = Coords;
            #[inline]
            fn $f(self, rhs: Coords) -> Coords {
                Coords::new(self.x $op rhs.x, self.y $op rhs.y, self.z $op rhs.z)
            }
        }

        impl $tr<i32> for Coords {
            type Output = Coords;
            #[inline]
            fn $f(self, rhs: i32) -> Coords {
                Coords::new(self.x $op rhs, self.y $op rhs, self.z $op rhs)
            }
        }
    };
}

componentwise!(Add, add, +);
componentwise!(Sub, sub, -);
componentwise!(Mul, mul, *);
componentwise!(Div, div, /);
componentwise!(Rem, rem, %);

impl AddAssign for Coords {
    #[inline]
    fn add_assign(&mut self, rhs: Coords) {
        *self = *self + rhs;
    }
}

impl SubAssign for Coords {
    #[inline]
    fn sub_assign(&mut self, rhs: Coords) {
        *self = *self - rhs;
    }
}

impl Neg for Coords {
    type Output = Coords;
    #[inline]
    fn neg(self) -> Coords {
        Coords::new(-self.x, -self.y, -self.z)
    }
}
