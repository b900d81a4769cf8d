use serde::{Deserialize, Serialize};

use crate::coords::{CHUNK_SIZE, Coords};

/// Axis-aligned integer bounds, `min` inclusive and `max` exclusive.
///
/// An empty region has `min > max` on every axis so the first
/// `expand_to_include` snaps both bounds onto the included point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub min: Coords,
    pub max: Coords,
}

impl Default for Region {
    fn default() -> Self {
        Self::empty()
    }
}

impl Region {
    #[inline]
    pub const fn new(min: Coords, max: Coords) -> Self {
        Self { min, max }
    }

    #[inline]
    pub const fn empty() -> Self {
        Self {
            min: Coords::splat(i32::MAX),
            max: Coords::splat(i32::MIN),
        }
    }

    /// Region holding exactly `c`.
    #[inline]
    pub fn around(c: Coords) -> Self {
        Self::new(c, c + Coords::ONE)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.min.all_lt(self.max)
    }

    /// Grows both bounds so that `c` is contained. Never shrinks.
    pub fn expand_to_include(&mut self, c: Coords) {
        self.min = self.min.min(c);
        self.max = self.max.max(c + Coords::ONE);
    }

    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Region::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[inline]
    pub fn contains(&self, c: Coords) -> bool {
        c.all_ge(self.min) && c.all_lt(self.max)
    }

    #[inline]
    pub fn size(&self) -> Coords {
        if self.is_empty() {
            Coords::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn volume(&self) -> i64 {
        let s = self.size();
        i64::from(s.x) * i64::from(s.y) * i64::from(s.z)
    }

    /// Voxel-space bounds of a chunk-space region.
    #[inline]
    pub fn voxel_region(&self) -> Region {
        if self.is_empty() {
            return Region::empty();
        }
        Region::new(self.min * CHUNK_SIZE, self.max * CHUNK_SIZE)
    }

    pub fn iter(&self) -> RegionIter {
        RegionIter {
            region: *self,
            next: if self.is_empty() { None } else { Some(self.min) },
        }
    }
}

impl IntoIterator for Region {
    type Item = Coords;
    type IntoIter = RegionIter;

    fn into_iter(self) -> RegionIter {
        self.iter()
    }
}

/// X-fastest iteration over every coordinate of a region.
pub struct RegionIter {
    region: Region,
    next: Option<Coords>,
}

impl Iterator for RegionIter {
    type Item = Coords;

    fn next(&mut self) -> Option<Coords> {
        let cur = self.next?;
        let r = &self.region;
        let mut n = cur;
        n.x += 1;
        if n.x >= r.max.x {
            n.x = r.min.x;
            n.y += 1;
            if n.y >= r.max.y {
                n.y = r.min.y;
                n.z += 1;
            }
        }
        self.next = if n.z >= r.max.z { None } else { Some(n) };
        Some(cur)
    }
}
