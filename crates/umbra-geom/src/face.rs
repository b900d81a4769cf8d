use crate::coords::Coords;
use crate::vec3::Vec3;

/// One of the six signed axes; also used as a step direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    #[inline]
    pub fn from_index(i: usize) -> Option<Face> {
        Face::ALL.get(i).copied()
    }

    /// 0 for X, 1 for Y, 2 for Z.
    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    #[inline]
    pub fn sign(self) -> i32 {
        if self.is_positive() { 1 } else { -1 }
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Integer grid delta when stepping out of this face.
    #[inline]
    pub fn delta(self) -> Coords {
        Coords::ZERO.with_axis(self.axis(), self.sign())
    }

    /// Face whose delta is `d`, if `d` is a unit axis step.
    pub fn from_delta(d: Coords) -> Option<Face> {
        Face::ALL.into_iter().find(|f| f.delta() == d)
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let d = self.delta();
        Vec3::new(d.x as f32, d.y as f32, d.z as f32)
    }
}
