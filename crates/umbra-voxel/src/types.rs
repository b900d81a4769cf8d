use serde::{Deserialize, Serialize};

/// Handle into a `VoxelTypeTable`. The table owns the canonical `VoxelType`;
/// everything else holds this handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct VoxelTypeId(pub u16);

impl VoxelTypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Expanded voxel: a type reference plus a small payload.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Hash)]
pub struct Voxel {
    pub ty: Option<VoxelTypeId>,
    pub data: u16,
}

impl Voxel {
    pub const EMPTY: Voxel = Voxel { ty: None, data: 0 };

    #[inline]
    pub const fn of(ty: VoxelTypeId) -> Self {
        Self { ty: Some(ty), data: 0 }
    }

    #[inline]
    pub const fn with_data(ty: VoxelTypeId, data: u16) -> Self {
        Self { ty: Some(ty), data }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ty.is_none()
    }
}

/// Compact stored form: a per-volume type index (0 = no type) and the payload.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Hash, Serialize, Deserialize)]
pub struct VoxelData {
    pub type_index: u16,
    pub data: u16,
}

impl VoxelData {
    pub const EMPTY: VoxelData = VoxelData { type_index: 0, data: 0 };

    #[inline]
    pub const fn new(type_index: u16, data: u16) -> Self {
        Self { type_index, data }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_index == 0
    }

    /// Packs into one word: type index in the high half, payload in the low half.
    #[inline]
    pub const fn to_bits(self) -> u32 {
        ((self.type_index as u32) << 16) | self.data as u32
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            type_index: (bits >> 16) as u16,
            data: (bits & 0xFFFF) as u16,
        }
    }
}
