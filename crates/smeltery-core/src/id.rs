use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies an invalidation listener registered on a capability.
    pub struct ListenerId;
}

/// Identifies a fluid type. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FluidId(pub u32);

impl FluidId {
    /// The "no fluid" id. Empty tanks report this.
    pub const EMPTY: FluidId = FluidId(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// Identifies an item type in the [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// The "no item" id. Empty slots report this.
    pub const AIR: ItemId = ItemId(0);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// A block position in the world. Missing coordinates deserialize as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translate this position by `other`.
    pub fn offset(self, other: BlockPos) -> Self {
        Self::new(
            self.x.wrapping_add(other.x),
            self.y.wrapping_add(other.y),
            self.z.wrapping_add(other.z),
        )
    }

    /// The offset that takes `other` to `self`.
    pub fn subtract(self, other: BlockPos) -> Self {
        Self::new(
            self.x.wrapping_sub(other.x),
            self.y.wrapping_sub(other.y),
            self.z.wrapping_sub(other.z),
        )
    }
}
