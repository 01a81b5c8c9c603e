use crate::capability::Capability;
use crate::fixed::Vec3;
use crate::fluid::ResourceContainer;
use crate::id::BlockPos;
use crate::item::{ItemHandler, ItemStack};

/// The world as seen by a fuel engine.
///
/// Lookups return the handle currently exposed at a position, or `None` when
/// nothing there exposes that capability. Implementations are expected to
/// hand out clones of one handle per container, invalidating it when the
/// container goes away. All methods take `&self`; the engine runs on the
/// owning thread only, so implementations use interior mutability.
pub trait Level {
    /// Whether `pos` is loaded. Unloaded positions are never queried.
    fn is_loaded(&self, pos: BlockPos) -> bool {
        let _ = pos;
        true
    }

    fn fluid_handler(&self, pos: BlockPos) -> Option<Capability<dyn ResourceContainer>>;

    fn item_handler(&self, pos: BlockPos) -> Option<Capability<dyn ItemHandler>>;

    /// Drop `stack` into the world as an item entity at `at`.
    fn spawn_item(&self, at: Vec3, stack: ItemStack);
}
