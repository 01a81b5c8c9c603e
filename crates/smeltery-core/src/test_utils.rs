//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in the
//! other crates' tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use slotmap::SlotMap;

use crate::capability::Capability;
use crate::fixed::Vec3;
use crate::fluid::{FluidAction, FluidStack, ResourceContainer};
use crate::id::*;
use crate::item::{ItemHandler, ItemStack};
use crate::level::Level;
use crate::tank::FluidTank;

// ===========================================================================
// Fluid and item constructors
// ===========================================================================

pub fn lava() -> FluidId {
    FluidId(1)
}
pub fn water() -> FluidId {
    FluidId(2)
}
pub fn blazing_blood() -> FluidId {
    FluidId(3)
}

pub fn stack(fluid: FluidId, amount: u32) -> FluidStack {
    FluidStack::new(fluid, amount)
}

pub fn tank_with(fluid: FluidId, amount: u32, capacity: u32) -> FluidTank {
    FluidTank::with_fluid(capacity, FluidStack::new(fluid, amount))
}

// ===========================================================================
// CountingTank
// ===========================================================================

/// A [`FluidTank`] that counts how often it is touched.
#[derive(Debug)]
pub struct CountingTank {
    pub tank: FluidTank,
    reads: Cell<u32>,
    pub fills: u32,
    pub drains: u32,
}

impl CountingTank {
    pub fn new(tank: FluidTank) -> Self {
        Self {
            tank,
            reads: Cell::new(0),
            fills: 0,
            drains: 0,
        }
    }

    /// Calls to `fluid_in_tank`.
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    /// Every call of any kind.
    pub fn touches(&self) -> u32 {
        self.reads.get() + self.fills + self.drains
    }

    pub fn reset(&mut self) {
        self.reads.set(0);
        self.fills = 0;
        self.drains = 0;
    }
}

impl ResourceContainer for CountingTank {
    fn tanks(&self) -> usize {
        self.tank.tanks()
    }

    fn fluid_in_tank(&self, tank: usize) -> FluidStack {
        self.reads.set(self.reads.get() + 1);
        self.tank.fluid_in_tank(tank)
    }

    fn tank_capacity(&self, tank: usize) -> u32 {
        self.tank.tank_capacity(tank)
    }

    fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32 {
        self.fills += 1;
        self.tank.fill(resource, action)
    }

    fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack {
        self.drains += 1;
        self.tank.drain(resource, action)
    }

    fn drain_amount(&mut self, max_drain: u32, action: FluidAction) -> FluidStack {
        self.drains += 1;
        self.tank.drain_amount(max_drain, action)
    }
}

// ===========================================================================
// TestLevel
// ===========================================================================

slotmap::new_key_type! {
    /// Identifies an item entity dropped into a [`TestLevel`].
    pub struct EntityId;
}

/// An item entity spawned by [`Level::spawn_item`].
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub at: Vec3,
    pub stack: ItemStack,
}

/// An in-memory [`Level`] with tanks and inventories at positions.
#[derive(Debug, Default)]
pub struct TestLevel {
    tanks: RefCell<BTreeMap<BlockPos, Capability<dyn ResourceContainer>>>,
    inventories: RefCell<BTreeMap<BlockPos, Capability<dyn ItemHandler>>>,
    unloaded: RefCell<BTreeSet<BlockPos>>,
    fluid_lookups: RefCell<BTreeMap<BlockPos, u32>>,
    dropped: RefCell<SlotMap<EntityId, DroppedItem>>,
}

impl TestLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a tank at `pos`, replacing (and invalidating) any previous one.
    /// Returns a typed reference for inspecting the tank directly.
    pub fn add_tank<T: ResourceContainer + 'static>(&self, pos: BlockPos, tank: T) -> Rc<RefCell<T>> {
        let typed = Rc::new(RefCell::new(tank));
        let erased: Rc<RefCell<dyn ResourceContainer>> = typed.clone();
        if let Some(old) = self.tanks.borrow_mut().insert(pos, Capability::new(pos, erased)) {
            old.invalidate();
        }
        typed
    }

    /// Place an inventory at `pos`, replacing (and invalidating) any previous one.
    pub fn add_inventory<T: ItemHandler + 'static>(&self, pos: BlockPos, inv: T) -> Rc<RefCell<T>> {
        let typed = Rc::new(RefCell::new(inv));
        let erased: Rc<RefCell<dyn ItemHandler>> = typed.clone();
        if let Some(old) = self
            .inventories
            .borrow_mut()
            .insert(pos, Capability::new(pos, erased))
        {
            old.invalidate();
        }
        typed
    }

    /// Break the tank at `pos`, invalidating its handle.
    pub fn remove_tank(&self, pos: BlockPos) {
        if let Some(cap) = self.tanks.borrow_mut().remove(&pos) {
            cap.invalidate();
        }
    }

    /// Break the inventory at `pos`, invalidating its handle.
    pub fn remove_inventory(&self, pos: BlockPos) {
        if let Some(cap) = self.inventories.borrow_mut().remove(&pos) {
            cap.invalidate();
        }
    }

    pub fn set_loaded(&self, pos: BlockPos, loaded: bool) {
        if loaded {
            self.unloaded.borrow_mut().remove(&pos);
        } else {
            self.unloaded.borrow_mut().insert(pos);
        }
    }

    /// How many times `fluid_handler(pos)` has been called.
    pub fn fluid_lookups(&self, pos: BlockPos) -> u32 {
        self.fluid_lookups.borrow().get(&pos).copied().unwrap_or(0)
    }

    pub fn total_fluid_lookups(&self) -> u32 {
        self.fluid_lookups.borrow().values().sum()
    }

    pub fn dropped_items(&self) -> Vec<DroppedItem> {
        self.dropped.borrow().values().cloned().collect()
    }
}

impl Level for TestLevel {
    fn is_loaded(&self, pos: BlockPos) -> bool {
        !self.unloaded.borrow().contains(&pos)
    }

    fn fluid_handler(&self, pos: BlockPos) -> Option<Capability<dyn ResourceContainer>> {
        *self.fluid_lookups.borrow_mut().entry(pos).or_insert(0) += 1;
        self.tanks.borrow().get(&pos).cloned()
    }

    fn item_handler(&self, pos: BlockPos) -> Option<Capability<dyn ItemHandler>> {
        self.inventories.borrow().get(&pos).cloned()
    }

    fn spawn_item(&self, at: Vec3, stack: ItemStack) {
        self.dropped.borrow_mut().insert(DroppedItem { at, stack });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemInventory;

    #[test]
    fn level_hands_out_shared_handles() {
        let level = TestLevel::new();
        let pos = BlockPos::new(1, 0, 0);
        let tank = level.add_tank(pos, tank_with(lava(), 10, 100));
        let cap = level.fluid_handler(pos).unwrap();
        cap.with_mut(|t| t.drain_amount(4, FluidAction::Execute));
        assert_eq!(tank.borrow().amount(), 6);
        assert_eq!(level.fluid_lookups(pos), 1);
    }

    #[test]
    fn removing_a_tank_invalidates_outstanding_handles() {
        let level = TestLevel::new();
        let pos = BlockPos::new(1, 0, 0);
        level.add_tank(pos, tank_with(lava(), 10, 100));
        let cap = level.fluid_handler(pos).unwrap();
        level.remove_tank(pos);
        assert!(!cap.is_valid());
        assert!(level.fluid_handler(pos).is_none());
    }

    #[test]
    fn replacing_a_tank_invalidates_the_old_handle() {
        let level = TestLevel::new();
        let pos = BlockPos::ORIGIN;
        level.add_tank(pos, tank_with(lava(), 10, 100));
        let old = level.fluid_handler(pos).unwrap();
        level.add_tank(pos, tank_with(water(), 10, 100));
        assert!(!old.is_valid());
        assert!(level.fluid_handler(pos).unwrap().is_valid());
    }

    #[test]
    fn counting_tank_counts() {
        let mut tank = CountingTank::new(tank_with(lava(), 10, 100));
        tank.fluid_in_tank(0);
        tank.fill(&stack(lava(), 1), FluidAction::Simulate);
        tank.drain_amount(1, FluidAction::Simulate);
        assert_eq!(tank.reads(), 1);
        assert_eq!(tank.touches(), 3);
        tank.reset();
        assert_eq!(tank.touches(), 0);
    }

    #[test]
    fn spawned_items_are_recorded() {
        let level = TestLevel::new();
        level.add_inventory(BlockPos::ORIGIN, ItemInventory::new(1));
        level.spawn_item(crate::fixed::block_corner(BlockPos::ORIGIN), ItemStack::new(ItemId(1), 1));
        assert_eq!(level.dropped_items().len(), 1);
        assert!(level.item_handler(BlockPos::ORIGIN).is_some());
    }

    #[test]
    fn unloaded_positions() {
        let level = TestLevel::new();
        let pos = BlockPos::new(0, 5, 0);
        assert!(level.is_loaded(pos));
        level.set_loaded(pos, false);
        assert!(!level.is_loaded(pos));
        level.set_loaded(pos, true);
        assert!(level.is_loaded(pos));
    }
}
