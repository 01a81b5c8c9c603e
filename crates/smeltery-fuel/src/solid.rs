//! Fuel from the block at one fixed position: its tank if it has one,
//! otherwise burnable items from its inventory.

use std::rc::Rc;

use log::{debug, error};
use smeltery_core::capability::{Capability, InvalidationInbox};
use smeltery_core::fixed::{Fixed64, block_corner};
use smeltery_core::fluid::ResourceContainer;
use smeltery_core::id::{BlockPos, ListenerId};
use smeltery_core::item::{ItemHandler, ItemStack, insert_item_stacked};
use smeltery_core::level::Level;
use smeltery_core::registry::Registry;
use smeltery_core::rng::SimRng;

use crate::info::FuelInfo;
use crate::module::{FuelCore, FuelModule};
use crate::recipe::FuelLookup;
use crate::state::{DataSlots, FUEL_SLOTS};

/// Item burn time is divided by this to get fuel duration.
pub const SOLID_BURN_DIVISOR: u32 = 4;

type Listened<T> = (Capability<T>, ListenerId);

fn seed_for(pos: BlockPos) -> u64 {
    let x = u64::from(pos.x as u32);
    let y = u64::from(pos.y as u32);
    let z = u64::from(pos.z as u32);
    x ^ y.rotate_left(21) ^ z.rotate_left(42)
}

pub struct SolidFuelModule {
    core: FuelCore,
    level: Rc<dyn Level>,
    registry: Rc<Registry>,
    pos: BlockPos,
    fluid_handler: Option<Listened<dyn ResourceContainer>>,
    item_handler: Option<Listened<dyn ItemHandler>>,
    inbox: InvalidationInbox,
    rng: SimRng,
}

impl SolidFuelModule {
    pub fn new(
        lookup: Rc<dyn FuelLookup>,
        registry: Rc<Registry>,
        level: Rc<dyn Level>,
        pos: BlockPos,
    ) -> Self {
        Self {
            core: FuelCore::new(lookup),
            level,
            registry,
            pos,
            fluid_handler: None,
            item_handler: None,
            inbox: InvalidationInbox::new(),
            rng: SimRng::new(seed_for(pos)),
        }
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    fn release(&mut self) {
        if let Some((handle, listener)) = self.fluid_handler.take() {
            handle.remove_listener(listener);
        }
        if let Some((handle, listener)) = self.item_handler.take() {
            handle.remove_listener(listener);
        }
    }

    /// Any invalidation drops both handles.
    fn process_invalidations(&mut self) {
        if self.inbox.take().is_empty() {
            return;
        }
        debug!("fuel source at {:?} invalidated", self.pos);
        self.release();
    }

    fn fetch_handlers(&mut self) {
        if !self.level.is_loaded(self.pos) {
            return;
        }
        if self.fluid_handler.is_none() {
            self.fluid_handler = self
                .level
                .fluid_handler(self.pos)
                .filter(|h| h.is_valid())
                .map(|h| {
                    let listener = h.add_listener(&self.inbox);
                    (h, listener)
                });
        }
        if self.item_handler.is_none() {
            self.item_handler = self
                .level
                .item_handler(self.pos)
                .filter(|h| h.is_valid())
                .map(|h| {
                    let listener = h.add_listener(&self.inbox);
                    (h, listener)
                });
        }
    }

    /// Try to burn the first burnable item in `handler`.
    pub fn try_solid_fuel(&mut self, handler: &Capability<dyn ItemHandler>, consume: bool) -> i32 {
        let registry = &self.registry;
        let found = handler
            .with(|items| {
                (0..items.slots()).find_map(|slot| {
                    let stack = items.stack_in_slot(slot);
                    let duration = registry.burn_time(&stack) / SOLID_BURN_DIVISOR;
                    (duration > 0).then_some((slot, stack, duration))
                })
            })
            .flatten();
        let Some((slot, expected, duration)) = found else {
            return 0;
        };

        let solid = self.core.lookup().solid();
        if !consume {
            return solid.temperature;
        }

        let extracted = handler
            .with_mut(|items| items.extract_item(slot, 1, false))
            .unwrap_or(ItemStack::EMPTY);
        if !extracted.is_same_item(&expected) {
            error!(
                "invalid item removed from fuel inventory at {:?} slot {}: expected {:?}, got {:?}",
                self.pos, slot, expected.item, extracted.item
            );
        }

        let duration = i32::try_from(duration).unwrap_or(i32::MAX);
        self.core.refuel(duration, solid.temperature, solid.rate);

        let remainder = self.registry.crafting_remainder(&extracted);
        if !remainder.is_empty() {
            let leftover = handler
                .with_mut(|items| insert_item_stacked(items, remainder, false))
                .unwrap_or(remainder);
            if !leftover.is_empty() {
                self.drop_item(leftover);
            }
        }
        self.core.state().temperature
    }

    fn drop_item(&mut self, stack: ItemStack) {
        let low = Fixed64::from_num(0.25);
        let high = Fixed64::from_num(0.75);
        let corner = block_corner(self.pos);
        let at = corner.map(|c| c + self.rng.next_in(low, high));
        debug!("no room for {stack:?} at {:?}, dropping it", self.pos);
        self.level.spawn_item(at, stack);
    }
}

impl FuelModule for SolidFuelModule {
    fn core(&self) -> &FuelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FuelCore {
        &mut self.core
    }

    fn find_fuel(&mut self, consume: bool) -> i32 {
        self.process_invalidations();
        if self.fluid_handler.is_none() || self.item_handler.is_none() {
            self.fetch_handlers();
        }

        if let Some((handle, _)) = self.fluid_handler.clone() {
            let temperature = self.core.try_liquid_fuel(&handle, consume);
            if temperature > 0 {
                return temperature;
            }
        }
        if let Some((handle, _)) = self.item_handler.clone() {
            let temperature = self.try_solid_fuel(&handle, consume);
            if temperature > 0 {
                return temperature;
            }
        }

        if consume {
            self.core.extinguish();
        }
        0
    }

    fn fuel_info(&self) -> FuelInfo {
        if let Some((handle, _)) = &self.fluid_handler {
            if let Some((fluid, capacity)) = handle.with(|t| (t.fluid_in_tank(0), t.tank_capacity(0))) {
                return FuelInfo::of(fluid, capacity, self.core.temperature_of(fluid.fluid));
            }
        }
        match &self.item_handler {
            Some((handle, _)) if handle.is_valid() => FuelInfo::item(self.core.lookup().solid().temperature),
            _ => FuelInfo::EMPTY,
        }
    }
}

impl DataSlots for SolidFuelModule {
    fn count(&self) -> usize {
        FUEL_SLOTS
    }

    fn get(&self, index: usize) -> i32 {
        self.core.slot(index)
    }

    fn set(&mut self, index: usize, value: i32) {
        self.core.set_slot(index, value);
    }
}

impl Drop for SolidFuelModule {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SolidFuelModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolidFuelModule")
            .field("core", &self.core)
            .field("pos", &self.pos)
            .field("has_fluid_handler", &self.fluid_handler.is_some())
            .field("has_item_handler", &self.item_handler.is_some())
            .finish_non_exhaustive()
    }
}
