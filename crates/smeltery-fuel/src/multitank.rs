//! Fuel drawn from a pool of tanks at structure-supplied positions.
//!
//! The engine remembers the tank that last yielded fuel and tries it first
//! on the next tick, then the tank at the last-used position, and only then
//! scans the whole pool. Towards the outside it behaves as one tank: fills
//! and drains fan out across the pool in position order.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use smeltery_core::capability::{Capability, InvalidationInbox};
use smeltery_core::fluid::{FluidAction, FluidStack, ResourceContainer};
use smeltery_core::id::{BlockPos, ListenerId};
use smeltery_core::level::Level;

use crate::info::FuelInfo;
use crate::module::{FuelCore, FuelModule};
use crate::persist::FuelTag;
use crate::recipe::FuelLookup;
use crate::state::{DataSlots, FUEL_SLOTS};

/// Data-slot indices of the last-used position.
pub const LAST_X: usize = FUEL_SLOTS;
pub const LAST_Y: usize = FUEL_SLOTS + 1;
pub const LAST_Z: usize = FUEL_SLOTS + 2;
/// Data slots of a [`MultitankFuelModule`].
pub const MULTITANK_SLOTS: usize = FUEL_SLOTS + 3;

/// What the data slots report when there is no last-used position.
pub const NO_POSITION: BlockPos = BlockPos::new(0, i32::MIN, 0);

type TankHandle = Capability<dyn ResourceContainer>;

// ---------------------------------------------------------------------------
// PositionSource
// ---------------------------------------------------------------------------

/// Supplies the ordered list of positions that may hold fuel tanks.
///
/// Queried again every time the pool is rebuilt. Order matters; duplicates
/// are kept.
pub trait PositionSource {
    fn positions(&self) -> Vec<BlockPos>;
}

impl PositionSource for Vec<BlockPos> {
    fn positions(&self) -> Vec<BlockPos> {
        self.clone()
    }
}

/// A position list the owning structure edits in place.
impl PositionSource for Rc<RefCell<Vec<BlockPos>>> {
    fn positions(&self) -> Vec<BlockPos> {
        self.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// MultitankFuelModule
// ---------------------------------------------------------------------------

struct PoolEntry {
    pos: BlockPos,
    handle: TankHandle,
    listener: ListenerId,
}

fn release(entries: Vec<PoolEntry>) {
    for entry in entries {
        entry.handle.remove_listener(entry.listener);
    }
}

pub struct MultitankFuelModule {
    core: FuelCore,
    level: Rc<dyn Level>,
    origin: BlockPos,
    positions: Box<dyn PositionSource>,
    /// Built on first use, in position order.
    tanks: RefCell<Option<Vec<PoolEntry>>>,
    fluid_handler: Option<TankHandle>,
    last_pos: Option<BlockPos>,
    /// Coordinates written through the data slots while `y` is still the
    /// sentinel.
    partial_pos: BlockPos,
    inbox: InvalidationInbox,
}

impl MultitankFuelModule {
    /// `origin` is the owner's position; the last-used position is saved
    /// relative to it.
    pub fn new(
        lookup: Rc<dyn FuelLookup>,
        level: Rc<dyn Level>,
        origin: BlockPos,
        positions: impl PositionSource + 'static,
    ) -> Self {
        Self {
            core: FuelCore::new(lookup),
            level,
            origin,
            positions: Box::new(positions),
            tanks: RefCell::new(None),
            fluid_handler: None,
            last_pos: None,
            partial_pos: NO_POSITION,
            inbox: InvalidationInbox::new(),
        }
    }

    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    /// Absolute position fuel was last taken from.
    pub fn last_fuel_position(&self) -> Option<BlockPos> {
        self.last_pos
    }

    /// Whether a valid tank is cached for the next lookup.
    pub fn has_cached_tank(&self) -> bool {
        self.fluid_handler.as_ref().is_some_and(|h| h.is_valid())
    }

    /// The structure changed shape: forget the pool and the cached tank.
    ///
    /// The last-used position is kept so the same tank is found again if it
    /// is still part of the structure.
    pub fn clear_cached_tanks(&mut self) {
        debug!("structure at {:?} rebuilt, clearing fuel tank pool", self.origin);
        if let Some(entries) = self.tanks.get_mut().take() {
            release(entries);
        }
        self.fluid_handler = None;
        self.inbox.take();
    }

    /// Drain invalidation messages and drop whatever they refer to.
    fn process_invalidations(&mut self) {
        let messages = self.inbox.take();
        if messages.is_empty() {
            return;
        }
        debug!("fuel tanks at {messages:?} invalidated, discarding pool");
        if self.fluid_handler.as_ref().is_some_and(|h| !h.is_valid()) {
            self.forget_cached();
        }
        if let Some(entries) = self.tanks.get_mut().take() {
            release(entries);
        }
    }

    fn forget_cached(&mut self) {
        self.fluid_handler = None;
        if self.last_pos.take().is_some() {
            self.core.mark_dirty();
        }
    }

    fn build_pool(&self) -> Vec<PoolEntry> {
        let positions = self.positions.positions();
        let mut entries = Vec::with_capacity(positions.len());
        for pos in &positions {
            if !self.level.is_loaded(*pos) {
                continue;
            }
            let Some(handle) = self.level.fluid_handler(*pos) else {
                continue;
            };
            if !handle.is_valid() {
                continue;
            }
            let listener = handle.add_listener(&self.inbox);
            entries.push(PoolEntry {
                pos: *pos,
                handle,
                listener,
            });
        }
        debug!(
            "built fuel tank pool for {:?}: {} tanks at {} positions",
            self.origin,
            entries.len(),
            positions.len()
        );
        entries
    }

    /// Current pool members, building the pool if needed.
    ///
    /// A pool holding a dead handle is rebuilt first.
    fn pool(&self) -> Vec<(BlockPos, TankHandle)> {
        let mut tanks = self.tanks.borrow_mut();
        if tanks
            .as_ref()
            .is_some_and(|entries| entries.iter().any(|e| !e.handle.is_valid()))
        {
            if let Some(entries) = tanks.take() {
                release(entries);
            }
        }
        tanks
            .get_or_insert_with(|| self.build_pool())
            .iter()
            .map(|e| (e.pos, e.handle.clone()))
            .collect()
    }

    fn pool_tank(&self, index: usize) -> Option<TankHandle> {
        self.pool().into_iter().nth(index).map(|(_, handle)| handle)
    }

    fn select(&mut self, pos: BlockPos, handle: TankHandle) {
        self.fluid_handler = Some(handle);
        if self.last_pos != Some(pos) {
            self.last_pos = Some(pos);
            self.core.mark_dirty();
        }
    }

    /// The tank `fuel_info` reports on.
    fn primary(&self, pool: &[(BlockPos, TankHandle)]) -> Option<TankHandle> {
        if let Some(handle) = self.fluid_handler.as_ref().filter(|h| h.is_valid()) {
            return Some(handle.clone());
        }
        let last = self.last_pos?;
        pool.iter()
            .find(|(pos, _)| *pos == last)
            .map(|(_, handle)| handle.clone())
    }
}

impl FuelModule for MultitankFuelModule {
    fn core(&self) -> &FuelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FuelCore {
        &mut self.core
    }

    fn find_fuel(&mut self, consume: bool) -> i32 {
        self.process_invalidations();

        if let Some(handle) = self.fluid_handler.clone() {
            if handle.is_valid() {
                let temperature = self.core.try_liquid_fuel(&handle, consume);
                if temperature > 0 {
                    return temperature;
                }
            } else {
                self.forget_cached();
            }
        }

        let pool = self.pool();

        if let Some(last) = self.last_pos {
            let handle = pool.iter().find(|(pos, _)| *pos == last);
            if let Some((pos, handle)) = handle {
                let tried = self
                    .fluid_handler
                    .as_ref()
                    .is_some_and(|cached| cached.same_handle(handle));
                if !tried {
                    let temperature = self.core.try_liquid_fuel(handle, consume);
                    if temperature > 0 {
                        if consume {
                            self.select(*pos, handle.clone());
                        }
                        return temperature;
                    }
                }
            }
        }

        for (pos, handle) in &pool {
            if Some(*pos) == self.last_pos {
                continue;
            }
            if !self.level.is_loaded(*pos) {
                trace!("fuel tank at {pos:?} is unloaded");
                continue;
            }
            let temperature = self.core.try_liquid_fuel(handle, consume);
            if temperature > 0 {
                if consume {
                    self.select(*pos, handle.clone());
                }
                return temperature;
            }
            trace!("no fuel at {pos:?}");
        }

        if consume {
            self.core.extinguish();
        }
        0
    }

    fn fuel_info(&self) -> FuelInfo {
        let pool = self.pool();
        let Some(primary) = self.primary(&pool) else {
            return FuelInfo::EMPTY;
        };
        let Some((fluid, capacity)) = primary.with(|t| (t.fluid_in_tank(0), t.tank_capacity(0)))
        else {
            return FuelInfo::EMPTY;
        };

        let mut info = FuelInfo::of(fluid, capacity, self.core.temperature_of(fluid.fluid));
        for (_, handle) in &pool {
            if handle.same_handle(&primary) {
                continue;
            }
            if let Some((other, capacity)) = handle.with(|t| (t.fluid_in_tank(0), t.tank_capacity(0))) {
                if other.is_empty() || other.fluid == fluid.fluid {
                    info.add(other.amount, capacity);
                }
            }
        }
        info
    }

    fn write_tag(&self) -> FuelTag {
        FuelTag {
            last_fuel_position: self.last_pos.map(|pos| pos.subtract(self.origin)),
            ..self.core.write_tag()
        }
    }

    fn read_tag(&mut self, tag: &FuelTag) {
        self.core.read_tag(tag);
        self.last_pos = tag
            .last_fuel_position
            .map(|relative| self.origin.offset(relative));
        self.partial_pos = NO_POSITION;
        self.fluid_handler = None;
    }
}

impl DataSlots for MultitankFuelModule {
    fn count(&self) -> usize {
        MULTITANK_SLOTS
    }

    fn get(&self, index: usize) -> i32 {
        let last = self.last_pos.unwrap_or(self.partial_pos);
        match index {
            LAST_X => last.x,
            LAST_Y => last.y,
            LAST_Z => last.z,
            _ => self.core.slot(index),
        }
    }

    fn set(&mut self, index: usize, value: i32) {
        if index < FUEL_SLOTS {
            self.core.set_slot(index, value);
            return;
        }
        let mut pos = self.last_pos.unwrap_or(self.partial_pos);
        match index {
            LAST_X => pos.x = value,
            LAST_Y => pos.y = value,
            LAST_Z => pos.z = value,
            _ => return,
        }
        let before = self.last_pos;
        if pos.y == NO_POSITION.y {
            self.last_pos = None;
            self.partial_pos = pos;
        } else {
            self.last_pos = Some(pos);
            self.partial_pos = NO_POSITION;
        }
        if self.last_pos != before {
            self.core.mark_dirty();
        }
        self.fluid_handler = None;
    }
}

impl ResourceContainer for MultitankFuelModule {
    fn tanks(&self) -> usize {
        self.pool().len()
    }

    fn fluid_in_tank(&self, tank: usize) -> FluidStack {
        self.pool_tank(tank)
            .and_then(|h| h.with(|t| t.fluid_in_tank(0)))
            .unwrap_or(FluidStack::EMPTY)
    }

    fn tank_capacity(&self, tank: usize) -> u32 {
        self.pool_tank(tank)
            .and_then(|h| h.with(|t| t.tank_capacity(0)))
            .unwrap_or(0)
    }

    fn is_fluid_valid(&self, tank: usize, stack: &FluidStack) -> bool {
        self.pool_tank(tank)
            .and_then(|h| h.with(|t| t.is_fluid_valid(0, stack)))
            .unwrap_or(false)
    }

    fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32 {
        self.process_invalidations();
        if resource.is_empty() {
            return 0;
        }
        let mut remaining = *resource;
        let mut total = 0;
        for (_, handle) in self.pool() {
            let filled = handle.with_mut(|t| t.fill(&remaining, action)).unwrap_or(0);
            if filled == 0 {
                continue;
            }
            total += filled;
            if total >= resource.amount {
                break;
            }
            remaining.shrink(filled);
        }
        total
    }

    fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack {
        self.process_invalidations();
        if resource.is_empty() {
            return FluidStack::EMPTY;
        }
        let mut drained = FluidStack::EMPTY;
        for (_, handle) in self.pool() {
            let request = resource.copy_with_amount(resource.amount - drained.amount);
            let got = handle
                .with_mut(|t| t.drain(&request, action))
                .unwrap_or(FluidStack::EMPTY);
            if got.is_empty() {
                continue;
            }
            if drained.is_empty() {
                drained = got;
            } else {
                drained.grow(got.amount);
            }
            if drained.amount >= resource.amount {
                break;
            }
        }
        drained
    }

    fn drain_amount(&mut self, max_drain: u32, action: FluidAction) -> FluidStack {
        self.process_invalidations();
        if max_drain == 0 {
            return FluidStack::EMPTY;
        }
        let mut drained = FluidStack::EMPTY;
        for (_, handle) in self.pool() {
            let needed = max_drain - drained.amount;
            if drained.is_empty() {
                drained = handle
                    .with_mut(|t| t.drain_amount(needed, action))
                    .unwrap_or(FluidStack::EMPTY);
            } else {
                let request = drained.copy_with_amount(needed);
                let got = handle
                    .with_mut(|t| t.drain(&request, action))
                    .unwrap_or(FluidStack::EMPTY);
                drained.grow(got.amount);
            }
            if drained.amount >= max_drain {
                break;
            }
        }
        drained
    }
}

impl Drop for MultitankFuelModule {
    fn drop(&mut self) {
        if let Some(entries) = self.tanks.get_mut().take() {
            release(entries);
        }
    }
}

impl std::fmt::Debug for MultitankFuelModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultitankFuelModule")
            .field("core", &self.core)
            .field("origin", &self.origin)
            .field("last_pos", &self.last_pos)
            .field("cached", &self.fluid_handler)
            .finish_non_exhaustive()
    }
}
