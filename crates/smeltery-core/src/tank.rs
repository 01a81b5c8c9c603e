//! Concrete fluid tanks: a plain single tank and a scaled tank whose every
//! operation moves whole bundles of `scale` units.

use serde::{Deserialize, Serialize};

use crate::fluid::{FluidAction, FluidStack, ResourceContainer};
use crate::id::FluidId;

/// Persisted contents of a tank. Capacity is configuration, not state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TankTag {
    #[serde(default)]
    pub fluid: FluidId,
    #[serde(default)]
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// FluidTank
// ---------------------------------------------------------------------------

/// A single tank holding one fluid type at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidTank {
    fluid: FluidStack,
    capacity: u32,
}

impl FluidTank {
    pub fn new(capacity: u32) -> Self {
        Self {
            fluid: FluidStack::EMPTY,
            capacity,
        }
    }

    /// A tank pre-filled with `fluid` (clamped to capacity).
    pub fn with_fluid(capacity: u32, fluid: FluidStack) -> Self {
        let mut tank = Self::new(capacity);
        tank.set_fluid(fluid);
        tank
    }

    pub fn fluid(&self) -> FluidStack {
        self.fluid
    }

    pub fn amount(&self) -> u32 {
        self.fluid.amount
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn space(&self) -> u32 {
        self.capacity.saturating_sub(self.fluid.amount)
    }

    pub fn is_empty(&self) -> bool {
        self.fluid.is_empty()
    }

    /// Replace the contents. Amounts above capacity are clamped.
    pub fn set_fluid(&mut self, fluid: FluidStack) {
        self.fluid = fluid.copy_with_amount(fluid.amount.min(self.capacity));
    }

    /// Change the capacity, truncating the contents if they no longer fit.
    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
        if self.fluid.amount > capacity {
            self.fluid = self.fluid.copy_with_amount(capacity);
        }
    }

    pub fn write_tag(&self) -> TankTag {
        TankTag {
            fluid: self.fluid.fluid,
            amount: self.fluid.amount,
        }
    }

    pub fn read_tag(&mut self, tag: &TankTag) {
        self.set_fluid(FluidStack::new(tag.fluid, tag.amount));
    }
}

impl ResourceContainer for FluidTank {
    fn tanks(&self) -> usize {
        1
    }

    fn fluid_in_tank(&self, tank: usize) -> FluidStack {
        if tank == 0 { self.fluid } else { FluidStack::EMPTY }
    }

    fn tank_capacity(&self, tank: usize) -> u32 {
        if tank == 0 { self.capacity } else { 0 }
    }

    fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32 {
        if resource.is_empty() {
            return 0;
        }
        if !self.fluid.is_empty() && !self.fluid.is_fluid_equal(resource) {
            return 0;
        }
        let filled = resource.amount.min(self.space());
        if filled > 0 && action.execute() {
            if self.fluid.is_empty() {
                self.fluid = resource.copy_with_amount(filled);
            } else {
                self.fluid.grow(filled);
            }
        }
        filled
    }

    fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack {
        if resource.is_empty() || !self.fluid.is_fluid_equal(resource) {
            return FluidStack::EMPTY;
        }
        self.drain_amount(resource.amount, action)
    }

    fn drain_amount(&mut self, max_drain: u32, action: FluidAction) -> FluidStack {
        let drained = max_drain.min(self.fluid.amount);
        let stack = self.fluid.copy_with_amount(drained);
        if drained > 0 && action.execute() {
            self.fluid.shrink(drained);
        }
        stack
    }
}

// ---------------------------------------------------------------------------
// ScaledTank
// ---------------------------------------------------------------------------

/// A tank representing `scale` identical tanks stacked together.
///
/// Capacity is `base_capacity * scale` and every amount moved in or out is
/// rounded down to a multiple of `scale`; the remainder is discarded. The
/// stored amount is therefore always a whole number of bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledTank {
    tank: FluidTank,
    scale: u32,
}

impl ScaledTank {
    /// `scale` values below 1 are treated as 1.
    pub fn new(base_capacity: u32, scale: u32) -> Self {
        let scale = scale.max(1);
        Self {
            tank: FluidTank::new(base_capacity.saturating_mul(scale)),
            scale,
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn fluid(&self) -> FluidStack {
        self.tank.fluid()
    }

    pub fn capacity(&self) -> u32 {
        self.tank.capacity()
    }

    /// Round `amount` down to a whole number of bundles.
    pub fn round(&self, amount: u32) -> u32 {
        amount - amount % self.scale
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        let capacity = self.round(capacity);
        self.tank.set_capacity(capacity);
    }

    pub fn set_fluid(&mut self, fluid: FluidStack) {
        let amount = self.round(fluid.amount.min(self.tank.capacity()));
        self.tank.set_fluid(fluid.copy_with_amount(amount));
    }

    /// Stores the per-bundle amount.
    pub fn write_tag(&self) -> TankTag {
        let fluid = self.tank.fluid();
        TankTag {
            fluid: fluid.fluid,
            amount: fluid.amount / self.scale,
        }
    }

    /// Reads a per-bundle amount and expands it back to the full bundle.
    pub fn read_tag(&mut self, tag: &TankTag) {
        let amount = tag.amount.saturating_mul(self.scale);
        self.set_fluid(FluidStack::new(tag.fluid, amount));
    }
}

impl ResourceContainer for ScaledTank {
    fn tanks(&self) -> usize {
        1
    }

    fn fluid_in_tank(&self, tank: usize) -> FluidStack {
        self.tank.fluid_in_tank(tank)
    }

    fn tank_capacity(&self, tank: usize) -> u32 {
        self.tank.tank_capacity(tank)
    }

    fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32 {
        let requested = self.round(resource.amount);
        if requested == 0 {
            return 0;
        }
        let simulated = self
            .tank
            .fill(&resource.copy_with_amount(requested), FluidAction::Simulate);
        let accepted = self.round(simulated);
        if accepted > 0 && action.execute() {
            self.tank.fill(&resource.copy_with_amount(accepted), FluidAction::Execute)
        } else {
            accepted
        }
    }

    fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack {
        if !self.tank.fluid().is_fluid_equal(resource) {
            return FluidStack::EMPTY;
        }
        self.drain_amount(resource.amount, action)
    }

    fn drain_amount(&mut self, max_drain: u32, action: FluidAction) -> FluidStack {
        let available = self.round(max_drain.min(self.tank.amount()));
        if available == 0 {
            return FluidStack::EMPTY;
        }
        self.tank.drain_amount(available, action)
    }
}

// ---------------------------------------------------------------------------
// Tank
// ---------------------------------------------------------------------------

/// Either a plain tank or a scaled one. Built with [`Tank::scaled`], which
/// skips the wrapper when there is nothing to scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tank {
    Plain(FluidTank),
    Scaled(ScaledTank),
}

impl Tank {
    pub fn scaled(base_capacity: u32, scale: u32) -> Tank {
        if scale <= 1 {
            Tank::Plain(FluidTank::new(base_capacity))
        } else {
            Tank::Scaled(ScaledTank::new(base_capacity, scale))
        }
    }

    pub fn scale(&self) -> u32 {
        match self {
            Tank::Plain(_) => 1,
            Tank::Scaled(t) => t.scale(),
        }
    }

    pub fn fluid(&self) -> FluidStack {
        match self {
            Tank::Plain(t) => t.fluid(),
            Tank::Scaled(t) => t.fluid(),
        }
    }

    pub fn capacity(&self) -> u32 {
        match self {
            Tank::Plain(t) => t.capacity(),
            Tank::Scaled(t) => t.capacity(),
        }
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        match self {
            Tank::Plain(t) => t.set_capacity(capacity),
            Tank::Scaled(t) => t.set_capacity(capacity),
        }
    }

    pub fn set_fluid(&mut self, fluid: FluidStack) {
        match self {
            Tank::Plain(t) => t.set_fluid(fluid),
            Tank::Scaled(t) => t.set_fluid(fluid),
        }
    }

    pub fn write_tag(&self) -> TankTag {
        match self {
            Tank::Plain(t) => t.write_tag(),
            Tank::Scaled(t) => t.write_tag(),
        }
    }

    pub fn read_tag(&mut self, tag: &TankTag) {
        match self {
            Tank::Plain(t) => t.read_tag(tag),
            Tank::Scaled(t) => t.read_tag(tag),
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ResourceContainer {
        match self {
            Tank::Plain(t) => t,
            Tank::Scaled(t) => t,
        }
    }

    fn inner(&self) -> &dyn ResourceContainer {
        match self {
            Tank::Plain(t) => t,
            Tank::Scaled(t) => t,
        }
    }
}

impl From<FluidTank> for Tank {
    fn from(tank: FluidTank) -> Self {
        Tank::Plain(tank)
    }
}

impl ResourceContainer for Tank {
    fn tanks(&self) -> usize {
        1
    }

    fn fluid_in_tank(&self, tank: usize) -> FluidStack {
        self.inner().fluid_in_tank(tank)
    }

    fn tank_capacity(&self, tank: usize) -> u32 {
        self.inner().tank_capacity(tank)
    }

    fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32 {
        self.inner_mut().fill(resource, action)
    }

    fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack {
        self.inner_mut().drain(resource, action)
    }

    fn drain_amount(&mut self, max_drain: u32, action: FluidAction) -> FluidStack {
        self.inner_mut().drain_amount(max_drain, action)
    }
}
