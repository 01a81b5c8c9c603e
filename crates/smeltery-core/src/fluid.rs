//! Fluid stacks and the [`ResourceContainer`] contract.
//!
//! Every fluid-holding thing the fuel engines touch speaks this contract:
//! plain tanks, scaled tanks, and the multi-tank aggregate view itself.

use serde::{Deserialize, Serialize};

use crate::id::FluidId;

// ---------------------------------------------------------------------------
// FluidStack
// ---------------------------------------------------------------------------

/// A parcel of a single fluid type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FluidStack {
    pub fluid: FluidId,
    pub amount: u32,
}

impl FluidStack {
    pub const EMPTY: FluidStack = FluidStack {
        fluid: FluidId::EMPTY,
        amount: 0,
    };

    pub fn new(fluid: FluidId, amount: u32) -> Self {
        if fluid.is_empty() || amount == 0 {
            return Self::EMPTY;
        }
        Self { fluid, amount }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.fluid.is_empty()
    }

    /// Same fluid type. Two empty stacks are never considered equal fluids.
    pub fn is_fluid_equal(&self, other: &FluidStack) -> bool {
        !self.is_empty() && !other.is_empty() && self.fluid == other.fluid
    }

    /// A stack of the same fluid with a different amount.
    pub fn copy_with_amount(&self, amount: u32) -> FluidStack {
        FluidStack::new(self.fluid, amount)
    }

    pub fn grow(&mut self, amount: u32) {
        self.amount = self.amount.saturating_add(amount);
    }

    /// Remove up to `amount`. Collapses to [`FluidStack::EMPTY`] at zero.
    pub fn shrink(&mut self, amount: u32) {
        self.amount = self.amount.saturating_sub(amount);
        if self.amount == 0 {
            *self = Self::EMPTY;
        }
    }
}

// ---------------------------------------------------------------------------
// FluidAction
// ---------------------------------------------------------------------------

/// Whether an operation mutates state or only reports what would happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluidAction {
    Execute,
    Simulate,
}

impl FluidAction {
    pub fn execute(self) -> bool {
        self == FluidAction::Execute
    }

    pub fn simulate(self) -> bool {
        self == FluidAction::Simulate
    }
}

// ---------------------------------------------------------------------------
// ResourceContainer
// ---------------------------------------------------------------------------

/// A fluid container with one or more internal tanks.
///
/// Amounts are whole units. `fill` returns how much was (or would be)
/// accepted, the drains return what was (or would be) removed.
pub trait ResourceContainer {
    /// Number of internal tanks.
    fn tanks(&self) -> usize;

    /// Contents of tank `tank`. Empty when out of range.
    fn fluid_in_tank(&self, tank: usize) -> FluidStack;

    /// Capacity of tank `tank`. Zero when out of range.
    fn tank_capacity(&self, tank: usize) -> u32;

    /// Whether `stack` could ever be placed in tank `tank`.
    fn is_fluid_valid(&self, tank: usize, stack: &FluidStack) -> bool {
        let _ = stack;
        tank < self.tanks()
    }

    /// Fill with `resource`, returning the amount accepted.
    fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32;

    /// Drain up to `resource.amount` of `resource.fluid`.
    fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack;

    /// Drain up to `max_drain` of whatever fluid is available.
    fn drain_amount(&mut self, max_drain: u32, action: FluidAction) -> FluidStack;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_zero_amount_is_empty() {
        assert_eq!(FluidStack::new(FluidId(1), 0), FluidStack::EMPTY);
        assert_eq!(FluidStack::new(FluidId::EMPTY, 10), FluidStack::EMPTY);
        assert!(FluidStack::EMPTY.is_empty());
    }

    #[test]
    fn fluid_equality_ignores_amount() {
        let a = FluidStack::new(FluidId(1), 5);
        let b = FluidStack::new(FluidId(1), 500);
        let c = FluidStack::new(FluidId(2), 5);
        assert!(a.is_fluid_equal(&b));
        assert!(!a.is_fluid_equal(&c));
        assert!(!FluidStack::EMPTY.is_fluid_equal(&FluidStack::EMPTY));
    }

    #[test]
    fn shrink_to_zero_collapses() {
        let mut stack = FluidStack::new(FluidId(4), 10);
        stack.shrink(4);
        assert_eq!(stack.amount, 6);
        stack.shrink(100);
        assert_eq!(stack, FluidStack::EMPTY);
    }

    #[test]
    fn grow_and_copy() {
        let mut stack = FluidStack::new(FluidId(4), 10);
        stack.grow(5);
        assert_eq!(stack.amount, 15);
        let copy = stack.copy_with_amount(3);
        assert_eq!(copy, FluidStack::new(FluidId(4), 3));
        assert_eq!(stack.amount, 15);
    }

    #[test]
    fn action_flags() {
        assert!(FluidAction::Execute.execute());
        assert!(FluidAction::Simulate.simulate());
        assert!(!FluidAction::Simulate.execute());
    }
}
