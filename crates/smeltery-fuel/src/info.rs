use smeltery_core::fixed::{Fixed64, ratio};
use smeltery_core::fluid::FluidStack;
use smeltery_core::id::FluidId;

/// What an engine can report about its fuel supply, for display.
///
/// For liquid fuel, `total_amount` and `capacity` cover the primary tank and
/// every compatible tank pooled with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelInfo {
    pub fluid: FluidId,
    pub total_amount: u32,
    pub capacity: u32,
    pub temperature: i32,
}

impl FuelInfo {
    pub const EMPTY: FuelInfo = FuelInfo {
        fluid: FluidId::EMPTY,
        total_amount: 0,
        capacity: 0,
        temperature: 0,
    };

    /// Info for a single tank holding `fluid`.
    pub fn of(fluid: FluidStack, capacity: u32, temperature: i32) -> Self {
        Self {
            fluid: fluid.fluid,
            total_amount: fluid.amount,
            capacity,
            temperature,
        }
    }

    /// Info for item fuel: no fluid, only a temperature.
    pub fn item(temperature: i32) -> Self {
        Self {
            temperature,
            ..Self::EMPTY
        }
    }

    /// Pool another tank's contents into the totals.
    pub fn add(&mut self, amount: u32, capacity: u32) {
        self.total_amount = self.total_amount.saturating_add(amount);
        self.capacity = self.capacity.saturating_add(capacity);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Whether this describes item fuel rather than a tank.
    pub fn is_item(&self) -> bool {
        self.fluid.is_empty() && self.capacity == 0 && self.temperature > 0
    }

    /// `total_amount / capacity` in [0, 1].
    pub fn fill_ratio(&self) -> Fixed64 {
        ratio(self.total_amount, self.capacity)
    }
}
