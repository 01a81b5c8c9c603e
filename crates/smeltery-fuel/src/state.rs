//! The fuel record each engine owns, and the indexed integer view used to
//! mirror it to remote observers.

use serde::{Deserialize, Serialize};

/// Data-slot index of [`FuelState::fuel`].
pub const FUEL: usize = 0;
/// Data-slot index of [`FuelState::fuel_quality`].
pub const FUEL_QUALITY: usize = 1;
/// Data-slot index of [`FuelState::temperature`].
pub const TEMPERATURE: usize = 2;
/// Data-slot index of [`FuelState::rate`].
pub const RATE: usize = 3;
/// Number of data slots the base fuel state occupies.
pub const FUEL_SLOTS: usize = 4;

/// A fixed-length vector of integers that an external sync layer can read
/// and write by index.
///
/// Out-of-range reads return 0; out-of-range writes are ignored.
pub trait DataSlots {
    fn count(&self) -> usize;

    fn get(&self, index: usize) -> i32;

    fn set(&mut self, index: usize, value: i32);

    fn to_vec(&self) -> Vec<i32> {
        (0..self.count()).map(|i| self.get(i)).collect()
    }
}

/// Plain storage for data slots, e.g. the client-side mirror of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleDataSlots {
    values: Vec<i32>,
}

impl SimpleDataSlots {
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![0; count],
        }
    }
}

impl DataSlots for SimpleDataSlots {
    fn count(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> i32 {
        self.values.get(index).copied().unwrap_or(0)
    }

    fn set(&mut self, index: usize, value: i32) {
        if let Some(v) = self.values.get_mut(index) {
            *v = value;
        }
    }
}

/// Stored energy and the heat it is currently producing.
///
/// `temperature == 0` means idle, and then `rate` is 0 as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuelState {
    /// Energy units remaining.
    pub fuel: i32,
    /// Duration granted by the last successful refuel. Display only.
    pub fuel_quality: i32,
    pub temperature: i32,
    pub rate: i32,
}

impl FuelState {
    pub fn has_fuel(&self) -> bool {
        self.fuel > 0
    }

    pub fn is_burning(&self) -> bool {
        self.temperature > 0
    }

    /// `fuel = max(0, fuel - amount)`.
    pub fn decrease_fuel(&mut self, amount: i32) {
        self.fuel = self.fuel.saturating_sub(amount.max(0)).max(0);
    }

    /// Record a successful withdrawal of fuel worth `duration`.
    pub fn refuel(&mut self, duration: i32, temperature: i32, rate: i32) {
        let duration = duration.max(0);
        self.fuel = self.fuel.saturating_add(duration);
        self.fuel_quality = duration;
        if temperature > 0 && rate > 0 {
            self.temperature = temperature;
            self.rate = rate;
        } else {
            self.extinguish();
        }
    }

    /// Drop to idle. Stored fuel is kept.
    pub fn extinguish(&mut self) {
        self.temperature = 0;
        self.rate = 0;
    }
}

impl DataSlots for FuelState {
    fn count(&self) -> usize {
        FUEL_SLOTS
    }

    fn get(&self, index: usize) -> i32 {
        match index {
            FUEL => self.fuel,
            FUEL_QUALITY => self.fuel_quality,
            TEMPERATURE => self.temperature,
            RATE => self.rate,
            _ => 0,
        }
    }

    /// Heat and rate are written one slot at a time, so a positive value may
    /// briefly sit beside a zero. Writing zero (or less) to either idles both.
    fn set(&mut self, index: usize, value: i32) {
        match index {
            FUEL => self.fuel = value.max(0),
            FUEL_QUALITY => self.fuel_quality = value,
            TEMPERATURE | RATE if value <= 0 => self.extinguish(),
            TEMPERATURE => self.temperature = value,
            RATE => self.rate = value,
            _ => {}
        }
    }
}
