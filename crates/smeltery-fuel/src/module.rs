//! The single-source fuel engine: shared state and withdrawal primitives.
//!
//! Every engine variant owns a [`FuelCore`] and implements [`FuelModule`] by
//! supplying its own source-selection strategy in
//! [`FuelModule::find_fuel`]. The core provides the liquid withdrawal
//! primitive, the recipe cache, persistence of the base fields, and the
//! first four data slots.

use std::rc::Rc;

use log::error;
use smeltery_core::capability::Capability;
use smeltery_core::fluid::{FluidAction, FluidStack, ResourceContainer};
use smeltery_core::id::FluidId;

use crate::info::FuelInfo;
use crate::persist::FuelTag;
use crate::recipe::{FuelLookup, MeltingFuel};
use crate::state::{DataSlots, FUEL_SLOTS, FuelState};

// ---------------------------------------------------------------------------
// FuelModule trait
// ---------------------------------------------------------------------------

/// A fuel engine installed in a melting structure.
///
/// The melting process calls [`find_fuel`](FuelModule::find_fuel) each tick
/// it needs heat and drains stored energy with
/// [`decrease_fuel`](FuelModule::decrease_fuel).
pub trait FuelModule: DataSlots {
    fn core(&self) -> &FuelCore;

    fn core_mut(&mut self) -> &mut FuelCore;

    /// Find fuel and, when `consume` is set, withdraw it.
    ///
    /// Returns the temperature the fuel burns (or would burn) at, or 0 when
    /// nothing usable was found. With `consume == false` the engine state
    /// does not change.
    fn find_fuel(&mut self, consume: bool) -> i32;

    /// Display information about the current fuel supply.
    fn fuel_info(&self) -> FuelInfo;

    fn write_tag(&self) -> FuelTag {
        self.core().write_tag()
    }

    fn read_tag(&mut self, tag: &FuelTag) {
        self.core_mut().read_tag(tag);
    }

    fn has_fuel(&self) -> bool {
        self.core().state().has_fuel()
    }

    fn decrease_fuel(&mut self, amount: i32) {
        self.core_mut().decrease_fuel(amount);
    }

    fn fuel(&self) -> i32 {
        self.core().state().fuel
    }

    fn fuel_quality(&self) -> i32 {
        self.core().state().fuel_quality
    }

    fn temperature(&self) -> i32 {
        self.core().state().temperature
    }

    fn rate(&self) -> i32 {
        self.core().state().rate
    }

    /// Whether state changed since the owner last saved.
    fn is_dirty(&self) -> bool {
        self.core().is_dirty()
    }

    fn mark_clean(&mut self) {
        self.core_mut().mark_clean();
    }
}

// ---------------------------------------------------------------------------
// FuelCore
// ---------------------------------------------------------------------------

/// State and primitives shared by every engine variant.
pub struct FuelCore {
    state: FuelState,
    lookup: Rc<dyn FuelLookup>,
    last_recipe: Option<MeltingFuel>,
    dirty: bool,
}

impl FuelCore {
    pub fn new(lookup: Rc<dyn FuelLookup>) -> Self {
        Self {
            state: FuelState::default(),
            lookup,
            last_recipe: None,
            dirty: false,
        }
    }

    pub fn state(&self) -> &FuelState {
        &self.state
    }

    pub fn lookup(&self) -> &dyn FuelLookup {
        self.lookup.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn decrease_fuel(&mut self, amount: i32) {
        self.state.decrease_fuel(amount);
        self.mark_dirty();
    }

    /// Record a successful withdrawal.
    pub fn refuel(&mut self, duration: i32, temperature: i32, rate: i32) {
        self.state.refuel(duration, temperature, rate);
        self.mark_dirty();
    }

    /// Drop to idle after a failed attempt to find fuel.
    pub fn extinguish(&mut self) {
        if self.state.is_burning() {
            self.state.extinguish();
            self.mark_dirty();
        }
    }

    /// The recipe for `fluid`, checking the last match before the catalog.
    pub fn find_recipe(&mut self, fluid: FluidId) -> Option<MeltingFuel> {
        if let Some(last) = self.last_recipe {
            if last.matches(fluid) {
                return Some(last);
            }
        }
        let found = self.lookup.find_fuel(fluid)?;
        self.last_recipe = Some(found);
        Some(found)
    }

    /// Catalog temperature of `fluid`, or 0 if it is not fuel.
    pub fn temperature_of(&self, fluid: FluidId) -> i32 {
        match self.last_recipe {
            Some(last) if last.matches(fluid) => last.temperature,
            _ => self
                .lookup
                .find_fuel(fluid)
                .map(|recipe| recipe.temperature)
                .unwrap_or(0),
        }
    }

    /// Try to burn whatever is in tank 0 of `handler`.
    ///
    /// Returns the fuel's temperature if tank 0 holds at least one recipe's
    /// worth, else 0. When `consume` is set the recipe amount is drained and
    /// the state refueled; otherwise nothing changes.
    pub fn try_liquid_fuel(
        &mut self,
        handler: &Capability<dyn ResourceContainer>,
        consume: bool,
    ) -> i32 {
        let Some(fluid) = handler.with(|tank| tank.fluid_in_tank(0)) else {
            return 0;
        };
        if fluid.is_empty() {
            return 0;
        }
        let Some(recipe) = self.find_recipe(fluid.fluid) else {
            return 0;
        };
        if fluid.amount < recipe.amount {
            return 0;
        }
        if !consume {
            return recipe.temperature;
        }

        let request = fluid.copy_with_amount(recipe.amount);
        let drained = handler
            .with_mut(|tank| tank.drain(&request, FluidAction::Execute))
            .unwrap_or(FluidStack::EMPTY);
        if drained.amount != recipe.amount || drained.fluid != recipe.fluid {
            error!(
                "invalid amount of fuel drained from tank at {:?}: expected {} of {:?}, got {} of {:?}",
                handler.pos(),
                recipe.amount,
                recipe.fluid,
                drained.amount,
                drained.fluid
            );
        }
        self.refuel(recipe.duration, recipe.temperature, recipe.rate);
        self.state.temperature
    }

    pub fn write_tag(&self) -> FuelTag {
        FuelTag {
            fuel: self.state.fuel,
            temperature: self.state.temperature,
            rate: self.state.rate,
            last_fuel_position: None,
        }
    }

    pub fn read_tag(&mut self, tag: &FuelTag) {
        self.state.fuel = tag.fuel.max(0);
        if tag.temperature > 0 && tag.rate > 0 {
            self.state.temperature = tag.temperature;
            self.state.rate = tag.rate;
        } else {
            self.state.extinguish();
        }
    }

    /// Read one of the base data slots.
    pub fn slot(&self, index: usize) -> i32 {
        self.state.get(index)
    }

    /// Write one of the base data slots. Marks dirty when the state changes.
    pub fn set_slot(&mut self, index: usize, value: i32) {
        if index < FUEL_SLOTS {
            let before = self.state;
            self.state.set(index, value);
            if self.state != before {
                self.mark_dirty();
            }
        }
    }
}

impl std::fmt::Debug for FuelCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuelCore")
            .field("state", &self.state)
            .field("last_recipe", &self.last_recipe)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use smeltery_core::id::BlockPos;
    use smeltery_core::tank::FluidTank;
    use smeltery_core::test_utils::*;

    use crate::recipe::{FuelCatalog, SolidFuel};

    fn lava_fuel() -> MeltingFuel {
        MeltingFuel {
            fluid: lava(),
            temperature: 1000,
            duration: 4,
            amount: 4,
            rate: 2,
        }
    }

    /// A catalog that counts lookups.
    struct CountingLookup {
        inner: FuelCatalog,
        lookups: Cell<u32>,
    }

    impl FuelLookup for CountingLookup {
        fn find_fuel(&self, fluid: FluidId) -> Option<MeltingFuel> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.find_fuel(fluid)
        }

        fn solid(&self) -> SolidFuel {
            self.inner.solid()
        }
    }

    fn catalog() -> Rc<FuelCatalog> {
        let mut catalog = FuelCatalog::default();
        catalog.add(lava_fuel()).unwrap();
        Rc::new(catalog)
    }

    fn handle(tank: FluidTank) -> (Rc<RefCell<FluidTank>>, Capability<dyn ResourceContainer>) {
        let typed = Rc::new(RefCell::new(tank));
        let erased: Rc<RefCell<dyn ResourceContainer>> = typed.clone();
        (typed, Capability::new(BlockPos::ORIGIN, erased))
    }

    #[test]
    fn liquid_fuel_withdraws_recipe_amount() {
        let mut core = FuelCore::new(catalog());
        let (tank, cap) = handle(tank_with(lava(), 8, 100));

        assert_eq!(core.try_liquid_fuel(&cap, true), 1000);
        assert_eq!(tank.borrow().amount(), 4);
        assert_eq!(*core.state(), FuelState { fuel: 4, fuel_quality: 4, temperature: 1000, rate: 2 });

        assert_eq!(core.try_liquid_fuel(&cap, true), 1000);
        assert_eq!(tank.borrow().amount(), 0);
        assert_eq!(core.state().fuel, 8);
        assert!(core.is_dirty());
    }

    #[test]
    fn simulate_reports_without_changing_anything() {
        let mut core = FuelCore::new(catalog());
        let (tank, cap) = handle(tank_with(lava(), 8, 100));
        assert_eq!(core.try_liquid_fuel(&cap, false), 1000);
        assert_eq!(tank.borrow().amount(), 8);
        assert_eq!(*core.state(), FuelState::default());
        assert!(!core.is_dirty());
    }

    #[test]
    fn too_little_fluid_is_not_fuel() {
        let mut core = FuelCore::new(catalog());
        let (tank, cap) = handle(tank_with(lava(), 3, 100));
        assert_eq!(core.try_liquid_fuel(&cap, true), 0);
        assert_eq!(tank.borrow().amount(), 3);
        assert_eq!(*core.state(), FuelState::default());
    }

    #[test]
    fn unknown_fluid_is_not_fuel() {
        let mut core = FuelCore::new(catalog());
        let (_tank, cap) = handle(tank_with(water(), 1000, 1000));
        assert_eq!(core.try_liquid_fuel(&cap, true), 0);
        let (_empty, cap) = handle(FluidTank::new(1000));
        assert_eq!(core.try_liquid_fuel(&cap, true), 0);
    }

    #[test]
    fn invalidated_handle_is_not_touched() {
        let mut core = FuelCore::new(catalog());
        let (tank, cap) = handle(tank_with(lava(), 8, 100));
        cap.invalidate();
        assert_eq!(core.try_liquid_fuel(&cap, true), 0);
        assert_eq!(tank.borrow().amount(), 8);
    }

    #[test]
    fn last_recipe_skips_catalog() {
        let mut inner = FuelCatalog::default();
        inner.add(lava_fuel()).unwrap();
        let lookup = Rc::new(CountingLookup {
            inner,
            lookups: Cell::new(0),
        });
        let mut core = FuelCore::new(lookup.clone());
        let (_tank, cap) = handle(tank_with(lava(), 100, 100));

        for _ in 0..5 {
            assert_eq!(core.try_liquid_fuel(&cap, true), 1000);
        }
        assert_eq!(lookup.lookups.get(), 1);
    }

    #[test]
    fn short_drain_is_logged_and_nominal_values_used() {
        struct LeakyTank(FluidTank);
        impl ResourceContainer for LeakyTank {
            fn tanks(&self) -> usize {
                1
            }
            fn fluid_in_tank(&self, tank: usize) -> FluidStack {
                self.0.fluid_in_tank(tank)
            }
            fn tank_capacity(&self, tank: usize) -> u32 {
                self.0.tank_capacity(tank)
            }
            fn fill(&mut self, resource: &FluidStack, action: FluidAction) -> u32 {
                self.0.fill(resource, action)
            }
            fn drain(&mut self, resource: &FluidStack, action: FluidAction) -> FluidStack {
                self.0.drain(&resource.copy_with_amount(1), action)
            }
            fn drain_amount(&mut self, max: u32, action: FluidAction) -> FluidStack {
                self.0.drain_amount(max.min(1), action)
            }
        }

        let mut core = FuelCore::new(catalog());
        let erased: Rc<RefCell<dyn ResourceContainer>> =
            Rc::new(RefCell::new(LeakyTank(tank_with(lava(), 8, 100))));
        let cap = Capability::new(BlockPos::ORIGIN, erased);
        assert_eq!(core.try_liquid_fuel(&cap, true), 1000);
        assert_eq!(core.state().fuel, 4);
    }

    #[test]
    fn extinguish_keeps_fuel_and_marks_dirty_once() {
        let mut core = FuelCore::new(catalog());
        core.refuel(10, 1000, 2);
        core.mark_clean();
        core.extinguish();
        assert!(core.is_dirty());
        assert_eq!(core.state().fuel, 10);
        core.mark_clean();
        core.extinguish();
        assert!(!core.is_dirty());
    }

    #[test]
    fn tag_skips_fuel_quality() {
        let mut core = FuelCore::new(catalog());
        core.refuel(40, 1000, 2);
        let tag = core.write_tag();
        assert_eq!(tag, FuelTag { fuel: 40, temperature: 1000, rate: 2, last_fuel_position: None });

        let mut restored = FuelCore::new(catalog());
        restored.read_tag(&tag);
        assert_eq!(*restored.state(), FuelState { fuel: 40, fuel_quality: 0, temperature: 1000, rate: 2 });
    }

    #[test]
    fn tag_with_half_heat_reads_as_idle() {
        let mut core = FuelCore::new(catalog());
        core.read_tag(&FuelTag { fuel: -5, temperature: 900, rate: 0, last_fuel_position: None });
        assert_eq!(*core.state(), FuelState::default());
    }

    #[test]
    fn temperature_of_uses_catalog() {
        let core = FuelCore::new(catalog());
        assert_eq!(core.temperature_of(lava()), 1000);
        assert_eq!(core.temperature_of(water()), 0);
    }
}
