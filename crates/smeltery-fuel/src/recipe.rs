//! Fuel recipes and the catalog the engines consult.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smeltery_core::id::FluidId;

/// A liquid fuel: `amount` units of `fluid` burn for `duration` at
/// `temperature`, melting `rate` times faster than the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltingFuel {
    pub fluid: FluidId,
    pub temperature: i32,
    pub duration: i32,
    pub amount: u32,
    pub rate: i32,
}

impl MeltingFuel {
    pub fn matches(&self, fluid: FluidId) -> bool {
        !fluid.is_empty() && self.fluid == fluid
    }
}

/// The fuel entry used for burnable items. Duration comes from the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidFuel {
    pub temperature: i32,
    pub rate: i32,
}

impl Default for SolidFuel {
    fn default() -> Self {
        Self {
            temperature: 800,
            rate: 6,
        }
    }
}

/// Fuel recipe lookup. Pure: the same fluid always yields the same answer.
pub trait FuelLookup {
    fn find_fuel(&self, fluid: FluidId) -> Option<MeltingFuel>;

    fn solid(&self) -> SolidFuel;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("fuel for fluid {0:?} must have positive temperature and rate")]
    NotHot(FluidId),
    #[error("fuel for fluid {0:?} must consume a positive amount for a positive duration")]
    NoAmount(FluidId),
    #[error("fuel cannot be registered for the empty fluid")]
    EmptyFluid,
}

/// An in-memory [`FuelLookup`] keyed by fluid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuelCatalog {
    fuels: BTreeMap<FluidId, MeltingFuel>,
    solid: SolidFuel,
}

impl FuelCatalog {
    pub fn new(solid: SolidFuel) -> Self {
        Self {
            fuels: BTreeMap::new(),
            solid,
        }
    }

    /// Register a fuel, replacing any previous fuel for the same fluid.
    pub fn add(&mut self, fuel: MeltingFuel) -> Result<Option<MeltingFuel>, CatalogError> {
        if fuel.fluid.is_empty() {
            return Err(CatalogError::EmptyFluid);
        }
        if fuel.temperature <= 0 || fuel.rate <= 0 {
            return Err(CatalogError::NotHot(fuel.fluid));
        }
        if fuel.amount == 0 || fuel.duration <= 0 {
            return Err(CatalogError::NoAmount(fuel.fluid));
        }
        Ok(self.fuels.insert(fuel.fluid, fuel))
    }

    pub fn set_solid(&mut self, solid: SolidFuel) {
        self.solid = solid;
    }

    pub fn len(&self) -> usize {
        self.fuels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fuels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeltingFuel> {
        self.fuels.values()
    }
}

impl FuelLookup for FuelCatalog {
    fn find_fuel(&self, fluid: FluidId) -> Option<MeltingFuel> {
        self.fuels.get(&fluid).copied()
    }

    fn solid(&self) -> SolidFuel {
        self.solid
    }
}
