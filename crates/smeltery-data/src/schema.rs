//! On-disk format of the fuel data files.
//!
//! Names, not ids, are used for cross references; the loader resolves them
//! against the registry it builds.

use serde::Deserialize;

/// An entry of `fluids.{ron,toml,json}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FluidData {
    pub name: String,
}

/// An entry of `items.{ron,toml,json}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    /// Furnace burn time. Items without one are not fuel.
    #[serde(default)]
    pub burn_time: u32,
    /// Name of the item left behind after burning, e.g. an empty bucket.
    #[serde(default)]
    pub crafting_remainder: Option<String>,
}

/// A liquid fuel: `amount` of `fluid` burns for `duration` at
/// `temperature`.
#[derive(Debug, Clone, Deserialize)]
pub struct FuelEntryData {
    pub fluid: String,
    pub temperature: i32,
    pub duration: i32,
    pub amount: u32,
    pub rate: i32,
}

/// Heat produced by burnable items.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SolidFuelData {
    pub temperature: i32,
    pub rate: i32,
}

/// The whole of `fuels.{ron,toml,json}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuelsFile {
    #[serde(default)]
    pub fuels: Vec<FuelEntryData>,
    #[serde(default)]
    pub solid: Option<SolidFuelData>,
}
