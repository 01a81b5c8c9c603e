//! Smeltery Fuel -- heat from tanks and burnable items for melting structures.
//!
//! A melting structure installs one fuel engine and, each tick it needs heat,
//! asks it to [`find_fuel`](module::FuelModule::find_fuel). The engine picks
//! a source, checks the [`recipe::FuelLookup`] catalog, withdraws one
//! recipe's worth and records the resulting heat in its
//! [`state::FuelState`].
//!
//! # Engines
//!
//! - [`multitank::MultitankFuelModule`] -- draws from an ordered pool of tank
//!   positions, caching the tank that last yielded fuel. Also acts as one
//!   aggregate [`ResourceContainer`](smeltery_core::fluid::ResourceContainer)
//!   over the pool.
//! - [`solid::SolidFuelModule`] -- one fixed position; burns liquid from its
//!   tank, else burnable items from its inventory.
//!
//! # Around the engines
//!
//! - [`persist::FuelTag`] -- saved engine state, JSON.
//! - [`state::DataSlots`] and [`sync::DataSlotTracker`] -- the integer view
//!   of engine state and its delta sync to remote observers.
//! - [`info::FuelInfo`] -- display summary of the current fuel supply.

pub mod info;
pub mod module;
pub mod multitank;
pub mod persist;
pub mod recipe;
pub mod solid;
pub mod state;
pub mod sync;

pub use info::FuelInfo;
pub use module::{FuelCore, FuelModule};
pub use multitank::{MultitankFuelModule, PositionSource};
pub use recipe::{FuelCatalog, FuelLookup, MeltingFuel, SolidFuel};
pub use solid::SolidFuelModule;
pub use state::{DataSlots, FuelState};
