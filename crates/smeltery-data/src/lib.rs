pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, FuelData, load_fuel_data};
