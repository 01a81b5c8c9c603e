//! Loads the fuel catalog and item registry from a data directory.
//!
//! Each data file may be RON, TOML, or JSON, chosen by extension. A
//! directory holds at most one format per file name.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use smeltery_core::registry::{Registry, RegistryBuilder, RegistryError};
use smeltery_fuel::recipe::{CatalogError, FuelCatalog, MeltingFuel, SolidFuel};

use crate::schema::{FluidData, FuelsFile, ItemData};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("invalid fuel '{fluid}' in {file}: {source}")]
    InvalidFuel {
        file: PathBuf,
        fluid: String,
        source: CatalogError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats and discovery
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|format| Some(format.extension()) == ext)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

/// Find `{base_name}.ron|toml|json` in `dir`. More than one is an error.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read and deserialize a whole file.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Read a list. TOML has no top-level arrays, so there the list is the
/// array under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution
// ===========================================================================

/// Turn a failed name lookup into an `UnresolvedRef` error.
pub fn resolve_name<V>(
    found: Option<V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<V, DataLoadError> {
    found.ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Record `name` as seen, failing if it already was.
pub fn check_duplicate(
    seen: &mut HashSet<String>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if !seen.insert(name.to_string()) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything the fuel engines need from data files.
#[derive(Debug)]
pub struct FuelData {
    pub registry: Registry,
    pub catalog: FuelCatalog,
}

/// Load `fluids` (required), `items` (optional) and `fuels` (required) from
/// `dir`.
pub fn load_fuel_data(dir: &Path) -> Result<FuelData, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    let fluids_path = require_data_file(dir, "fluids")?;
    let fluids: Vec<FluidData> = deserialize_list(&fluids_path, "fluids")?;
    let mut seen = HashSet::new();
    for fluid in &fluids {
        check_duplicate(&mut seen, &fluid.name, &fluids_path)?;
        builder.register_fluid(&fluid.name)?;
    }

    if let Some(items_path) = find_data_file(dir, "items")? {
        let items: Vec<ItemData> = deserialize_list(&items_path, "items")?;
        load_items(&mut builder, &items, &items_path)?;
    }

    let registry = builder.build()?;

    let fuels_path = require_data_file(dir, "fuels")?;
    let fuels: FuelsFile = deserialize_file(&fuels_path)?;
    let catalog = build_catalog(&registry, &fuels, &fuels_path)?;

    debug!(
        "loaded {} fluids, {} items, {} fuels from {}",
        registry.fluid_count(),
        registry.item_count(),
        catalog.len(),
        dir.display()
    );
    Ok(FuelData { registry, catalog })
}

/// Items first, then remainders, so an item may name one defined later.
fn load_items(
    builder: &mut RegistryBuilder,
    items: &[ItemData],
    file: &Path,
) -> Result<(), DataLoadError> {
    let mut seen = HashSet::new();
    for item in items {
        check_duplicate(&mut seen, &item.name, file)?;
        builder.register_item(&item.name, item.burn_time, None)?;
    }
    for item in items {
        let Some(remainder) = &item.crafting_remainder else {
            continue;
        };
        let id = resolve_name(builder.item_id(remainder), remainder, file, "item")?;
        builder.mutate_item(&item.name, |def| def.crafting_remainder = Some(id))?;
    }
    Ok(())
}

fn build_catalog(
    registry: &Registry,
    file: &FuelsFile,
    path: &Path,
) -> Result<FuelCatalog, DataLoadError> {
    let mut catalog = FuelCatalog::new(
        file.solid
            .map(|s| SolidFuel {
                temperature: s.temperature,
                rate: s.rate,
            })
            .unwrap_or_default(),
    );
    let mut seen = HashSet::new();
    for entry in &file.fuels {
        check_duplicate(&mut seen, &entry.fluid, path)?;
        let fluid = resolve_name(registry.fluid_id(&entry.fluid), &entry.fluid, path, "fluid")?;
        let fuel = MeltingFuel {
            fluid,
            temperature: entry.temperature,
            duration: entry.duration,
            amount: entry.amount,
            rate: entry.rate,
        };
        catalog
            .add(fuel)
            .map_err(|source| DataLoadError::InvalidFuel {
                file: path.to_path_buf(),
                fluid: entry.fluid.clone(),
                source,
            })?;
    }
    Ok(catalog)
}

// ===========================================================================
// Tests
// ===========================================================================
