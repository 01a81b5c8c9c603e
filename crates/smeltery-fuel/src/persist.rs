//! The persisted form of an engine's fuel state.
//!
//! Stored as JSON so that tags written by older versions (missing fields)
//! still load: every field defaults to zero / none.

use serde::{Deserialize, Serialize};
use smeltery_core::id::BlockPos;

/// Errors that can occur while saving or loading a [`FuelTag`].
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("fuel tag encoding failed: {0}")]
    Encode(String),
    #[error("fuel tag decoding failed: {0}")]
    Decode(String),
}

/// Saved engine state. `fuel_quality` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuelTag {
    #[serde(default)]
    pub fuel: i32,
    #[serde(default)]
    pub temperature: i32,
    #[serde(default)]
    pub rate: i32,
    /// Last position fuel was found at, relative to the owner's origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fuel_position: Option<BlockPos>,
}

impl FuelTag {
    pub fn to_json(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(|e| PersistError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        serde_json::from_str(json).map_err(|e| PersistError::Decode(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        serde_json::to_vec(self).map_err(|e| PersistError::Encode(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, PersistError> {
        serde_json::from_slice(data).map_err(|e| PersistError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let tag = FuelTag {
            fuel: 120,
            temperature: 1000,
            rate: 10,
            last_fuel_position: Some(BlockPos::new(1, -1, 2)),
        };
        let json = tag.to_json().unwrap();
        assert_eq!(FuelTag::from_json(&json).unwrap(), tag);
        assert_eq!(FuelTag::from_bytes(&tag.to_bytes().unwrap()).unwrap(), tag);
    }

    #[test]
    fn none_position_is_not_written() {
        let tag = FuelTag {
            fuel: 5,
            ..FuelTag::default()
        };
        let json = tag.to_json().unwrap();
        assert!(!json.contains("last_fuel_position"), "{json}");
    }

    #[test]
    fn legacy_tags_default_missing_fields() {
        let tag = FuelTag::from_json(r#"{"fuel": 40}"#).unwrap();
        assert_eq!(tag.fuel, 40);
        assert_eq!(tag.temperature, 0);
        assert_eq!(tag.rate, 0);
        assert_eq!(tag.last_fuel_position, None);

        let tag = FuelTag::from_json(r#"{"last_fuel_position": {"x": 3}}"#).unwrap();
        assert_eq!(tag.last_fuel_position, Some(BlockPos::new(3, 0, 0)));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            FuelTag::from_json("not json"),
            Err(PersistError::Decode(_))
        ));
    }
}
