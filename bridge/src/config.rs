//! Bridge configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use advent_guestapi::INPUT_CAPACITY;

use crate::error::BridgeError;

/// Configuration for the host bridge.
///
/// Controls where the guest module is loaded from, the input buffer
/// capacity, and the resource ceilings applied to the guest store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Guest module to load. Binary `.wasm` or WAT text.
    pub module_path: PathBuf,

    /// Capacity of the guest's input buffer in bytes.
    /// Default: 256.
    pub input_capacity: u32,

    /// Maximum linear memory pages (1 page = 64 KiB).
    /// Default: 256 pages = 16 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel granted to each guest call.
    /// `None` leaves guest calls unmetered.
    pub fuel_limit: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from("game.wasm"),
            input_capacity: INPUT_CAPACITY as u32,
            max_memory_pages: 256, // 16 MiB
            fuel_limit: None,
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, BridgeError> {
        let config: Self =
            toml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Input capacity as the `i32` the guest ABI speaks.
    pub fn input_capacity_i32(&self) -> i32 {
        i32::try_from(self.input_capacity).unwrap_or(i32::MAX)
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.input_capacity == 0 {
            return Err(BridgeError::Config("input_capacity must be positive".into()));
        }
        if self.max_memory_pages == 0 {
            return Err(BridgeError::Config("max_memory_pages must be positive".into()));
        }
        if self.fuel_limit == Some(0) {
            return Err(BridgeError::Config("fuel_limit must be positive when set".into()));
        }
        Ok(())
    }
}
