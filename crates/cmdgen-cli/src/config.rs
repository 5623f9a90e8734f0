//! Generator configuration
//!
//! Project-specific names the generated code refers to (status decoder
//! module, shared enums) and the enum tables. Every field has a default, so
//! an empty TOML document is a complete configuration:
//!
//! ```toml
//! status_module = "crate::lr2021::status"
//! bandwidth_categories = ["ble", "ook", "zigbee", "zwave"]
//! excluded_enums = ["TempFormat"]
//!
//! [enum_remap]
//! LastDetect = "ZwaveMode"
//!
//! [saturating_enums]
//! ZwaveMode = ["R1", "R2", "R3"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Names and tables used while generating code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Module providing the status and interrupt decoders.
    pub status_module: String,

    /// Type decoding the two status bytes of every response.
    pub status_type: String,

    /// Type decoding the interrupt flags of the system status.
    pub interrupt_type: String,

    /// Category whose file also imports the interrupt type.
    pub system_category: String,

    /// Path of the shared bandwidth enum, imported by `bandwidth_categories`.
    pub bandwidth_import: String,

    pub bandwidth_categories: Vec<String>,

    /// Name of the shared bandwidth enum.
    pub bandwidth_enum: String,

    /// The only category allowed to emit the bandwidth enum.
    pub bandwidth_owner: String,

    /// Enum types never emitted.
    pub excluded_enums: Vec<String>,

    /// Field enum names redirected to a shared enum type.
    pub enum_remap: BTreeMap<String, String>,

    /// Enums that get a saturating `new(val: u8)` constructor, with the
    /// ordered variants it maps to. Unknown codes map to the first one.
    pub saturating_enums: BTreeMap<String, Vec<String>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let remap = |names: &[&str], target: &str| {
            names
                .iter()
                .map(move |name| (name.to_string(), target.to_string()))
                .collect::<Vec<_>>()
        };

        let enum_remap = [
            remap(
                &["BitrateCh1", "BitrateCh2", "BitrateCh3", "BitrateCh4", "LastDetect"],
                "ZwaveMode",
            ),
            remap(&["Sd1Sf", "Sd2Sf", "Sd3Sf"], "Sf"),
            remap(&["Sd1Ldro", "Sd2Ldro", "Sd3Ldro"], "Ldro"),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            status_module: "crate::lr2021::status".to_string(),
            status_type: "Status".to_string(),
            interrupt_type: "Intr".to_string(),
            system_category: "system".to_string(),
            bandwidth_import: "super::RxBw".to_string(),
            bandwidth_categories: ["ble", "ook", "zigbee", "zwave"]
                .map(String::from)
                .to_vec(),
            bandwidth_enum: "RxBw".to_string(),
            bandwidth_owner: "fsk".to_string(),
            excluded_enums: vec!["TempFormat".to_string()],
            enum_remap,
            saturating_enums: BTreeMap::from([(
                "ZwaveMode".to_string(),
                ["R1", "R2", "R3"].map(String::from).to_vec(),
            )]),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("status_module", &self.status_module),
            ("status_type", &self.status_type),
            ("interrupt_type", &self.interrupt_type),
            ("bandwidth_import", &self.bandwidth_import),
            ("bandwidth_enum", &self.bandwidth_enum),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} cannot be empty")));
            }
        }

        for (name, target) in &self.enum_remap {
            if target.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "enum_remap target for '{name}' cannot be empty"
                )));
            }
            if self.enum_remap.contains_key(target) {
                return Err(ConfigError::Invalid(format!(
                    "enum_remap target '{target}' is itself remapped"
                )));
            }
        }

        for (name, variants) in &self.saturating_enums {
            if variants.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "saturating enum '{name}' needs at least one variant"
                )));
            }
        }

        Ok(())
    }

    /// Whether the file for `category` imports the shared bandwidth enum.
    pub fn imports_bandwidth(&self, category: &str) -> bool {
        self.bandwidth_categories.iter().any(|c| c == category)
    }

    /// Whether an enum named `name` (before remapping) is emitted in `category`.
    pub fn emits_enum(&self, name: &str, category: &str) -> bool {
        if self.enum_remap.contains_key(name) || self.excluded_enums.iter().any(|e| e == name) {
            return false;
        }
        name != self.bandwidth_enum || category == self.bandwidth_owner
    }
}
