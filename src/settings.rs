//! Backend settings.
//!
//! Small, TOML-loadable knobs for the lowering backend. Everything has a
//! sensible default so embedders can use `BackendSettings::default()` and
//! never touch a config file.

use crate::compiler::compiler_errors::CompileError;
use crate::settings_log;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default fully qualified name of the reserved raw-memory address class.
///
/// Calls against this class are lowered as direct address arithmetic and
/// typed memory access instead of going through normal call lowering.
pub const DEFAULT_ADDRESS_CLASS: &str = "runtime.Address";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Fully qualified name of the reserved raw-memory address class
    pub address_class: String,

    /// Encode every lowered function body and run it through wasmparser.
    /// Slower, but catches malformed lowering before anything downstream
    /// consumes it.
    pub validate_output: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            address_class: DEFAULT_ADDRESS_CLASS.to_string(),
            validate_output: false,
        }
    }
}

impl BackendSettings {
    /// Parses settings from a TOML string. Missing keys fall back to their
    /// defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, CompileError> {
        let settings: BackendSettings = toml::from_str(source)
            .map_err(|e| CompileError::config_error(format!("Invalid backend settings: {}", e)))?;
        settings_log!("Backend settings: {:#?}", settings);
        Ok(settings)
    }

    /// Reads settings from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let source = fs::read_to_string(path)
            .map_err(|e| CompileError::file_error(path, format!("Can't read settings: {}", e)))?;
        Self::from_toml_str(&source)
    }
}
