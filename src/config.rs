//! Codec configuration, read from `chwire.toml`.
//!
//! ```toml
//! allow_decimal512 = true
//! max_collection_len = 1048576
//! max_type_depth = 128
//! render = "trimmed"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{WireError, WireResult};
use crate::normalize::RenderStyle;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "chwire.toml";

/// Default upper bound for array and map length prefixes.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 20;

/// Default limit on parenthesis nesting in a type string.
pub const DEFAULT_MAX_TYPE_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Accept precisions above 76 (512-bit storage).
    pub allow_decimal512: bool,
    /// Largest array/map length prefix decode accepts.
    pub max_collection_len: usize,
    /// Deepest type nesting accepted when parsing type strings.
    pub max_type_depth: usize,
    /// Text form of decoded decimals.
    pub render: RenderStyle,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            allow_decimal512: true,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_type_depth: DEFAULT_MAX_TYPE_DEPTH,
            render: RenderStyle::Scaled,
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(content: &str) -> WireResult<Self> {
        toml::from_str(content).map_err(|e| WireError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> WireResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| WireError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded codec config");
        Ok(config)
    }

    /// Resolve configuration: `explicit` if given, else `./chwire.toml`, else
    /// `<config dir>/chwire/config.toml`, else defaults.
    pub fn discover(explicit: Option<&Path>) -> WireResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("chwire").join("config.toml"));
        }
        paths
    }
}
