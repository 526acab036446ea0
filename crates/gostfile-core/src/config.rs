use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GostError, GostResult};
use crate::types::{Algorithm, PaddingMode};

/// Top-level configuration (loaded from gostfile.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GostfileConfig {
    pub log: LogConfig,
    pub crypto: CryptoConfig,
    pub batch: BatchConfig,
    pub password: PasswordConfig,
}

impl GostfileConfig {
    /// Read `path` as TOML; a missing file yields the defaults.
    pub fn load(path: &Path) -> GostResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| GostError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| GostError::validation(format!("parsing config {}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Algorithm used when the caller does not name one
    pub algorithm: Algorithm,
    /// Padding validation on decrypt (default: lenient)
    pub padding: PaddingMode,
    /// Derive separate encryption and MAC subkeys from the password key.
    /// Containers written with this on only decrypt with it on.
    pub key_separation: bool,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Kuznyechik,
            padding: PaddingMode::Lenient,
            key_separation: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Include dot-files and descend into dot-directories during expansion
    pub include_hidden: bool,
}

/// Password generator defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Generated length, clamped to 8..=128 (default: 16)
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub special: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            digits: true,
            special: true,
        }
    }
}
