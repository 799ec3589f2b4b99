//! Compression modes and input format hints understood by the optimizer service

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Aggressiveness tier for the remote optimizer
///
/// The service accepts `safe`, `balanced` and `aggressive`. The SDK also takes
/// the `low` / `medium` / `high` aliases; any other value falls back to
/// [`CompressionMode::Balanced`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Minimal compression, maximum quality
    Safe,
    /// Balanced tradeoff (recommended)
    #[default]
    Balanced,
    /// Maximum compression
    Aggressive,
}

impl CompressionMode {
    /// Map a user-facing mode name onto the value the backend expects
    pub fn normalize(mode: &str) -> Self {
        match mode {
            "low" | "safe" => CompressionMode::Safe,
            "medium" | "balanced" => CompressionMode::Balanced,
            "high" | "aggressive" => CompressionMode::Aggressive,
            _ => CompressionMode::Balanced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionMode::Safe => "safe",
            CompressionMode::Balanced => "balanced",
            CompressionMode::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<&str> for CompressionMode {
    fn from(mode: &str) -> Self {
        Self::normalize(mode)
    }
}

impl From<String> for CompressionMode {
    fn from(mode: String) -> Self {
        Self::normalize(&mode)
    }
}

/// Format hint sent alongside the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Let the service detect the format
    #[default]
    Auto,
    Text,
    Json,
    Yaml,
    Csv,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Auto => "auto",
            InputFormat::Text => "text",
            InputFormat::Json => "json",
            InputFormat::Yaml => "yaml",
            InputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
