// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Configuration for the exporter.
//!
//! Values come from the environment; command-line flags override them.
//!
//! - `KCTX_OUTPUT_FORMAT`: `raw`, `hex` or `base64` (default: hex)
//! - `KCTX_LOG_FORMAT`: `text` or `json` (default: text)
//! - `KCTX_OUTPUT`: write records to this file instead of stdout

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Encoding of records on stdout or in files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bytes exactly as handed to the kernel
    Raw,
    Hex,
    Base64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format: {}", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(OutputFormat::Raw),
            "hex" => Ok(OutputFormat::Hex),
            "base64" => Ok(OutputFormat::Base64),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

impl FromStr for LogFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// Exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Record encoding (default: hex)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Log line format (default: text)
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Destination file; stdout when unset
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Hex
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            output_format: default_output_format(),
            log_format: default_log_format(),
            output_path: None,
        }
    }
}

impl ExporterConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Unparseable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            output_format: lookup("KCTX_OUTPUT_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_output_format),
            log_format: lookup("KCTX_LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_log_format),
            output_path: lookup("KCTX_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let config = ExporterConfig::from_lookup(|_| None);
        assert_eq!(config, ExporterConfig::default());
        assert_eq!(config.output_format, OutputFormat::Hex);
    }

    #[test]
    fn environment_overrides() {
        let config = ExporterConfig::from_lookup(|key| match key {
            "KCTX_OUTPUT_FORMAT" => Some("Base64".to_string()),
            "KCTX_LOG_FORMAT" => Some("json".to_string()),
            "KCTX_OUTPUT" => Some("/run/kctx.bin".to_string()),
            _ => None,
        });
        assert_eq!(config.output_format, OutputFormat::Base64);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.output_path, Some(PathBuf::from("/run/kctx.bin")));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ExporterConfig::from_lookup(|key| match key {
            "KCTX_OUTPUT_FORMAT" => Some("pem".to_string()),
            "KCTX_OUTPUT" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.output_format, OutputFormat::Hex);
        assert_eq!(config.output_path, None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ExporterConfig = serde_json::from_str(r#"{"output_format":"raw"}"#).unwrap();
        assert_eq!(config.output_format, OutputFormat::Raw);
        assert_eq!(config.log_format, LogFormat::Text);
    }
}
