// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! traces_root = "net_traces"
//! network = "bvlc_alexnet"
//! num_threads = 4
//! pe_width = 4
//! pe_height = 4
//! single_image = true
//! tolerance = 0.01
//! strict = true
//! ```

use std::path::{Path, PathBuf};

/// Configuration for the SCNN engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Directory holding the captured traces, one subdirectory per network.
    #[serde(default = "default_traces_root")]
    pub traces_root: PathBuf,
    /// Name of the built-in network table to execute.
    #[serde(default = "default_network")]
    pub network: String,
    /// Number of worker threads for the `ck` dispatch axis. `None` keeps
    /// the single-worker operating point.
    #[serde(default)]
    pub num_threads: Option<usize>,
    /// Column multipliers per PE (the `I` tile dimension).
    #[serde(default = "default_pe_dim")]
    pub pe_width: usize,
    /// Row multipliers per PE (the `F` tile dimension).
    #[serde(default = "default_pe_dim")]
    pub pe_height: usize,
    /// Process only image 0 of each captured activation batch.
    #[serde(default = "default_true")]
    pub single_image: bool,
    /// Absolute error tolerance for output validation.
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    /// Abort on the first layer with validation violations. When `false`,
    /// violations are counted and reported per layer instead.
    #[serde(default = "default_true")]
    pub strict: bool,
}

fn default_traces_root() -> PathBuf {
    PathBuf::from("net_traces")
}

fn default_network() -> String {
    "bvlc_alexnet".to_string()
}

fn default_pe_dim() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> f32 {
    0.01
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::Config(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| super::RuntimeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Resolves the worker-thread count. Defaults to one worker, the
    /// reference operating point.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads.unwrap_or(1).max(1)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            traces_root: default_traces_root(),
            network: default_network(),
            num_threads: None,
            pe_width: default_pe_dim(),
            pe_height: default_pe_dim(),
            single_image: true,
            tolerance: default_tolerance(),
            strict: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.network, "bvlc_alexnet");
        assert_eq!(c.pe_width, 4);
        assert_eq!(c.pe_height, 4);
        assert!(c.single_image);
        assert!(c.strict);
        assert_eq!(c.resolve_threads(), 1);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
traces_root = "/tmp/traces"
network = "vgg_cnn_s"
num_threads = 4
single_image = false
strict = false
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.traces_root, PathBuf::from("/tmp/traces"));
        assert_eq!(c.network, "vgg_cnn_s");
        assert_eq!(c.resolve_threads(), 4);
        assert!(!c.single_image);
        assert!(!c.strict);
        // Omitted keys keep their defaults.
        assert_eq!(c.pe_width, 4);
        assert!((c.tolerance - 0.01).abs() < f32::EPSILON);
    }

    #[test]
    fn test_toml_roundtrip() {
        let c = RuntimeConfig {
            num_threads: Some(8),
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back.network, c.network);
        assert_eq!(back.num_threads, Some(8));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let result = RuntimeConfig::from_toml("network = 5");
        assert!(matches!(result, Err(crate::RuntimeError::Config(_))));
    }

    #[test]
    fn test_resolve_threads_clamps_zero() {
        let c = RuntimeConfig {
            num_threads: Some(0),
            ..Default::default()
        };
        assert_eq!(c.resolve_threads(), 1);
    }
}
