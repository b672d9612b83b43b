// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod inspect;
pub mod run;

use runtime::RuntimeConfig;
use std::path::Path;

/// Initializes tracing based on `-v` repetition.
pub fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Loads the base configuration: the TOML file when given, defaults
/// otherwise. Subcommand flags are layered on top by the callers.
pub fn base_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    match path {
        Some(p) => RuntimeConfig::from_file(p)
            .map_err(|e| anyhow::anyhow!("cannot load config '{}': {e}", p.display())),
        None => Ok(RuntimeConfig::default()),
    }
}
