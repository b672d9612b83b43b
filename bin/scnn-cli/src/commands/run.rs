// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `scnn run`: execute a network over its captured traces.
//!
//! Prints per-layer elapsed time and a total, matching the reference
//! driver's output contract. Exit code 0 on success; any load, shape, or
//! (strict-mode) validation failure is fatal.

use runtime::RuntimeConfig;
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    mut config: RuntimeConfig,
    network: Option<String>,
    traces: Option<PathBuf>,
    threads: Option<usize>,
    no_strict: bool,
    all_images: bool,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(network) = network {
        config.network = network;
    }
    if let Some(traces) = traces {
        config.traces_root = traces;
    }
    if threads.is_some() {
        config.num_threads = threads;
    }
    if no_strict {
        config.strict = false;
    }
    if all_images {
        config.single_image = false;
    }

    tracing::info!(
        network = %config.network,
        traces = %config.traces_root.display(),
        threads = config.resolve_threads(),
        "starting run"
    );

    let report = runtime::run_network(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for layer in &report.layers {
        println!(
            "Layer {} time: {:.6}",
            layer.layer,
            layer.compute_duration.as_secs_f64(),
        );
        if !config.strict && layer.violations > 0 {
            println!(
                "  ERRORS: {} out of {} with absolute error tolerance of {:.2}",
                layer.violations, layer.checked, config.tolerance,
            );
        }
    }
    println!("Total time: {:.6}", report.total_duration.as_secs_f64());

    Ok(())
}
