// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `scnn inspect`: display a network's layer table and trace shapes.

use model_ir::TraceDir;
use runtime::RuntimeConfig;
use std::path::PathBuf;

pub fn execute(
    config: RuntimeConfig,
    network: Option<String>,
    traces: Option<PathBuf>,
) -> anyhow::Result<()> {
    let network = network.unwrap_or(config.network);
    let traces_root = traces.unwrap_or(config.traces_root);

    let layers = model_ir::network::by_name(&network)?;
    let trace_dir = TraceDir::new(&traces_root);

    println!("Network: {network} ({} layers)", layers.len());
    println!(
        "  {:<8} {:<16} {:>6} {:>8} {:>6}",
        "Name", "Kind", "Stride", "Padding", "ReLU",
    );
    println!("  {}", "-".repeat(50));
    for layer in &layers {
        println!(
            "  {:<8} {:<16} {:>6} {:>8} {:>6}",
            layer.name,
            layer.kind.as_str(),
            layer.stride,
            layer.padding,
            layer.relu,
        );
    }
    println!();

    // Shapes and densities, when the trace files are present.
    for layer in &layers {
        match trace_dir.load_layer(layer) {
            Ok(t) => println!("  {:<8} {}", layer.name, t.summary()),
            Err(e) => {
                tracing::debug!(layer = %layer.name, "no traces: {e}");
                println!("  {:<8} <traces unavailable>", layer.name);
            }
        }
    }

    Ok(())
}
