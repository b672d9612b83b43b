// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-layer and whole-run execution reports.
//!
//! [`RunReport`] collects the timed section duration and the validation
//! outcome of every executed layer. The CLI prints the per-layer timings
//! and the total from here; `serde` derives allow dumping the report as
//! JSON.

use crate::ValidationReport;
use model_ir::LayerDef;
use std::time::Duration;

/// Metrics for a single layer's execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LayerReport {
    /// Layer name.
    pub layer: String,
    /// Layer kind label (`"convolution"` / `"fully_connected"`).
    pub kind: String,
    /// Wall-clock time of the timed section.
    pub compute_duration: Duration,
    /// Elements validated against the golden reference.
    pub checked: usize,
    /// Elements exceeding the validation tolerance.
    pub violations: usize,
    /// Largest absolute error observed during validation.
    pub max_abs_error: f32,
}

/// Aggregate metrics for a complete network run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    /// Network name.
    pub network: String,
    /// Sum of per-layer compute durations.
    pub total_duration: Duration,
    /// Per-layer reports, in execution order.
    pub layers: Vec<LayerReport>,
}

impl RunReport {
    /// Creates an empty report for the named network.
    pub fn new(network: &str) -> Self {
        Self {
            network: network.to_string(),
            total_duration: Duration::ZERO,
            layers: Vec::new(),
        }
    }

    /// Records one executed layer.
    pub fn record(
        &mut self,
        layer: &LayerDef,
        compute_duration: Duration,
        validation: &ValidationReport,
    ) {
        self.total_duration += compute_duration;
        self.layers.push(LayerReport {
            layer: layer.name.clone(),
            kind: layer.kind.as_str().to_string(),
            compute_duration,
            checked: validation.checked,
            violations: validation.violations,
            max_abs_error: validation.max_abs_error,
        });
    }

    /// Total validation violations across all layers.
    pub fn total_violations(&self) -> usize {
        self.layers.iter().map(|l| l.violations).sum()
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} layers, {:.6}s total, {} validation violations",
            self.network,
            self.layers.len(),
            self.total_duration.as_secs_f64(),
            self.total_violations(),
        )
    }
}
