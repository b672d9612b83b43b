// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loading of captured layer traces from disk.
//!
//! Each layer is backed by four NPY files under `<root>/<network>/`:
//!
//! - `wgt-<layer>.npy` — weights `[K, C_k, R, S]`
//! - `bias-<layer>.npy` — bias `[K]`
//! - `act-<layer>-0.npy` — input activations `[N, C, X, Y]`
//! - `act-<layer>-0-out.npy` — golden outputs (`[N, K, W, H]`, or
//!   `[N, K]` for fully-connected layers)
//!
//! The loader materializes every array as an owned dense [`Tensor`]; a
//! missing or malformed file is fatal.

use crate::{npy, LayerDef, ModelError};
use std::path::{Path, PathBuf};
use tensor_core::{Shape, Tensor};

/// The four tensors captured for one layer.
#[derive(Debug, Clone)]
pub struct LayerTraces {
    /// Filter weights `[K, C_k, R, S]`.
    pub weights: Tensor,
    /// Per-filter bias `[K]`.
    pub bias: Tensor,
    /// Input activations `[N, C, X, Y]`.
    pub activations: Tensor,
    /// Golden output activations used for validation.
    pub reference: Tensor,
}

impl LayerTraces {
    /// Returns a concise summary for display: shapes plus input densities.
    pub fn summary(&self) -> String {
        format!(
            "wgt {} ({:.1}% nz), act {} ({:.1}% nz), bias {}, ref {}",
            self.weights.shape(),
            self.weights.density() * 100.0,
            self.activations.shape(),
            self.activations.density() * 100.0,
            self.bias.shape(),
            self.reference.shape(),
        )
    }
}

/// A directory of captured network traces.
///
/// # Example
/// ```no_run
/// use model_ir::{network, TraceDir};
///
/// let traces = TraceDir::new("net_traces");
/// let layer = &network::bvlc_alexnet()[0];
/// let t = traces.load_layer(layer).unwrap();
/// println!("conv1: {}", t.summary());
/// ```
#[derive(Debug, Clone)]
pub struct TraceDir {
    root: PathBuf,
}

impl TraceDir {
    /// Creates a trace directory handle. No I/O happens until a layer is
    /// loaded.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the trace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads all four tensors for the given layer.
    pub fn load_layer(&self, layer: &LayerDef) -> Result<LayerTraces, ModelError> {
        let dir = self.root.join(&layer.network);

        let weights = load_tensor(&dir.join(format!("wgt-{}.npy", layer.name)))?;
        let bias = load_tensor(&dir.join(format!("bias-{}.npy", layer.name)))?;
        let activations = load_tensor(&dir.join(format!("act-{}-0.npy", layer.name)))?;
        let reference = load_tensor(&dir.join(format!("act-{}-0-out.npy", layer.name)))?;

        tracing::debug!(
            layer = %layer.name,
            wgt = %weights.shape(),
            act = %activations.shape(),
            "layer traces loaded into memory"
        );

        Ok(LayerTraces {
            weights,
            bias,
            activations,
            reference,
        })
    }
}

fn load_tensor(path: &Path) -> Result<Tensor, ModelError> {
    let (dims, data) = npy::read(path)?;
    Ok(Tensor::from_vec(Shape::new(dims), data)?)
}
