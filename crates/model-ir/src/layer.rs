// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer descriptors for the built-in network tables.
//!
//! Each [`LayerDef`] describes one layer of a captured network: its kind,
//! activation function, stride, and padding. Tensor data is **not** stored
//! here — traces are loaded on demand by [`crate::TraceDir`].

/// The kind of computation a layer performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// 2D convolution over `[N, C, X, Y]` activations.
    Convolution,
    /// Fully-connected layer, executed as a degenerate convolution after
    /// the reshape/split pre-pass.
    FullyConnected,
}

impl LayerKind {
    /// Parses a layer kind from a table string.
    ///
    /// Accepts the trace-capture spellings (`"conv"`, `"fc"`) and the
    /// long forms.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "conv" | "convolution" => Some(Self::Convolution),
            "fc" | "fully_connected" | "fullyconnected" => Some(Self::FullyConnected),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Convolution => "convolution",
            Self::FullyConnected => "fully_connected",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing a single layer of a network.
///
/// Immutable once constructed; the runtime reads stride/padding/ReLU from
/// here and never writes back.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Network this layer belongs to (e.g. `"bvlc_alexnet"`). Doubles as
    /// the trace subdirectory name.
    pub network: String,
    /// Layer name (e.g. `"conv1"`, `"fc6"`). Doubles as the trace file stem.
    pub name: String,
    /// The kind of computation this layer performs.
    pub kind: LayerKind,
    /// Whether ReLU is applied after accumulation.
    pub relu: bool,
    /// Convolution stride (≥ 1).
    pub stride: usize,
    /// Spatial zero-padding applied before the convolution (≥ 0).
    pub padding: usize,
}

impl LayerDef {
    /// Creates a new layer descriptor.
    pub fn new(
        network: &str,
        name: &str,
        kind: LayerKind,
        relu: bool,
        stride: usize,
        padding: usize,
    ) -> Self {
        Self {
            network: network.to_string(),
            name: name.to_string(),
            kind,
            relu,
            stride,
            padding,
        }
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) stride={} pad={} relu={}",
            self.name, self.kind, self.stride, self.padding, self.relu,
        )
    }
}
