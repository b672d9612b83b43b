// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the SCNN engine.
//!
//! Every error is fatal: nothing is retried, and the driver aborts with a
//! diagnostic. Owned tensor buffers unwind deterministically.

/// Errors that can occur during layer preparation, execution, and
/// validation.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A shape invariant required by the tile geometry does not hold
    /// (e.g. `C` not divisible by `C_k`).
    #[error("shape invariant violated: {0}")]
    ShapeInvariant(String),

    /// Trace loading or network lookup failed.
    #[error("model error: {0}")]
    Model(#[from] model_ir::ModelError),

    /// A tensor transform failed during the pre-pass.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// A computed output diverged from the golden reference (strict mode).
    #[error(
        "validation failed for layer '{layer}': {violations} of {checked} \
         elements exceed absolute tolerance {tolerance}"
    )]
    ValidationFailed {
        layer: String,
        violations: usize,
        checked: usize,
        tolerance: f32,
    },

    /// Configuration error (bad TOML, unusable thread count, ...).
    #[error("configuration error: {0}")]
    Config(String),
}
