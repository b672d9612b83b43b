// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

/// Errors that can occur during tensor construction and layout transforms.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer length does not match the element count implied
    /// by the shape.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The tensor does not have the rank the operation requires.
    #[error("{op} requires a rank-{expected} tensor, got rank {actual}")]
    RankMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A shape invariant required by the operation does not hold.
    #[error("shape invariant violated in {op}: {detail}")]
    ShapeInvariant { op: &'static str, detail: String },
}
