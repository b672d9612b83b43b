// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for network tables and trace loading.

use std::path::PathBuf;

/// Errors that can occur when resolving networks or loading traces.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A trace file could not be opened or mapped.
    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),

    /// The NPY container is structurally invalid.
    #[error("malformed npy file '{path}': {detail}")]
    MalformedNpy { path: PathBuf, detail: String },

    /// The NPY file is valid but uses an encoding the loader does not
    /// accept (non-f32 dtype, Fortran order, big-endian data).
    #[error("unsupported npy encoding in '{path}': {detail}")]
    UnsupportedNpy { path: PathBuf, detail: String },

    /// The requested network has no built-in layer table.
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    /// The loaded buffer and header shape disagree.
    #[error(transparent)]
    Tensor(#[from] tensor_core::TensorError),
}
