// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! Static network descriptions and trace loading for the SCNN CPU
//! reference model.
//!
//! This crate provides:
//! - [`LayerDef`] / [`LayerKind`] — immutable per-layer descriptors
//!   (name, kind, ReLU flag, stride, padding).
//! - [`network`] — the built-in per-network layer tables
//!   (`bvlc_alexnet`, `vgg_cnn_s`) in forward order.
//! - [`TraceDir`] / [`LayerTraces`] — loading of captured NPY tensor
//!   traces (weights, bias, input activations, golden outputs) from disk
//!   via memory-mapped I/O.
//!
//! Tensor *semantics* live elsewhere: this crate only materializes dense
//! buffers and hands them to the runtime.

mod error;
mod layer;
mod npy;
mod trace;

pub mod network;

pub use error::ModelError;
pub use layer::{LayerDef, LayerKind};
pub use trace::{LayerTraces, TraceDir};
