// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-layer execution pipeline and the whole-network driver.
//!
//! ```text
//! LayerExecution<Loaded>
//!     │  .prepare()
//!     ▼
//! LayerExecution<Prepared>
//!     │  .run()
//!     ▼
//!   LayerOutput
//! ```
//!
//! `prepare()` performs the untimed pre-pass: the fully-connected
//! reshape/split, spatial zero-padding, geometry derivation (with all
//! shape-invariant checks), the tile-aligning grid pad, and offline
//! weight compression. `run()` is the timed section: bias seeding, the
//! stride-phase tile dispatch across the worker pool, and the ReLU
//! finish.

use crate::accum::AccumGrid;
use crate::pe::{scatter_accumulate, ActQueue};
use crate::{
    check_values, CompressedWeights, Geometry, RunReport, RuntimeConfig, RuntimeError,
};
use model_ir::{LayerDef, LayerKind, LayerTraces, TraceDir};
use rayon::prelude::*;
use std::time::Instant;
use tensor_core::Tensor;

/// Fully-connected layers fold their flattened channel axis onto a
/// synthetic 16x16 grid, 256 channels per tile.
const FC_FOLD: usize = 256;
const FC_GRID: usize = 16;

// ── Type-state markers ─────────────────────────────────────────

/// Traces are loaded; the pre-pass has not run.
#[derive(Debug)]
pub struct Loaded;

/// Pre-pass complete: geometry derived, weights compressed.
#[derive(Debug)]
pub struct Prepared;

/// Sealed trait for execution states.
pub trait ExecutionState: std::fmt::Debug {}
impl ExecutionState for Loaded {}
impl ExecutionState for Prepared {}

// ── Output ─────────────────────────────────────────────────────

/// The result of executing one layer.
#[derive(Debug)]
pub struct LayerOutput {
    /// Computed output activations `[N, K, W, H]`.
    pub output: Tensor,
    /// The golden reference captured alongside the inputs, handed back
    /// for validation.
    pub reference: Tensor,
    /// Wall-clock time of the timed section (seed → accumulate → ReLU).
    pub compute_duration: std::time::Duration,
}

// ── Layer execution ────────────────────────────────────────────

/// Executes a single layer against its captured traces.
///
/// `S` is a type-state marker enforcing the pipeline ordering at compile
/// time: `run()` does not exist on a `Loaded` execution, and `prepare()`
/// does not exist on a `Prepared` one.
///
/// # Example
/// ```no_run
/// use model_ir::{network, TraceDir};
/// use runtime::{LayerExecution, RuntimeConfig};
///
/// # fn example() -> Result<(), runtime::RuntimeError> {
/// let config = RuntimeConfig::default();
/// let layer = network::bvlc_alexnet()[0].clone();
/// let traces = TraceDir::new(&config.traces_root).load_layer(&layer)?;
/// let out = LayerExecution::new(config, layer, traces)
///     .prepare()?
///     .run()?;
/// println!("computed {} outputs", out.output.num_elements());
/// # Ok(())
/// # }
/// ```
pub struct LayerExecution<S: ExecutionState = Loaded> {
    config: RuntimeConfig,
    layer: LayerDef,
    traces: LayerTraces,
    // Populated by prepare():
    geometry: Option<Geometry>,
    weights: Option<CompressedWeights>,
    _state: std::marker::PhantomData<S>,
}

impl LayerExecution<Loaded> {
    /// Creates an execution over freshly loaded traces.
    pub fn new(config: RuntimeConfig, layer: LayerDef, traces: LayerTraces) -> Self {
        Self {
            config,
            layer,
            traces,
            geometry: None,
            weights: None,
            _state: std::marker::PhantomData,
        }
    }

    /// Runs the untimed pre-pass and transitions to `Prepared`.
    ///
    /// Steps:
    /// 1. Restrict the batch when single-image mode is on.
    /// 2. FC layers only: collapse spatial dims, then split both the
    ///    activation and the weight channel axis onto the synthetic grid.
    /// 3. Zero-pad, derive the tile geometry, grid-pad to the tile size.
    /// 4. Compress the weights into stride-phase partitions.
    pub fn prepare(mut self) -> Result<LayerExecution<Prepared>, RuntimeError> {
        if self.config.single_image {
            self.traces.activations.truncate_images(1)?;
            self.traces.reference.truncate_images(1)?;
        }

        if self.layer.kind == LayerKind::FullyConnected {
            self.traces.activations.collapse_spatial()?;

            let channels = self.traces.activations.shape().dim(1).unwrap_or(0);
            if channels % FC_FOLD != 0 {
                return Err(RuntimeError::ShapeInvariant(format!(
                    "layer '{}': fully-connected split needs C divisible by {FC_FOLD}, got {channels}",
                    self.layer.name
                )));
            }
            self.traces
                .activations
                .split_channels(channels / FC_FOLD, FC_GRID, FC_GRID)?;

            let wgt_channels = self.traces.weights.shape().dim(1).unwrap_or(0);
            if wgt_channels % FC_FOLD != 0 {
                return Err(RuntimeError::ShapeInvariant(format!(
                    "layer '{}': fully-connected split needs C_k divisible by {FC_FOLD}, got {wgt_channels}",
                    self.layer.name
                )));
            }
            self.traces
                .weights
                .split_channels(wgt_channels / FC_FOLD, FC_GRID, FC_GRID)?;
        }

        self.traces.activations.zero_pad(self.layer.padding)?;

        let geometry = Geometry::derive(
            &self.layer,
            self.traces.activations.shape(),
            self.traces.weights.shape(),
        )?;
        if self.traces.bias.num_elements() != geometry.filters {
            return Err(RuntimeError::ShapeInvariant(format!(
                "layer '{}': bias holds {} entries for {} filters",
                self.layer.name,
                self.traces.bias.num_elements(),
                geometry.filters,
            )));
        }

        // Force the tile-aligned spatial size. With the captured traces
        // this is the identity, but the engine relies on the exact size.
        self.traces.activations.grid_zero_pad(geometry.x, geometry.y)?;

        let weights = CompressedWeights::build(&self.traces.weights, &geometry);
        tracing::debug!(
            layer = %self.layer.name,
            partitions = weights.num_partitions(),
            nonzeros = weights.nonzeros(),
            "weights compressed"
        );

        Ok(LayerExecution {
            config: self.config,
            layer: self.layer,
            traces: self.traces,
            geometry: Some(geometry),
            weights: Some(weights),
            _state: std::marker::PhantomData,
        })
    }
}

impl LayerExecution<Prepared> {
    /// Returns the derived tile geometry.
    pub fn geometry(&self) -> &Geometry {
        self.geometry.as_ref().expect("geometry exists in Prepared state")
    }

    /// Runs the timed section: bias seeding, accumulation, ReLU.
    ///
    /// The `ck` axis of each channel group is dispatched across the
    /// worker pool; everything else is sequential. Seeding strictly
    /// precedes all PE work, and all PE work strictly precedes ReLU.
    pub fn run(self) -> Result<LayerOutput, RuntimeError> {
        if self.config.pe_width == 0 || self.config.pe_height == 0 {
            return Err(RuntimeError::Config(format!(
                "PE dimensions must be non-zero, got {}x{}",
                self.config.pe_width, self.config.pe_height
            )));
        }

        let (pe_width, pe_height) = (self.config.pe_width, self.config.pe_height);
        let geom = self.geometry.expect("geometry exists in Prepared state");
        let weights = self.weights.expect("weights exist in Prepared state");
        let acts = &self.traces.activations;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.resolve_threads())
            .build()
            .map_err(|e| RuntimeError::Config(format!("cannot build worker pool: {e}")))?;

        let started = Instant::now();

        let grid = AccumGrid::seeded(&geom, self.traces.bias.as_slice());

        pool.install(|| {
            for n in 0..geom.n_images {
                for ct in (0..geom.channels).step_by(geom.wgt_channels) {
                    (0..geom.wgt_channels).into_par_iter().for_each(|ck| {
                        compute_tile(
                            n,
                            ct,
                            ck,
                            &geom,
                            acts,
                            &weights,
                            pe_width,
                            pe_height,
                            &grid,
                        );
                    });
                }
            }
        });

        let mut output = grid.into_tensor(&geom);
        if self.layer.relu {
            output.as_slice_mut().iter_mut().for_each(|v| *v = v.max(0.0));
        }

        let compute_duration = started.elapsed();
        tracing::debug!(
            layer = %self.layer.name,
            elapsed_ms = compute_duration.as_secs_f64() * 1000.0,
            "layer computed"
        );

        Ok(LayerOutput {
            output,
            reference: self.traces.reference,
            compute_duration,
        })
    }
}

impl<S: ExecutionState> std::fmt::Debug for LayerExecution<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerExecution")
            .field("state", &std::any::type_name::<S>())
            .field("layer", &self.layer.name)
            .field("has_geometry", &self.geometry.is_some())
            .field("has_compressed_weights", &self.weights.is_some())
            .finish()
    }
}

/// One tile: all stride phases of a single `(n, ct + ck)` channel.
#[allow(clippy::too_many_arguments)]
fn compute_tile(
    n: usize,
    ct: usize,
    ck: usize,
    geom: &Geometry,
    activations: &Tensor,
    weights: &CompressedWeights,
    pe_width: usize,
    pe_height: usize,
    grid: &AccumGrid,
) {
    for sx in 0..geom.stride {
        for sy in 0..geom.stride {
            let act_queue = ActQueue::gather(activations, n, ct + ck, sx, sy, geom.stride);
            let wgt_queue = weights.partition(ct + ck, sx, sy);
            if act_queue.is_empty() || wgt_queue.is_empty() {
                continue;
            }
            scatter_accumulate(n, geom, &act_queue, wgt_queue, pe_width, pe_height, grid);
        }
    }
}

// ── Whole-network driver ───────────────────────────────────────

/// Executes every layer of the configured network and validates each
/// output against its golden reference.
///
/// In strict mode the first layer with violations aborts the run; in
/// verbose mode violations are counted into the report.
pub fn run_network(config: &RuntimeConfig) -> Result<RunReport, RuntimeError> {
    let layers = model_ir::network::by_name(&config.network)?;
    let traces = TraceDir::new(&config.traces_root);
    let mut report = RunReport::new(&config.network);

    for layer in layers {
        let loaded = traces.load_layer(&layer)?;
        tracing::info!(layer = %layer.name, kind = %layer.kind, "executing layer");

        let out = LayerExecution::new(config.clone(), layer.clone(), loaded)
            .prepare()?
            .run()?;

        let validation = check_values(&out.output, &out.reference, config.tolerance)?;
        if config.strict && !validation.passed() {
            return Err(RuntimeError::ValidationFailed {
                layer: layer.name,
                violations: validation.violations,
                checked: validation.checked,
                tolerance: config.tolerance,
            });
        }

        report.record(&layer, out.compute_duration, &validation);
    }

    tracing::info!("{}", report.summary());
    Ok(report)
}
