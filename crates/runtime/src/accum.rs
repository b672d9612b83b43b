// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The shared accumulation grid.
//!
//! During the accumulation phase the output tensor is the only shared
//! writable resource. Every PE write is an atomic read-modify-write add on
//! a single cell: a compare-exchange loop over the `f32` bit pattern. No
//! lock is held across cells; contention is per-cell.

use crate::Geometry;
use std::sync::atomic::{AtomicU32, Ordering};
use tensor_core::Tensor;

/// One atomic `f32` cell per output element, `[N, K, W, H]` row-major.
pub(crate) struct AccumGrid {
    cells: Vec<AtomicU32>,
}

impl AccumGrid {
    /// Allocates the grid and seeds every `(n, k, w, h)` cell with
    /// `bias[k]`. Runs before any PE is dispatched.
    pub(crate) fn seeded(geom: &Geometry, bias: &[f32]) -> Self {
        let plane = geom.out_x * geom.out_y;
        let mut cells = Vec::with_capacity(geom.output_elements());
        for _ in 0..geom.n_images {
            for k in 0..geom.filters {
                let seed = bias[k].to_bits();
                cells.extend((0..plane).map(|_| AtomicU32::new(seed)));
            }
        }
        Self { cells }
    }

    /// Atomically adds `delta` to the cell at `index`.
    #[inline]
    pub(crate) fn add(&self, index: usize, delta: f32) {
        let cell = &self.cells[index];
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let next = (f32::from_bits(current) + delta).to_bits();
            match cell.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Unwraps the grid into an owned output tensor. Callers must have
    /// joined all workers first.
    pub(crate) fn into_tensor(self, geom: &Geometry) -> Tensor {
        let data: Vec<f32> = self
            .cells
            .into_iter()
            .map(|c| f32::from_bits(c.into_inner()))
            .collect();
        Tensor::from_vec(geom.output_shape(), data)
            .expect("grid size matches output shape by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::{LayerDef, LayerKind};
    use tensor_core::Shape;

    fn small_geom() -> Geometry {
        let layer = LayerDef::new("test", "conv", LayerKind::Convolution, false, 1, 0);
        Geometry::derive(
            &layer,
            &Shape::new(vec![1, 1, 3, 3]),
            &Shape::new(vec![2, 1, 2, 2]),
        )
        .unwrap()
    }

    #[test]
    fn test_bias_seeding() {
        let geom = small_geom();
        let grid = AccumGrid::seeded(&geom, &[0.5, -1.5]);
        let out = grid.into_tensor(&geom);
        // Every (k, w, h) cell holds bias[k] before accumulation.
        for w in 0..2 {
            for h in 0..2 {
                assert_eq!(out.get4(0, 0, w, h), 0.5);
                assert_eq!(out.get4(0, 1, w, h), -1.5);
            }
        }
    }

    #[test]
    fn test_atomic_add_accumulates() {
        let geom = small_geom();
        let grid = AccumGrid::seeded(&geom, &[0.0, 0.0]);
        grid.add(0, 1.25);
        grid.add(0, 2.25);
        grid.add(5, -1.0);
        let out = grid.into_tensor(&geom);
        assert_eq!(out.as_slice()[0], 3.5);
        assert_eq!(out.as_slice()[5], -1.0);
    }

    #[test]
    fn test_concurrent_adds_do_not_lose_updates() {
        let geom = small_geom();
        let grid = AccumGrid::seeded(&geom, &[0.0, 0.0]);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        grid.add(3, 1.0);
                    }
                });
            }
        });
        let out = grid.into_tensor(&geom);
        assert_eq!(out.as_slice()[3], 4000.0);
    }
}
