// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The processing element: a tile-blocked Cartesian-product multiplier.
//!
//! A PE consumes one activation queue and one weight queue and forms their
//! full Cartesian product in `I x F` blocks, mirroring the multiplier
//! array of the hardware. For each pair it derives the output coordinate
//! from the stride equation, bounds-checks it, and scatter-accumulates the
//! partial product into the shared grid.
//!
//! The blocking bounds the scatter's working set; it does not change the
//! pair set, only the accumulation order. Floating-point addition is not
//! associative, so downstream comparisons use an absolute tolerance.

use crate::accum::AccumGrid;
use crate::{Geometry, WeightQueue};
use tensor_core::Tensor;

/// Non-zero activations of one `(n, channel, sx, sy)` slice, as parallel
/// arrays `(value, x, y)`. Slice-local: built per tile dispatch and never
/// shared.
#[derive(Debug, Default)]
pub struct ActQueue {
    /// Activation values.
    pub value: Vec<f32>,
    /// Spatial row per entry (padded coordinates).
    pub x: Vec<usize>,
    /// Spatial column per entry (padded coordinates).
    pub y: Vec<usize>,
}

impl ActQueue {
    /// Scans channel `channel` of image `n` and gathers the non-zero
    /// activations whose coordinates fall in stride phase `(sx, sy)`.
    pub fn gather(
        activations: &Tensor,
        n: usize,
        channel: usize,
        sx: usize,
        sy: usize,
        stride: usize,
    ) -> Self {
        let dims = activations.shape().dims();
        let (x_dim, y_dim) = (dims[2], dims[3]);

        let mut queue = ActQueue {
            value: Vec::with_capacity(x_dim * y_dim),
            x: Vec::with_capacity(x_dim * y_dim),
            y: Vec::with_capacity(x_dim * y_dim),
        };
        for x in 0..x_dim {
            if x % stride != sx {
                continue;
            }
            for y in 0..y_dim {
                if y % stride != sy {
                    continue;
                }
                let value = activations.get4(n, channel, x, y);
                if value != 0.0 {
                    queue.value.push(value);
                    queue.x.push(x);
                    queue.y.push(y);
                }
            }
        }
        queue
    }

    /// Number of non-zero activations in the queue.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// `true` if no activation survived the sparsity/phase filter.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Runs one PE: the Cartesian product of `acts` and `wgts`, tile-blocked
/// `pe_width x pe_height`, scattered into `out`.
pub(crate) fn scatter_accumulate(
    n: usize,
    geom: &Geometry,
    acts: &ActQueue,
    wgts: &WeightQueue,
    pe_width: usize,
    pe_height: usize,
    out: &AccumGrid,
) {
    let stride = geom.stride;

    let mut i = 0;
    while i < acts.len() {
        let i_end = (i + pe_width).min(acts.len());
        let mut f = 0;
        while f < wgts.len() {
            let f_end = (f + pe_height).min(wgts.len());

            for ii in i..i_end {
                let act = acts.value[ii];
                let x = acts.x[ii];
                let y = acts.y[ii];

                for ff in f..f_end {
                    let r = wgts.r[ff];
                    let s = wgts.s[ff];
                    // Output coordinate law: pairs whose window origin
                    // falls outside [0, W) x [0, H) are dropped.
                    if x < r || y < s {
                        continue;
                    }
                    let w = (x - r) / stride;
                    let h = (y - s) / stride;
                    if w < geom.out_x && h < geom.out_y {
                        let pos = geom.output_index(n, wgts.k[ff], w, h);
                        out.add(pos, act * wgts.value[ff]);
                    }
                }
            }

            f = f_end;
        }
        i = i_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::{LayerDef, LayerKind};
    use tensor_core::Shape;

    fn geom(
        act: [usize; 4],
        wgt: [usize; 4],
        stride: usize,
    ) -> Geometry {
        let layer = LayerDef::new("test", "conv", LayerKind::Convolution, false, stride, 0);
        Geometry::derive(
            &layer,
            &Shape::new(act.to_vec()),
            &Shape::new(wgt.to_vec()),
        )
        .unwrap()
    }

    fn act_tensor(dims: [usize; 4], data: Vec<f32>) -> Tensor {
        Tensor::from_vec(Shape::new(dims.to_vec()), data).unwrap()
    }

    #[test]
    fn test_gather_skips_zeros() {
        let acts = act_tensor(
            [1, 1, 3, 3],
            vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0],
        );
        let q = ActQueue::gather(&acts, 0, 0, 0, 0, 1);
        assert_eq!(q.len(), 3);
        assert_eq!(q.value, vec![1.0, 2.0, 3.0]);
        assert_eq!(q.x, vec![0, 1, 2]);
        assert_eq!(q.y, vec![0, 1, 2]);
    }

    #[test]
    fn test_gather_respects_stride_phase() {
        let acts = act_tensor([1, 1, 2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        let q00 = ActQueue::gather(&acts, 0, 0, 0, 0, 2);
        assert_eq!(q00.value, vec![1.0]);
        let q01 = ActQueue::gather(&acts, 0, 0, 0, 1, 2);
        assert_eq!(q01.value, vec![2.0]);
        let q11 = ActQueue::gather(&acts, 0, 0, 1, 1, 2);
        assert_eq!(q11.value, vec![4.0]);
    }

    #[test]
    fn test_scatter_drops_out_of_range_pairs() {
        // 3x3 input, 2x2 kernel, stride 1 → W = H = 2. An activation at
        // (2, 2) paired with r = s = 0 targets (2, 2), which is out of
        // range and must be dropped.
        let g = geom([1, 1, 3, 3], [1, 1, 2, 2], 1);
        let acts = ActQueue {
            value: vec![5.0],
            x: vec![2],
            y: vec![2],
        };
        let wgts = WeightQueue {
            value: vec![1.0, 1.0],
            k: vec![0, 0],
            r: vec![0, 1],
            s: vec![0, 1],
        };
        let grid = AccumGrid::seeded(&g, &[0.0]);
        scatter_accumulate(0, &g, &acts, &wgts, 4, 4, &grid);
        let out = grid.into_tensor(&g);
        // Only the (r, s) = (1, 1) pair lands, at (1, 1).
        assert_eq!(out.get4(0, 0, 1, 1), 5.0);
        assert_eq!(
            out.as_slice().iter().filter(|&&v| v != 0.0).count(),
            1
        );
    }

    #[test]
    fn test_scatter_blocking_preserves_pair_set() {
        // Same queues under different PE tilings must produce identical
        // pair sets (and, for these integral values, identical sums).
        let g = geom([1, 1, 4, 4], [2, 1, 2, 2], 1);
        let acts = ActQueue {
            value: vec![1.0, 2.0, 3.0, 4.0, 5.0],
            x: vec![0, 1, 2, 3, 2],
            y: vec![0, 1, 2, 3, 1],
        };
        let wgts = WeightQueue {
            value: vec![1.0, -1.0, 2.0, 0.5, 1.5],
            k: vec![0, 1, 0, 1, 0],
            r: vec![0, 0, 1, 1, 0],
            s: vec![0, 1, 0, 1, 1],
        };

        let mut outputs = Vec::new();
        for (bw, bh) in [(1, 1), (4, 4), (2, 3), (16, 16)] {
            let grid = AccumGrid::seeded(&g, &[0.0, 0.0]);
            scatter_accumulate(0, &g, &acts, &wgts, bw, bh, &grid);
            outputs.push(grid.into_tensor(&g));
        }
        for other in &outputs[1..] {
            assert_eq!(outputs[0].as_slice(), other.as_slice());
        }
    }

    #[test]
    fn test_stride_division() {
        // Stride 2: activation at (2, 2) with kernel origin (0, 0) lands
        // at output (1, 1).
        let g = geom([1, 1, 4, 4], [1, 1, 2, 2], 2);
        let acts = ActQueue {
            value: vec![1.0],
            x: vec![2],
            y: vec![2],
        };
        let wgts = WeightQueue {
            value: vec![1.0],
            k: vec![0],
            r: vec![0],
            s: vec![0],
        };
        let grid = AccumGrid::seeded(&g, &[0.0]);
        scatter_accumulate(0, &g, &acts, &wgts, 4, 4, &grid);
        let out = grid.into_tensor(&g);
        assert_eq!(out.get4(0, 0, 1, 1), 1.0);
    }
}
