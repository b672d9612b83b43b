// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-place layout transforms for the layer pre-pass.
//!
//! All transforms allocate a fresh buffer, populate it, and swap it into
//! the tensor under single ownership. They mutate shapes as the SCNN tile
//! geometry requires:
//!
//! - [`Tensor::zero_pad`] grows the spatial dims by the layer padding.
//! - [`Tensor::grid_zero_pad`] forces an exact tile-aligned spatial size.
//! - [`Tensor::split_channels`] re-lays a flattened channel axis onto a
//!   synthetic spatial grid (the fully-connected pre-pass).
//! - [`Tensor::collapse_spatial`] folds spatial dims into the channel axis.
//! - [`Tensor::truncate_images`] restricts the batch axis.

use crate::{Shape, Tensor, TensorError};

impl Tensor {
    /// Grows both spatial dims by `2 * padding`, copying the original
    /// contents centered and zero-filling the border.
    ///
    /// `[N, C, X, Y] → [N, C, X + 2p, Y + 2p]`; the input cell `(n, c, x, y)`
    /// lands at `(n, c, x + p, y + p)`.
    pub fn zero_pad(&mut self, padding: usize) -> Result<(), TensorError> {
        let [n_images, channels, nx, ny] = self.require_rank4("zero_pad")?;
        if padding == 0 {
            return Ok(());
        }
        let new_nx = nx + 2 * padding;
        let new_ny = ny + 2 * padding;

        let mut out = vec![0.0f32; n_images * channels * new_nx * new_ny];
        for n in 0..n_images {
            for c in 0..channels {
                for i in 0..nx {
                    for j in 0..ny {
                        let index_out = channels * new_nx * new_ny * n
                            + new_nx * new_ny * c
                            + new_ny * (padding + i)
                            + (padding + j);
                        let index_in =
                            channels * nx * ny * n + nx * ny * c + ny * i + j;
                        out[index_out] = self.as_slice()[index_in];
                    }
                }
            }
        }

        self.replace(Shape::new(vec![n_images, channels, new_nx, new_ny]), out);
        Ok(())
    }

    /// Reshapes the spatial dims to exactly `(x, y)`, keeping original
    /// values at their `(i, j)` coordinates and zero-filling any expansion.
    ///
    /// Used to force a tile-aligned spatial size after [`Tensor::zero_pad`].
    pub fn grid_zero_pad(&mut self, x: usize, y: usize) -> Result<(), TensorError> {
        let [n_images, channels, nx, ny] = self.require_rank4("grid_zero_pad")?;
        if x < nx || y < ny {
            return Err(TensorError::ShapeInvariant {
                op: "grid_zero_pad",
                detail: format!("target ({x}, {y}) smaller than current ({nx}, {ny})"),
            });
        }
        if x == nx && y == ny {
            return Ok(());
        }

        let mut out = vec![0.0f32; n_images * channels * x * y];
        for n in 0..n_images {
            for c in 0..channels {
                for i in 0..nx {
                    for j in 0..ny {
                        let index_out = channels * x * y * n + x * y * c + y * i + j;
                        let index_in =
                            channels * nx * ny * n + nx * ny * c + ny * i + j;
                        out[index_out] = self.as_slice()[index_in];
                    }
                }
            }
        }

        self.replace(Shape::new(vec![n_images, channels, x, y]), out);
        Ok(())
    }

    /// Redistributes the channel axis over a synthetic `[k, x, y]` grid.
    ///
    /// Channel `c` maps to `(c / (x*y), (c % (x*y)) / y, (c % (x*y)) % y)`.
    /// The same operation serves both the activation and the weight side of
    /// the fully-connected pre-pass; axis 0 is the batch for activations
    /// and the filter index for weights.
    ///
    /// Requires `C * Nx * Ny == k * x * y`. Intended for tensors whose
    /// spatial dims are already degenerate (`Nx == Ny == 1`).
    pub fn split_channels(&mut self, k: usize, x: usize, y: usize) -> Result<(), TensorError> {
        let [dim0, channels, nx, ny] = self.require_rank4("split_channels")?;
        if channels * nx * ny != k * x * y {
            return Err(TensorError::ShapeInvariant {
                op: "split_channels",
                detail: format!(
                    "cannot redistribute {channels}x{nx}x{ny} over {k}x{x}x{y}"
                ),
            });
        }

        let mut out = vec![0.0f32; dim0 * k * x * y];
        for n in 0..dim0 {
            for c in 0..channels {
                let new_k = c / (x * y);
                let rem = c % (x * y);
                let new_i = rem / y;
                let new_j = rem % y;
                for i in 0..nx {
                    for j in 0..ny {
                        let index_out = k * x * y * n + x * y * new_k + y * new_i + new_j;
                        let index_in =
                            channels * nx * ny * n + nx * ny * c + ny * i + j;
                        out[index_out] = self.as_slice()[index_in];
                    }
                }
            }
        }

        self.replace(Shape::new(vec![dim0, k, x, y]), out);
        Ok(())
    }

    /// Folds spatial dims into the channel axis:
    /// `[N, C, X, Y] → [N, C*X*Y, 1, 1]`.
    ///
    /// Row-major layout makes this a metadata-only change.
    pub fn collapse_spatial(&mut self) -> Result<(), TensorError> {
        let [n_images, channels, nx, ny] = self.require_rank4("collapse_spatial")?;
        self.reshape_unchecked(Shape::new(vec![n_images, channels * nx * ny, 1, 1]));
        Ok(())
    }

    /// Keeps only the first `n` entries of axis 0.
    ///
    /// Supports the single-image operating mode, where only image 0 of a
    /// captured batch is processed.
    pub fn truncate_images(&mut self, n: usize) -> Result<(), TensorError> {
        let dims = self.shape().dims().to_vec();
        if dims.is_empty() {
            return Err(TensorError::RankMismatch {
                op: "truncate_images",
                expected: 1,
                actual: 0,
            });
        }
        if n == 0 || n > dims[0] {
            return Err(TensorError::ShapeInvariant {
                op: "truncate_images",
                detail: format!("cannot keep {n} of {} images", dims[0]),
            });
        }
        if n == dims[0] {
            return Ok(());
        }
        let per_image: usize = dims[1..].iter().product::<usize>().max(1);
        let mut data = self.take_data();
        data.truncate(n * per_image);
        let mut new_dims = dims;
        new_dims[0] = n;
        self.replace(Shape::new(new_dims), data);
        Ok(())
    }

    fn require_rank4(&self, op: &'static str) -> Result<[usize; 4], TensorError> {
        let d = self.shape().dims();
        if d.len() != 4 {
            return Err(TensorError::RankMismatch {
                op,
                expected: 4,
                actual: d.len(),
            });
        }
        Ok([d[0], d[1], d[2], d[3]])
    }
}
