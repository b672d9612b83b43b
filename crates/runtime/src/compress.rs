// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Offline weight compression.
//!
//! Weights are partitioned by input channel and stride phase before the
//! timed section. Each partition holds only the non-zero entries of its
//! `(channel, sx, sy)` slice as four parallel arrays `(value, k, r, s)` —
//! the compressed-queue format the PEs consume directly.
//!
//! Partition membership: weight `w[k, ck, r, s]` of the group starting at
//! `ct` lands in partition `(ct + ck, sx, sy)` iff `w != 0`,
//! `(r + padding) % stride == sx`, and `(s + padding) % stride == sy`.
//! Emission follows the `(r, s, k)` iteration order, which fixes the
//! accumulation order the PE sees.

use crate::Geometry;
use tensor_core::Tensor;

/// Non-zero weights of one `(channel, sx, sy)` partition, as parallel
/// arrays.
#[derive(Debug, Clone, Default)]
pub struct WeightQueue {
    /// Weight values.
    pub value: Vec<f32>,
    /// Output-filter index per entry.
    pub k: Vec<usize>,
    /// Kernel row per entry.
    pub r: Vec<usize>,
    /// Kernel column per entry.
    pub s: Vec<usize>,
}

impl WeightQueue {
    fn push(&mut self, value: f32, k: usize, r: usize, s: usize) {
        self.value.push(value);
        self.k.push(k);
        self.r.push(r);
        self.s.push(s);
    }

    /// Number of non-zero entries in this partition.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// `true` if the partition holds no non-zero weight.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// All weight partitions of a layer, indexed by channel and stride phase.
#[derive(Debug)]
pub struct CompressedWeights {
    queues: Vec<WeightQueue>,
    stride: usize,
}

impl CompressedWeights {
    /// Compresses a pre-processed weight tensor `[K, C_k, R, S]`.
    ///
    /// Runs once per layer, outside the timed section. The filter window
    /// `[k_begin, k_begin + K_c)` advances by `K_c` once per channel
    /// group.
    pub fn build(weights: &Tensor, geom: &Geometry) -> Self {
        let stride = geom.stride;
        let phases = stride * stride;
        let mut queues = vec![WeightQueue::default(); geom.channels * phases];

        let mut k_begin = 0;
        for ct in (0..geom.channels).step_by(geom.wgt_channels) {
            for ck in 0..geom.wgt_channels {
                for sx in 0..stride {
                    for sy in 0..stride {
                        let queue = &mut queues[(ct + ck) * phases + sx * stride + sy];
                        for r in 0..geom.kernel_x {
                            if (r + geom.padding) % stride != sx {
                                continue;
                            }
                            for s in 0..geom.kernel_y {
                                if (s + geom.padding) % stride != sy {
                                    continue;
                                }
                                for k in k_begin..k_begin + geom.filters_per_group {
                                    let w = weights.get4(k, ck, r, s);
                                    if w != 0.0 {
                                        queue.push(w, k, r, s);
                                    }
                                }
                            }
                        }
                    }
                }
            }
            k_begin += geom.filters_per_group;
        }

        Self { queues, stride }
    }

    /// Returns the partition for `(channel, sx, sy)`.
    #[inline]
    pub fn partition(&self, channel: usize, sx: usize, sy: usize) -> &WeightQueue {
        &self.queues[channel * self.stride * self.stride + sx * self.stride + sy]
    }

    /// Total number of partitions (`C * stride^2`).
    pub fn num_partitions(&self) -> usize {
        self.queues.len()
    }

    /// Total non-zero weights across all partitions.
    pub fn nonzeros(&self) -> usize {
        self.queues.iter().map(WeightQueue::len).sum()
    }
}
