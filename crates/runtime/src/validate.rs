// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Output validation against golden references.
//!
//! Computed outputs are compared element-wise over the flat buffer with
//! an absolute-error tolerance. The flat comparison also covers the
//! fully-connected case, where the captured reference is rank 2 while the
//! computed output is `[N, K, 1, 1]` — the row-major orders coincide.

use crate::RuntimeError;
use tensor_core::Tensor;

/// The outcome of validating one layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    /// Elements compared.
    pub checked: usize,
    /// Elements whose absolute error exceeded the tolerance.
    pub violations: usize,
    /// Largest absolute error observed.
    pub max_abs_error: f32,
}

impl ValidationReport {
    /// `true` if no element exceeded the tolerance.
    pub fn passed(&self) -> bool {
        self.violations == 0
    }
}

/// Compares `computed` to `reference` with absolute tolerance.
///
/// Element counts must match; shapes may differ in rank (see module
/// docs). The caller decides whether violations are fatal.
pub fn check_values(
    computed: &Tensor,
    reference: &Tensor,
    tolerance: f32,
) -> Result<ValidationReport, RuntimeError> {
    if computed.num_elements() != reference.num_elements() {
        return Err(RuntimeError::ShapeInvariant(format!(
            "cannot validate {} computed elements against {} reference elements",
            computed.num_elements(),
            reference.num_elements(),
        )));
    }

    let mut violations = 0;
    let mut max_abs_error = 0.0f32;
    for (&got, &want) in computed.as_slice().iter().zip(reference.as_slice()) {
        let err = (got - want).abs();
        if err > max_abs_error {
            max_abs_error = err;
        }
        if err > tolerance {
            violations += 1;
        }
    }

    Ok(ValidationReport {
        checked: computed.num_elements(),
        violations,
        max_abs_error,
    })
}
