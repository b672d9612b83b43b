// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type: an owned, contiguous `f32` buffer with a shape.

use crate::{Shape, TensorError};

/// An owned, n-dimensional `f32` tensor stored in contiguous memory.
///
/// `Tensor` is the primary data carrier in the reference model: weights,
/// biases, activations, and outputs are all tensors. Data is stored in
/// row-major (C) order; the linear index of `(i, j, k, l)` in a rank-4
/// tensor is `i*D1*D2*D3 + j*D2*D3 + k*D3 + l`.
///
/// Every tensor is exclusively owned by its layer; transforms replace the
/// buffer in place under single ownership and never alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::zeros(Shape::new(vec![2, 3]));
    /// assert_eq!(t.num_elements(), 6);
    /// ```
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.num_elements();
        Self {
            shape,
            data: vec![0.0; n],
        }
    }

    /// Creates a tensor from an owned buffer.
    ///
    /// Returns an error if the buffer length does not match
    /// `shape.num_elements()`.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Returns the flat buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the flat buffer mutably.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Indexed access into a rank-4 tensor.
    ///
    /// # Panics
    /// Panics in debug builds if the tensor is not rank 4 or the indices
    /// are out of bounds.
    #[inline]
    pub fn get4(&self, i: usize, j: usize, k: usize, l: usize) -> f32 {
        debug_assert_eq!(self.shape.rank(), 4, "get4 on rank-{} tensor", self.shape.rank());
        let d = self.shape.dims();
        let index = d[1] * d[2] * d[3] * i + d[2] * d[3] * j + d[3] * k + l;
        self.data[index]
    }

    /// Fills the tensor with a constant value.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Fraction of non-zero elements, used for trace inspection.
    pub fn density(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let nonzero = self.data.iter().filter(|&&v| v != 0.0).count();
        nonzero as f64 / self.data.len() as f64
    }

    /// Replaces this tensor's buffer and shape. Used by the in-place
    /// transforms; the old buffer is dropped.
    pub(crate) fn replace(&mut self, shape: Shape, data: Vec<f32>) {
        debug_assert_eq!(shape.num_elements(), data.len());
        self.shape = shape;
        self.data = data;
    }

    /// Replaces only the shape; the buffer must already match.
    pub(crate) fn reshape_unchecked(&mut self, shape: Shape) {
        debug_assert_eq!(shape.num_elements(), self.data.len());
        self.shape = shape;
    }

    /// Moves the buffer out for transforms that shrink it in place.
    /// The caller must restore a consistent shape via [`Tensor::replace`].
    pub(crate) fn take_data(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(Shape::new(vec![2, 3]));
        assert_eq!(t.num_elements(), 6);
        assert_eq!(t.size_bytes(), 24);
        assert!(t.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_vec() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let t = Tensor::from_vec(Shape::new(vec![2, 3]), data.clone()).unwrap();
        assert_eq!(t.as_slice(), &data[..]);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = Tensor::from_vec(Shape::new(vec![2, 3]), vec![0.0; 5]);
        assert!(matches!(
            result,
            Err(TensorError::BufferSizeMismatch { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_get4_row_major() {
        let t = Tensor::from_vec(
            Shape::new(vec![1, 2, 2, 2]),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        )
        .unwrap();
        assert_eq!(t.get4(0, 0, 0, 0), 0.0);
        assert_eq!(t.get4(0, 0, 1, 1), 3.0);
        assert_eq!(t.get4(0, 1, 0, 1), 5.0);
        assert_eq!(t.get4(0, 1, 1, 0), 6.0);
    }

    #[test]
    fn test_fill() {
        let mut t = Tensor::zeros(Shape::vector(5));
        t.fill(2.5);
        assert!(t.as_slice().iter().all(|&x| x == 2.5));
    }

    #[test]
    fn test_density() {
        let t = Tensor::from_vec(Shape::vector(4), vec![0.0, 1.0, 0.0, 3.0]).unwrap();
        assert!((t.density() - 0.5).abs() < 1e-12);
    }
}
