// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Numeric container used for inputs, potentials and spikes

use ndarray::{Array1, ArrayD, IxDyn};

/// Dynamically shaped `f32` array, one scalar per neuron-and-batch element
pub type Tensor = ArrayD<f32>;

/// Zero tensor of the given shape
pub fn zeros(shape: &[usize]) -> Tensor {
    Tensor::zeros(IxDyn(shape))
}

/// Zero tensor with the same shape as `like`
pub fn zeros_like(like: &Tensor) -> Tensor {
    Tensor::zeros(like.raw_dim())
}

/// One-dimensional tensor from a slice (a single batch row)
pub fn from_slice(values: &[f32]) -> Tensor {
    Array1::from(values.to_vec()).into_dyn()
}

/// Scalar tensor of shape `[1]`
pub fn scalar(value: f32) -> Tensor {
    from_slice(&[value])
}
