// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Spike emission and winner-take-all inhibition
//!
//! Pure functions over whole tensors. The graded spike factor is applied by the
//! layer, not here, so reset indicators stay in {0, 1}.

use std::sync::Arc;

use ndarray::Zip;

use crate::surrogate::SurrogateGradient;
use crate::types::tensor::{zeros_like, Tensor};

/// Spikes of one timestep together with their surrogate derivative
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// 0/1 spike per element
    pub spike: Tensor,
    /// ∂spike/∂mem under the active surrogate
    pub surrogate_grad: Tensor,
}

/// Threshold test with an injected surrogate derivative
#[derive(Debug, Clone)]
pub struct SpikeFunction {
    surrogate: Arc<dyn SurrogateGradient>,
}

impl SpikeFunction {
    pub fn new(surrogate: Arc<dyn SurrogateGradient>) -> Self {
        Self { surrogate }
    }

    /// Name of the active surrogate family
    pub fn surrogate_name(&self) -> &'static str {
        self.surrogate.name()
    }

    /// Forward-only spike decision, used as the reset indicator
    pub fn reset_indicator(&self, mem: &Tensor, threshold: f32) -> Tensor {
        mem.mapv(|m| self.surrogate.forward(m - threshold))
    }

    /// Fire every element independently
    pub fn fire(&self, mem: &Tensor, threshold: f32) -> Emission {
        let mut spike = zeros_like(mem);
        let mut surrogate_grad = zeros_like(mem);
        Zip::from(&mut spike)
            .and(&mut surrogate_grad)
            .and(mem)
            .for_each(|s, g, &m| {
                let shifted = m - threshold;
                *s = self.surrogate.forward(shifted);
                *g = self.surrogate.derivative(shifted);
            });
        Emission {
            spike,
            surrogate_grad,
        }
    }

    /// Fire only the winner of each batch row
    pub fn fire_inhibited(&self, mem: &Tensor, threshold: f32) -> Emission {
        let shifted = mem.mapv(|m| m - threshold);
        let mask = winner_take_all_mask(&shifted);
        let mut emission = self.fire(mem, threshold);
        emission.spike *= &mask;
        emission.surrogate_grad *= &mask;
        emission
    }
}

/// Mask with a single 1 per batch row at the row's maximum
///
/// Rows run along axis 0 with any trailing axes flattened. Tensors with fewer
/// than two axes form a single row. Ties go to the lowest index.
pub fn winner_take_all_mask(values: &Tensor) -> Tensor {
    let mut mask = zeros_like(values);
    if values.is_empty() {
        return mask;
    }

    let rows = if values.ndim() < 2 {
        1
    } else {
        values.shape()[0]
    };
    let row_len = values.len() / rows;

    // iter() walks logical (row-major) order regardless of memory layout
    let flat: Vec<f32> = values.iter().copied().collect();
    let mut winners = Vec::with_capacity(rows);
    for (row, chunk) in flat.chunks(row_len).enumerate() {
        let mut best = 0;
        for (idx, &v) in chunk.iter().enumerate() {
            if v > chunk[best] {
                best = idx;
            }
        }
        winners.push(row * row_len + best);
    }

    let mut next = winners.iter().peekable();
    for (idx, m) in mask.iter_mut().enumerate() {
        if next.peek() == Some(&&idx) {
            *m = 1.0;
            next.next();
        }
    }
    mask
}
