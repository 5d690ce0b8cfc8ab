// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Post-update state quantization
//!
//! Hardware targets often store the membrane potential at reduced precision.
//! A quantizer runs on the freshly updated potential before the spike test.

use crate::types::error::{NeuralError, Result};
use crate::types::tensor::Tensor;

/// Maps a membrane potential to its quantized representation
pub trait StateQuantizer: Send + Sync {
    fn quantize(&self, mem: &Tensor) -> Tensor;
}

impl<F> StateQuantizer for F
where
    F: Fn(&Tensor) -> Tensor + Send + Sync,
{
    fn quantize(&self, mem: &Tensor) -> Tensor {
        self(mem)
    }
}

/// Evenly spaced levels over `[lower, upper]`, values clamped into range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformQuantizer {
    num_levels: u32,
    lower: f32,
    upper: f32,
}

impl UniformQuantizer {
    pub fn new(num_levels: u32, lower: f32, upper: f32) -> Result<Self> {
        if num_levels < 2 {
            return Err(NeuralError::invalid(
                "state_quant.num_levels",
                format!("need at least 2 levels, got {}", num_levels),
            ));
        }
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(NeuralError::invalid(
                "state_quant.range",
                format!("expected finite lower < upper, got [{}, {}]", lower, upper),
            ));
        }
        Ok(Self {
            num_levels,
            lower,
            upper,
        })
    }

    pub fn num_levels(&self) -> u32 {
        self.num_levels
    }

    fn step(&self) -> f32 {
        (self.upper - self.lower) / (self.num_levels - 1) as f32
    }
}

impl StateQuantizer for UniformQuantizer {
    fn quantize(&self, mem: &Tensor) -> Tensor {
        let step = self.step();
        mem.mapv(|v| {
            let clamped = v.clamp(self.lower, self.upper);
            ((clamped - self.lower) / step).round() * step + self.lower
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tensor::from_slice;

    #[test]
    fn test_uniform_levels() {
        // levels at -1, -0.5, 0, 0.5, 1
        let q = UniformQuantizer::new(5, -1.0, 1.0).unwrap();
        let out = q.quantize(&from_slice(&[0.3, -0.7, 4.0, 0.0]));
        assert_eq!(out, from_slice(&[0.5, -0.5, 1.0, 0.0]));
    }

    #[test]
    fn test_invalid_quantizers_rejected() {
        assert!(UniformQuantizer::new(1, 0.0, 1.0).is_err());
        assert!(UniformQuantizer::new(4, 1.0, 1.0).is_err());
        assert!(UniformQuantizer::new(4, f32::NAN, 1.0).is_err());
    }

    #[test]
    fn test_closure_is_a_quantizer() {
        let floor = |m: &Tensor| m.mapv(f32::floor);
        assert_eq!(floor.quantize(&from_slice(&[1.7])), from_slice(&[1.0]));
    }
}
