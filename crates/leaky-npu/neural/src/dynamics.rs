// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Membrane update rules and reset scheduling
//!
//! Pure functions over whole tensors.
//!
//! ```text
//! subtract:  U[t+1] = β·U[t] + X[t+1] - R·θ
//! zero:      U[t+1] = β·(1 - R)·U[t] + X[t+1]
//! none:      U[t+1] = β·U[t] + X[t+1]
//! ```
//!
//! `R` is the reset indicator, i.e. the spike decision taken on `U[t]`, and
//! `β` is clamped to [0, 1] at every use.

use core::fmt;
use core::str::FromStr;

use ndarray::Zip;

use crate::types::error::NeuralError;
use crate::types::tensor::Tensor;

/// Clamp a (possibly learned) decay rate into [0, 1]
#[inline(always)]
pub fn clamp_beta(beta: f32) -> f32 {
    beta.clamp(0.0, 1.0)
}

/// How the potential is reduced after a spike
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ResetMechanism {
    /// Subtract the threshold
    #[default]
    Subtract,
    /// Clear the potential to zero
    Zero,
    /// Pure leaky integration, spikes never reduce the potential
    None,
}

impl ResetMechanism {
    /// Numeric code: subtract = 0, zero = 1, none = 2
    pub fn code(self) -> u8 {
        match self {
            ResetMechanism::Subtract => 0,
            ResetMechanism::Zero => 1,
            ResetMechanism::None => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResetMechanism::Subtract => "subtract",
            ResetMechanism::Zero => "zero",
            ResetMechanism::None => "none",
        }
    }

    /// Next raw potential from the previous one, the input and the reset indicator
    ///
    /// All tensors share one shape.
    pub fn integrate(
        self,
        mem: &Tensor,
        input: &Tensor,
        beta: f32,
        threshold: f32,
        reset: &Tensor,
    ) -> Tensor {
        let beta = clamp_beta(beta);
        let mut next = Tensor::zeros(mem.raw_dim());
        let zip = Zip::from(&mut next).and(mem).and(input).and(reset);
        match self {
            ResetMechanism::Subtract => {
                zip.for_each(|n, &m, &x, &r| *n = beta * m + x - r * threshold)
            }
            ResetMechanism::Zero => zip.for_each(|n, &m, &x, &r| *n = beta * ((1.0 - r) * m) + x),
            ResetMechanism::None => zip.for_each(|n, &m, &x, _| *n = beta * m + x),
        }
        next
    }

    /// Post-hoc reset used when the reset is deferred
    ///
    /// `spike` is already scaled by `graded_spikes_factor`; the previous reset
    /// indicator is taken back out so a spike is never reset twice.
    pub fn apply_deferred_reset(
        self,
        mem: &mut Tensor,
        spike: &Tensor,
        reset: &Tensor,
        graded_spikes_factor: f32,
        threshold: f32,
    ) {
        let zip = Zip::from(mem).and(spike).and(reset);
        match self {
            ResetMechanism::Subtract => zip.for_each(|m, &s, &r| {
                *m -= (s / graded_spikes_factor - r) * threshold;
            }),
            ResetMechanism::Zero => zip.for_each(|m, &s, &r| {
                *m -= (s / graded_spikes_factor - r) * *m;
            }),
            ResetMechanism::None => {}
        }
    }
}

impl fmt::Display for ResetMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResetMechanism {
    type Err = NeuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtract" => Ok(ResetMechanism::Subtract),
            "zero" => Ok(ResetMechanism::Zero),
            "none" => Ok(ResetMechanism::None),
            other => Err(NeuralError::invalid(
                "reset_mechanism",
                format!("expected one of subtract, zero, none; got `{}`", other),
            )),
        }
    }
}

/// When the reset lands relative to the spike that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTiming {
    /// Reset folded into the next state update (`reset_delay = true`)
    Immediate,
    /// Reset corrected right after the spike (`reset_delay = false`)
    Deferred,
}

impl ResetTiming {
    pub fn from_reset_delay(reset_delay: bool) -> Self {
        if reset_delay {
            ResetTiming::Immediate
        } else {
            ResetTiming::Deferred
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tensor::from_slice;

    #[test]
    fn test_subtract_rule() {
        let next = ResetMechanism::Subtract.integrate(
            &from_slice(&[1.2, 0.5]),
            &from_slice(&[0.7, 0.7]),
            0.9,
            1.0,
            &from_slice(&[1.0, 0.0]),
        );
        assert!((next[[0]] - (0.9 * 1.2 + 0.7 - 1.0)).abs() < 1e-6);
        assert!((next[[1]] - (0.9 * 0.5 + 0.7)).abs() < 1e-6);
    }

    #[test]
    fn test_zero_rule_clears_before_integration() {
        let next = ResetMechanism::Zero.integrate(
            &from_slice(&[1.2, 0.5]),
            &from_slice(&[0.7, 0.7]),
            0.9,
            1.0,
            &from_slice(&[1.0, 0.0]),
        );
        assert!((next[[0]] - 0.7).abs() < 1e-6);
        assert!((next[[1]] - (0.9 * 0.5 + 0.7)).abs() < 1e-6);
    }

    #[test]
    fn test_none_rule_ignores_reset() {
        let next = ResetMechanism::None.integrate(
            &from_slice(&[1.2]),
            &from_slice(&[0.7]),
            0.9,
            1.0,
            &from_slice(&[1.0]),
        );
        assert!((next[[0]] - (0.9 * 1.2 + 0.7)).abs() < 1e-6);
    }

    #[test]
    fn test_beta_is_clamped_not_rejected() {
        let mem = from_slice(&[1.0]);
        let input = from_slice(&[0.0]);
        let reset = from_slice(&[0.0]);
        let high = ResetMechanism::None.integrate(&mem, &input, 1.7, 1.0, &reset);
        let low = ResetMechanism::None.integrate(&mem, &input, -0.3, 1.0, &reset);
        assert_eq!(high[[0]], 1.0);
        assert_eq!(low[[0]], 0.0);
    }

    #[test]
    fn test_deferred_reset_subtract_and_zero() {
        let spike = from_slice(&[2.0, 0.0]);
        let reset = from_slice(&[0.0, 0.0]);

        let mut mem = from_slice(&[1.4, 0.6]);
        ResetMechanism::Subtract.apply_deferred_reset(&mut mem, &spike, &reset, 2.0, 1.0);
        assert!((mem[[0]] - 0.4).abs() < 1e-6);
        assert!((mem[[1]] - 0.6).abs() < 1e-6);

        let mut mem = from_slice(&[1.4, 0.6]);
        ResetMechanism::Zero.apply_deferred_reset(&mut mem, &spike, &reset, 2.0, 1.0);
        assert_eq!(mem[[0]], 0.0);
        assert!((mem[[1]] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_codes_and_parsing() {
        assert_eq!(ResetMechanism::Subtract.code(), 0);
        assert_eq!(ResetMechanism::Zero.code(), 1);
        assert_eq!(ResetMechanism::None.code(), 2);
        assert_eq!("Zero".parse::<ResetMechanism>().unwrap(), ResetMechanism::Zero);
        assert!("hard".parse::<ResetMechanism>().is_err());
    }

    #[test]
    fn test_timing_from_flag() {
        assert_eq!(ResetTiming::from_reset_delay(true), ResetTiming::Immediate);
        assert_eq!(ResetTiming::from_reset_delay(false), ResetTiming::Deferred);
    }
}
