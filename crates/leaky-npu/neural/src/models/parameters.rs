// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Leaky layer parameters

use crate::dynamics::ResetMechanism;
use crate::graded::DEFAULT_MAX_ESCALATIONS;
use crate::surrogate::SurrogateKind;
use crate::types::error::{NeuralError, Result};

/// Construction-time configuration of a [`Leaky`](super::Leaky) layer
///
/// Fixed for the lifetime of the layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LeakyParameters {
    /// Decay of the previous potential, clamped to [0, 1] at use
    pub beta: f32,
    /// Spike and reset threshold, strictly positive
    pub threshold: f32,
    pub reset_mechanism: ResetMechanism,
    /// `true`: reset folded into the next update; `false`: corrected right away
    pub reset_delay: bool,
    /// Winner-take-all across each batch row
    pub inhibition: bool,
    /// Spike magnitude
    pub graded_spikes_factor: f32,
    /// Always return `(spike, mem)`
    pub output: bool,
    /// Thread the potential internally instead of through the caller
    pub init_hidden: bool,
    pub learn_beta: bool,
    pub learn_threshold: bool,
    pub learn_graded_spikes_factor: bool,
    pub surrogate: SurrogateKind,
    /// Plain Heaviside with zero derivative
    pub surrogate_disable: bool,
    /// Cap on graded-spike escalation rounds per element and step
    pub max_escalations: usize,
}

impl LeakyParameters {
    /// Defaults with the given decay rate
    pub fn new(beta: f32) -> Self {
        Self {
            beta,
            ..Self::default()
        }
    }

    /// Check every parameter, then the combination
    pub fn validate(&self) -> Result<()> {
        if !self.beta.is_finite() {
            return Err(NeuralError::invalid("beta", format!("must be finite, got {}", self.beta)));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(NeuralError::invalid(
                "threshold",
                format!("must be finite and > 0, got {}", self.threshold),
            ));
        }
        if !self.graded_spikes_factor.is_finite() || self.graded_spikes_factor == 0.0 {
            return Err(NeuralError::invalid(
                "graded_spikes_factor",
                format!("must be finite and non-zero, got {}", self.graded_spikes_factor),
            ));
        }
        if self.max_escalations == 0 {
            return Err(NeuralError::invalid("max_escalations", "must be at least 1"));
        }
        if !self.reset_delay && self.init_hidden {
            return Err(NeuralError::UnsupportedConfiguration(
                "`reset_delay = false` is only supported with `init_hidden = false`".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LeakyParameters {
    fn default() -> Self {
        Self {
            beta: 0.9,
            threshold: 1.0,
            reset_mechanism: ResetMechanism::Subtract,
            reset_delay: true,
            inhibition: false,
            graded_spikes_factor: 1.0,
            output: false,
            init_hidden: false,
            learn_beta: false,
            learn_threshold: false,
            learn_graded_spikes_factor: false,
            surrogate: SurrogateKind::default(),
            surrogate_disable: false,
            max_escalations: DEFAULT_MAX_ESCALATIONS,
        }
    }
}

/// A scalar the outer training loop may or may not update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedParameter {
    pub name: &'static str,
    pub value: f32,
    pub learnable: bool,
}
