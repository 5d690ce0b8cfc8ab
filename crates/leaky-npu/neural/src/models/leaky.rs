// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Leaky (first-order LIF) layer
//!
//! ## Model Dynamics
//!
//! ```text
//! Reset indicator (from the potential before this step):
//!     R = H(U[t] - θ)
//!
//! Membrane update (see `dynamics`):
//!     U[t+1] = β·U[t] + X[t+1] - R·θ        (subtract)
//!
//! Spike:
//!     S[t+1] = H(U[t+1] - θ) · g            (g = graded_spikes_factor)
//!     winner-take-all per batch row when inhibition is on
//!
//! Deferred reset (reset_delay = false):
//!     U[t+1] -= (S/g - R)·θ                 (subtract)
//!     U[t+1] -= (S/g - R)·U[t+1]            (zero)
//!
//! Graded escalation (see `graded`):
//!     S[t+1] *= Σn over n·θ < U[t+1]
//! ```
//!
//! ## States
//! Uninitialized until the first step; the buffer is re-zeroed whenever the
//! input shape changes.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::parameters::{LeakyParameters, NamedParameter};
use crate::dynamics::{ResetMechanism, ResetTiming};
use crate::firing::SpikeFunction;
use crate::graded;
use crate::quant::StateQuantizer;
use crate::registry::{HiddenStateRegistry, MembraneState, SharedState};
use crate::surrogate::{Heaviside, SurrogateGradient};
use crate::types::error::{NeuralError, Result};
use crate::types::tensor::{scalar, Tensor};

/// Runtime-gated per-step tracing.
/// Enable with `LEAKY_TRACE_DYNAMICS=1`.
fn dynamics_trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("LEAKY_TRACE_DYNAMICS")
            .ok()
            .as_deref()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// Result of one [`Leaky::step`]
#[derive(Debug, Clone, PartialEq)]
pub enum LeakyOutput {
    /// Internally threaded state without `output`
    Spike(Tensor),
    /// Spike and updated potential
    SpikeAndMem(Tensor, Tensor),
}

impl LeakyOutput {
    pub fn spike(&self) -> &Tensor {
        match self {
            LeakyOutput::Spike(spike) | LeakyOutput::SpikeAndMem(spike, _) => spike,
        }
    }

    pub fn mem(&self) -> Option<&Tensor> {
        match self {
            LeakyOutput::Spike(_) => None,
            LeakyOutput::SpikeAndMem(_, mem) => Some(mem),
        }
    }

    pub fn into_parts(self) -> (Tensor, Option<Tensor>) {
        match self {
            LeakyOutput::Spike(spike) => (spike, None),
            LeakyOutput::SpikeAndMem(spike, mem) => (spike, Some(mem)),
        }
    }
}

/// Builder for [`Leaky`]
pub struct LeakyBuilder {
    params: LeakyParameters,
    spike_grad: Option<Arc<dyn SurrogateGradient>>,
    state_quant: Option<Arc<dyn StateQuantizer>>,
}

impl LeakyBuilder {
    pub fn new(beta: f32) -> Self {
        Self::from_parameters(LeakyParameters::new(beta))
    }

    pub fn from_parameters(params: LeakyParameters) -> Self {
        Self {
            params,
            spike_grad: None,
            state_quant: None,
        }
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.params.threshold = threshold;
        self
    }

    pub fn reset_mechanism(mut self, mechanism: ResetMechanism) -> Self {
        self.params.reset_mechanism = mechanism;
        self
    }

    pub fn reset_delay(mut self, reset_delay: bool) -> Self {
        self.params.reset_delay = reset_delay;
        self
    }

    pub fn inhibition(mut self, inhibition: bool) -> Self {
        self.params.inhibition = inhibition;
        self
    }

    pub fn graded_spikes_factor(mut self, factor: f32) -> Self {
        self.params.graded_spikes_factor = factor;
        self
    }

    pub fn output(mut self, output: bool) -> Self {
        self.params.output = output;
        self
    }

    pub fn init_hidden(mut self, init_hidden: bool) -> Self {
        self.params.init_hidden = init_hidden;
        self
    }

    pub fn learn_beta(mut self, learn: bool) -> Self {
        self.params.learn_beta = learn;
        self
    }

    pub fn learn_threshold(mut self, learn: bool) -> Self {
        self.params.learn_threshold = learn;
        self
    }

    pub fn learn_graded_spikes_factor(mut self, learn: bool) -> Self {
        self.params.learn_graded_spikes_factor = learn;
        self
    }

    pub fn surrogate_disable(mut self, disable: bool) -> Self {
        self.params.surrogate_disable = disable;
        self
    }

    pub fn max_escalations(mut self, max: usize) -> Self {
        self.params.max_escalations = max;
        self
    }

    /// Custom surrogate, overriding `params.surrogate`
    pub fn spike_grad(mut self, surrogate: impl SurrogateGradient + 'static) -> Self {
        self.spike_grad = Some(Arc::new(surrogate));
        self
    }

    pub fn state_quant(mut self, quantizer: impl StateQuantizer + 'static) -> Self {
        self.state_quant = Some(Arc::new(quantizer));
        self
    }

    /// Build an unregistered layer
    pub fn build(self) -> Result<Leaky> {
        self.params.validate()?;

        let surrogate: Arc<dyn SurrogateGradient> = if self.params.surrogate_disable {
            Arc::new(Heaviside)
        } else if let Some(custom) = self.spike_grad {
            custom
        } else {
            Arc::new(self.params.surrogate)
        };

        let spike_fn = SpikeFunction::new(surrogate);
        debug!(
            reset_mechanism = %self.params.reset_mechanism,
            reset_delay = self.params.reset_delay,
            init_hidden = self.params.init_hidden,
            surrogate = spike_fn.surrogate_name(),
            "leaky layer constructed"
        );

        Ok(Leaky {
            timing: ResetTiming::from_reset_delay(self.params.reset_delay),
            params: self.params,
            spike_fn,
            state_quant: self.state_quant,
            state: Arc::new(Mutex::new(MembraneState::new())),
            reset: scalar(0.0),
            surrogate_grad: scalar(0.0),
        })
    }

    /// Build and, for internally threaded state, register with `registry`
    pub fn build_in(self, registry: &HiddenStateRegistry) -> Result<Leaky> {
        let layer = self.build()?;
        if layer.params.init_hidden {
            registry.register(&layer.state);
        }
        Ok(layer)
    }
}

/// First-order leaky integrate-and-fire layer
pub struct Leaky {
    params: LeakyParameters,
    timing: ResetTiming,
    spike_fn: SpikeFunction,
    state_quant: Option<Arc<dyn StateQuantizer>>,
    state: SharedState,
    /// Reset indicator used by the last step
    reset: Tensor,
    /// ∂spike/∂mem of the last step
    surrogate_grad: Tensor,
}

impl Leaky {
    pub fn builder(beta: f32) -> LeakyBuilder {
        LeakyBuilder::new(beta)
    }

    pub fn new(params: LeakyParameters) -> Result<Self> {
        LeakyBuilder::from_parameters(params).build()
    }

    pub fn with_registry(params: LeakyParameters, registry: &HiddenStateRegistry) -> Result<Self> {
        LeakyBuilder::from_parameters(params).build_in(registry)
    }

    pub fn parameters(&self) -> &LeakyParameters {
        &self.params
    }

    pub fn reset_mechanism(&self) -> ResetMechanism {
        self.params.reset_mechanism
    }

    pub fn reset_timing(&self) -> ResetTiming {
        self.timing
    }

    /// beta, threshold and graded spike factor with their learnability
    pub fn named_parameters(&self) -> Vec<NamedParameter> {
        vec![
            NamedParameter {
                name: "beta",
                value: self.params.beta,
                learnable: self.params.learn_beta,
            },
            NamedParameter {
                name: "threshold",
                value: self.params.threshold,
                learnable: self.params.learn_threshold,
            },
            NamedParameter {
                name: "graded_spikes_factor",
                value: self.params.graded_spikes_factor,
                learnable: self.params.learn_graded_spikes_factor,
            },
        ]
    }

    /// Copy of the current membrane potential
    pub fn mem(&self) -> Tensor {
        self.state.lock().potential().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().is_initialized()
    }

    /// Steps since the potential was last detached or reset
    pub fn graph_depth(&self) -> usize {
        self.state.lock().graph_depth()
    }

    /// Surrogate derivative of the last emitted spike
    pub fn surrogate_grad(&self) -> &Tensor {
        &self.surrogate_grad
    }

    /// Reset indicator the last step integrated with
    pub fn last_reset(&self) -> &Tensor {
        &self.reset
    }

    /// Zero this layer's potential, keeping its shape
    pub fn reset_mem(&mut self) {
        self.state.lock().reset();
    }

    /// Advance one timestep
    ///
    /// `mem` supplies the previous potential when the caller threads state
    /// itself; it must be `None` for `init_hidden` layers.
    pub fn step(&mut self, input: &Tensor, mem: Option<Tensor>) -> Result<LeakyOutput> {
        if self.params.init_hidden && mem.is_some() {
            return Err(NeuralError::ArgumentConflict(
                "`mem` must not be passed while `init_hidden = true`".to_string(),
            ));
        }

        let threshold = self.params.threshold;
        let factor = self.params.graded_spikes_factor;
        let mechanism = self.params.reset_mechanism;

        let mut state = self.state.lock();
        if let Some(mem) = mem {
            state.adopt(mem);
        }
        let was_initialized = state.is_initialized();
        if state.ensure_shape(input.shape()) && was_initialized {
            debug!(shape = ?input.shape(), "input shape changed, membrane potential re-zeroed");
        }

        let reset = self.spike_fn.reset_indicator(state.potential(), threshold);
        let mut next = mechanism.integrate(state.potential(), input, self.params.beta, threshold, &reset);

        if let Some(quantizer) = &self.state_quant {
            next = quantizer.quantize(&next);
        }

        let emission = if self.params.inhibition {
            self.spike_fn.fire_inhibited(&next, threshold)
        } else {
            self.spike_fn.fire(&next, threshold)
        };
        let mut spike = emission.spike * factor;
        let mut surrogate_grad = emission.surrogate_grad * factor;

        if self.timing == ResetTiming::Deferred {
            mechanism.apply_deferred_reset(&mut next, &spike, &reset, factor, threshold);
        }

        let escalation = graded::escalate(
            &mut next,
            threshold,
            mechanism == ResetMechanism::Subtract,
            self.params.max_escalations,
        );
        if escalation.capped > 0 {
            warn!(
                elements = escalation.capped,
                max_escalations = self.params.max_escalations,
                "graded spike escalation truncated"
            );
        }
        spike *= &escalation.multiplier;
        surrogate_grad *= &escalation.multiplier;

        state.commit(next);
        if dynamics_trace_enabled() {
            let fired = spike.iter().filter(|&&s| s != 0.0).count();
            trace!(
                neurons = spike.len(),
                fired,
                graph_depth = state.graph_depth(),
                "leaky step"
            );
        }

        let output = if self.params.output || !self.params.init_hidden {
            LeakyOutput::SpikeAndMem(spike, state.potential().clone())
        } else {
            LeakyOutput::Spike(spike)
        };
        drop(state);

        self.reset = reset;
        self.surrogate_grad = surrogate_grad;
        Ok(output)
    }
}

impl fmt::Debug for Leaky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaky")
            .field("params", &self.params)
            .field("timing", &self.timing)
            .field("spike_fn", &self.spike_fn)
            .field("state_quant", &self.state_quant.is_some())
            .field("state", &*self.state.lock())
            .finish()
    }
}
