// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Behavioral tests for the leaky integrate-and-fire layer
//!
//! Covers the three reset mechanisms against hand-computed trajectories,
//! lazy shape handling, construction guards, the hidden-state registry and
//! graded spike escalation.

use leaky::prelude::*;
use leaky::NeuralError;
use ndarray::array;

const EPS: f32 = 1e-6;

fn run_scalar(layer: &mut Leaky, inputs: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let mut spikes = Vec::new();
    let mut potentials = Vec::new();
    for &x in inputs {
        let (spk, mem) = layer.step(&tensor::scalar(x), None).unwrap().into_parts();
        spikes.push(spk[[0]]);
        potentials.push(mem.expect("explicit-state layer returns mem")[[0]]);
    }
    (spikes, potentials)
}

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < EPS, "step {}: got {}, expected {}", i, a, e);
    }
}

/// Scalar reference: integrate with the previous reset indicator, fire on
/// `mem >= threshold`, then escalate above whole multiples of the threshold.
fn reference_subtract(beta: f32, threshold: f32, inputs: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let mut mem = 0.0f32;
    let mut spikes = Vec::new();
    let mut potentials = Vec::new();
    for &x in inputs {
        let reset = if mem >= threshold { 1.0 } else { 0.0 };
        mem = beta * mem + x - reset * threshold;
        let mut spike = if mem >= threshold { 1.0 } else { 0.0 };

        let mut total = 0.0;
        let levels = (mem / threshold).floor().max(0.0) as usize;
        for n in 1..=levels {
            if mem > n as f32 * threshold {
                total += n as f32;
                mem -= n as f32 * threshold;
            }
        }
        if total > 0.0 {
            spike *= total;
        }
        spikes.push(spike);
        potentials.push(mem);
    }
    (spikes, potentials)
}

#[test]
fn subtract_matches_reference_trajectory() {
    let inputs = [0.5, 0.7, 0.7];
    let mut layer = Leaky::builder(0.9).threshold(1.0).build().unwrap();

    let (spikes, potentials) = run_scalar(&mut layer, &inputs);
    let (ref_spikes, ref_potentials) = reference_subtract(0.9, 1.0, &inputs);

    assert_eq!(spikes, ref_spikes);
    assert_close(&potentials, &ref_potentials);
    assert_eq!(spikes, vec![0.0, 1.0, 0.0]);
    assert_close(&potentials, &[0.5, 0.15, 0.835]);
}

#[test]
fn zero_reset_clears_before_next_input() {
    let mut layer = Leaky::builder(0.9)
        .threshold(1.0)
        .reset_mechanism(ResetMechanism::Zero)
        .build()
        .unwrap();

    let (spikes, potentials) = run_scalar(&mut layer, &[0.5, 0.7, 0.7]);

    assert_eq!(spikes, vec![0.0, 1.0, 0.0]);
    // stored potential after the spike is left as is, the next step starts from 0
    assert_close(&potentials, &[0.5, 1.15, 0.7]);
}

#[test]
fn no_reset_potential_never_decreases() {
    let mut layer = Leaky::builder(1.0)
        .threshold(1.0)
        .reset_mechanism(ResetMechanism::None)
        .build()
        .unwrap();

    let inputs = [0.4, 0.0, 0.8, 0.3, 0.0, 1.1, 0.2];
    let (spikes, potentials) = run_scalar(&mut layer, &inputs);

    for pair in potentials.windows(2) {
        assert!(pair[1] >= pair[0], "{:?}", potentials);
    }
    let total: f32 = inputs.iter().sum();
    assert!((potentials[potentials.len() - 1] - total).abs() < 1e-5);
    assert!(spikes.iter().any(|&s| s > 0.0));
}

#[test]
fn new_input_shape_rezeroes_state() {
    let mut layer = Leaky::builder(0.5).threshold(10.0).build().unwrap();
    layer.step(&tensor::from_slice(&[1.0, 2.0]), None).unwrap();

    let input = array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]].into_dyn();
    let (spk, mem) = layer.step(&input, None).unwrap().into_parts();

    assert_eq!(spk.shape(), &[3, 2]);
    assert_eq!(mem.unwrap(), input);
    assert_eq!(layer.mem().shape(), &[3, 2]);
}

#[test]
fn deferred_reset_with_hidden_state_is_rejected() {
    let mechanisms = [ResetMechanism::Subtract, ResetMechanism::Zero, ResetMechanism::None];
    for mechanism in mechanisms {
        for inhibition in [false, true] {
            for output in [false, true] {
                for factor in [0.5, 1.0, 2.0] {
                    let result = Leaky::builder(0.9)
                        .reset_mechanism(mechanism)
                        .inhibition(inhibition)
                        .output(output)
                        .graded_spikes_factor(factor)
                        .reset_delay(false)
                        .init_hidden(true)
                        .build();
                    assert!(
                        matches!(result, Err(NeuralError::UnsupportedConfiguration(_))),
                        "{:?} inhibition={} output={} factor={}",
                        mechanism,
                        inhibition,
                        output,
                        factor
                    );
                }
            }
        }
    }
}

#[test]
fn explicit_mem_on_hidden_layer_is_rejected() {
    let mut layer = Leaky::builder(0.9).init_hidden(true).build().unwrap();
    let result = layer.step(&tensor::scalar(0.5), Some(tensor::scalar(0.1)));
    assert!(matches!(result, Err(NeuralError::ArgumentConflict(_))));
    // state untouched by the rejected call
    assert!(!layer.is_initialized());
}

#[test]
fn registry_reset_and_detach_are_idempotent() {
    let registry = HiddenStateRegistry::new();
    let mut a = Leaky::builder(0.9).init_hidden(true).build_in(&registry).unwrap();
    let mut b = Leaky::builder(0.8).init_hidden(true).build_in(&registry).unwrap();
    a.step(&tensor::from_slice(&[0.3, 0.6]), None).unwrap();
    b.step(&tensor::scalar(0.4), None).unwrap();

    registry.detach_hidden();
    let detached = (a.mem(), b.mem());
    assert_eq!(a.graph_depth(), 0);
    registry.detach_hidden();
    assert_eq!((a.mem(), b.mem()), detached);
    assert_eq!(b.graph_depth(), 0);

    registry.reset_hidden();
    let first = (a.mem(), b.mem());
    registry.reset_hidden();
    assert_eq!((a.mem(), b.mem()), first);
    assert_eq!(first.0, tensor::zeros(&[2]));
    assert_eq!(first.1, tensor::zeros(&[1]));
}

#[test]
fn dropped_layers_leave_the_registry() {
    let registry = HiddenStateRegistry::new();
    let kept = Leaky::builder(0.9).init_hidden(true).build_in(&registry).unwrap();
    {
        let _short_lived = Leaky::builder(0.9).init_hidden(true).build_in(&registry).unwrap();
        assert_eq!(registry.len(), 2);
    }
    registry.reset_hidden();
    assert_eq!(registry.len(), 1);
    drop(kept);
    assert!(registry.is_empty());
}

#[test]
fn large_input_escalates_to_graded_spike() {
    let mut layer = Leaky::builder(1.0).threshold(1.0).build().unwrap();
    let (spikes, potentials) = run_scalar(&mut layer, &[3.5]);
    assert_eq!(spikes, vec![3.0]);
    assert_close(&potentials, &[0.5]);
}

#[test]
fn scalar_trajectory_end_to_end() {
    let mut layer = Leaky::builder(0.8)
        .threshold(1.0)
        .reset_mechanism(ResetMechanism::Subtract)
        .reset_delay(true)
        .build()
        .unwrap();

    let (spikes, potentials) = run_scalar(&mut layer, &[1.2, 0.1, 1.3]);

    assert_eq!(spikes, vec![1.0, 0.0, 1.0]);
    // 0.8 * 0.2 + 0.1 = 0.26, then 0.8 * 0.26 + 1.3 - 1 = 0.508
    assert_close(&potentials, &[0.2, 0.26, 0.508]);
}

#[test]
fn reset_mechanism_codes_are_stable() {
    assert_eq!(ResetMechanism::Subtract.code(), 0);
    assert_eq!(ResetMechanism::Zero.code(), 1);
    assert_eq!(ResetMechanism::None.code(), 2);
    assert_eq!("ZERO".parse::<ResetMechanism>().unwrap(), ResetMechanism::Zero);
    assert!("clamp".parse::<ResetMechanism>().is_err());
}
