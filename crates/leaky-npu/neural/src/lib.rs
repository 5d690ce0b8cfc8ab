// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Leaky Integrate-and-Fire Layer Core
//!
//! Discrete-time LIF layer state machine:
//! - **Dynamics**: membrane update rules (subtract / zero / none) and reset timing
//! - **Firing**: threshold test with a swappable surrogate gradient, winner-take-all
//! - **Graded**: multi-threshold spike escalation
//! - **Quant**: optional post-update state quantization
//! - **Models**: the `Leaky` layer composing all of the above
//! - **Registry**: bulk detach/reset of internally threaded hidden state
//!
//! ## Example
//! ```
//! use leaky_npu_neural::{Leaky, ResetMechanism, tensor};
//!
//! let mut lif = Leaky::builder(0.8)
//!     .threshold(1.0)
//!     .reset_mechanism(ResetMechanism::Subtract)
//!     .build()?;
//!
//! let (spk, mem) = lif.step(&tensor::scalar(1.2), None)?.into_parts();
//! assert_eq!(spk[[0]], 1.0);
//! assert!((mem.unwrap()[[0]] - 0.2).abs() < 1e-6);
//! # Ok::<(), leaky_npu_neural::NeuralError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod dynamics;
pub mod firing;
pub mod graded;
pub mod quant;
pub mod surrogate;

pub mod models;
pub mod registry;

pub use types::tensor;

// Re-export everything for convenience
pub use dynamics::{clamp_beta, ResetMechanism, ResetTiming};
pub use firing::{winner_take_all_mask, Emission, SpikeFunction};
pub use graded::{escalate, Escalation, DEFAULT_MAX_ESCALATIONS};
pub use quant::{StateQuantizer, UniformQuantizer};
pub use surrogate::{heaviside, Heaviside, SurrogateGradient, SurrogateKind};

pub use types::{Error, NeuralError, Result, Tensor};

pub use models::{Leaky, LeakyBuilder, LeakyOutput, LeakyParameters, NamedParameter};
pub use registry::{HiddenStateRegistry, MembraneState, SharedState};
