// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron Layer Models
//!
//! A layer composes the pure building blocks (`dynamics`, `firing`,
//! `graded`, `quant`) into a per-timestep `step` and owns its configuration
//! and membrane state.

pub mod leaky;
pub mod parameters;

// Re-export core types
pub use leaky::{Leaky, LeakyBuilder, LeakyOutput};
pub use parameters::{LeakyParameters, NamedParameter};
