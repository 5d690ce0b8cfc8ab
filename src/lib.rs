// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Leaky
//!
//! First-order leaky integrate-and-fire spiking layers for discrete-time
//! simulation and surrogate-gradient training.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! leaky = "0.0.1-beta.18"
//! ```
//!
//! ```rust
//! use leaky::prelude::*;
//!
//! let mut lif = Leaky::builder(0.5)
//!     .threshold(1.0)
//!     .reset_mechanism(ResetMechanism::Subtract)
//!     .build()?;
//!
//! let mut potentials = Vec::new();
//! for x in [1.0, 0.0, 1.0] {
//!     let (_spk, mem) = lif.step(&tensor::scalar(x), None)?.into_parts();
//!     potentials.push(mem.unwrap()[[0]]);
//! }
//! # Ok::<(), leaky::NeuralError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: per-run JSON log files with retention
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  leaky-npu-neural                                       │
//! │  (membrane update, spiking, reset, hidden-state)        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  leaky-config / leaky-observability                     │
//! │  (TOML + overrides, logging setup)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  leaky::Session                                         │
//! │  (configured layers sharing one registry)               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub mod session;

// Re-export the layer core
pub use leaky_npu_neural as neural;
pub use leaky_npu_neural::{
    tensor, HiddenStateRegistry, Leaky, LeakyBuilder, LeakyOutput, LeakyParameters, NeuralError,
    ResetMechanism, SurrogateGradient, SurrogateKind, Tensor,
};

// Re-export infrastructure
pub use leaky_config as config;
pub use leaky_config::{ConfigError, LeakyConfig};
pub use leaky_observability as observability;

pub use session::{logging_settings, Session, SessionError, SessionResult};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::{
        tensor, HiddenStateRegistry, Leaky, LeakyBuilder, LeakyOutput, LeakyParameters, NeuralError,
        ResetMechanism, ResetTiming, StateQuantizer, SurrogateGradient, SurrogateKind, Tensor,
        UniformQuantizer,
    };
    pub use crate::session::{Session, SessionError};
    pub use leaky_config::{load_config, validate_config, LeakyConfig};
    pub use leaky_observability::{parse_debug_flags, CrateDebugFlags};
}
