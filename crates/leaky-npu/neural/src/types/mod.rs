// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neural Types Module
//!
//! Numeric container and error types shared by every module.

pub mod error;
pub mod tensor;

pub use error::{Error, NeuralError, Result};
pub use tensor::Tensor;
