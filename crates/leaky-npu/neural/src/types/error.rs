// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for layer construction and stepping

/// Errors raised by the LIF layer core
///
/// Every variant is a configuration or usage error. Nothing here is transient,
/// so callers should not retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    /// Two mutually exclusive state-management styles were mixed in one call
    #[error("Argument conflict: {0}")]
    ArgumentConflict(String),

    /// A combination of options the layer cannot honour
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A single parameter is out of its valid domain
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl NeuralError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        NeuralError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = core::result::Result<T, NeuralError>;
pub type Error = NeuralError;
