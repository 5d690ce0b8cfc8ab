// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module checks that configuration values are within valid ranges and
//! don't conflict with each other. Every problem is collected before failing so
//! a single run reports them all.

use crate::{ConfigError, ConfigResult, LeakyConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: String, expected: String },
    Conflict { field1: String, field2: String, reason: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, expected } => {
                write!(f, "{} = {} is out of range (expected {})", field, value, expected)
            }
            Self::Conflict { field1, field2, reason } => {
                write!(f, "{} conflicts with {}: {}", field1, field2, reason)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Neuron parameter ranges (threshold, beta, graded factor, escalation cap)
/// - Option conflicts (deferred reset with internal state)
/// - Quantizer shape
/// - Known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &LeakyConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Every validation problem in `config`
pub fn collect_errors(config: &LeakyConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_neuron_ranges(config, &mut errors);
    validate_neuron_conflicts(config, &mut errors);
    validate_state_quant(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_neuron_ranges(config: &LeakyConfig, errors: &mut Vec<ConfigValidationError>) {
    let neuron = &config.neuron;

    if !neuron.threshold.is_finite() || neuron.threshold <= 0.0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "neuron.threshold".to_string(),
            value: neuron.threshold.to_string(),
            expected: "finite and > 0".to_string(),
        });
    }

    // beta outside [0, 1] is clamped at use, only non-finite values are rejected
    if !neuron.beta.is_finite() {
        errors.push(ConfigValidationError::OutOfRange {
            field: "neuron.beta".to_string(),
            value: neuron.beta.to_string(),
            expected: "finite".to_string(),
        });
    }

    if !neuron.graded_spikes_factor.is_finite() || neuron.graded_spikes_factor == 0.0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "neuron.graded_spikes_factor".to_string(),
            value: neuron.graded_spikes_factor.to_string(),
            expected: "finite and non-zero".to_string(),
        });
    }

    if neuron.max_escalations == 0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "neuron.max_escalations".to_string(),
            value: "0".to_string(),
            expected: ">= 1".to_string(),
        });
    }
}

fn validate_neuron_conflicts(config: &LeakyConfig, errors: &mut Vec<ConfigValidationError>) {
    if !config.neuron.reset_delay && config.neuron.init_hidden {
        errors.push(ConfigValidationError::Conflict {
            field1: "neuron.reset_delay = false".to_string(),
            field2: "neuron.init_hidden = true".to_string(),
            reason: "deferred reset needs caller-threaded state".to_string(),
        });
    }
}

fn validate_state_quant(config: &LeakyConfig, errors: &mut Vec<ConfigValidationError>) {
    let Some(quant) = &config.neuron.state_quant else {
        return;
    };

    if quant.num_levels < 2 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "neuron.state_quant.num_levels".to_string(),
            value: quant.num_levels.to_string(),
            expected: ">= 2".to_string(),
        });
    }
    if !quant.lower.is_finite() || !quant.upper.is_finite() || quant.lower >= quant.upper {
        errors.push(ConfigValidationError::InvalidValue {
            field: "neuron.state_quant".to_string(),
            reason: format!("expected finite lower < upper, got [{}, {}]", quant.lower, quant.upper),
        });
    }
}

fn validate_logging(config: &LeakyConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("unknown level '{}', expected one of {:?}", config.logging.level, LOG_LEVELS),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateQuantConfig;

    #[test]
    fn test_default_passes() {
        assert!(collect_errors(&LeakyConfig::default()).is_empty());
    }

    #[test]
    fn test_non_positive_threshold() {
        let mut config = LeakyConfig::default();
        config.neuron.threshold = 0.0;
        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("neuron.threshold"));
    }

    #[test]
    fn test_reset_delay_conflict() {
        let mut config = LeakyConfig::default();
        config.neuron.reset_delay = false;
        config.neuron.init_hidden = true;
        let errors = collect_errors(&config);
        assert!(matches!(errors[0], ConfigValidationError::Conflict { .. }));
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = LeakyConfig::default();
        config.neuron.threshold = -1.0;
        config.neuron.graded_spikes_factor = 0.0;
        config.neuron.state_quant = Some(StateQuantConfig {
            num_levels: 1,
            lower: 1.0,
            upper: 0.0,
        });
        config.logging.level = "verbose".to_string();

        assert_eq!(collect_errors(&config).len(), 5);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_beta_out_of_unit_range_is_allowed() {
        let mut config = LeakyConfig::default();
        config.neuron.beta = 1.3;
        assert!(validate_config(&config).is_ok());
    }
}
