// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines the structs that map to sections in
//! `leaky_configuration.toml`:
//!
//! ```toml
//! [neuron]
//! beta = 0.8
//! threshold = 1.0
//! reset_mechanism = "subtract"
//! surrogate = { kind = "fast_sigmoid", slope = 25.0 }
//!
//! [neuron.state_quant]
//! num_levels = 16
//! lower = -1.0
//! upper = 1.0
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::PathBuf;

use leaky_npu_neural::{LeakyParameters, ResetMechanism, SurrogateKind, DEFAULT_MAX_ESCALATIONS};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeakyConfig {
    pub neuron: NeuronConfig,
    pub logging: LoggingConfig,
}

/// Layer configuration (`[neuron]`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronConfig {
    pub beta: f32,
    pub threshold: f32,
    pub reset_mechanism: ResetMechanism,
    pub reset_delay: bool,
    pub inhibition: bool,
    pub graded_spikes_factor: f32,
    pub output: bool,
    pub init_hidden: bool,
    pub learn_beta: bool,
    pub learn_threshold: bool,
    pub learn_graded_spikes_factor: bool,
    pub surrogate: SurrogateKind,
    pub surrogate_disable: bool,
    pub max_escalations: usize,
    pub state_quant: Option<StateQuantConfig>,
}

impl Default for NeuronConfig {
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
            state_quant: None,
        }
    }
}

impl NeuronConfig {
    /// Layer parameters described by this section
    ///
    /// The quantizer is not part of the parameters; build it from
    /// `state_quant` separately.
    pub fn to_parameters(&self) -> LeakyParameters {
        LeakyParameters {
            beta: self.beta,
            threshold: self.threshold,
            reset_mechanism: self.reset_mechanism,
            reset_delay: self.reset_delay,
            inhibition: self.inhibition,
            graded_spikes_factor: self.graded_spikes_factor,
            output: self.output,
            init_hidden: self.init_hidden,
            learn_beta: self.learn_beta,
            learn_threshold: self.learn_threshold,
            learn_graded_spikes_factor: self.learn_graded_spikes_factor,
            surrogate: self.surrogate,
            surrogate_disable: self.surrogate_disable,
            max_escalations: self.max_escalations,
        }
    }
}

/// Uniform state quantizer (`[neuron.state_quant]`)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct StateQuantConfig {
    pub num_levels: u32,
    pub lower: f32,
    pub upper: f32,
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration (`[logging]`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    pub level: String,
    pub format: LogFormat,
    /// Per-run log files (requires the `file-logging` feature downstream)
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neuron_section_parses() {
        let config: LeakyConfig = toml::from_str(
            r#"
            [neuron]
            beta = 0.8
            reset_mechanism = "zero"
            surrogate = { kind = "fast_sigmoid", slope = 10.0 }

            [neuron.state_quant]
            num_levels = 8
            lower = -1.0
            upper = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.neuron.beta, 0.8);
        assert_eq!(config.neuron.reset_mechanism, ResetMechanism::Zero);
        assert_eq!(config.neuron.surrogate, SurrogateKind::FastSigmoid { slope: 10.0 });
        assert_eq!(config.neuron.state_quant.unwrap().num_levels, 8);
        // untouched fields keep defaults
        assert_eq!(config.neuron.threshold, 1.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_to_parameters_copies_every_field() {
        let neuron = NeuronConfig {
            beta: 0.7,
            threshold: 2.0,
            reset_mechanism: ResetMechanism::None,
            inhibition: true,
            learn_beta: true,
            max_escalations: 8,
            ..NeuronConfig::default()
        };
        let params = neuron.to_parameters();
        assert_eq!(params.beta, 0.7);
        assert_eq!(params.threshold, 2.0);
        assert_eq!(params.reset_mechanism, ResetMechanism::None);
        assert!(params.inhibition);
        assert!(params.learn_beta);
        assert_eq!(params.max_escalations, 8);
    }

    #[test]
    fn test_effective_config_dumps_as_json() {
        let value = serde_json::to_value(LeakyConfig::default()).unwrap();
        assert_eq!(value["neuron"]["reset_mechanism"], "subtract");
        assert_eq!(value["neuron"]["surrogate"]["kind"], "atan");
        assert_eq!(value["logging"]["format"], "text");
    }

    #[test]
    fn test_logging_format_parses() {
        let config: LeakyConfig = toml::from_str("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
