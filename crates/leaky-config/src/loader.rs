// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, LeakyConfig, LogFormat, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the configuration file
///
/// Search order:
/// 1. `LEAKY_CONFIG_PATH` environment variable
/// 2. Current working directory: `./leaky_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("LEAKY_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by LEAKY_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet LEAKY_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is left to [`validate_config`](crate::validate_config).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<LeakyConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: LeakyConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower == "true" || lower == "1" || lower == "yes"
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "text" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `LEAKY_BETA` -> `neuron.beta`
/// - `LEAKY_THRESHOLD` -> `neuron.threshold`
/// - `LEAKY_RESET_MECHANISM` -> `neuron.reset_mechanism`
/// - `LEAKY_RESET_DELAY` -> `neuron.reset_delay`
/// - `LEAKY_INIT_HIDDEN` -> `neuron.init_hidden`
/// - `LEAKY_GRADED_SPIKES_FACTOR` -> `neuron.graded_spikes_factor`
/// - `LEAKY_LOG_LEVEL` -> `logging.level`
/// - `LEAKY_LOG_FORMAT` -> `logging.format`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut LeakyConfig) {
    if let Ok(value) = env::var("LEAKY_BETA") {
        if let Ok(beta) = value.parse::<f32>() {
            config.neuron.beta = beta;
        }
    }
    if let Ok(value) = env::var("LEAKY_THRESHOLD") {
        if let Ok(threshold) = value.parse::<f32>() {
            config.neuron.threshold = threshold;
        }
    }
    if let Ok(value) = env::var("LEAKY_RESET_MECHANISM") {
        if let Ok(mechanism) = value.parse() {
            config.neuron.reset_mechanism = mechanism;
        }
    }
    if let Ok(value) = env::var("LEAKY_RESET_DELAY") {
        config.neuron.reset_delay = parse_flag(&value);
    }
    if let Ok(value) = env::var("LEAKY_INIT_HIDDEN") {
        config.neuron.init_hidden = parse_flag(&value);
    }
    if let Ok(value) = env::var("LEAKY_GRADED_SPIKES_FACTOR") {
        if let Ok(factor) = value.parse::<f32>() {
            config.neuron.graded_spikes_factor = factor;
        }
    }

    if let Ok(value) = env::var("LEAKY_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("LEAKY_LOG_FORMAT") {
        if let Some(format) = parse_log_format(&value) {
            config.logging.format = format;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"beta": "0.8", "reset_mechanism": "zero"}`)
pub fn apply_cli_overrides(config: &mut LeakyConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("beta") {
        if let Ok(beta) = value.parse::<f32>() {
            config.neuron.beta = beta;
        }
    }
    if let Some(value) = cli_args.get("threshold") {
        if let Ok(threshold) = value.parse::<f32>() {
            config.neuron.threshold = threshold;
        }
    }
    if let Some(value) = cli_args.get("reset_mechanism") {
        if let Ok(mechanism) = value.parse() {
            config.neuron.reset_mechanism = mechanism;
        }
    }
    if let Some(value) = cli_args.get("reset_delay") {
        config.neuron.reset_delay = parse_flag(value);
    }
    if let Some(value) = cli_args.get("init_hidden") {
        config.neuron.init_hidden = parse_flag(value);
    }
    if let Some(value) = cli_args.get("inhibition") {
        config.neuron.inhibition = parse_flag(value);
    }
    if let Some(value) = cli_args.get("output") {
        config.neuron.output = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
