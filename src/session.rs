// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configured layer factory sharing one hidden-state registry

use std::collections::HashMap;
use std::path::Path;

use leaky_config::{load_config, validate_config, ConfigError, LeakyConfig, LoggingConfig};
use leaky_npu_neural::{HiddenStateRegistry, Leaky, LeakyBuilder, NeuralError, UniformQuantizer};
use leaky_observability::{init_logging, CrateDebugFlags, FileLogSettings, LogFormat, LoggingGuard, LoggingSettings};
use tracing::{debug, info};

/// Errors raised while assembling a session or its layers
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Neural(#[from] NeuralError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Logging settings described by a `[logging]` section
pub fn logging_settings(config: &LoggingConfig) -> LoggingSettings {
    LoggingSettings {
        level: config.level.clone(),
        format: match config.format {
            leaky_config::LogFormat::Text => LogFormat::Text,
            leaky_config::LogFormat::Json => LogFormat::Json,
        },
        file: config.file_logging.then(|| FileLogSettings {
            log_dir: config.log_dir.clone(),
            retention_days: config.retention_days,
            retention_runs: config.retention_runs,
        }),
    }
}

/// Validated configuration plus the registry every internally threaded layer
/// joins
///
/// ```rust
/// use leaky::{tensor, LeakyConfig, Session};
///
/// let mut config = LeakyConfig::default();
/// config.neuron.init_hidden = true;
///
/// let session = Session::from_config(config)?;
/// let mut layer = session.layer()?;
/// layer.step(&tensor::scalar(0.5), None)?;
///
/// session.reset_hidden();
/// assert_eq!(layer.mem()[[0]], 0.0);
/// # Ok::<(), leaky::SessionError>(())
/// ```
pub struct Session {
    config: LeakyConfig,
    registry: HiddenStateRegistry,
    logging: Option<LoggingGuard>,
}

impl Session {
    /// Validate `config` and start with an empty registry
    pub fn from_config(config: LeakyConfig) -> SessionResult<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            registry: HiddenStateRegistry::new(),
            logging: None,
        })
    }

    /// Load, override and validate configuration (see [`load_config`])
    pub fn load(config_path: Option<&Path>, cli_args: Option<&HashMap<String, String>>) -> SessionResult<Self> {
        let config = load_config(config_path, cli_args)?;
        Self::from_config(config)
    }

    pub fn config(&self) -> &LeakyConfig {
        &self.config
    }

    pub fn registry(&self) -> &HiddenStateRegistry {
        &self.registry
    }

    /// Install the global subscriber from the `[logging]` section
    ///
    /// The guard is held by the session so file output is flushed when it
    /// is dropped.
    pub fn init_logging(&mut self, debug_flags: &CrateDebugFlags) -> anyhow::Result<()> {
        let guard = init_logging(&logging_settings(&self.config.logging), debug_flags)?;
        if let Some(dir) = guard.log_dir() {
            info!(log_dir = %dir.display(), "Writing log files");
        }
        self.logging = Some(guard);
        Ok(())
    }

    /// Builder seeded with the `[neuron]` section, including its quantizer
    pub fn builder(&self) -> SessionResult<LeakyBuilder> {
        let neuron = &self.config.neuron;
        let mut builder = LeakyBuilder::from_parameters(neuron.to_parameters());
        if let Some(quant) = &neuron.state_quant {
            builder = builder.state_quant(UniformQuantizer::new(quant.num_levels, quant.lower, quant.upper)?);
        }
        Ok(builder)
    }

    /// Layer built from configuration and joined to the registry
    pub fn layer(&self) -> SessionResult<Leaky> {
        self.layer_with(|builder| builder)
    }

    /// Like [`layer`](Self::layer), with per-layer adjustments
    pub fn layer_with<F>(&self, configure: F) -> SessionResult<Leaky>
    where
        F: FnOnce(LeakyBuilder) -> LeakyBuilder,
    {
        let layer = configure(self.builder()?).build_in(&self.registry)?;
        debug!(registered = self.registry.len(), "session layer built");
        Ok(layer)
    }

    /// Detach every registered layer's state from its history
    pub fn detach_hidden(&self) {
        self.registry.detach_hidden();
    }

    /// Zero every registered layer's state
    pub fn reset_hidden(&self) {
        self.registry.reset_hidden();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("registered_layers", &self.registry.len())
            .field("logging", &self.logging)
            .finish()
    }
}
