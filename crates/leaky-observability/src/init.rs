// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed. With the `file-logging` feature, a
//! timestamped run folder receives per-crate JSON logs plus a combined log:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── leaky_npu_neural.log
//!       ├── leaky_config.log
//!       └── leaky.log (combined)
//! ```

use std::path::Path;
#[cfg(feature = "file-logging")]
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingSettings};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps file writers alive; logs are flushed when this is dropped
#[derive(Default)]
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    #[cfg(feature = "file-logging")]
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    #[cfg(feature = "file-logging")]
    pub fn log_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    #[cfg(not(feature = "file-logging"))]
    pub fn log_dir(&self) -> Option<&Path> {
        None
    }
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("log_dir", &self.log_dir())
            .finish()
    }
}

fn env_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Install the global tracing subscriber
///
/// Targets flagged in `debug_flags` log at debug, everything else at
/// `settings.level`.
///
/// # Errors
/// Fails when the filter does not parse, the log directory cannot be created,
/// or a global subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&settings.level);
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console_layer = match settings.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter(&filter)?)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(env_filter(&filter)?)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let guard = match &settings.file {
        Some(file) => {
            let mut file_guards = Vec::new();
            let run_dir = file_layers::install(file, &filter, &mut layers, &mut file_guards)?;
            LoggingGuard {
                _file_guards: file_guards,
                run_dir: Some(run_dir),
            }
        }
        None => LoggingGuard::default(),
    };
    #[cfg(not(feature = "file-logging"))]
    let guard = LoggingGuard::default();

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    #[cfg(not(feature = "file-logging"))]
    if settings.file.is_some() {
        tracing::warn!("File logging requested but the file-logging feature is disabled; logging to console only");
    }

    tracing::debug!(filter = %filter, "Logging initialized");
    Ok(guard)
}

/// Console logging with the given debug flags and default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(&LoggingSettings::default(), debug_flags)
}

#[cfg(feature = "file-logging")]
mod file_layers {
    use super::{env_filter, BoxedLayer};
    use crate::config::FileLogSettings;
    use anyhow::{Context, Result};
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use std::path::{Path, PathBuf};
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_appender::rolling;
    use tracing_subscriber::Layer;

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    pub(super) fn install(
        settings: &FileLogSettings,
        filter: &str,
        layers: &mut Vec<BoxedLayer>,
        guards: &mut Vec<WorkerGuard>,
    ) -> Result<PathBuf> {
        let run_folder = settings
            .log_dir
            .join(format!("{}{}", RUN_PREFIX, Utc::now().format(RUN_FORMAT)));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(&settings.log_dir, settings.retention_days, settings.retention_runs)?;

        for crate_name in crate::KNOWN_CRATES {
            let target = crate_name.replace('-', "_");
            let appender = rolling::daily(&run_folder, format!("{}.log", target));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(env_filter(&format!("{}=debug,off", target))?)
                    .boxed(),
            );
        }

        let combined = rolling::daily(&run_folder, "leaky.log");
        let (writer, guard) = tracing_appender::non_blocking(combined);
        guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(env_filter(filter)?)
                .boxed(),
        );

        Ok(run_folder)
    }

    /// Remove run folders older than `retention_days`, then keep only the
    /// newest `retention_runs`
    pub(crate) fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
        let mut runs = Vec::new();

        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_FORMAT).ok());
            if let Some(naive) = stamp {
                runs.push((path, Utc.from_utc_datetime(&naive)));
            }
        }

        // newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));

        for (index, (path, stamp)) in runs.iter().enumerate() {
            if *stamp < cutoff || index >= retention_runs {
                if let Err(e) = std::fs::remove_dir_all(path) {
                    eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "file-logging"))]
mod tests {
    use super::file_layers::cleanup_old_logs;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_drops_expired_and_excess_runs() {
        let dir = tempdir().unwrap();
        let base = dir.path();

        std::fs::create_dir(base.join("run_20000101_000000")).unwrap();
        let now = Utc::now();
        let recent: Vec<String> = (0..3)
            .map(|minutes| {
                let stamp = now - chrono::Duration::minutes(minutes);
                format!("run_{}", stamp.format("%Y%m%d_%H%M%S"))
            })
            .collect();
        for name in &recent {
            std::fs::create_dir(base.join(name)).unwrap();
        }
        std::fs::create_dir(base.join("not_a_run")).unwrap();

        cleanup_old_logs(base, 30, 2).unwrap();

        assert!(!base.join("run_20000101_000000").exists());
        assert!(base.join(&recent[0]).exists());
        assert!(base.join(&recent[1]).exists());
        assert!(!base.join(&recent[2]).exists());
        assert!(base.join("not_a_run").exists());
    }
}
