// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging settings consumed by [`init_logging`](crate::init_logging)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Console output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Per-run log files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLogSettings {
    /// Root directory, each run gets its own `run_<timestamp>` folder below it
    pub log_dir: PathBuf,
    /// Run folders older than this are removed
    pub retention_days: u64,
    /// At most this many run folders are kept
    pub retention_runs: usize,
}

impl Default for FileLogSettings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Base level for every target without a debug flag
    pub level: String,
    pub format: LogFormat,
    /// `None` keeps output on the console only
    pub file: Option<FileLogSettings>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}
