// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-leaky-npu-neural`, `--debug-leaky-config`, etc.
//! Names are normalized to tracing targets (`-` becomes `_`).

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

fn to_target(crate_name: &str) -> String {
    crate_name.trim().replace('-', "_")
}

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use leaky_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-leaky-npu-neural".to_string()]);
/// assert!(flags.is_enabled("leaky-npu-neural"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(to_target(crate_name), true);
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate (either spelling)
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(&to_target(crate_name))
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags
    ///
    /// Format: "leaky_npu_neural=debug,info", with `base_level` as the default.
    pub fn to_filter_string(&self, base_level: &str) -> String {
        let mut targets: Vec<&String> = self.enabled_crates.keys().collect();
        targets.sort();

        let mut filters: Vec<String> = targets
            .into_iter()
            .map(|target| format!("{}=debug", target))
            .collect();
        filters.push(base_level.to_lowercase());
        filters.join(",")
    }
}

/// Parse debug flags from process arguments and the environment
///
/// `LEAKY_DEBUG` takes comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("LEAKY_DEBUG") {
        if env_var == "all" {
            flags.enable_all();
        } else {
            for crate_name in env_var.split(',') {
                if !crate_name.trim().is_empty() {
                    flags.enable(crate_name);
                }
            }
        }
    }

    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  LEAKY_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  LEAKY_DEBUG=all                               Enable debug for all crates
  LEAKY_TRACE_DYNAMICS=1                        Per-step trace events from the layer core
"#,
        KNOWN_CRATES.join(", ")
    )
}
