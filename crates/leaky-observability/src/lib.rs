// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Leaky Observability
//!
//! Logging setup shared by the leaky workspace:
//! - Per-crate debug flags (`--debug-leaky-npu-neural`, `LEAKY_DEBUG=all`)
//! - Console output as text or JSON
//! - Optional per-run log files with retention (`file-logging` feature)
//!
//! ```rust,no_run
//! use leaky_observability::{init_logging, parse_debug_flags, LoggingSettings};
//!
//! let _guard = init_logging(&LoggingSettings::default(), &parse_debug_flags())
//!     .expect("logging already initialized");
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::{debug_flags_help, parse_debug_flags, CrateDebugFlags};
pub use config::{FileLogSettings, LogFormat, LoggingSettings};
pub use init::{init_logging, init_logging_default, LoggingGuard};

/// Crates that accept `--debug-<name>` flags
pub const KNOWN_CRATES: &[&str] = &["leaky", "leaky-npu-neural", "leaky-config", "leaky-observability"];
