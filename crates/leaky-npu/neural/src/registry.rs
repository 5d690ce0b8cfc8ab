// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Hidden-State Registry
//!
//! Layers built with `init_hidden = true` thread their membrane potential
//! internally. Between training sequences the caller needs to act on all of
//! them at once:
//!
//! - **detach**: cut the potential's computation history (value unchanged),
//!   bounding truncated backpropagation windows
//! - **reset**: zero every potential in place, keeping its shape
//!
//! The registry holds weak handles only. A dropped layer silently falls out
//! of the next bulk operation.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::types::tensor::{scalar, zeros, zeros_like, Tensor};

/// Membrane potential buffer of one layer
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneState {
    potential: Tensor,
    initialized: bool,
    /// Steps recorded since the last detach/reset
    graph_depth: usize,
}

impl MembraneState {
    /// Uninitialized state holding a single zero
    pub fn new() -> Self {
        Self {
            potential: scalar(0.0),
            initialized: false,
            graph_depth: 0,
        }
    }

    pub fn potential(&self) -> &Tensor {
        &self.potential
    }

    /// Whether a step has sized the buffer yet
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn graph_depth(&self) -> usize {
        self.graph_depth
    }

    /// Take over a caller-supplied potential (new history)
    pub fn adopt(&mut self, potential: Tensor) {
        self.potential = potential;
        self.graph_depth = 0;
    }

    /// Zero the buffer if its shape differs from `shape`
    ///
    /// Returns `true` when the buffer was reallocated.
    pub fn ensure_shape(&mut self, shape: &[usize]) -> bool {
        self.initialized = true;
        if self.potential.shape() == shape {
            return false;
        }
        self.potential = zeros(shape);
        self.graph_depth = 0;
        true
    }

    /// Store the potential produced by one step
    pub fn commit(&mut self, potential: Tensor) {
        self.potential = potential;
        self.graph_depth += 1;
    }

    /// Sever history, keep the value
    pub fn detach(&mut self) {
        self.graph_depth = 0;
    }

    /// Zero in place, keep the shape
    pub fn reset(&mut self) {
        self.potential = zeros_like(&self.potential);
        self.graph_depth = 0;
    }
}

impl Default for MembraneState {
    fn default() -> Self {
        Self::new()
    }
}

/// State handle shared between a layer and its registry
pub type SharedState = Arc<Mutex<MembraneState>>;

/// Explicit collection of internally-stateful layers
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct HiddenStateRegistry {
    entries: Arc<Mutex<Vec<Weak<Mutex<MembraneState>>>>>,
}

impl HiddenStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a layer's state
    pub fn register(&self, state: &SharedState) {
        let mut entries = self.entries.lock();
        entries.push(Arc::downgrade(state));
        debug!(registered = entries.len(), "hidden state registered");
    }

    /// Number of live registered states
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detach every registered potential from its history
    pub fn detach_hidden(&self) {
        let touched = self.for_each_live(MembraneState::detach);
        debug!(layers = touched, "detached hidden states");
    }

    /// Zero every registered potential
    pub fn reset_hidden(&self) {
        let touched = self.for_each_live(MembraneState::reset);
        debug!(layers = touched, "reset hidden states");
    }

    fn for_each_live(&self, mut op: impl FnMut(&mut MembraneState)) -> usize {
        let mut entries = self.entries.lock();
        entries.retain(|weak| weak.strong_count() > 0);
        let mut touched = 0;
        for weak in entries.iter() {
            if let Some(state) = weak.upgrade() {
                let mut guard = state.lock();
                op(&mut *guard);
                touched += 1;
            }
        }
        touched
    }
}
