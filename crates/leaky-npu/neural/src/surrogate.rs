// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Surrogate Gradients
//!
//! The spike is a Heaviside step of the shifted potential `mem - threshold`,
//! whose true derivative is zero almost everywhere. A surrogate gradient keeps
//! the forward predicate and substitutes a smooth derivative for the backward
//! pass.
//!
//! ```text
//! forward:   S = H(U - θ)            H(x) = 1 if x ≥ 0 else 0
//! backward:  ∂S/∂U ≈ σ'(U - θ)       σ' chosen per family
//! ```
//!
//! ## Families
//! - `ATan`:            α / 2 / (1 + (π/2 · α · x)²)
//! - `FastSigmoid`:     1 / (k·|x| + 1)²
//! - `Sigmoid`:         k·e^(-k·x) / (e^(-k·x) + 1)²
//! - `StraightThrough`: 1
//! - `Triangular`:      max(0, 1 - |x|)
//! - `Heaviside`:       0 (surrogate disabled)

use core::f32::consts::FRAC_PI_2;
use core::fmt::Debug;

/// Heaviside step used as the forward predicate of every surrogate family
#[inline(always)]
pub fn heaviside(shifted: f32) -> f32 {
    if shifted >= 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Swappable spike derivative strategy
///
/// Implementors receive the shifted potential `mem - threshold`.
pub trait SurrogateGradient: Send + Sync + Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Forward spike value (0 or 1)
    #[inline]
    fn forward(&self, shifted: f32) -> f32 {
        heaviside(shifted)
    }

    /// Substitute derivative of the spike with respect to the potential
    fn derivative(&self, shifted: f32) -> f32;
}

/// Built-in surrogate families, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum SurrogateKind {
    /// Arctangent surrogate (default)
    #[cfg_attr(feature = "serde", serde(rename = "atan"))]
    ATan { alpha: f32 },
    FastSigmoid { slope: f32 },
    Sigmoid { slope: f32 },
    StraightThrough,
    Triangular,
}

impl Default for SurrogateKind {
    fn default() -> Self {
        SurrogateKind::ATan { alpha: 2.0 }
    }
}

impl SurrogateGradient for SurrogateKind {
    fn name(&self) -> &'static str {
        match self {
            SurrogateKind::ATan { .. } => "atan",
            SurrogateKind::FastSigmoid { .. } => "fast_sigmoid",
            SurrogateKind::Sigmoid { .. } => "sigmoid",
            SurrogateKind::StraightThrough => "straight_through",
            SurrogateKind::Triangular => "triangular",
        }
    }

    #[inline]
    fn derivative(&self, shifted: f32) -> f32 {
        match *self {
            SurrogateKind::ATan { alpha } => {
                let scaled = FRAC_PI_2 * alpha * shifted;
                alpha / 2.0 / (1.0 + scaled * scaled)
            }
            SurrogateKind::FastSigmoid { slope } => {
                let denom = slope * shifted.abs() + 1.0;
                1.0 / (denom * denom)
            }
            SurrogateKind::Sigmoid { slope } => {
                let e = (-slope * shifted).exp();
                if !e.is_finite() {
                    // Far below threshold the derivative underflows to zero
                    return 0.0;
                }
                slope * e / ((e + 1.0) * (e + 1.0))
            }
            SurrogateKind::StraightThrough => 1.0,
            SurrogateKind::Triangular => (1.0 - shifted.abs()).max(0.0),
        }
    }
}

/// Plain step function with a zero derivative
///
/// Selected when the surrogate is disabled, e.g. for inference-only layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heaviside;

impl SurrogateGradient for Heaviside {
    fn name(&self) -> &'static str {
        "heaviside"
    }

    #[inline]
    fn derivative(&self, _shifted: f32) -> f32 {
        0.0
    }
}
