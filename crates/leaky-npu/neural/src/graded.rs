// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Multi-threshold (graded) spike escalation
//!
//! After the primary spike and reset, an element whose potential still sits
//! above whole multiples of the threshold escalates its spike. For
//! `n = 1..=floor(U/θ)` (re-checked against the current, partly reduced `U`):
//!
//! ```text
//! if U > n·θ:
//!     total += n
//!     U -= n·θ        (subtract mechanism only)
//! ```
//!
//! The spike is then multiplied by `total` (left unchanged when `total == 0`).

use ndarray::Zip;

use crate::types::tensor::Tensor;

/// Default cap on escalation rounds per element and step
pub const DEFAULT_MAX_ESCALATIONS: usize = 1024;

/// Outcome of one escalation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Escalation {
    /// Per-element spike multiplier (1 where nothing escalated)
    pub multiplier: Tensor,
    /// Elements whose loop bound was truncated by the cap
    pub capped: usize,
}

/// Escalate graded spikes in place on `mem`
///
/// `threshold` must be strictly positive; the layer validates this at
/// construction.
pub fn escalate(mem: &mut Tensor, threshold: f32, subtract: bool, max_escalations: usize) -> Escalation {
    let mut multiplier = Tensor::ones(mem.raw_dim());
    let mut capped = 0usize;

    Zip::from(&mut multiplier).and(mem).for_each(|mult, m| {
        let levels = (*m / threshold).floor();
        // also rejects NaN
        if !(levels >= 1.0) {
            return;
        }
        let bound = if levels > max_escalations as f32 {
            capped += 1;
            max_escalations
        } else {
            levels as usize
        };

        let mut total = 0.0f32;
        for n in 1..=bound {
            let level = n as f32 * threshold;
            if *m > level {
                total += n as f32;
                if subtract {
                    *m -= level;
                }
            }
        }
        if total > 0.0 {
            *mult = total;
        }
    });

    Escalation { multiplier, capped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tensor::from_slice;

    #[test]
    fn test_single_level_reduces_once() {
        let mut mem = from_slice(&[1.2]);
        let esc = escalate(&mut mem, 1.0, true, DEFAULT_MAX_ESCALATIONS);
        assert_eq!(esc.multiplier, from_slice(&[1.0]));
        assert!((mem[[0]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_three_and_a_half_thresholds() {
        let mut mem = from_slice(&[3.5]);
        let esc = escalate(&mut mem, 1.0, true, DEFAULT_MAX_ESCALATIONS);
        // n = 1 and n = 2 fire; 0.5 > 3 does not
        assert_eq!(esc.multiplier, from_slice(&[3.0]));
        assert!((mem[[0]] - 0.5).abs() < 1e-6);
        assert_eq!(esc.capped, 0);
    }

    #[test]
    fn test_zero_mechanism_keeps_potential() {
        let mut mem = from_slice(&[3.5]);
        let esc = escalate(&mut mem, 1.0, false, DEFAULT_MAX_ESCALATIONS);
        assert_eq!(esc.multiplier, from_slice(&[6.0]));
        assert_eq!(mem[[0]], 3.5);
    }

    #[test]
    fn test_exact_multiple_does_not_escalate() {
        let mut mem = from_slice(&[1.0, 0.4, -2.0]);
        let esc = escalate(&mut mem, 1.0, true, DEFAULT_MAX_ESCALATIONS);
        assert_eq!(esc.multiplier, from_slice(&[1.0, 1.0, 1.0]));
        assert_eq!(mem, from_slice(&[1.0, 0.4, -2.0]));
    }

    #[test]
    fn test_cap_truncates_loop() {
        let mut mem = from_slice(&[1.0e6]);
        let esc = escalate(&mut mem, 1.0, false, 4);
        assert_eq!(esc.capped, 1);
        assert_eq!(esc.multiplier, from_slice(&[10.0]));
    }

    #[test]
    fn test_nan_is_left_alone() {
        let mut mem = from_slice(&[f32::NAN]);
        let esc = escalate(&mut mem, 1.0, true, DEFAULT_MAX_ESCALATIONS);
        assert_eq!(esc.multiplier, from_slice(&[1.0]));
        assert_eq!(esc.capped, 0);
    }
}
