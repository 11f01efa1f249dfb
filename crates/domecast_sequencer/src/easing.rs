// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves used by the scene handlers.
//!
//! Each scene picks its own curve; these are not interchangeable.

use std::f64::consts::PI;

/// Progress remapping curves
pub struct Easing;

impl Easing {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Symmetric quadratic ease-in/ease-out
    pub fn ease_in_out(t: f64) -> f64 {
        if t < 0.5 {
            2.0 * t * t
        } else {
            -1.0 + (4.0 - 2.0 * t) * t
        }
    }

    /// Cubic acceleration, slow start and a hard finish
    pub fn swoosh(t: f64) -> f64 {
        t.powi(3)
    }

    /// Roll impulse peaking mid-scene and vanishing at both ends
    pub fn rotation_swoosh(t: f64) -> f64 {
        (t * PI).sin() * 0.02
    }
}
