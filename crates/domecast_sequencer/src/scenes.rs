// SPDX-License-Identifier: MIT OR Apache-2.0
//! Planetarium scene handlers.
//!
//! One pure function per scene, indexed in timeline order. Each handler only
//! sees the [`SceneFrame`] it is given: no randomness, no clocks.

use crate::easing::Easing;
use crate::params::ParameterDelta;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Show-wide motion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Base vertical camera drift per step
    pub camera_drift_speed: f64,
    /// Base rotation per step
    pub rotation_speed: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            camera_drift_speed: 0.005,
            rotation_speed: 0.004,
        }
    }
}

/// Inputs to a scene handler for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    /// Seconds into the scene
    pub local_time: f64,
    /// Normalized scene progress
    pub progress: f64,
    /// Shared show time in seconds
    pub global_time: f64,
    /// Scene duration in seconds
    pub duration: f64,
    /// Motion constants
    pub motion: MotionConfig,
}

/// A per-scene handler
pub type SceneHandler = fn(&SceneFrame) -> ParameterDelta;

/// Handler table for the seven scene planetarium show
pub const PLANETARIUM: [SceneHandler; 7] = [
    emergence,
    great_silence,
    celestial_structures,
    systems_of_light,
    transcendence,
    infinite_scale,
    stardust_memory,
];

/// Darkness, then the first stars fade in while the camera floats.
pub fn emergence(frame: &SceneFrame) -> ParameterDelta {
    let stars = if frame.local_time > 2.0 {
        (frame.local_time - 2.0) / 8.0 * 0.6
    } else {
        0.0
    };

    ParameterDelta {
        star_opacity: Some(stars),
        milky_way_opacity: Some(0.0),
        nebula_opacity: Some(0.0),
        camera_translate: [0.0, (frame.global_time * 0.2).sin() * 5.0, 0.0],
        ..ParameterDelta::default()
    }
}

/// Stars brighten, nebulae bloom, drift builds toward a swoosh.
pub fn great_silence(frame: &SceneFrame) -> ParameterDelta {
    let p = frame.progress;
    let drift = frame.motion.camera_drift_speed * (10.0 + Easing::swoosh(p) * 100.0);

    ParameterDelta {
        star_opacity: Some(0.6 + p * 0.4),
        nebula_opacity: Some(p * 0.7),
        camera_translate: [0.0, drift, 0.0],
        camera_rotate: [0.0, 0.0, 0.0001 + Easing::rotation_swoosh(p)],
        ..ParameterDelta::default()
    }
}

/// The Milky Way rises while the camera orbits on a widening radius.
pub fn celestial_structures(frame: &SceneFrame) -> ParameterDelta {
    let p = frame.progress;
    let radius = 200.0 + p * 300.0;

    ParameterDelta {
        milky_way_opacity: Some(p * 2.5),
        camera_position: [Some((p * PI).sin() * radius), None, Some((p * PI).cos() * radius)],
        camera_translate: [0.0, frame.motion.camera_drift_speed * 40.0, 0.0],
        camera_rotate: [0.0, 0.002, 0.0],
        ..ParameterDelta::default()
    }
}

/// The solar system descends into view.
pub fn systems_of_light(frame: &SceneFrame) -> ParameterDelta {
    let p = frame.progress;
    let eased = Easing::ease_in_out(p);

    ParameterDelta {
        solar_system_visible: Some(true),
        solar_system_altitude: Some(Easing::lerp(8000.0, 700.0, eased)),
        camera_translate: [
            0.0,
            frame.motion.camera_drift_speed * (10.0 + eased * 50.0),
            0.0,
        ],
        camera_rotate: [(p * 5.0).sin() * 0.005, 0.0, 0.0],
        ..ParameterDelta::default()
    }
}

/// The solar system falls away under a warp climb.
pub fn transcendence(frame: &SceneFrame) -> ParameterDelta {
    let p = frame.progress;
    let eased = Easing::ease_in_out(p);
    let swoosh = Easing::swoosh(p);
    let warp = frame.motion.camera_drift_speed * (20.0 + swoosh * 500.0);

    ParameterDelta {
        solar_system_altitude: Some(Easing::lerp(700.0, 30000.0, eased)),
        camera_translate: [0.0, warp, 0.0],
        camera_rotate: [Easing::rotation_swoosh(p), 0.0, 0.001 + swoosh * 0.05],
        ..ParameterDelta::default()
    }
}

/// High-altitude drift with a cubic climb.
pub fn infinite_scale(frame: &SceneFrame) -> ParameterDelta {
    let p = frame.progress;

    ParameterDelta {
        milky_way_opacity: Some(1.0 - p * 0.5),
        nebula_opacity: Some(0.7 + p * 0.3),
        camera_translate: [0.0, Easing::swoosh(p) * 2000.0, 0.0],
        camera_rotate: [0.0, 0.001, 0.0],
        ..ParameterDelta::default()
    }
}

/// Stars dim toward the close.
pub fn stardust_memory(frame: &SceneFrame) -> ParameterDelta {
    let p = frame.progress;

    ParameterDelta {
        star_opacity: Some(1.0 - p * 0.7),
        camera_translate: [0.0, 50.0, 0.0],
        camera_rotate: [0.0, frame.motion.rotation_speed * 0.02, 0.0],
        ..ParameterDelta::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn frame(progress: f64, duration: f64) -> SceneFrame {
        SceneFrame {
            local_time: progress * duration,
            progress,
            global_time: 0.0,
            duration,
            motion: MotionConfig::default(),
        }
    }

    #[test]
    fn test_emergence_holds_dark_then_fades() {
        let early = emergence(&frame(0.1, 10.0));
        assert_eq!(early.star_opacity, Some(0.0));
        let late = emergence(&frame(1.0, 10.0));
        assert!((late.star_opacity.unwrap() - 0.6).abs() < EPS);
    }

    #[test]
    fn test_star_opacity_continuous_into_great_silence() {
        let end = emergence(&frame(1.0, 10.0)).star_opacity.unwrap();
        let start = great_silence(&frame(0.0, 35.0)).star_opacity.unwrap();
        assert!((end - start).abs() < EPS);
    }

    #[test]
    fn test_solar_altitude_continuous() {
        let end = systems_of_light(&frame(1.0, 40.0)).solar_system_altitude.unwrap();
        let start = transcendence(&frame(0.0, 30.0)).solar_system_altitude.unwrap();
        assert!((end - 700.0).abs() < EPS);
        assert!((end - start).abs() < EPS);
    }

    #[test]
    fn test_great_silence_swoosh_is_cubic() {
        let motion = MotionConfig::default();
        let half = great_silence(&frame(0.5, 35.0)).camera_translate[1];
        assert!((half - motion.camera_drift_speed * (10.0 + 0.125 * 100.0)).abs() < EPS);
    }

    #[test]
    fn test_systems_of_light_uses_ease_in_out() {
        let quarter = systems_of_light(&frame(0.25, 40.0));
        let expected = Easing::lerp(8000.0, 700.0, 0.125);
        assert!((quarter.solar_system_altitude.unwrap() - expected).abs() < EPS);
        assert_eq!(quarter.solar_system_visible, Some(true));
    }

    #[test]
    fn test_celestial_orbit_radius() {
        let start = celestial_structures(&frame(0.0, 30.0));
        assert!(start.camera_position[0].unwrap().abs() < EPS);
        assert!((start.camera_position[2].unwrap() - 200.0).abs() < EPS);
        assert_eq!(start.camera_position[1], None);
    }

    #[test]
    fn test_handlers_are_pure() {
        let f = SceneFrame {
            local_time: 3.3,
            progress: 0.33,
            global_time: 17.25,
            duration: 10.0,
            motion: MotionConfig::default(),
        };
        for handler in PLANETARIUM {
            assert_eq!(handler(&f), handler(&f));
        }
    }
}
