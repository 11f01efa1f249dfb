// SPDX-License-Identifier: MIT OR Apache-2.0
//! Continuous visual parameters driven by the director.
//!
//! The renderer reads a [`ParameterSet`] once per frame; only the director
//! writes it, by applying [`ParameterDelta`]s.

use serde::{Deserialize, Serialize};

/// Dome camera pose
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    /// Position (x, y, z)
    pub position: [f64; 3],
    /// Euler rotation in radians (x, y, z)
    pub rotation: [f64; 3],
}

/// Opacity of each procedural layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerOpacity {
    /// Every starfield layer
    pub stars: f64,
    /// Milky Way band
    pub milky_way: f64,
    /// Nebula clouds
    pub nebulae: f64,
}

impl Default for LayerOpacity {
    fn default() -> Self {
        Self {
            stars: 0.0,
            milky_way: 0.3,
            nebulae: 0.0,
        }
    }
}

/// Visibility and altitude of a scene group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    /// Whether the group is drawn
    pub visible: bool,
    /// Height of the group above the dome origin
    pub altitude: f64,
}

/// Full parameter set consumed by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Dome camera
    pub camera: CameraPose,
    /// Layer opacities
    pub layers: LayerOpacity,
    /// Solar system group
    pub solar_system: GroupState,
    /// Accumulated sun rotation (y, z)
    pub sun_rotation: [f64; 2],
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            camera: CameraPose::default(),
            layers: LayerOpacity::default(),
            solar_system: GroupState {
                visible: false,
                altitude: 2000.0,
            },
            sun_rotation: [0.0; 2],
        }
    }
}

/// Change produced by one scene handler for one step.
///
/// `Option` fields are absolute assignments; arrays of `f64` are increments
/// added to the persistent state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterDelta {
    /// Set every star layer's opacity
    pub star_opacity: Option<f64>,
    /// Set the Milky Way opacity
    pub milky_way_opacity: Option<f64>,
    /// Set the nebula opacity
    pub nebula_opacity: Option<f64>,
    /// Show or hide the solar system
    pub solar_system_visible: Option<bool>,
    /// Set the solar system altitude
    pub solar_system_altitude: Option<f64>,
    /// Absolute camera position per axis
    pub camera_position: [Option<f64>; 3],
    /// Camera translation increment
    pub camera_translate: [f64; 3],
    /// Camera rotation increment
    pub camera_rotate: [f64; 3],
    /// Sun rotation increment (y, z)
    pub sun_spin: [f64; 2],
}

impl ParameterDelta {
    /// Same assignments with every increment zeroed
    pub fn assignments_only(mut self) -> Self {
        self.camera_translate = [0.0; 3];
        self.camera_rotate = [0.0; 3];
        self.sun_spin = [0.0; 2];
        self
    }

    /// Add another delta's increments on top of this one
    pub fn add_increments(&mut self, other: &ParameterDelta) {
        for axis in 0..3 {
            self.camera_translate[axis] += other.camera_translate[axis];
            self.camera_rotate[axis] += other.camera_rotate[axis];
        }
        for axis in 0..2 {
            self.sun_spin[axis] += other.sun_spin[axis];
        }
    }
}

impl ParameterSet {
    /// Apply a delta: assignments overwrite, increments accumulate.
    pub fn apply(&mut self, delta: &ParameterDelta) {
        if let Some(opacity) = delta.star_opacity {
            self.layers.stars = opacity;
        }
        if let Some(opacity) = delta.milky_way_opacity {
            self.layers.milky_way = opacity;
        }
        if let Some(opacity) = delta.nebula_opacity {
            self.layers.nebulae = opacity;
        }
        if let Some(visible) = delta.solar_system_visible {
            self.solar_system.visible = visible;
        }
        if let Some(altitude) = delta.solar_system_altitude {
            self.solar_system.altitude = altitude;
        }

        for axis in 0..3 {
            if let Some(position) = delta.camera_position[axis] {
                self.camera.position[axis] = position;
            }
            self.camera.position[axis] += delta.camera_translate[axis];
            self.camera.rotation[axis] += delta.camera_rotate[axis];
        }

        self.sun_rotation[0] += delta.sun_spin[0];
        self.sun_rotation[1] += delta.sun_spin[1];
    }
}
