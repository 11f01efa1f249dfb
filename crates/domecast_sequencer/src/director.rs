// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-scene animation dispatch.
//!
//! The director owns the [`ParameterSet`] and is its only writer. Each step
//! looks up the handler for the cursor's scene, adds the show-wide drift and
//! integrates the result. Two directors fed the same steps end up with the
//! same parameters.

use crate::error::DirectorError;
use crate::params::{ParameterDelta, ParameterSet};
use crate::scenes::{MotionConfig, SceneFrame, SceneHandler, PLANETARIUM};
use crate::timeline::{SceneCursor, ShowTimeline};

/// Dispatches scenes to handlers and integrates their output
#[derive(Debug, Clone)]
pub struct AnimationDirector {
    durations: Vec<f64>,
    handlers: Vec<SceneHandler>,
    motion: MotionConfig,
    params: ParameterSet,
}

impl AnimationDirector {
    /// Create a director with one handler per timeline scene.
    pub fn new(
        timeline: &ShowTimeline,
        handlers: Vec<SceneHandler>,
        motion: MotionConfig,
    ) -> Result<Self, DirectorError> {
        if handlers.len() != timeline.len() {
            return Err(DirectorError::HandlerMismatch {
                scenes: timeline.len(),
                handlers: handlers.len(),
            });
        }

        Ok(Self {
            durations: timeline.scenes().iter().map(|s| s.duration).collect(),
            handlers,
            motion,
            params: ParameterSet::default(),
        })
    }

    /// Create a director running the planetarium scene table
    pub fn planetarium(
        timeline: &ShowTimeline,
        motion: MotionConfig,
    ) -> Result<Self, DirectorError> {
        Self::new(timeline, PLANETARIUM.to_vec(), motion)
    }

    /// Current parameters
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Motion constants
    pub fn motion(&self) -> MotionConfig {
        self.motion
    }

    /// Drop all accumulated state
    pub fn reset(&mut self) {
        self.params = ParameterSet::default();
    }

    /// Compute the delta for one step without applying it.
    ///
    /// A held cursor yields only the final scene's assignments, so the pose
    /// stops moving once the show has run out.
    pub fn compute(&self, cursor: &SceneCursor, global_time: f64) -> ParameterDelta {
        let (Some(handler), Some(&duration)) =
            (self.handlers.get(cursor.index), self.durations.get(cursor.index))
        else {
            tracing::debug!(index = cursor.index, "No handler for scene");
            return ParameterDelta::default();
        };

        let frame = SceneFrame {
            local_time: cursor.local_time,
            progress: cursor.progress,
            global_time,
            duration,
            motion: self.motion,
        };

        let mut delta = handler(&frame);
        if cursor.held {
            return delta.assignments_only();
        }

        delta.add_increments(&self.global_drift(global_time));
        delta
    }

    /// Advance one nominal step and return the new parameters.
    pub fn step(&mut self, cursor: &SceneCursor, global_time: f64) -> &ParameterSet {
        let delta = self.compute(cursor, global_time);
        self.params.apply(&delta);
        &self.params
    }

    /// Slow dome-wide rotation, handheld jitter and sun spin
    fn global_drift(&self, global_time: f64) -> ParameterDelta {
        let speed = self.motion.rotation_speed;
        let g = global_time;

        ParameterDelta {
            camera_rotate: [
                speed * 0.3 + (g * 1.2).sin() * 0.003,
                speed * 0.6 + (g * 0.5).sin() * 0.001,
                (g * 1.1).cos() * 0.002,
            ],
            sun_spin: [0.002, 0.001],
            ..ParameterDelta::default()
        }
    }
}
