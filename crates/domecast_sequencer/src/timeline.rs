// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show timeline and scene resolution.
//!
//! A show is an ordered, immutable list of named scenes. Scene `i` owns the
//! half-open interval `[offset_of(i), offset_of(i) + duration)`, so a tick
//! landing exactly on a boundary belongs to the next scene.

use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};

/// Largest `f64` below 1.0
const PROGRESS_MAX: f64 = 1.0 - f64::EPSILON / 2.0;

/// A named scene and how long it runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    /// Display name of the scene
    pub name: String,
    /// Duration in seconds, strictly positive
    pub duration: f64,
}

impl SceneSpec {
    /// Create a scene spec
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Where the show currently is, derived from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCursor {
    /// Index of the active scene
    pub index: usize,
    /// Seconds since the start of the active scene
    pub local_time: f64,
    /// `local_time / duration`, in `[0, 1)` for a live cursor and `1.0` when held
    pub progress: f64,
    /// True when the show has run past its end and the last pose is held
    pub held: bool,
}

/// Outcome of resolving an elapsed time against the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Elapsed time falls inside a scene
    Scene(SceneCursor),
    /// Elapsed time is at or beyond the end of the show
    Overflow,
}

impl Resolution {
    /// The live cursor, if any
    pub fn cursor(&self) -> Option<SceneCursor> {
        match self {
            Resolution::Scene(cursor) => Some(*cursor),
            Resolution::Overflow => None,
        }
    }

    /// Map an overflow onto the end-of-scene pose of the final scene.
    pub fn or_hold(self, timeline: &ShowTimeline) -> SceneCursor {
        match self {
            Resolution::Scene(cursor) => cursor,
            Resolution::Overflow => {
                let index = timeline.len() - 1;
                SceneCursor {
                    index,
                    local_time: timeline.scenes[index].duration,
                    progress: 1.0,
                    held: true,
                }
            }
        }
    }

    /// Whether the show has run out
    pub fn is_overflow(&self) -> bool {
        matches!(self, Resolution::Overflow)
    }
}

/// Ordered list of scenes, validated once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowTimeline {
    scenes: Vec<SceneSpec>,
    total: f64,
}

impl ShowTimeline {
    /// Build a timeline, rejecting empty lists and non-positive durations.
    pub fn new(scenes: Vec<SceneSpec>) -> Result<Self> {
        if scenes.is_empty() {
            return Err(TimelineError::Empty);
        }

        for (index, scene) in scenes.iter().enumerate() {
            if !scene.duration.is_finite() || scene.duration <= 0.0 {
                return Err(TimelineError::InvalidDuration {
                    index,
                    name: scene.name.clone(),
                    duration: scene.duration,
                });
            }
        }

        let total = scenes.iter().map(|s| s.duration).sum();
        Ok(Self { scenes, total })
    }

    /// The seven scene planetarium show
    pub fn planetarium() -> Self {
        let scenes = planetarium_scenes();
        let total = scenes.iter().map(|s| s.duration).sum();
        Self { scenes, total }
    }

    /// Number of scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Get a scene by index
    pub fn scene(&self, index: usize) -> Option<&SceneSpec> {
        self.scenes.get(index)
    }

    /// All scenes in order
    pub fn scenes(&self) -> &[SceneSpec] {
        &self.scenes
    }

    /// Sum of all scene durations
    pub fn total_duration(&self) -> f64 {
        self.total
    }

    /// Clamp a scene index into range
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.scenes.len() - 1)
    }

    /// Cumulative duration of every scene strictly before `index`.
    ///
    /// Out-of-range indices are clamped to the last scene.
    pub fn offset_of(&self, index: usize) -> f64 {
        let index = self.clamp_index(index);
        self.scenes[..index].iter().map(|s| s.duration).sum()
    }

    /// Resolve elapsed show time to a scene cursor.
    pub fn resolve(&self, elapsed: f64) -> Resolution {
        // NaN and pre-roll both sit at the top of the show
        let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };

        let mut cumulative = 0.0;
        for (index, scene) in self.scenes.iter().enumerate() {
            // Rounding can put a boundary tick a hair either side; it still
            // belongs to the next scene at local time zero
            let local_time = (elapsed - cumulative).max(0.0);
            if local_time < scene.duration {
                return Resolution::Scene(SceneCursor {
                    index,
                    local_time,
                    progress: (local_time / scene.duration).min(PROGRESS_MAX),
                    held: false,
                });
            }
            cumulative += scene.duration;
        }

        Resolution::Overflow
    }
}

fn planetarium_scenes() -> Vec<SceneSpec> {
    vec![
        SceneSpec::new("Emergence", 10.0),
        SceneSpec::new("The Great Silence", 35.0),
        SceneSpec::new("Celestial Structures", 30.0),
        SceneSpec::new("Systems of Light", 40.0),
        SceneSpec::new("Transcendence", 30.0),
        SceneSpec::new("Infinite Scale", 10.0),
        SceneSpec::new("Stardust Memory", 6.0),
    ]
}

impl Default for ShowTimeline {
    fn default() -> Self {
        Self::planetarium()
    }
}
