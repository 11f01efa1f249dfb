// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operator-facing show status: timecode, overall progress and narration cues.

use crate::timeline::{Resolution, ShowTimeline};
use serde::{Deserialize, Serialize};

/// A narration line that becomes active at `start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Show time in seconds
    pub start: f64,
    /// Script text
    pub text: String,
}

/// Narration cues sorted by start time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueSheet {
    cues: Vec<Cue>,
}

impl CueSheet {
    /// Build a cue sheet; cues are sorted by start time
    pub fn new(mut cues: Vec<Cue>) -> Self {
        cues.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { cues }
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether there are no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Last cue that has started, or the first cue before any has.
    pub fn active(&self, elapsed: f64) -> Option<&Cue> {
        self.cues
            .iter()
            .rfind(|c| c.start <= elapsed)
            .or_else(|| self.cues.first())
    }
}

/// Format elapsed seconds as `MM:SS:CC`
pub fn format_timecode(elapsed: f64) -> String {
    let elapsed = elapsed.max(0.0);
    let minutes = (elapsed / 60.0).floor() as u64;
    let seconds = (elapsed % 60.0).floor() as u64;
    let centis = ((elapsed % 1.0) * 100.0).floor() as u64;
    format!("{:02}:{:02}:{:02}", minutes, seconds, centis)
}

/// Snapshot of where the show is, for the control monitor
#[derive(Debug, Clone, PartialEq)]
pub struct ShowStatus {
    /// Elapsed show seconds
    pub elapsed: f64,
    /// `MM:SS:CC`
    pub timecode: String,
    /// Fraction of the whole show, clamped to 1
    pub progress: f64,
    /// Active scene
    pub scene_index: usize,
    /// Active scene name
    pub scene_name: String,
    /// Whether the final pose is being held
    pub held: bool,
    /// Whether show time is frozen
    pub paused: bool,
    /// Current narration line
    pub active_cue: Option<String>,
}

impl ShowStatus {
    /// Capture the status at `elapsed`
    pub fn capture(timeline: &ShowTimeline, cues: &CueSheet, elapsed: f64, paused: bool) -> Self {
        let cursor = timeline.resolve(elapsed).or_hold(timeline);
        let scene_name = timeline
            .scene(cursor.index)
            .map(|s| s.name.clone())
            .unwrap_or_default();

        Self {
            elapsed,
            timecode: format_timecode(elapsed),
            progress: (elapsed / timeline.total_duration()).min(1.0),
            scene_index: cursor.index,
            scene_name,
            held: matches!(timeline.resolve(elapsed), Resolution::Overflow),
            paused,
            active_cue: cues.active(elapsed).map(|c| c.text.clone()),
        }
    }
}
