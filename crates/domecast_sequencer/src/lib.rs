// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show timeline and scene animation for domecast.
//!
//! This crate provides the deterministic half of a dome show:
//! - Show clock with pause history and exact scene seeking
//! - Scene resolution over an immutable timeline
//! - Per-scene animation handlers with their own easing curves
//! - Fixed-step pacing so every display integrates the same motion
//! - Operator status (timecode, progress, narration cues)
//!
//! ## Architecture
//!
//! Nothing here reads a clock or touches I/O. Time comes in as an argument
//! (or through the [`Clock`] trait), so two processes fed the same show time
//! compute the same [`ParameterSet`].

pub mod clock;
pub mod director;
pub mod easing;
pub mod error;
pub mod pacing;
pub mod params;
pub mod scenes;
pub mod status;
pub mod timeline;

pub use clock::{Clock, ClockState, ManualClock, SystemClock, TimelineClock, Timestamp};
pub use director::AnimationDirector;
pub use easing::Easing;
pub use error::{DirectorError, TimelineError};
pub use pacing::{drive, FixedStepper, PacingConfig};
pub use params::{CameraPose, GroupState, LayerOpacity, ParameterDelta, ParameterSet};
pub use scenes::{MotionConfig, SceneFrame, SceneHandler, PLANETARIUM};
pub use status::{format_timecode, Cue, CueSheet, ShowStatus};
pub use timeline::{Resolution, SceneCursor, SceneSpec, ShowTimeline};
