// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for timeline and director construction.

use thiserror::Error;

/// Errors raised while building a show timeline.
///
/// All of these are fatal: a show never starts scheduling with a bad timeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// The timeline has no scenes
    #[error("show timeline is empty")]
    Empty,

    /// A scene has a zero, negative or non-finite duration
    #[error("scene {index} ({name:?}) has invalid duration {duration}")]
    InvalidDuration {
        /// Position of the scene in the timeline
        index: usize,
        /// Scene name
        name: String,
        /// The rejected duration in seconds
        duration: f64,
    },
}

/// Errors raised while building an animation director.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectorError {
    /// The handler table does not cover the timeline one-to-one
    #[error("timeline has {scenes} scenes but {handlers} scene handlers were supplied")]
    HandlerMismatch {
        /// Number of scenes in the timeline
        scenes: usize,
        /// Number of handlers in the table
        handlers: usize,
    },

    /// The fixed step rate is not usable
    #[error("step rate must be positive, got {0}")]
    InvalidStepRate(f64),
}

/// Result type for timeline construction
pub type Result<T> = std::result::Result<T, TimelineError>;
