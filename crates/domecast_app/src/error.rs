// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application errors.

use domecast_sequencer::{DirectorError, TimelineError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a show file. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("failed to access show file {path:?}: {source}")]
    Io {
        /// Show file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid RON for a show
    #[error("failed to parse show file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The config could not be written as RON
    #[error("failed to serialize show file: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer version
    #[error("show file version {found} is newer than supported version {supported}")]
    Version {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// Invalid scene list
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// Invalid director or pacing settings
    #[error(transparent)]
    Director(#[from] DirectorError),

    /// Frame rate is not a positive number
    #[error("frame rate must be positive, got {0}")]
    FrameRate(f64),

    /// Volume outside `[0, 1]`
    #[error("volume must be between 0 and 1, got {0}")]
    Volume(f32),
}

/// Top-level application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad show file
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
