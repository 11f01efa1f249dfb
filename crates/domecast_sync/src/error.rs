// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sync link errors.

use thiserror::Error;

/// Errors raised by sync links.
///
/// None of these stop a show: the transport logs them and carries on.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Socket setup or send failure
    #[error("sync I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A message could not be encoded or decoded
    #[error("sync codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The link has no peers left to deliver to
    #[error("sync link is closed")]
    Closed,
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
