// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport-control messages exchanged between director and program.
//!
//! On the wire a message is a JSON object `{"type": ..., "payload": ...}`.
//! `start` carries the director's epoch and `jump` carries a scene index;
//! `pause` and `resume` have no payload.

use crate::error::Result;
use domecast_sequencer::Timestamp;
use serde::{Deserialize, Serialize};

/// A transport action. Ephemeral, never acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum SyncMessage {
    /// Start the show at the sender's epoch
    Start {
        /// Wall time at which elapsed show time was zero
        epoch: Timestamp,
    },
    /// Freeze show time
    Pause,
    /// Unfreeze show time
    Resume,
    /// Seek to the start of a scene
    Jump {
        /// Target scene index
        index: usize,
    },
}

impl SyncMessage {
    /// Short name matching the wire `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::Start { .. } => "start",
            SyncMessage::Pause => "pause",
            SyncMessage::Resume => "resume",
            SyncMessage::Jump { .. } => "jump",
        }
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from wire bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
