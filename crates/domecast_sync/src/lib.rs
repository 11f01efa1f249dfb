// SPDX-License-Identifier: MIT OR Apache-2.0
//! Director/program synchronization for domecast.
//!
//! One director process takes operator input and plays the soundtrack. Any
//! number of program processes mirror it on their own displays. They share
//! nothing but transport messages and the host wall clock:
//!
//! - `start` carries the director's epoch, so message latency never shifts
//!   show time
//! - `jump` is rebuilt from each receiver's own `now`
//! - every handler is idempotent, so duplicates are harmless
//!
//! Delivery is best effort. A lost message leaves a program out of step
//! until the next one arrives.

pub mod audio;
pub mod error;
pub mod link;
pub mod message;
pub mod transport;

pub use audio::{AudioLog, AudioOutput, RecordingAudio};
pub use error::{Result, SyncError};
pub use link::{BusEndpoint, EndpointId, LocalBus, SyncLink, UdpLink, UdpLinkConfig};
pub use message::SyncMessage;
pub use transport::{Role, ShowContext, TransportController};
