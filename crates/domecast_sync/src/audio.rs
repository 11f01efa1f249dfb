// SPDX-License-Identifier: MIT OR Apache-2.0
//! Soundtrack collaborator driven alongside the show clock.

use parking_lot::Mutex;
use std::sync::Arc;

/// Audio output the transport drives.
///
/// Buffering and decoding belong to the implementation. A track that is not
/// loaded yet must turn every call into a no-op. Not `Send`: device streams
/// usually live on the thread that opened them.
pub trait AudioOutput {
    /// Whether a track is loaded and ready
    fn is_loaded(&self) -> bool;

    /// Play from `offset` seconds into the track
    fn play(&mut self, offset: f64);

    /// Pause playback
    fn pause(&mut self);

    /// Set output level in `[0, 1]`
    fn set_volume(&mut self, level: f32);
}

/// Calls observed by a [`RecordingAudio`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioLog {
    /// Offsets passed to `play`
    pub plays: Vec<f64>,
    /// Number of `pause` calls
    pub pauses: usize,
    /// Last volume set
    pub volume: Option<f32>,
}

/// Audio output that records calls instead of making sound.
///
/// Clones share one log, so a caller can keep a handle after boxing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    loaded: bool,
    log: Arc<Mutex<AudioLog>>,
}

impl RecordingAudio {
    /// A recorder reporting whether a track is loaded
    pub fn new(loaded: bool) -> Self {
        Self {
            loaded,
            log: Arc::default(),
        }
    }

    /// Snapshot of the calls so far
    pub fn log(&self) -> AudioLog {
        self.log.lock().clone()
    }
}

impl AudioOutput for RecordingAudio {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn play(&mut self, offset: f64) {
        self.log.lock().plays.push(offset);
    }

    fn pause(&mut self) {
        self.log.lock().pauses += 1;
    }

    fn set_volume(&mut self, level: f32) {
        self.log.lock().volume = Some(level.clamp(0.0, 1.0));
    }
}
