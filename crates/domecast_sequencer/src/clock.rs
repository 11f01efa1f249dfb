// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall clocks and the show clock.
//!
//! [`TimelineClock`] turns an epoch plus pause history into elapsed show
//! time. It never reads a clock itself; callers pass `now` in, usually from
//! a [`Clock`] held by the transport.

use crate::timeline::ShowTimeline;
use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the UNIX epoch
pub type Timestamp = f64;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time in seconds
    fn now(&self) -> Timestamp;
}

/// System wall clock. Every process on a host shares its time base.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock reading `now`
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Set the current time
    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now;
    }

    /// Move the clock forward
    pub fn advance(&self, seconds: f64) {
        *self.now.lock() += seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// Snapshot of the show clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClockState {
    /// Wall time at which elapsed was `epoch_offset`; `None` until started
    pub epoch_start: Option<Timestamp>,
    /// Show time at `epoch_start`; zero after `start`, the scene offset after a seek
    pub epoch_offset: f64,
    /// Whether show time is frozen
    pub paused: bool,
    /// When the current pause began
    pub pause_started_at: Option<Timestamp>,
    /// Total seconds spent paused since the epoch
    pub pause_accumulated: f64,
}

/// Elapsed-time bookkeeping for a single show.
#[derive(Debug, Clone, Default)]
pub struct TimelineClock {
    state: ClockState,
}

impl TimelineClock {
    /// Create an unstarted clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock has an epoch
    pub fn is_started(&self) -> bool {
        self.state.epoch_start.is_some()
    }

    /// Whether show time is frozen
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Started and not paused
    pub fn is_running(&self) -> bool {
        self.is_started() && !self.is_paused()
    }

    /// Start the show with the given epoch.
    ///
    /// No-op if already started, including while paused. Returns whether the
    /// clock changed.
    pub fn start(&mut self, epoch: Timestamp) -> bool {
        if self.is_started() {
            return false;
        }

        self.state = ClockState {
            epoch_start: Some(epoch),
            ..ClockState::default()
        };
        true
    }

    /// Freeze show time. No-op if already paused or not started.
    pub fn pause(&mut self, now: Timestamp) -> bool {
        if self.state.paused || !self.is_started() {
            return false;
        }

        self.state.paused = true;
        self.state.pause_started_at = Some(now);
        true
    }

    /// Unfreeze show time. No-op if not paused.
    pub fn resume(&mut self, now: Timestamp) -> bool {
        if !self.state.paused {
            return false;
        }

        if let Some(started) = self.state.pause_started_at.take() {
            self.state.pause_accumulated += (now - started).max(0.0);
        }
        self.state.paused = false;
        true
    }

    /// Seek to the start of a scene, clearing all pause state.
    ///
    /// `offset` is the cumulative duration of the scenes before the target.
    /// Because the epoch is rebuilt from the local `now`, the result does not
    /// depend on when the instruction was issued.
    /// The offset is stored apart from the wall-clock anchor so `elapsed(now)`
    /// reads it back exactly, even with epoch-sized timestamps.
    pub fn seek(&mut self, offset: f64, now: Timestamp) {
        self.state = ClockState {
            epoch_start: Some(now),
            epoch_offset: offset,
            ..ClockState::default()
        };
    }

    /// Jump to the start of scene `index`, returning the scene actually used.
    ///
    /// An out-of-range index is clamped to the last scene and logged.
    pub fn jump_to(&mut self, index: usize, timeline: &ShowTimeline, now: Timestamp) -> usize {
        let target = timeline.clamp_index(index);
        if target != index {
            tracing::warn!(
                requested = index,
                clamped = target,
                "Scene index out of range, clamping"
            );
        }
        self.seek(timeline.offset_of(target), now);
        target
    }

    /// Elapsed show seconds at `now`. Never negative, frozen while paused.
    pub fn elapsed(&self, now: Timestamp) -> f64 {
        let Some(epoch) = self.state.epoch_start else {
            return 0.0;
        };

        let frozen = match (self.state.paused, self.state.pause_started_at) {
            (true, Some(started)) => (now - started).max(0.0),
            _ => 0.0,
        };

        let wall = (now - epoch) - self.state.pause_accumulated - frozen;
        (self.state.epoch_offset + wall).max(0.0)
    }
}
