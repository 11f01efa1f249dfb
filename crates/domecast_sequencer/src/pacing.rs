// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-step pacing.
//!
//! Display refresh rates differ between the dome and the control monitor, so
//! the director is never stepped once per frame. Instead elapsed show time is
//! divided into nominal steps and each frame applies however many steps have
//! come due. Both processes therefore integrate the same increments.

use crate::director::AnimationDirector;
use crate::error::DirectorError;
use crate::timeline::ShowTimeline;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Step rate settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Nominal steps per show second
    pub step_hz: f64,
    /// Largest gap replayed step by step; bigger jumps re-base instead
    pub max_catch_up: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            step_hz: 60.0,
            max_catch_up: 240,
        }
    }
}

/// Converts elapsed show time into nominal step indices
#[derive(Debug, Clone)]
pub struct FixedStepper {
    step: f64,
    max_catch_up: u64,
    applied: u64,
}

impl FixedStepper {
    /// Create a stepper
    pub fn new(config: PacingConfig) -> Result<Self, DirectorError> {
        if !config.step_hz.is_finite() || config.step_hz <= 0.0 {
            return Err(DirectorError::InvalidStepRate(config.step_hz));
        }

        Ok(Self {
            step: 1.0 / config.step_hz,
            max_catch_up: config.max_catch_up.max(1),
            applied: 0,
        })
    }

    /// Seconds per step
    pub fn step_seconds(&self) -> f64 {
        self.step
    }

    /// Number of steps applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Show time at which step `index` is evaluated
    pub fn time_of(&self, index: u64) -> f64 {
        index as f64 * self.step
    }

    /// Steps that have come due by `elapsed`, marking them applied.
    ///
    /// Moving backwards, or leaping further than `max_catch_up`, re-bases the
    /// stepper so only the latest step is returned.
    pub fn due(&mut self, elapsed: f64) -> Range<u64> {
        let target = (elapsed.max(0.0) / self.step).floor() as u64;

        if target < self.applied || target - self.applied > self.max_catch_up {
            tracing::debug!(
                from = self.applied,
                to = target,
                "Re-basing fixed stepper"
            );
            let start = target.saturating_sub(1);
            self.applied = target;
            return start..target;
        }

        let due = self.applied..target;
        self.applied = target;
        due
    }

    /// Forget progress
    pub fn reset(&mut self) {
        self.applied = 0;
    }
}

/// Step a director up to `elapsed`, returning the number of steps applied.
pub fn drive(
    stepper: &mut FixedStepper,
    director: &mut AnimationDirector,
    timeline: &ShowTimeline,
    elapsed: f64,
) -> usize {
    let due = stepper.due(elapsed);
    let count = (due.end - due.start) as usize;

    for index in due {
        let time = stepper.time_of(index);
        let cursor = timeline.resolve(time).or_hold(timeline);
        director.step(&cursor, time);
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::MotionConfig;

    fn stepper() -> FixedStepper {
        FixedStepper::new(PacingConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_bad_rate() {
        let config = PacingConfig {
            step_hz: 0.0,
            ..PacingConfig::default()
        };
        assert!(FixedStepper::new(config).is_err());
    }

    #[test]
    fn test_due_counts_whole_steps() {
        let mut stepper = stepper();
        assert_eq!(stepper.due(0.0), 0..0);
        assert_eq!(stepper.due(0.5), 0..30);
        assert_eq!(stepper.due(0.5), 30..30);
        assert_eq!(stepper.due(1.0), 30..60);
    }

    #[test]
    fn test_large_jump_rebases() {
        let mut stepper = stepper();
        stepper.due(1.0);
        assert_eq!(stepper.due(75.0), 4499..4500);
        assert_eq!(stepper.due(10.0), 599..600);
        assert_eq!(stepper.applied(), 600);
    }

    #[test]
    fn test_refresh_rate_does_not_change_trajectory() {
        let timeline = ShowTimeline::planetarium();
        let mut slow = AnimationDirector::planetarium(&timeline, MotionConfig::default()).unwrap();
        let mut fast = slow.clone();
        let mut slow_steps = stepper();
        let mut fast_steps = stepper();

        // 30 Hz and 144 Hz displays over the first twelve seconds
        let mut t = 0.0;
        while t <= 12.0 {
            drive(&mut slow_steps, &mut slow, &timeline, t);
            t += 1.0 / 30.0;
        }
        let mut t = 0.0;
        while t <= 12.0 {
            drive(&mut fast_steps, &mut fast, &timeline, t);
            t += 1.0 / 144.0;
        }
        drive(&mut slow_steps, &mut slow, &timeline, 12.0);
        drive(&mut fast_steps, &mut fast, &timeline, 12.0);

        assert_eq!(slow_steps.applied(), fast_steps.applied());
        assert_eq!(slow.params(), fast.params());
    }
}
