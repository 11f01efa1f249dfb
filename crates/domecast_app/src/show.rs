// SPDX-License-Identifier: MIT OR Apache-2.0
//! The frame loop.
//!
//! Each frame:
//! - Drains the sync link and applies received transport messages
//! - Applies pending operator commands (director only publishes)
//! - Steps the animation director up to the current show time
//! - Presents the parameter set and status to a [`FrameSink`]

use crate::config::ShowConfig;
use crate::error::ConfigError;
use crate::operator::{OperatorCommand, HELP};
use domecast_sequencer::{
    drive, AnimationDirector, CueSheet, FixedStepper, ParameterSet, ShowStatus,
};
use domecast_sync::TransportController;
use std::time::{Duration, Instant};

/// Receives every computed frame. Stands in for the renderer.
pub trait FrameSink {
    /// Present one frame
    fn present(&mut self, params: &ParameterSet, status: &ShowStatus);
}

/// Logs scene changes and narration cues, plus a periodic pose line
#[derive(Debug, Default)]
pub struct LogSink {
    last_scene: Option<usize>,
    last_cue: Option<String>,
    last_paused: bool,
    pose_every: u64,
    frames: u64,
}

impl LogSink {
    /// Log the camera pose every `pose_every` frames (0 disables)
    pub fn new(pose_every: u64) -> Self {
        Self {
            pose_every,
            ..Default::default()
        }
    }
}

impl FrameSink for LogSink {
    fn present(&mut self, params: &ParameterSet, status: &ShowStatus) {
        self.frames += 1;

        if self.last_scene != Some(status.scene_index) {
            tracing::info!(
                index = status.scene_index,
                timecode = %status.timecode,
                "Scene: {}",
                status.scene_name
            );
            self.last_scene = Some(status.scene_index);
        }

        if status.active_cue.is_some() && self.last_cue != status.active_cue {
            if let Some(cue) = &status.active_cue {
                tracing::info!(timecode = %status.timecode, "Cue: {cue}");
            }
            self.last_cue = status.active_cue.clone();
        }

        if status.paused != self.last_paused {
            tracing::info!(
                timecode = %status.timecode,
                paused = status.paused,
                "Playback state changed"
            );
            self.last_paused = status.paused;
        }

        if self.pose_every > 0 && self.frames % self.pose_every == 0 {
            let camera = &params.camera;
            tracing::debug!(
                timecode = %status.timecode,
                progress = status.progress,
                "camera pos=({:.2}, {:.2}, {:.2}) rot=({:.3}, {:.3}, {:.3}) stars={:.2}",
                camera.position[0],
                camera.position[1],
                camera.position[2],
                camera.rotation[0],
                camera.rotation[1],
                camera.rotation[2],
                params.layers.stars,
            );
        }
    }
}

/// Drives one show process
pub struct ShowRunner {
    transport: TransportController,
    director: AnimationDirector,
    stepper: FixedStepper,
    cues: CueSheet,
    frame_interval: Duration,
    frame_count: u64,
    quit: bool,
}

impl ShowRunner {
    /// Create a runner for an already validated config
    pub fn new(transport: TransportController, config: &ShowConfig) -> Result<Self, ConfigError> {
        let director = AnimationDirector::planetarium(transport.timeline(), config.motion)?;
        let stepper = FixedStepper::new(config.pacing)?;
        if !config.frame_rate.is_finite() || config.frame_rate <= 0.0 {
            return Err(ConfigError::FrameRate(config.frame_rate));
        }

        Ok(Self {
            transport,
            director,
            stepper,
            cues: CueSheet::new(config.cues.clone()),
            frame_interval: Duration::from_secs_f64(1.0 / config.frame_rate),
            frame_count: 0,
            quit: false,
        })
    }

    /// The transport, for operator actions
    pub fn transport_mut(&mut self) -> &mut TransportController {
        &mut self.transport
    }

    /// Current visual parameters
    pub fn params(&self) -> &ParameterSet {
        self.director.params()
    }

    /// Frames presented so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Whether a quit command was received
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Status at the current show time
    pub fn status(&self) -> ShowStatus {
        ShowStatus::capture(
            self.transport.timeline(),
            &self.cues,
            self.transport.elapsed(),
            self.transport.is_paused(),
        )
    }

    /// Apply one operator command
    pub fn handle(&mut self, command: OperatorCommand) {
        tracing::debug!(?command, "Operator command");
        match command {
            OperatorCommand::Start => {
                self.transport.start();
            }
            OperatorCommand::Pause => {
                self.transport.pause();
            }
            OperatorCommand::Resume => {
                self.transport.resume();
            }
            OperatorCommand::Toggle => self.transport.toggle(),
            OperatorCommand::Jump(index) => {
                self.transport.jump_to(index);
            }
            OperatorCommand::Volume(level) => self.transport.set_volume(level),
            OperatorCommand::Status => {
                let status = self.status();
                tracing::info!(
                    timecode = %status.timecode,
                    scene = %status.scene_name,
                    paused = status.paused,
                    held = status.held,
                    "Status"
                );
            }
            OperatorCommand::Help => {
                for line in HELP {
                    tracing::info!("{line}");
                }
            }
            OperatorCommand::Quit => self.quit = true,
        }
    }

    /// Run one frame
    pub fn tick(&mut self, sink: &mut dyn FrameSink) -> ShowStatus {
        self.transport.sync();

        let elapsed = self.transport.elapsed();
        if self.transport.is_running() {
            drive(
                &mut self.stepper,
                &mut self.director,
                self.transport.timeline(),
                elapsed,
            );
        }

        let status = ShowStatus::capture(
            self.transport.timeline(),
            &self.cues,
            elapsed,
            self.transport.is_paused(),
        );
        sink.present(self.params(), &status);
        self.frame_count += 1;
        status
    }

    /// Run frames at the configured rate until quit or `limit` wall time.
    ///
    /// `commands` is polled once per frame.
    pub fn run(
        &mut self,
        sink: &mut dyn FrameSink,
        mut commands: impl FnMut() -> Vec<OperatorCommand>,
        limit: Option<Duration>,
    ) {
        let started = Instant::now();
        tracing::info!(
            role = self.transport.role().name(),
            fps = 1.0 / self.frame_interval.as_secs_f64(),
            "Frame loop running"
        );

        while !self.should_quit() {
            let frame_start = Instant::now();

            for command in commands() {
                self.handle(command);
            }
            self.tick(sink);

            if limit.is_some_and(|limit| started.elapsed() >= limit) {
                tracing::info!("Duration limit reached");
                break;
            }

            if let Some(remaining) = self.frame_interval.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        tracing::info!(frames = self.frame_count, "Frame loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domecast_sequencer::{Clock, Cue, ManualClock, ShowTimeline};
    use domecast_sync::{LocalBus, Role, ShowContext, SyncLink};
    use std::sync::Arc;

    #[derive(Default)]
    struct CollectSink {
        frames: Vec<(ParameterSet, ShowStatus)>,
    }

    impl FrameSink for CollectSink {
        fn present(&mut self, params: &ParameterSet, status: &ShowStatus) {
            self.frames.push((*params, status.clone()));
        }
    }

    fn runner(
        role: Role,
        clock: &Arc<ManualClock>,
        link: Option<Box<dyn SyncLink>>,
        config: &ShowConfig,
    ) -> ShowRunner {
        let timeline = Arc::new(config.build_timeline().unwrap());
        let ctx = ShowContext::new(timeline, clock.clone() as Arc<dyn Clock>, role);
        let transport = TransportController::new(ctx, link, None);
        ShowRunner::new(transport, config).unwrap()
    }

    #[test]
    fn test_idle_show_does_not_move() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut show = runner(Role::Director, &clock, None, &ShowConfig::default());
        let mut sink = CollectSink::default();

        show.tick(&mut sink);
        clock.advance(5.0);
        show.tick(&mut sink);

        assert_eq!(sink.frames[0].0, sink.frames[1].0);
        assert_eq!(sink.frames[1].1.timecode, "00:00:00");
        assert_eq!(show.frame_count(), 2);
    }

    #[test]
    fn test_program_mirrors_director() {
        let config = ShowConfig::default();
        let bus = LocalBus::new();
        let director_clock = Arc::new(ManualClock::new(100.0));
        let program_clock = Arc::new(ManualClock::new(100.0));
        let mut director = runner(
            Role::Director,
            &director_clock,
            Some(Box::new(bus.endpoint())),
            &config,
        );
        let mut program = runner(
            Role::Program,
            &program_clock,
            Some(Box::new(bus.endpoint())),
            &config,
        );

        director.handle(OperatorCommand::Start);

        // The displays refresh at different rates
        let mut director_sink = CollectSink::default();
        let mut program_sink = CollectSink::default();
        for frame in 1..=300 {
            director_clock.set(100.0 + frame as f64 / 60.0);
            director.tick(&mut director_sink);
        }
        for frame in 1..=720 {
            program_clock.set(100.0 + frame as f64 / 144.0);
            program.tick(&mut program_sink);
        }

        assert_eq!(director.params(), program.params());
        let status = program.status();
        assert_eq!(status.scene_index, 0);
        assert_eq!(status.timecode, "00:05:00");
    }

    #[test]
    fn test_pause_freezes_pose() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut show = runner(Role::Director, &clock, None, &ShowConfig::default());
        let mut sink = CollectSink::default();

        show.handle(OperatorCommand::Toggle);
        clock.set(3.0);
        show.tick(&mut sink);
        show.handle(OperatorCommand::Toggle);
        let frozen = *show.params();

        clock.set(9.0);
        let status = show.tick(&mut sink);
        assert!(status.paused);
        assert_eq!(show.params(), &frozen);
        assert_eq!(status.timecode, "00:03:00");
    }

    #[test]
    fn test_overflow_holds_final_scene() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut show = runner(Role::Director, &clock, None, &ShowConfig::default());
        let mut sink = CollectSink::default();

        show.handle(OperatorCommand::Jump(6));
        clock.set(5.9);
        show.tick(&mut sink);
        clock.set(7.0);
        let status = show.tick(&mut sink);
        assert!(status.held);
        assert_eq!(status.scene_index, 6);
        assert_eq!(status.progress, 1.0);

        let held = *show.params();
        clock.set(8.0);
        show.tick(&mut sink);
        assert_eq!(show.params(), &held);
    }

    #[test]
    fn test_cues_follow_show_time() {
        let config = ShowConfig {
            cues: vec![
                Cue {
                    start: 0.0,
                    text: "Darkness.".to_string(),
                },
                Cue {
                    start: 10.0,
                    text: "Silence.".to_string(),
                },
            ],
            ..Default::default()
        };
        let clock = Arc::new(ManualClock::new(0.0));
        let mut show = runner(Role::Director, &clock, None, &config);
        let mut sink = CollectSink::default();

        show.handle(OperatorCommand::Start);
        clock.set(10.5);
        let status = show.tick(&mut sink);
        assert_eq!(status.active_cue.as_deref(), Some("Silence."));
        assert_eq!(status.scene_name, "The Great Silence");
    }

    #[test]
    fn test_quit_command() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut show = runner(Role::Director, &clock, None, &ShowConfig::default());
        let mut sink = LogSink::new(0);

        let mut pending = vec![OperatorCommand::Help, OperatorCommand::Quit];
        show.run(&mut sink, move || std::mem::take(&mut pending), None);
        assert!(show.should_quit());
        assert_eq!(show.frame_count(), 1);
    }

    #[test]
    fn test_duration_limit_stops_loop() {
        let clock = Arc::new(ManualClock::new(0.0));
        let mut show = runner(Role::Program, &clock, None, &ShowConfig::default());
        let mut sink = LogSink::new(1);

        show.run(&mut sink, Vec::new, Some(Duration::ZERO));
        assert_eq!(show.frame_count(), 1);
        assert!(!show.should_quit());
    }
}
