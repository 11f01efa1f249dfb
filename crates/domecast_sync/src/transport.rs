// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport control: the single entry point for start, pause, resume and seek.
//!
//! A director mutates its own clock and then publishes the matching
//! [`SyncMessage`]. A program applies what it receives and never publishes.
//! Every inbound handler is idempotent, so duplicated messages are harmless.

use crate::audio::AudioOutput;
use crate::link::SyncLink;
use crate::message::SyncMessage;
use domecast_sequencer::{Clock, ClockState, Resolution, ShowTimeline, TimelineClock, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which side of the sync protocol this process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Authoritative; takes operator input and publishes it
    #[default]
    Director,
    /// Follower; mirrors the director
    Program,
}

impl Role {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Role::Director => "DIRECTOR",
            Role::Program => "PROGRAM",
        }
    }
}

/// Everything a transport needs to know about the show it runs
#[derive(Clone)]
pub struct ShowContext {
    /// The show's scenes
    pub timeline: Arc<ShowTimeline>,
    /// Wall clock
    pub clock: Arc<dyn Clock>,
    /// Protocol role
    pub role: Role,
}

impl ShowContext {
    /// Create a context
    pub fn new(timeline: Arc<ShowTimeline>, clock: Arc<dyn Clock>, role: Role) -> Self {
        Self {
            timeline,
            clock,
            role,
        }
    }
}

/// Where an action came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Local,
    Remote,
}

/// Owns the show clock and keeps it in step with the other processes.
pub struct TransportController {
    ctx: ShowContext,
    clock: TimelineClock,
    link: Option<Box<dyn SyncLink>>,
    audio: Option<Box<dyn AudioOutput>>,
    volume: f32,
}

impl TransportController {
    /// Create a controller.
    ///
    /// Without a link the controller runs standalone on local actions only.
    pub fn new(
        ctx: ShowContext,
        link: Option<Box<dyn SyncLink>>,
        audio: Option<Box<dyn AudioOutput>>,
    ) -> Self {
        if link.is_none() {
            tracing::info!(role = ctx.role.name(), "No sync link, running standalone");
        }

        let mut transport = Self {
            ctx,
            clock: TimelineClock::new(),
            link,
            audio: None,
            volume: 0.4,
        };
        if let Some(audio) = audio {
            transport.attach_audio(audio);
        }
        transport
    }

    /// Protocol role
    pub fn role(&self) -> Role {
        self.ctx.role
    }

    /// Show context
    pub fn context(&self) -> &ShowContext {
        &self.ctx
    }

    /// The show's timeline
    pub fn timeline(&self) -> &ShowTimeline {
        &self.ctx.timeline
    }

    /// Snapshot of the show clock
    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    /// Whether the show has started
    pub fn is_started(&self) -> bool {
        self.clock.is_started()
    }

    /// Whether show time is frozen
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Started and not paused
    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Whether a sync link is attached
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// Elapsed show seconds now
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed(self.now())
    }

    /// Resolve the current scene
    pub fn resolve(&self) -> Resolution {
        self.ctx.timeline.resolve(self.elapsed())
    }

    /// Start the show now. No-op if already started.
    pub fn start(&mut self) -> bool {
        let epoch = self.now();
        self.start_at(epoch, Origin::Local)
    }

    /// Freeze show time
    pub fn pause(&mut self) -> bool {
        self.pause_from(Origin::Local)
    }

    /// Unfreeze show time
    pub fn resume(&mut self) -> bool {
        self.resume_from(Origin::Local)
    }

    /// Master button: start when idle, otherwise pause or resume.
    pub fn toggle(&mut self) {
        if !self.is_started() {
            self.start();
        } else if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Seek to the start of a scene, returning the scene actually used
    pub fn jump_to(&mut self, index: usize) -> usize {
        self.jump_from(index, Origin::Local)
    }

    /// Apply a message received from another process.
    ///
    /// Only programs follow; a director logs and ignores inbound traffic.
    pub fn apply(&mut self, message: SyncMessage) {
        if self.ctx.role == Role::Director {
            tracing::debug!(kind = message.kind(), "Director ignoring inbound sync message");
            return;
        }

        tracing::debug!(?message, "Applying sync message");
        match message {
            SyncMessage::Start { epoch } => {
                self.start_at(epoch, Origin::Remote);
            }
            SyncMessage::Pause => {
                self.pause_from(Origin::Remote);
            }
            SyncMessage::Resume => {
                self.resume_from(Origin::Remote);
            }
            SyncMessage::Jump { index } => {
                self.jump_from(index, Origin::Remote);
            }
        }
    }

    /// Drain the link and apply everything received. Returns the message count.
    pub fn sync(&mut self) -> usize {
        let Some(link) = self.link.as_mut() else {
            return 0;
        };

        let messages = link.receive();
        let count = messages.len();
        for message in messages {
            self.apply(message);
        }
        count
    }

    /// Attach or replace the audio output, e.g. once a track finishes loading
    pub fn attach_audio(&mut self, audio: Box<dyn AudioOutput>) {
        self.audio = Some(audio);
        self.apply_volume();

        if self.is_running() {
            let offset = self.elapsed();
            self.with_audio(|audio| audio.play(offset));
        }
    }

    /// Set the soundtrack level. Programs stay silent.
    pub fn set_volume(&mut self, level: f32) {
        self.volume = level.clamp(0.0, 1.0);
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        let volume = self.effective_volume();
        if let Some(audio) = self.audio.as_deref_mut() {
            if audio.is_loaded() {
                audio.set_volume(volume);
            }
        }
    }

    fn now(&self) -> Timestamp {
        self.ctx.clock.now()
    }

    fn effective_volume(&self) -> f32 {
        match self.ctx.role {
            Role::Director => self.volume,
            Role::Program => 0.0,
        }
    }

    fn start_at(&mut self, epoch: Timestamp, origin: Origin) -> bool {
        if !self.clock.start(epoch) {
            return false;
        }

        tracing::info!(epoch, ?origin, "Show started");
        self.publish(SyncMessage::Start { epoch }, origin);

        let offset = self.elapsed();
        self.with_audio(|audio| audio.play(offset));
        true
    }

    fn pause_from(&mut self, origin: Origin) -> bool {
        let now = self.now();
        if !self.clock.pause(now) {
            return false;
        }

        tracing::info!(elapsed = self.clock.elapsed(now), ?origin, "Show paused");
        self.publish(SyncMessage::Pause, origin);
        self.with_audio(|audio| audio.pause());
        true
    }

    fn resume_from(&mut self, origin: Origin) -> bool {
        let now = self.now();
        if !self.clock.resume(now) {
            return false;
        }

        let offset = self.clock.elapsed(now);
        tracing::info!(elapsed = offset, ?origin, "Show resumed");
        self.publish(SyncMessage::Resume, origin);
        self.with_audio(|audio| audio.play(offset));
        true
    }

    fn jump_from(&mut self, index: usize, origin: Origin) -> usize {
        let now = self.now();
        let target = self.clock.jump_to(index, &self.ctx.timeline, now);

        let scene = self
            .ctx
            .timeline
            .scene(target)
            .map(|s| s.name.as_str())
            .unwrap_or_default();
        tracing::info!(index = target, scene, ?origin, "Jumped to scene");

        self.publish(SyncMessage::Jump { index: target }, origin);
        let offset = self.ctx.timeline.offset_of(target);
        self.with_audio(|audio| audio.play(offset));
        target
    }

    /// Publish a locally originated action when acting as director
    fn publish(&mut self, message: SyncMessage, origin: Origin) {
        if origin == Origin::Remote || self.ctx.role != Role::Director {
            return;
        }

        if let Some(link) = self.link.as_mut() {
            if let Err(e) = link.publish(&message) {
                tracing::warn!(kind = message.kind(), "Failed to publish sync message: {e}");
            }
        }
    }

    /// Run an audio action if this process owns the soundtrack and it is loaded
    fn with_audio(&mut self, action: impl FnOnce(&mut dyn AudioOutput)) {
        if self.ctx.role != Role::Director {
            return;
        }
        if let Some(audio) = self.audio.as_deref_mut() {
            if audio.is_loaded() {
                action(audio);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::link::LocalBus;
    use domecast_sequencer::{ManualClock, SceneSpec};

    const EPS: f64 = 1e-9;

    struct Process {
        clock: Arc<ManualClock>,
        transport: TransportController,
    }

    fn process(
        timeline: &Arc<ShowTimeline>,
        role: Role,
        link: Option<Box<dyn SyncLink>>,
        audio: Option<Box<dyn AudioOutput>>,
        now: f64,
    ) -> Process {
        let clock = Arc::new(ManualClock::new(now));
        let ctx = ShowContext::new(timeline.clone(), clock.clone(), role);
        Process {
            clock,
            transport: TransportController::new(ctx, link, audio),
        }
    }

    fn pair(timeline: ShowTimeline, now: f64) -> (Process, Process) {
        let timeline = Arc::new(timeline);
        let bus = LocalBus::new();
        let director = process(
            &timeline,
            Role::Director,
            Some(Box::new(bus.endpoint())),
            None,
            now,
        );
        let program = process(
            &timeline,
            Role::Program,
            Some(Box::new(bus.endpoint())),
            None,
            now,
        );
        (director, program)
    }

    fn set_time(processes: [&Process; 2], now: f64) {
        for p in processes {
            p.clock.set(now);
        }
    }

    #[test]
    fn test_start_epoch_survives_latency() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 1000.0);

        assert!(director.transport.start());

        // Delivered 50ms late
        program.clock.set(1000.05);
        assert_eq!(program.transport.sync(), 1);

        set_time([&director, &program], 1100.0);
        assert!((director.transport.elapsed() - 100.0).abs() < EPS);
        assert!((program.transport.elapsed() - 100.0).abs() < EPS);
        assert_eq!(
            director.transport.clock_state(),
            program.transport.clock_state()
        );
    }

    #[test]
    fn test_jump_delivered_twice_is_idempotent() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 10.0);
        director.transport.start();
        program.transport.sync();

        set_time([&director, &program], 20.0);
        director.transport.jump_to(3);
        program.transport.apply(SyncMessage::Jump { index: 3 });
        let once = program.transport.clock_state();
        program.transport.apply(SyncMessage::Jump { index: 3 });
        assert_eq!(program.transport.clock_state(), once);

        // The published copy is a third delivery of the same jump
        program.transport.sync();
        assert_eq!(program.transport.clock_state(), once);
        let cursor = program.transport.resolve().cursor().unwrap();
        assert_eq!(cursor.index, 3);
        assert!(cursor.local_time.abs() < EPS);
    }

    #[test]
    fn test_jump_scenario_two_scenes() {
        let timeline = ShowTimeline::new(vec![SceneSpec::new("A", 4.0), SceneSpec::new("B", 25.0)])
            .unwrap();
        let (mut director, mut program) = pair(timeline, 0.0);

        director.transport.jump_to(1);
        // Program sees the jump a few milliseconds later, at its own now
        program.clock.set(0.004);
        program.transport.sync();

        let cursor = director.transport.resolve().cursor().unwrap();
        assert_eq!(cursor.index, 1);
        assert!(cursor.local_time.abs() < EPS);

        set_time([&director, &program], 5.0);
        let cursor = director.transport.resolve().cursor().unwrap();
        assert_eq!(cursor.index, 1);
        assert!((cursor.local_time - 5.0).abs() < EPS);
        assert!((cursor.progress - 0.2).abs() < EPS);

        let lag = director.transport.elapsed() - program.transport.elapsed();
        assert!((lag - 0.004).abs() < EPS);
    }

    #[test]
    fn test_pause_and_resume_follow_director() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 0.0);
        director.transport.start();
        program.transport.sync();

        set_time([&director, &program], 30.0);
        director.transport.pause();
        program.transport.sync();
        assert!(program.transport.is_paused());

        set_time([&director, &program], 90.0);
        assert!((program.transport.elapsed() - 30.0).abs() < EPS);

        director.transport.resume();
        program.transport.sync();
        assert!(program.transport.is_running());

        set_time([&director, &program], 95.0);
        assert!((director.transport.elapsed() - 35.0).abs() < EPS);
        assert!((program.transport.elapsed() - 35.0).abs() < EPS);
    }

    #[test]
    fn test_duplicate_pause_is_harmless() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 0.0);
        director.transport.start();
        program.transport.sync();

        set_time([&director, &program], 12.0);
        program.transport.apply(SyncMessage::Pause);
        let once = program.transport.clock_state();
        program.clock.set(13.0);
        program.transport.apply(SyncMessage::Pause);
        assert_eq!(program.transport.clock_state(), once);
    }

    #[test]
    fn test_program_never_publishes() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 0.0);
        program.transport.start();
        program.transport.jump_to(2);
        program.transport.pause();

        assert_eq!(director.transport.sync(), 0);
        assert!(!director.transport.is_started());
    }

    #[test]
    fn test_director_ignores_inbound() {
        let (mut director, _program) = pair(ShowTimeline::planetarium(), 0.0);
        director.transport.apply(SyncMessage::Start { epoch: -50.0 });
        assert!(!director.transport.is_started());
    }

    #[test]
    fn test_lost_pause_leaves_program_running() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 0.0);
        director.transport.start();
        program.transport.sync();

        set_time([&director, &program], 5.0);
        director.transport.pause();
        // Message lost: drain the director's side only
        let _ = program.transport.link.as_mut().map(|l| l.receive());

        set_time([&director, &program], 9.0);
        assert!(program.transport.is_running());
        assert!((program.transport.elapsed() - 9.0).abs() < EPS);

        // A later jump corrects the program
        director.transport.jump_to(1);
        program.transport.sync();
        assert_eq!(
            director.transport.clock_state(),
            program.transport.clock_state()
        );
    }

    #[test]
    fn test_standalone_program() {
        let timeline = Arc::new(ShowTimeline::planetarium());
        let mut program = process(&timeline, Role::Program, None, None, 0.0);

        assert!(!program.transport.is_linked());
        assert_eq!(program.transport.sync(), 0);
        program.transport.toggle();
        assert!(program.transport.is_running());

        program.clock.set(4.0);
        program.transport.toggle();
        assert!(program.transport.is_paused());
        program.clock.set(8.0);
        assert!((program.transport.elapsed() - 4.0).abs() < EPS);
    }

    #[test]
    fn test_director_drives_audio() {
        let timeline = Arc::new(ShowTimeline::planetarium());
        let audio = RecordingAudio::new(true);
        let mut director = process(
            &timeline,
            Role::Director,
            None,
            Some(Box::new(audio.clone())),
            0.0,
        );

        director.transport.start();
        director.clock.set(3.0);
        director.transport.pause();
        director.clock.set(6.0);
        director.transport.resume();
        director.transport.jump_to(2);
        director.transport.set_volume(1.5);

        let log = audio.log();
        assert_eq!(log.plays, vec![0.0, 3.0, 45.0]);
        assert_eq!(log.pauses, 1);
        assert_eq!(log.volume, Some(1.0));
    }

    #[test]
    fn test_program_stays_silent() {
        let timeline = Arc::new(ShowTimeline::planetarium());
        let audio = RecordingAudio::new(true);
        let mut program = process(
            &timeline,
            Role::Program,
            None,
            Some(Box::new(audio.clone())),
            0.0,
        );

        program.transport.apply(SyncMessage::Start { epoch: 0.0 });
        program.transport.set_volume(0.8);

        let log = audio.log();
        assert!(log.plays.is_empty());
        assert_eq!(log.volume, Some(0.0));
    }

    #[test]
    fn test_unloaded_audio_does_not_block_show() {
        let timeline = Arc::new(ShowTimeline::planetarium());
        let audio = RecordingAudio::new(false);
        let mut director = process(
            &timeline,
            Role::Director,
            None,
            Some(Box::new(audio.clone())),
            0.0,
        );

        director.transport.start();
        director.clock.set(2.0);
        assert!((director.transport.elapsed() - 2.0).abs() < EPS);
        assert_eq!(audio.log(), Default::default());
    }

    #[test]
    fn test_out_of_range_jump_is_clamped() {
        let (mut director, mut program) = pair(ShowTimeline::planetarium(), 0.0);
        assert_eq!(director.transport.jump_to(99), 6);
        program.transport.sync();
        assert_eq!(program.transport.resolve().cursor().unwrap().index, 6);
    }
}
