// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show configuration.
//!
//! A show is described by one RON file:
//! - Scene list (names and durations)
//! - Motion constants and fixed-step pacing
//! - Sync link addresses
//! - Soundtrack settings
//! - Narration cues and display frame rate
//!
//! Every section is optional; a missing section falls back to the built-in
//! planetarium show.

use crate::error::ConfigError;
use domecast_sequencer::{
    AnimationDirector, Cue, FixedStepper, MotionConfig, PacingConfig, SceneSpec, ShowTimeline,
};
use domecast_sync::{Role, UdpLinkConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Current show file format version
pub const SHOW_FORMAT_VERSION: u32 = 1;

/// Sync settings, one socket pair per role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Whether to open a UDP link at all
    pub enabled: bool,
    /// Director socket; its peers are the programs
    pub director: UdpLinkConfig,
    /// Program socket
    pub program: UdpLinkConfig,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let director = SocketAddr::from(([127, 0, 0, 1], 47_100));
        let program = SocketAddr::from(([127, 0, 0, 1], 47_101));
        Self {
            enabled: true,
            director: UdpLinkConfig {
                bind: director,
                peers: vec![program],
            },
            program: UdpLinkConfig {
                bind: program,
                peers: vec![director],
            },
        }
    }
}

impl SyncSettings {
    /// Socket settings for a role
    pub fn link_for(&self, role: Role) -> &UdpLinkConfig {
        match role {
            Role::Director => &self.director,
            Role::Program => &self.program,
        }
    }

    /// Mutable socket settings for a role
    pub fn link_for_mut(&mut self, role: Role) -> &mut UdpLinkConfig {
        match role {
            Role::Director => &mut self.director,
            Role::Program => &mut self.program,
        }
    }
}

/// Soundtrack settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Track to play, if any
    pub track: Option<PathBuf>,
    /// Output level (0.0 to 1.0)
    pub volume: f32,
    /// Restart the track when it ends
    pub looping: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            track: None,
            volume: 0.4,
            looping: true,
        }
    }
}

/// Complete show configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    /// File format version
    pub version: u32,
    /// Scenes in playback order
    pub timeline: Vec<SceneSpec>,
    /// Camera and rotation constants
    pub motion: MotionConfig,
    /// Fixed-step rate
    pub pacing: PacingConfig,
    /// Director/program link
    pub sync: SyncSettings,
    /// Soundtrack
    pub audio: AudioSettings,
    /// Narration lines for the control monitor
    pub cues: Vec<Cue>,
    /// Display refresh rate in frames per second
    pub frame_rate: f64,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            version: SHOW_FORMAT_VERSION,
            timeline: ShowTimeline::planetarium().scenes().to_vec(),
            motion: MotionConfig::default(),
            pacing: PacingConfig::default(),
            sync: SyncSettings::default(),
            audio: AudioSettings::default(),
            cues: Vec::new(),
            frame_rate: 60.0,
        }
    }
}

impl ShowConfig {
    /// Load and validate a show file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&content)?;
        tracing::debug!(
            path = %path.display(),
            scenes = config.timeline.len(),
            "Loaded show config"
        );
        Ok(config)
    }

    /// Parse and validate RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: ShowConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a file as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Check everything a show needs before it runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version > SHOW_FORMAT_VERSION {
            return Err(ConfigError::Version {
                found: self.version,
                supported: SHOW_FORMAT_VERSION,
            });
        }

        let timeline = self.build_timeline()?;
        AnimationDirector::planetarium(&timeline, self.motion)?;
        FixedStepper::new(self.pacing)?;

        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::FrameRate(self.frame_rate));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::Volume(self.audio.volume));
        }

        Ok(())
    }

    /// Build the show timeline
    pub fn build_timeline(&self) -> Result<ShowTimeline, ConfigError> {
        Ok(ShowTimeline::new(self.timeline.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domecast_sequencer::{DirectorError, TimelineError};

    #[test]
    fn test_default_config() {
        let config = ShowConfig::default();
        assert_eq!(config.timeline.len(), 7);
        assert_eq!(config.audio.volume, 0.4);
        assert!(config.validate().is_ok());
        assert_eq!(config.build_timeline().unwrap().total_duration(), 161.0);
    }

    #[test]
    fn test_serialization() {
        let mut config = ShowConfig::default();
        config.cues.push(Cue {
            start: 10.0,
            text: "In the beginning there was silence.".to_string(),
        });

        let ron_str = config.to_ron().unwrap();
        let loaded = ShowConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_bundled_show_file() {
        let config = ShowConfig::from_ron(include_str!("../../../shows/planetarium.ron")).unwrap();
        assert_eq!(config.timeline, ShowConfig::default().timeline);
        assert_eq!(config.sync, SyncSettings::default());
        assert_eq!(config.cues.len(), 7);
    }

    #[test]
    fn test_default_sockets_face_each_other() {
        let sync = SyncSettings::default();
        let director = sync.link_for(Role::Director);
        let program = sync.link_for(Role::Program);
        assert_eq!(director.peers, vec![program.bind]);
        assert_eq!(program.peers, vec![director.bind]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = ShowConfig::from_ron("(frame_rate: 144.0)").unwrap();
        assert_eq!(config.frame_rate, 144.0);
        assert_eq!(config.timeline, ShowConfig::default().timeline);
        assert_eq!(config.motion, MotionConfig::default());
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let err = ShowConfig::from_ron(r#"(timeline: [(name: "A", duration: 0.0)])"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Timeline(TimelineError::InvalidDuration { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_timeline_is_rejected() {
        let err = ShowConfig::from_ron("(timeline: [])").unwrap_err();
        assert!(matches!(err, ConfigError::Timeline(TimelineError::Empty)));
    }

    #[test]
    fn test_scene_count_must_match_handlers() {
        let err =
            ShowConfig::from_ron(r#"(timeline: [(name: "Only", duration: 5.0)])"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Director(DirectorError::HandlerMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ShowConfig {
            frame_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::FrameRate(_))));

        let mut config = ShowConfig::default();
        config.audio.volume = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Volume(_))));

        let config = ShowConfig {
            version: SHOW_FORMAT_VERSION + 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Version { .. })));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ShowConfig::from_ron("(frame_rate: "),
            Err(ConfigError::Parse(_))
        ));
    }
}
