// SPDX-License-Identifier: MIT OR Apache-2.0
//! Soundtrack output.
//!
//! With the "audio" feature the track plays through rodio. Without it,
//! [`open_output`] logs a warning and the show runs silent.

use crate::config::AudioSettings;
use domecast_sync::AudioOutput;

// ============================================================================
// Audio Output Implementation (with rodio)
// ============================================================================

#[cfg(feature = "audio")]
mod engine {
    use super::*;
    use rodio::source::Source;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    /// Plays one track through the default output device
    pub struct RodioOutput {
        /// Output stream (must be kept alive)
        _stream: OutputStream,
        /// Stream handle for creating sinks
        stream_handle: OutputStreamHandle,
        /// Sink for the current playback, replaced on every seek
        sink: Option<Sink>,
        track: PathBuf,
        looping: bool,
        volume: f32,
    }

    impl RodioOutput {
        /// Open the default device and check the track decodes
        pub fn open(track: &Path, settings: &AudioSettings) -> Option<Self> {
            let (stream, stream_handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("Failed to initialize audio: {e}. Audio will be disabled.");
                    return None;
                }
            };

            // Decode once up front so a bad file is reported at startup
            if let Err(e) = Self::decode(track) {
                tracing::warn!("Failed to load soundtrack {:?}: {e}", track);
                return None;
            }

            tracing::info!(track = %track.display(), "Soundtrack loaded");
            Some(Self {
                _stream: stream,
                stream_handle,
                sink: None,
                track: track.to_path_buf(),
                looping: settings.looping,
                volume: settings.volume,
            })
        }

        fn decode(track: &Path) -> Result<Decoder<BufReader<File>>, String> {
            let file = File::open(track).map_err(|e| e.to_string())?;
            Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }

    impl AudioOutput for RodioOutput {
        fn is_loaded(&self) -> bool {
            true
        }

        fn play(&mut self, offset: f64) {
            self.stop();

            let source = match Self::decode(&self.track) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to decode soundtrack {:?}: {e}", self.track);
                    return;
                }
            };

            let sink = match Sink::try_new(&self.stream_handle) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to create audio sink: {e}");
                    return;
                }
            };

            let skip = Duration::from_secs_f64(offset.max(0.0));
            if self.looping {
                sink.append(source.repeat_infinite().skip_duration(skip));
            } else {
                sink.append(source.skip_duration(skip));
            }
            sink.set_volume(self.volume);

            tracing::debug!(offset, "Soundtrack playing");
            self.sink = Some(sink);
        }

        fn pause(&mut self) {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
        }

        fn set_volume(&mut self, level: f32) {
            self.volume = level.clamp(0.0, 1.0);
            if let Some(sink) = &self.sink {
                sink.set_volume(self.volume);
            }
        }
    }

    /// Open the configured soundtrack, if any
    pub fn open_output(settings: &AudioSettings) -> Option<Box<dyn AudioOutput>> {
        let track = settings.track.as_deref()?;
        RodioOutput::open(track, settings).map(|output| Box::new(output) as Box<dyn AudioOutput>)
    }
}

// ============================================================================
// Stub Implementation (without rodio)
// ============================================================================

#[cfg(not(feature = "audio"))]
mod engine {
    use super::*;

    /// Without an audio backend the show always runs silent
    pub fn open_output(settings: &AudioSettings) -> Option<Box<dyn AudioOutput>> {
        if let Some(track) = &settings.track {
            tracing::warn!(
                "Soundtrack {:?} not played: compile with --features audio",
                track
            );
        } else {
            tracing::info!("Audio output: stub implementation (audio feature not enabled)");
        }
        None
    }
}

pub use engine::open_output;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_track_means_no_output() {
        assert!(open_output(&AudioSettings::default()).is_none());
    }
}
