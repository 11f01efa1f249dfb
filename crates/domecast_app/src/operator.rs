// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operator console - transport commands typed on stdin.

use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc;
use thiserror::Error;

/// A command typed by the operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatorCommand {
    /// Start the show
    Start,
    /// Freeze show time
    Pause,
    /// Unfreeze show time
    Resume,
    /// Master button: start, pause or resume
    Toggle,
    /// Seek to the start of a scene (zero-based)
    Jump(usize),
    /// Soundtrack level
    Volume(f32),
    /// Log the current status
    Status,
    /// List commands
    Help,
    /// Stop the frame loop
    Quit,
}

/// A line that is not a command
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// Blank line
    #[error("empty command")]
    Empty,
    /// Unrecognized verb
    #[error("unknown command: {0}. Type 'help' for available commands.")]
    Unknown(String),
    /// Missing or malformed argument
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for OperatorCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(verb) = parts.first() else {
            return Err(CommandError::Empty);
        };

        match verb.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "toggle" | "go" => Ok(Self::Toggle),
            "jump" => parts
                .get(1)
                .and_then(|s| s.parse().ok())
                .map(Self::Jump)
                .ok_or(CommandError::Usage("jump <scene index>")),
            "volume" => parts
                .get(1)
                .and_then(|s| s.parse::<f32>().ok())
                .filter(|v| v.is_finite())
                .map(Self::Volume)
                .ok_or(CommandError::Usage("volume <0.0-1.0>")),
            "status" => Ok(Self::Status),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Help text for [`OperatorCommand::Help`]
pub const HELP: &[&str] = &[
    "Available commands:",
    "  start       - Start the show",
    "  pause       - Freeze show time",
    "  resume      - Continue after a pause",
    "  toggle, go  - Start, pause or resume",
    "  jump <n>    - Jump to scene n (0-based)",
    "  volume <v>  - Set soundtrack volume (0.0-1.0)",
    "  status      - Show timecode and scene",
    "  quit        - Stop",
];

/// Receives operator commands from a reader thread
pub struct OperatorConsole {
    receiver: mpsc::Receiver<OperatorCommand>,
}

impl OperatorConsole {
    /// Read commands from stdin on a background thread
    pub fn stdin() -> Self {
        let (sender, receiver) = mpsc::channel();

        let spawned = std::thread::Builder::new()
            .name("operator-console".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    match line.parse::<OperatorCommand>() {
                        Ok(command) => {
                            if sender.send(command).is_err() {
                                break;
                            }
                        }
                        Err(CommandError::Empty) => {}
                        Err(e) => tracing::warn!("{e}"),
                    }
                }
                tracing::debug!("Operator console closed");
            });
        if let Err(e) = spawned {
            tracing::warn!("Failed to start operator console: {e}");
        }

        Self { receiver }
    }

    /// Wrap an existing channel
    #[cfg(test)]
    pub fn from_receiver(receiver: mpsc::Receiver<OperatorCommand>) -> Self {
        Self { receiver }
    }

    /// Drain pending commands
    pub fn poll(&self) -> Vec<OperatorCommand> {
        self.receiver.try_iter().collect()
    }
}
