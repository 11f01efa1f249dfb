// SPDX-License-Identifier: MIT OR Apache-2.0
//! domecast - synchronized multi-display dome show player
//!
//! Runs one process of a dome show:
//! - `director` takes operator commands, plays the soundtrack and publishes
//!   every transport action
//! - `program` mirrors the director on another display, silently
//!
//! ## Architecture
//!
//! Both roles run the same frame loop over the same timeline and animation
//! director. They share nothing but transport messages and the host wall
//! clock, so each computes identical visuals locally.

mod audio;
mod config;
mod error;
mod operator;
mod show;

use clap::{Parser, ValueEnum};
use config::ShowConfig;
use domecast_sequencer::{Clock, SystemClock};
use domecast_sync::{Role, ShowContext, SyncLink, TransportController, UdpLink, UdpLinkConfig};
use error::Result;
use operator::OperatorConsole;
use show::{LogSink, ShowRunner};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Process role on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Control process
    Director,
    /// Follower display
    Program,
}

impl From<Mode> for Role {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Director => Role::Director,
            Mode::Program => Role::Program,
        }
    }
}

/// Synchronized dome show player
#[derive(Debug, Parser)]
#[command(name = "domecast", version, about)]
struct Args {
    /// Process role
    #[arg(long, value_enum, default_value = "director")]
    mode: Mode,

    /// Show file (RON); the built-in planetarium show is used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start the show as soon as the loop is running (director only)
    #[arg(long)]
    autostart: bool,

    /// Stop after this many seconds of wall time
    #[arg(long, value_name = "SECS")]
    duration_limit: Option<f64>,

    /// Override the sync bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Override the sync peers
    #[arg(long = "peer")]
    peers: Vec<SocketAddr>,

    /// Run without a sync link
    #[arg(long)]
    standalone: bool,

    /// Log the camera pose every N frames (0 disables)
    #[arg(long, default_value_t = 0)]
    pose_every: u64,

    /// Write the effective show file to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("domecast_app=debug,domecast_sync=info,domecast_sequencer=info")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting domecast v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        tracing::error!("domecast failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ShowConfig::load(path)?,
        None => ShowConfig::default(),
    };
    let role = Role::from(args.mode);
    let udp = config.sync.link_for_mut(role);
    if let Some(bind) = args.bind {
        udp.bind = bind;
    }
    if !args.peers.is_empty() {
        udp.peers = args.peers.clone();
    }
    if let Some(path) = &args.write_config {
        config.save(path)?;
        tracing::info!(path = %path.display(), "Show file written");
        return Ok(());
    }

    let timeline = Arc::new(config.build_timeline()?);
    tracing::info!(
        role = role.name(),
        scenes = timeline.len(),
        total = timeline.total_duration(),
        "Show loaded"
    );

    let link = if args.standalone || !config.sync.enabled {
        None
    } else {
        open_link(config.sync.link_for(role))
    };

    let audio = match role {
        Role::Director => audio::open_output(&config.audio),
        Role::Program => None,
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ctx = ShowContext::new(timeline, clock, role);
    let mut transport = TransportController::new(ctx, link, audio);
    transport.set_volume(config.audio.volume);

    let mut runner = ShowRunner::new(transport, &config)?;
    if args.autostart {
        if role == Role::Director {
            runner.transport_mut().start();
        } else {
            tracing::warn!("--autostart ignored: a program waits for the director");
        }
    }

    let console = OperatorConsole::stdin();
    let limit = args
        .duration_limit
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64);
    let mut sink = LogSink::new(args.pose_every);

    runner.run(&mut sink, || console.poll(), limit);
    Ok(())
}

/// Open the UDP sync link, falling back to standalone when the socket is unavailable
fn open_link(settings: &UdpLinkConfig) -> Option<Box<dyn SyncLink>> {
    match UdpLink::bind(settings) {
        Ok(link) => Some(Box::new(link)),
        Err(e) => {
            tracing::warn!(
                bind = %settings.bind,
                "Sync link unavailable, running standalone: {e}"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "domecast",
            "--mode",
            "program",
            "--peer",
            "127.0.0.1:5000",
            "--peer",
            "127.0.0.1:5001",
            "--duration-limit",
            "2.5",
        ]);
        assert_eq!(args.mode, Mode::Program);
        assert_eq!(args.peers.len(), 2);
        assert_eq!(args.duration_limit, Some(2.5));
        assert!(!args.autostart);
        assert_eq!(Role::from(args.mode), Role::Program);
    }

    #[test]
    fn test_default_mode_is_director() {
        let args = Args::parse_from(["domecast", "--autostart"]);
        assert_eq!(args.mode, Mode::Director);
        assert!(args.autostart);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_busy_sync_port_falls_back_to_standalone() {
        let held = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let busy = held.local_addr().unwrap();
        let bind_arg = busy.to_string();

        let settings = UdpLinkConfig {
            bind: busy,
            peers: Vec::new(),
        };
        assert!(open_link(&settings).is_none());

        let args = Args::parse_from([
            "domecast",
            "--mode",
            "program",
            "--bind",
            bind_arg.as_str(),
            "--duration-limit",
            "0",
        ]);
        assert!(run(args).is_ok());
    }
}
