// SPDX-License-Identifier: MIT OR Apache-2.0
//! Publish/subscribe links between show processes.
//!
//! A [`SyncLink`] broadcasts messages to every other participant and hands
//! back whatever has arrived since the last call. Delivery is best effort
//! and unordered; nothing is retried.
//!
//! - [`LocalBus`] connects endpoints inside one process (tests, simulation)
//! - [`UdpLink`] connects processes on one host over loopback datagrams

use crate::error::{Result, SyncError};
use crate::message::SyncMessage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use uuid::Uuid;

/// Largest datagram accepted by [`UdpLink`]
const MAX_DATAGRAM_SIZE: usize = 1024;

/// A broadcast transport for [`SyncMessage`]s.
pub trait SyncLink: Send {
    /// Send a message to every other participant
    fn publish(&mut self, message: &SyncMessage) -> Result<()>;

    /// Drain everything received since the last call
    fn receive(&mut self) -> Vec<SyncMessage>;
}

/// Identifier of a bus endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(pub Uuid);

impl EndpointId {
    /// Create a new random endpoint ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EndpointId {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process broadcast bus
#[derive(Clone, Default)]
pub struct LocalBus {
    subscribers: Arc<Mutex<Vec<(EndpointId, Sender<SyncMessage>)>>>,
}

impl LocalBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new endpoint
    pub fn endpoint(&self) -> BusEndpoint {
        let (sender, receiver) = mpsc::channel();
        let id = EndpointId::new();
        self.subscribers.lock().push((id, sender));
        BusEndpoint {
            id,
            bus: self.clone(),
            receiver,
        }
    }

    /// Number of attached endpoints
    pub fn endpoint_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn broadcast(&self, from: EndpointId, message: &SyncMessage) {
        // Dropped endpoints fail to send and are pruned here
        self.subscribers
            .lock()
            .retain(|(id, sender)| *id == from || sender.send(*message).is_ok());
    }

    fn detach(&self, id: EndpointId) {
        self.subscribers.lock().retain(|(other, _)| *other != id);
    }
}

/// One participant on a [`LocalBus`]. Never receives its own messages.
pub struct BusEndpoint {
    id: EndpointId,
    bus: LocalBus,
    receiver: Receiver<SyncMessage>,
}

impl BusEndpoint {
    /// This endpoint's ID
    pub fn id(&self) -> EndpointId {
        self.id
    }
}

impl SyncLink for BusEndpoint {
    fn publish(&mut self, message: &SyncMessage) -> Result<()> {
        self.bus.broadcast(self.id, message);
        Ok(())
    }

    fn receive(&mut self) -> Vec<SyncMessage> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for BusEndpoint {
    fn drop(&mut self) {
        self.bus.detach(self.id);
    }
}

/// Loopback UDP link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpLinkConfig {
    /// Local address to bind
    pub bind: SocketAddr,
    /// Addresses every published message is sent to
    pub peers: Vec<SocketAddr>,
}

impl Default for UdpLinkConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 47_100)),
            peers: vec![SocketAddr::from(([127, 0, 0, 1], 47_101))],
        }
    }
}

/// Non-blocking UDP link between processes on one host.
pub struct UdpLink {
    socket: UdpSocket,
    peers: Vec<SocketAddr>,
    recv_buf: Vec<u8>,
}

impl UdpLink {
    /// Bind the local socket
    pub fn bind(config: &UdpLinkConfig) -> Result<Self> {
        let socket = UdpSocket::bind(config.bind)?;
        socket.set_nonblocking(true)?;
        tracing::info!(
            bind = %socket.local_addr()?,
            peers = config.peers.len(),
            "UDP sync link bound"
        );

        Ok(Self {
            socket,
            peers: config.peers.clone(),
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Add a peer after binding
    pub fn add_peer(&mut self, peer: SocketAddr) {
        if !self.peers.contains(&peer) {
            self.peers.push(peer);
        }
    }
}

impl SyncLink for UdpLink {
    fn publish(&mut self, message: &SyncMessage) -> Result<()> {
        if self.peers.is_empty() {
            return Err(SyncError::Closed);
        }

        let bytes = message.encode()?;
        let mut delivered = 0;
        for peer in &self.peers {
            match self.socket.send_to(&bytes, peer) {
                Ok(_) => delivered += 1,
                Err(e) => tracing::warn!(%peer, "Failed to send sync message: {e}"),
            }
        }

        if delivered == 0 {
            return Err(SyncError::Closed);
        }
        Ok(())
    }

    fn receive(&mut self) -> Vec<SyncMessage> {
        let mut messages = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.recv_buf) {
                Ok((len, from)) => match SyncMessage::decode(&self.recv_buf[..len]) {
                    Ok(message) => messages.push(message),
                    Err(e) => tracing::warn!(%from, "Dropping malformed sync datagram: {e}"),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                // Loopback peers that are not up yet surface as refused
                Err(e) if e.kind() == ErrorKind::ConnectionRefused => continue,
                Err(e) => {
                    tracing::warn!("Sync receive failed: {e}");
                    break;
                }
            }
        }

        messages
    }
}
