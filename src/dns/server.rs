use crate::config::Config;
use crate::dns::engine::ResolutionEngine;
use crate::error::Error;
use crate::record_store::SharedStore;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Datagrams longer than this are cut short by the receive and then answered (or rejected) from
/// what arrived.
pub const RECV_BUFFER_LEN: usize = 1024;

/// Bind a UDP server on the configured address.
///
/// # Errors
///
/// Returns [`Error::PortOutOfRange`] for an invalid port and [`Error::IO`] if the socket can't be
/// bound.
pub async fn new(config: &Config, store: SharedStore) -> Result<Server, Error> {
    Server::bind(config.dns_bind_addr()?, store).await
}

#[derive(Debug)]
pub struct Server {
    socket: UdpSocket,
    engine: ResolutionEngine,
}

impl Server {
    /// Bind a UDP server on `addr`. Port `0` picks a free port, see [`Server::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the socket can't be bound.
    pub async fn bind(addr: SocketAddr, store: SharedStore) -> Result<Self, Error> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Server {
            socket,
            engine: ResolutionEngine::new(store),
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::IO`] if the socket address can't be read.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve forever: receive a datagram, resolve it, send the reply to its sender. Socket errors
    /// are logged and never stop the loop.
    pub async fn block_until_done(self) {
        let mut buf = [0u8; RECV_BUFFER_LEN];
        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(err) => {
                    warn!(%err, "failed to receive datagram");
                    continue;
                }
            };
            debug!(%peer, len, "received datagram");
            let reply = self.engine.resolve(&buf[..len]);
            if let Err(err) = self.socket.send_to(&reply, peer).await {
                warn!(%peer, %err, "failed to send response");
            }
        }
    }
}
