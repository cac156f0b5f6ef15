//! # TCP Front End
//!
//! The [`FrontEnd`] is a two-state machine, `Stopped` or `Listening`. While
//! listening, an accept loop runs in its own task and spawns one task per
//! connection. Each connection carries exactly one command: the request is
//! read once into a fixed buffer, executed through a [`CommandService`], and
//! answered with one response line before the connection is closed.

use super::handler::CommandService;
use crate::framework::{ResourceError, ResourceResult};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Default size of the per-connection request buffer.
pub const DEFAULT_MAX_COMMAND_LEN: usize = 1024;

/// Observable state of a [`FrontEnd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontEndState {
    Stopped,
    Listening(SocketAddr),
}

struct Listener {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

enum State {
    Stopped,
    Listening(Listener),
}

/// Accepts connections and answers one command per connection.
pub struct FrontEnd {
    service: Arc<dyn CommandService>,
    bind_address: IpAddr,
    max_command_len: usize,
    state: State,
}

impl FrontEnd {
    pub fn new(service: Arc<dyn CommandService>) -> Self {
        Self {
            service,
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            state: State::Stopped,
        }
    }

    pub fn with_bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn with_max_command_len(mut self, len: usize) -> Self {
        self.max_command_len = len;
        self
    }

    pub fn state(&self) -> FrontEndState {
        match &self.state {
            State::Stopped => FrontEndState::Stopped,
            State::Listening(listener) => FrontEndState::Listening(listener.local_addr),
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Stopped => None,
            State::Listening(listener) => Some(listener.local_addr),
        }
    }

    /// Starts listening on `port`, stopping any previous listener first.
    ///
    /// Port `0` binds an ephemeral port; the bound address is returned. A bind
    /// failure yields `NO_CONNECTION` and leaves the front end stopped.
    pub async fn start(&mut self, port: u16) -> ResourceResult<SocketAddr> {
        self.stop().await;

        let addr = SocketAddr::new(self.bind_address, port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!(%addr, error = %e, "Unable to bind listener");
            ResourceError::NoConnection(format!("{addr}: {e}"))
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            error!(%addr, error = %e, "Unable to query listener address");
            ResourceError::NoConnection(format!("{addr}: {e}"))
        })?;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.service),
            self.max_command_len,
            shutdown_rx,
        ));

        info!(addr = %local_addr, port = local_addr.port(), "Listening for commands");
        self.state = State::Listening(Listener {
            local_addr,
            shutdown,
            task,
        });
        Ok(local_addr)
    }

    /// Stops listening. The port is released by the time this returns.
    /// Stopping a stopped front end does nothing.
    pub async fn stop(&mut self) {
        let State::Listening(listener) = std::mem::replace(&mut self.state, State::Stopped) else {
            return;
        };
        let _ = listener.shutdown.send(());
        if let Err(e) = listener.task.await {
            error!(error = ?e, "Accept loop failed");
        }
        info!(addr = %listener.local_addr, "Stopped listening");
    }
}

impl Drop for FrontEnd {
    fn drop(&mut self) {
        if let State::Listening(listener) = std::mem::replace(&mut self.state, State::Stopped) {
            let _ = listener.shutdown.send(());
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    service: Arc<dyn CommandService>,
    max_command_len: usize,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "Accepted connection");
                    connections.spawn(serve_connection(stream, peer, Arc::clone(&service), max_command_len));
                }
                Err(e) => warn!(error = %e, "Failed to accept connection"),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
    connections.shutdown().await;
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    service: Arc<dyn CommandService>,
    max_command_len: usize,
) {
    let mut buffer = vec![0u8; max_command_len];
    let len = match stream.read(&mut buffer).await {
        Ok(0) => {
            debug!(%peer, "Connection closed before a command was sent");
            return;
        }
        Ok(len) => len,
        Err(e) => {
            warn!(%peer, error = %e, "Failed to read command");
            return;
        }
    };

    let line = String::from_utf8_lossy(&buffer[..len]);
    let response = service.execute(&line).await;
    debug!(%peer, code = %response.code, "Sending response");

    if let Err(e) = stream.write_all(response.to_line().as_bytes()).await {
        warn!(%peer, error = %e, "Failed to write response");
        return;
    }
    let _ = stream.shutdown().await;
}
