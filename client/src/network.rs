use crate::config::ReconnectPolicy;
use crate::error::TransportError;
use crate::input::Intent;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, RawSnapshot, PROTOCOL_VERSION};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

const RECV_BUFFER_SIZE: usize = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connection(ConnectionState),
    State(RawSnapshot),
}

/// Frame-loop side of the transport: inbound events and outbound intents.
pub struct TransportHandle {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    intents: mpsc::UnboundedSender<Intent>,
}

impl TransportHandle {
    /// Next queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    pub fn send(&self, intent: Intent) -> Result<(), TransportError> {
        self.intents.send(intent).map_err(|_| TransportError::Closed)
    }
}

enum Handshake {
    Connected(u32),
    Exhausted,
    Shutdown,
}

enum SessionEnd {
    Lost,
    Shutdown,
}

/// UDP link to the game server with bounded reconnection.
pub struct Transport {
    server_addr: SocketAddr,
    policy: ReconnectPolicy,
    events: mpsc::UnboundedSender<TransportEvent>,
    intents: mpsc::UnboundedReceiver<Intent>,
    state: Option<ConnectionState>,
}

impl Transport {
    pub fn new(server_addr: SocketAddr, policy: ReconnectPolicy) -> (Self, TransportHandle) {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let (intent_sender, intent_receiver) = mpsc::unbounded_channel();

        let transport = Transport {
            server_addr,
            policy,
            events: event_sender,
            intents: intent_receiver,
            state: None,
        };
        let handle = TransportHandle {
            events: event_receiver,
            intents: intent_sender,
        };

        (transport, handle)
    }

    /// Runs until the handle is dropped or reconnection is exhausted.
    pub async fn run(mut self) -> Result<(), TransportError> {
        let result = self.drive().await;
        if result.is_err() {
            self.set_state(ConnectionState::Disconnected);
        }
        result
    }

    async fn drive(&mut self) -> Result<(), TransportError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        info!("Transport bound to {}", socket.local_addr()?);
        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            match self.handshake(&socket, &mut buffer).await? {
                Handshake::Connected(session_id) => {
                    info!("Connected to {} (session {})", self.server_addr, session_id);
                    self.set_state(ConnectionState::Connected);
                }
                Handshake::Exhausted => {
                    return Err(TransportError::Unreachable {
                        addr: self.server_addr,
                        attempts: self.policy.attempts,
                    });
                }
                Handshake::Shutdown => return Ok(()),
            }

            match self.session(&socket, &mut buffer).await {
                SessionEnd::Lost => {
                    warn!("Lost connection to {}, reconnecting", self.server_addr);
                }
                SessionEnd::Shutdown => {
                    if let Err(e) = self.send_packet(&socket, &Packet::Disconnect).await {
                        debug!("Disconnect not delivered: {}", e);
                    }
                    info!("Transport shut down");
                    return Ok(());
                }
            }
        }
    }

    async fn handshake(
        &mut self,
        socket: &UdpSocket,
        buffer: &mut [u8],
    ) -> Result<Handshake, TransportError> {
        for attempt in 1..=self.policy.attempts {
            self.set_state(ConnectionState::Connecting);
            info!(
                "Connecting to {} (attempt {}/{})",
                self.server_addr, attempt, self.policy.attempts
            );

            let connect = Packet::Connect {
                client_version: PROTOCOL_VERSION,
            };
            if let Err(e) = self.send_packet(socket, &connect).await {
                warn!("Connect attempt failed: {}", e);
            }

            let deadline = Instant::now() + self.policy.timeout;
            loop {
                tokio::select! {
                    result = socket.recv_from(buffer) => {
                        match result {
                            Ok((len, from)) if from == self.server_addr => {
                                if let Ok(Packet::Connected { session_id }) = deserialize::<Packet>(&buffer[..len]) {
                                    return Ok(Handshake::Connected(session_id));
                                }
                                debug!("Ignoring packet while connecting");
                            }
                            Ok((_, from)) => debug!("Ignoring datagram from {}", from),
                            Err(e) => debug!("Receive failed while connecting: {}", e),
                        }
                    },

                    intent = self.intents.recv() => {
                        match intent {
                            Some(intent) => warn!("Dropping {:?}: not connected", intent),
                            None => return Ok(Handshake::Shutdown),
                        }
                    },

                    _ = sleep_until(deadline) => break,
                }
            }
        }

        Ok(Handshake::Exhausted)
    }

    async fn session(&mut self, socket: &UdpSocket, buffer: &mut [u8]) -> SessionEnd {
        let mut last_heard = Instant::now();

        loop {
            tokio::select! {
                result = socket.recv_from(buffer) => {
                    match result {
                        Ok((len, from)) if from == self.server_addr => {
                            match deserialize::<Packet>(&buffer[..len]) {
                                Ok(Packet::State(raw)) => {
                                    last_heard = Instant::now();
                                    self.emit(TransportEvent::State(raw));
                                }
                                Ok(Packet::Connected { .. }) => last_heard = Instant::now(),
                                Ok(Packet::Disconnected { reason }) => {
                                    warn!("Disconnected by server: {}", reason);
                                    return SessionEnd::Lost;
                                }
                                Ok(_) => warn!("Unexpected packet type"),
                                Err(e) => debug!("Dropping undecodable datagram: {}", e),
                            }
                        }
                        Ok((_, from)) => debug!("Ignoring datagram from {}", from),
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                intent = self.intents.recv() => {
                    match intent {
                        Some(intent) => {
                            if let Err(e) = self.send_packet(socket, &intent.to_packet()).await {
                                warn!("Failed to send {:?}: {}", intent, e);
                            }
                        }
                        None => return SessionEnd::Shutdown,
                    }
                },

                _ = sleep_until(last_heard + self.policy.timeout) => {
                    warn!("No state from server for {:?}", self.policy.timeout);
                    return SessionEnd::Lost;
                },
            }
        }
    }

    async fn send_packet(&self, socket: &UdpSocket, packet: &Packet) -> Result<(), TransportError> {
        let data = serialize(packet)?;
        socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != Some(state) {
            self.state = Some(state);
            self.emit(TransportEvent::Connection(state));
        }
    }

    fn emit(&self, event: TransportEvent) {
        if self.events.send(event).is_err() {
            debug!("Event dropped, frame loop is gone");
        }
    }
}

/// Starts the transport on its own thread and current-thread runtime.
pub fn spawn_transport(
    server_addr: SocketAddr,
    policy: ReconnectPolicy,
) -> Result<TransportHandle, TransportError> {
    let (transport, handle) = Transport::new(server_addr, policy);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("transport".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = transport.run().await {
                    warn!("Transport stopped: {}", e);
                }
            })
        })?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Direction;
    use std::time::Duration;

    fn quick_policy(attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            attempts,
            timeout: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_connection_labels() {
        assert_eq!(ConnectionState::Connecting.label(), "connecting");
        assert_eq!(ConnectionState::Connected.label(), "connected");
        assert_eq!(ConnectionState::Disconnected.label(), "disconnected");
    }

    #[test]
    fn test_send_after_transport_dropped() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let (transport, handle) = Transport::new(addr, quick_policy(1));
        drop(transport);

        let result = handle.send(Intent::ChangeDirection(Direction::Up));
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[test]
    fn test_events_queue_in_order_without_repeats() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let (mut transport, mut handle) = Transport::new(addr, quick_policy(1));

        transport.set_state(ConnectionState::Connecting);
        transport.set_state(ConnectionState::Connecting);
        transport.set_state(ConnectionState::Connected);
        drop(transport);

        assert_eq!(
            tokio_test::block_on(handle.next_event()),
            Some(TransportEvent::Connection(ConnectionState::Connecting))
        );
        assert_eq!(
            tokio_test::block_on(handle.next_event()),
            Some(TransportEvent::Connection(ConnectionState::Connected))
        );
        assert_eq!(tokio_test::block_on(handle.next_event()), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_ends_disconnected() {
        // Bound but silent, so every handshake attempt times out
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();

        let (transport, mut handle) = Transport::new(addr, quick_policy(2));
        let result = transport.run().await;

        assert!(matches!(
            result,
            Err(TransportError::Unreachable { attempts: 2, .. })
        ));

        let mut events = Vec::new();
        while let Some(event) = handle.try_next_event() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                TransportEvent::Connection(ConnectionState::Connecting),
                TransportEvent::Connection(ConnectionState::Disconnected),
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_handle_shuts_down_cleanly() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();

        let (transport, handle) = Transport::new(addr, quick_policy(3));
        drop(handle);

        assert!(transport.run().await.is_ok());
    }
}
