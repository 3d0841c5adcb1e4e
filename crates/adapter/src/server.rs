//! TCP server for the adapter
//!
//! Accepts connections, performs the handshake, enforces controller and
//! sequencing rules and forwards commands to the game loop. The game loop
//! answers through [`OutboundMessage`]s, which a dispatcher task routes to
//! the per-client writers.

use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::GameSnapshot;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// 64-bit FNV-1a, stable across toolchains unlike `DefaultHasher`.
struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 256,
        }
    }
}

impl ServerConfig {
    /// Read `TILE_MATCH_AI_*` variables, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = lookup("TILE_MATCH_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = lookup("TILE_MATCH_AI_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = lookup("TILE_MATCH_AI_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Whether `TILE_MATCH_AI_DISABLED` turns the adapter off.
    pub fn is_disabled() -> bool {
        std::env::var("TILE_MATCH_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Connected clients and the controller's id, without waiting on the
    /// locks. `None` while the server is busy updating them.
    pub fn try_status(&self) -> Option<(usize, Option<usize>)> {
        let clients = self.clients.try_read().ok()?.len();
        let controller = *self.controller.try_read().ok()?;
        Some((clients, controller))
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Record `seq` if it is newer than the last one seen from this client.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return false;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(Arc<ObservationMessage>),
}

impl ClientOutbound {
    fn write_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        let msg = match self {
            ClientOutbound::Welcome(m) => ServerMessage::Welcome(m),
            ClientOutbound::Ack(m) => ServerMessage::Ack(m),
            ClientOutbound::Error(m) => ServerMessage::Error(m),
            ClientOutbound::Observation(m) => ServerMessage::Observation(m.as_ref()),
        };
        serde_json::to_writer(buf, &msg)
    }
}

/// Start the TCP server and serve until the listener fails.
///
/// `ready_tx` receives the bound address, which tests use with port 0.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    serve(Arc::new(ServerState::new()), config, command_tx, out_rx, ready_tx).await
}

/// [`run_server`] over caller-owned state, so the caller can watch it.
pub async fn serve(
    state: Arc<ServerState>,
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding adapter to {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::Ack { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::Error { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::Observation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(Arc::new(obs)))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let obs = Arc::new(obs);
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(Arc::clone(&obs)));
                        }
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, peer) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %peer, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Drop the client and free the controller seat if it held it.
async fn disconnect(state: &ServerState, client_id: usize) {
    state.clients.write().await.retain(|c| c.id != client_id);
    let mut controller = state.controller.write().await;
    if *controller == Some(client_id) {
        *controller = None;
        info!(client_id, "controller released by disconnect");
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        handshaken: false,
        stream_observations: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if msg.write_json(&mut buf).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let result = read_loop(&mut reader, client_id, &state, &tx, &command_tx).await;

    // Dropping every sender lets the writer drain queued replies and stop.
    disconnect(&state, client_id).await;
    drop(tx);
    let _ = write_task.await;
    result
}

async fn read_loop<R>(
    reader: &mut R,
    client_id: usize,
    state: &ServerState,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let reply_error = |seq: u64, code: ErrorCode, detail: &str| {
        debug!(client_id, seq, ?code, detail, "protocol error");
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, detail)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Client(ClientMessage::Hello(hello))) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !is_compatible(&hello.protocol_version) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                }

                // First client to say hello takes control.
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    if controller.is_none() {
                        *controller = Some(client_id);
                        info!(client_id, name = %hello.client.name, "client is now controller");
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|c| c as u64))
                };

                let welcome = create_welcome(hello.seq, client_id as u64, role, controller_id);
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Client(ClientMessage::Command(cmd))) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    reply_error(cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                    continue;
                }

                // The game loop acks once the command is applied.
                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(ClientCommand::from(cmd.command)),
                };
                if command_tx.try_send(inbound).is_err() {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            Ok(ParsedMessage::Client(ClientMessage::Control(ctrl))) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                match ctrl.action {
                    ControlAction::Claim if controller.is_none() => {
                        *controller = Some(client_id);
                        info!(client_id, "controller claimed");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, None)));
                    }
                    ControlAction::Claim => {
                        reply_error(ctrl.seq, ErrorCode::ControllerActive, "controller already assigned");
                    }
                    ControlAction::Release if *controller == Some(client_id) => {
                        *controller = None;
                        info!(client_id, "controller released");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, None)));
                    }
                    ControlAction::Release => {
                        reply_error(ctrl.seq, ErrorCode::NotController, "only the controller may release");
                    }
                }
            }

            Ok(ParsedMessage::Unknown { seq }) => {
                reply_error(seq, ErrorCode::InvalidCommand, "unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("json parse error: {e}"));
            }
        }
    }

    Ok(())
}

/// Build an observation from a game snapshot.
///
/// The state hash covers everything a controller can act on: cells, moves,
/// score, goals, boosters, selection, outcome and episode.
pub fn build_observation(snapshot: GameSnapshot, seq: u64) -> ObservationMessage {
    let mut hasher = Fnv1a::default();
    snapshot.episode_id.hash(&mut hasher);
    snapshot.cols.hash(&mut hasher);
    snapshot.rows.hash(&mut hasher);
    snapshot.cells.hash(&mut hasher);
    snapshot.moves_left.hash(&mut hasher);
    snapshot.score.hash(&mut hasher);
    for goal in &snapshot.goals {
        goal.kind.hash(&mut hasher);
        goal.remaining.hash(&mut hasher);
    }
    snapshot.boosters.wand.hash(&mut hasher);
    snapshot.boosters.hammer.hash(&mut hasher);
    snapshot.boosters.glove.hash(&mut hasher);
    snapshot.boosters.armed.hash(&mut hasher);
    snapshot.selection.hash(&mut hasher);
    snapshot.outcome.hash(&mut hasher);

    ObservationMessage {
        seq,
        playable: snapshot.playable(),
        state_hash: StateHash(hasher.finish()),
        snapshot,
    }
}
