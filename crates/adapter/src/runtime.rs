//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. The game
//! state never leaves the loop's thread; commands arrive through a bounded
//! channel and replies go back through an unbounded one.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::core::GameState;
use crate::protocol::{create_ack, create_error, AckMessage, CommandResult, ErrorCode, ErrorMessage, GameCommand, ObservationMessage};
use crate::server::{build_observation, serve, ServerConfig, ServerState};
use crate::types::{BoosterKind, Coord, Direction, Gesture};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client finished its handshake and wants the current state.
    SnapshotRequest,
}

/// Command payload, in engine terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Pointer { at: Coord, gesture: Gesture },
    Swap { from: Coord, to: Coord },
    Arm(BoosterKind),
    Disarm,
    Restart,
}

impl From<GameCommand> for ClientCommand {
    fn from(value: GameCommand) -> Self {
        match value {
            GameCommand::Tap { col, row } => ClientCommand::Pointer {
                at: Coord::new(col, row),
                gesture: Gesture::Tap,
            },
            GameCommand::Swipe {
                col,
                row,
                direction,
            } => ClientCommand::Pointer {
                at: Coord::new(col, row),
                gesture: Gesture::Swipe(direction),
            },
            GameCommand::Swap { from, to } => ClientCommand::Swap { from, to },
            GameCommand::Arm { booster } => ClientCommand::Arm(booster),
            GameCommand::Disarm => ClientCommand::Disarm,
            GameCommand::Restart => ClientCommand::Restart,
        }
    }
}

impl ClientCommand {
    pub fn swipe(at: Coord, direction: Direction) -> Self {
        ClientCommand::Pointer {
            at,
            gesture: Gesture::Swipe(direction),
        }
    }
}

/// Apply one command to the game.
///
/// Invalid actions come back as [`CommandResult::Ignored`]; errors are the
/// engine's unreachable-configuration failures and level rebuild failures.
pub fn apply_command(game: &mut GameState, command: ClientCommand) -> anyhow::Result<CommandResult> {
    let result: CommandResult = match command {
        ClientCommand::Pointer { at, gesture } => game.pointer(at, gesture)?.into(),
        ClientCommand::Swap { from, to } => game.swap_tiles(from, to)?.into(),
        ClientCommand::Arm(booster) => {
            if game.arm_booster(booster) {
                CommandResult::Armed { booster }
            } else {
                CommandResult::Ignored
            }
        }
        ClientCommand::Disarm => {
            game.disarm_booster();
            CommandResult::Disarmed
        }
        ClientCommand::Restart => {
            game.restart().context("restarting level")?;
            CommandResult::Restarted
        }
    };
    Ok(result)
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Ack { client_id: usize, ack: AckMessage },
    Error { client_id: usize, err: ErrorMessage },
    Observation { client_id: usize, obs: ObservationMessage },
    /// To every client that asked for observations.
    BroadcastObservation { obs: ObservationMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    local_addr: SocketAddr,
    state: Arc<ServerState>,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    observation_seq: u64,
}

impl Adapter {
    /// Start the adapter from `TILE_MATCH_AI_*` environment variables.
    ///
    /// Returns `Ok(None)` when `TILE_MATCH_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerState::is_disabled() {
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Bind and serve in a background runtime. Returns once the listener is up.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let state = Arc::new(ServerState::new());
        let server_state = Arc::clone(&state);

        let rt = Runtime::new().context("creating adapter runtime")?;
        rt.spawn(async move {
            if let Err(e) = serve(server_state, config, cmd_tx, out_rx, Some(ready_tx)).await {
                warn!(error = %e, "adapter server stopped");
            }
        });
        let local_addr = rt
            .block_on(ready_rx)
            .context("adapter server failed to start")?;

        Ok(Self {
            _rt: rt,
            local_addr,
            state,
            cmd_rx,
            out_tx,
            observation_seq: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connected clients and controller id; `None` if the server is busy.
    pub fn status(&self) -> Option<(usize, Option<usize>)> {
        self.state.try_status()
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Apply an inbound command and send the replies: ack or error to the
    /// sender, then an observation to every streaming client.
    ///
    /// Returns whether the game may have changed.
    pub fn handle(&mut self, game: &mut GameState, inbound: InboundCommand) -> bool {
        let InboundCommand {
            client_id,
            seq,
            payload,
        } = inbound;

        match payload {
            InboundPayload::SnapshotRequest => {
                let obs = self.observe(game);
                self.send(OutboundMessage::Observation { client_id, obs });
                false
            }
            InboundPayload::Command(command) => {
                match apply_command(game, command) {
                    Ok(result) => {
                        let ack = create_ack(seq, Some(result));
                        self.send(OutboundMessage::Ack { client_id, ack });
                    }
                    Err(e) => {
                        warn!(client_id, seq, error = %e, "command failed");
                        let err = create_error(seq, ErrorCode::EngineFailure, &format!("{e:#}"));
                        self.send(OutboundMessage::Error { client_id, err });
                    }
                }
                let obs = self.observe(game);
                self.send(OutboundMessage::BroadcastObservation { obs });
                true
            }
        }
    }

    /// Send the current state to every streaming client, for changes made
    /// outside the adapter (local play).
    pub fn broadcast(&mut self, game: &GameState) {
        let obs = self.observe(game);
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    fn observe(&mut self, game: &GameState) -> ObservationMessage {
        self.observation_seq += 1;
        build_observation(game.snapshot(), self.observation_seq)
    }
}
