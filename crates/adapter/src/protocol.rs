//! Wire messages for the adapter.
//!
//! One JSON object per line. Both directions tag objects with `type` and
//! carry the `seq` of the client message they belong to.

use serde::{Deserialize, Serialize};

use crate::core::{ActionOutcome, GameSnapshot};
use crate::types::{BoosterKind, Coord, Direction};

/// Version spoken by this server. Clients must share the major version.
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Game Messages ==============

/// Everything a client may send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
}

/// First message on a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

/// Client identity, used for logging only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    /// Receive an observation after every applied command.
    #[serde(default = "stream_by_default")]
    pub stream_observations: bool,
}

fn stream_by_default() -> bool {
    true
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: stream_by_default(),
        }
    }
}

/// One game action; controller only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    pub command: GameCommand,
}

/// One player action, in grid coordinates.
///
/// `tap` and `swipe` follow the pointer path exactly, selection included.
/// `swap` exchanges two tiles directly under the same rules a selection
/// followed by a tap obeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GameCommand {
    Tap { col: i8, row: i8 },
    Swipe { col: i8, row: i8, direction: Direction },
    Swap { from: Coord, to: Coord },
    Arm { booster: BoosterKind },
    Disarm,
    Restart,
}

/// Claim or release the controller seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Claim,
    Release,
}

// ============== Game -> Client Messages ==============

/// Everything the server sends, borrowed for encoding.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    Welcome(&'a WelcomeMessage),
    Ack(&'a AckMessage),
    Error(&'a ErrorMessage),
    Observation(&'a ObservationMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
    /// The engine hit an unreachable configuration (cascade or reshuffle cap).
    EngineFailure,
}

/// Reply to `hello`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
}

/// What an applied command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Ignored,
    Selected { at: Coord },
    Deselected,
    Reverted,
    Resolved { moves_spent: u32, removed: u32 },
    Armed { booster: BoosterKind },
    Disarmed,
    Restarted,
}

impl From<ActionOutcome> for CommandResult {
    fn from(value: ActionOutcome) -> Self {
        match value {
            ActionOutcome::Ignored => CommandResult::Ignored,
            ActionOutcome::Selected(at) => CommandResult::Selected { at },
            ActionOutcome::Deselected => CommandResult::Deselected,
            ActionOutcome::Reverted => CommandResult::Reverted,
            ActionOutcome::Resolved {
                moves_spent,
                removed,
            } => CommandResult::Resolved {
                moves_spent,
                removed,
            },
        }
    }
}

/// A command or control message was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Full game snapshot, sent after every applied command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub playable: bool,
    pub state_hash: StateHash,
    #[serde(flatten)]
    pub snapshot: GameSnapshot,
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(serde::de::Error::custom)
    }
}

// ============== Parsing ==============

/// An inbound line, or the `seq` of a well-formed object whose `type` this
/// server does not speak.
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Client(ClientMessage),
    Unknown { seq: u64 },
}

/// Parse one inbound line.
///
/// Unknown message types are not errors, so the caller can answer them
/// instead of dropping the connection.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    let err = match serde_json::from_str::<ClientMessage>(json) {
        Ok(msg) => return Ok(ParsedMessage::Client(msg)),
        Err(e) => e,
    };

    #[derive(Deserialize)]
    struct Envelope<'a> {
        #[serde(rename = "type", borrow)]
        msg_type: Option<&'a str>,
        seq: Option<u64>,
    }
    let envelope = serde_json::from_str::<Envelope>(json)?;
    match envelope.msg_type {
        Some("hello" | "command" | "control") => Err(err),
        _ => Ok(ParsedMessage::Unknown {
            seq: envelope.seq.unwrap_or(0),
        }),
    }
}

/// Pull `seq` out of a line that failed to parse, so the error can echo it.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    rest[..end].parse::<u64>().ok()
}

// ============== Constructors ==============

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> ClientMessage {
    ClientMessage::Hello(HelloMessage {
        seq,
        client: ClientInfo {
            name: client_name.to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities::default(),
    })
}

pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        seq,
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        controller_id,
    }
}

pub fn create_ack(seq: u64, result: Option<CommandResult>) -> AckMessage {
    AckMessage { seq, result }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        seq,
        code,
        message: message.to_string(),
    }
}

/// Whether a client's version string shares our major version.
pub fn is_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::trim).map(str::to_owned);
    major(version).is_some_and(|m| Some(m) == major(PROTOCOL_VERSION))
}
