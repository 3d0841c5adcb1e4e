//! Adapter - scripted and AI control over a TCP socket
//!
//! External agents drive a running game through a **line-delimited JSON
//! protocol**: one JSON object per line, in both directions.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Controller assignment**: the first client to say hello controls the
//!    game; later clients observe until the controller releases or leaves
//! 4. **Commanding**: the controller sends `command` messages, each carrying
//!    one pointer or booster action
//! 5. **Observation**: after every applied command the full board snapshot
//!    is sent to every client that asked for observations
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, whether to stream observations
//! - **command**: `tap`, `swipe`, `swap`, `arm`, `disarm` or `restart`
//! - **control**: `claim` or `release` the controller role
//!
//! ## Server → Client
//!
//! - **welcome**: assigned role and client id
//! - **ack**: the command was applied, with what it did
//! - **error**: code and message; the offending `seq` is echoed
//! - **observation**: [`GameSnapshot`](crate::core::GameSnapshot) plus a stable state hash
//!
//! Every client message carries a `seq` that must strictly increase per
//! connection.
//!
//! # Environment Variables
//!
//! - `TILE_MATCH_AI_HOST`: bind address (default `127.0.0.1`)
//! - `TILE_MATCH_AI_PORT`: port (default `7878`)
//! - `TILE_MATCH_AI_MAX_PENDING`: queued commands before `backpressure` (default `256`)
//! - `TILE_MATCH_AI_DISABLED`: `1` or `true` disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"client":{"name":"bot"},"protocol_version":"1.0.0"}
//! S: {"type":"welcome","seq":1,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! S: {"type":"observation","seq":1,"playable":true,"state_hash":"…","level_id":1,"cells":[...],...}
//! C: {"type":"command","seq":2,"command":{"action":"swipe","col":3,"row":4,"direction":"up"}}
//! S: {"type":"ack","seq":2,"result":{"result":"resolved","moves_spent":1,"removed":3}}
//! S: {"type":"observation","seq":2,...}
//! ```
//!
//! # Threading
//!
//! The game state is single-threaded. [`Adapter`] owns a tokio runtime that
//! runs the listener; commands reach the game loop through a bounded channel
//! and replies leave through an unbounded one, so the loop never blocks.

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tile_match_core as core;
pub use tile_match_types as types;

pub use protocol::*;
pub use runtime::{apply_command, Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, run_server, serve, ServerConfig, ServerState};
