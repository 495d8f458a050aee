//! Network layer
//!
//! - `protocol`: event names, payload types and the JSON envelope
//! - `transport`: connection trait, listener bus, typed outbound calls
//! - `ws`: browser WebSocket connection (wasm only)

pub mod protocol;
pub mod transport;
#[cfg(target_arch = "wasm32")]
pub mod ws;

pub use protocol::{
    ClientMessage, EventKind, Food, GameSnapshot, LeaderboardEntry, MapToken, Player, Point,
    ServerEvent, TokenBalance,
};
pub use transport::{Connection, EventBus, ReconnectPolicy, SharedBus, Transport, dispatch};
#[cfg(target_arch = "wasm32")]
pub use ws::WsConnection;
