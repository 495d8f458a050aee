//! Wire protocol
//!
//! Every frame is a JSON text message `{"event": <name>, "data": <payload>}`.
//! Event names are shared with the server verbatim; payload fields keep the
//! server's camelCase spelling.

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::consts::MAX_SNAKE_LENGTH;
use crate::error::{ClientError, Result};

/// World-space point as sent by the server
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// A token amount with its display color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    #[serde(default)]
    pub address: String,
    pub symbol: String,
    pub amount: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub wallet_address: String,
    pub position: Point,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub length: u32,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default)]
    pub collected_tokens: Vec<TokenBalance>,
    #[serde(default)]
    pub staked_tokens: Vec<TokenBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_time: Option<f64>,
}

fn default_alive() -> bool {
    true
}

impl Player {
    /// Repair values the client cannot lay out: a non-finite heading becomes
    /// 0 and the length is clamped. Returns false when the position itself is
    /// unusable.
    pub fn sanitize(&mut self) -> bool {
        if !self.angle.is_finite() {
            log::warn!("Player {} sent a non-finite angle", self.id);
            self.angle = 0.0;
        }
        if self.length > MAX_SNAKE_LENGTH {
            log::warn!("Player {} length {} clamped", self.id, self.length);
            self.length = MAX_SNAKE_LENGTH;
        }
        if !self.position.is_finite() {
            log::warn!("Player {} sent a non-finite position", self.id);
            return false;
        }
        true
    }

    /// Sum of collected token amounts
    pub fn collected_total(&self) -> f64 {
        self.collected_tokens.iter().map(|t| t.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: String,
    pub position: Point,
    pub token: TokenBalance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    #[serde(default)]
    pub survival_time: f64,
}

/// Aggregate of tokens lying on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapToken {
    pub symbol: String,
    #[serde(default)]
    pub address: String,
    pub amount: f64,
    pub count: u32,
    pub color: String,
}

/// Full authoritative state broadcast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub map_tokens: Option<Vec<MapToken>>,
}

/// `game-state-update` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUpdate {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub map_tokens: Option<Vec<MapToken>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMoved {
    #[serde(alias = "playerId", alias = "socketId")]
    pub id: String,
    pub position: Point,
    #[serde(default)]
    pub angle: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEaten {
    pub food_id: String,
    #[serde(default)]
    pub player_id: String,
}

/// Message carried by `escape-failed` and `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainUpdate {
    pub success: bool,
    #[serde(default)]
    pub final_status: Option<String>,
}

/// Raw frame on the socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Inbound event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PlayerJoined,
    PlayerLeft,
    PlayerMoved,
    PlayerUpdated,
    GameState,
    GameStateUpdate,
    FoodEaten,
    PlayerDiedCollision,
    CanEscape,
    EscapeSuccess,
    EscapeFailed,
    Error,
    BlockchainUpdateComplete,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::PlayerJoined,
        EventKind::PlayerLeft,
        EventKind::PlayerMoved,
        EventKind::PlayerUpdated,
        EventKind::GameState,
        EventKind::GameStateUpdate,
        EventKind::FoodEaten,
        EventKind::PlayerDiedCollision,
        EventKind::CanEscape,
        EventKind::EscapeSuccess,
        EventKind::EscapeFailed,
        EventKind::Error,
        EventKind::BlockchainUpdateComplete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::PlayerJoined => "player-joined",
            EventKind::PlayerLeft => "player-left",
            EventKind::PlayerMoved => "player-moved",
            EventKind::PlayerUpdated => "player-updated",
            EventKind::GameState => "game-state",
            EventKind::GameStateUpdate => "game-state-update",
            EventKind::FoodEaten => "food-eaten",
            EventKind::PlayerDiedCollision => "player-died-collision",
            EventKind::CanEscape => "can-escape",
            EventKind::EscapeSuccess => "escape-success",
            EventKind::EscapeFailed => "escape-failed",
            EventKind::Error => "error",
            EventKind::BlockchainUpdateComplete => "blockchain-update-complete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Decoded inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    PlayerJoined(Player),
    PlayerLeft(String),
    PlayerMoved(PlayerMoved),
    PlayerUpdated(Player),
    GameState(GameSnapshot),
    GameStateUpdate(LeaderboardUpdate),
    FoodEaten(FoodEaten),
    /// The dead player, when the server includes it
    PlayerDiedCollision(Option<Player>),
    CanEscape(bool),
    EscapeSuccess,
    EscapeFailed(ErrorMessage),
    Error(ErrorMessage),
    BlockchainUpdateComplete(BlockchainUpdate),
}

fn payload<T: DeserializeOwned>(kind: EventKind, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| ClientError::Payload {
        event: kind.name().to_string(),
        source,
    })
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::PlayerJoined(_) => EventKind::PlayerJoined,
            ServerEvent::PlayerLeft(_) => EventKind::PlayerLeft,
            ServerEvent::PlayerMoved(_) => EventKind::PlayerMoved,
            ServerEvent::PlayerUpdated(_) => EventKind::PlayerUpdated,
            ServerEvent::GameState(_) => EventKind::GameState,
            ServerEvent::GameStateUpdate(_) => EventKind::GameStateUpdate,
            ServerEvent::FoodEaten(_) => EventKind::FoodEaten,
            ServerEvent::PlayerDiedCollision(_) => EventKind::PlayerDiedCollision,
            ServerEvent::CanEscape(_) => EventKind::CanEscape,
            ServerEvent::EscapeSuccess => EventKind::EscapeSuccess,
            ServerEvent::EscapeFailed(_) => EventKind::EscapeFailed,
            ServerEvent::Error(_) => EventKind::Error,
            ServerEvent::BlockchainUpdateComplete(_) => EventKind::BlockchainUpdateComplete,
        }
    }

    pub fn from_envelope(env: Envelope) -> Result<Self> {
        let kind = EventKind::from_name(&env.event)
            .ok_or_else(|| ClientError::UnknownEvent(env.event.clone()))?;
        let data = env.data;
        let event = match kind {
            EventKind::PlayerJoined => ServerEvent::PlayerJoined(payload(kind, data)?),
            EventKind::PlayerLeft => ServerEvent::PlayerLeft(payload(kind, data)?),
            EventKind::PlayerMoved => ServerEvent::PlayerMoved(payload(kind, data)?),
            EventKind::PlayerUpdated => ServerEvent::PlayerUpdated(payload(kind, data)?),
            EventKind::GameState => ServerEvent::GameState(payload(kind, data)?),
            EventKind::GameStateUpdate => ServerEvent::GameStateUpdate(payload(kind, data)?),
            EventKind::FoodEaten => ServerEvent::FoodEaten(payload(kind, data)?),
            EventKind::PlayerDiedCollision => {
                ServerEvent::PlayerDiedCollision(payload(kind, data)?)
            }
            EventKind::CanEscape => ServerEvent::CanEscape(payload(kind, data)?),
            EventKind::EscapeSuccess => ServerEvent::EscapeSuccess,
            EventKind::EscapeFailed => ServerEvent::EscapeFailed(payload(kind, data)?),
            EventKind::Error => ServerEvent::Error(payload(kind, data)?),
            EventKind::BlockchainUpdateComplete => {
                ServerEvent::BlockchainUpdateComplete(payload(kind, data)?)
            }
        };
        event.sanitized()
    }

    /// Clamp or reject geometry that would break layout
    pub fn sanitized(mut self) -> Result<Self> {
        let kind = self.kind();
        let invalid = |reason: &'static str| ClientError::InvalidPayload {
            event: kind.name().to_string(),
            reason,
        };
        match &mut self {
            ServerEvent::PlayerJoined(p) | ServerEvent::PlayerUpdated(p) => {
                if !p.sanitize() {
                    return Err(invalid("non-finite position"));
                }
            }
            ServerEvent::PlayerDiedCollision(Some(p)) => {
                p.sanitize();
            }
            ServerEvent::PlayerMoved(moved) => {
                if !moved.position.is_finite() {
                    log::warn!("Player {} moved to a non-finite position", moved.id);
                    return Err(invalid("non-finite position"));
                }
                if moved.angle.is_some_and(|a| !a.is_finite()) {
                    log::warn!("Player {} sent a non-finite angle", moved.id);
                    moved.angle = None;
                }
            }
            ServerEvent::GameState(snapshot) => {
                snapshot.players.retain_mut(Player::sanitize);
                snapshot.foods.retain(|f| {
                    let ok = f.position.is_finite();
                    if !ok {
                        log::warn!("Dropping food {} with a non-finite position", f.id);
                    }
                    ok
                });
            }
            _ => {}
        }
        Ok(self)
    }

    /// Decode a text frame
    pub fn decode(text: &str) -> Result<Self> {
        let env: Envelope = serde_json::from_str(text).map_err(|source| ClientError::Payload {
            event: "envelope".to_string(),
            source,
        })?;
        Self::from_envelope(env)
    }
}

/// Outbound calls
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    JoinGame {
        name: String,
        wallet_address: String,
        staked_tokens: Vec<TokenBalance>,
    },
    PlayerMove {
        x: f32,
        y: f32,
        angle: f32,
    },
    EatFood(String),
    PlayerDied,
    PlayerEscape,
}

impl ClientMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::JoinGame { .. } => "join-game",
            ClientMessage::PlayerMove { .. } => "player-move",
            ClientMessage::EatFood(_) => "eat-food",
            ClientMessage::PlayerDied => "player-died",
            ClientMessage::PlayerEscape => "player-escape",
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        let data = match self {
            ClientMessage::JoinGame {
                name,
                wallet_address,
                staked_tokens,
            } => json!({
                "name": name,
                "walletAddress": wallet_address,
                "stakedTokens": staked_tokens,
            }),
            ClientMessage::PlayerMove { x, y, angle } => json!({ "x": x, "y": y, "angle": angle }),
            ClientMessage::EatFood(food_id) => json!(food_id),
            ClientMessage::PlayerDied | ClientMessage::PlayerEscape => Value::Null,
        };
        Envelope {
            event: self.event_name().to_string(),
            data,
        }
    }

    /// Encode as a text frame
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.to_envelope()).map_err(|source| ClientError::Payload {
            event: self.event_name().to_string(),
            source,
        })
    }
}
