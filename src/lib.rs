//! Stake Snake - browser client for a staked multiplayer snake game
//!
//! Core modules:
//! - `net`: Wire protocol and transport adapter (WebSocket on wasm)
//! - `store`: Client state store fed by server snapshots and events
//! - `sim`: Local motion, remote interpolation, pickup detection, tick pipeline
//! - `renderer`: Display list construction and the Canvas 2D backend
//! - `platform`: Frame-rate gating and browser loop plumbing
//! - `phase`: Start / playing / game-over / pending-claim controller
//! - `client`: `GameClient`, the single owner that events and ticks go through

pub mod client;
pub mod color;
pub mod error;
pub mod net;
pub mod phase;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod store;

pub use client::{GameClient, Hud, Notice};
pub use error::{ClientError, Result, Severity};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Logical canvas size in pixels
    pub const SCREEN_WIDTH: f32 = 1000.0;
    pub const SCREEN_HEIGHT: f32 = 800.0;
    /// Screen center, where the local head is always drawn
    pub const SCREEN_CENTER: Vec2 = Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0);

    /// World dimensions; the world's top-left corner sits at `WORLD_ORIGIN`
    pub const WORLD_WIDTH: f32 = 4000.0;
    pub const WORLD_HEIGHT: f32 = 2000.0;
    pub const WORLD_ORIGIN: Vec2 = Vec2::new(-1200.0, -600.0);

    /// Default render tick rate (Hz)
    pub const TICK_RATE: u32 = 30;

    /// Snake radius step function: base + step per `LENGTH_PER_STEP`, capped
    pub const BASE_RADIUS: f32 = 7.0;
    pub const RADIUS_STEP: f32 = 1.5;
    pub const LENGTH_PER_STEP: u32 = 30;
    pub const MAX_RADIUS: f32 = 20.0;
    /// Longest snake the client will lay out; longer reported lengths are clamped
    pub const MAX_SNAKE_LENGTH: u32 = 2000;

    /// Forward speed in world units per tick
    pub const FORWARD_SPEED: f32 = 5.0;
    /// Extra radius added to the head for pickup tests
    pub const HEAD_MARGIN: f32 = 3.0;
    /// Tail segments shrink linearly down to this fraction removed
    pub const MAX_SHRINK: f32 = 0.3;
    /// Head is drawn slightly larger than the body radius
    pub const HEAD_SCALE: f32 = 1.03;

    /// Food circle radius and its white core
    pub const FOOD_RADIUS: f32 = 5.0;
    pub const FOOD_CORE_RADIUS: f32 = 2.0;

    /// Off-screen margins used for culling
    pub const FOOD_CULL_MARGIN: f32 = 50.0;
    pub const PLAYER_CULL_MARGIN: f32 = 100.0;
    pub const SAFE_ZONE_CULL_MARGIN: f32 = 150.0;

    /// Remote snakes drawn per tick at most
    pub const MAX_VISIBLE_PLAYERS: usize = 50;
    /// Default interpolation blend factor per tick
    pub const BLEND_FACTOR: f32 = 0.2;

    /// Safe zone (axis-aligned square in world coordinates)
    pub const SAFE_ZONE_CENTER: Vec2 = Vec2::new(800.0, 400.0);
    pub const SAFE_ZONE_HALF_SIZE: f32 = 150.0;

    /// Score needed before the server unlocks escape (HUD hint only)
    pub const ESCAPE_SCORE: u64 = 100;

    /// Minimap panel
    pub const MINIMAP_WIDTH: f32 = 100.0;
    pub const MINIMAP_HEIGHT: f32 = 50.0;
    pub const MINIMAP_MARGIN: f32 = 20.0;
    pub const MINIMAP_DOT_RADIUS: f32 = 3.0;
}

/// Wrap an angle into (-π, π]; non-finite input maps to 0
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Heading from `from` toward `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit vector for a heading
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Strict circle overlap: touching circles do not collide
#[inline]
pub fn circle_collision(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}
