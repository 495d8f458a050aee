//! Local motion and reconciliation
//!
//! The local head is pinned to the screen center; moving the snake means
//! scrolling the camera. The server is authoritative for score, length and
//! collected tokens, so those are only ever replaced from its payloads.

use glam::Vec2;

use super::chain::{radius_for_length, rebuild_chain, resize_chain, segment_count, segment_spacing};
use crate::color::SnakeColors;
use crate::consts::{
    FORWARD_SPEED, MAX_SNAKE_LENGTH, SCREEN_CENTER, WORLD_HEIGHT, WORLD_ORIGIN, WORLD_WIDTH,
};
use crate::net::protocol::{Player, TokenBalance};
use crate::{angle_between, heading_vector, normalize_angle};

/// World-to-screen translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position of the screen's top-left corner
    pub offset: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: WORLD_ORIGIN,
        }
    }
}

impl Camera {
    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }

    /// World position under the local head
    #[inline]
    pub fn head_world(&self) -> Vec2 {
        self.screen_to_world(SCREEN_CENTER)
    }

    /// Head position relative to the world's top-left corner, in 0..=1
    pub fn world_fraction(&self) -> Vec2 {
        (self.head_world() - WORLD_ORIGIN) / Vec2::new(WORLD_WIDTH, WORLD_HEIGHT)
    }
}

/// Heading that points the head at `pointer` (screen coordinates)
pub fn heading_toward(pointer: Vec2) -> f32 {
    angle_between(SCREEN_CENTER, pointer)
}

/// The snake this client controls
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    pub id: String,
    pub name: String,
    /// Segments trailing the head, nearest first (screen coordinates)
    pub body: Vec<Vec2>,
    pub radius: f32,
    pub speed: f32,
    pub heading: f32,
    pub colors: SnakeColors,
    pub score: u64,
    pub length: u32,
    pub collected_tokens: Vec<TokenBalance>,
}

impl LocalPlayer {
    /// Build from the server's join confirmation
    pub fn from_player(player: &Player, colors: SnakeColors) -> Self {
        let radius = radius_for_length(player.length);
        let length = player.length.min(MAX_SNAKE_LENGTH);
        let heading = normalize_angle(player.angle);
        let mut body = vec![SCREEN_CENTER; segment_count(length)];
        rebuild_chain(&mut body, SCREEN_CENTER, heading, segment_spacing(radius));
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            body,
            radius,
            speed: FORWARD_SPEED,
            heading,
            colors,
            score: player.score,
            length,
            collected_tokens: player.collected_tokens.clone(),
        }
    }

    /// Head position on screen (always the center)
    #[inline]
    pub fn head(&self) -> Vec2 {
        SCREEN_CENTER
    }

    /// One tick of motion: scroll the camera along `heading`, relay the body
    /// behind the head, and return the new world position of the head.
    pub fn advance(&mut self, camera: &mut Camera, heading: f32) -> Vec2 {
        self.heading = heading;
        camera.offset += heading_vector(heading) * self.speed;
        rebuild_chain(
            &mut self.body,
            SCREEN_CENTER,
            heading,
            segment_spacing(self.radius),
        );
        camera.head_world()
    }

    /// Apply an authoritative update for this player; returns false when the
    /// payload is for someone else
    pub fn reconcile(&mut self, player: &Player) -> bool {
        if player.id != self.id {
            return false;
        }
        let target = segment_count(player.length);
        if target != self.body.len() {
            log::debug!("Resizing local snake {} -> {}", self.body.len(), target);
            let fallback = self.body.last().copied().unwrap_or(SCREEN_CENTER);
            resize_chain(&mut self.body, target, fallback);
        }
        self.radius = radius_for_length(player.length);
        self.score = player.score;
        self.length = player.length.min(MAX_SNAKE_LENGTH);
        self.collected_tokens = player.collected_tokens.clone();
        true
    }

    /// Sum of collected token amounts
    pub fn collected_total(&self) -> f64 {
        self.collected_tokens.iter().map(|t| t.amount).sum()
    }
}
