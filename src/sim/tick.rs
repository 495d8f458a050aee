//! Per-tick pipeline
//!
//! One call to [`ClientSim::tick`] runs the whole frame in a fixed order:
//! clear, background, local motion, safe zone, food (with pickup checks),
//! local snake, remote snakes, minimap. Each stage sees the mutations of the
//! stages before it in the same tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::chain::radius_for_length;
use super::collision::{SafeZone, detect_pickups, on_screen};
use super::interp::{Interpolator, Pose};
use super::motion::{Camera, LocalPlayer};
use crate::color::SnakeColors;
use crate::consts::{BLEND_FACTOR, FOOD_CULL_MARGIN, MAX_VISIBLE_PLAYERS, PLAYER_CULL_MARGIN};
use crate::net::protocol::{ClientMessage, Player};
use crate::normalize_angle;
use crate::renderer::frame::Frame;
use crate::renderer::scene;
use crate::renderer::shapes::{SnakeView, draw_snake};
use crate::store::ClientStore;

/// Render state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
    /// No local player yet
    #[default]
    Idle,
    Running,
    /// Scene still drawn, local motion frozen
    Paused,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired heading (from the pointer position)
    pub heading: Option<f32>,
    /// Pause toggle
    pub toggle_pause: bool,
}

/// Tunables read every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickConfig {
    pub blend: f32,
    pub max_visible: usize,
    /// Antennae and legs on remote snakes
    pub remote_detail: bool,
    pub show_minimap: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            blend: BLEND_FACTOR,
            max_visible: MAX_VISIBLE_PLAYERS,
            remote_detail: true,
            show_minimap: true,
        }
    }
}

/// Result of one tick
#[derive(Debug, Default)]
pub struct TickOutput {
    pub frame: Frame,
    /// Messages to hand to the transport, in order
    pub outbound: Vec<ClientMessage>,
    pub in_safe_zone: bool,
    pub remotes_drawn: usize,
}

/// Local prediction, remote smoothing and scene assembly
pub struct ClientSim {
    pub local: Option<LocalPlayer>,
    pub camera: Camera,
    pub heading: f32,
    pub phase: RenderPhase,
    pub interp: Interpolator,
    pub safe_zone: SafeZone,
    pub config: TickConfig,
    rng: Pcg32,
}

impl ClientSim {
    pub fn new(seed: u64, config: TickConfig) -> Self {
        Self {
            local: None,
            camera: Camera::default(),
            heading: 0.0,
            phase: RenderPhase::Idle,
            interp: Interpolator::new(seed.wrapping_add(1)),
            safe_zone: SafeZone::default(),
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Create the local snake from the server's join confirmation
    pub fn spawn_local(&mut self, player: &Player) {
        let colors = SnakeColors::random(&mut self.rng);
        self.local = Some(LocalPlayer::from_player(player, colors));
        self.camera = Camera::default();
        self.heading = normalize_angle(player.angle);
        self.interp.remove(&player.id);
        if self.phase == RenderPhase::Idle {
            log::info!("Local player {} ready", player.id);
            self.phase = RenderPhase::Running;
        }
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local.as_ref().map(|l| l.id.as_str())
    }

    /// Apply an authoritative update if it concerns the local player
    pub fn reconcile_local(&mut self, player: &Player) -> bool {
        self.local.as_mut().is_some_and(|l| l.reconcile(player))
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            RenderPhase::Running => RenderPhase::Paused,
            RenderPhase::Paused => RenderPhase::Running,
            RenderPhase::Idle => RenderPhase::Idle,
        };
        log::debug!("Render phase: {:?}", self.phase);
    }

    /// Forget the local player and every remote track
    pub fn reset(&mut self) {
        self.local = None;
        self.camera = Camera::default();
        self.heading = 0.0;
        self.phase = RenderPhase::Idle;
        self.interp.clear();
    }

    /// Advance one tick and record the frame
    pub fn tick(&mut self, store: &ClientStore, input: &TickInput, now_ms: f64) -> TickOutput {
        if let Some(heading) = input.heading.filter(|h| h.is_finite()) {
            self.heading = heading;
        }
        if input.toggle_pause {
            self.toggle_pause();
        }

        let mut out = TickOutput::default();
        let Some(local) = self.local.as_mut() else {
            scene::loading(&mut out.frame);
            return out;
        };

        out.frame.clear();
        scene::background(&mut out.frame, &self.camera);

        if self.phase == RenderPhase::Running {
            let world = local.advance(&mut self.camera, self.heading);
            out.outbound.push(ClientMessage::PlayerMove {
                x: world.x,
                y: world.y,
                angle: self.heading,
            });
        }

        out.in_safe_zone = self.safe_zone.contains(self.camera.head_world());
        if self.safe_zone.is_visible(&self.camera) {
            scene::safe_zone(
                &mut out.frame,
                &self.safe_zone,
                &self.camera,
                out.in_safe_zone,
                store.can_escape,
            );
        }

        for food in &store.foods {
            let at = self.camera.world_to_screen(food.position.into());
            if on_screen(at, FOOD_CULL_MARGIN) {
                scene::food(&mut out.frame, at, &food.token.color);
            }
        }
        for food in detect_pickups(&store.foods, &self.camera, local.head(), local.radius) {
            out.outbound.push(ClientMessage::EatFood(food.id.clone()));
        }

        draw_snake(
            &mut out.frame,
            &SnakeView {
                head: local.head(),
                heading: local.heading,
                body: &local.body,
                radius: local.radius,
                colors: local.colors,
                name: &local.name,
                detail: true,
            },
        );
        let local_id = local.id.clone();
        let local_color = local.colors.main;

        out.remotes_drawn = self.draw_remotes(&mut out.frame, store, &local_id, now_ms);

        if self.config.show_minimap {
            scene::minimap(&mut out.frame, &self.camera, local_color);
        }
        out
    }

    fn draw_remotes(&mut self, frame: &mut Frame, store: &ClientStore, local_id: &str, now_ms: f64) -> usize {
        let camera = self.camera;
        let visible = store
            .players
            .iter()
            .filter(|p| p.alive && p.id != local_id)
            .filter(|p| on_screen(camera.world_to_screen(p.position.into()), PLAYER_CULL_MARGIN))
            .take(self.config.max_visible);

        let mut drawn = 0;
        for player in visible {
            let latest = Pose::new(player.position.into(), player.angle);
            let stale = self
                .interp
                .track(&player.id)
                .is_none_or(|t| t.target() != Some(latest));
            if stale {
                self.interp.observe(player, now_ms);
            }

            let Some(pose) = self.interp.interpolate(&player.id, self.config.blend) else {
                continue;
            };
            let radius = radius_for_length(player.length);
            let Some(body) = self.interp.rebuild_body(&player.id, radius, player.length) else {
                continue;
            };
            let body: Vec<Vec2> = body.iter().map(|p| camera.world_to_screen(*p)).collect();
            let Some(colors) = self.interp.track(&player.id).map(|t| t.colors) else {
                continue;
            };

            draw_snake(
                frame,
                &SnakeView {
                    head: camera.world_to_screen(pose.position),
                    heading: pose.angle,
                    body: &body,
                    radius,
                    colors,
                    name: &player.name,
                    detail: self.config.remote_detail,
                },
            );
            drawn += 1;
        }
        drawn
    }
}
