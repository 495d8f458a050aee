//! Remote entity interpolation
//!
//! Each remote snake keeps the last authoritative pose (target) and a
//! smoothed pose (current). Every render tick the current pose moves a fixed
//! fraction of the remaining distance toward the target. This is plain
//! exponential smoothing; it tolerates irregular snapshot arrival at the
//! cost of trailing the server slightly.

use std::collections::HashMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::chain::{rebuild_chain, resize_chain, segment_count, segment_spacing};
use crate::color::SnakeColors;
use crate::net::protocol::Player;
use crate::normalize_angle;

/// Position and heading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Step toward `target` by `blend` on each axis; heading takes the short arc
    pub fn blend_toward(&self, target: &Pose, blend: f32) -> Pose {
        let blend = blend.clamp(0.0, 1.0);
        let position = self.position + (target.position - self.position) * blend;
        let turn = normalize_angle(target.angle - self.angle);
        Pose {
            position,
            angle: normalize_angle(self.angle + turn * blend),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    target: Pose,
    received_at: f64,
    current: Pose,
}

/// Smoothing state for one remote snake
#[derive(Debug, Clone)]
pub struct RemoteTrack {
    pub colors: SnakeColors,
    pub body: Vec<Vec2>,
    motion: Option<Motion>,
}

impl RemoteTrack {
    pub fn current(&self) -> Option<Pose> {
        self.motion.map(|m| m.current)
    }

    pub fn target(&self) -> Option<Pose> {
        self.motion.map(|m| m.target)
    }

    /// When the target was last updated (ms)
    pub fn received_at(&self) -> Option<f64> {
        self.motion.map(|m| m.received_at)
    }
}

/// Tracks every remote snake seen so far, keyed by player id
///
/// A track exists only after an explicit [`Interpolator::initialize_player`];
/// lookups never create one.
pub struct Interpolator {
    tracks: HashMap<String, RemoteTrack>,
    rng: Pcg32,
}

impl Interpolator {
    pub fn new(seed: u64) -> Self {
        Self {
            tracks: HashMap::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Allocate a track for a first-seen player; returns false if already known
    pub fn initialize_player(&mut self, player: &Player) -> bool {
        if self.tracks.contains_key(&player.id) {
            return false;
        }
        let length = segment_count(player.length).max(1);
        let track = RemoteTrack {
            colors: SnakeColors::random(&mut self.rng),
            body: vec![player.position.into(); length],
            motion: None,
        };
        self.tracks.insert(player.id.clone(), track);
        log::debug!("Tracking remote player {}", player.id);
        true
    }

    /// Record the latest authoritative pose. The first target also seeds the
    /// smoothed pose so a new snake appears in place. Unknown ids and
    /// non-finite poses are ignored.
    pub fn update_target(&mut self, id: &str, position: Vec2, angle: f32, now_ms: f64) -> bool {
        if !position.is_finite() || !angle.is_finite() {
            log::warn!("Ignoring non-finite target for player {}", id);
            return false;
        }
        let Some(track) = self.tracks.get_mut(id) else {
            log::debug!("Ignoring target for untracked player {}", id);
            return false;
        };
        let target = Pose::new(position, angle);
        match track.motion.as_mut() {
            Some(m) => {
                m.target = target;
                m.received_at = now_ms;
            }
            None => {
                track.motion = Some(Motion {
                    target,
                    received_at: now_ms,
                    current: target,
                })
            }
        }
        true
    }

    /// Initialize (if needed) and retarget from a server player record
    pub fn observe(&mut self, player: &Player, now_ms: f64) {
        self.initialize_player(player);
        self.update_target(&player.id, player.position.into(), player.angle, now_ms);
    }

    /// Advance the smoothed pose one tick; `None` for unknown ids or ids with
    /// no target yet
    pub fn interpolate(&mut self, id: &str, blend: f32) -> Option<Pose> {
        let motion = self.tracks.get_mut(id)?.motion.as_mut()?;
        motion.current = motion.current.blend_toward(&motion.target, blend);
        Some(motion.current)
    }

    /// Resize the body to `length` and lay it out behind the smoothed head
    pub fn rebuild_body(&mut self, id: &str, radius: f32, length: u32) -> Option<&[Vec2]> {
        let track = self.tracks.get_mut(id)?;
        let current = track.motion?.current;
        resize_chain(&mut track.body, segment_count(length).max(1), current.position);
        rebuild_chain(
            &mut track.body,
            current.position,
            current.angle,
            segment_spacing(radius),
        );
        Some(&track.body)
    }

    pub fn track(&self, id: &str) -> Option<&RemoteTrack> {
        self.tracks.get(id)
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.tracks.remove(id).is_some()
    }

    /// Drop tracks whose id fails `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tracks.retain(|id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
