//! Body-segment chains
//!
//! Segments trail the head as a rigid chain: each one sits a fixed spacing
//! behind its predecessor along the current heading. Segments keep no
//! history of their own, so a turn swings the whole tail at once.

use glam::Vec2;

use crate::consts::{BASE_RADIUS, LENGTH_PER_STEP, MAX_RADIUS, MAX_SNAKE_LENGTH, RADIUS_STEP};
use crate::heading_vector;

/// Display radius for a snake of `length`
pub fn radius_for_length(length: u32) -> f32 {
    let steps = (length / LENGTH_PER_STEP) as f32;
    (BASE_RADIUS + steps * RADIUS_STEP).min(MAX_RADIUS)
}

/// Number of body segments to allocate for a reported `length`
pub fn segment_count(length: u32) -> usize {
    if length > MAX_SNAKE_LENGTH {
        log::warn!("Snake length {} exceeds {}, clamping", length, MAX_SNAKE_LENGTH);
    }
    length.min(MAX_SNAKE_LENGTH) as usize
}

/// Distance between consecutive segments
#[inline]
pub fn segment_spacing(radius: f32) -> f32 {
    radius / 2.0
}

/// Lay the chain out behind `head` along `angle`
pub fn rebuild_chain(body: &mut [Vec2], head: Vec2, angle: f32, spacing: f32) {
    let step = heading_vector(angle) * spacing;
    let mut prev = head;
    for part in body.iter_mut() {
        *part = prev - step;
        prev = *part;
    }
}

/// Grow by cloning the tail (or `fallback` when empty), or drop from the tail
pub fn resize_chain(body: &mut Vec<Vec2>, length: usize, fallback: Vec2) {
    if body.len() > length {
        body.truncate(length);
        return;
    }
    let tail = body.last().copied().unwrap_or(fallback);
    body.resize(length, tail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_step_function() {
        assert_eq!(radius_for_length(5), 7.0);
        assert_eq!(radius_for_length(29), 7.0);
        assert_eq!(radius_for_length(30), 8.5);
        assert_eq!(radius_for_length(65), 10.0);
        // 7 + 9 * 1.5 = 20.5 -> clamped
        assert_eq!(radius_for_length(270), MAX_RADIUS);
        assert_eq!(radius_for_length(10_000), MAX_RADIUS);
    }

    #[test]
    fn test_segment_count_is_capped() {
        assert_eq!(segment_count(0), 0);
        assert_eq!(segment_count(40), 40);
        assert_eq!(segment_count(MAX_SNAKE_LENGTH), MAX_SNAKE_LENGTH as usize);
        assert_eq!(segment_count(u32::MAX), MAX_SNAKE_LENGTH as usize);
    }

    #[test]
    fn test_chain_is_rigid_along_heading() {
        let mut body = vec![Vec2::ZERO; 4];
        rebuild_chain(&mut body, Vec2::new(10.0, 0.0), 0.0, 2.0);
        assert_eq!(body[0], Vec2::new(8.0, 0.0));
        assert_eq!(body[3], Vec2::new(2.0, 0.0));

        // Turning swings every segment at once
        rebuild_chain(&mut body, Vec2::new(10.0, 0.0), std::f32::consts::FRAC_PI_2, 2.0);
        for (i, p) in body.iter().enumerate() {
            assert!((p.x - 10.0).abs() < 1e-4);
            assert!((p.y + 2.0 * (i as f32 + 1.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_resize_clones_tail() {
        let mut body = vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        resize_chain(&mut body, 4, Vec2::ZERO);
        assert_eq!(body, vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 2.0),
        ]);
        resize_chain(&mut body, 1, Vec2::ZERO);
        assert_eq!(body, vec![Vec2::new(1.0, 1.0)]);

        let mut empty = Vec::new();
        resize_chain(&mut empty, 2, Vec2::new(5.0, 5.0));
        assert_eq!(empty, vec![Vec2::new(5.0, 5.0); 2]);
    }
}
