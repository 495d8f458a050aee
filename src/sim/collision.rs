//! Collision and pickup detection
//!
//! The client only detects; the server decides. A food overlap produces a
//! report every tick it persists, and the food stays in the local set until
//! the server confirms the pickup.

use glam::Vec2;

use super::motion::Camera;
use crate::circle_collision;
use crate::consts::{
    FOOD_CULL_MARGIN, FOOD_RADIUS, HEAD_MARGIN, SAFE_ZONE_CENTER, SAFE_ZONE_CULL_MARGIN,
    SAFE_ZONE_HALF_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::net::protocol::Food;

/// Whether a screen point lies inside the screen grown by `margin` on every side
#[inline]
pub fn on_screen(p: Vec2, margin: f32) -> bool {
    p.x > -margin && p.x < SCREEN_WIDTH + margin && p.y > -margin && p.y < SCREEN_HEIGHT + margin
}

/// Axis-aligned escape area in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Default for SafeZone {
    fn default() -> Self {
        Self {
            center: SAFE_ZONE_CENTER,
            half_extents: Vec2::splat(SAFE_ZONE_HALF_SIZE),
        }
    }
}

impl SafeZone {
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    pub fn contains(&self, world: Vec2) -> bool {
        let d = (world - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }

    /// Whether the zone center is near enough the screen to draw
    pub fn is_visible(&self, camera: &Camera) -> bool {
        on_screen(camera.world_to_screen(self.center), SAFE_ZONE_CULL_MARGIN)
    }
}

/// Pickup radius of the local head
#[inline]
pub fn head_reach(radius: f32) -> f32 {
    radius + HEAD_MARGIN
}

/// Foods within the culling margin that the head currently overlaps
///
/// `head` is in screen coordinates. Culled foods are never tested.
pub fn detect_pickups<'a>(
    foods: &'a [Food],
    camera: &Camera,
    head: Vec2,
    radius: f32,
) -> impl Iterator<Item = &'a Food> + 'a {
    let camera = *camera;
    let reach = head_reach(radius);
    foods.iter().filter(move |food| {
        let p = camera.world_to_screen(food.position.into());
        on_screen(p, FOOD_CULL_MARGIN) && circle_collision(head, reach, p, FOOD_RADIUS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BASE_RADIUS, SCREEN_CENTER};
    use crate::store::fixtures::food;

    #[test]
    fn test_on_screen_margin_is_strict() {
        assert!(on_screen(Vec2::new(-49.0, 10.0), 50.0));
        assert!(!on_screen(Vec2::new(-50.0, 10.0), 50.0));
        assert!(on_screen(Vec2::new(SCREEN_WIDTH + 99.0, 0.0), 100.0));
        assert!(!on_screen(Vec2::new(SCREEN_WIDTH + 100.0, 0.0), 100.0));
    }

    #[test]
    fn test_safe_zone_contains() {
        let zone = SafeZone::default();
        assert!(zone.contains(SAFE_ZONE_CENTER));
        assert!(zone.contains(SAFE_ZONE_CENTER + Vec2::new(150.0, -150.0)));
        assert!(!zone.contains(SAFE_ZONE_CENTER + Vec2::new(151.0, 0.0)));
        assert_eq!(zone.size(), Vec2::splat(300.0));
    }

    #[test]
    fn test_safe_zone_visibility_follows_camera() {
        let zone = SafeZone::default();
        let near = Camera {
            offset: SAFE_ZONE_CENTER - SCREEN_CENTER,
        };
        assert!(zone.is_visible(&near));
        let far = Camera {
            offset: SAFE_ZONE_CENTER + Vec2::new(5000.0, 0.0),
        };
        assert!(!zone.is_visible(&far));
    }

    #[test]
    fn test_pickup_threshold() {
        let camera = Camera { offset: Vec2::ZERO };
        let reach = head_reach(BASE_RADIUS) + FOOD_RADIUS;
        let foods = vec![
            // Exactly touching: no pickup
            food("touch", SCREEN_CENTER.x + reach, SCREEN_CENTER.y),
            food("hit", SCREEN_CENTER.x + reach - 0.01, SCREEN_CENTER.y),
            food("far", SCREEN_CENTER.x + 300.0, SCREEN_CENTER.y),
        ];
        let hits: Vec<_> = detect_pickups(&foods, &camera, SCREEN_CENTER, BASE_RADIUS)
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(hits, ["hit"]);
    }

    #[test]
    fn test_culled_food_is_not_tested() {
        // A huge head would overlap this food, but it sits outside the margin
        let camera = Camera { offset: Vec2::ZERO };
        let foods = vec![food("off", -60.0, 10.0)];
        assert_eq!(
            detect_pickups(&foods, &camera, Vec2::new(0.0, 10.0), 100.0).count(),
            0
        );
    }
}
