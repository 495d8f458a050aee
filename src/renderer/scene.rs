//! Scene layers other than snakes

use glam::Vec2;

use super::frame::{DrawCmd, Frame, TextAlign};
use crate::color::Rgb;
use crate::consts::{
    FOOD_CORE_RADIUS, FOOD_RADIUS, MINIMAP_DOT_RADIUS, MINIMAP_HEIGHT, MINIMAP_MARGIN,
    MINIMAP_WIDTH, SCREEN_CENTER, SCREEN_HEIGHT,
};
use crate::sim::collision::SafeZone;
use crate::sim::motion::Camera;

const SAFE_ZONE_FILL: Rgb = Rgb::new(0x2E, 0xCC, 0x71);
const SAFE_ZONE_EDGE: Rgb = Rgb::new(0x27, 0xAE, 0x60);

/// Top-left of the first background tile for a camera offset
///
/// The pattern moves opposite to the camera and wraps every tile.
pub fn tile_origin(offset: Vec2, tile: Vec2) -> Vec2 {
    if tile.x <= 0.0 || tile.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new((-offset.x).rem_euclid(tile.x), (-offset.y).rem_euclid(tile.y))
}

pub fn background(frame: &mut Frame, camera: &Camera) {
    frame.push(DrawCmd::Background {
        offset: camera.offset,
        fallback: Rgb::GRASS,
    });
}

/// Halo around the zone, plus a prompt while the head is inside
pub fn safe_zone(frame: &mut Frame, zone: &SafeZone, camera: &Camera, inside: bool, can_escape: bool) {
    let min = camera.world_to_screen(zone.min());
    let size = zone.size();
    frame.fill_rect(min, size, SAFE_ZONE_FILL, 0.25);
    frame.stroke_rect(min, size, SAFE_ZONE_EDGE, 3.0);
    frame.text(
        camera.world_to_screen(zone.center),
        "SAFE ZONE",
        Rgb::WHITESMOKE,
        16,
        TextAlign::Center,
    );

    if inside {
        let prompt = if can_escape {
            "Press E to escape with your tokens"
        } else {
            "Escape is not unlocked yet"
        };
        frame.text(
            Vec2::new(SCREEN_CENTER.x, 60.0),
            prompt,
            Rgb::WHITESMOKE,
            20,
            TextAlign::Center,
        );
    }
}

/// Translucent food dot in its token color with a solid white core
pub fn food(frame: &mut Frame, at: Vec2, token_color: &str) {
    let color = Rgb::from_hex(token_color).unwrap_or_else(|_| {
        log::debug!("Bad token color {:?}", token_color);
        Rgb::WHITE
    });
    frame.circle_alpha(at, FOOD_RADIUS, color, 0.5);
    frame.circle(at, FOOD_CORE_RADIUS, Rgb::WHITE);
}

/// Panel top-left in screen coordinates
pub fn minimap_origin() -> Vec2 {
    Vec2::new(MINIMAP_MARGIN, SCREEN_HEIGHT - MINIMAP_HEIGHT - MINIMAP_MARGIN)
}

/// Where the local head lands inside the panel
pub fn minimap_dot(camera: &Camera) -> Vec2 {
    minimap_origin() + camera.world_fraction() * Vec2::new(MINIMAP_WIDTH, MINIMAP_HEIGHT)
}

pub fn minimap(frame: &mut Frame, camera: &Camera, color: Rgb) {
    let origin = minimap_origin();
    let size = Vec2::new(MINIMAP_WIDTH, MINIMAP_HEIGHT);
    frame.fill_rect(origin, size, Rgb::WHITE, 0.5);
    frame.stroke_rect(origin, size, Rgb::BORDER, 2.0);
    frame.circle(minimap_dot(camera), MINIMAP_DOT_RADIUS, color);
}

/// Shown until the local player exists
pub fn loading(frame: &mut Frame) {
    frame.clear();
    frame.push(DrawCmd::Background {
        offset: Vec2::ZERO,
        fallback: Rgb::GRASS,
    });
    frame.text(SCREEN_CENTER, "Loading game...", Rgb::WHITESMOKE, 24, TextAlign::Center);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WORLD_ORIGIN;

    #[test]
    fn test_tile_origin_wraps_both_ways() {
        let tile = Vec2::new(100.0, 50.0);
        assert_eq!(tile_origin(Vec2::new(30.0, 10.0), tile), Vec2::new(70.0, 40.0));
        assert_eq!(tile_origin(Vec2::new(-30.0, -10.0), tile), Vec2::new(30.0, 10.0));
        assert_eq!(tile_origin(Vec2::new(250.0, 0.0), tile), Vec2::new(50.0, 0.0));
        assert_eq!(tile_origin(Vec2::ONE, Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_minimap_dot_mapping() {
        // Head at the world's top-left corner
        let camera = Camera {
            offset: WORLD_ORIGIN - SCREEN_CENTER,
        };
        assert_eq!(minimap_dot(&camera), Vec2::new(20.0, SCREEN_HEIGHT - 70.0));

        // Head at the world's center
        let camera = Camera {
            offset: WORLD_ORIGIN + Vec2::new(2000.0, 1000.0) - SCREEN_CENTER,
        };
        assert_eq!(minimap_dot(&camera), Vec2::new(70.0, SCREEN_HEIGHT - 45.0));
    }

    #[test]
    fn test_food_has_core() {
        let mut frame = Frame::new();
        food(&mut frame, Vec2::ZERO, "#3498db");
        food(&mut frame, Vec2::ZERO, "not a color");
        assert_eq!(frame.len(), 4);

        let alphas: Vec<_> = frame.commands()[..2]
            .iter()
            .map(|c| match c {
                DrawCmd::Circle { radius, alpha, .. } => (*radius, *alpha),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(alphas, [(FOOD_RADIUS, 0.5), (FOOD_CORE_RADIUS, 1.0)]);
    }

    #[test]
    fn test_safe_zone_prompt_only_inside() {
        let camera = Camera::default();
        let zone = SafeZone::default();
        let mut frame = Frame::new();
        safe_zone(&mut frame, &zone, &camera, false, true);
        assert_eq!(frame.texts().count(), 1);

        let mut frame = Frame::new();
        safe_zone(&mut frame, &zone, &camera, true, true);
        assert!(frame.texts().any(|t| t.contains("escape")));
    }
}
