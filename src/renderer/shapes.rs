//! Layered snake drawing
//!
//! Draw order, back to front: body segments (tail first), head, antennae,
//! legs, eyes, name label.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6};

use super::frame::{Frame, Paint, TextAlign};
use crate::color::{Rgb, SnakeColors};
use crate::consts::{HEAD_SCALE, MAX_SHRINK};
use crate::heading_vector;

const MAX_LEG_PAIRS: usize = 6;
const NAME_SIZE_PX: u32 = 12;

/// Everything needed to draw one snake, in screen coordinates
#[derive(Debug, Clone, Copy)]
pub struct SnakeView<'a> {
    pub head: Vec2,
    pub heading: f32,
    pub body: &'a [Vec2],
    pub radius: f32,
    pub colors: SnakeColors,
    pub name: &'a str,
    /// Antennae and legs
    pub detail: bool,
}

/// Radius of segment `index` out of `count`; shrinks linearly toward the tail
pub fn segment_radius(radius: f32, index: usize, count: usize) -> f32 {
    if count == 0 {
        return radius;
    }
    radius * (1.0 - (index as f32 / count as f32) * MAX_SHRINK)
}

/// Indices of the segments that carry a leg pair
pub fn leg_indices(count: usize) -> impl Iterator<Item = usize> {
    let pairs = MAX_LEG_PAIRS.min(count / 3);
    (0..pairs).map(move |k| k * count / pairs)
}

/// Outline ring plus shaded fill
fn blob(frame: &mut Frame, center: Vec2, radius: f32, colors: &SnakeColors) {
    frame.circle(center, radius + 1.0, colors.main);
    frame.circle_paint(
        center,
        radius,
        Paint::Radial {
            inner: center,
            inner_radius: 2.0,
            outer: center + Vec2::splat(4.0),
            outer_radius: 10.0,
            from: colors.support,
            to: colors.mid,
        },
    );
}

pub fn draw_snake(frame: &mut Frame, snake: &SnakeView) {
    let n = snake.body.len();
    let size = snake.radius;
    let head = size * HEAD_SCALE;
    let forward = heading_vector(snake.heading);

    for (i, part) in snake.body.iter().enumerate().rev() {
        blob(frame, *part, segment_radius(size, i, n), &snake.colors);
    }

    blob(frame, snake.head, head, &snake.colors);

    if snake.detail {
        let root = snake.head + forward * head * 0.8;
        for side in [-1.0f32, 1.0] {
            let tip = root + heading_vector(snake.heading + side * FRAC_PI_4) * size * 1.8;
            frame.line(root, tip, Rgb::BLACK, 1.5);
            frame.circle(tip, 2.0, Rgb::BLACK);
        }

        for i in leg_indices(n) {
            let part = snake.body[i];
            let part_size = segment_radius(size, i, n);
            for side in [-1.0f32, 1.0] {
                let base = part + heading_vector(snake.heading + side * FRAC_PI_2) * part_size * 0.7;
                let end = base + heading_vector(snake.heading + side * FRAC_PI_3) * size * 1.5;
                frame.line(base, end, Rgb::BLACK, 2.0);
            }
        }
    }

    for side in [-1.0f32, 1.0] {
        let eye = snake.head + heading_vector(snake.heading + side * FRAC_PI_6) * head;
        frame.circle(eye, size / 2.0, Rgb::BLACK);
        frame.circle(eye + forward, size / 4.0, Rgb::WHITESMOKE);
    }

    frame.text(
        Vec2::new(snake.head.x, snake.head.y - size - 10.0),
        snake.name,
        Rgb::WHITESMOKE,
        NAME_SIZE_PX,
        TextAlign::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::frame::DrawCmd;

    fn view(body: &[Vec2], detail: bool) -> SnakeView<'_> {
        SnakeView {
            head: Vec2::new(500.0, 400.0),
            heading: 0.0,
            body,
            radius: 10.0,
            colors: SnakeColors::from_main(Rgb::GRASS),
            name: "viper",
            detail,
        }
    }

    #[test]
    fn test_segment_radius_shrinks_to_limit() {
        assert_eq!(segment_radius(10.0, 0, 10), 10.0);
        assert!((segment_radius(10.0, 5, 10) - 8.5).abs() < 1e-5);
        // Never smaller than (1 - MAX_SHRINK) of the radius
        assert!(segment_radius(10.0, 9, 10) > 10.0 * (1.0 - MAX_SHRINK));
    }

    #[test]
    fn test_leg_sampling() {
        assert_eq!(leg_indices(2).count(), 0);
        assert_eq!(leg_indices(9).collect::<Vec<_>>(), [0, 3, 6]);
        assert_eq!(leg_indices(60).count(), MAX_LEG_PAIRS);
        assert!(leg_indices(60).all(|i| i < 60));
    }

    #[test]
    fn test_layer_order_tail_first_name_last() {
        let body = [Vec2::new(495.0, 400.0), Vec2::new(490.0, 400.0)];
        let mut frame = Frame::new();
        draw_snake(&mut frame, &view(&body, true));

        let cmds = frame.commands();
        // First outline belongs to the tail
        match &cmds[0] {
            DrawCmd::Circle { center, .. } => assert_eq!(*center, body[1]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(cmds.last(), Some(DrawCmd::Text { text, .. }) if text == "viper"));
    }

    #[test]
    fn test_detail_toggles_antennae_and_legs() {
        let body = vec![Vec2::new(480.0, 400.0); 9];
        let lines = |detail| {
            let mut frame = Frame::new();
            draw_snake(&mut frame, &view(&body, detail));
            frame
                .commands()
                .iter()
                .filter(|c| matches!(c, DrawCmd::Line { .. }))
                .count()
        };
        // 2 antennae + 3 leg pairs
        assert_eq!(lines(true), 2 + 3 * 2);
        assert_eq!(lines(false), 0);
    }

    #[test]
    fn test_antennae_and_legs_are_black() {
        let body = vec![Vec2::new(480.0, 400.0); 9];
        let mut frame = Frame::new();
        draw_snake(&mut frame, &view(&body, true));
        assert!(frame.commands().iter().all(|c| match c {
            DrawCmd::Line { color, .. } => *color == Rgb::BLACK,
            _ => true,
        }));
    }
}
