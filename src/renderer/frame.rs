//! Backend-neutral display list
//!
//! The tick pipeline records one [`Frame`] of draw commands in screen
//! coordinates; a backend replays it. Keeping the list as plain data lets the
//! scene be inspected without a browser.

use glam::Vec2;

use crate::color::Rgb;
use crate::error::Result;

/// How a filled shape is colored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgb),
    /// Two-stop radial gradient between an inner and an outer circle
    Radial {
        inner: Vec2,
        inner_radius: f32,
        outer: Vec2,
        outer_radius: f32,
        from: Rgb,
        to: Rgb,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Wipe the whole canvas
    Clear,
    /// Tile the background image so that it scrolls with `offset`; backends
    /// without a loaded image fill with `fallback`
    Background { offset: Vec2, fallback: Rgb },
    FillRect {
        min: Vec2,
        size: Vec2,
        color: Rgb,
        alpha: f32,
    },
    StrokeRect {
        min: Vec2,
        size: Vec2,
        color: Rgb,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
        alpha: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgb,
        width: f32,
    },
    Text {
        pos: Vec2,
        text: String,
        color: Rgb,
        size_px: u32,
        align: TextAlign,
    },
}

/// A recorded frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    cmds: Vec<DrawCmd>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn clear(&mut self) {
        self.push(DrawCmd::Clear);
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Rgb) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            paint: Paint::Solid(color),
            alpha: 1.0,
        });
    }

    pub fn circle_alpha(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            paint: Paint::Solid(color),
            alpha,
        });
    }

    pub fn circle_paint(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            paint,
            alpha: 1.0,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Rgb, width: f32) {
        self.push(DrawCmd::Line {
            from,
            to,
            color,
            width,
        });
    }

    pub fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgb, alpha: f32) {
        self.push(DrawCmd::FillRect {
            min,
            size,
            color,
            alpha,
        });
    }

    pub fn stroke_rect(&mut self, min: Vec2, size: Vec2, color: Rgb, width: f32) {
        self.push(DrawCmd::StrokeRect {
            min,
            size,
            color,
            width,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: Rgb, size_px: u32, align: TextAlign) {
        self.push(DrawCmd::Text {
            pos,
            text: text.into(),
            color,
            size_px,
            align,
        });
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Text commands, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A drawing backend
pub trait Canvas {
    fn draw(&mut self, cmd: &DrawCmd) -> Result<()>;

    /// Replay a whole frame, stopping at the first failure
    fn present(&mut self, frame: &Frame) -> Result<()> {
        for cmd in frame.commands() {
            self.draw(cmd)?;
        }
        Ok(())
    }
}
