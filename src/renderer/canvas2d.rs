//! Canvas 2D backend

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsValue;
use web_sys::{CanvasPattern, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::frame::{Canvas, DrawCmd, Paint, TextAlign};
use super::scene::tile_origin;
use crate::color::Rgb;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{ClientError, Result};

fn js_err(e: JsValue) -> ClientError {
    ClientError::Render(format!("{:?}", e))
}

/// Draws frames onto an `HtmlCanvasElement`, scaling the logical screen to
/// the element's pixel size
pub struct Canvas2d {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    background: Option<HtmlImageElement>,
    pattern: Option<CanvasPattern>,
}

impl Canvas2d {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        use wasm_bindgen::JsCast;

        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| ClientError::Render("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ClientError::Render("not a 2d context".into()))?;
        Ok(Self {
            canvas,
            ctx,
            background: None,
            pattern: None,
        })
    }

    /// Use `image` as the tiling background once it has loaded
    pub fn set_background(&mut self, image: HtmlImageElement) {
        self.background = Some(image);
        self.pattern = None;
    }

    /// Drop the cached pattern so the next frame rebuilds it
    pub fn background_loaded(&mut self) {
        log::info!("Background image loaded");
        self.pattern = None;
    }

    fn image_ready(&self) -> Option<&HtmlImageElement> {
        self.background
            .as_ref()
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    fn ensure_pattern(&mut self) -> Result<()> {
        if self.pattern.is_some() {
            return Ok(());
        }
        if let Some(img) = self.image_ready().cloned() {
            self.pattern = self
                .ctx
                .create_pattern_with_html_image_element(&img, "repeat")
                .map_err(js_err)?;
        }
        Ok(())
    }

    fn fit_to_element(&self) {
        let sx = self.canvas.width() as f64 / SCREEN_WIDTH as f64;
        let sy = self.canvas.height() as f64 / SCREEN_HEIGHT as f64;
        let _ = self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0);
    }

    fn background_fill(&mut self, offset: Vec2, fallback: Rgb) -> Result<()> {
        self.ensure_pattern()?;
        let tile = self
            .image_ready()
            .map(|img| Vec2::new(img.natural_width() as f32, img.natural_height() as f32));
        match (&self.pattern, tile) {
            (Some(pattern), Some(tile)) => {
                let origin = tile_origin(offset, tile) - tile;
                self.ctx.save();
                self.ctx.translate(origin.x as f64, origin.y as f64).map_err(js_err)?;
                self.ctx.set_fill_style_canvas_pattern(pattern);
                self.ctx.fill_rect(
                    0.0,
                    0.0,
                    (SCREEN_WIDTH + tile.x * 2.0) as f64,
                    (SCREEN_HEIGHT + tile.y * 2.0) as f64,
                );
                self.ctx.restore();
            }
            _ => {
                self.ctx.set_fill_style_str(&fallback.to_hex());
                self.ctx
                    .fill_rect(0.0, 0.0, SCREEN_WIDTH as f64, SCREEN_HEIGHT as f64);
            }
        }
        Ok(())
    }

    fn circle_path(&self, center: Vec2, radius: f32) -> Result<()> {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .map_err(js_err)
    }
}

impl Canvas for Canvas2d {
    fn draw(&mut self, cmd: &DrawCmd) -> Result<()> {
        match cmd {
            DrawCmd::Clear => {
                self.fit_to_element();
                self.ctx
                    .clear_rect(0.0, 0.0, SCREEN_WIDTH as f64, SCREEN_HEIGHT as f64);
            }
            DrawCmd::Background { offset, fallback } => self.background_fill(*offset, *fallback)?,
            DrawCmd::FillRect {
                min,
                size,
                color,
                alpha,
            } => {
                self.ctx.set_global_alpha(*alpha as f64);
                self.ctx.set_fill_style_str(&color.to_hex());
                self.ctx
                    .fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                self.ctx.set_global_alpha(1.0);
            }
            DrawCmd::StrokeRect {
                min,
                size,
                color,
                width,
            } => {
                self.ctx.set_stroke_style_str(&color.to_hex());
                self.ctx.set_line_width(*width as f64);
                self.ctx
                    .stroke_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
            }
            DrawCmd::Circle {
                center,
                radius,
                paint,
                alpha,
            } => {
                self.circle_path(*center, *radius)?;
                match paint {
                    Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_hex()),
                    Paint::Radial {
                        inner,
                        inner_radius,
                        outer,
                        outer_radius,
                        from,
                        to,
                    } => {
                        let gradient = self
                            .ctx
                            .create_radial_gradient(
                                inner.x as f64,
                                inner.y as f64,
                                *inner_radius as f64,
                                outer.x as f64,
                                outer.y as f64,
                                *outer_radius as f64,
                            )
                            .map_err(js_err)?;
                        gradient.add_color_stop(0.0, &from.to_hex()).map_err(js_err)?;
                        gradient.add_color_stop(1.0, &to.to_hex()).map_err(js_err)?;
                        self.ctx.set_fill_style_canvas_gradient(&gradient);
                    }
                }
                self.ctx.set_global_alpha(*alpha as f64);
                self.ctx.fill();
                self.ctx.set_global_alpha(1.0);
            }
            DrawCmd::Line {
                from,
                to,
                color,
                width,
            } => {
                self.ctx.begin_path();
                self.ctx.move_to(from.x as f64, from.y as f64);
                self.ctx.line_to(to.x as f64, to.y as f64);
                self.ctx.set_stroke_style_str(&color.to_hex());
                self.ctx.set_line_width(*width as f64);
                self.ctx.stroke();
            }
            DrawCmd::Text {
                pos,
                text,
                color,
                size_px,
                align,
            } => {
                self.ctx.set_font(&format!("{}px Arial", size_px));
                self.ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                });
                self.ctx.set_fill_style_str(&color.to_hex());
                self.ctx
                    .fill_text(text, pos.x as f64, pos.y as f64)
                    .map_err(js_err)?;
            }
        }
        Ok(())
    }
}
