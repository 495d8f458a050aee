//! Rendering module
//!
//! The tick pipeline records a [`Frame`] display list; the Canvas 2D backend
//! replays it in the browser.

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;
pub mod frame;
pub mod scene;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;
pub use frame::{Canvas, DrawCmd, Frame, Paint, TextAlign};
pub use shapes::{SnakeView, draw_snake};
