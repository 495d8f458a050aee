//! Client-side simulation module
//!
//! Prediction and smoothing that run inside the render tick:
//! - Local motion is predicted; the server only corrects length and score
//! - Remote snakes are smoothed toward their last reported pose
//! - Pickups are detected and reported, never applied locally
//! - No platform dependencies; everything is driven by explicit timestamps

pub mod chain;
pub mod collision;
pub mod interp;
pub mod motion;
pub mod tick;

pub use chain::{radius_for_length, rebuild_chain, resize_chain, segment_spacing};
pub use collision::{SafeZone, detect_pickups, on_screen};
pub use interp::{Interpolator, Pose, RemoteTrack};
pub use motion::{Camera, LocalPlayer, heading_toward};
pub use tick::{ClientSim, RenderPhase, TickConfig, TickInput, TickOutput};
