//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time and tick-rate gating
//! - The animation-frame loop (wasm)
//! - Input listeners that detach when dropped (wasm)

/// Gate that lets through at most `rate` ticks per second
///
/// Frames that arrive before the interval has fully elapsed are dropped, not
/// queued. The remainder is carried so the average rate stays on budget.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval_ms: f64,
    last: Option<f64>,
    dropped: u64,
}

impl FrameLimiter {
    pub fn new(rate: u32) -> Self {
        Self {
            interval_ms: 1000.0 / rate.max(1) as f64,
            last: None,
            dropped: 0,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Whether a tick should run at `now_ms`
    pub fn ready(&mut self, now_ms: f64) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now_ms);
            return true;
        };
        let delta = now_ms - last;
        if delta > self.interval_ms {
            self.last = Some(now_ms - delta % self.interval_ms);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Frames skipped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Event, EventTarget};

    use crate::error::{ClientError, Result};

    struct LoopState {
        alive: Cell<bool>,
        pending: Cell<Option<i32>>,
        callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    }

    /// `requestAnimationFrame` loop; stops when cancelled or dropped
    ///
    /// One closure is allocated for the lifetime of the loop and re-requested
    /// every frame. The next frame is queued before the body runs, so a body
    /// that panics does not end the loop.
    pub struct AnimationLoop {
        state: Rc<LoopState>,
    }

    impl AnimationLoop {
        pub fn start(mut f: impl FnMut(f64) + 'static) -> Self {
            let state = Rc::new(LoopState {
                alive: Cell::new(true),
                pending: Cell::new(None),
                callback: RefCell::new(None),
            });
            let weak: Weak<LoopState> = Rc::downgrade(&state);
            let callback = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                state.pending.set(None);
                if !state.alive.get() {
                    return;
                }
                request(&state);
                f(time);
            });
            *state.callback.borrow_mut() = Some(callback);
            request(&state);
            Self { state }
        }

        pub fn is_running(&self) -> bool {
            self.state.alive.get()
        }

        /// Cancel the pending frame; safe to call more than once
        pub fn cancel(&self) {
            if !self.state.alive.replace(false) {
                return;
            }
            if let (Some(id), Some(window)) = (self.state.pending.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
            log::info!("Animation loop stopped");
        }
    }

    impl Drop for AnimationLoop {
        fn drop(&mut self) {
            self.cancel();
        }
    }

    fn request(state: &LoopState) {
        let Some(window) = web_sys::window() else {
            log::error!("No window; animation frame not requested");
            return;
        };
        let callback = state.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => state.pending.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    /// Event listener that is removed from its target when dropped
    pub struct ListenerGuard {
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    }

    impl ListenerGuard {
        pub fn new<E: JsCast + 'static>(
            target: &EventTarget,
            event: &'static str,
            mut f: impl FnMut(E) + 'static,
        ) -> Result<Self> {
            let callback = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
                if let Ok(e) = e.dyn_into::<E>() {
                    f(e);
                }
            });
            target
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                .map_err(|e| ClientError::Render(format!("listen {}: {:?}", event, e)))?;
            Ok(Self {
                target: target.clone(),
                event,
                callback,
            })
        }
    }

    impl Drop for ListenerGuard {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{AnimationLoop, ListenerGuard};
