//! Browser WebSocket connection

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use super::transport::{Connection, SharedBus, dispatch};
use crate::error::{ClientError, Result};

#[derive(Default)]
struct WsFlags {
    open: bool,
    closed: bool,
}

/// [`Connection`] backed by `web_sys::WebSocket`
pub struct WsConnection {
    ws: Option<WebSocket>,
    bus: SharedBus,
    flags: Rc<RefCell<WsFlags>>,
    // Kept alive for as long as the socket holds them
    _on_open: Option<Closure<dyn FnMut()>>,
    _on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
    _on_close: Option<Closure<dyn FnMut(CloseEvent)>>,
    _on_error: Option<Closure<dyn FnMut(ErrorEvent)>>,
}

impl WsConnection {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            ws: None,
            bus,
            flags: Rc::new(RefCell::new(WsFlags::default())),
            _on_open: None,
            _on_message: None,
            _on_close: None,
            _on_error: None,
        }
    }

    fn detach(&mut self) {
        if let Some(ws) = self.ws.take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            let _ = ws.close();
        }
        self._on_open = None;
        self._on_message = None;
        self._on_close = None;
        self._on_error = None;
    }
}

impl Connection for WsConnection {
    fn open(&mut self, url: &str) -> Result<()> {
        self.detach();
        let ws = WebSocket::new(url).map_err(|e| ClientError::Connection(format!("{:?}", e)))?;

        let flags = self.flags.clone();
        let on_open = Closure::<dyn FnMut()>::new(move || {
            flags.borrow_mut().open = true;
        });

        let bus = self.bus.clone();
        let on_message = Closure::<dyn FnMut(_)>::new(move |e: MessageEvent| {
            let Some(text) = e.data().as_string() else {
                log::warn!("Ignoring non-text frame");
                return;
            };
            if let Err(err) = dispatch(&bus, &text) {
                log::error!("Dropping inbound frame: {}", err);
            }
        });

        let flags = self.flags.clone();
        let on_close = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            log::info!("Socket closed (code {})", e.code());
            let mut f = flags.borrow_mut();
            f.open = false;
            f.closed = true;
        });

        let on_error = Closure::<dyn FnMut(_)>::new(move |e: ErrorEvent| {
            log::error!("Connection error: {}", e.message());
        });

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        self.ws = Some(ws);
        self._on_open = Some(on_open);
        self._on_message = Some(on_message);
        self._on_close = Some(on_close);
        self._on_error = Some(on_error);
        Ok(())
    }

    fn close(&mut self) {
        self.detach();
        let mut f = self.flags.borrow_mut();
        f.open = false;
        f.closed = false;
    }

    fn is_open(&self) -> bool {
        self.flags.borrow().open
            && self
                .ws
                .as_ref()
                .is_some_and(|ws| ws.ready_state() == WebSocket::OPEN)
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        let ws = self.ws.as_ref().ok_or(ClientError::NotConnected)?;
        ws.send_with_str(text)
            .map_err(|e| ClientError::Connection(format!("{:?}", e)))
    }

    fn take_closed(&mut self) -> bool {
        std::mem::take(&mut self.flags.borrow_mut().closed)
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.detach();
    }
}
