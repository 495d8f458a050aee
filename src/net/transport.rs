//! Transport adapter
//!
//! Wraps one persistent connection to the game server. Outbound calls are
//! fire-and-forget: when the connection is down they are logged and dropped,
//! never queued. Inbound frames are decoded and fanned out to every listener
//! registered for the event.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::protocol::{ClientMessage, EventKind, ServerEvent, TokenBalance};
use crate::error::Result;

/// A raw bidirectional text connection
pub trait Connection {
    /// Start connecting to `url`
    fn open(&mut self, url: &str) -> Result<()>;
    /// Tear the connection down; must tolerate repeated calls
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn send_text(&mut self, text: &str) -> Result<()>;
    /// True once after the connection closed or failed on its own
    fn take_closed(&mut self) -> bool;
}

/// Bounded reconnection with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay_ms: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 1000,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt number `attempt` (1-based), or `None` once exhausted
    pub fn delay_for(&self, attempt: u32) -> Option<u32> {
        (attempt >= 1 && attempt <= self.max_attempts).then_some(self.delay_ms)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ServerEvent)>;

/// Per-event listener registry; every listener for an event fires
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

/// Shared bus, held by the transport and by connection callbacks
pub type SharedBus = Rc<RefCell<EventBus>>;

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBus {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&ServerEvent) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove one listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event; returns how many listeners ran
    pub fn emit(&mut self, event: &ServerEvent) -> usize {
        match self.listeners.get_mut(&event.kind()) {
            Some(list) => {
                for (_, listener) in list.iter_mut() {
                    listener(event);
                }
                list.len()
            }
            None => 0,
        }
    }
}

/// Decode a text frame and deliver it on `bus`
///
/// Listeners must not subscribe on the same bus while it is emitting.
pub fn dispatch(bus: &SharedBus, text: &str) -> Result<ServerEvent> {
    let event = ServerEvent::decode(text)?;
    let delivered = bus.borrow_mut().emit(&event);
    if delivered == 0 {
        log::debug!("No listener for `{}`", event.kind().name());
    }
    Ok(event)
}

/// Typed client over a [`Connection`]
pub struct Transport<C: Connection> {
    conn: C,
    url: String,
    bus: SharedBus,
    policy: ReconnectPolicy,
    reconnect_attempt: u32,
    retry_at: Option<f64>,
    wants_open: bool,
    was_open: bool,
    sent: u64,
    dropped: u64,
}

impl<C: Connection> Transport<C> {
    pub fn new(conn: C, url: impl Into<String>, bus: SharedBus, policy: ReconnectPolicy) -> Self {
        Self {
            conn,
            url: url.into(),
            bus,
            policy,
            reconnect_attempt: 0,
            retry_at: None,
            wants_open: false,
            was_open: false,
            sent: 0,
            dropped: 0,
        }
    }

    pub fn bus(&self) -> SharedBus {
        self.bus.clone()
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_open()
    }

    /// Open the connection unless it is already up
    pub fn connect(&mut self) -> Result<()> {
        self.wants_open = true;
        if self.conn.is_open() {
            log::debug!("Already connected to {}", self.url);
            return Ok(());
        }
        log::info!("Connecting to {}", self.url);
        self.conn.open(&self.url)
    }

    pub fn disconnect(&mut self) {
        if self.wants_open || self.conn.is_open() {
            log::info!("Disconnecting from {}", self.url);
        }
        self.wants_open = false;
        self.retry_at = None;
        self.reconnect_attempt = 0;
        self.conn.close();
        self.was_open = false;
    }

    /// Track connection state changes and drive reconnection; call once per
    /// frame from the main loop
    pub fn poll(&mut self, now_ms: f64) {
        let open = self.conn.is_open();
        if open && !self.was_open {
            self.on_connected();
        }
        self.was_open = open;

        if self.conn.take_closed() && self.wants_open && self.retry_at.is_none() {
            match self.on_connection_lost() {
                Some(delay) => self.retry_at = Some(now_ms + delay as f64),
                None => self.wants_open = false,
            }
        }

        if let Some(at) = self.retry_at {
            if now_ms >= at {
                self.retry_at = None;
                if let Err(e) = self.reconnect() {
                    log::error!("Reconnect failed: {}", e);
                }
            }
        }
    }

    /// True once reconnection attempts are used up
    pub fn gave_up(&self) -> bool {
        !self.wants_open && self.reconnect_attempt > self.policy.max_attempts
    }

    /// Call once the connection reports it is up
    pub fn on_connected(&mut self) {
        log::info!("Connected to game server");
        self.reconnect_attempt = 0;
    }

    /// Call when the connection drops unexpectedly; returns the delay before
    /// the next attempt, or `None` when attempts are exhausted
    pub fn on_connection_lost(&mut self) -> Option<u32> {
        self.reconnect_attempt += 1;
        let delay = self.policy.delay_for(self.reconnect_attempt);
        match delay {
            Some(ms) => log::warn!(
                "Disconnected; reconnect attempt {}/{} in {} ms",
                self.reconnect_attempt,
                self.policy.max_attempts,
                ms
            ),
            None => log::error!("Disconnected; giving up after {} attempts", self.policy.max_attempts),
        }
        delay
    }

    /// Retry after a scheduled delay
    pub fn reconnect(&mut self) -> Result<()> {
        self.conn.open(&self.url)
    }

    /// Send one message; returns false when dropped
    pub fn send(&mut self, msg: &ClientMessage) -> bool {
        if !self.conn.is_open() {
            self.dropped += 1;
            match msg {
                ClientMessage::PlayerMove { .. } => log::debug!("Not connected; dropping player-move"),
                _ => log::warn!("Not connected; dropping {}", msg.event_name()),
            }
            return false;
        }
        let sent = msg.encode().and_then(|text| self.conn.send_text(&text));
        match sent {
            Ok(()) => {
                self.sent += 1;
                true
            }
            Err(e) => {
                self.dropped += 1;
                log::error!("Failed to send {}: {}", msg.event_name(), e);
                false
            }
        }
    }

    pub fn send_all(&mut self, msgs: &[ClientMessage]) -> usize {
        msgs.iter().filter(|m| self.send(m)).count()
    }

    pub fn join_game(&mut self, name: &str, wallet_address: &str, staked: Vec<TokenBalance>) -> bool {
        log::info!("Joining game as {} ({})", name, wallet_address);
        self.send(&ClientMessage::JoinGame {
            name: name.to_string(),
            wallet_address: wallet_address.to_string(),
            staked_tokens: staked,
        })
    }

    pub fn update_position(&mut self, x: f32, y: f32, angle: f32) -> bool {
        self.send(&ClientMessage::PlayerMove { x, y, angle })
    }

    pub fn eat_food(&mut self, food_id: &str) -> bool {
        self.send(&ClientMessage::EatFood(food_id.to_string()))
    }

    pub fn player_died(&mut self) -> bool {
        self.send(&ClientMessage::PlayerDied)
    }

    pub fn player_escape(&mut self) -> bool {
        self.send(&ClientMessage::PlayerEscape)
    }

    /// Messages sent and dropped so far
    pub fn stats(&self) -> (u64, u64) {
        (self.sent, self.dropped)
    }
}

/// In-memory connection recording outbound frames
#[cfg(test)]
#[derive(Default)]
pub struct MockConnection {
    pub open: bool,
    pub opens: u32,
    pub closed: bool,
    pub sent: Vec<String>,
}

#[cfg(test)]
impl MockConnection {
    /// Simulate the server going away
    pub fn drop_link(&mut self) {
        self.open = false;
        self.closed = true;
    }
}

#[cfg(test)]
impl Connection for MockConnection {
    fn open(&mut self, _url: &str) -> Result<()> {
        self.opens += 1;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        self.sent.push(text.to_string());
        Ok(())
    }

    fn take_closed(&mut self) -> bool {
        std::mem::take(&mut self.closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> Transport<MockConnection> {
        Transport::new(
            MockConnection::default(),
            "ws://test",
            EventBus::shared(),
            ReconnectPolicy::default(),
        )
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut t = transport();
        t.connect().unwrap();
        t.connect().unwrap();
        assert_eq!(t.connection().opens, 1);
        t.disconnect();
        t.disconnect();
        assert!(!t.is_connected());
    }

    #[test]
    fn test_outbound_dropped_when_disconnected() {
        let mut t = transport();
        assert!(!t.eat_food("f1"));
        assert!(!t.update_position(1.0, 2.0, 0.0));
        assert!(t.connection().sent.is_empty());
        assert_eq!(t.stats(), (0, 2));

        // Nothing is replayed after connecting
        t.connect().unwrap();
        assert!(t.connection().sent.is_empty());
        assert!(t.player_escape());
        assert_eq!(t.connection().sent.len(), 1);
        assert!(t.connection().sent[0].contains("player-escape"));
    }

    #[test]
    fn test_all_listeners_fire() {
        let t = transport();
        let hits = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let hits = hits.clone();
            t.bus().borrow_mut().subscribe(EventKind::CanEscape, move |e| {
                if let ServerEvent::CanEscape(v) = e {
                    hits.borrow_mut().push((tag, *v));
                }
            });
        }
        dispatch(&t.bus(), r#"{"event":"can-escape","data":true}"#).unwrap();
        assert_eq!(*hits.borrow(), vec![("a", true), ("b", true)]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::shared();
        let id = bus.borrow_mut().subscribe(EventKind::EscapeSuccess, |_| {});
        assert_eq!(bus.borrow().listener_count(EventKind::EscapeSuccess), 1);
        assert!(bus.borrow_mut().unsubscribe(id));
        assert!(!bus.borrow_mut().unsubscribe(id));
        assert_eq!(bus.borrow_mut().emit(&ServerEvent::EscapeSuccess), 0);
    }

    #[test]
    fn test_poll_reconnects_after_fixed_delay() {
        let mut t = transport();
        t.connect().unwrap();
        t.poll(0.0);
        t.connection_mut().drop_link();
        t.poll(100.0);
        assert!(!t.is_connected());
        t.poll(500.0);
        assert_eq!(t.connection().opens, 1);
        t.poll(1100.0);
        assert_eq!(t.connection().opens, 2);
        assert!(t.is_connected());
    }

    #[test]
    fn test_poll_gives_up_and_ignores_manual_close() {
        let mut t = transport();
        t.connect().unwrap();
        let mut now = 0.0;
        for _ in 0..6 {
            t.connection_mut().drop_link();
            t.poll(now);
            now += 1000.0;
            t.poll(now);
        }
        assert!(t.gave_up());
        assert!(!t.is_connected());

        let mut t = transport();
        t.connect().unwrap();
        t.disconnect();
        t.connection_mut().closed = true;
        t.poll(5000.0);
        t.poll(10000.0);
        assert_eq!(t.connection().opens, 1);
    }

    #[test]
    fn test_reconnect_attempts_are_bounded() {
        let mut t = transport();
        for _ in 0..5 {
            assert_eq!(t.on_connection_lost(), Some(1000));
        }
        assert_eq!(t.on_connection_lost(), None);
        t.on_connected();
        assert_eq!(t.on_connection_lost(), Some(1000));
    }
}
