//! Stake Snake entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Document, Element, EventTarget, HtmlCanvasElement, HtmlImageElement, HtmlInputElement,
        KeyboardEvent, MouseEvent, TouchEvent,
    };

    use stake_snake::client::{GameClient, Hud};
    use stake_snake::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use stake_snake::error::{ClientError, Result};
    use stake_snake::net::{ClientMessage, EventBus, EventKind, ServerEvent, Transport, WsConnection};
    use stake_snake::phase::{GamePhase, Settlement};
    use stake_snake::platform::{AnimationLoop, ListenerGuard, now_ms};
    use stake_snake::renderer::{Canvas, Canvas2d};
    use stake_snake::settings::Settings;
    use stake_snake::sim::{RenderPhase, TickInput, heading_toward};

    const BACKGROUND_URL: &str = "assets/grass.png";

    /// Running loop and listeners; dropping it tears the game down
    struct Session {
        _animation: AnimationLoop,
        _listeners: Vec<ListenerGuard>,
        app: Rc<RefCell<App>>,
    }

    thread_local! {
        static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    }

    /// Cancel the frame loop, detach listeners and close the socket
    pub fn shutdown() {
        let session = SESSION.with(|s| s.borrow_mut().take());
        if let Some(session) = session {
            session.app.borrow_mut().transport.disconnect();
            log::info!("Stake Snake stopped");
        }
    }

    /// Everything the frame loop touches
    struct App {
        client: GameClient,
        transport: Transport<WsConnection>,
        canvas: Canvas2d,
        input: TickInput,
        /// Events received since the last frame, in arrival order
        inbox: Rc<RefCell<Vec<ServerEvent>>>,
        /// Messages produced outside a tick (join, escape)
        outbound: Vec<ClientMessage>,
        last_phase: &'static str,
        gave_up_reported: bool,
    }

    impl App {
        fn frame(&mut self, document: &Document) {
            let now = now_ms();
            self.transport.poll(now);

            let events: Vec<ServerEvent> = self.inbox.borrow_mut().drain(..).collect();
            for event in &events {
                let out = self.client.on_event(event, now);
                self.outbound.extend(out);
            }

            if let Some(out) = self.client.frame(&self.input, now) {
                self.input.toggle_pause = false;
                if let Err(e) = self.canvas.present(&out.frame) {
                    log::error!("Render error: {}", e);
                }
                self.outbound.extend(out.outbound);
            }

            if !self.outbound.is_empty() {
                let pending = std::mem::take(&mut self.outbound);
                self.transport.send_all(&pending);
            }

            if self.transport.gave_up() && !self.gave_up_reported {
                self.client.report(ClientError::NotConnected);
                self.gave_up_reported = true;
            }

            self.update_dom(document);
        }

        fn update_dom(&mut self, document: &Document) {
            let phase = self.client.phase().clone();
            if phase.name() != self.last_phase {
                for (id, name) in [
                    ("start-screen", "start"),
                    ("hud", "playing"),
                    ("game-over", "game-over"),
                    ("pending-claim", "pending-claim"),
                ] {
                    set_visible(document, id, phase.name() == name);
                }
                self.last_phase = phase.name();
            }

            if let Some(hud) = self.client.hud() {
                update_hud(document, &hud);
            }

            match &phase {
                GamePhase::GameOver(over) => {
                    set_text(document, "final-score", &over.result.score.to_string());
                    set_text(
                        document,
                        "final-tokens",
                        &format!("{:.2}", over.result.collected_total()),
                    );
                    set_text(
                        document,
                        "final-outcome",
                        if over.success { "Escaped!" } else { "Game over" },
                    );
                    let status = match &over.settlement {
                        Settlement::Processing => "Processing on chain...".to_string(),
                        Settlement::Complete { success: true, final_status } => final_status
                            .clone()
                            .unwrap_or_else(|| "Settled".to_string()),
                        Settlement::Complete { success: false, .. } => {
                            "Settlement failed".to_string()
                        }
                    };
                    set_text(document, "settlement-status", &status);
                }
                GamePhase::PendingClaim { tokens } => {
                    let total: f64 = tokens.iter().map(|t| t.amount).sum();
                    set_text(document, "pending-amount", &format!("{:.2}", total));
                }
                _ => {}
            }

            for notice in self.client.take_notices() {
                set_text(document, "notice", &notice.message);
                set_visible(document, "notice", true);
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn update_hud(document: &Document, hud: &Hud) {
        set_text(document, "hud-score", &hud.score.to_string());
        set_text(document, "hud-length", &hud.length.to_string());
        set_text(document, "hud-tokens", &format!("{:.2}", hud.collected_total));
        let escape = if hud.can_escape {
            "Escape ready (E)".to_string()
        } else {
            format!("{} points to escape", hud.score_to_escape)
        };
        set_text(document, "hud-escape", &escape);
        set_visible(document, "safe-zone-hint", hud.in_safe_zone);
    }

    fn input_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value().trim().to_string())
            .unwrap_or_default()
    }

    /// Map a client-space point onto the logical screen
    fn to_screen(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        let w = rect.width().max(1.0);
        let h = rect.height().max(1.0);
        Vec2::new(
            ((client_x - rect.left()) * SCREEN_WIDTH as f64 / w) as f32,
            ((client_y - rect.top()) * SCREEN_HEIGHT as f64 / h) as f32,
        )
    }

    fn element(document: &Document, id: &str) -> Result<Element> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| ClientError::Render(format!("missing #{}", id)))
    }

    fn load_background(canvas: &mut Canvas2d, app: Rc<RefCell<App>>) -> Result<()> {
        let image = HtmlImageElement::new().map_err(|e| ClientError::Render(format!("{:?}", e)))?;
        image.set_src(BACKGROUND_URL);
        canvas.set_background(image.clone());
        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(image.decode()).await {
                Ok(_) => app.borrow_mut().canvas.background_loaded(),
                Err(e) => log::warn!("Background image failed to load: {:?}", e),
            }
        });
        Ok(())
    }

    fn setup_input(
        app: &Rc<RefCell<App>>,
        canvas: &HtmlCanvasElement,
        document: &Document,
    ) -> Result<Vec<ListenerGuard>> {
        let window = web_sys::window().ok_or_else(|| ClientError::Render("no window".into()))?;
        let canvas_target: &EventTarget = canvas.as_ref();
        let document_target: &EventTarget = document.as_ref();
        let window_target: &EventTarget = window.as_ref();
        let mut guards = Vec::new();

        // Pointer steering
        {
            let app = app.clone();
            let c = canvas.clone();
            guards.push(ListenerGuard::new(canvas_target, "mousemove", move |e: MouseEvent| {
                let p = to_screen(&c, e.client_x() as f64, e.client_y() as f64);
                app.borrow_mut().input.heading = Some(heading_toward(p));
            })?);
        }
        {
            let app = app.clone();
            let c = canvas.clone();
            guards.push(ListenerGuard::new(canvas_target, "touchmove", move |e: TouchEvent| {
                e.prevent_default();
                if let Some(touch) = e.touches().get(0) {
                    let p = to_screen(&c, touch.client_x() as f64, touch.client_y() as f64);
                    app.borrow_mut().input.heading = Some(heading_toward(p));
                }
            })?);
        }

        // Keyboard: Escape/Space pause, E escape
        {
            let app = app.clone();
            guards.push(ListenerGuard::new(window_target, "keydown", move |e: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match e.key().as_str() {
                    "Escape" | " " => {
                        if a.client.render_phase() != RenderPhase::Idle {
                            a.input.toggle_pause = true;
                        }
                    }
                    "e" | "E" => {
                        if let Some(msg) = a.client.request_escape() {
                            a.outbound.push(msg);
                        }
                    }
                    _ => {}
                }
            })?);
        }

        // Auto-pause when the tab is hidden
        {
            let app = app.clone();
            let doc = document.clone();
            guards.push(ListenerGuard::new(
                document_target,
                "visibilitychange",
                move |_e: web_sys::Event| {
                    if doc.visibility_state() != web_sys::VisibilityState::Hidden {
                        return;
                    }
                    let mut a = app.borrow_mut();
                    if a.client.render_phase() == RenderPhase::Running {
                        a.input.toggle_pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                },
            )?);
        }
        {
            let app = app.clone();
            guards.push(ListenerGuard::new(window_target, "blur", move |_e: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if a.client.render_phase() == RenderPhase::Running {
                    a.input.toggle_pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            })?);
        }

        // Start screen
        {
            let app = app.clone();
            let doc = document.clone();
            let button = element(document, "play-button")?;
            guards.push(ListenerGuard::new(button.as_ref(), "click", move |_e: MouseEvent| {
                let name = input_value(&doc, "player-name");
                let wallet = input_value(&doc, "wallet-address");
                if name.is_empty() || wallet.is_empty() {
                    set_text(&doc, "notice", "Enter a name and wallet address");
                    set_visible(&doc, "notice", true);
                    return;
                }
                let mut a = app.borrow_mut();
                a.gave_up_reported = false;
                if let Err(e) = a.transport.connect() {
                    a.client.report(e);
                    return;
                }
                let out = a.client.start_game(&name, &wallet, Vec::new());
                a.outbound.extend(out);
            })?);
        }

        // Play again
        {
            let app = app.clone();
            let button = element(document, "play-again")?;
            guards.push(ListenerGuard::new(button.as_ref(), "click", move |_e: MouseEvent| {
                app.borrow_mut().client.play_again();
                log::info!("Back to start screen");
            })?);
        }

        Ok(guards)
    }

    pub async fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Stake Snake starting...");

        let window = web_sys::window().ok_or_else(|| ClientError::Render("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ClientError::Render("no document".into()))?;

        set_visible(&document, "loading", false);

        let canvas: HtmlCanvasElement = element(&document, "canvas")?
            .dyn_into()
            .map_err(|_| ClientError::Render("#canvas is not a canvas".into()))?;

        // Backing store at device resolution; frames are scaled to fit
        let dpr = window.device_pixel_ratio();
        canvas.set_width((canvas.client_width() as f64 * dpr) as u32);
        canvas.set_height((canvas.client_height() as f64 * dpr) as u32);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Client initialized with seed: {}", seed);

        let bus = EventBus::shared();
        let inbox = Rc::new(RefCell::new(Vec::new()));
        {
            let mut b = bus.borrow_mut();
            for kind in EventKind::ALL {
                let inbox = inbox.clone();
                b.subscribe(kind, move |event: &ServerEvent| {
                    inbox.borrow_mut().push(event.clone());
                });
            }
        }
        let transport = Transport::new(
            WsConnection::new(bus.clone()),
            settings.server_url.clone(),
            bus,
            settings.reconnect_policy(),
        );

        let app = Rc::new(RefCell::new(App {
            client: GameClient::new(settings, seed),
            transport,
            canvas: Canvas2d::new(canvas.clone())?,
            input: TickInput::default(),
            inbox,
            outbound: Vec::new(),
            last_phase: "",
            gave_up_reported: false,
        }));

        load_background(&mut app.borrow_mut().canvas, app.clone())?;

        let guards = setup_input(&app, &canvas, &document)?;

        let frame_app = app.clone();
        let frame_doc = document.clone();
        let animation = AnimationLoop::start(move |_time: f64| match frame_app.try_borrow_mut() {
            Ok(mut app) => app.frame(&frame_doc),
            Err(_) => log::warn!("Skipping frame: app state is busy"),
        });

        SESSION.with(|s| {
            *s.borrow_mut() = Some(Session {
                _animation: animation,
                _listeners: guards,
                app,
            })
        });

        log::info!("Stake Snake running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn shutdown() {
    wasm_game::shutdown();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Stake Snake (native) starting...");
    log::info!("Native mode runs a headless round - build for wasm32 to play in the browser");

    headless_round();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Join, eat the food placed on the snake's path, then die
#[cfg(not(target_arch = "wasm32"))]
fn headless_round() {
    use serde_json::json;
    use stake_snake::net::ClientMessage;
    use stake_snake::phase::GamePhase;
    use stake_snake::sim::TickInput;
    use stake_snake::{GameClient, Settings};

    let mut client = GameClient::new(Settings::load(), 7);
    let mut now = 0.0;
    let frame = |event: &str, data: serde_json::Value| json!({ "event": event, "data": data }).to_string();

    client.start_game("headless", "0xheadless", Vec::new());
    let me = json!({
        "id": "me", "name": "headless", "walletAddress": "0xheadless",
        "position": { "x": -700.0, "y": -200.0 }, "length": 5,
    });
    client.on_frame(&frame("player-joined", me), now);

    // A row of food straight ahead of the head
    let head = client.sim().camera.head_world();
    let foods: Vec<_> = (1..=5)
        .map(|i| {
            json!({
                "id": format!("f{i}"),
                "position": { "x": head.x + i as f32 * 25.0, "y": head.y },
                "token": { "symbol": "USDC", "amount": 1.0, "color": "#2775ca" },
            })
        })
        .collect();
    let snapshot = json!({
        "players": [{
            "id": "me", "name": "headless", "walletAddress": "0xheadless",
            "position": { "x": head.x, "y": head.y }, "length": 5,
        }],
        "foods": foods,
    });
    client.on_frame(&frame("game-state", snapshot), now);

    let input = TickInput {
        heading: Some(0.0),
        ..Default::default()
    };
    let mut eaten = 0u32;
    for _ in 0..60 {
        now += 1000.0 / 30.0 + 0.5;
        let Some(out) = client.frame(&input, now) else {
            continue;
        };
        for msg in &out.outbound {
            if let ClientMessage::EatFood(id) = msg {
                // Act as the server: confirm, then grow
                eaten += 1;
                let data = json!({ "foodId": id, "playerId": "me" });
                client.on_frame(&frame("food-eaten", data), now);
                let grown = json!({
                    "id": "me", "name": "headless", "walletAddress": "0xheadless",
                    "position": { "x": 0.0, "y": 0.0 },
                    "length": 5 + eaten, "score": eaten * 10,
                    "collectedTokens": (0..eaten)
                        .map(|_| json!({ "symbol": "USDC", "amount": 1.0, "color": "#2775ca" }))
                        .collect::<Vec<_>>(),
                });
                client.on_frame(&frame("player-updated", grown), now);
            }
        }
    }

    if let Some(hud) = client.hud() {
        log::info!(
            "After 60 ticks: score {}, length {}, tokens {:.2}, {} to escape",
            hud.score,
            hud.length,
            hud.collected_total,
            hud.score_to_escape
        );
    }

    let out = client.on_frame(&frame("player-died-collision", serde_json::Value::Null), now);
    if let GamePhase::GameOver(over) = client.phase() {
        log::info!(
            "Round over: score {}, {} message(s) to send",
            over.result.score,
            out.len()
        );
    }
}
