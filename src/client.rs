//! Game client
//!
//! Single owner of the store, the simulation and the phase controller.
//! Transport events and render ticks both funnel through here, so every
//! mutation happens from one place on one thread. Outbound traffic is
//! returned to the caller instead of being sent directly, which keeps the
//! client free of any borrow on the transport.

use crate::consts::ESCAPE_SCORE;
use crate::error::{ClientError, Result, Severity};
use crate::net::protocol::{ClientMessage, Player, ServerEvent, TokenBalance};
use crate::phase::{GamePhase, PhaseController, ScoreSnapshot};
use crate::platform::FrameLimiter;
use crate::settings::Settings;
use crate::sim::tick::{ClientSim, RenderPhase, TickInput, TickOutput};
use crate::store::{ClientStore, PlayerPatch};

/// Something the UI should show the player
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// Values for the in-game overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub length: u32,
    pub collected_tokens: Vec<TokenBalance>,
    pub collected_total: f64,
    pub can_escape: bool,
    /// Points still needed before the server unlocks escape
    pub score_to_escape: u64,
    pub in_safe_zone: bool,
}

pub struct GameClient {
    store: ClientStore,
    sim: ClientSim,
    phase: PhaseController,
    settings: Settings,
    limiter: FrameLimiter,
    notices: Vec<Notice>,
    in_safe_zone: bool,
}

impl GameClient {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let settings = settings.validate();
        Self {
            store: ClientStore::new(),
            sim: ClientSim::new(seed, settings.tick_config()),
            phase: PhaseController::new(),
            limiter: FrameLimiter::new(settings.tick_rate),
            settings,
            notices: Vec::new(),
            in_safe_zone: false,
        }
    }

    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    pub fn sim(&self) -> &ClientSim {
        &self.sim
    }

    pub fn phase(&self) -> &GamePhase {
        self.phase.phase()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply new settings; tick tunables take effect on the next tick
    pub fn set_settings(&mut self, settings: Settings) {
        let settings = settings.validate();
        self.sim.config = settings.tick_config();
        if settings.tick_rate != self.settings.tick_rate {
            self.limiter = FrameLimiter::new(settings.tick_rate);
        }
        self.settings = settings;
    }

    /// Send the join request; play starts when the server echoes it back
    pub fn start_game(
        &mut self,
        name: &str,
        wallet_address: &str,
        staked_tokens: Vec<TokenBalance>,
    ) -> Vec<ClientMessage> {
        log::info!("Joining as {} ({})", name, wallet_address);
        self.store.set_player_name(name);
        self.store.set_wallet_address(Some(wallet_address.to_string()));
        self.phase.begin_join(wallet_address);
        vec![ClientMessage::JoinGame {
            name: name.to_string(),
            wallet_address: wallet_address.to_string(),
            staked_tokens,
        }]
    }

    /// Escape request, if the server has unlocked it
    pub fn request_escape(&mut self) -> Option<ClientMessage> {
        if !self.phase.is_playing() || !self.store.can_escape {
            log::debug!("Escape not available");
            return None;
        }
        log::info!("Requesting escape");
        Some(ClientMessage::PlayerEscape)
    }

    /// Show the claim screen for a reward discovered at startup
    pub fn enter_pending_claim(&mut self, tokens: Vec<TokenBalance>) -> bool {
        self.phase.enter_pending_claim(tokens)
    }

    /// Forget the round and return to the start screen
    pub fn play_again(&mut self) {
        self.store.reset();
        self.sim.reset();
        self.phase.play_again();
        self.limiter.reset();
        self.in_safe_zone = false;
    }

    /// Handle one event, turning failures into notices
    pub fn on_event(&mut self, event: &ServerEvent, now_ms: f64) -> Vec<ClientMessage> {
        match self.handle_event(event, now_ms) {
            Ok(outbound) => outbound,
            Err(e) => {
                self.report(e);
                Vec::new()
            }
        }
    }

    /// Decode and handle a raw text frame
    pub fn on_frame(&mut self, text: &str, now_ms: f64) -> Vec<ClientMessage> {
        match ServerEvent::decode(text) {
            Ok(event) => self.on_event(&event, now_ms),
            Err(e) => {
                self.report(e);
                Vec::new()
            }
        }
    }

    pub fn handle_event(&mut self, event: &ServerEvent, now_ms: f64) -> Result<Vec<ClientMessage>> {
        let mut outbound = Vec::new();
        match event {
            ServerEvent::PlayerJoined(player) => {
                self.store.add_player(player.clone());
                if self.phase.on_player_joined(player) {
                    self.store.set_current_player(Some(player.clone()));
                    self.store.set_game_started(true);
                    self.sim.spawn_local(player);
                }
                self.track_remote(&player.id, now_ms);
            }
            ServerEvent::PlayerLeft(id) => {
                if !self.store.remove_player(id) {
                    log::debug!("player-left for unknown id {}", id);
                }
                self.sim.interp.remove(id);
                if self.is_local(id) {
                    self.store.set_current_player(None);
                }
            }
            ServerEvent::PlayerMoved(moved) => {
                let patch = PlayerPatch {
                    position: Some(moved.position),
                    angle: moved.angle,
                    ..Default::default()
                };
                if !self.store.update_player(&moved.id, patch) {
                    return Err(ClientError::UnknownPlayer(moved.id.clone()));
                }
                self.track_remote(&moved.id, now_ms);
            }
            ServerEvent::PlayerUpdated(player) => {
                self.reconcile(player);
                if !self.store.update_player(&player.id, PlayerPatch::from_player(player)) {
                    return Err(ClientError::UnknownPlayer(player.id.clone()));
                }
                self.track_remote(&player.id, now_ms);
            }
            ServerEvent::GameState(snapshot) => {
                self.store.apply_snapshot(snapshot.clone());
                let store = &self.store;
                self.sim.interp.retain(|id| store.player(id).is_some());
                let local = self
                    .sim
                    .local_id()
                    .and_then(|id| self.store.player(id))
                    .cloned();
                if let Some(me) = local {
                    self.reconcile(&me);
                }
                for player in &snapshot.players {
                    self.track_remote(&player.id, now_ms);
                }
            }
            ServerEvent::GameStateUpdate(update) => {
                self.store.set_leaderboard(update.leaderboard.clone());
                if let Some(tokens) = &update.map_tokens {
                    self.store.set_map_tokens(tokens.clone());
                }
            }
            ServerEvent::FoodEaten(eaten) => {
                if !self.store.remove_food(&eaten.food_id) {
                    log::debug!("food-eaten for unknown food {}", eaten.food_id);
                }
            }
            ServerEvent::PlayerDiedCollision(dead) => {
                if let Some(p) = dead.as_ref().filter(|p| !self.is_local(&p.id)) {
                    log::debug!("Remote player {} died", p.id);
                    self.store.remove_player(&p.id);
                    self.sim.interp.remove(&p.id);
                    return Ok(outbound);
                }
                if !self.phase.is_playing() {
                    log::debug!("Ignoring death outside of play");
                    return Ok(outbound);
                }
                let success = self.store.can_escape;
                self.end_round(success, dead.as_ref())?;
                if !success {
                    outbound.push(ClientMessage::PlayerDied);
                }
            }
            ServerEvent::CanEscape(can) => {
                if *can && !self.store.can_escape {
                    log::info!("Escape unlocked");
                }
                self.store.set_can_escape(*can);
            }
            ServerEvent::EscapeSuccess => {
                if self.phase.is_playing() {
                    self.end_round(true, None)?;
                }
            }
            ServerEvent::EscapeFailed(msg) => {
                return Err(ClientError::EscapeRejected(msg.message.clone()));
            }
            ServerEvent::Error(msg) => {
                return Err(ClientError::Server(msg.message.clone()));
            }
            ServerEvent::BlockchainUpdateComplete(update) => {
                if !self.phase.on_blockchain_update(update) {
                    log::debug!("Unexpected blockchain-update-complete");
                }
            }
        }
        Ok(outbound)
    }

    fn is_local(&self, id: &str) -> bool {
        self.sim.local_id() == Some(id)
            || self.store.current_player.as_ref().is_some_and(|p| p.id == id)
    }

    /// Retarget a remote snake, stamped with the time its update arrived
    fn track_remote(&mut self, id: &str, now_ms: f64) {
        if self.is_local(id) {
            return;
        }
        if let Some(player) = self.store.player(id).filter(|p| p.alive) {
            self.sim.interp.observe(player, now_ms);
        }
    }

    /// Server correction for the local player
    fn reconcile(&mut self, player: &Player) {
        if self.sim.reconcile_local(player) {
            self.phase.remember(ScoreSnapshot::from_player(player));
            self.store.set_current_player(Some(player.clone()));
        }
    }

    fn end_round(&mut self, success: bool, payload: Option<&Player>) -> Result<()> {
        let current = self
            .store
            .current_player
            .as_ref()
            .or_else(|| self.sim.local_id().and_then(|id| self.store.player(id)));
        self.phase.finish(success, payload, current)?;
        self.store.set_game_started(false);
        self.sim.reset();
        Ok(())
    }

    /// Run one tick if the frame budget allows it
    pub fn frame(&mut self, input: &TickInput, now_ms: f64) -> Option<TickOutput> {
        if !self.limiter.ready(now_ms) {
            return None;
        }
        Some(self.tick(input, now_ms))
    }

    /// Run one tick unconditionally
    pub fn tick(&mut self, input: &TickInput, now_ms: f64) -> TickOutput {
        let out = self.sim.tick(&self.store, input, now_ms);
        if out.in_safe_zone != self.in_safe_zone {
            log::debug!("Safe zone: {}", if out.in_safe_zone { "entered" } else { "left" });
            self.in_safe_zone = out.in_safe_zone;
        }
        out
    }

    pub fn render_phase(&self) -> RenderPhase {
        self.sim.phase
    }

    pub fn hud(&self) -> Option<Hud> {
        let local = self.sim.local.as_ref()?;
        Some(Hud {
            score: local.score,
            length: local.length,
            collected_tokens: local.collected_tokens.clone(),
            collected_total: local.collected_total(),
            can_escape: self.store.can_escape,
            score_to_escape: ESCAPE_SCORE.saturating_sub(local.score),
            in_safe_zone: self.in_safe_zone,
        })
    }

    /// Log an error and queue a notice unless it is ignorable
    pub fn report(&mut self, err: ClientError) {
        let severity = err.severity();
        match severity {
            Severity::Blocking => log::error!("{}", err),
            Severity::Transient => log::warn!("{}", err),
            Severity::Ignorable => {
                log::debug!("{}", err);
                return;
            }
        }
        self.notices.push(Notice {
            severity,
            message: err.to_string(),
        });
    }

    /// Drain queued notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::{
        BlockchainUpdate, ErrorMessage, FoodEaten, GameSnapshot, PlayerMoved, Point,
    };
    use crate::net::transport::{EventBus, MockConnection, ReconnectPolicy, Transport};
    use crate::consts::MAX_SNAKE_LENGTH;
    use crate::phase::Settlement;
    use crate::store::fixtures::{food, player, token};

    fn joined() -> GameClient {
        let mut client = GameClient::new(Settings::default(), 42);
        let out = client.start_game("snake-me", "0xme", vec![token("USDC", 10.0)]);
        assert_eq!(out[0].event_name(), "join-game");
        client.on_event(&ServerEvent::PlayerJoined(player("me", 0.0, 0.0)), 0.0);
        assert_eq!(client.phase(), &GamePhase::Playing);
        client
    }

    fn eat_count(out: &TickOutput, id: &str) -> usize {
        out.outbound
            .iter()
            .filter(|m| **m == ClientMessage::EatFood(id.to_string()))
            .count()
    }

    #[test]
    fn test_join_spawns_local_player() {
        let client = joined();
        assert_eq!(client.render_phase(), RenderPhase::Running);
        assert_eq!(client.store().current_player.as_ref().unwrap().id, "me");
        assert!(client.store().game_started);
        let hud = client.hud().unwrap();
        assert_eq!(hud.score_to_escape, ESCAPE_SCORE);
    }

    #[test]
    fn test_someone_elses_join_does_not_start_play() {
        let mut client = GameClient::new(Settings::default(), 1);
        client.start_game("me", "0xme", vec![]);
        client.on_event(&ServerEvent::PlayerJoined(player("other", 0.0, 0.0)), 0.0);
        assert_eq!(client.phase(), &GamePhase::Start);
        assert_eq!(client.render_phase(), RenderPhase::Idle);
        assert_eq!(client.store().players.len(), 1);
    }

    #[test]
    fn test_overlap_reports_each_tick_until_confirmed() {
        let mut client = joined();
        client.sim.toggle_pause();
        let head = client.sim().camera.head_world();
        client.on_event(
            &ServerEvent::GameState(GameSnapshot {
                players: vec![player("me", head.x, head.y)],
                foods: vec![food("f1", head.x + 3.0, head.y)],
                ..Default::default()
            }),
            0.0,
        );

        let mut reports = 0;
        for t in 0..3 {
            let out = client.tick(&TickInput::default(), t as f64 * 40.0);
            reports += eat_count(&out, "f1");
        }
        assert_eq!(reports, 3);
        assert_eq!(client.store().foods.len(), 1);

        let eaten = ServerEvent::FoodEaten(FoodEaten {
            food_id: "f1".into(),
            player_id: "me".into(),
        });
        client.on_event(&eaten, 120.0);
        assert!(client.store().foods.is_empty());
        // A duplicate confirmation is a no-op
        client.on_event(&eaten, 121.0);
        assert!(client.take_notices().is_empty());

        let out = client.tick(&TickInput::default(), 160.0);
        assert_eq!(eat_count(&out, "f1"), 0);
    }

    #[test]
    fn test_length_update_grows_local_snake() {
        let mut client = joined();
        client.sim.toggle_pause();
        let tail = *client.sim().local.as_ref().unwrap().body.last().unwrap();
        let mut update = player("me", 0.0, 0.0);
        update.length = 7;
        update.score = 12;
        client.on_event(&ServerEvent::PlayerUpdated(update), 0.0);

        let local = client.sim().local.as_ref().unwrap();
        assert_eq!(local.body.len(), 7);
        assert_eq!(local.body[6], tail);
        assert_eq!(client.hud().unwrap().score, 12);
        assert_eq!(client.store().player("me").unwrap().length, 7);
    }

    #[test]
    fn test_death_after_removal_shows_cached_score() {
        let mut client = joined();
        let mut update = player("me", 0.0, 0.0);
        update.score = 88;
        update.collected_tokens = vec![token("USDC", 4.0)];
        client.on_event(&ServerEvent::PlayerUpdated(update), 0.0);
        client.on_event(&ServerEvent::PlayerLeft("me".into()), 1.0);
        assert!(client.store().current_player.is_none());

        let out = client.on_event(&ServerEvent::PlayerDiedCollision(None), 2.0);
        assert_eq!(out, vec![ClientMessage::PlayerDied]);
        match client.phase() {
            GamePhase::GameOver(over) => {
                assert!(!over.success);
                assert_eq!(over.result.score, 88);
                assert_eq!(over.result.collected_total(), 4.0);
            }
            other => panic!("unexpected phase {:?}", other),
        }
        assert_eq!(client.render_phase(), RenderPhase::Idle);
    }

    #[test]
    fn test_death_while_escape_unlocked_is_success() {
        let mut client = joined();
        client.on_event(&ServerEvent::CanEscape(true), 0.0);
        let out = client.on_event(&ServerEvent::PlayerDiedCollision(Some(player("me", 0.0, 0.0))), 1.0);
        assert!(out.is_empty());
        assert!(matches!(client.phase(), GamePhase::GameOver(over) if over.success));

        client.on_event(
            &ServerEvent::BlockchainUpdateComplete(BlockchainUpdate {
                success: true,
                final_status: None,
            }),
            2.0,
        );
        assert!(matches!(
            client.phase(),
            GamePhase::GameOver(over) if matches!(over.settlement, Settlement::Complete { success: true, .. })
        ));
    }

    #[test]
    fn test_remote_death_is_not_ours() {
        let mut client = joined();
        client.on_event(&ServerEvent::PlayerJoined(player("r1", 0.0, 0.0)), 0.0);
        client.on_event(&ServerEvent::PlayerDiedCollision(Some(player("r1", 0.0, 0.0))), 1.0);
        assert!(client.phase.is_playing());
        assert!(client.store().player("r1").is_none());
    }

    #[test]
    fn test_escape_flow_and_notices() {
        let mut client = joined();
        assert!(client.request_escape().is_none());
        client.on_event(&ServerEvent::CanEscape(true), 0.0);
        assert_eq!(client.request_escape(), Some(ClientMessage::PlayerEscape));

        client.on_event(
            &ServerEvent::EscapeFailed(ErrorMessage {
                message: "not in safe zone".into(),
            }),
            1.0,
        );
        client.on_event(
            &ServerEvent::Error(ErrorMessage {
                message: "stake not found".into(),
            }),
            2.0,
        );
        let notices = client.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].severity, Severity::Transient);
        assert_eq!(notices[1].severity, Severity::Blocking);
        assert!(client.phase.is_playing());

        client.on_event(&ServerEvent::EscapeSuccess, 3.0);
        assert!(matches!(client.phase(), GamePhase::GameOver(over) if over.success));
    }

    #[test]
    fn test_unknown_ids_are_ignored_quietly() {
        let mut client = joined();
        let moved = ServerEvent::PlayerMoved(PlayerMoved {
            id: "ghost".into(),
            position: Point { x: 1.0, y: 1.0 },
            angle: None,
        });
        assert!(matches!(
            client.handle_event(&moved, 0.0),
            Err(ClientError::UnknownPlayer(_))
        ));
        client.on_event(&moved, 0.0);
        client.on_event(&ServerEvent::PlayerLeft("ghost".into()), 0.0);
        client.on_frame(r#"{"event":"mystery","data":null}"#, 0.0);
        assert!(client.take_notices().is_empty());
        assert!(client.phase.is_playing());
    }

    #[test]
    fn test_snapshot_drops_stale_tracks() {
        let mut client = joined();
        client.sim.toggle_pause();
        let head = client.sim().camera.head_world();
        let snapshot = |ids: &[&str]| {
            ServerEvent::GameState(GameSnapshot {
                players: ids.iter().map(|id| player(id, head.x + 20.0, head.y)).collect(),
                ..Default::default()
            })
        };
        client.on_event(&snapshot(&["me", "r1", "r2"]), 0.0);
        client.tick(&TickInput::default(), 0.0);
        assert_eq!(client.sim().interp.len(), 2);

        client.on_event(&snapshot(&["me", "r2"]), 40.0);
        assert!(!client.sim().interp.is_tracked("r1"));
        assert!(client.sim().interp.is_tracked("r2"));
    }

    #[test]
    fn test_wild_heading_keeps_ticking() {
        let mut client = joined();
        let head = client.sim().camera.head_world();
        client.on_event(&ServerEvent::PlayerJoined(player("r1", head.x + 20.0, head.y)), 0.0);
        let moved = |angle: &str| {
            format!(
                r#"{{"event":"player-moved","data":{{"id":"r1","position":{{"x":{},"y":{}}},"angle":{}}}}}"#,
                head.x + 25.0,
                head.y,
                angle
            )
        };

        client.on_frame(&moved("1e10"), 10.0);
        let out = client.tick(&TickInput::default(), 20.0);
        assert_eq!(out.remotes_drawn, 1);

        // Overflows to infinity; the heading is dropped, the position kept
        client.on_frame(&moved("1e39"), 30.0);
        let out = client.tick(&TickInput::default(), 40.0);
        assert_eq!(out.remotes_drawn, 1);
        assert_eq!(client.store().player("r1").unwrap().angle, 1e10);

        let pose = client.sim().interp.track("r1").unwrap().current().unwrap();
        assert!(pose.angle.is_finite());
        assert!(pose.angle > -std::f32::consts::PI && pose.angle <= std::f32::consts::PI);
        assert!(client.take_notices().is_empty());
    }

    #[test]
    fn test_oversized_length_is_capped() {
        let mut client = joined();
        client.sim.toggle_pause();
        let head = client.sim().camera.head_world();
        let state = format!(
            r#"{{"event":"game-state","data":{{"players":[
                {{"id":"me","name":"me","walletAddress":"0xme","position":{{"x":{x},"y":{y}}},"length":4000000000}},
                {{"id":"r1","name":"r1","position":{{"x":{rx},"y":{y}}},"length":4000000000}}]}}}}"#,
            x = head.x,
            rx = head.x + 20.0,
            y = head.y,
        );
        client.on_frame(&state, 0.0);
        client.tick(&TickInput::default(), 0.0);

        let cap = MAX_SNAKE_LENGTH as usize;
        assert_eq!(client.store().player("r1").unwrap().length, MAX_SNAKE_LENGTH);
        assert_eq!(client.sim().interp.track("r1").unwrap().body.len(), cap);
        assert_eq!(client.sim().local.as_ref().unwrap().body.len(), cap);
        assert_eq!(client.hud().unwrap().length, MAX_SNAKE_LENGTH);
    }

    #[test]
    fn test_non_finite_position_is_dropped() {
        let mut client = joined();
        client.on_event(&ServerEvent::PlayerJoined(player("r1", 5.0, 5.0)), 0.0);
        client.on_frame(
            r#"{"event":"player-moved","data":{"id":"r1","position":{"x":1e39,"y":0},"angle":0}}"#,
            10.0,
        );
        let r1 = client.store().player("r1").unwrap();
        assert_eq!(r1.position, Point { x: 5.0, y: 5.0 });
        let track = client.sim().interp.track("r1").unwrap();
        assert_eq!(track.target().unwrap().position, glam::Vec2::new(5.0, 5.0));
        assert!(client.take_notices().is_empty());
        assert!(client.phase.is_playing());
    }

    #[test]
    fn test_death_with_nothing_known_is_a_hard_error() {
        let mut client = joined();
        client.on_event(&ServerEvent::PlayerLeft("me".into()), 0.0);
        client.phase.forget_cache();

        let death = ServerEvent::PlayerDiedCollision(None);
        let err = client.handle_event(&death, 1.0).unwrap_err();
        assert!(matches!(err, ClientError::MissingLocalSnapshot));
        assert!(client.phase.is_playing());
        assert!(client.store().game_started);

        assert!(client.on_event(&death, 2.0).is_empty());
        let notices = client.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Blocking);
    }

    #[test]
    fn test_track_is_stamped_on_arrival() {
        let mut client = joined();
        client.sim.toggle_pause();
        let head = client.sim().camera.head_world();
        client.on_event(
            &ServerEvent::GameState(GameSnapshot {
                players: vec![player("me", head.x, head.y), player("r1", head.x + 20.0, head.y)],
                ..Default::default()
            }),
            10.0,
        );
        assert_eq!(client.sim().interp.track("r1").unwrap().received_at(), Some(10.0));

        client.on_event(
            &ServerEvent::PlayerMoved(PlayerMoved {
                id: "r1".into(),
                position: Point {
                    x: head.x + 30.0,
                    y: head.y,
                },
                angle: Some(0.5),
            }),
            25.0,
        );
        client.tick(&TickInput::default(), 40.0);
        let track = client.sim().interp.track("r1").unwrap();
        assert_eq!(track.received_at(), Some(25.0));
        assert_eq!(track.target().unwrap().angle, 0.5);
    }

    #[test]
    fn test_play_again_resets_everything() {
        let mut client = joined();
        client.on_event(&ServerEvent::PlayerDiedCollision(None), 0.0);
        client.play_again();
        assert_eq!(client.phase(), &GamePhase::Start);
        assert!(client.store().players.is_empty());
        assert!(client.store().wallet_address.is_none());
        assert_eq!(client.render_phase(), RenderPhase::Idle);
        assert!(client.hud().is_none());
    }

    #[test]
    fn test_frame_gate_and_transport_round_trip() {
        let mut client = joined();
        let mut transport = Transport::new(
            MockConnection::default(),
            "ws://test",
            EventBus::shared(),
            ReconnectPolicy::default(),
        );
        transport.connect().unwrap();

        let input = TickInput::default();
        let first = client.frame(&input, 1000.0).unwrap();
        assert!(client.frame(&input, 1010.0).is_none());
        assert_eq!(transport.send_all(&first.outbound), 1);
        assert!(transport.connection().sent[0].contains("player-move"));
    }
}
