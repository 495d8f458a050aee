//! Game phase controller
//!
//! Decides which top-level screen is showing. The interesting part is death
//! resolution: the local player may already be gone from the roster when the
//! death event arrives, so the last score seen is cached and used as a
//! fallback.

use crate::error::{ClientError, Result};
use crate::net::protocol::{BlockchainUpdate, Player, TokenBalance};

/// Score and tokens of the local player at some instant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreSnapshot {
    pub score: u64,
    pub length: u32,
    pub collected_tokens: Vec<TokenBalance>,
}

impl ScoreSnapshot {
    pub fn from_player(p: &Player) -> Self {
        Self {
            score: p.score,
            length: p.length,
            collected_tokens: p.collected_tokens.clone(),
        }
    }

    pub fn collected_total(&self) -> f64 {
        self.collected_tokens.iter().map(|t| t.amount).sum()
    }
}

/// On-chain settlement after a round ends
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Waiting for `blockchain-update-complete`
    Processing,
    Complete {
        success: bool,
        final_status: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameOver {
    /// Escaped (tokens claimable) rather than died
    pub success: bool,
    pub result: ScoreSnapshot,
    pub settlement: Settlement,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GamePhase {
    #[default]
    Start,
    Playing,
    GameOver(GameOver),
    /// A reward from an earlier round is still waiting to be claimed
    PendingClaim { tokens: Vec<TokenBalance> },
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            GamePhase::Start => "start",
            GamePhase::Playing => "playing",
            GamePhase::GameOver(_) => "game-over",
            GamePhase::PendingClaim { .. } => "pending-claim",
        }
    }
}

#[derive(Debug, Default)]
pub struct PhaseController {
    phase: GamePhase,
    pending_join: Option<String>,
    cache: Option<ScoreSnapshot>,
}

impl PhaseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &GamePhase {
        &self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase.name() != phase.name() {
            log::info!("Phase: {} -> {}", self.phase.name(), phase.name());
        }
        self.phase = phase;
    }

    /// Remember that a join was sent for `wallet`
    pub fn begin_join(&mut self, wallet: &str) {
        self.pending_join = Some(wallet.to_string());
    }

    pub fn pending_join(&self) -> Option<&str> {
        self.pending_join.as_deref()
    }

    /// Enter play if `player` confirms our pending join
    pub fn on_player_joined(&mut self, player: &Player) -> bool {
        let ours = self
            .pending_join
            .as_deref()
            .is_some_and(|w| w.eq_ignore_ascii_case(&player.wallet_address));
        if !ours || self.phase != GamePhase::Start {
            return false;
        }
        self.pending_join = None;
        self.cache = Some(ScoreSnapshot::from_player(player));
        self.set_phase(GamePhase::Playing);
        true
    }

    /// Refresh the last-known score
    pub fn remember(&mut self, snapshot: ScoreSnapshot) {
        self.cache = Some(snapshot);
    }

    pub fn cached(&self) -> Option<&ScoreSnapshot> {
        self.cache.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn forget_cache(&mut self) {
        self.cache = None;
    }

    /// Pick the best available result: the event payload, then the live
    /// roster entry, then the cache
    pub fn resolve_result(
        &self,
        payload: Option<&Player>,
        current: Option<&Player>,
    ) -> Result<ScoreSnapshot> {
        payload
            .or(current)
            .map(ScoreSnapshot::from_player)
            .or_else(|| self.cache.clone())
            .ok_or(ClientError::MissingLocalSnapshot)
    }

    /// End the round. Leaves the phase unchanged when no result is known.
    pub fn finish(
        &mut self,
        success: bool,
        payload: Option<&Player>,
        current: Option<&Player>,
    ) -> Result<()> {
        let result = self.resolve_result(payload, current)?;
        log::info!(
            "Round over ({}), score {}",
            if success { "escaped" } else { "died" },
            result.score
        );
        self.set_phase(GamePhase::GameOver(GameOver {
            success,
            result,
            settlement: Settlement::Processing,
        }));
        Ok(())
    }

    pub fn game_over(&self) -> Option<&GameOver> {
        match &self.phase {
            GamePhase::GameOver(over) => Some(over),
            _ => None,
        }
    }

    /// Record the outcome of on-chain settlement; returns false if nothing
    /// was waiting for it
    pub fn on_blockchain_update(&mut self, update: &BlockchainUpdate) -> bool {
        if let GamePhase::GameOver(over) = &mut self.phase {
            if over.settlement != Settlement::Processing {
                return false;
            }
            log::info!("Settlement complete (success: {})", update.success);
            over.settlement = Settlement::Complete {
                success: update.success,
                final_status: update.final_status.clone(),
            };
            return true;
        }
        if matches!(self.phase, GamePhase::PendingClaim { .. }) && update.success {
            self.set_phase(GamePhase::Start);
            return true;
        }
        false
    }

    /// Show the claim screen for a reward found by session recovery
    pub fn enter_pending_claim(&mut self, tokens: Vec<TokenBalance>) -> bool {
        if self.phase != GamePhase::Start {
            return false;
        }
        self.set_phase(GamePhase::PendingClaim { tokens });
        true
    }

    /// Back to the start screen, forgetting the round
    pub fn play_again(&mut self) {
        self.pending_join = None;
        self.cache = None;
        self.set_phase(GamePhase::Start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::{player, token};

    fn playing() -> PhaseController {
        let mut pc = PhaseController::new();
        pc.begin_join("0xme");
        assert!(pc.on_player_joined(&player("me", 0.0, 0.0)));
        pc
    }

    #[test]
    fn test_join_requires_matching_wallet() {
        let mut pc = PhaseController::new();
        assert!(!pc.on_player_joined(&player("me", 0.0, 0.0)));
        pc.begin_join("0xME");
        assert!(!pc.on_player_joined(&player("other", 0.0, 0.0)));
        assert_eq!(pc.phase(), &GamePhase::Start);
        assert!(pc.on_player_joined(&player("me", 0.0, 0.0)));
        assert!(pc.is_playing());
        assert!(pc.pending_join().is_none());
    }

    #[test]
    fn test_death_prefers_payload_then_roster_then_cache() {
        let mut pc = playing();
        let mut cached = player("me", 0.0, 0.0);
        cached.score = 40;
        pc.remember(ScoreSnapshot::from_player(&cached));

        let mut roster = cached.clone();
        roster.score = 50;
        let mut payload = cached.clone();
        payload.score = 60;

        assert_eq!(pc.resolve_result(Some(&payload), Some(&roster)).unwrap().score, 60);
        assert_eq!(pc.resolve_result(None, Some(&roster)).unwrap().score, 50);
        assert_eq!(pc.resolve_result(None, None).unwrap().score, 40);
    }

    #[test]
    fn test_death_after_removal_uses_cached_score() {
        let mut pc = playing();
        let mut me = player("me", 0.0, 0.0);
        me.score = 75;
        me.collected_tokens = vec![token("USDC", 3.0)];
        pc.remember(ScoreSnapshot::from_player(&me));

        pc.finish(false, None, None).unwrap();
        let over = pc.game_over().unwrap();
        assert_eq!(over.result.score, 75);
        assert_eq!(over.result.collected_total(), 3.0);
        assert!(!over.success);
    }

    #[test]
    fn test_missing_snapshot_aborts_transition() {
        let mut pc = PhaseController::new();
        pc.set_phase(GamePhase::Playing);
        let err = pc.finish(true, None, None).unwrap_err();
        assert!(matches!(err, ClientError::MissingLocalSnapshot));
        assert!(pc.is_playing());
    }

    #[test]
    fn test_settlement_and_play_again() {
        let mut pc = playing();
        pc.finish(true, None, None).unwrap();
        let update = BlockchainUpdate {
            success: true,
            final_status: Some("claimable".into()),
        };
        assert!(pc.on_blockchain_update(&update));
        assert!(!pc.on_blockchain_update(&update));
        assert_eq!(
            pc.game_over().unwrap().settlement,
            Settlement::Complete {
                success: true,
                final_status: Some("claimable".into())
            }
        );

        pc.play_again();
        assert_eq!(pc.phase(), &GamePhase::Start);
        assert!(pc.cached().is_none());
    }

    #[test]
    fn test_pending_claim_clears_on_settlement() {
        let mut pc = PhaseController::new();
        assert!(pc.enter_pending_claim(vec![token("USDC", 1.0)]));
        assert!(!pc.on_blockchain_update(&BlockchainUpdate {
            success: false,
            final_status: None
        }));
        assert!(pc.on_blockchain_update(&BlockchainUpdate {
            success: true,
            final_status: None
        }));
        assert_eq!(pc.phase(), &GamePhase::Start);
    }
}
