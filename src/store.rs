//! Client state store
//!
//! Holds the latest server view of the match. Full snapshots replace lists
//! wholesale; incremental events go through the targeted mutators. Nothing
//! derived is cached: callers recompute from the raw lists.

use crate::net::protocol::{
    Food, GameSnapshot, LeaderboardEntry, MapToken, Player, Point, TokenBalance,
};

/// Partial player update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub position: Option<Point>,
    pub angle: Option<f32>,
    pub score: Option<u64>,
    pub length: Option<u32>,
    pub alive: Option<bool>,
    pub collected_tokens: Option<Vec<TokenBalance>>,
}

impl PlayerPatch {
    /// Everything the server reports for a player, as a patch
    pub fn from_player(p: &Player) -> Self {
        Self {
            name: Some(p.name.clone()),
            position: Some(p.position),
            angle: Some(p.angle),
            score: Some(p.score),
            length: Some(p.length),
            alive: Some(p.alive),
            collected_tokens: Some(p.collected_tokens.clone()),
        }
    }

    fn apply(self, p: &mut Player) {
        if let Some(v) = self.name {
            p.name = v;
        }
        if let Some(v) = self.position {
            p.position = v;
        }
        if let Some(v) = self.angle {
            p.angle = v;
        }
        if let Some(v) = self.score {
            p.score = v;
        }
        if let Some(v) = self.length {
            p.length = v;
        }
        if let Some(v) = self.alive {
            p.alive = v;
        }
        if let Some(v) = self.collected_tokens {
            p.collected_tokens = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientStore {
    pub wallet_address: Option<String>,
    pub player_name: String,
    pub current_player: Option<Player>,
    pub players: Vec<Player>,
    pub foods: Vec<Food>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub map_tokens: Vec<MapToken>,
    pub game_started: bool,
    pub can_escape: bool,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_wallet_address(&mut self, address: Option<String>) {
        self.wallet_address = address;
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    pub fn set_current_player(&mut self, player: Option<Player>) {
        self.current_player = player;
    }

    pub fn set_players(&mut self, players: Vec<Player>) {
        self.players = players;
    }

    pub fn set_foods(&mut self, foods: Vec<Food>) {
        self.foods = foods;
    }

    pub fn set_leaderboard(&mut self, leaderboard: Vec<LeaderboardEntry>) {
        self.leaderboard = leaderboard;
    }

    pub fn set_map_tokens(&mut self, tokens: Vec<MapToken>) {
        self.map_tokens = tokens;
    }

    pub fn set_game_started(&mut self, started: bool) {
        self.game_started = started;
    }

    pub fn set_can_escape(&mut self, can_escape: bool) {
        self.can_escape = can_escape;
    }

    /// Replace players, foods, leaderboard (and map tokens when present)
    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        self.set_players(snapshot.players);
        self.set_foods(snapshot.foods);
        self.set_leaderboard(snapshot.leaderboard);
        if let Some(tokens) = snapshot.map_tokens {
            self.set_map_tokens(tokens);
        }
    }

    /// Insert a player, replacing an entry with the same id
    pub fn add_player(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    /// Returns false if no player had this id
    pub fn remove_player(&mut self, id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != before
    }

    /// Returns false if no player had this id
    pub fn update_player(&mut self, id: &str, patch: PlayerPatch) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                patch.apply(p);
                true
            }
            None => false,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Returns false (and changes nothing) for an unknown id
    pub fn remove_food(&mut self, id: &str) -> bool {
        let before = self.foods.len();
        self.foods.retain(|f| f.id != id);
        self.foods.len() != before
    }

    /// Back to the initial empty state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
