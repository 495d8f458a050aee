//! Client settings and preferences
//!
//! Persisted in LocalStorage on the web; read from the environment natively.

use serde::{Deserialize, Serialize};

use crate::consts::{BLEND_FACTOR, TICK_RATE};
use crate::net::transport::ReconnectPolicy;
use crate::sim::tick::TickConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Remote snakes drawn per tick at most
    pub fn max_visible_players(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => 50,
            QualityPreset::High => 100,
        }
    }

    /// Whether remote snakes get antennae and legs
    pub fn remote_detail(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game server WebSocket endpoint
    pub server_url: String,
    pub reconnect_attempts: u32,
    pub reconnect_delay_ms: u32,

    /// Logical ticks per second
    pub tick_rate: u32,
    /// Remote smoothing per tick, in (0, 1]
    pub blend_factor: f32,

    /// Graphics quality preset
    pub quality: QualityPreset,
    pub show_minimap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3333/ws".to_string(),
            reconnect_attempts: 5,
            reconnect_delay_ms: 1000,
            tick_rate: TICK_RATE,
            blend_factor: BLEND_FACTOR,
            quality: QualityPreset::Medium,
            show_minimap: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Clamp out-of-range values
    pub fn validate(mut self) -> Self {
        if !(self.blend_factor > 0.0 && self.blend_factor <= 1.0) {
            log::warn!("Blend factor {} out of range, using default", self.blend_factor);
            self.blend_factor = if self.blend_factor > 1.0 { 1.0 } else { BLEND_FACTOR };
        }
        self.tick_rate = self.tick_rate.clamp(1, 120);
        self
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.reconnect_attempts,
            delay_ms: self.reconnect_delay_ms,
        }
    }

    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            blend: self.blend_factor,
            max_visible: self.quality.max_visible_players(),
            remote_detail: self.quality.remote_detail(),
            show_minimap: self.show_minimap,
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(s) => Some(s.validate()),
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                None
            }
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "stake_snake_settings";

    /// Environment variable holding settings JSON (native)
    pub const ENV_VAR: &'static str = "STAKE_SNAKE_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var(Self::ENV_VAR) {
            Ok(json) => Self::from_json(&json).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.server_url, "ws://localhost:3333/ws");
        assert_eq!(s.reconnect_policy(), ReconnectPolicy::default());
        assert_eq!(s.tick_config(), TickConfig::default());
    }

    #[test]
    fn test_partial_json_and_clamping() {
        let s = Settings::from_json(r#"{"tick_rate": 500, "blend_factor": 0.0}"#).unwrap();
        assert_eq!(s.tick_rate, 120);
        assert_eq!(s.blend_factor, BLEND_FACTOR);
        assert_eq!(s.server_url, Settings::default().server_url);

        let s = Settings::from_json(r#"{"blend_factor": 3.5, "quality": "Low"}"#).unwrap();
        assert_eq!(s.blend_factor, 1.0);
        assert_eq!(s.tick_config().max_visible, 20);
        assert!(!s.tick_config().remote_detail);

        assert!(Settings::from_json("not json").is_none());
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(Settings::from_preset(QualityPreset::High).tick_config().max_visible, 100);
    }
}
