// tabellone/src/config.rs
// File-based configuration for the simulation runner. Plain `key = value`
// lines, `#` comments, missing keys fall back to defaults.

use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub bot_players: usize,
    pub cards_per_player: usize,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bot_players: 4,
            cards_per_player: 2,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let map = parse_config(&content);
        let defaults = Self::default();

        Ok(GameConfig {
            bot_players: map
                .get("bot_players")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.bot_players),
            cards_per_player: map
                .get("cards_per_player")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.cards_per_player),
            seed: map.get("seed").and_then(|value| value.parse().ok()),
        })
    }

    pub fn load_or_default() -> Self {
        let config_path = "conf/game.conf";

        match Self::from_file(config_path) {
            Ok(config) => {
                info!("loaded configuration from {config_path}");
                config
            }
            Err(e) => {
                warn!("could not load {config_path}: {e}. Using defaults.");
                Self::default()
            }
        }
    }
}

fn parse_config(content: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse key = value pairs
        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}
