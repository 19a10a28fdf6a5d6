//! Game configuration.
//!
//! Settings are consulted once, when a game or room is created. Changing them
//! afterwards has no effect on a game already in progress.

use serde::{Deserialize, Serialize};

use super::game::GameError;

/// Default number of clue/vote rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 3;

/// Default minimum players to start.
pub const DEFAULT_MIN_PLAYERS: usize = 3;

/// Default maximum players (also the room capacity).
pub const DEFAULT_MAX_PLAYERS: usize = 10;

/// Fewest players any configuration may allow: one imposter and one crew.
pub const ABSOLUTE_MIN_PLAYERS: usize = 2;

/// Game settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Rounds before the game can go no further
    pub max_rounds: u32,

    /// Minimum players to start a game
    pub min_players: usize,

    /// Maximum players in a game or room
    pub max_players: usize,

    /// Whether the imposter may try to guess the secret word
    pub allow_imposter_guess: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            allow_imposter_guess: true,
        }
    }
}

impl GameSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| GameError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings are internally consistent.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_rounds == 0 {
            return Err(GameError::InvalidSettings(
                "maxRounds must be at least 1".to_string(),
            ));
        }
        if self.min_players < ABSOLUTE_MIN_PLAYERS {
            return Err(GameError::InvalidSettings(format!(
                "minPlayers must be at least {}",
                ABSOLUTE_MIN_PLAYERS
            )));
        }
        if self.min_players > self.max_players {
            return Err(GameError::InvalidSettings(format!(
                "minPlayers ({}) exceeds maxPlayers ({})",
                self.min_players, self.max_players
            )));
        }
        Ok(())
    }

    /// Check whether a game with `count` players may be created.
    pub fn accepts_player_count(&self, count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&count)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "maxRounds": self.max_rounds,
            "minPlayers": self.min_players,
            "maxPlayers": self.max_players,
            "allowImposterGuess": self.allow_imposter_guess
        })
    }
}
