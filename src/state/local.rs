//! Single-device game.
//!
//! Everyone plays on one screen: the driver owns the settings, an optional
//! word category, and at most one active game.

use rand::Rng;

use super::game::{Clue, GameError, GameState, GameStatus, Vote, Winner};
use super::player::Player;
use super::settings::GameSettings;
use super::words::{self, Category};

/// Local game driver.
#[derive(Debug, Clone, Default)]
pub struct LocalGame {
    settings: GameSettings,
    category: Option<Category>,
    game: Option<GameState>,
}

impl LocalGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver with custom settings.
    pub fn with_settings(settings: GameSettings) -> Result<Self, GameError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Replace the settings. Applies to the next game created.
    pub fn set_settings(&mut self, settings: GameSettings) -> Result<(), GameError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Restrict random secret words to one category.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
    }

    /// The active game, if any.
    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn has_game(&self) -> bool {
        self.game.is_some()
    }

    /// Start a new game, replacing any active one.
    ///
    /// One player is dealt the imposter role. An empty or missing
    /// `secret_word` draws one from the word list.
    pub fn create_game<S: AsRef<str>>(
        &mut self,
        player_names: &[S],
        secret_word: Option<&str>,
    ) -> Result<&GameState, GameError> {
        self.create_game_with_rng(player_names, secret_word, &mut rand::rng())
    }

    pub fn create_game_with_rng<S, R>(
        &mut self,
        player_names: &[S],
        secret_word: Option<&str>,
        rng: &mut R,
    ) -> Result<&GameState, GameError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if !self.settings.accepts_player_count(player_names.len()) {
            return Err(GameError::Validation {
                min: self.settings.min_players,
                max: self.settings.max_players,
                got: player_names.len(),
            });
        }

        let secret_word = match secret_word.filter(|w| !w.is_empty()) {
            Some(word) => word.to_string(),
            None => words::random_word_with_rng(self.category, rng).to_string(),
        };

        let game = GameState::deal(
            player_names,
            secret_word,
            self.settings.max_rounds,
            GameStatus::Playing,
            rng,
        );
        tracing::info!(game = %game.id(), players = player_names.len(), "local game created");

        Ok(self.game.insert(game))
    }

    fn active(&mut self) -> Result<&mut GameState, GameError> {
        self.game.as_mut().ok_or(GameError::NoActiveGame)
    }

    pub fn add_clue(&mut self, player_id: &str, text: impl Into<String>) -> Result<&Clue, GameError> {
        self.active()?.add_clue(player_id, text)
    }

    pub fn start_voting(&mut self) -> Result<(), GameError> {
        self.active()?.start_voting()
    }

    pub fn add_vote(&mut self, voter_id: &str, target_id: &str) -> Result<&Vote, GameError> {
        self.active()?.add_vote(voter_id, target_id)
    }

    pub fn eliminate_player(&mut self, player_id: &str) -> Result<Option<Winner>, GameError> {
        self.active()?.eliminate_player(player_id)
    }

    pub fn resolve_voting(&mut self) -> Result<Option<Winner>, GameError> {
        self.active()?.resolve_voting()
    }

    /// Record the imposter's guess. Rejected when guesses are disabled.
    pub fn set_imposter_guess(&mut self, guess: impl Into<String>) -> Result<bool, GameError> {
        if !self.settings.allow_imposter_guess {
            return Err(GameError::GuessNotAllowed);
        }
        self.active()?.set_imposter_guess(guess)
    }

    pub fn next_round(&mut self) -> Result<u32, GameError> {
        self.active()?.next_round()
    }

    /// Discard the active game.
    pub fn reset_game(&mut self) -> Option<GameState> {
        self.game.take()
    }

    /// Votes per target this round; empty without a game.
    pub fn vote_tally(&self) -> Vec<(&str, usize)> {
        self.game.as_ref().map(|g| g.vote_tally()).unwrap_or_default()
    }

    pub fn most_voted_player(&self) -> Option<&Player> {
        self.game.as_ref().and_then(|g| g.most_voted_player())
    }
}
