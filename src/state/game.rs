//! Game state machine.
//!
//! One [`GameState`] holds a single game: its players, the secret word, the
//! clue and vote history, and the outcome. Both the local driver and the room
//! registry run their games through it.
//!
//! # State Diagram
//!
//! ```text
//!  ┌───────┐  deal   ┌─────────────┐ begin_play ┌─────────┐ start_voting ┌────────┐
//!  │ Setup │────────▶│ RoleReveal  │───────────▶│ Playing │─────────────▶│ Voting │
//!  └───────┘         └─────────────┘            └─────────┘              └───┬────┘
//!                                                    ▲                       │
//!                                                    │ next_round            │ eliminate_player
//!                                                    │                       ▼
//!                                                    │                 ┌──────────┐
//!                                                    └─────────────────│ Finished │
//!                                                      (no winner yet) └──────────┘
//! ```
//!
//! A correct imposter guess finishes the game from any phase.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::{deal_roles, Player, Role, Roster};

/// Game state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    /// No game dealt yet
    #[default]
    Setup,
    /// Players are privately looking at their roles
    RoleReveal,
    /// Players are giving clues
    Playing,
    /// Players are voting on the imposter
    Voting,
    /// A player was eliminated or the imposter guessed the word
    Finished,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::RoleReveal => "role-reveal",
            Self::Playing => "playing",
            Self::Voting => "voting",
            Self::Finished => "finished",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Winning side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Crew,
    Imposter,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crew => "crew",
            Self::Imposter => "imposter",
        }
    }
}

/// A clue given by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub text: String,
    pub round: u32,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A vote cast against a suspected imposter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_id: String,
    pub target_id: String,
    pub round: u32,
}

/// Game errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game requires between {min} and {max} players, got {got}")]
    Validation { min: usize, max: usize, got: usize },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("no game in progress")]
    NoActiveGame,

    #[error("not allowed while the game is {0}")]
    WrongPhase(GameStatus),

    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("player {0} has been eliminated")]
    PlayerEliminated(String),

    #[error("no votes have been cast this round")]
    NoVotes,

    #[error("imposter guesses are disabled")]
    GuessNotAllowed,

    #[error("the game has already been decided")]
    GameOver,

    #[error("already on the final round ({0})")]
    LastRound(u32),
}

/// Game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    id: String,
    status: GameStatus,
    players: Vec<Player>,
    secret_word: String,
    current_round: u32,
    max_rounds: u32,
    clues: Vec<Clue>,
    votes: Vec<Vote>,
    imposter_guess: Option<String>,
    winner: Option<Winner>,
    eliminated_player: Option<Player>,
}

impl GameState {
    /// Deal a new game from a roster.
    ///
    /// Everyone starts as crew and the roster's imposter count is dealt at
    /// random. The game opens in `opening` on round 1.
    pub fn deal<R, G>(
        roster: &R,
        secret_word: impl Into<String>,
        max_rounds: u32,
        opening: GameStatus,
        rng: &mut G,
    ) -> Self
    where
        R: Roster + ?Sized,
        G: Rng + ?Sized,
    {
        let players = deal_roles(roster.seats(), roster.imposter_count(), rng);
        let game = Self {
            id: format!("game-{}", Uuid::new_v4()),
            status: opening,
            players,
            secret_word: secret_word.into(),
            current_round: 1,
            max_rounds,
            clues: Vec::new(),
            votes: Vec::new(),
            imposter_guess: None,
            winner: None,
            eliminated_player: None,
        };
        tracing::debug!(
            game = %game.id,
            players = game.players.len(),
            imposters = game.imposters().count(),
            status = %game.status,
            "dealt game"
        );
        game
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn imposter_guess(&self) -> Option<&str> {
        self.imposter_guess.as_deref()
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn eliminated_player(&self) -> Option<&Player> {
        self.eliminated_player.as_ref()
    }

    /// Players in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// All clues from every round, oldest first.
    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    /// Votes in the current round, in the order cast.
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// Finish role reveal and start the first clue round.
    pub fn begin_play(&mut self) -> Result<(), GameError> {
        self.require(GameStatus::RoleReveal)?;
        self.status = GameStatus::Playing;
        Ok(())
    }

    /// Record a clue for the current round.
    ///
    /// A player may give any number of clues per round.
    pub fn add_clue(&mut self, player_id: &str, text: impl Into<String>) -> Result<&Clue, GameError> {
        self.require(GameStatus::Playing)?;

        let player = self
            .get_player(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        if player.is_eliminated {
            return Err(GameError::PlayerEliminated(player_id.to_string()));
        }

        let clue = Clue {
            id: format!("clue-{}", Uuid::new_v4()),
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            text: text.into(),
            round: self.current_round,
            timestamp: chrono::Utc::now(),
        };
        self.clues.push(clue);
        Ok(&self.clues[self.clues.len() - 1])
    }

    /// Move from clues to voting. Whether enough clues were given is up to the
    /// caller; see [`can_start_voting`](Self::can_start_voting).
    pub fn start_voting(&mut self) -> Result<(), GameError> {
        self.require(GameStatus::Playing)?;
        self.status = GameStatus::Voting;
        Ok(())
    }

    /// Cast a vote, replacing the voter's earlier vote this round.
    pub fn add_vote(&mut self, voter_id: &str, target_id: &str) -> Result<&Vote, GameError> {
        self.require(GameStatus::Voting)?;

        let round = self.current_round;
        self.votes
            .retain(|v| !(v.voter_id == voter_id && v.round == round));
        self.votes.push(Vote {
            voter_id: voter_id.to_string(),
            target_id: target_id.to_string(),
            round,
        });
        Ok(&self.votes[self.votes.len() - 1])
    }

    /// Eliminate a player and end the game.
    ///
    /// The crew wins if the player was an imposter; the imposters win if at
    /// most one crew member survives. Otherwise the game is finished without a
    /// winner and may be resumed with [`next_round`](Self::next_round).
    pub fn eliminate_player(&mut self, player_id: &str) -> Result<Option<Winner>, GameError> {
        self.require(GameStatus::Voting)?;

        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        if !player.eliminate() {
            return Err(GameError::PlayerEliminated(player_id.to_string()));
        }
        let eliminated = player.clone();

        self.status = GameStatus::Finished;
        self.winner = if eliminated.is_imposter() {
            Some(Winner::Crew)
        } else if self.surviving(Role::Crew) <= 1 {
            Some(Winner::Imposter)
        } else {
            None
        };

        tracing::debug!(
            game = %self.id,
            player_id,
            role = %eliminated.role,
            winner = self.winner.map(|w| w.as_str()),
            "player eliminated"
        );
        self.eliminated_player = Some(eliminated);
        Ok(self.winner)
    }

    /// Eliminate whoever received the most votes this round.
    pub fn resolve_voting(&mut self) -> Result<Option<Winner>, GameError> {
        self.require(GameStatus::Voting)?;
        let target = self
            .most_voted_target()
            .ok_or(GameError::NoVotes)?
            .to_string();
        self.eliminate_player(&target)
    }

    /// Record the imposter's guess at the secret word.
    ///
    /// Returns whether the guess was right; a right guess wins the game for
    /// the imposters. Comparison ignores case.
    pub fn set_imposter_guess(&mut self, guess: impl Into<String>) -> Result<bool, GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }

        let guess = guess.into();
        let correct = guess.to_lowercase() == self.secret_word.to_lowercase();
        self.imposter_guess = Some(guess);

        if correct {
            self.winner = Some(Winner::Imposter);
            self.status = GameStatus::Finished;
        }
        Ok(correct)
    }

    /// Start the next clue round. Votes are cleared; clues are kept.
    pub fn next_round(&mut self) -> Result<u32, GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }
        if matches!(self.status, GameStatus::Setup | GameStatus::RoleReveal) {
            return Err(GameError::WrongPhase(self.status));
        }
        if self.current_round >= self.max_rounds {
            return Err(GameError::LastRound(self.max_rounds));
        }

        self.current_round += 1;
        self.status = GameStatus::Playing;
        self.votes.clear();
        Ok(self.current_round)
    }

    fn require(&self, status: GameStatus) -> Result<(), GameError> {
        if self.status == status {
            Ok(())
        } else {
            Err(GameError::WrongPhase(self.status))
        }
    }

    fn surviving(&self, role: Role) -> usize {
        self.players
            .iter()
            .filter(|p| p.role == role && p.is_active())
            .count()
    }

    // Derived queries

    /// Players not yet eliminated.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn imposters(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_imposter())
    }

    pub fn current_round_clues(&self) -> impl Iterator<Item = &Clue> {
        self.clues
            .iter()
            .filter(move |c| c.round == self.current_round)
    }

    pub fn current_round_votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes
            .iter()
            .filter(move |v| v.round == self.current_round)
    }

    /// Votes per target this round, in the order each target first received
    /// a vote.
    pub fn vote_tally(&self) -> Vec<(&str, usize)> {
        let mut tally: Vec<(&str, usize)> = Vec::new();
        for vote in self.current_round_votes() {
            match tally.iter_mut().find(|(id, _)| *id == vote.target_id) {
                Some((_, count)) => *count += 1,
                None => tally.push((vote.target_id.as_str(), 1)),
            }
        }
        tally
    }

    /// Target with the most votes this round. Ties go to the target that was
    /// voted for first.
    pub fn most_voted_target(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (id, count) in self.vote_tally() {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((id, count));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn most_voted_player(&self) -> Option<&Player> {
        self.most_voted_target().and_then(|id| self.get_player(id))
    }

    /// Every active player has given a clue this round. Advisory only.
    pub fn can_start_voting(&self) -> bool {
        self.current_round_clues().count() >= self.active_players().count()
    }

    /// Every active player has voted this round. Advisory only.
    pub fn all_players_voted(&self) -> bool {
        self.current_round_votes().count() >= self.active_players().count()
    }

    pub fn is_last_round(&self) -> bool {
        self.current_round >= self.max_rounds
    }

    /// Full snapshot, including every role and the secret word.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "status": self.status.as_str(),
            "players": self.players,
            "secretWord": self.secret_word,
            "currentRound": self.current_round,
            "maxRounds": self.max_rounds,
            "clues": self.clues,
            "votes": self.votes,
            "imposterGuess": self.imposter_guess,
            "winner": self.winner.map(|w| w.as_str()),
            "eliminatedPlayer": self.eliminated_player
        })
    }

    /// Snapshot as one player may see it: other players' roles are hidden
    /// and imposters do not get the secret word, until the game is over.
    pub fn to_json_for(&self, player_id: &str) -> serde_json::Value {
        if self.status.is_terminal() && self.winner.is_some() {
            return self.to_json();
        }

        let viewer_role = self.get_player(player_id).map(|p| p.role);
        let players: Vec<serde_json::Value> = self
            .players
            .iter()
            .map(|p| {
                let mut obj = serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "isEliminated": p.is_eliminated
                });
                if p.id == player_id {
                    obj["role"] = serde_json::json!(p.role.as_str());
                }
                obj
            })
            .collect();

        let secret_word = match viewer_role {
            Some(Role::Crew) => Some(self.secret_word.as_str()),
            _ => None,
        };

        serde_json::json!({
            "id": self.id,
            "status": self.status.as_str(),
            "players": players,
            "secretWord": secret_word,
            "role": viewer_role.map(|r| r.as_str()),
            "currentRound": self.current_round,
            "maxRounds": self.max_rounds,
            "clues": self.clues,
            "votes": self.votes,
            "imposterGuess": self.imposter_guess,
            "winner": self.winner.map(|w| w.as_str()),
            "eliminatedPlayer": self.eliminated_player
        })
    }
}
