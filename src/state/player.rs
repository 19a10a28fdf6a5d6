//! Players, roles, and the rosters games are dealt from.
//!
//! A game does not care where its players come from. Anything that can list
//! seats and say how many imposters to deal implements [`Roster`]: a plain
//! list of names for a single-device game, or a [`Room`](super::room::Room)
//! for a hosted one.

use std::fmt;

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A player's secret role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Knows the secret word
    #[default]
    Crew,
    /// Does not know the secret word
    Imposter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crew => "crew",
            Self::Imposter => "imposter",
        }
    }

    pub fn is_imposter(&self) -> bool {
        matches!(self, Self::Imposter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub is_eliminated: bool,
}

impl Player {
    /// Create a crew member.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: Role::Crew,
            is_eliminated: false,
        }
    }

    pub fn is_imposter(&self) -> bool {
        self.role.is_imposter()
    }

    /// Whether this player still takes part in clues and votes.
    pub fn is_active(&self) -> bool {
        !self.is_eliminated
    }

    /// Mark as eliminated. Returns false if already eliminated.
    pub fn eliminate(&mut self) -> bool {
        if self.is_eliminated {
            return false;
        }
        self.is_eliminated = true;
        true
    }
}

/// A seat at the table, before roles are dealt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: String,
    pub name: String,
}

/// A source of players for a new game.
pub trait Roster {
    /// Seats in play order.
    fn seats(&self) -> Vec<Seat>;

    /// How many imposters to deal.
    fn imposter_count(&self) -> usize;
}

/// A bare list of names: seat ids are `player-{index}`, one imposter.
impl<S: AsRef<str>> Roster for [S] {
    fn seats(&self) -> Vec<Seat> {
        self.iter()
            .enumerate()
            .map(|(i, name)| Seat {
                id: format!("player-{}", i),
                name: name.as_ref().to_string(),
            })
            .collect()
    }

    fn imposter_count(&self) -> usize {
        1
    }
}

/// Deal roles: everyone starts as crew, then `imposters` distinct seats,
/// chosen uniformly without replacement, become imposters.
pub fn deal_roles<R: Rng + ?Sized>(seats: Vec<Seat>, imposters: usize, rng: &mut R) -> Vec<Player> {
    let mut players: Vec<Player> = seats
        .into_iter()
        .map(|seat| Player::new(seat.id, seat.name))
        .collect();

    let amount = imposters.min(players.len());
    for i in index::sample(rng, players.len(), amount) {
        players[i].role = Role::Imposter;
    }

    players
}
