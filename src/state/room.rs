//! Rooms: hosted games that players join with a short code.
//!
//! A [`RoomRegistry`] owns every room and the listeners subscribed to each
//! one. Rooms run their games through the same [`GameState`] machine as local
//! games; the registry keeps `room.status` and the room roster in step with it
//! and notifies listeners after each change.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::game::{GameError, GameState, GameStatus, Winner};
use super::message::{ChannelListener, RoomListener, RoomMessage, RoomMessageType, Subscription};
use super::player::{Role, Roster, Seat};
use super::settings::GameSettings;
use super::words;

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 6;

const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of imposters dealt for a room of `player_count` players.
pub fn imposter_count(player_count: usize) -> usize {
    match player_count {
        0..=6 => 1,
        7..=10 => 2,
        11..=12 => 3,
        n => n / 4,
    }
}

/// Generate a room code, uniform over `[A-Z0-9]`.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_CHARS[rng.random_range(0..ROOM_CODE_CHARS.len())] as char)
        .collect()
}

/// Room lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomStatus {
    /// Gathering players
    #[default]
    Waiting,
    RoleReveal,
    Playing,
    Voting,
    Finished,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::RoleReveal => "role-reveal",
            Self::Playing => "playing",
            Self::Voting => "voting",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GameStatus> for RoomStatus {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Setup => Self::Waiting,
            GameStatus::RoleReveal => Self::RoleReveal,
            GameStatus::Playing => Self::Playing,
            GameStatus::Voting => Self::Voting,
            GameStatus::Finished => Self::Finished,
        }
    }
}

/// A player's membership in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlayer {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    pub is_connected: bool,

    /// Set once a game starts
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,

    /// Set once a game starts
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_eliminated: Option<bool>,

    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl RoomPlayer {
    pub fn new(name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id: format!("player-{}", Uuid::new_v4()),
            name: name.into(),
            is_host,
            is_connected: true,
            role: None,
            is_eliminated: None,
            joined_at: chrono::Utc::now(),
        }
    }
}

/// Room state.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,

    /// Shareable join code
    pub code: String,

    pub host_id: String,

    /// Members in join order
    players: Vec<RoomPlayer>,

    game_state: Option<GameState>,

    pub settings: GameSettings,

    pub status: RoomStatus,

    pub created_at: chrono::DateTime<chrono::Utc>,

    pub max_players: usize,
}

impl Room {
    /// Create a room with its host as the only member.
    pub fn new(host_name: impl Into<String>, code: String, settings: GameSettings) -> Self {
        let host = RoomPlayer::new(host_name, true);
        Self {
            id: format!("room-{}", Uuid::new_v4()),
            code,
            host_id: host.id.clone(),
            players: vec![host],
            game_state: None,
            settings,
            status: RoomStatus::Waiting,
            created_at: chrono::Utc::now(),
            max_players: settings.max_players,
        }
    }

    pub fn players(&self) -> &[RoomPlayer] {
        &self.players
    }

    pub fn get_player(&self, player_id: &str) -> Option<&RoomPlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.get_player(player_id).is_some()
    }

    /// Most recent member to join.
    pub fn newest_player(&self) -> Option<&RoomPlayer> {
        self.players.last()
    }

    pub fn host(&self) -> Option<&RoomPlayer> {
        self.get_player(&self.host_id)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected).count()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    /// Enough players to start a game.
    pub fn can_start(&self) -> bool {
        self.players.len() >= self.settings.min_players
    }

    /// The room's current game, if one has started.
    pub fn game(&self) -> Option<&GameState> {
        self.game_state.as_ref()
    }

    /// Bring room status and roster in line with the game.
    fn sync_from_game(&mut self) {
        let Some(game) = &self.game_state else {
            return;
        };
        self.status = game.status().into();
        for member in &mut self.players {
            if let Some(player) = game.get_player(&member.id) {
                member.role = Some(player.role);
                member.is_eliminated = Some(player.is_eliminated);
            }
        }
    }

    /// Pass host to the first other connected member. With nobody left to
    /// take over, the leaving member stays host.
    fn transfer_host_from(&mut self, leaving_id: &str) {
        let Some(next) = self
            .players
            .iter_mut()
            .find(|p| p.id != leaving_id && p.is_connected)
        else {
            return;
        };
        next.is_host = true;
        self.host_id = next.id.clone();

        if let Some(old) = self.players.iter_mut().find(|p| p.id == leaving_id) {
            old.is_host = false;
        }
    }

    /// Convert to JSON for sending to clients.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "code": self.code,
            "hostId": self.host_id,
            "players": self.players,
            "gameState": self.game_state.as_ref().map(|g| g.to_json()),
            "settings": self.settings.to_json(),
            "status": self.status.as_str(),
            "createdAt": self.created_at.to_rfc3339(),
            "maxPlayers": self.max_players
        })
    }
}

/// Room members are dealt in join order, with the imposter count scaled to
/// the room size.
impl Roster for Room {
    fn seats(&self) -> Vec<Seat> {
        self.players
            .iter()
            .map(|p| Seat {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    fn imposter_count(&self) -> usize {
        imposter_count(self.players.len())
    }
}

/// Room errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room not found: {0}")]
    NotFound(String),

    #[error("room is full")]
    Full,

    #[error("need at least {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("no game has started in this room")]
    NoGame,

    #[error("not a member of this room: {0}")]
    NotMember(String),

    #[error("player {0} is not an imposter")]
    NotImposter(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

type Listeners = Vec<(u64, Box<dyn RoomListener>)>;

/// Room registry - tracks all rooms and their listeners.
#[derive(Default)]
pub struct RoomRegistry {
    /// Rooms by ID
    rooms: HashMap<String, Room>,

    /// Listeners by room ID, in registration order
    listeners: HashMap<String, Listeners>,

    next_subscription: u64,
}

impl fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.rooms.len())
            .field(
                "listeners",
                &self.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get room by ID.
    pub fn get_room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Get room by join code (case-insensitive).
    pub fn get_room_by_code(&self, code: &str) -> Option<&Room> {
        self.rooms
            .values()
            .find(|r| r.code.eq_ignore_ascii_case(code))
    }

    /// Count rooms.
    pub fn count(&self) -> usize {
        self.rooms.len()
    }

    /// Get all room IDs.
    pub fn room_ids(&self) -> impl Iterator<Item = &String> {
        self.rooms.keys()
    }

    fn room(&self, room_id: &str) -> Result<&Room, RoomError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))
    }

    fn room_mut(&mut self, room_id: &str) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))
    }

    fn code_in_use(&self, code: &str) -> bool {
        self.rooms.values().any(|r| r.code == code)
    }

    /// Create a room hosted by `host_name`.
    pub fn create_room(
        &mut self,
        host_name: impl Into<String>,
        settings: GameSettings,
    ) -> Result<&Room, RoomError> {
        self.create_room_with_rng(host_name, settings, &mut rand::rng())
    }

    pub fn create_room_with_rng<R: Rng + ?Sized>(
        &mut self,
        host_name: impl Into<String>,
        settings: GameSettings,
        rng: &mut R,
    ) -> Result<&Room, RoomError> {
        settings.validate()?;

        let code = loop {
            let code = generate_room_code(rng);
            if !self.code_in_use(&code) {
                break code;
            }
        };

        let room = Room::new(host_name, code, settings);
        tracing::info!(room = %room.id, code = %room.code, host = %room.host_id, "room created");

        let room_id = room.id.clone();
        Ok(self.rooms.entry(room_id).or_insert(room))
    }

    /// Join a room by code. The new member is the room's
    /// [`newest_player`](Room::newest_player).
    pub fn join_room(&mut self, code: &str, player_name: impl Into<String>) -> Result<&Room, RoomError> {
        let room = self
            .rooms
            .values_mut()
            .find(|r| r.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;
        if room.is_full() {
            tracing::debug!(room = %room.id, "join rejected, room full");
            return Err(RoomError::Full);
        }

        let player = RoomPlayer::new(player_name, false);
        room.players.push(player.clone());
        let room_id = room.id.clone();
        tracing::info!(room = %room_id, player_id = %player.id, "player joined");

        self.notify(
            &room_id,
            RoomMessage::new(RoomMessageType::PlayerJoined, serde_json::json!(player))
                .from_player(player.id),
        );
        self.room(&room_id)
    }

    /// Leave a room.
    ///
    /// Before a game starts the member is removed; afterwards they stay on the
    /// roster as disconnected. Host passes to the next connected member. A room
    /// left with no members is removed.
    pub fn leave_room(&mut self, room_id: &str, player_id: &str) -> Result<(), RoomError> {
        let room = self.room_mut(room_id)?;
        let index = room
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| RoomError::NotMember(player_id.to_string()))?;

        if room.is_host(player_id) {
            room.transfer_host_from(player_id);
        }

        let left = if room.status == RoomStatus::Waiting {
            room.players.remove(index)
        } else {
            room.players[index].is_connected = false;
            room.players[index].clone()
        };
        let empty = room.players.is_empty();
        tracing::info!(room = room_id, player_id, "player left");

        self.notify(
            room_id,
            RoomMessage::new(RoomMessageType::PlayerLeft, serde_json::json!(left))
                .from_player(player_id),
        );

        if empty {
            self.remove_room(room_id);
        }
        Ok(())
    }

    /// Remove a room and its listeners.
    pub fn remove_room(&mut self, room_id: &str) -> Option<Room> {
        self.listeners.remove(room_id);
        let room = self.rooms.remove(room_id)?;
        tracing::info!(room = room_id, "room removed");
        Some(room)
    }

    /// Deal a new game to the room's members.
    pub fn start_game(&mut self, room_id: &str, secret_word: Option<&str>) -> Result<&Room, RoomError> {
        self.start_game_with_rng(room_id, secret_word, &mut rand::rng())
    }

    pub fn start_game_with_rng<R: Rng + ?Sized>(
        &mut self,
        room_id: &str,
        secret_word: Option<&str>,
        rng: &mut R,
    ) -> Result<&Room, RoomError> {
        let room = self.room_mut(room_id)?;
        if !room.can_start() {
            tracing::debug!(room = room_id, players = room.player_count(), "start rejected");
            return Err(RoomError::NotEnoughPlayers {
                have: room.player_count(),
                need: room.settings.min_players,
            });
        }

        let secret_word = match secret_word.filter(|w| !w.is_empty()) {
            Some(word) => word.to_string(),
            None => words::random_word_with_rng(None, rng).to_string(),
        };
        let game = GameState::deal(
            &*room,
            secret_word,
            room.settings.max_rounds,
            GameStatus::RoleReveal,
            rng,
        );
        let data = game.to_json();
        tracing::info!(room = room_id, game = %game.id(), imposters = game.imposters().count(), "game started");

        room.game_state = Some(game);
        room.sync_from_game();

        self.notify(room_id, RoomMessage::new(RoomMessageType::GameStarted, data));
        self.room(room_id)
    }

    /// Run a game transition, then sync the room to the game.
    fn with_game<T>(
        &mut self,
        room_id: &str,
        op: impl FnOnce(&mut GameState) -> Result<T, GameError>,
    ) -> Result<T, RoomError> {
        let room = self.room_mut(room_id)?;
        let game = room.game_state.as_mut().ok_or(RoomError::NoGame)?;
        let out = op(game).inspect_err(|e| {
            tracing::debug!(room = room_id, error = %e, "game action rejected");
        })?;
        room.sync_from_game();
        Ok(out)
    }

    /// Notify listeners of the game's new state: `game-ended` once a winner
    /// is decided, `game-update` otherwise.
    fn notify_game(&mut self, room_id: &str, player_id: Option<&str>) -> Result<&Room, RoomError> {
        let game = self.room(room_id)?.game().ok_or(RoomError::NoGame)?;
        let kind = if game.winner().is_some() {
            RoomMessageType::GameEnded
        } else {
            RoomMessageType::GameUpdate
        };
        let mut message = RoomMessage::new(kind, game.to_json());
        if let Some(player_id) = player_id {
            message = message.from_player(player_id);
        }
        self.notify(room_id, message);
        self.room(room_id)
    }

    /// Role reveal is over; start the first clue round.
    pub fn begin_play(&mut self, room_id: &str) -> Result<&Room, RoomError> {
        self.with_game(room_id, GameState::begin_play)?;
        self.notify_game(room_id, None)
    }

    pub fn add_clue(
        &mut self,
        room_id: &str,
        player_id: &str,
        text: impl Into<String>,
    ) -> Result<&Room, RoomError> {
        let clue = self.with_game(room_id, |g| g.add_clue(player_id, text).cloned())?;
        self.notify(
            room_id,
            RoomMessage::new(RoomMessageType::ClueSubmitted, serde_json::json!(clue))
                .from_player(player_id),
        );
        self.room(room_id)
    }

    pub fn start_voting(&mut self, room_id: &str) -> Result<&Room, RoomError> {
        self.with_game(room_id, GameState::start_voting)?;
        self.notify_game(room_id, None)
    }

    pub fn add_vote(&mut self, room_id: &str, voter_id: &str, target_id: &str) -> Result<&Room, RoomError> {
        let vote = self.with_game(room_id, |g| g.add_vote(voter_id, target_id).cloned())?;
        self.notify(
            room_id,
            RoomMessage::new(RoomMessageType::VoteCast, serde_json::json!(vote))
                .from_player(voter_id),
        );
        self.room(room_id)
    }

    pub fn eliminate_player(&mut self, room_id: &str, player_id: &str) -> Result<Option<Winner>, RoomError> {
        let winner = self.with_game(room_id, |g| g.eliminate_player(player_id))?;
        self.notify_game(room_id, None)?;
        Ok(winner)
    }

    /// Eliminate the most-voted player.
    pub fn resolve_voting(&mut self, room_id: &str) -> Result<Option<Winner>, RoomError> {
        let winner = self.with_game(room_id, GameState::resolve_voting)?;
        self.notify_game(room_id, None)?;
        Ok(winner)
    }

    /// An imposter guesses the secret word. Returns whether it was right.
    pub fn set_imposter_guess(
        &mut self,
        room_id: &str,
        player_id: &str,
        guess: impl Into<String>,
    ) -> Result<bool, RoomError> {
        let room = self.room(room_id)?;
        if !room.settings.allow_imposter_guess {
            return Err(GameError::GuessNotAllowed.into());
        }
        let game = room.game().ok_or(RoomError::NoGame)?;
        let guesser = game
            .get_player(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        if !guesser.is_imposter() {
            return Err(RoomError::NotImposter(player_id.to_string()));
        }

        let correct = self.with_game(room_id, |g| g.set_imposter_guess(guess))?;
        self.notify_game(room_id, Some(player_id))?;
        Ok(correct)
    }

    pub fn next_round(&mut self, room_id: &str) -> Result<u32, RoomError> {
        let round = self.with_game(room_id, GameState::next_round)?;
        self.notify_game(room_id, None)?;
        Ok(round)
    }

    /// Subscribe to a room's messages.
    pub fn subscribe(&mut self, room_id: &str, listener: impl RoomListener + 'static) -> Subscription {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.listeners
            .entry(room_id.to_string())
            .or_default()
            .push((id, Box::new(listener)));
        Subscription {
            room_id: room_id.to_string(),
            id,
        }
    }

    /// Subscribe with a channel; messages arrive on the returned receiver.
    pub fn subscribe_channel(
        &mut self,
        room_id: &str,
    ) -> (Subscription, std::sync::mpsc::Receiver<RoomMessage>) {
        let (listener, receiver) = ChannelListener::pair();
        (self.subscribe(room_id, listener), receiver)
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        let Some(listeners) = self.listeners.get_mut(&subscription.room_id) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.id);
        before != listeners.len()
    }

    /// Count listeners on a room.
    pub fn listener_count(&self, room_id: &str) -> usize {
        self.listeners.get(room_id).map_or(0, Vec::len)
    }

    fn notify(&mut self, room_id: &str, message: RoomMessage) {
        let Some(listeners) = self.listeners.get_mut(room_id) else {
            return;
        };
        tracing::trace!(room = room_id, kind = %message.kind, listeners = listeners.len(), "notify");
        for (_, listener) in listeners.iter_mut() {
            listener.on_message(&message);
        }
    }
}
