//! Room change notifications.
//!
//! Every mutation of a room produces a [`RoomMessage`] that is handed to the
//! room's listeners, synchronously and in registration order, before the
//! mutating call returns. Listeners are the seam where a real transport would
//! plug in: a closure for in-process observers, or a [`ChannelListener`] to
//! push messages across a channel boundary.

use std::fmt;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};

/// Kinds of room message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomMessageType {
    PlayerJoined,
    PlayerLeft,
    GameUpdate,
    ClueSubmitted,
    VoteCast,
    GameStarted,
    GameEnded,
}

impl RoomMessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerJoined => "player-joined",
            Self::PlayerLeft => "player-left",
            Self::GameUpdate => "game-update",
            Self::ClueSubmitted => "clue-submitted",
            Self::VoteCast => "vote-cast",
            Self::GameStarted => "game-started",
            Self::GameEnded => "game-ended",
        }
    }
}

impl fmt::Display for RoomMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single room event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessage {
    #[serde(rename = "type")]
    pub kind: RoomMessageType,

    /// Event payload: the new player, clue, vote, or game snapshot
    pub data: serde_json::Value,

    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Player whose action caused the event
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub player_id: Option<String>,
}

impl RoomMessage {
    pub fn new(kind: RoomMessageType, data: serde_json::Value) -> Self {
        Self {
            kind,
            data,
            timestamp: chrono::Utc::now(),
            player_id: None,
        }
    }

    pub fn from_player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "type": self.kind.as_str(),
            "data": self.data,
            "timestamp": self.timestamp.to_rfc3339()
        });
        if let Some(player_id) = &self.player_id {
            obj["playerId"] = serde_json::json!(player_id);
        }
        obj
    }
}

/// Receives room messages.
pub trait RoomListener {
    fn on_message(&mut self, message: &RoomMessage);
}

impl<F> RoomListener for F
where
    F: FnMut(&RoomMessage),
{
    fn on_message(&mut self, message: &RoomMessage) {
        self(message)
    }
}

/// Forwards room messages onto a channel.
///
/// Messages sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::Sender<RoomMessage>,
}

impl ChannelListener {
    pub fn new(sender: mpsc::Sender<RoomMessage>) -> Self {
        Self { sender }
    }

    /// Create a listener and the receiving end of its channel.
    pub fn pair() -> (Self, mpsc::Receiver<RoomMessage>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }
}

impl RoomListener for ChannelListener {
    fn on_message(&mut self, message: &RoomMessage) {
        if self.sender.send(message.clone()).is_err() {
            tracing::trace!(kind = %message.kind, "room channel closed, message dropped");
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub(crate) room_id: String,
    pub(crate) id: u64,
}

impl Subscription {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }
}
