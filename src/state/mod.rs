//! State management module for Imposter.
//!
//! This module provides the core state types and drivers:
//!
//! - `game` - The game state machine shared by every driver
//! - `player` - Players, roles, and the rosters games are dealt from
//! - `settings` - Game configuration
//! - `words` - Secret word lists and random selection
//! - `local` - Single-device driver
//! - `room` - Hosted rooms joined by code
//! - `message` - Room notifications and listeners
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────────────┐
//! │      LocalGame       │        │             RoomRegistry             │
//! │                      │        │                                      │
//! │  settings, category  │        │  room_id →  Room ── players, code    │
//! │  names ──▶ Roster    │        │  room_id →  [RoomListener]           │
//! └──────────┬───────────┘        └──────────────────┬───────────────────┘
//!            │ deal (1 imposter)                     │ deal (scaled)
//!            ▼                                       ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             GameState                               │
//! │                                                                     │
//! │   Setup ──▶ RoleReveal ──▶ Playing ◀──▶ Voting ──▶ Finished         │
//! │                               ▲                       │             │
//! │                               └──── next_round ───────┘             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use imposter_state::state::{LocalGame, RoomRegistry, GameSettings};
//!
//! let mut local = LocalGame::new();
//! local.create_game(&["Alice", "Bob", "Cara"], Some("Pizza"))?;
//! local.add_clue("player-0", "cheesy")?;
//!
//! let mut rooms = RoomRegistry::new();
//! let code = rooms.create_room("Alice", GameSettings::default())?.code.clone();
//! rooms.join_room(&code, "Bob")?;
//! ```

pub mod game;
pub mod local;
pub mod message;
pub mod player;
pub mod room;
pub mod settings;
pub mod words;

// Re-export commonly used types
pub use game::{Clue, GameError, GameState, GameStatus, Vote, Winner};
pub use local::LocalGame;
pub use message::{ChannelListener, RoomListener, RoomMessage, RoomMessageType, Subscription};
pub use player::{Player, Role, Roster, Seat};
pub use room::{imposter_count, Room, RoomError, RoomPlayer, RoomRegistry, RoomStatus};
pub use settings::GameSettings;
pub use words::{random_word, Category, UnknownCategory};
