//! Imposter State Library
//!
//! This crate provides state management for the Imposter word game: every
//! player but the imposters knows a secret word, players take turns giving
//! clues, then vote on who they think is bluffing.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Game State Machine** - One game through role reveal, clue rounds,
//!   voting, elimination, and the imposter's guess, with validated transitions.
//!
//! - **Local Games** - A single-device driver: a list of names, one imposter.
//!
//! - **Rooms** - Hosted games joined by a six-character code, with the
//!   imposter count scaled to the room size and listeners notified on change.
//!
//! # Design Principles
//!
//! 1. **Rejections never mutate** - Every operation returns a `Result`; an
//!    error leaves the game exactly as it was.
//!
//! 2. **One machine, many drivers** - Local games and rooms share `GameState`.
//!
//! 3. **No networking** - Listeners are the seam for a transport.
//!
//! 4. **Serialization-ready** - All types can be converted to JSON for clients.
//!
//! # Example
//!
//! ```rust
//! use imposter_state::state::{GameSettings, GameStatus, LocalGame, RoomRegistry, RoomStatus};
//!
//! let mut local = LocalGame::new();
//! let game = local.create_game(&["Alice", "Bob", "Cara"], Some("Pizza")).unwrap();
//! assert_eq!(game.status(), GameStatus::Playing);
//! assert_eq!(game.imposters().count(), 1);
//!
//! local.add_clue("player-0", "cheesy").unwrap();
//! local.start_voting().unwrap();
//!
//! let mut rooms = RoomRegistry::new();
//! let (room_id, code) = {
//!     let room = rooms.create_room("Alice", GameSettings::default()).unwrap();
//!     (room.id.clone(), room.code.clone())
//! };
//! rooms.join_room(&code, "Bob").unwrap();
//! rooms.join_room(&code, "Cara").unwrap();
//!
//! let room = rooms.start_game(&room_id, None).unwrap();
//! assert_eq!(room.status, RoomStatus::RoleReveal);
//! ```

pub mod state;

pub use state::*;
