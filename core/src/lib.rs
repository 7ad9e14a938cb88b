#![no_std]

extern crate alloc;

pub use card::*;
pub use engine::*;
pub use error::*;
pub use persist::*;
pub use random::*;
pub use sanitize::*;
pub use state::*;

mod card;
mod engine;
mod error;
mod persist;
mod random;
mod sanitize;
mod state;

/// Copies of each card kind in a fresh deck.
pub const COPIES_PER_KIND: usize = 4;

/// Cards dealt to each side at the start of a session.
pub const HAND_SIZE: usize = 6;

pub const DECK_SIZE: usize = COPIES_PER_KIND * Card::ALL.len();

/// Longest player name kept in the game state.
pub const MAX_NAME_LEN: usize = 15;

/// Longest player name kept in a history entry.
pub const MAX_HISTORY_NAME_LEN: usize = 40;

pub const DEFAULT_PLAYER_NAME: &str = "Jugador";

/// Name the computer opponent goes by; players may not take it.
pub const RESERVED_NAME: &str = "cpu";

const _: () = assert!(DECK_SIZE == 2 * HAND_SIZE);
