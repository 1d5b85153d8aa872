//! Core rules of a 4x4 sliding-tile merge puzzle.
//!
//! The crate owns the grid, the score, the spawn randomness, and terminal
//! detection; it performs no I/O and draws nothing. A presentation layer
//! submits a [`Move`], inspects the returned [`MoveOutcome`], and reads the
//! resulting grid and score back out.
//!
//! ```
//! use twenty48_core::{GameState, Move};
//!
//! let mut game = GameState::with_seed(42);
//! let outcome = game.make_move(Move::Left);
//! println!("{outcome:?}, score is now {}", game.score());
//! ```

pub mod config;
pub mod engine;
pub mod game;

pub use config::Config;
pub use engine::{Board, Move};
pub use game::{GameState, MoveFailure, MoveOutcome, SpawnOutcome};
