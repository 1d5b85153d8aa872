//! Game layer: one board plus score, spawn randomness, and the
//! per-direction outcome record that drives terminal detection.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::state::Score;
use crate::engine::{Board, Move};

/// Result of a [`GameState::make_move`] call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Tiles slid or merged; the score grew by `score_delta` and one tile
    /// was spawned. `oversized` carries the highest tile value when it
    /// exceeds the configured ceiling and the caller has no display
    /// mapping for it; the game stays playable.
    Moved {
        score_delta: Score,
        oversized: Option<u32>,
    },
    /// Nothing changed, but empty cells remain: the direction was illegal
    /// and the caller should give non-fatal feedback. State is untouched.
    Rejected,
    /// Nothing changed and no cell is empty. The game is over once every
    /// direction's most recent outcome is this one.
    BoardFull,
}

/// Result of a [`GameState::spawn`] call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// A tile of `value` (2 or 4) appeared at linear index `index`.
    Spawned { index: usize, value: u32 },
    /// No empty cell was available.
    BoardFull,
}

/// The non-success move outcomes, as remembered per direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoveFailure {
    Rejected,
    BoardFull,
}

/// A full game: board, score, RNG, and the most recent failure recorded
/// for each direction.
///
/// The failure record exists only for terminal detection: the game is
/// over when all four directions most recently came back
/// [`MoveOutcome::BoardFull`]. A rejected move is not enough — a full
/// board can still have legal merges along another direction. Any
/// successful move clears the record.
///
/// All operations are synchronous and touch nothing outside this value;
/// a concurrent caller must serialize access to one instance. The RNG is
/// owned per instance, so differently seeded games are independent and
/// tests can run in parallel.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    score: Score,
    blocked: [Option<MoveFailure>; 4],
    rng: StdRng,
    config: Config,
}

impl GameState {
    /// Start a game under `config`: empty grid, score 0, then one spawned
    /// tile. The RNG comes from `config.seed`, or entropy when unset.
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut game = Self {
            board: Board::EMPTY,
            score: 0,
            blocked: [None; 4],
            rng,
            config,
        };
        game.reset();
        game
    }

    /// Start a deterministic game with default rules and a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Config {
            seed: Some(seed),
            ..Config::default()
        })
    }

    /// Slide and merge tiles toward `direction`.
    ///
    /// On success the score grows by the summed values of the merged
    /// tiles, one tile spawns into a freed cell, and the per-direction
    /// failure record is cleared. On failure nothing changes and the
    /// failure kind is recorded for this direction.
    pub fn make_move(&mut self, direction: Move) -> MoveOutcome {
        let (shifted, gain) = self.board.shift_scored(direction);
        if shifted != self.board {
            self.board = shifted;
            self.score += gain;
            self.blocked = [None; 4];
            if let SpawnOutcome::BoardFull = self.spawn() {
                // A move that changed the grid cannot leave it full.
                debug_assert!(false, "no free cell after a move that changed the grid");
                log::error!("no free cell after a move that changed the grid");
            }
            let oversized = self.oversized_tile();
            if let Some(value) = oversized {
                log::warn!(
                    "tile {value} exceeds the configured ceiling {}",
                    self.config.max_tile
                );
            }
            log::debug!("moved {direction}, +{gain}:\n{}", self.board);
            MoveOutcome::Moved {
                score_delta: gain,
                oversized,
            }
        } else if !self.board.is_full() {
            self.blocked[direction.index()] = Some(MoveFailure::Rejected);
            MoveOutcome::Rejected
        } else {
            self.blocked[direction.index()] = Some(MoveFailure::BoardFull);
            MoveOutcome::BoardFull
        }
    }

    /// Place a new tile into a uniformly chosen empty cell: a 2 with the
    /// configured spawn rate, a 4 otherwise.
    pub fn spawn(&mut self) -> SpawnOutcome {
        let spawn_rate = self.config.spawn_rate_or_default();
        match self.board.with_random_tile(&mut self.rng, spawn_rate) {
            Some((board, index, value)) => {
                self.board = board;
                SpawnOutcome::Spawned { index, value }
            }
            None => SpawnOutcome::BoardFull,
        }
    }

    /// Return to the start-of-game state: empty grid, score 0, cleared
    /// failure record, then one spawned tile.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.blocked = [None; 4];
        let outcome = self.spawn();
        debug_assert!(
            matches!(outcome, SpawnOutcome::Spawned { .. }),
            "a cleared grid always has room for the first tile"
        );
    }

    /// True once every direction's most recent outcome is
    /// [`MoveOutcome::BoardFull`].
    pub fn is_game_over(&self) -> bool {
        self.blocked
            .iter()
            .all(|failure| matches!(failure, Some(MoveFailure::BoardFull)))
    }

    /// The most recent failure recorded for `direction`, if any since the
    /// last successful move.
    pub fn last_failure(&self, direction: Move) -> Option<MoveFailure> {
        self.blocked[direction.index()]
    }

    /// The highest tile value when it exceeds the configured ceiling.
    pub fn oversized_tile(&self) -> Option<u32> {
        let highest = self.board.highest_tile();
        (highest > self.config.max_tile).then_some(highest)
    }

    /// The current board.
    pub fn board(&self) -> Board {
        self.board
    }

    /// The current score. Never decreases over the life of a game.
    pub fn score(&self) -> Score {
        self.score
    }

    /// The value at linear index `idx` in `0..16` (0 if empty).
    pub fn tile_value(&self, idx: usize) -> u32 {
        self.board.tile_value(idx)
    }

    /// The value at `(row, col)`, both in `0..4` (0 if empty).
    pub fn value_at(&self, row: usize, col: usize) -> u32 {
        self.board.value_at(row, col)
    }

    /// The highest tile value present, or 0 for an empty board.
    pub fn highest_tile(&self) -> u32 {
        self.board.highest_tile()
    }

    /// The rules this game runs under.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full board with no equal neighbors in any direction.
    const STUCK: u64 = 0x1212212112122121;

    fn seeded(board_raw: u64, seed: u64) -> GameState {
        let mut game = GameState::with_seed(seed);
        game.board = Board::from_raw(board_raw);
        game
    }

    #[test]
    fn it_starts_with_one_tile_and_no_score() {
        let game = GameState::with_seed(1);
        assert_eq!(game.board().count_empty(), 15);
        assert_eq!(game.score(), 0);
        assert!(!game.is_game_over());
        let spawned = game.board().highest_tile();
        assert!(spawned == 2 || spawned == 4);
    }

    #[test]
    fn it_merges_a_pair_and_spawns_once() {
        // Grid [[2,2,0,0], [0,0,0,0], [0,0,0,0], [0,0,0,0]].
        let mut game = seeded(0x1100_0000_0000_0000, 5);
        let outcome = game.make_move(Move::Left);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                score_delta: 4,
                oversized: None
            }
        );
        assert_eq!(game.score(), 4);
        assert_eq!(game.tile_value(0), 4);
        // The merged 4 plus exactly one spawned tile.
        assert_eq!(game.board().count_empty(), 14);
    }

    #[test]
    fn it_rejects_an_immobile_direction_without_touching_state() {
        // Row [2, 4, 0, 0] cannot move further left, but the grid is open.
        let mut game = seeded(0x1200_0000_0000_0000, 5);
        let before = game.board();
        assert_eq!(game.make_move(Move::Left), MoveOutcome::Rejected);
        assert_eq!(game.board(), before);
        assert_eq!(game.score(), 0);
        assert_eq!(game.last_failure(Move::Left), Some(MoveFailure::Rejected));
        assert!(!game.is_game_over());
    }

    #[test]
    fn it_is_game_over_only_after_board_full_in_all_four_directions() {
        let mut game = seeded(STUCK, 5);
        for (attempted, direction) in Move::ALL.into_iter().enumerate() {
            assert!(!game.is_game_over(), "over after {attempted} directions");
            assert_eq!(game.make_move(direction), MoveOutcome::BoardFull);
            assert_eq!(game.last_failure(direction), Some(MoveFailure::BoardFull));
        }
        assert!(game.is_game_over());
        assert_eq!(game.board(), Board::from_raw(STUCK));
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn it_reports_board_full_per_direction_while_a_merge_remains() {
        // Full board; every row is immobile leftward, but each column
        // still holds a vertical pair.
        let mut game = seeded(0x1234_1234_2345_5123, 5);
        assert_eq!(game.make_move(Move::Left), MoveOutcome::BoardFull);
        assert!(!game.is_game_over());

        let outcome = game.make_move(Move::Up);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                score_delta: 60,
                oversized: None
            }
        );
        // The successful move cleared the failure record.
        assert_eq!(game.last_failure(Move::Left), None);
        assert_eq!(game.board().count_empty(), 3);
    }

    #[test]
    fn it_flags_merges_beyond_the_display_ceiling() {
        // Two ceiling tiles side by side: [4096, 4096, 0, 0].
        let mut game = seeded(0xcc00_0000_0000_0000, 5);
        let outcome = game.make_move(Move::Left);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                score_delta: 8192,
                oversized: Some(8192)
            }
        );
        assert_eq!(game.oversized_tile(), Some(8192));
        // The oversized tile is a warning, not an error: play continues.
        assert_eq!(game.score(), 8192);
    }

    #[test]
    fn it_spawns_exactly_one_tile_into_an_empty_cell() {
        let mut game = GameState::with_seed(11);
        let before = game.board().to_vec();
        match game.spawn() {
            SpawnOutcome::Spawned { index, value } => {
                assert_eq!(before[index], 0);
                assert!(value == 2 || value == 4);
                let after = game.board().to_vec();
                for (idx, (&old, &new)) in before.iter().zip(after.iter()).enumerate() {
                    if idx == index {
                        assert_eq!(u32::from(new), value.trailing_zeros());
                    } else {
                        assert_eq!(old, new);
                    }
                }
            }
            SpawnOutcome::BoardFull => panic!("fresh board reported as full"),
        }
    }

    #[test]
    fn it_fails_to_spawn_on_a_full_board() {
        let mut game = seeded(STUCK, 5);
        assert_eq!(game.spawn(), SpawnOutcome::BoardFull);
    }

    #[test]
    fn it_replays_identically_under_a_fixed_seed() {
        let moves = [
            Move::Left,
            Move::Up,
            Move::Right,
            Move::Down,
            Move::Left,
            Move::Down,
            Move::Right,
            Move::Up,
        ];
        let mut first = GameState::with_seed(7);
        let mut second = GameState::with_seed(7);
        assert_eq!(first.board(), second.board());
        for direction in moves {
            assert_eq!(first.make_move(direction), second.make_move(direction));
            assert_eq!(first.board(), second.board());
            assert_eq!(first.score(), second.score());
        }
    }

    #[test]
    fn it_never_decreases_the_score() {
        let mut game = GameState::with_seed(3);
        let mut last = game.score();
        for turn in 0..200 {
            game.make_move(Move::ALL[turn % 4]);
            assert!(game.score() >= last);
            last = game.score();
        }
    }

    #[test]
    fn it_resets_to_the_start_of_game_state() {
        let mut game = seeded(STUCK, 5);
        game.score = 420;
        game.make_move(Move::Left);
        assert_eq!(game.last_failure(Move::Left), Some(MoveFailure::BoardFull));

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.board().count_empty(), 15);
        assert_eq!(game.last_failure(Move::Left), None);
        assert!(!game.is_game_over());
    }
}
