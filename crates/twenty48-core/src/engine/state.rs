use rand::Rng;
use std::fmt;

use super::ops;
use serde::{Deserialize, Serialize};

// Internal type aliases for packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
pub(crate) type Tile = u64;

/// Score values and per-move score deltas.
pub type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in declaration order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Stable index in `0..4`, usable as an array key.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        write!(f, "{name}")
    }
}

/// Packed 4x4 board as 16 4-bit exponent nibbles in a `u64`.
///
/// Nibbles run row-major from the most significant end: linear index `i`
/// addresses row `i / 4`, column `i % 4`. A nibble of 0 is an empty cell;
/// a nibble `e` is the tile value `2^e`. Public methods speak in actual
/// tile values while preserving an escape hatch to the raw packed
/// representation for advanced use.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Return the board resulting from sliding/merging tiles in `dir`
    /// (no random insert).
    ///
    /// Example
    /// ```
    /// use twenty48_core::engine::{Board, Move};
    /// let b = Board::EMPTY;
    /// assert_eq!(b.shift(Move::Left), Board::EMPTY);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        ops::shift(self, dir)
    }

    /// Like [`Board::shift`], but also reports the score gained by the
    /// merges of this move.
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Move};
    /// // Row [2, 2, 0, 0]; merging leftward makes a 4 worth 4 points.
    /// let b = Board::from_raw(0x1100_0000_0000_0000);
    /// let (shifted, gain) = b.shift_scored(Move::Left);
    /// assert_eq!(shifted, Board::from_raw(0x2000_0000_0000_0000));
    /// assert_eq!(gain, 4);
    /// ```
    #[inline]
    pub fn shift_scored(self, dir: Move) -> (Self, Score) {
        ops::shift_scored(self, dir)
    }

    /// Place `value` (a power of two) into the empty cell at linear
    /// index `idx`.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::EMPTY.with_tile(5, 4);
    /// assert_eq!(b.tile_value(5), 4);
    /// ```
    #[inline]
    pub fn with_tile(self, idx: usize, value: u32) -> Self {
        debug_assert!(idx < 16);
        debug_assert!(value.is_power_of_two());
        debug_assert_eq!(self.tile_value(idx), 0, "cell {idx} is occupied");
        let exp = value.trailing_zeros() as Tile;
        Board(self.0 | (exp << (60 - 4 * idx)))
    }

    /// Insert a 2 (with probability `spawn_rate`) or a 4 into a uniformly
    /// chosen empty cell, using the provided RNG. Returns the new board and
    /// the position and value spawned, or `None` when the board is full.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let (b, idx, value) = Board::EMPTY.with_random_tile(&mut rng, 0.9).unwrap();
    /// assert!(idx < 16);
    /// assert!(value == 2 || value == 4);
    /// assert_eq!(b.count_empty(), 15);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        spawn_rate: f64,
    ) -> Option<(Self, usize, u32)> {
        let open: Vec<usize> = self.empty_positions().collect();
        if open.is_empty() {
            return None;
        }
        let idx = open[rng.gen_range(0..open.len())];
        let value = if rng.gen::<f64>() > spawn_rate { 4 } else { 2 };
        Some((self.with_tile(idx, value), idx, value))
    }

    /// Linear indices of the empty cells, in row-major order.
    #[inline]
    pub fn empty_positions(self) -> impl Iterator<Item = usize> {
        self.tiles()
            .enumerate()
            .filter(|&(_, exp)| exp == 0)
            .map(|(idx, _)| idx)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        ops::count_empty(self)
    }

    /// True when no cell is empty. A full board can still have legal merges.
    #[inline]
    pub fn is_full(self) -> bool {
        ops::count_empty(self) == 0
    }

    /// True when no shift in any direction changes the board.
    #[inline]
    pub fn is_stuck(self) -> bool {
        ops::is_stuck(self)
    }

    /// The highest tile value present, or 0 for an empty board.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::highest_tile(self)
    }

    /// The actual value at linear index `idx` in `0..16` (0 if empty).
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        ops::tile_value(self, idx)
    }

    /// The actual value at `(row, col)`, both in `0..4` (0 if empty).
    #[inline]
    pub fn value_at(self, row: usize, col: usize) -> u32 {
        debug_assert!(row < 4 && col < 4);
        ops::tile_value(self, row * 4 + col)
    }

    /// Iterate over tile exponents (nibbles) in row-major order.
    /// Returns 0 for empty, 1 for 2, 2 for 4, etc.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter { raw: self.0, idx: 0 }
    }

    /// Convenience: collect tile exponents into a `Vec<u8>`.
    #[inline]
    pub fn to_vec(self) -> Vec<u8> {
        self.tiles().collect()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            for col in 0..4 {
                match self.value_at(row, col) {
                    0 => write!(f, "{:>6}", ".")?,
                    val => write!(f, "{val:>6}")?,
                }
            }
            if row < 3 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}
impl From<Board> for BoardRaw {
    fn from(b: Board) -> Self {
        b.into_raw()
    }
}

/// Iterator over board tiles (exponents) in row-major order.
pub struct TilesIter {
    raw: BoardRaw,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = u8;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= 16 {
            return None;
        }
        let n = ((self.raw >> (60 - (4 * self.idx))) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

impl IntoIterator for &Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn it_places_tiles_by_linear_index() {
        let board = Board::EMPTY.with_tile(0, 2).with_tile(7, 4).with_tile(15, 8);
        assert_eq!(board.tile_value(0), 2);
        assert_eq!(board.value_at(1, 3), 4);
        assert_eq!(board.value_at(3, 3), 8);
        assert_eq!(board.count_empty(), 13);
    }

    #[test]
    fn it_lists_empty_positions_row_major() {
        let board = Board::from_raw(0x1111_0000_1111_0000);
        let open: Vec<usize> = board.empty_positions().collect();
        assert_eq!(open, vec![4, 5, 6, 7, 12, 13, 14, 15]);
    }

    #[test]
    fn it_fills_the_board_one_random_tile_at_a_time() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut board = Board::EMPTY;
        for placed in 1..=16 {
            let (next, idx, value) = board.with_random_tile(&mut rng, 0.9).unwrap();
            assert_eq!(board.tile_value(idx), 0);
            assert!(value == 2 || value == 4);
            assert_eq!(next.count_empty(), 16 - placed);
            board = next;
        }
        assert!(board.with_random_tile(&mut rng, 0.9).is_none());
    }

    #[test]
    fn it_reports_the_highest_tile() {
        assert_eq!(Board::EMPTY.highest_tile(), 0);
        let board = Board::from_raw(0x0123_0000_0000_c000);
        assert_eq!(board.highest_tile(), 4096);
    }
}
