use super::state::{Board, BoardRaw, Line, Move, Score, Tile};
use super::tables::{get_entry, stores};

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: Board, direction: Move) -> Board {
    shift_scored(board, direction).0
}

/// Slide/merge tiles in the given direction and report the score gained
/// by the merges of this move.
pub fn shift_scored(board: Board, direction: Move) -> (Board, Score) {
    match direction {
        Move::Left | Move::Right => shift_rows(board, direction),
        Move::Up | Move::Down => shift_cols(board, direction),
    }
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Return the cell's actual value (0 if empty), e.g., 2, 4, 8, ...
pub fn tile_value(board: Board, idx: usize) -> u32 {
    let exp = (board.0 >> (60 - (4 * idx))) & 0xf;
    if exp == 0 {
        0
    } else {
        1 << exp
    }
}

pub(crate) fn line_to_vec(line: Line) -> Vec<Tile> {
    (0..4).fold(Vec::new(), |mut tiles, tile_idx| {
        tiles.push(line >> ((3 - tile_idx) * 4) & 0xf);
        tiles
    })
}

/// True if no shift in any direction changes the board. A caller that
/// tracks per-direction outcomes instead should use
/// [`crate::game::GameState::is_game_over`].
pub fn is_stuck(board: Board) -> bool {
    Move::ALL.iter().all(|&direction| shift(board, direction) == board)
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the number of zero tiles.
pub fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

/// The highest tile value present, or 0 for an empty board.
pub fn highest_tile(board: Board) -> u32 {
    match board.tiles().max() {
        None | Some(0) => 0,
        Some(exp) => 1 << exp,
    }
}

fn shift_rows(board: Board, direction: Move) -> (Board, Score) {
    let s = stores();
    let (table, gains): (&[Line], &[Score]) = match direction {
        Move::Left => (&s.shift_left[..], &s.gain_left[..]),
        Move::Right => (&s.shift_right[..], &s.gain_right[..]),
        _ => panic!("Trying to move up or down in shift rows"),
    };
    let mut raw: BoardRaw = 0;
    let mut gain: Score = 0;
    for row_idx in 0..4u64 {
        let row_val = extract_line(board.0, row_idx) as u16;
        raw |= get_entry(table, row_val) << (48 - (16 * row_idx));
        gain += get_entry(gains, row_val);
    }
    (Board(raw), gain)
}

fn shift_cols(board: Board, direction: Move) -> (Board, Score) {
    let transpose_board = transpose(board.0);
    let s = stores();
    // Column merges score the same as the matching row collapse, so the
    // gain tables are shared between Up/Left and Down/Right.
    let (table, gains): (&[Line], &[Score]) = match direction {
        Move::Up => (&s.shift_up[..], &s.gain_left[..]),
        Move::Down => (&s.shift_down[..], &s.gain_right[..]),
        _ => panic!("Trying to move left or right in shift cols"),
    };
    let mut raw: BoardRaw = 0;
    let mut gain: Score = 0;
    for col_idx in 0..4u64 {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        raw |= get_entry(table, col_val) << (12 - (4 * col_idx));
        gain += get_entry(gains, col_val);
    }
    (Board(raw), gain)
}

/// Collapse one packed line in `direction`, returning the replacement
/// line (row-packed for Left/Right, column-spread for Up/Down) and the
/// score gained. Only used to build the lookup tables.
pub(crate) fn collapse_line(line: Line, direction: Move) -> (Line, Score) {
    let tiles = line_to_vec(line);
    let (tiles, gain) = match direction {
        Move::Left | Move::Up => collapse_vec(tiles),
        Move::Right | Move::Down => {
            let rev: Vec<Tile> = tiles.into_iter().rev().collect();
            let (rev, gain) = collapse_vec(rev);
            (rev.into_iter().rev().collect(), gain)
        }
    };
    let packed = match direction {
        Move::Left | Move::Right => vec_to_row(&tiles),
        Move::Up | Move::Down => vec_to_col(&tiles),
    };
    (packed, gain)
}

fn vec_to_row(tiles: &[Tile]) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn vec_to_col(tiles: &[Tile]) -> Line {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

/// Collapse a 4-tile line of exponents toward index 0.
///
/// One scan from the far side toward the edge: a tile slides a single
/// step into an empty neighbor, or merges with an equal neighbor. A
/// freshly merged cell sits out the rest of the pass, so no tile merges
/// twice in one move. Gap compaction then runs to a fixpoint.
pub(crate) fn collapse_vec(mut tiles: Vec<Tile>) -> (Vec<Tile>, Score) {
    let mut gain: Score = 0;
    let mut i = 3;
    while i > 0 {
        let mut merged = false;
        if tiles[i] != 0 {
            if tiles[i - 1] == 0 {
                tiles.swap(i - 1, i);
            } else if tiles[i - 1] == tiles[i] && tiles[i] < 0xf {
                // Equal neighbors merge; exponent 15 is the nibble cap.
                tiles[i - 1] += 1;
                tiles[i] = 0;
                gain += 1 << tiles[i - 1];
                merged = true;
            }
        }
        i -= 1;
        if merged && i > 0 {
            i -= 1;
        }
    }
    compact_vec(&mut tiles);
    (tiles, gain)
}

/// Shift non-empty tiles over zero gaps toward index 0 until no gap
/// remains. Idempotent: re-running on a compacted line is a no-op.
pub(crate) fn compact_vec(tiles: &mut [Tile]) {
    loop {
        let mut moved = false;
        for i in 0..3 {
            if tiles[i] == 0 && tiles[i + 1] != 0 {
                tiles.swap(i, i + 1);
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}
