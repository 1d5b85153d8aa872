use std::sync::OnceLock;

use super::state::{Line, Move, Score};

/// Precomputed lookup tables for all possible 4-tile lines (16-bit packed).
///
/// Shifting or merging a row or column depends only on its 4 nibbles, and
/// there are 2^16 possible 16-bit values. We precompute the result of
/// collapsing each line in all four directions, plus the score gained by
/// the merges, so a move is eight table reads at runtime.
///
/// Layout:
/// - `shift_left/right[i]`: replacement 16-bit line after the move.
/// - `shift_up/down[i]`: replacement line pre-spread for recomposition
///   after a board transpose.
/// - `gain_left/right[i]`: score gained when the line collapses that way.
///   Up shares `gain_left` and Down shares `gain_right`, since a column
///   collapse scores like the matching row collapse.
///
/// Tables build lazily on first use via `stores()`; `engine::new()` simply
/// forces construction early.
pub(crate) struct Stores {
    pub(crate) shift_left: Box<[Line]>,
    pub(crate) shift_right: Box<[Line]>,
    pub(crate) shift_up: Box<[Line]>,
    pub(crate) shift_down: Box<[Line]>,
    pub(crate) gain_left: Box<[Score]>,
    pub(crate) gain_right: Box<[Score]>,
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Allocate on the heap to keep stack frames small during init.
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut gain_left = vec![0u64; LINE_TABLE_SIZE];
    let mut gain_right = vec![0u64; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as Line;
        let (left, left_gain) = super::ops::collapse_line(line, Move::Left);
        let (right, right_gain) = super::ops::collapse_line(line, Move::Right);
        shift_left[val] = left;
        shift_right[val] = right;
        shift_up[val] = super::ops::collapse_line(line, Move::Up).0;
        shift_down[val] = super::ops::collapse_line(line, Move::Down).0;
        gain_left[val] = left_gain;
        gain_right[val] = right_gain;
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        gain_left: gain_left.into_boxed_slice(),
        gain_right: gain_right.into_boxed_slice(),
    }
}

#[inline(always)]
pub(crate) fn get_entry(table: &[u64], idx: u16) -> u64 {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    unsafe { *table.get_unchecked(idx as usize) }
}
