use super::state::{Axis, Board, CELLS, Cell, Direction, MergeMode, SIZE};

/// Board coordinates of position `pos` within line `line` along `axis`.
#[inline]
pub(crate) fn coords(axis: Axis, line: usize, pos: usize) -> (usize, usize) {
    match axis {
        Axis::Row => (line, pos),
        Axis::Column => (pos, line),
    }
}

pub(crate) fn extract_line(board: &Board, axis: Axis, line: usize) -> [Cell; SIZE] {
    std::array::from_fn(|pos| {
        let (row, col) = coords(axis, line, pos);
        board.0[row][col]
    })
}

pub(crate) fn store_line(board: &mut Board, axis: Axis, line: usize, cells: [Cell; SIZE]) {
    for (pos, cell) in cells.into_iter().enumerate() {
        let (row, col) = coords(axis, line, pos);
        board.0[row][col] = cell;
    }
}

/// Slide tiles along every line of `direction`'s axis. No merging.
pub(crate) fn shift(board: &mut Board, direction: Direction) {
    let axis = direction.axis();
    for line in 0..SIZE {
        let cells = extract_line(board, axis, line);
        store_line(board, axis, line, compact_line(cells, direction.toward_start()));
    }
}

/// Stable compaction of one line: tiles gather at position 0 when
/// `toward_start`, at the last position otherwise.
pub fn compact_line(line: [Cell; SIZE], toward_start: bool) -> [Cell; SIZE] {
    if toward_start {
        compact_start(line)
    } else {
        compact_end(line)
    }
}

fn compact_start(line: [Cell; SIZE]) -> [Cell; SIZE] {
    let mut out = [None; SIZE];
    for (slot, tile) in out.iter_mut().zip(line.into_iter().flatten()) {
        *slot = Some(tile);
    }
    out
}

fn compact_end(mut line: [Cell; SIZE]) -> [Cell; SIZE] {
    line.reverse();
    let mut out = compact_start(line);
    out.reverse();
    out
}

/// One pass over adjacent pairs of the `axis`-major cell order.
pub(crate) fn combine(board: &mut Board, axis: Axis, mode: MergeMode) {
    for idx in 0..CELLS - 1 {
        let next = idx + 1;
        if mode == MergeMode::WithinLine && next % SIZE == 0 {
            continue;
        }
        let (r0, c0) = sweep_coords(axis, idx);
        let (r1, c1) = sweep_coords(axis, next);
        let here = board.0[r0][c0];
        if here == board.0[r1][c1] {
            board.0[r0][c0] = here.map(|exp| exp.saturating_add(1));
            board.0[r1][c1] = None;
        }
    }
}

#[inline]
fn sweep_coords(axis: Axis, idx: usize) -> (usize, usize) {
    coords(axis, idx / SIZE, idx % SIZE)
}

/// Empty cells in row-major order.
pub fn empty_cells(board: &Board) -> Vec<(usize, usize)> {
    (0..CELLS)
        .map(|idx| (idx / SIZE, idx % SIZE))
        .filter(|&(row, col)| board.0[row][col].is_none())
        .collect()
}

/// Count the number of empty cells.
pub fn count_empty(board: &Board) -> usize {
    board.cells().filter(Option::is_none).count()
}
