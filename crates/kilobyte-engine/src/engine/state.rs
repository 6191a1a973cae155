use rand::Rng;
use std::fmt;

use super::ops;
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const SIZE: usize = 4;
/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;

/// Tile exponent; the tile is worth `2^exponent` bytes.
pub type Tile = u8;
/// A board cell: empty, or a tile exponent (always >= 1).
pub type Cell = Option<Tile>;

/// A direction to slide tiles toward.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Rows for Left/Right, columns for Up/Down.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Row,
            Direction::Up | Direction::Down => Axis::Column,
        }
    }

    /// True when tiles gather at position 0 of each line (Left, Up).
    #[inline]
    pub(crate) fn toward_start(self) -> bool {
        matches!(self, Direction::Left | Direction::Up)
    }
}

/// Orientation of the lines an operation walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// How the merge sweep treats the boundary between two lines.
///
/// `Wrapping` walks all 16 cells as one sequence, so the last cell of a line is
/// paired with the first cell of the next one. This is how the game has always
/// played. `WithinLine` never pairs cells from different lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    #[default]
    Wrapping,
    WithinLine,
}

/// The 4x4 kilobyte board, rows of optional exponents.
///
/// Every operation mutates the board in place; the grid is a fixed-size array
/// so it can never be observed ragged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) [[Cell; SIZE]; SIZE]);

impl Board {
    /// A constant empty board.
    pub const EMPTY: Board = Board([[None; SIZE]; SIZE]);

    /// Construct a `Board` from row-major rows.
    ///
    /// ```
    /// use kilobyte_engine::engine::Board;
    /// let b = Board::from_rows([
    ///     [Some(1), None, None, None],
    ///     [None; 4],
    ///     [None; 4],
    ///     [None, None, None, Some(1)],
    /// ]);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn from_rows(rows: [[Cell; SIZE]; SIZE]) -> Self {
        Board(rows)
    }

    /// Copy of the rows.
    #[inline]
    pub fn rows(&self) -> [[Cell; SIZE]; SIZE] {
        self.0
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.0[row][col]
    }

    /// Overwrite one cell. Exponents start at 1; `Some(0)` is not a tile.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        debug_assert!(cell != Some(0), "exponent 0 at ({row}, {col})");
        self.0[row][col] = cell;
    }

    /// Slide every tile toward the edge named by `direction` without merging.
    ///
    /// The compaction is stable: tiles keep their order along the line and the
    /// vacated cells end up on the far side.
    ///
    /// ```
    /// use kilobyte_engine::engine::{Board, Direction};
    /// let mut b = Board::from_rows([
    ///     [None, Some(2), None, Some(1)],
    ///     [None; 4],
    ///     [None; 4],
    ///     [None; 4],
    /// ]);
    /// b.shift(Direction::Left);
    /// assert_eq!(b.rows()[0], [Some(2), Some(1), None, None]);
    /// ```
    pub fn shift(&mut self, direction: Direction) {
        ops::shift(self, direction);
    }

    /// Merge sweep over the board in row-major order.
    pub fn horizontal_combine_numbers(&mut self) {
        ops::combine(self, Axis::Row, MergeMode::Wrapping);
    }

    /// Merge sweep over the board in column-major order.
    pub fn vertical_combine_numbers(&mut self) {
        ops::combine(self, Axis::Column, MergeMode::Wrapping);
    }

    /// Merge sweep along `axis`.
    ///
    /// Walks adjacent pairs once, front to back. When both cells of a pair are
    /// equal the earlier one is incremented and the later one cleared; a pair of
    /// empties is a no-op. `mode` decides whether pairs straddle two lines.
    pub fn combine(&mut self, axis: Axis, mode: MergeMode) {
        ops::combine(self, axis, mode);
    }

    /// Put an exponent-1 tile on a uniformly chosen empty cell.
    ///
    /// Returns the `(row, col)` filled, or `None` if the board is full, in
    /// which case nothing changes.
    ///
    /// ```
    /// use kilobyte_engine::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut b = Board::EMPTY;
    /// let (row, col) = b.insert2(&mut rng).unwrap();
    /// assert_eq!(b.cell(row, col), Some(1));
    /// ```
    pub fn insert2<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, usize)> {
        use rand::seq::SliceRandom;

        let empty = ops::empty_cells(self);
        let &(row, col) = empty.choose(rng)?;
        self.0[row][col] = Some(1);
        Some((row, col))
    }

    /// Render the board as HTML table rows.
    ///
    /// Each cell becomes `<td style="background-color: {color}">{label}</td>`;
    /// `color` and `label` are given the raw cell.
    pub fn to_table<C, L, CS, LS>(&self, color: C, label: L) -> String
    where
        C: Fn(Cell) -> CS,
        L: Fn(Cell) -> LS,
        CS: fmt::Display,
        LS: fmt::Display,
    {
        let mut out = String::new();
        for row in &self.0 {
            out.push_str("<tr>");
            for &cell in row {
                out.push_str(&format!(
                    "<td style=\"background-color: {}\">{}</td>",
                    color(cell),
                    label(cell)
                ));
            }
            out.push_str("</tr>");
        }
        out
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize {
        ops::count_empty(self)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count_empty() == 0
    }

    /// Iterate over cells in row-major order.
    #[inline]
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().flatten().copied()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Board").field(&self.0).finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{}", "-".repeat(SIZE * 11 - 1))?;
            }
            let labels: Vec<String> = row
                .iter()
                .map(|&cell| format!("{:^10}", crate::render::cell_label(cell)))
                .collect();
            writeln!(f, "{}", labels.join("|"))?;
        }
        Ok(())
    }
}
