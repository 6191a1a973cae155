//! Engine module: the 4x4 kilobyte board and its slide/merge/spawn rules.
//!
//! - `Board` is the 4x4 grid of optional exponents with in-place operations.
//! - `Direction` and `Axis` describe which lines an operation walks.
//! - Line plumbing (read/write a row or column, compaction, the merge sweep)
//!   lives in `ops` so every direction shares one routine.

mod ops;
pub mod state;

pub use state::{Axis, Board, CELLS, Cell, Direction, MergeMode, SIZE, Tile};

pub use ops::{compact_line, count_empty, empty_cells};
