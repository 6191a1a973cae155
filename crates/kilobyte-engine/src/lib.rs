//! Board rules for kilobyte, a 2048-style puzzle where tiles are byte sizes.
//!
//! The crate is split the way the page uses it:
//! - [`engine`] holds the 4x4 [`Board`] and its slide, merge and spawn rules.
//! - [`render`] maps cells to the colours and labels the page shows.
//! - [`dispatch`] turns key names into a full turn against a [`Game`].

pub mod dispatch;
pub mod engine;
pub mod render;

pub use dispatch::{Game, KEY_NAMES, Turn};
pub use engine::{Axis, Board, Cell, Direction, MergeMode};
pub use render::{cell_color, cell_label, render_board};
