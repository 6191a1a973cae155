//! Tile colours and labels used by the page.

use crate::engine::{Board, Cell};

/// Background colour for exponents 1 through 7.
const PALETTE: [&str; 7] = [
    "#eee4da", "#ede0c8", "#f2b179", "#f59563", "#f67c5f", "#f65e3b", "#edcf72",
];

const DEFAULT_COLOR: &str = "white";

/// Background colour of a cell; empty and unlisted exponents are white.
pub fn cell_color(cell: Cell) -> &'static str {
    match cell {
        Some(exp @ 1..=7) => PALETTE[usize::from(exp) - 1],
        _ => DEFAULT_COLOR,
    }
}

/// Text shown in a cell, in bytes.
///
/// ```
/// use kilobyte_engine::render::cell_label;
/// assert_eq!(cell_label(None), "");
/// assert_eq!(cell_label(Some(3)), "8B");
/// assert_eq!(cell_label(Some(9)), "Bootloader");
/// assert_eq!(cell_label(Some(10)), "1KB");
/// ```
pub fn cell_label(cell: Cell) -> String {
    match cell {
        None => String::new(),
        Some(9) => "Bootloader".to_string(),
        Some(10) => "1KB".to_string(),
        Some(exp) => match 2_u128.checked_pow(u32::from(exp)) {
            Some(bytes) => format!("{bytes}B"),
            None => format!("2^{exp}B"),
        },
    }
}

/// The board as the page's `<tr>` rows.
pub fn render_board(board: &Board) -> String {
    board.to_table(cell_color, cell_label)
}
