//! Playfield grid, line clears and the top-out predicate

use crate::piece::Piece;
use crate::tetromino::Skin;
use std::fmt;

/// Standard playfield dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
/// Rows at the top of the grid reserved as spawn buffer
pub const MIN_VALID_ROW: usize = 4;

/// A cell on the board - either empty or filled with a skin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Skin),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// A coordinate outside the grid was queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell ({}, {}) is outside the board", self.x, self.y)
    }
}

impl std::error::Error for OutOfBounds {}

/// The game board
///
/// Row 0 is the top of the grid and y grows downward. Rows
/// `0..min_valid_row` form the spawn buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    min_valid_row: usize,
    /// Grid stored as [row][col]
    cells: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board with standard dimensions
    pub fn new() -> Self {
        Self::with_size(BOARD_WIDTH, BOARD_HEIGHT, MIN_VALID_ROW)
    }

    /// Create an empty board with custom dimensions
    pub fn with_size(width: usize, height: usize, min_valid_row: usize) -> Self {
        assert!(
            min_valid_row >= 1 && min_valid_row < height,
            "spawn buffer must leave at least one playable row"
        );
        Self {
            width,
            height,
            min_valid_row,
            cells: vec![vec![Cell::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn min_valid_row(&self) -> usize {
        self.min_valid_row
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((x, y))
    }

    /// Get the cell at (x, y), None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|(x, y)| self.cells[y][x])
    }

    /// Set a cell, returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.cells[y][x] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, OutOfBounds> {
        self.get(x, y)
            .map(|cell| cell.is_filled())
            .ok_or(OutOfBounds { x, y })
    }

    /// Collision query: anything outside the grid counts as blocked
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.is_occupied(x, y).unwrap_or(true)
    }

    /// Write the piece's skins into its cells.
    ///
    /// Callers must have checked collision first; overlaps are overwritten.
    pub fn lock(&mut self, piece: &Piece) {
        for (&(x, y), &skin) in piece.cells().iter().zip(piece.skins()) {
            self.set(x, y, Cell::Filled(skin));
        }
    }

    /// Remove full rows below the spawn buffer and shift everything above
    /// down. Returns the number of rows cleared.
    ///
    /// Single bottom-up sweep: after a shift the same row index is checked
    /// again since new content moved into it. The buffer never shifts down;
    /// the first playable row is refilled empty instead.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;

        while y > self.min_valid_row {
            let row = y - 1;
            if self.is_row_full(row) {
                for ay in (self.min_valid_row + 1..=row).rev() {
                    self.cells[ay] = self.cells[ay - 1].clone();
                }
                self.cells[self.min_valid_row] = vec![Cell::Empty; self.width];
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Whether the last buffer row holds any block (game over predicate)
    pub fn top_row_occupied(&self) -> bool {
        self.cells[self.min_valid_row - 1]
            .iter()
            .any(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows from top to bottom
    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(|row| row.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::{BlockColor, TetrominoKind};

    const RED: Cell = Cell::Filled(Skin::Color(BlockColor::Red));
    const BLUE: Cell = Cell::Filled(Skin::Color(BlockColor::Blue));

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..board.width() as i32 {
            board.set(x, y, RED);
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert!(!board.top_row_occupied());
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, RED));
        assert_eq!(board.get(5, 5), Some(RED));
        assert_eq!(board.is_occupied(5, 5), Ok(true));
        assert_eq!(board.is_occupied(4, 5), Ok(false));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.is_occupied(-1, 0), Err(OutOfBounds { x: -1, y: 0 }));
        assert!(board.is_occupied(0, -1).is_err());
        assert!(board.is_occupied(BOARD_WIDTH as i32, 0).is_err());
        assert!(board.is_occupied(0, BOARD_HEIGHT as i32).is_err());
        assert!(board.is_blocked(-1, 0));
        assert!(board.is_blocked(0, BOARD_HEIGHT as i32));
        assert!(!board.is_blocked(0, 0));
        assert!(!board.set(BOARD_WIDTH as i32, 0, RED));
    }

    #[test]
    fn test_lock_writes_piece_skins() {
        let mut board = Board::new();
        let skin = Skin::Color(BlockColor::Green);
        let piece = Piece::new(TetrominoKind::O, [skin; 4]);
        board.lock(&piece);
        for &(x, y) in piece.cells() {
            assert_eq!(board.get(x, y), Some(Cell::Filled(skin)));
        }
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new();
        let bottom = BOARD_HEIGHT as i32 - 1;
        fill_row(&mut board, bottom);
        board.set(0, bottom - 1, BLUE);

        assert_eq!(board.clear_full_rows(), 1);
        // The block from the row above should now be on the bottom row
        assert_eq!(board.get(0, bottom), Some(BLUE));
        assert_eq!(board.get(1, bottom), Some(Cell::Empty));
        assert!(board.get(0, bottom - 1).unwrap().is_empty());
    }

    #[test]
    fn test_clear_two_separated_rows() {
        // Small board without much buffer so rows 2 and 5 are playable
        let mut board = Board::with_size(4, 8, 1);
        fill_row(&mut board, 2);
        fill_row(&mut board, 5);
        board.set(0, 1, BLUE); // above both cleared rows
        board.set(1, 3, BLUE); // between them
        board.set(2, 4, RED);
        board.set(3, 6, RED); // below both

        assert_eq!(board.clear_full_rows(), 2);

        // Below the lowest cleared row: untouched
        assert_eq!(board.get(3, 6), Some(RED));
        // Between the cleared rows: shifted down by one
        assert_eq!(board.get(1, 4), Some(BLUE));
        assert_eq!(board.get(2, 5), Some(RED));
        // Above the topmost cleared row: shifted down by two
        assert_eq!(board.get(0, 3), Some(BLUE));
        // Nothing left full
        for y in 0..8 {
            assert!(!board.is_row_full(y));
        }
        let filled: usize = board
            .rows()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum();
        assert_eq!(filled, 4);
    }

    #[test]
    fn test_clear_adjacent_rows_replays_index() {
        let mut board = Board::new();
        for y in 16..20 {
            fill_row(&mut board, y);
        }
        board.set(7, 15, BLUE);
        assert_eq!(board.clear_full_rows(), 4);
        assert_eq!(board.get(7, 19), Some(BLUE));
        let filled: usize = board
            .rows()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum();
        assert_eq!(filled, 1);
    }

    #[test]
    fn test_buffer_rows_are_never_cleared() {
        let mut board = Board::new();
        fill_row(&mut board, MIN_VALID_ROW as i32 - 1);
        assert_eq!(board.clear_full_rows(), 0);
        assert!(board.top_row_occupied());
    }

    #[test]
    fn test_clear_below_full_buffer_row_terminates() {
        let mut board = Board::new();
        let boundary = MIN_VALID_ROW as i32;
        fill_row(&mut board, boundary - 1);
        fill_row(&mut board, boundary);
        fill_row(&mut board, boundary + 1);

        assert_eq!(board.clear_full_rows(), 2);
        // Buffer row stays put, the playable rows it sat above are empty
        assert!(board.top_row_occupied());
        for x in 0..BOARD_WIDTH as i32 {
            assert_eq!(board.get(x, boundary), Some(Cell::Empty));
            assert_eq!(board.get(x, boundary + 1), Some(Cell::Empty));
        }
    }

    #[test]
    fn test_clear_at_buffer_boundary_keeps_buffer_blocks() {
        let mut board = Board::new();
        let boundary = MIN_VALID_ROW as i32;
        board.set(2, boundary - 1, BLUE);
        fill_row(&mut board, boundary);
        board.set(4, boundary + 1, BLUE);

        assert_eq!(board.clear_full_rows(), 1);
        assert_eq!(board.get(2, boundary - 1), Some(BLUE));
        assert_eq!(board.get(2, boundary), Some(Cell::Empty));
        assert_eq!(board.get(4, boundary + 1), Some(BLUE));
    }

    #[test]
    fn test_top_row_occupied() {
        let mut board = Board::new();
        board.set(3, MIN_VALID_ROW as i32, RED);
        assert!(!board.top_row_occupied());
        board.set(3, MIN_VALID_ROW as i32 - 1, RED);
        assert!(board.top_row_occupied());
    }
}
