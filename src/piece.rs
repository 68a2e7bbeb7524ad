//! Active falling piece logic

use crate::board::Board;
use crate::tetromino::{Skin, TetrominoKind};

/// A tetromino on (or above) the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: TetrominoKind,
    /// Absolute (x, y) of the four blocks
    cells: [(i32, i32); 4],
    /// Skin of each block, parallel to `cells`
    skins: [Skin; 4],
}

impl Piece {
    /// Create a piece at its raw template coordinates
    pub fn new(kind: TetrominoKind, skins: [Skin; 4]) -> Self {
        Self {
            kind,
            cells: kind.template(),
            skins,
        }
    }

    pub fn kind(&self) -> TetrominoKind {
        self.kind
    }

    pub fn cells(&self) -> &[(i32, i32); 4] {
        &self.cells
    }

    pub fn skins(&self) -> &[Skin; 4] {
        &self.skins
    }

    /// Shift every block; no collision check
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for cell in &mut self.cells {
            cell.0 += dx;
            cell.1 += dy;
        }
    }

    /// Whether any block, mapped through `candidate`, is blocked on the board
    pub fn collides<F>(&self, board: &Board, mut candidate: F) -> bool
    where
        F: FnMut(usize, (i32, i32)) -> (i32, i32),
    {
        self.cells
            .iter()
            .enumerate()
            .any(|(i, &cell)| {
                let (x, y) = candidate(i, cell);
                board.is_blocked(x, y)
            })
    }

    /// Whether the piece shifted by (dx, dy) would be blocked
    pub fn collides_at(&self, board: &Board, dx: i32, dy: i32) -> bool {
        self.collides(board, |_, (x, y)| (x + dx, y + dy))
    }

    /// Try to move by (dx, dy), returns true if successful
    pub fn try_translate(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        if self.collides_at(board, dx, dy) {
            return false;
        }
        self.translate(dx, dy);
        true
    }

    /// Cells after a quarter turn around the bounding-box corner
    fn rotated_cells(&self) -> [(i32, i32); 4] {
        let max_x = self.cells.iter().map(|c| c.0).max().unwrap_or(0);
        let min_x = self.cells.iter().map(|c| c.0).min().unwrap_or(0);
        let min_y = self.cells.iter().map(|c| c.1).min().unwrap_or(0);

        self.cells
            .map(|(x, y)| (max_x + min_y - y, x - min_x + min_y))
    }

    /// Try to rotate, returns true if successful.
    ///
    /// Only the direct candidate is tested, there are no wall kicks. A
    /// rejected rotation leaves the piece untouched.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let rotated = self.rotated_cells();
        if self.collides(board, |i, _| rotated[i]) {
            return false;
        }
        self.cells = rotated;
        true
    }

    /// Align for spawn: leftmost block at the middle column, topmost at row 0
    pub fn reset_position(&mut self, board_width: usize) {
        let middle = (board_width / 2) as i32;
        let min_x = self.cells.iter().map(|c| c.0).min().unwrap_or(0);
        let min_y = self.cells.iter().map(|c| c.1).min().unwrap_or(0);
        self.translate(middle - min_x, -min_y);
    }

    /// Number of rows the piece can still fall
    pub fn drop_distance(&self, board: &Board) -> i32 {
        let mut distance = 0;
        while !self.collides_at(board, 0, distance + 1) {
            distance += 1;
        }
        distance
    }

    /// Move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let distance = self.drop_distance(board);
        self.translate(0, distance);
        distance
    }
}
