//! Connect 4 board rules for the Dropline session server
//!
//! Players drop discs into a 7-column, 6-row vertically suspended grid. A disc
//! always comes to rest on the lowest free cell of its column, and the first
//! player to line up four discs horizontally, vertically or diagonally wins.
//! Any number of players may share a board; cells remember the seat index of
//! the player who filled them.
//!
//! # Board Layout
//!
//! The board is addressed as `(column, row)` with row 0 at the TOP, which is
//! also how the grid travels over the wire. A linear placement index maps to
//! coordinates as `column = placement % COLS`, `row = placement / COLS`:
//! ```text
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Top
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 4: [28][29][30][31][32][33][34]
//! Row 5: [35][36][37][38][39][40][41]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! # Usage
//!
//! ```rust
//! use games_connect4::Board;
//!
//! let mut board = Board::new();
//! let (column, row) = Board::decode_placement(38).unwrap();
//! assert!(board.is_valid_move(column, row));
//! board.place(column, row, 0);
//! assert!(!board.is_winning_move(column, row));
//! ```

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Number of aligned discs needed to win.
pub const CONNECT: usize = 4;

/// Wire value for an empty cell.
pub const EMPTY_CELL: i32 = -1;

/// Direction vectors: horizontal, vertical, diagonal \, diagonal /
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Filled by the player seated at this index.
    Occupied(usize),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Wire encoding: `-1` for empty, the seat index otherwise.
    pub fn code(&self) -> i32 {
        match self {
            Cell::Empty => EMPTY_CELL,
            Cell::Occupied(player) => *player as i32,
        }
    }
}

/// Connect 4 board
///
/// Pure data: validation, placement, win and fullness checks. The board never
/// checks whose turn it is; sequencing belongs to the session that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    /// `cells[row][column]`, row 0 at the top
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a linear wire placement into `(column, row)`.
    ///
    /// Returns `None` for negative indices and indices past the last cell.
    pub fn decode_placement(placement: i64) -> Option<(usize, usize)> {
        if placement < 0 || placement >= BOARD_SIZE as i64 {
            return None;
        }
        let placement = placement as usize;
        Some((placement % COLS, placement / COLS))
    }

    /// Encode `(column, row)` as a linear wire placement.
    pub fn encode_placement(column: usize, row: usize) -> i64 {
        (row * COLS + column) as i64
    }

    #[inline]
    fn in_bounds(column: isize, row: isize) -> bool {
        column >= 0 && (column as usize) < COLS && row >= 0 && (row as usize) < ROWS
    }

    /// Cell at `(column, row)`, `None` when out of bounds.
    pub fn cell(&self, column: usize, row: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Check if a disc may be placed at `(column, row)`.
    ///
    /// Fails closed: out-of-bounds coordinates, occupied cells and floating
    /// placements (empty cell underneath) are all rejected.
    pub fn is_valid_move(&self, column: usize, row: usize) -> bool {
        match self.cell(column, row) {
            Some(Cell::Empty) => {}
            _ => return false,
        }

        if row + 1 < ROWS && self.cells[row + 1][column].is_empty() {
            return false;
        }

        true
    }

    /// Place a disc for `player`. The caller must have validated the move.
    pub fn place(&mut self, column: usize, row: usize, player: usize) {
        self.cells[row][column] = Cell::Occupied(player);
    }

    /// Row a disc dropped into `column` would land on, `None` if full.
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][column].is_empty())
    }

    /// Check if the disc at `(column, row)` completes a line of four.
    ///
    /// For every direction the scan first walks back to the edge of the board
    /// along that line, then sweeps to the opposite edge counting the longest
    /// run owned by the placed disc's player. Runs may extend on both sides of
    /// the placed disc.
    pub fn is_winning_move(&self, column: usize, row: usize) -> bool {
        let owner = match self.cell(column, row) {
            Some(Cell::Occupied(player)) => player,
            _ => return false,
        };

        DIRECTIONS
            .iter()
            .any(|&(dc, dr)| self.longest_run(column, row, dc, dr, owner) >= CONNECT)
    }

    /// Longest run of `owner` discs on the full line through `(column, row)`.
    fn longest_run(&self, column: usize, row: usize, dc: isize, dr: isize, owner: usize) -> usize {
        // Walk back to the first cell of the line
        let (mut c, mut r) = (column as isize, row as isize);
        while Self::in_bounds(c - dc, r - dr) {
            c -= dc;
            r -= dr;
        }

        // Sweep to the other end
        let mut longest = 0;
        let mut run = 0;
        while Self::in_bounds(c, r) {
            if self.cells[r as usize][c as usize] == Cell::Occupied(owner) {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
            c += dc;
            r += dr;
        }

        longest
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| !cell.is_empty())
    }

    /// Number of discs on the board
    pub fn pieces(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| !cell.is_empty()).count()
    }

    /// Wire grid: `grid[row][column]`, `-1` empty, seat index otherwise.
    pub fn grid(&self) -> [[i32; COLS]; ROWS] {
        let mut grid = [[EMPTY_CELL; COLS]; ROWS];
        for (row, cells) in self.cells.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                grid[row][column] = cell.code();
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests;
