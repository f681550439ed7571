use super::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Drop a disc into `column` for `player`, returning the landing row.
fn drop(board: &mut Board, column: usize, player: usize) -> usize {
    let row = board.landing_row(column).expect("column should not be full");
    assert!(board.is_valid_move(column, row));
    board.place(column, row, player);
    row
}

/// Build a board from rows written top to bottom ('.' empty, digits seats).
fn board_from(rows: [&str; ROWS]) -> Board {
    let mut board = Board::new();
    for (row, line) in rows.iter().enumerate() {
        for (column, ch) in line.chars().enumerate() {
            if let Some(player) = ch.to_digit(10) {
                board.place(column, row, player as usize);
            }
        }
    }
    board
}

#[test]
fn test_initial_board() {
    let board = Board::new();
    assert_eq!(board.pieces(), 0);
    assert!(!board.is_full());
    assert_eq!(board.grid(), [[EMPTY_CELL; COLS]; ROWS]);
    for column in 0..COLS {
        assert_eq!(board.landing_row(column), Some(ROWS - 1));
    }
}

#[test]
fn test_decode_placement() {
    assert_eq!(Board::decode_placement(0), Some((0, 0)));
    assert_eq!(Board::decode_placement(6), Some((6, 0)));
    assert_eq!(Board::decode_placement(7), Some((0, 1)));
    assert_eq!(Board::decode_placement(38), Some((3, 5)));
    assert_eq!(Board::decode_placement(41), Some((6, 5)));
    assert_eq!(Board::decode_placement(-1), None);
    assert_eq!(Board::decode_placement(42), None);
    assert_eq!(Board::encode_placement(3, 5), 38);
}

#[test]
fn test_bottom_row_is_valid() {
    let board = Board::new();
    for column in 0..COLS {
        assert!(board.is_valid_move(column, ROWS - 1));
    }
}

#[test]
fn test_floating_move_is_invalid() {
    let board = Board::new();
    // Any row above the bottom on an empty column floats
    for row in 0..ROWS - 1 {
        assert!(!board.is_valid_move(3, row), "row {} should float", row);
    }
}

#[test]
fn test_out_of_bounds_is_invalid() {
    let board = Board::new();
    assert!(!board.is_valid_move(COLS, ROWS - 1));
    assert!(!board.is_valid_move(0, ROWS));
    assert!(!board.is_valid_move(usize::MAX, usize::MAX));
    assert_eq!(board.cell(COLS, 0), None);
}

#[test]
fn test_occupied_cell_is_invalid() {
    let mut board = Board::new();
    board.place(2, ROWS - 1, 0);
    assert!(!board.is_valid_move(2, ROWS - 1));
    // The cell on top of it becomes the only valid one in that column
    assert!(board.is_valid_move(2, ROWS - 2));
    assert!(!board.is_valid_move(2, ROWS - 3));
}

#[test]
fn test_stacking_fills_column() {
    let mut board = Board::new();
    for i in 0..ROWS {
        let row = drop(&mut board, 0, i % 2);
        assert_eq!(row, ROWS - 1 - i);
    }
    assert_eq!(board.landing_row(0), None);
    assert!(!(0..ROWS).any(|row| board.is_valid_move(0, row)));
}

#[test]
fn test_horizontal_win() {
    let mut board = Board::new();
    for column in 0..3 {
        drop(&mut board, column, 0);
        drop(&mut board, column, 1);
    }
    let row = drop(&mut board, 3, 0);
    assert!(board.is_winning_move(3, row));
    // Yellow's three on the second row do not win
    assert!(!board.is_winning_move(2, ROWS - 2));
}

#[test]
fn test_horizontal_win_through_middle() {
    // Gap filled in the middle: run spans both sides of the placed disc
    let mut board = board_from([
        ".......",
        ".......",
        ".......",
        ".......",
        ".......",
        ".00.0..",
    ]);
    board.place(3, 5, 0);
    assert!(board.is_winning_move(3, 5));
}

#[test]
fn test_vertical_win() {
    let mut board = Board::new();
    let mut last = 0;
    for _ in 0..4 {
        last = drop(&mut board, 3, 0);
        drop(&mut board, 4, 1);
    }
    assert_eq!(last, 2);
    assert!(board.is_winning_move(3, last));
}

#[test]
fn test_three_in_a_row_does_not_win() {
    let board = board_from([
        ".......",
        ".......",
        ".......",
        "...0...",
        "...01..",
        "...01..",
    ]);
    assert!(!board.is_winning_move(3, 3));
    assert!(!board.is_winning_move(4, 4));
}

#[test]
fn test_diagonal_win_descending_right() {
    // \ diagonal: (0,2) (1,3) (2,4) (3,5)
    let board = board_from([
        ".......",
        ".......",
        "0......",
        "10.....",
        "110....",
        "1110...",
    ]);
    for (column, row) in [(0, 2), (1, 3), (2, 4), (3, 5)] {
        assert!(board.is_winning_move(column, row), "({}, {})", column, row);
    }
}

#[test]
fn test_diagonal_win_ascending_right() {
    // / diagonal: (3,5) (4,4) (5,3) (6,2)
    let board = board_from([
        ".......",
        ".......",
        "......1",
        ".....10",
        "....100",
        "...1000",
    ]);
    for (column, row) in [(3, 5), (4, 4), (5, 3), (6, 2)] {
        assert!(board.is_winning_move(column, row), "({}, {})", column, row);
    }
}

#[test]
fn test_diagonal_run_spanning_placed_disc() {
    // Placed disc at (2,3) sits inside the run (1,4) (2,3) (3,2) (4,1)
    let mut board = board_from([
        ".......",
        "....0..",
        "...01..",
        "...11..",
        ".0.11..",
        ".1011..",
    ]);
    board.place(2, 3, 0);
    assert!(board.is_winning_move(2, 3));
}

#[test]
fn test_diagonal_near_corner_is_not_a_win() {
    // Three on a short diagonal next to the corner
    let board = board_from([
        "..0....",
        ".0.....",
        "0......",
        "1......",
        "1......",
        "1......",
    ]);
    assert!(!board.is_winning_move(0, 2));
    assert!(!board.is_winning_move(2, 0));
}

#[test]
fn test_other_players_discs_break_runs() {
    let board = board_from([
        ".......",
        ".......",
        ".......",
        ".......",
        ".......",
        "0002000",
    ]);
    assert!(!board.is_winning_move(0, 5));
    assert!(!board.is_winning_move(3, 5));
    assert!(!board.is_winning_move(6, 5));

    let board = board_from([
        ".......",
        ".......",
        ".......",
        ".......",
        ".......",
        "1000021",
    ]);
    assert!(board.is_winning_move(1, 5));
    assert!(board.is_winning_move(4, 5));
    assert!(!board.is_winning_move(5, 5));
}

#[test]
fn test_empty_cell_is_never_winning() {
    let board = Board::new();
    assert!(!board.is_winning_move(0, ROWS - 1));
    assert!(!board.is_winning_move(COLS, ROWS));
}

#[test]
fn test_full_board() {
    let mut board = Board::new();
    for row in 0..ROWS {
        for column in 0..COLS {
            if (row, column) != (0, 6) {
                board.place(column, row, (row + column) % 2);
            }
        }
    }
    // Exactly one empty cell left
    assert!(!board.is_full());
    assert_eq!(board.pieces(), BOARD_SIZE - 1);

    board.place(6, 0, 1);
    assert!(board.is_full());
}

#[test]
fn test_grid_encoding() {
    let mut board = Board::new();
    board.place(3, ROWS - 1, 2);
    let grid = board.grid();
    assert_eq!(grid[ROWS - 1][3], 2);
    assert_eq!(grid[ROWS - 2][3], EMPTY_CELL);
    assert_eq!(Cell::Occupied(4).code(), 4);
}

#[test]
fn test_random_games_invariants() {
    for seed in 0..20 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = Board::new();
        let mut moves = 0;

        loop {
            let open: Vec<usize> = (0..COLS)
                .filter(|&c| board.landing_row(c).is_some())
                .collect();
            if open.is_empty() {
                break;
            }
            let column = open[rng.gen_range(0..open.len())];
            let player = moves % 3;
            let row = drop(&mut board, column, player);
            moves += 1;

            // Gravity: the cell below is always occupied after a placement
            if row + 1 < ROWS {
                assert!(!board.cell(column, row + 1).unwrap().is_empty());
            }
            assert_eq!(board.pieces(), moves, "seed={}", seed);

            if board.is_winning_move(column, row) {
                break;
            }
        }

        assert!(moves <= BOARD_SIZE, "seed={}", seed);
        assert_eq!(board.is_full(), moves == BOARD_SIZE, "seed={}", seed);
    }
}
