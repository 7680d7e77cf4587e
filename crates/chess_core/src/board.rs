use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::piece::{Color, Piece, PieceSymbol, PieceType};
use crate::Square;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 8x8 grid of piece symbols, rank-major with rank 0 (the top rendered row)
/// first. The array type makes any other shape unrepresentable; untyped
/// grids go through [`Board::from_rows`].
///
/// On the wire a board is an array of eight arrays of eight one-character
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<char>>", into = "Vec<Vec<char>>")]
pub struct Board([[PieceSymbol; 8]; 8]);

impl Board {
    pub const fn from_grid(grid: [[PieceSymbol; 8]; 8]) -> Self {
        Board(grid)
    }

    pub fn empty() -> Self {
        Board([[PieceSymbol::Empty; 8]; 8])
    }

    /// Standard starting position, Black on rank 0.
    pub fn starting_position() -> Self {
        let mut board = Self::empty();
        for (file, &piece_type) in BACK_RANK.iter().enumerate() {
            board.0[0][file] = Piece::new(piece_type, Color::Black).into();
            board.0[1][file] = Piece::new(PieceType::Pawn, Color::Black).into();
            board.0[6][file] = Piece::new(PieceType::Pawn, Color::White).into();
            board.0[7][file] = Piece::new(piece_type, Color::White).into();
        }
        board
    }

    pub fn from_rows<R: AsRef<[PieceSymbol]>>(rows: &[R]) -> Result<Self, BoardError> {
        check_shape(rows.iter().map(|row| row.as_ref().len()).collect())?;

        let mut board = Self::empty();
        for (rank, row) in rows.iter().enumerate() {
            board.0[rank].copy_from_slice(row.as_ref());
        }
        Ok(board)
    }

    pub fn from_char_rows<R: AsRef<[char]>>(rows: &[R]) -> Result<Self, BoardError> {
        let symbols = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .iter()
                    .map(|&c| PieceSymbol::from_char(c))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(&symbols)
    }

    pub fn rows(&self) -> &[[PieceSymbol; 8]; 8] {
        &self.0
    }

    pub fn rank(&self, rank: usize) -> &[PieceSymbol; 8] {
        &self.0[rank]
    }

    pub fn get(&self, square: Square) -> Option<PieceSymbol> {
        square.grid_index().map(|(row, col)| self.0[row][col])
    }

    pub fn occupied_count(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|symbol| !symbol.is_empty())
            .count()
    }

    pub fn to_char_rows(&self) -> Vec<Vec<char>> {
        self.0
            .iter()
            .map(|row| row.iter().map(|symbol| symbol.to_char()).collect())
            .collect()
    }

    fn set(&mut self, square: Square, symbol: PieceSymbol) -> Result<(), BoardError> {
        let (row, col) = square.grid_index().ok_or(BoardError::OutOfRange(square))?;
        self.0[row][col] = symbol;
        Ok(())
    }
}

fn check_shape(row_lengths: Vec<usize>) -> Result<(), BoardError> {
    if row_lengths.len() == 8 && row_lengths.iter().all(|&len| len == 8) {
        Ok(())
    } else {
        Err(BoardError::Shape {
            rows: row_lengths.len(),
            row_lengths,
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Vec<char>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<char>>) -> Result<Self, Self::Error> {
        Board::from_char_rows(&rows)
    }
}

impl From<Board> for Vec<Vec<char>> {
    fn from(board: Board) -> Self {
        board.to_char_rows()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            for symbol in row {
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The grid currently shown to the user. Mutated only through the methods
/// below; engine refreshes replace it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    board: Board,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn get(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceSymbol> {
        self.board.get(square)
    }

    pub fn replace(&mut self, board: Board) {
        self.board = board;
    }

    /// Validates an untyped grid and swaps it in. On error the current grid
    /// is left untouched.
    pub fn replace_rows<R: AsRef<[PieceSymbol]>>(&mut self, rows: &[R]) -> Result<(), BoardError> {
        let board = Board::from_rows(rows)?;
        self.replace(board);
        Ok(())
    }

    /// Display-only move: `to` takes whatever stood on `from`, and `from`
    /// becomes empty. The engine is neither consulted nor notified.
    pub fn move_piece_local(&mut self, from: Square, to: Square) -> Result<(), BoardError> {
        let moving = self.board.get(from).ok_or(BoardError::OutOfRange(from))?;
        if !to.is_on_board() {
            return Err(BoardError::OutOfRange(to));
        }
        if from == to {
            return Ok(());
        }

        self.board.set(to, moving)?;
        self.board.set(from, PieceSymbol::Empty)?;
        log::debug!("local move {from} -> {to} ({moving})");
        Ok(())
    }
}
