use std::fmt;

use crate::error::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    fn letter(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Self { piece_type, color }
    }

    /// Uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        let letter = self.piece_type.letter();
        match self.color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece_type = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some(Self::new(piece_type, color))
    }

    pub fn asset_path(self) -> &'static str {
        match (self.color, self.piece_type) {
            (Color::White, PieceType::Pawn) => "pieces/wP.png",
            (Color::White, PieceType::Knight) => "pieces/wN.png",
            (Color::White, PieceType::Bishop) => "pieces/wB.png",
            (Color::White, PieceType::Rook) => "pieces/wR.png",
            (Color::White, PieceType::Queen) => "pieces/wQ.png",
            (Color::White, PieceType::King) => "pieces/wK.png",
            (Color::Black, PieceType::Pawn) => "pieces/bP.png",
            (Color::Black, PieceType::Knight) => "pieces/bN.png",
            (Color::Black, PieceType::Bishop) => "pieces/bB.png",
            (Color::Black, PieceType::Rook) => "pieces/bR.png",
            (Color::Black, PieceType::Queen) => "pieces/bQ.png",
            (Color::Black, PieceType::King) => "pieces/bK.png",
        }
    }
}

/// Content of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PieceSymbol {
    #[default]
    Empty,
    Occupied(Piece),
}

impl PieceSymbol {
    pub const EMPTY_CHAR: char = '.';

    pub fn is_empty(self) -> bool {
        matches!(self, PieceSymbol::Empty)
    }

    pub fn piece(self) -> Option<Piece> {
        match self {
            PieceSymbol::Empty => None,
            PieceSymbol::Occupied(piece) => Some(piece),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            PieceSymbol::Empty => Self::EMPTY_CHAR,
            PieceSymbol::Occupied(piece) => piece.to_char(),
        }
    }

    pub fn from_char(c: char) -> Result<Self, BoardError> {
        if c == Self::EMPTY_CHAR {
            return Ok(PieceSymbol::Empty);
        }
        Piece::from_char(c)
            .map(PieceSymbol::Occupied)
            .ok_or(BoardError::UnknownSymbol(c))
    }

    /// `None` for an empty cell.
    pub fn asset_path(self) -> Option<&'static str> {
        self.piece().map(Piece::asset_path)
    }
}

impl From<Piece> for PieceSymbol {
    fn from(piece: Piece) -> Self {
        PieceSymbol::Occupied(piece)
    }
}

impl fmt::Display for PieceSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
