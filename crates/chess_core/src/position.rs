use std::fmt;

use serde::{Deserialize, Serialize};

/// A board cell addressed as it is rendered: `file` counts columns from the
/// left edge, `rank` counts rows from the top edge. `(0, 0)` is a8 when the
/// board is drawn from White's side.
///
/// Components are signed so that pointer arithmetic outside the grid still
/// produces a value that can be checked with [`Square::is_on_board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub file: i32,
    pub rank: i32,
}

impl Square {
    pub const fn new(file: i32, rank: i32) -> Self {
        Self { file, rank }
    }

    /// Returns the square only if both components are in `0..8`.
    pub fn on_board(file: i32, rank: i32) -> Option<Self> {
        let square = Self { file, rank };
        square.is_on_board().then_some(square)
    }

    pub fn is_on_board(self) -> bool {
        (0..8).contains(&self.file) && (0..8).contains(&self.rank)
    }

    /// Grid indices `(row, column)` for an on-board square.
    pub fn grid_index(self) -> Option<(usize, usize)> {
        self.is_on_board()
            .then(|| (self.rank as usize, self.file as usize))
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return None,
        };

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        Some(Self {
            file: (file as u8 - b'a') as i32,
            rank: (b'8' - rank as u8) as i32,
        })
    }

    pub fn to_algebraic(self) -> Option<String> {
        if !self.is_on_board() {
            return None;
        }
        let file = (b'a' + self.file as u8) as char;
        let rank = (b'8' - self.rank as u8) as char;
        Some(format!("{file}{rank}"))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(name) => f.write_str(&name),
            None => write!(f, "({}, {})", self.file, self.rank),
        }
    }
}
