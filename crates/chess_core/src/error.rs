use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Square;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board must be 8x8, got {rows} rows with row lengths {row_lengths:?}")]
    Shape { rows: usize, row_lengths: Vec<usize> },
    #[error("square {0} is outside the board")]
    OutOfRange(Square),
    #[error("unknown piece symbol {0:?}")]
    UnknownSymbol(char),
}

/// Failures reported through an [`EngineClient`](crate::EngineClient).
///
/// Serialisable so the command transport can carry it across the invocation
/// boundary unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("move token was not issued by this engine session")]
    InvalidMoveToken,
    #[error("move {0} is not legal in the current position")]
    IllegalMove(String),
    #[error("engine rejected position: {0}")]
    InvalidPosition(String),
    #[error("engine returned a malformed board: {0}")]
    MalformedBoard(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("engine client has been disposed")]
    Disposed,
}

impl From<BoardError> for EngineError {
    fn from(err: BoardError) -> Self {
        EngineError::MalformedBoard(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
