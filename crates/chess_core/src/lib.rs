// Board interaction and engine synchronisation
pub mod board;
pub mod client;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod moves;
pub mod piece;
pub mod position;
pub mod stepper;

// Re-export main types for convenience
pub use board::{Board, BoardState};
pub use client::{EngineClient, EngineResult};
pub use config::{AppConfig, Transport};
pub use drag::{DragController, DragEffect, DragPhase, DragSession};
pub use error::{BoardError, ConfigError, EngineError};
pub use geometry::{BoardRect, Pixel, CELL_SIZE};
pub use moves::{Move, SessionId};
pub use piece::{Color, Piece, PieceSymbol, PieceType};
pub use position::Square;
pub use stepper::{CancelToken, Scheduler, SearchStepper, StepOutcome, StepReport, ThreadScheduler};
