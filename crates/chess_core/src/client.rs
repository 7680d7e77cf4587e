//! The capability the board needs from a chess engine.

use async_trait::async_trait;

use crate::error::EngineError;
use crate::{Board, Move};

pub type EngineResult<T> = Result<T, EngineError>;

/// Engine access, independent of how the engine is reached.
///
/// Every transport presents the same operations with the same ordering: a
/// call completes, observably, before the next one is issued, which `&mut
/// self` enforces for a single client. Transports whose calls are
/// synchronous simply return ready futures.
///
/// A client must be released with [`EngineClient::dispose`]; afterwards every
/// operation fails with [`EngineError::Disposed`].
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Hands a serialised position to the engine verbatim.
    async fn load_position(&mut self, fen: &str) -> EngineResult<()>;

    /// Authoritative grid for the engine's current position.
    async fn current_board(&mut self) -> EngineResult<Board>;

    /// Back to the standard starting position.
    async fn reset_position(&mut self) -> EngineResult<()>;

    /// Legal moves in engine order. The first entry is *a* move, not the
    /// best one.
    async fn legal_moves(&mut self) -> EngineResult<Vec<Move>>;

    /// Plays a token previously issued by this client's session.
    async fn apply_move(&mut self, mv: &Move) -> EngineResult<()>;

    /// Leaf count of the legal-move tree to `depth`. Never mutates the
    /// position.
    async fn perft(&mut self, depth: u32) -> EngineResult<u64>;

    /// Best move in the current position, `None` when there is nothing to
    /// play. The move is not applied.
    async fn search_best_move(&mut self) -> EngineResult<Option<Move>>;

    async fn dispose(&mut self) -> EngineResult<()>;
}
