use async_trait::async_trait;
use chess_core::{Board, EngineClient, EngineError, EngineResult, Move};

use crate::engine::Engine;

/// In-process transport: every call runs to completion on the caller's
/// thread, so the returned futures are always ready.
#[derive(Debug)]
pub struct DirectClient {
    engine: Option<Engine>,
}

impl DirectClient {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    fn engine(&mut self) -> EngineResult<&mut Engine> {
        self.engine.as_mut().ok_or(EngineError::Disposed)
    }
}

#[async_trait]
impl EngineClient for DirectClient {
    async fn load_position(&mut self, fen: &str) -> EngineResult<()> {
        self.engine()?.load_fen(fen)
    }

    async fn current_board(&mut self) -> EngineResult<Board> {
        Ok(self.engine()?.recieve_position())
    }

    async fn reset_position(&mut self) -> EngineResult<()> {
        self.engine()?.reset_position();
        Ok(())
    }

    async fn legal_moves(&mut self) -> EngineResult<Vec<Move>> {
        Ok(self.engine()?.moves())
    }

    async fn apply_move(&mut self, mv: &Move) -> EngineResult<()> {
        self.engine()?.make_move(mv)
    }

    async fn perft(&mut self, depth: u32) -> EngineResult<u64> {
        Ok(self.engine()?.start_perft(depth))
    }

    async fn search_best_move(&mut self) -> EngineResult<Option<Move>> {
        Ok(self.engine()?.search())
    }

    async fn dispose(&mut self) -> EngineResult<()> {
        let engine = self.engine.take().ok_or(EngineError::Disposed)?;
        log::info!("disposed direct engine session {}", engine.session());
        Ok(())
    }
}

impl Drop for DirectClient {
    fn drop(&mut self) {
        if let Some(engine) = &self.engine {
            log::warn!(
                "direct engine session {} dropped without dispose",
                engine.session()
            );
        }
    }
}
