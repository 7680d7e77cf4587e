use std::time::Instant;

use chess_core::{
    Board, Color as BoardColor, EngineError, EngineResult, Move, Piece, PieceSymbol, PieceType,
    SessionId,
};
use rayon::prelude::*;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, Position, Role, Square};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const DEFAULT_SEARCH_DEPTH: u8 = 3;

/// One engine session: a position plus the identity stamped on every move
/// token it issues.
///
/// The method names are the engine's binding surface; both client
/// transports call exactly these.
#[derive(Debug, Clone)]
pub struct Engine {
    session: SessionId,
    position: Chess,
    search_depth: u8,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_SEARCH_DEPTH)
    }

    pub fn with_depth(search_depth: u8) -> Self {
        let session = SessionId(rand::random());
        log::info!("engine session {session} started (search depth {search_depth})");
        Self {
            session,
            position: Chess::default(),
            search_depth: search_depth.max(1),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn load_fen(&mut self, fen: &str) -> EngineResult<()> {
        let parsed = fen.parse::<Fen>().map_err(|err| {
            log::warn!("invalid FEN {fen:?}: {err}");
            EngineError::InvalidPosition(format!("{fen:?}: {err}"))
        })?;
        self.position = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| EngineError::InvalidPosition(format!("{fen:?}: {err}")))?;
        log::debug!("loaded position {fen}");
        Ok(())
    }

    /// The current position as a display grid, eighth rank first.
    pub fn recieve_position(&self) -> Board {
        let mut rows = [[PieceSymbol::Empty; 8]; 8];
        let board = self.position.board();
        for sq in Square::ALL {
            if let Some(piece) = board.piece_at(sq) {
                let index = usize::from(sq);
                rows[7 - index / 8][index % 8] = Piece::new(
                    piece_type(piece.role),
                    board_color(piece.color),
                )
                .into();
            }
        }
        Board::from_grid(rows)
    }

    pub fn reset_position(&mut self) {
        self.position = Chess::default();
        log::debug!("position reset");
    }

    pub fn moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .map(|mv| self.issue(mv))
            .collect()
    }

    pub fn make_move(&mut self, mv: &Move) -> EngineResult<()> {
        if mv.session() != self.session {
            log::warn!(
                "rejected move {mv} from session {} (this session is {})",
                mv.session(),
                self.session
            );
            return Err(EngineError::InvalidMoveToken);
        }

        let uci: UciMove = mv.code().parse().map_err(|_| EngineError::InvalidMoveToken)?;
        let legal = uci
            .to_move(&self.position)
            .map_err(|_| EngineError::IllegalMove(mv.code().to_owned()))?;
        self.position.play_unchecked(&legal);
        log::debug!("played {mv}");
        Ok(())
    }

    pub fn start_perft(&self, depth: u32) -> u64 {
        let started = Instant::now();
        let nodes = perft(&self.position, depth);
        log::info!(
            "perft({depth}) = {nodes} in {} us",
            started.elapsed().as_micros()
        );
        nodes
    }

    /// Best move for the side to move, without playing it.
    pub fn search(&self) -> Option<Move> {
        let started = Instant::now();
        let best = crate::search::search_best_move(&self.position, self.search_depth);
        let best = best.map(|mv| self.issue(&mv));
        match &best {
            Some(mv) => log::debug!("best move {mv} in {} ms", started.elapsed().as_millis()),
            None => log::debug!("no move available"),
        }
        best
    }

    fn issue(&self, mv: &shakmaty::Move) -> Move {
        Move::issue(self.session, mv.to_uci(CastlingMode::Standard).to_string())
    }
}

/// Leaf count to `depth`; the root's subtrees are counted in parallel.
pub fn perft(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves: Vec<shakmaty::Move> = pos.legal_moves().into_iter().collect();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .par_iter()
        .map(|mv| {
            let mut child = pos.clone();
            child.play_unchecked(mv);
            perft_serial(&child, depth - 1)
        })
        .sum()
}

fn perft_serial(pos: &Chess, depth: u32) -> u64 {
    let moves = pos.legal_moves();
    if depth <= 1 {
        return if depth == 0 { 1 } else { moves.len() as u64 };
    }
    moves
        .iter()
        .map(|mv| {
            let mut child = pos.clone();
            child.play_unchecked(mv);
            perft_serial(&child, depth - 1)
        })
        .sum()
}

fn piece_type(role: Role) -> PieceType {
    match role {
        Role::Pawn => PieceType::Pawn,
        Role::Knight => PieceType::Knight,
        Role::Bishop => PieceType::Bishop,
        Role::Rook => PieceType::Rook,
        Role::Queen => PieceType::Queen,
        Role::King => PieceType::King,
    }
}

fn board_color(color: Color) -> BoardColor {
    match color {
        Color::White => BoardColor::White,
        Color::Black => BoardColor::Black,
    }
}
