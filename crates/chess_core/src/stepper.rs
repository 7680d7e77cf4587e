//! Engine-driven play, paced so an observer can follow each move.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::client::{EngineClient, EngineResult};
use crate::{Board, BoardState};

pub const SEARCH_ITERATIONS: u32 = 10;
pub const PACING_DELAY: Duration = Duration::from_millis(500);

/// Longest uninterrupted sleep inside [`ThreadScheduler::wait_for`].
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// The single suspension primitive the stepper relies on. A wait may end
/// early once `cancel` fires.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn wait_for(&self, duration: Duration, cancel: &CancelToken);
}

/// Sleeps the calling thread in short slices, waking early on cancel.
/// Meant for runs on a worker or task-pool thread, never the UI thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

#[async_trait]
impl Scheduler for ThreadScheduler {
    async fn wait_for(&self, duration: Duration, cancel: &CancelToken) {
        let deadline = Instant::now() + duration;
        while !cancel.is_cancelled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Every iteration produced and applied a move.
    Completed,
    /// The engine had no move; the loop stopped early.
    NoMove,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub searches: u32,
    pub moves_applied: u32,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone)]
pub struct SearchStepper {
    iterations: u32,
    delay: Duration,
}

impl Default for SearchStepper {
    fn default() -> Self {
        Self {
            iterations: SEARCH_ITERATIONS,
            delay: PACING_DELAY,
        }
    }
}

impl SearchStepper {
    /// `iterations` is capped at [`SEARCH_ITERATIONS`].
    pub fn new(iterations: u32, delay: Duration) -> Self {
        Self {
            iterations: iterations.min(SEARCH_ITERATIONS),
            delay,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Search, apply, refresh, wait; up to `iterations` times.
    ///
    /// Stops early when the engine reports no move. `on_refresh` sees every
    /// board fetched after a move. An engine error ends the run and leaves
    /// `board` at its last successfully fetched value.
    pub async fn run<E, S, F>(
        &self,
        engine: &mut E,
        board: &mut BoardState,
        scheduler: &S,
        cancel: &CancelToken,
        mut on_refresh: F,
    ) -> EngineResult<StepReport>
    where
        E: EngineClient + ?Sized,
        S: Scheduler + ?Sized,
        F: FnMut(&Board) + Send,
    {
        let mut report = StepReport {
            searches: 0,
            moves_applied: 0,
            outcome: StepOutcome::Completed,
        };

        for iteration in 0..self.iterations {
            if cancel.is_cancelled() {
                report.outcome = StepOutcome::Cancelled;
                break;
            }

            report.searches += 1;
            let Some(mv) = engine.search_best_move().await? else {
                log::info!("engine has no move after {} searches", report.searches);
                report.outcome = StepOutcome::NoMove;
                break;
            };

            engine.apply_move(&mv).await?;
            report.moves_applied += 1;
            board.replace(engine.current_board().await?);
            log::debug!("step {}: played {mv}", iteration + 1);
            on_refresh(board.get());

            if iteration + 1 < self.iterations {
                scheduler.wait_for(self.delay, cancel).await;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::moves::SessionId;
    use crate::{Move, PieceSymbol, Square};
    use futures_lite::future::block_on;
    use std::sync::Mutex;

    /// Answers searches from a script; each applied move shifts a marker
    /// piece one file to the right so refreshes are observable.
    struct ScriptedEngine {
        script: Vec<bool>,
        searches: u32,
        applied: Vec<Move>,
        fail_apply_at: Option<usize>,
    }

    impl ScriptedEngine {
        fn new(script: Vec<bool>) -> Self {
            Self {
                script,
                searches: 0,
                applied: Vec::new(),
                fail_apply_at: None,
            }
        }

        fn board(&self) -> Board {
            let mut rows = vec![vec![PieceSymbol::Empty; 8]; 8];
            let file = self.applied.len().min(7);
            rows[0][file] = PieceSymbol::from_char('K').unwrap();
            Board::from_rows(&rows).unwrap()
        }
    }

    #[async_trait]
    impl EngineClient for ScriptedEngine {
        async fn load_position(&mut self, _fen: &str) -> EngineResult<()> {
            Ok(())
        }

        async fn current_board(&mut self) -> EngineResult<Board> {
            Ok(self.board())
        }

        async fn reset_position(&mut self) -> EngineResult<()> {
            self.applied.clear();
            Ok(())
        }

        async fn legal_moves(&mut self) -> EngineResult<Vec<Move>> {
            Ok(Vec::new())
        }

        async fn apply_move(&mut self, mv: &Move) -> EngineResult<()> {
            if self.fail_apply_at == Some(self.applied.len()) {
                return Err(EngineError::Transport("link down".into()));
            }
            self.applied.push(mv.clone());
            Ok(())
        }

        async fn perft(&mut self, _depth: u32) -> EngineResult<u64> {
            Ok(1)
        }

        async fn search_best_move(&mut self) -> EngineResult<Option<Move>> {
            let has_move = self
                .script
                .get(self.searches as usize)
                .copied()
                .unwrap_or(false);
            self.searches += 1;
            Ok(has_move.then(|| Move::issue(SessionId(1), format!("m{}", self.searches))))
        }

        async fn dispose(&mut self) -> EngineResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingScheduler {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Scheduler for RecordingScheduler {
        async fn wait_for(&self, duration: Duration, _cancel: &CancelToken) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn runs_ten_paced_iterations() {
        let mut engine = ScriptedEngine::new(vec![true; 20]);
        let mut board = BoardState::default();
        let scheduler = RecordingScheduler::default();
        let mut refreshes = 0;

        let report = block_on(SearchStepper::default().run(
            &mut engine,
            &mut board,
            &scheduler,
            &CancelToken::new(),
            |_| refreshes += 1,
        ))
        .unwrap();

        assert_eq!(
            report,
            StepReport {
                searches: 10,
                moves_applied: 10,
                outcome: StepOutcome::Completed,
            }
        );
        assert_eq!(engine.searches, 10);
        assert_eq!(refreshes, 10);
        let waits = scheduler.waits.lock().unwrap();
        assert_eq!(waits.len(), 9);
        assert!(waits.iter().all(|&d| d == PACING_DELAY));
        assert_eq!(board.get(), &engine.board());
    }

    #[test]
    fn stops_early_when_engine_has_no_move() {
        let mut engine = ScriptedEngine::new(vec![true, true, true, false, true]);
        let mut board = BoardState::default();
        let report = block_on(SearchStepper::default().run(
            &mut engine,
            &mut board,
            &RecordingScheduler::default(),
            &CancelToken::new(),
            |_| {},
        ))
        .unwrap();

        assert_eq!(report.searches, 4);
        assert_eq!(report.moves_applied, 3);
        assert_eq!(report.outcome, StepOutcome::NoMove);
        assert_eq!(board.piece_at(Square::new(3, 0)), PieceSymbol::from_char('K').ok());
    }

    #[test]
    fn terminates_when_every_search_is_empty() {
        let mut engine = ScriptedEngine::new(Vec::new());
        let mut board = BoardState::new(Board::starting_position());
        let scheduler = RecordingScheduler::default();
        let report = block_on(SearchStepper::default().run(
            &mut engine,
            &mut board,
            &scheduler,
            &CancelToken::new(),
            |_| {},
        ))
        .unwrap();

        assert_eq!(report.searches, 1);
        assert_eq!(report.outcome, StepOutcome::NoMove);
        assert!(scheduler.waits.lock().unwrap().is_empty());
        assert_eq!(board.get(), &Board::starting_position());
    }

    #[test]
    fn cancelled_token_stops_before_next_search() {
        let mut engine = ScriptedEngine::new(vec![true; 10]);
        let mut board = BoardState::default();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let report = block_on(SearchStepper::default().run(
            &mut engine,
            &mut board,
            &RecordingScheduler::default(),
            &cancel,
            |_| trigger.cancel(),
        ))
        .unwrap();

        assert_eq!(report.searches, 1);
        assert_eq!(report.outcome, StepOutcome::Cancelled);
    }

    #[test]
    fn engine_failure_keeps_last_fetched_board() {
        let mut engine = ScriptedEngine::new(vec![true; 10]);
        engine.fail_apply_at = Some(2);
        let mut board = BoardState::default();
        let err = block_on(SearchStepper::default().run(
            &mut engine,
            &mut board,
            &RecordingScheduler::default(),
            &CancelToken::new(),
            |_| {},
        ))
        .unwrap_err();

        assert_eq!(err, EngineError::Transport("link down".into()));
        assert_eq!(board.piece_at(Square::new(2, 0)), PieceSymbol::from_char('K').ok());
    }

    #[test]
    fn iteration_bound_is_capped() {
        let stepper = SearchStepper::new(50, Duration::ZERO);
        assert_eq!(stepper.iterations(), SEARCH_ITERATIONS);

        let mut engine = ScriptedEngine::new(vec![true; 60]);
        let mut board = BoardState::default();
        let report = block_on(stepper.run(
            &mut engine,
            &mut board,
            &RecordingScheduler::default(),
            &CancelToken::new(),
            |_| {},
        ))
        .unwrap();

        assert_eq!(report.searches, SEARCH_ITERATIONS);
        assert_eq!(engine.searches, SEARCH_ITERATIONS);
        assert_eq!(report.outcome, StepOutcome::Completed);
    }

    #[test]
    fn cancel_after_last_move_still_completes() {
        let mut engine = ScriptedEngine::new(vec![true; 10]);
        let mut board = BoardState::default();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let mut refreshes = 0;
        let report = block_on(SearchStepper::default().run(
            &mut engine,
            &mut board,
            &RecordingScheduler::default(),
            &cancel,
            |_| {
                refreshes += 1;
                if refreshes == SEARCH_ITERATIONS {
                    trigger.cancel();
                }
            },
        ))
        .unwrap();

        assert_eq!(report.moves_applied, 10);
        assert_eq!(report.outcome, StepOutcome::Completed);
    }

    #[test]
    fn thread_scheduler_wakes_on_cancel() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let started = Instant::now();
        block_on(ThreadScheduler.wait_for(Duration::from_secs(5), &cancel));
        assert!(started.elapsed() < Duration::from_secs(1));

        let started = Instant::now();
        block_on(ThreadScheduler.wait_for(Duration::from_millis(30), &CancelToken::new()));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn thread_scheduler_stops_mid_wait() {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            trigger.cancel();
        });
        let started = Instant::now();
        block_on(ThreadScheduler.wait_for(Duration::from_secs(10), &cancel));
        canceller.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
