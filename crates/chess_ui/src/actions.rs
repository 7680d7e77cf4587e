use bevy::{
    app::AppExit,
    prelude::*,
    tasks::AsyncComputeTaskPool,
};
use chess_core::{
    Board, BoardState, CancelToken, EngineClient, EngineResult, SearchStepper, StepOutcome,
    ThreadScheduler,
};
use crossbeam_channel::{unbounded, Sender};
use futures_lite::future;

use crate::{BoardView, EngineSlot, FenInput, StatusLine, UiSettings};

pub const PERFT_DEPTH: u32 = 3;

/// Matches the limit of the position text field.
const FEN_MAX_LEN: usize = 200;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    LoadFen,
    MakeMove,
    Perft,
    Search,
    Reset,
    Stop,
}

impl UiAction {
    pub const ALL: [UiAction; 6] = [
        UiAction::LoadFen,
        UiAction::MakeMove,
        UiAction::Perft,
        UiAction::Search,
        UiAction::Reset,
        UiAction::Stop,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UiAction::LoadFen => "Load FEN",
            UiAction::MakeMove => "Make move",
            UiAction::Perft => "Perft",
            UiAction::Search => "Search",
            UiAction::Reset => "Reset",
            UiAction::Stop => "Stop",
        }
    }
}

enum Job {
    Initialize(Option<String>),
    LoadFen(String),
    MakeMove,
    Perft(u32),
    Search(SearchStepper),
    Reset,
}

impl Job {
    fn label(&self) -> &'static str {
        match self {
            Job::Initialize(_) => "connect",
            Job::LoadFen(_) => "load position",
            Job::MakeMove => "make move",
            Job::Perft(_) => "perft",
            Job::Search(_) => "search",
            Job::Reset => "reset",
        }
    }
}

struct JobOutput {
    board: Option<Board>,
    message: String,
}

/// A finished job, carrying the client back to its slot.
pub struct JobDone {
    client: Box<dyn EngineClient>,
    label: &'static str,
    result: EngineResult<JobOutput>,
}

async fn run_job(
    client: &mut dyn EngineClient,
    job: Job,
    mut board: BoardState,
    cancel: CancelToken,
    refreshes: Sender<Board>,
) -> EngineResult<JobOutput> {
    match job {
        Job::Initialize(fen) => {
            match fen {
                Some(fen) => client.load_position(&fen).await?,
                None => client.reset_position().await?,
            }
            Ok(JobOutput {
                board: Some(client.current_board().await?),
                message: "ready".into(),
            })
        }
        Job::LoadFen(fen) => {
            client.load_position(&fen).await?;
            Ok(JobOutput {
                board: Some(client.current_board().await?),
                message: "position loaded".into(),
            })
        }
        Job::MakeMove => {
            let moves = client.legal_moves().await?;
            let Some(first) = moves.first() else {
                return Ok(JobOutput {
                    board: None,
                    message: "no legal moves".into(),
                });
            };
            client.apply_move(first).await?;
            Ok(JobOutput {
                board: Some(client.current_board().await?),
                message: format!("played {first}"),
            })
        }
        Job::Perft(depth) => {
            let nodes = client.perft(depth).await?;
            info!("perft({depth}) = {nodes}");
            Ok(JobOutput {
                board: None,
                message: format!("perft({depth}) = {nodes}"),
            })
        }
        Job::Search(stepper) => {
            let report = stepper
                .run(client, &mut board, &ThreadScheduler, &cancel, |b: &Board| {
                    // The receiver is gone only when the app is shutting down.
                    let _ = refreshes.send(*b);
                })
                .await?;
            let message = match report.outcome {
                StepOutcome::Completed => format!("played {} moves", report.moves_applied),
                StepOutcome::NoMove => {
                    format!("game over after {} moves", report.moves_applied)
                }
                StepOutcome::Cancelled => format!("stopped after {} moves", report.moves_applied),
            };
            Ok(JobOutput {
                board: Some(*board.get()),
                message,
            })
        }
        Job::Reset => {
            client.reset_position().await?;
            Ok(JobOutput {
                board: Some(client.current_board().await?),
                message: "reset".into(),
            })
        }
    }
}

fn start_job(slot: &mut EngineSlot, job: Job, board: &BoardState, status: &mut StatusLine) {
    let label = job.label();
    if slot.is_busy() {
        status.0 = format!("engine busy, {label} ignored");
        return;
    }
    let Some(mut client) = slot.client.take() else {
        status.0 = "engine unavailable".into();
        return;
    };

    let cancel = CancelToken::new();
    slot.cancel = cancel.clone();
    let (sender, receiver) = unbounded();
    slot.refreshes = Some(receiver);

    let board = board.clone();
    let thread_pool = AsyncComputeTaskPool::get();
    slot.pending = Some(thread_pool.spawn(async move {
        let result = run_job(client.as_mut(), job, board, cancel, sender).await;
        JobDone {
            client,
            label,
            result,
        }
    }));
    debug!("started {label}");
    status.0 = format!("{label}...");
}

pub fn initial_sync(
    settings: Res<UiSettings>,
    view: Res<BoardView>,
    mut slot: ResMut<EngineSlot>,
    mut status: ResMut<StatusLine>,
) {
    let job = Job::Initialize(settings.0.start_fen.clone());
    start_job(&mut slot, job, &view.0, &mut status);
}

pub fn handle_buttons(
    interactions: Query<(&Interaction, &UiAction), (Changed<Interaction>, With<Button>)>,
    settings: Res<UiSettings>,
    fen: Res<FenInput>,
    view: Res<BoardView>,
    mut slot: ResMut<EngineSlot>,
    mut status: ResMut<StatusLine>,
) {
    for (interaction, action) in &interactions {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let job = match action {
            UiAction::LoadFen => Job::LoadFen(fen.0.trim().to_owned()),
            UiAction::MakeMove => Job::MakeMove,
            UiAction::Perft => Job::Perft(PERFT_DEPTH),
            UiAction::Search => Job::Search(SearchStepper::with_delay(settings.0.pacing())),
            UiAction::Reset => Job::Reset,
            UiAction::Stop => {
                if slot.is_busy() {
                    slot.cancel.cancel();
                    status.0 = "stopping...".into();
                }
                continue;
            }
        };
        start_job(&mut slot, job, &view.0, &mut status);
    }
}

pub fn type_fen(
    mut characters: EventReader<ReceivedCharacter>,
    keys: Res<Input<KeyCode>>,
    mut fen: ResMut<FenInput>,
) {
    for event in characters.read() {
        let c = event.char;
        if (c.is_ascii_graphic() || c == ' ') && fen.0.len() < FEN_MAX_LEN {
            fen.0.push(c);
        }
    }
    if keys.just_pressed(KeyCode::Delete) {
        fen.0.clear();
    } else if keys.just_pressed(KeyCode::Back) {
        fen.0.pop();
    }
}

/// Applies live search refreshes, then collects a finished job.
pub fn poll_engine(
    mut slot: ResMut<EngineSlot>,
    mut view: ResMut<BoardView>,
    mut status: ResMut<StatusLine>,
) {
    if let Some(latest) = slot.refreshes.as_ref().and_then(|rx| rx.try_iter().last()) {
        view.0.replace(latest);
    }

    if !slot.is_busy() {
        return;
    }
    let Some(task) = slot.pending.as_mut() else {
        return;
    };
    let Some(done) = future::block_on(future::poll_once(task)) else {
        return;
    };

    slot.pending = None;
    slot.refreshes = None;
    slot.client = Some(done.client);

    match done.result {
        Ok(output) => {
            if let Some(board) = output.board {
                view.0.replace(board);
            }
            status.0 = output.message;
        }
        Err(err) => {
            warn!("{} failed: {err}", done.label);
            status.0 = format!("{} failed: {err}", done.label);
        }
    }
}

/// Stops any running job and releases the engine before the app exits.
pub fn dispose_on_exit(mut exits: EventReader<AppExit>, mut slot: ResMut<EngineSlot>) {
    if exits.read().next().is_none() {
        return;
    }

    slot.cancel.cancel();
    if let Some(task) = slot.pending.take() {
        let done = future::block_on(task);
        slot.client = Some(done.client);
    }
    if let Some(mut client) = slot.client.take() {
        match future::block_on(client.dispose()) {
            Ok(()) => info!("engine client released"),
            Err(err) => error!("failed to release engine client: {err}"),
        }
    }
}
