//! Bevy front end: draws the board, lets pieces be dragged, and drives the
//! engine through the controls under the board.

use std::sync::Mutex;

use bevy::{
    prelude::*,
    tasks::Task,
    window::{PresentMode, WindowResolution},
};
use chess_core::{
    AppConfig, Board, BoardState, CancelToken, DragController, EngineClient,
};
use crossbeam_channel::Receiver;

mod actions;
mod input;
mod layout;
mod render;

pub use actions::UiAction;
pub use layout::{board_rect, BOARD_ORIGIN};

/// Owns the injected engine client for the lifetime of the app.
pub struct ChessUiPlugin {
    config: AppConfig,
    engine: Mutex<Option<Box<dyn EngineClient>>>,
}

impl ChessUiPlugin {
    pub fn new(config: AppConfig, engine: Box<dyn EngineClient>) -> Self {
        Self {
            config,
            engine: Mutex::new(Some(engine)),
        }
    }
}

#[derive(Resource, Clone)]
pub struct UiSettings(pub AppConfig);

/// Rendered board. Every change to it respawns the piece sprites.
#[derive(Resource, Default)]
pub struct BoardView(pub BoardState);

#[derive(Resource)]
pub struct DragState(pub DragController<Entity>);

#[derive(Resource, Default)]
pub struct StatusLine(pub String);

/// Text typed for "Load FEN". Starts empty; Delete clears it.
#[derive(Resource, Default)]
pub struct FenInput(pub String);

/// The single engine client and whatever is currently borrowing it.
///
/// A running job takes the client by value and hands it back when done, so
/// at most one engine call sequence is ever in flight.
#[derive(Resource)]
pub struct EngineSlot {
    client: Option<Box<dyn EngineClient>>,
    pending: Option<Task<actions::JobDone>>,
    cancel: CancelToken,
    refreshes: Option<Receiver<Board>>,
}

impl EngineSlot {
    fn new(client: Option<Box<dyn EngineClient>>) -> Self {
        Self {
            client,
            pending: None,
            cancel: CancelToken::new(),
            refreshes: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

impl Plugin for ChessUiPlugin {
    fn build(&self, app: &mut App) {
        let client = match self.engine.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if client.is_none() {
            error!("chess ui plugin built without an engine client");
        }

        let (width, height) = layout::window_size();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Chessboard".into(),
                resolution: WindowResolution::new(width, height),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::rgb(0.12, 0.12, 0.14)))
        .insert_resource(UiSettings(self.config.clone()))
        .insert_resource(DragState(DragController::new(layout::board_rect())))
        .insert_resource(EngineSlot::new(client))
        .init_resource::<BoardView>()
        .init_resource::<StatusLine>()
        .init_resource::<FenInput>()
        .add_systems(
            Startup,
            (
                render::setup,
                render::spawn_controls,
                actions::initial_sync,
            ),
        )
        .add_systems(
            Update,
            (
                actions::type_fen,
                actions::handle_buttons,
                actions::poll_engine,
                input::handle_pointer,
                render::handle_resize,
                render::sync_pieces,
                render::update_texts,
                render::style_buttons,
            )
                .chain(),
        )
        .add_systems(Last, actions::dispose_on_exit);
    }
}
