pub mod command;
pub mod direct;
pub mod engine;
pub mod evaluation;
pub mod search;

pub use command::{spawn_host, Command, CommandClient, Reply};
pub use direct::DirectClient;
pub use engine::{perft, Engine, DEFAULT_SEARCH_DEPTH, START_FEN};
pub use evaluation::evaluate_position;
pub use search::search_best_move;

use chess_core::{AppConfig, EngineClient, EngineResult, Transport};

/// Builds the one engine client the application uses, over the configured
/// transport. The caller owns it and must dispose it.
pub fn connect(config: &AppConfig) -> EngineResult<Box<dyn EngineClient>> {
    let engine = Engine::with_depth(config.search_depth);
    let client: Box<dyn EngineClient> = match config.transport {
        Transport::Direct => Box::new(DirectClient::new(engine)),
        Transport::Command => Box::new(spawn_host(engine)?),
    };
    log::info!("engine client connected over {:?} transport", config.transport);
    Ok(client)
}
