use std::error::Error;
use std::path::PathBuf;

use bevy::prelude::*;
use chess_core::{
    AppConfig, Board, BoardState, CancelToken, EngineClient, EngineResult, SearchStepper,
    StepReport, ThreadScheduler, Transport,
};
use chess_core::stepper::SEARCH_ITERATIONS;
use chess_ui::ChessUiPlugin;
use clap::{Parser, Subcommand, ValueEnum};
use futures_lite::future::block_on;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chess board with a synchronised engine", long_about = None)]
struct Args {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    transport: Option<TransportArg>,

    /// Position to load instead of the standard start
    #[arg(long)]
    fen: Option<String>,

    /// Engine search depth
    #[arg(long)]
    depth: Option<u8>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Mode {
    /// Interactive board (default)
    Gui,
    /// Count leaf nodes and exit
    Perft {
        #[arg(short, long, default_value_t = 3)]
        depth: u32,
    },
    /// Let the engine play against itself, logging each position
    Watch {
        /// Searches to run, at most 10
        #[arg(
            short,
            long,
            default_value_t = SEARCH_ITERATIONS,
            value_parser = clap::value_parser!(u32).range(1..=SEARCH_ITERATIONS as i64)
        )]
        iterations: u32,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum TransportArg {
    Direct,
    Command,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Direct => Transport::Direct,
            TransportArg::Command => Transport::Command,
        }
    }
}

fn load_config(args: &Args) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(transport) = args.transport {
        config.transport = transport.into();
    }
    if let Some(fen) = &args.fen {
        config.start_fen = Some(fen.clone());
    }
    if let Some(depth) = args.depth {
        config.search_depth = depth;
    }
    Ok(config)
}

async fn prepare(client: &mut dyn EngineClient, config: &AppConfig) -> EngineResult<Board> {
    match &config.start_fen {
        Some(fen) => client.load_position(fen).await?,
        None => client.reset_position().await?,
    }
    client.current_board().await
}

async fn perft(client: &mut dyn EngineClient, config: &AppConfig, depth: u32) -> EngineResult<u64> {
    prepare(client, config).await?;
    client.perft(depth).await
}

async fn watch(
    client: &mut dyn EngineClient,
    config: &AppConfig,
    iterations: u32,
) -> EngineResult<StepReport> {
    let mut board = BoardState::new(prepare(client, config).await?);
    log::info!("starting position\n{}", board.get());

    SearchStepper::new(iterations, config.pacing())
        .run(
            client,
            &mut board,
            &ThreadScheduler,
            &CancelToken::new(),
            |board: &Board| log::info!("\n{board}"),
        )
        .await
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mode = args.mode.unwrap_or(Mode::Gui);

    if !matches!(mode, Mode::Gui) {
        // The GUI logs through bevy's own subscriber.
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = load_config(&args)?;
    let mut client = chess_engine::connect(&config)?;

    match mode {
        Mode::Gui => {
            App::new()
                .add_plugins(ChessUiPlugin::new(config, client))
                .run();
        }
        Mode::Perft { depth } => {
            let result = block_on(perft(client.as_mut(), &config, depth));
            block_on(client.dispose())?;
            println!("perft({depth}) = {}", result?);
        }
        Mode::Watch { iterations } => {
            let result = block_on(watch(client.as_mut(), &config, iterations));
            block_on(client.dispose())?;
            let report = result?;
            log::info!(
                "{} searches, {} moves, {:?}",
                report.searches,
                report.moves_applied,
                report.outcome
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_iterations_are_bounded() {
        let args = Args::try_parse_from(["chessboard", "watch"]).unwrap();
        assert!(matches!(args.mode, Some(Mode::Watch { iterations: 10 })));

        let args = Args::try_parse_from(["chessboard", "watch", "--iterations", "4"]).unwrap();
        assert!(matches!(args.mode, Some(Mode::Watch { iterations: 4 })));

        assert!(Args::try_parse_from(["chessboard", "watch", "--iterations", "50"]).is_err());
        assert!(Args::try_parse_from(["chessboard", "watch", "--iterations", "0"]).is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = Args::try_parse_from([
            "chessboard",
            "--transport",
            "direct",
            "--depth",
            "2",
            "perft",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.transport, Transport::Direct);
        assert_eq!(config.search_depth, 2);
        assert_eq!(config.start_fen, None);
    }
}
