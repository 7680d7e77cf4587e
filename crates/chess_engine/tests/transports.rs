use std::time::Duration;

use async_trait::async_trait;
use chess_core::{
    AppConfig, Board, BoardState, CancelToken, EngineClient, EngineError, Scheduler,
    SearchStepper, StepOutcome, Transport,
};
use chess_engine::{connect, DirectClient, Engine};
use futures_lite::future::block_on;

struct NoDelay;

#[async_trait]
impl Scheduler for NoDelay {
    async fn wait_for(&self, _duration: Duration, _cancel: &CancelToken) {}
}

fn clients() -> Vec<(Transport, Box<dyn EngineClient>)> {
    [Transport::Direct, Transport::Command]
        .into_iter()
        .map(|transport| {
            let config = AppConfig {
                transport,
                search_depth: 2,
                ..AppConfig::default()
            };
            (transport, connect(&config).unwrap())
        })
        .collect()
}

fn rank(board: &Board, rank: usize) -> String {
    board.rank(rank).iter().map(|s| s.to_char()).collect()
}

#[test]
fn reset_then_current_board_is_start_position() {
    for (transport, mut client) in clients() {
        block_on(async {
            client.load_position("4k3/8/8/8/8/8/8/4K3 w - - 0 1").await.unwrap();
            client.reset_position().await.unwrap();
            let board = client.current_board().await.unwrap();
            assert_eq!(rank(&board, 0), "rnbqkbnr", "{transport:?}");
            assert_eq!(rank(&board, 1), "pppppppp", "{transport:?}");
            assert_eq!(rank(&board, 6), "PPPPPPPP", "{transport:?}");
            assert_eq!(rank(&board, 7), "RNBQKBNR", "{transport:?}");
            client.dispose().await.unwrap();
        });
    }
}

#[test]
fn perft_is_pure_and_counts_nodes() {
    for (transport, mut client) in clients() {
        block_on(async {
            assert_eq!(client.perft(0).await.unwrap(), 1, "{transport:?}");
            assert_eq!(client.perft(1).await.unwrap(), 20, "{transport:?}");
            assert_eq!(client.perft(3).await.unwrap(), 8902, "{transport:?}");
            assert_eq!(
                client.current_board().await.unwrap(),
                Board::starting_position()
            );
            client.dispose().await.unwrap();
        });
    }
}

#[test]
fn first_legal_move_can_be_applied() {
    for (transport, mut client) in clients() {
        block_on(async {
            let moves = client.legal_moves().await.unwrap();
            assert_eq!(moves.len(), 20, "{transport:?}");
            client.apply_move(&moves[0]).await.unwrap();
            let board = client.current_board().await.unwrap();
            assert_ne!(board, Board::starting_position(), "{transport:?}");
            assert_eq!(board.occupied_count(), 32);
            client.dispose().await.unwrap();
        });
    }
}

#[test]
fn move_from_other_session_is_rejected() {
    let mut foreign_source = DirectClient::new(Engine::new());
    let foreign = block_on(foreign_source.legal_moves()).unwrap().remove(0);

    for (transport, mut client) in clients() {
        block_on(async {
            assert_eq!(
                client.apply_move(&foreign).await,
                Err(EngineError::InvalidMoveToken),
                "{transport:?}"
            );
            assert_eq!(
                client.current_board().await.unwrap(),
                Board::starting_position()
            );
            client.dispose().await.unwrap();
        });
    }
    block_on(foreign_source.dispose()).unwrap();
}

#[test]
fn invalid_fen_surfaces_as_error() {
    for (transport, mut client) in clients() {
        block_on(async {
            let err = client.load_position("rnbqkbnr/pppppppp w").await.unwrap_err();
            assert!(matches!(err, EngineError::InvalidPosition(_)), "{transport:?}: {err}");
            client.dispose().await.unwrap();
        });
    }
}

#[test]
fn disposed_client_refuses_calls() {
    for (transport, mut client) in clients() {
        block_on(async {
            client.dispose().await.unwrap();
            assert_eq!(
                client.current_board().await,
                Err(EngineError::Disposed),
                "{transport:?}"
            );
            assert_eq!(client.dispose().await, Err(EngineError::Disposed));
        });
    }
}

#[test]
fn stepper_plays_moves_through_either_transport() {
    for (transport, mut client) in clients() {
        block_on(async {
            let mut board = BoardState::new(Board::starting_position());
            let mut seen = Vec::new();
            let report = SearchStepper::new(4, Duration::ZERO)
                .run(
                    client.as_mut(),
                    &mut board,
                    &NoDelay,
                    &CancelToken::new(),
                    |b: &Board| seen.push(*b),
                )
                .await
                .unwrap();

            assert_eq!(report.searches, 4, "{transport:?}");
            assert_eq!(report.moves_applied, 4);
            assert_eq!(report.outcome, StepOutcome::Completed);
            assert_eq!(seen.len(), 4);
            assert_eq!(board.get(), &client.current_board().await.unwrap());
            client.dispose().await.unwrap();
        });
    }
}

#[test]
fn stepper_stops_in_checkmate() {
    for (transport, mut client) in clients() {
        block_on(async {
            // Black is already mated.
            client
                .load_position("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1")
                .await
                .unwrap();
            let mut board = BoardState::default();
            let report = SearchStepper::default()
                .run(client.as_mut(), &mut board, &NoDelay, &CancelToken::new(), |_| {})
                .await
                .unwrap();

            assert_eq!(report.searches, 1, "{transport:?}");
            assert_eq!(report.outcome, StepOutcome::NoMove);
            assert_eq!(board.get(), &Board::default());
            client.dispose().await.unwrap();
        });
    }
}
