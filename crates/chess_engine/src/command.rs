//! Command-invocation transport.
//!
//! Each client call becomes a named JSON command sent to a host worker that
//! owns the engine, the way an app shell would expose it to a web view. The
//! client awaits the JSON reply before returning, so calls from one client
//! never interleave.

use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use chess_core::{Board, EngineClient, EngineError, EngineResult, Move};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Moves,
    MakeMove { mv: Move },
    RecievePosition,
    ResetPosition,
    LoadFen { fen: String },
    GetPerft { depth: u32 },
    Search,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Moves => "moves",
            Command::MakeMove { .. } => "make_move",
            Command::RecievePosition => "recieve_position",
            Command::ResetPosition => "reset_position",
            Command::LoadFen { .. } => "load_fen",
            Command::GetPerft { .. } => "get_perft",
            Command::Search => "search",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Done,
    Board(Board),
    Moves(Vec<Move>),
    Count(u64),
    BestMove(Option<Move>),
}

/// Runs one command against the engine.
pub fn dispatch(engine: &mut Engine, command: Command) -> EngineResult<Reply> {
    match command {
        Command::Moves => Ok(Reply::Moves(engine.moves())),
        Command::MakeMove { mv } => engine.make_move(&mv).map(|()| Reply::Done),
        Command::RecievePosition => Ok(Reply::Board(engine.recieve_position())),
        Command::ResetPosition => {
            engine.reset_position();
            Ok(Reply::Done)
        }
        Command::LoadFen { fen } => engine.load_fen(&fen).map(|()| Reply::Done),
        Command::GetPerft { depth } => Ok(Reply::Count(engine.start_perft(depth))),
        Command::Search => Ok(Reply::BestMove(engine.search())),
    }
}

/// Handles one raw request: decode, dispatch, encode.
pub fn handle_request(engine: &mut Engine, payload: &str) -> String {
    let outcome = serde_json::from_str::<Command>(payload)
        .map_err(|err| EngineError::Transport(format!("undecodable command: {err}")))
        .and_then(|command| {
            log::debug!("command {}", command.name());
            dispatch(engine, command)
        });

    if let Err(err) = &outcome {
        log::warn!("command failed: {err}");
    }

    serde_json::to_string(&outcome).unwrap_or_else(|err| {
        log::error!("failed to encode reply: {err}");
        let fallback: EngineResult<Reply> =
            Err(EngineError::Transport(format!("unencodable reply: {err}")));
        serde_json::to_string(&fallback).unwrap_or_default()
    })
}

struct Envelope {
    payload: String,
    reply: oneshot::Sender<String>,
}

/// Starts a host worker that owns `engine` and returns a client connected to
/// it. The worker stops once the client is disposed or dropped.
pub fn spawn_host(engine: Engine) -> EngineResult<CommandClient> {
    let (requests, inbox) = unbounded::<Envelope>();
    let session = engine.session();

    let worker = thread::Builder::new()
        .name("engine-host".into())
        .spawn(move || run_host(engine, inbox))
        .map_err(|err| EngineError::Transport(format!("failed to start engine host: {err}")))?;

    log::info!("engine host started for session {session}");
    Ok(CommandClient {
        requests: Some(requests),
        worker: Some(worker),
    })
}

fn run_host(mut engine: Engine, inbox: Receiver<Envelope>) {
    while let Ok(Envelope { payload, reply }) = inbox.recv() {
        let response = handle_request(&mut engine, &payload);
        if reply.send(response).is_err() {
            log::debug!("client went away before reply");
        }
    }
    log::info!("engine host for session {} stopped", engine.session());
}

pub struct CommandClient {
    requests: Option<Sender<Envelope>>,
    worker: Option<JoinHandle<()>>,
}

impl CommandClient {
    /// One round trip.
    pub async fn invoke(&mut self, command: Command) -> EngineResult<Reply> {
        let requests = self.requests.as_ref().ok_or(EngineError::Disposed)?;
        let name = command.name();
        let payload = serde_json::to_string(&command)
            .map_err(|err| EngineError::Transport(format!("cannot encode `{name}`: {err}")))?;

        let (reply, response) = oneshot::channel();
        requests
            .send(Envelope { payload, reply })
            .map_err(|_| EngineError::Transport("engine host has stopped".into()))?;

        let raw = response
            .await
            .map_err(|_| EngineError::Transport(format!("no reply to `{name}`")))?;
        serde_json::from_str::<EngineResult<Reply>>(&raw)
            .map_err(|err| EngineError::Transport(format!("undecodable reply to `{name}`: {err}")))?
    }
}

fn unexpected(command: &str, reply: Reply) -> EngineError {
    EngineError::Transport(format!("unexpected reply to `{command}`: {reply:?}"))
}

#[async_trait]
impl EngineClient for CommandClient {
    async fn load_position(&mut self, fen: &str) -> EngineResult<()> {
        match self.invoke(Command::LoadFen { fen: fen.to_owned() }).await? {
            Reply::Done => Ok(()),
            other => Err(unexpected("load_fen", other)),
        }
    }

    async fn current_board(&mut self) -> EngineResult<Board> {
        match self.invoke(Command::RecievePosition).await? {
            Reply::Board(board) => Ok(board),
            other => Err(unexpected("recieve_position", other)),
        }
    }

    async fn reset_position(&mut self) -> EngineResult<()> {
        match self.invoke(Command::ResetPosition).await? {
            Reply::Done => Ok(()),
            other => Err(unexpected("reset_position", other)),
        }
    }

    async fn legal_moves(&mut self) -> EngineResult<Vec<Move>> {
        match self.invoke(Command::Moves).await? {
            Reply::Moves(moves) => Ok(moves),
            other => Err(unexpected("moves", other)),
        }
    }

    async fn apply_move(&mut self, mv: &Move) -> EngineResult<()> {
        match self.invoke(Command::MakeMove { mv: mv.clone() }).await? {
            Reply::Done => Ok(()),
            other => Err(unexpected("make_move", other)),
        }
    }

    async fn perft(&mut self, depth: u32) -> EngineResult<u64> {
        match self.invoke(Command::GetPerft { depth }).await? {
            Reply::Count(nodes) => Ok(nodes),
            other => Err(unexpected("get_perft", other)),
        }
    }

    async fn search_best_move(&mut self) -> EngineResult<Option<Move>> {
        match self.invoke(Command::Search).await? {
            Reply::BestMove(mv) => Ok(mv),
            other => Err(unexpected("search", other)),
        }
    }

    async fn dispose(&mut self) -> EngineResult<()> {
        // Closing the channel ends the host loop.
        drop(self.requests.take().ok_or(EngineError::Disposed)?);
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| EngineError::Transport("engine host panicked".into()))?;
        }
        log::info!("disposed command engine client");
        Ok(())
    }
}

impl Drop for CommandClient {
    fn drop(&mut self) {
        if self.requests.is_some() {
            log::warn!("command engine client dropped without dispose; host will stop on its own");
        }
    }
}
