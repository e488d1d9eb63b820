//! # Server
//!
//! A single-threaded, cooperative accept loop. Each client gets a task on
//! the current thread's `LocalSet` that reads one request identifier, runs
//! the matching script and closes the connection. Tasks share one [`Board`]
//! and one [`ScriptState`], so the refresh counter and the traced path are
//! process-wide.
//!
//! Shutdown is driven by a [`CancellationToken`]: the loop stops accepting,
//! waits up to `SHUTDOWN_TIMEOUT` for in-flight responses, and returns.

pub mod board;
pub mod config;
pub mod connection;
pub mod error;
pub mod telemetry;

use crate::server::{
    board::Board,
    config::ServerConfig,
    connection::{Limits, serve},
};
use spool::{Heading, PathTracker, ScriptState};
use std::rc::Rc;
use tokio::{
    net::{TcpListener, TcpStream},
    time::timeout,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::Instrument;

pub async fn run(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let local_port = listener.local_addr()?.port();
    let board = Rc::new(Board::from_config(&config));
    tracing::info!(
        "indexed {} file(s) under {}",
        board.indexed_files(),
        config.file_root.display()
    );
    let state = Rc::new(ScriptState::new(PathTracker::with_conflict(
        config.origin,
        Heading::East,
        config.turn_conflict,
    )));
    let limits = Limits {
        segment_capacity: config.segment_capacity,
        max_identifier_len: config.max_identifier_len,
    };
    let tracker = TaskTracker::new();

    loop {
        let (stream, peer) = tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("accept failed: {e}");
                    continue;
                }
            },
        };

        let Some(slot) = board.register(peer, local_port) else {
            tracing::warn!(
                "refusing {peer}: all {} connection slots in use",
                config.max_connections
            );
            continue;
        };

        let span = tracing::info_span!("connection", %peer, slot = slot.index());
        let board = Rc::clone(&board);
        let state = Rc::clone(&state);
        tracker.spawn_local(
            async move {
                let _slot = slot;
                handle(stream, &board, &state, limits).await;
            }
            .instrument(span),
        );
    }

    tracker.close();
    tracing::info!(
        "draining {} in-flight connection(s) for up to {:?}",
        tracker.len(),
        config.shutdown_timeout
    );
    match timeout(config.shutdown_timeout, tracker.wait()).await {
        Ok(()) => tracing::debug!("all connections drained"),
        Err(_) => tracing::warn!(
            "drain timed out ({} connections still active)",
            board.active_connections()
        ),
    }

    Ok(())
}

async fn handle(stream: TcpStream, board: &Board, state: &ScriptState, limits: Limits) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("set_nodelay failed: {e}");
    }

    match serve(stream, board, state, limits).await {
        Ok(served) => tracing::debug!(
            "{} finished: {} round(s), {} byte(s)",
            served.script,
            served.rounds,
            served.bytes_sent
        ),
        Err(e) => {
            tracing::warn!("request failed: {e}");
            board.set_status(e.to_string());
        }
    }
}
