//! Serving one client: read the request identifier, dispatch it, and stream
//! the script's response through the core driver.

use crate::server::{
    board::Board,
    error::{Result, ServerError},
};
use spool::{ConnectionContext, DispatchTable, Script, ScriptState, TokioTransport};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};

/// What a finished response amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Served {
    pub script: Script,
    /// Rounds the script completed, including empty ones.
    pub rounds: usize,
    /// Rounds that put bytes on the wire.
    pub segments: usize,
    pub bytes_sent: u64,
}

/// Per-server settings every connection needs.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub segment_capacity: usize,
    pub max_identifier_len: usize,
}

/// Reads one request line from `io` and streams the matching script's
/// output back, one acknowledged segment per round. The write half is shut
/// down once the response is complete.
///
/// # Errors
///
/// - [`ServerError::InvalidRequest`] if the line is too long or not UTF-8.
/// - [`ServerError::Io`] if reading the request fails.
/// - [`ServerError::Stream`] if a round fails; nothing more is sent.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn serve<S>(io: S, board: &Board, state: &ScriptState, limits: Limits) -> Result<Served>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, writer) = tokio::io::split(io);
    let identifier = read_identifier(reader, limits.max_identifier_len).await?;
    board.record_request();

    let script = DispatchTable::builtin().lookup(&identifier);
    tracing::debug!("dispatching `{identifier}` to {script}");

    let mut scratch = vec![0_u8; limits.segment_capacity];
    let mut ctx = ConnectionContext::new(TokioTransport::new(writer), &mut scratch);
    let outcome = script.run(&mut ctx, board, state, &identifier).await;

    let rounds = ctx.rounds();
    let segments = ctx.segments_sent();
    let mut transport = ctx.into_transport();
    board.record_sent(segments);

    if let Err(e) = outcome {
        if matches!(e, spool::Error::ConnectionLost) {
            board.record_reset();
        }
        return Err(e.into());
    }

    transport.close().await;
    Ok(Served {
        script,
        rounds,
        segments,
        bytes_sent: transport.bytes_sent(),
    })
}

/// Reads the identifier line, without its `\n` or `\r\n` terminator.
///
/// End of input also terminates the line, so a client may half-close
/// instead of sending a newline.
async fn read_identifier<R>(reader: R, max_len: usize) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    // Room for the longest identifier plus its terminator, and one byte more
    // to tell an over-long line apart.
    let limit = u64::try_from(max_len.saturating_add(3)).unwrap_or(u64::MAX);
    let mut line = Vec::new();
    BufReader::new(reader.take(limit))
        .read_until(b'\n', &mut line)
        .await?;

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }

    if line.len() > max_len {
        return Err(ServerError::InvalidRequest {
            reason: format!("identifier exceeds {max_len} bytes"),
        });
    }

    String::from_utf8(line).map_err(|_| ServerError::InvalidRequest {
        reason: "identifier is not valid UTF-8".to_string(),
    })
}
