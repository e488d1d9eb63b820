//! Errors raised while serving a single connection.
//!
//! None of these stop the server. The accept loop logs them, records them in
//! the board's status message and moves on to the next client.

pub type Result<T> = core::result::Result<T, ServerError>;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// Reading the request failed at the socket level.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A script round failed; the rest of the response was abandoned.
    #[error("stream error: {0:?}")]
    Stream(#[from] spool::Error),

    /// The request line could not be turned into an identifier.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}
