use ::tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    error::{Error, Result},
    transport::Transport,
};

/// An implementation of [`Transport`] over any Tokio [`AsyncWrite`].
///
/// A segment counts as acknowledged once it has been written in full and the
/// writer flushed. The first I/O failure marks the connection dead; every
/// later `send` fails fast with [`Error::ConnectionLost`].
#[derive(Debug)]
pub struct TokioTransport<W> {
    writer: W,
    alive: bool,
    bytes_sent: u64,
}

impl<W> TokioTransport<W>
where
    W: AsyncWrite + Unpin,
{
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            alive: true,
            bytes_sent: 0,
        }
    }

    /// Total bytes acknowledged so far.
    pub const fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Shuts the write half down, ending the response.
    pub async fn close(&mut self) {
        if self.alive && self.writer.shutdown().await.is_err() {
            self.alive = false;
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> Transport for TokioTransport<W>
where
    W: AsyncWrite + Unpin,
{
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.alive {
            return Err(Error::ConnectionLost);
        }

        let written = async {
            self.writer.write_all(bytes).await?;
            self.writer.flush().await
        }
        .await;

        match written {
            Ok(()) => {
                self.bytes_sent += bytes.len() as u64;
                Ok(())
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("transport write failed: {_e}");
                self.alive = false;
                Err(Error::ConnectionLost)
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}
