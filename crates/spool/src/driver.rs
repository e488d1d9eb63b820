#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::ContentGenerator,
    segment::Segment,
    status::GenerationResult,
    transport::Transport,
};

/// Per-request state of one connection being served by a script.
///
/// Owns the transport handle and borrows the shared scratch buffer for the
/// lifetime of the request. `cursor` is a general-purpose iteration index
/// that multi-round scripts use to remember where they are between
/// suspensions; it is reset by whichever script uses it and carries no
/// meaning across scripts.
#[derive(Debug)]
pub struct ConnectionContext<'buf, T> {
    transport: T,
    /// Iteration index owned by the running script.
    pub cursor: usize,
    scratch: &'buf mut [u8],
    rounds: usize,
    segments: usize,
}

impl<'buf, T> ConnectionContext<'buf, T>
where
    T: Transport,
{
    /// Creates a context whose segments are exactly `scratch.len()` bytes.
    pub const fn new(transport: T, scratch: &'buf mut [u8]) -> Self {
        Self {
            transport,
            cursor: 0,
            scratch,
            rounds: 0,
            segments: 0,
        }
    }

    /// Largest number of bytes one round can hand to the transport.
    pub const fn capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Rounds completed on this connection so far.
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    /// Rounds that handed a non-empty segment to the transport.
    pub const fn segments_sent(&self) -> usize {
        self.segments
    }

    pub fn is_alive(&self) -> bool {
        self.transport.is_alive()
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Runs one round: invokes `generator` on a fresh segment, hands exactly
    /// the bytes it wrote to the transport, and suspends until the transport
    /// acknowledges them.
    ///
    /// A round that produces no bytes completes without touching the
    /// transport.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionLost`] if the connection is already gone or goes
    ///   away while the round is in flight. The caller must abandon the rest
    ///   of the response.
    /// - [`Error::CapacityExceeded`] if the generator overflowed its segment.
    ///   Nothing is sent for that round.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(round = self.rounds, cursor = self.cursor))
    )]
    pub async fn generator_send<A, G>(&mut self, generator: &G, arg: &A) -> Result<GenerationResult>
    where
        A: ?Sized,
        G: ContentGenerator<A> + ?Sized,
    {
        if !self.transport.is_alive() {
            return Err(Error::ConnectionLost);
        }

        let mut out = Segment::new(self.scratch);
        generator.generate(arg, &mut out)?;
        let result = out.finish();
        debug_assert!(result.bytes_written <= self.scratch.len());

        if !result.is_empty() {
            self.transport
                .send(&self.scratch[..result.bytes_written])
                .await?;
            self.segments += 1;
        }

        self.rounds += 1;

        #[cfg(feature = "tracing")]
        tracing::trace!("round acknowledged ({} bytes)", result.bytes_written);

        Ok(result)
    }

    /// Sends a fixed fragment as a round of its own.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generator_send`].
    pub async fn send_str(&mut self, text: &str) -> Result<GenerationResult> {
        self.generator_send(&fragment, text).await
    }
}

fn fragment(text: &str, out: &mut Segment<'_>) -> Result<()> {
    out.push_str(text)
}
