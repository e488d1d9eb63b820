use core::fmt;

/// A result type defaulting to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `spool` can emit.
///
/// Neither variant is reported to the end user. A script that fails simply
/// produces a short (or empty) response body and the connection is torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Error {
    /// The transport reported that the peer is gone.
    ///
    /// The streaming driver aborts the remaining rounds immediately. Chunks
    /// acknowledged before the loss are never resent.
    ConnectionLost,

    /// A generator tried to write past the end of its [`Segment`].
    ///
    /// The offending write is rolled back and nothing from that round is
    /// handed to the transport. Generators bound their output so this never
    /// happens with well-formed external data.
    ///
    /// [`Segment`]: crate::Segment
    CapacityExceeded {
        /// Size of the segment the generator was given.
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl core::error::Error for Error {}
