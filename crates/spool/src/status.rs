/// The outcome of one generator invocation.
///
/// Produced fresh by every round of
/// [`ConnectionContext::generator_send`](crate::ConnectionContext::generator_send)
/// and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationResult {
    /// Number of bytes the generator left in the segment, always
    /// `<= capacity`.
    pub bytes_written: usize,
}

impl GenerationResult {
    /// `true` when the generator produced nothing this round.
    pub const fn is_empty(&self) -> bool {
        self.bytes_written == 0
    }
}
