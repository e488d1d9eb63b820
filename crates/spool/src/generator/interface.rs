use crate::{error::Result, segment::Segment};

/// A unit of work that fills one segment of a response.
///
/// A generator has no continuation of its own. Each call computes its chunk
/// from `arg` and externally held state, writes at most
/// [`Segment::capacity`] bytes into `out`, and returns. It never suspends;
/// the caller decides how many rounds to run.
///
/// Plain functions of the right shape are generators too:
///
/// ```
/// use spool::{ContentGenerator, Segment};
///
/// fn greet(name: &str, out: &mut Segment<'_>) -> spool::Result<()> {
///     out.format(format_args!("hi {name}"))
/// }
///
/// let mut scratch = [0_u8; 16];
/// let mut out = Segment::new(&mut scratch);
/// greet.generate("bob", &mut out).unwrap();
/// assert_eq!(out.as_bytes(), b"hi bob");
/// ```
pub trait ContentGenerator<A: ?Sized> {
    /// Writes this round's output for `arg` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`](crate::Error::CapacityExceeded)
    /// if the output would not fit.
    fn generate(&self, arg: &A, out: &mut Segment<'_>) -> Result<()>;
}

impl<A, F> ContentGenerator<A> for F
where
    A: ?Sized,
    F: Fn(&A, &mut Segment<'_>) -> Result<()>,
{
    fn generate(&self, arg: &A, out: &mut Segment<'_>) -> Result<()> {
        self(arg, out)
    }
}
