use core::fmt;

use crate::{
    error::{Error, Result},
    status::GenerationResult,
};

/// Default segment capacity, one Ethernet-sized TCP maximum segment.
pub const DEFAULT_SEGMENT_CAPACITY: usize = 1460;

/// A bounded, append-only view over the shared send buffer.
///
/// Every generator receives a fresh `Segment` that starts empty and can hold
/// at most [`Segment::capacity`] bytes. Appends are all-or-nothing: a write
/// that does not fit leaves the segment untouched and returns
/// [`Error::CapacityExceeded`], so a round never ends with half of a
/// formatted value in the buffer.
///
/// # Example
/// ```
/// use spool::Segment;
///
/// let mut scratch = [0_u8; 8];
/// let mut out = Segment::new(&mut scratch);
///
/// out.format(format_args!("{:5}", 42)).unwrap();
/// assert_eq!(out.as_bytes(), b"   42");
///
/// // Does not fit, nothing is written.
/// assert!(out.format(format_args!("{}", 12345)).is_err());
/// assert_eq!(out.len(), 5);
/// ```
pub struct Segment<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> Segment<'a> {
    /// Wraps `buf`; the whole slice is usable capacity.
    pub const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub const fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.len
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Appends `bytes` in full, or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if `bytes` does not fit in the
    /// remaining space.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self
            .len
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::CapacityExceeded {
                capacity: self.capacity(),
            })?;
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    /// Appends `s` in full, or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if `s` does not fit.
    pub fn push_str(&mut self, s: &str) -> Result<()> {
        self.push_bytes(s.as_bytes())
    }

    /// Formats `args` into the segment as a single unit.
    ///
    /// If any piece of the formatted text does not fit, everything written by
    /// this call is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the formatted text does not fit.
    pub fn format(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let mark = self.len;
        if fmt::write(self, args).is_err() {
            self.len = mark;
            return Err(Error::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Drops everything written so far.
    pub const fn clear(&mut self) {
        self.len = 0;
    }

    /// Closes the round and reports how much was written.
    pub const fn finish(&self) -> GenerationResult {
        GenerationResult {
            bytes_written: self.len,
        }
    }
}

impl fmt::Write for Segment<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_is_all_or_nothing() {
        let mut scratch = [0_u8; 4];
        let mut out = Segment::new(&mut scratch);

        out.push_str("ab").unwrap();
        assert_eq!(
            out.push_str("cde"),
            Err(Error::CapacityExceeded { capacity: 4 })
        );
        assert_eq!(out.as_bytes(), b"ab");
        out.push_str("cd").unwrap();
        assert_eq!(out.remaining(), 0);
        assert_eq!(out.finish().bytes_written, 4);
    }

    #[test]
    fn format_rolls_back_partial_output() {
        let mut scratch = [0_u8; 10];
        let mut out = Segment::new(&mut scratch);

        out.push_str("<p>").unwrap();
        // The literal fits but the argument does not.
        let err = out.format(format_args!("n={}", 123_456_789)).unwrap_err();
        assert_eq!(err, Error::CapacityExceeded { capacity: 10 });
        assert_eq!(out.as_bytes(), b"<p>");
    }

    #[test]
    fn exact_fit_is_accepted() {
        let mut scratch = [0_u8; 5];
        let mut out = Segment::new(&mut scratch);
        out.format(format_args!("{:5}", 7)).unwrap();
        assert_eq!(out.as_bytes(), b"    7");
        assert_eq!(out.remaining(), 0);
    }

    #[test]
    fn zero_capacity_accepts_only_empty_writes() {
        let mut scratch = [0_u8; 0];
        let mut out = Segment::new(&mut scratch);
        out.push_str("").unwrap();
        assert!(out.push_str("x").is_err());
        assert!(out.finish().is_empty());
    }
}
