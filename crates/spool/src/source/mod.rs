//! Boundaries to the collaborators a script reads from.
//!
//! None of this data is owned by `spool`. The transport's connection table,
//! the file store, the scheduler's introspection hooks and the board's I/O
//! lines are all consumed read-only through the traits below.

mod connection;
mod stats;

pub use connection::*;
pub use stats::*;

use crate::{error::Result, path::TurnFlags, segment::Segment};

/// Size lookup for stored resources.
pub trait FileSource {
    /// Size in bytes of the resource called `name`, or `None` if it does not
    /// exist.
    fn file_size(&self, name: &str) -> Option<u32>;
}

/// Text snapshots supplied by the task scheduler.
///
/// Each call appends its snapshot to `out` and must leave the segment
/// untouched when the text does not fit.
pub trait TaskSource {
    /// One line per task with its scheduler state.
    fn write_task_list(&self, out: &mut Segment<'_>) -> Result<()>;

    /// A free-form status line maintained by the application.
    fn write_status_message(&self, out: &mut Segment<'_>) -> Result<()>;

    /// Cumulative run time per task.
    fn write_run_time_stats(&self, out: &mut Segment<'_>) -> Result<()>;
}

/// Binary board I/O.
pub trait IoSource {
    /// State of the user LED.
    fn led_state(&self) -> bool;

    /// Refreshes and returns the turn flags set by the line follower.
    fn turn_flags(&self) -> TurnFlags;
}

/// Everything the built-in scripts read.
///
/// Implemented automatically for any type providing all of the individual
/// sources.
pub trait Environment: ConnectionSource + FileSource + TaskSource + IoSource + StatsSource {}

impl<T> Environment for T where
    T: ConnectionSource + FileSource + TaskSource + IoSource + StatsSource + ?Sized
{
}
