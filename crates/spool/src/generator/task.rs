use portable_atomic::{AtomicU32, Ordering};

use crate::{error::Result, generator::ContentGenerator, segment::Segment, source::TaskSource};

/// Counts how often the task pages have been rendered.
///
/// Shared by `rtos-stats` and `run-time`; each render bumps it once.
#[derive(Debug, Default)]
pub struct RefreshCounter(AtomicU32);

impl RefreshCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Increments the counter and returns the new value.
    pub fn bump(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// `rtos-stats`: the scheduler's task list, the refresh count and the
/// application status message.
pub struct RtosStats<'a, S: ?Sized> {
    tasks: &'a S,
    refresh: &'a RefreshCounter,
}

impl<'a, S: TaskSource + ?Sized> RtosStats<'a, S> {
    pub const fn new(tasks: &'a S, refresh: &'a RefreshCounter) -> Self {
        Self { tasks, refresh }
    }
}

impl<S: TaskSource + ?Sized> ContentGenerator<()> for RtosStats<'_, S> {
    fn generate(&self, _: &(), out: &mut Segment<'_>) -> Result<()> {
        let count = self.refresh.bump();
        self.tasks.write_task_list(out)?;
        out.format(format_args!("<p><br>Refresh count = {count}<p><br>"))?;
        self.tasks.write_status_message(out)
    }
}

/// `run-time`: cumulative per-task run time followed by the refresh count.
pub struct RunTimeStats<'a, S: ?Sized> {
    tasks: &'a S,
    refresh: &'a RefreshCounter,
}

impl<'a, S: TaskSource + ?Sized> RunTimeStats<'a, S> {
    pub const fn new(tasks: &'a S, refresh: &'a RefreshCounter) -> Self {
        Self { tasks, refresh }
    }
}

impl<S: TaskSource + ?Sized> ContentGenerator<()> for RunTimeStats<'_, S> {
    fn generate(&self, _: &(), out: &mut Segment<'_>) -> Result<()> {
        let count = self.refresh.bump();
        self.tasks.write_run_time_stats(out)?;
        out.format(format_args!("<p><br>Refresh count = {count}"))
    }
}
