use crate::{
    error::Result,
    generator::ContentGenerator,
    path::PathTracker,
    segment::Segment,
    source::IoSource,
};

/// `led-io`: a checkbox reflecting the LED, checked while it is lit.
pub struct LedIo<'a, S: ?Sized> {
    io: &'a S,
}

impl<'a, S: IoSource + ?Sized> LedIo<'a, S> {
    pub const fn new(io: &'a S) -> Self {
        Self { io }
    }
}

impl<S: IoSource + ?Sized> ContentGenerator<()> for LedIo<'_, S> {
    fn generate(&self, _: &(), out: &mut Segment<'_>) -> Result<()> {
        let checked = if self.io.led_state() { "checked" } else { "" };
        out.format(format_args!(
            "<input type=\"checkbox\" name=\"LED0\" value=\"1\" {checked}>LED<p><p>"
        ))
    }
}

/// Run-control buttons rendered by `test-io`.
pub const RUN_CONTROLS: &str = concat!(
    "<input type=\"submit\" style=\"background-color:#458b00; color: #ffffff;\" name=\"startrun\" value=\"START\" >",
    "<input type=\"submit\" style=\"background-color:#cc0000; color: #ffffff;\" name=\"startrun\" value=\"STOP\" >",
    "&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;",
    "<input type=\"submit\" style=\"background-color:#035096; color: #ffffff;\" name=\"startrun\" value=\"FORCE RUN ONE\" >",
    "<input type=\"submit\" style=\"background-color:#035096; color: #ffffff;\" name=\"startrun\" value=\"FORCE RUN TWO\" >",
);

/// `test-io`: the fixed run-control form.
///
/// The LED is sampled, as the board expects the read, but does not change
/// the markup.
pub struct TestIo<'a, S: ?Sized> {
    io: &'a S,
}

impl<'a, S: IoSource + ?Sized> TestIo<'a, S> {
    pub const fn new(io: &'a S) -> Self {
        Self { io }
    }
}

impl<S: IoSource + ?Sized> ContentGenerator<()> for TestIo<'_, S> {
    fn generate(&self, _: &(), out: &mut Segment<'_>) -> Result<()> {
        let _ = self.io.led_state();
        out.push_str(RUN_CONTROLS)
    }
}

/// `stop-io`: advances the traced path by the current turn command and
/// emits the canvas instruction for the new position.
///
/// Writes nothing when the flags carry no valid command.
pub struct StopIo<'a, S: ?Sized> {
    io: &'a S,
    path: &'a PathTracker,
}

impl<'a, S: IoSource + ?Sized> StopIo<'a, S> {
    pub const fn new(io: &'a S, path: &'a PathTracker) -> Self {
        Self { io, path }
    }
}

impl<S: IoSource + ?Sized> ContentGenerator<()> for StopIo<'_, S> {
    fn generate(&self, _: &(), out: &mut Segment<'_>) -> Result<()> {
        match self.path.advance(self.io.turn_flags()) {
            Some(line) => out.format(format_args!("{line}")),
            None => Ok(()),
        }
    }
}
