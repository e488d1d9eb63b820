use crate::{error::Result, generator::ContentGenerator, segment::Segment};

/// `net-stats`: one protocol counter per line, right-aligned in five
/// columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetStatLine;

impl ContentGenerator<u16> for NetStatLine {
    fn generate(&self, value: &u16, out: &mut Segment<'_>) -> Result<()> {
        out.format(format_args!("{value:5}\n"))
    }
}
