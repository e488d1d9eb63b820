use crate::{error::Result, generator::ContentGenerator, segment::Segment, source::FileSource};

/// `file-stats`: the size of a stored resource, right-aligned in five
/// columns.
///
/// Unknown resources report a size of zero.
pub struct FileStats<'a, S: ?Sized> {
    files: &'a S,
}

impl<'a, S: FileSource + ?Sized> FileStats<'a, S> {
    pub const fn new(files: &'a S) -> Self {
        Self { files }
    }
}

impl<S: FileSource + ?Sized> ContentGenerator<str> for FileStats<'_, S> {
    fn generate(&self, name: &str, out: &mut Segment<'_>) -> Result<()> {
        let size = self.files.file_size(name).unwrap_or(0);
        out.format(format_args!("{size:5}"))
    }
}

/// The resource name carried by a `file-stats` identifier: everything after
/// the first space, or the empty string if there is none.
pub fn file_argument(identifier: &str) -> &str {
    identifier
        .split_once(' ')
        .map_or("", |(_, name)| name)
}
