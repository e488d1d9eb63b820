#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::script::Script;

/// A named handler registered in a [`DispatchTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<H> {
    pub name: &'static str,
    pub handler: H,
}

impl<H> Entry<H> {
    pub const fn new(name: &'static str, handler: H) -> Self {
        Self { name, handler }
    }
}

/// An ordered, read-only table mapping request identifiers to handlers.
///
/// An entry matches when its name is a byte-wise prefix of the identifier,
/// so one entry serves a whole family of identifiers such as
/// `file-stats /index.html`. Entries are scanned in order and the first match
/// wins: an earlier entry whose name is a prefix of a later entry's name
/// shadows that later entry for every identifier they both match.
///
/// # Example
/// ```
/// use spool::{DispatchTable, Script};
///
/// let table = DispatchTable::builtin();
/// assert_eq!(table.lookup("file-stats /index.html"), Script::FileStats);
/// assert_eq!(table.lookup("unknown"), Script::Null);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DispatchTable<'a, H> {
    entries: &'a [Entry<H>],
    fallback: H,
}

impl<'a, H: Copy> DispatchTable<'a, H> {
    /// Builds a table over `entries`; `fallback` answers identifiers that
    /// match nothing.
    pub const fn new(entries: &'a [Entry<H>], fallback: H) -> Self {
        Self { entries, fallback }
    }

    /// Returns the handler of the first entry whose name prefixes
    /// `identifier`, or the fallback.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn lookup(&self, identifier: &str) -> H {
        self.find(identifier)
            .map_or(self.fallback, |entry| entry.handler)
    }

    /// The first matching entry, if any.
    pub fn find(&self, identifier: &str) -> Option<&'a Entry<H>> {
        self.entries
            .iter()
            .find(|entry| identifier.as_bytes().starts_with(entry.name.as_bytes()))
    }

    pub const fn entries(&self) -> &'a [Entry<H>] {
        self.entries
    }

    pub const fn fallback(&self) -> H {
        self.fallback
    }
}

/// The built-in scripts, in registration order.
pub static BUILTIN_SCRIPTS: [Entry<Script>; 8] = [
    Entry::new(Script::FileStats.name(), Script::FileStats),
    Entry::new(Script::TcpConnections.name(), Script::TcpConnections),
    Entry::new(Script::NetStats.name(), Script::NetStats),
    Entry::new(Script::RtosStats.name(), Script::RtosStats),
    Entry::new(Script::RunTime.name(), Script::RunTime),
    Entry::new(Script::LedIo.name(), Script::LedIo),
    Entry::new(Script::TestIo.name(), Script::TestIo),
    Entry::new(Script::StopIo.name(), Script::StopIo),
];

impl DispatchTable<'static, Script> {
    /// The table of built-in scripts, falling back to [`Script::Null`].
    pub const fn builtin() -> Self {
        Self::new(&BUILTIN_SCRIPTS, Script::Null)
    }
}
