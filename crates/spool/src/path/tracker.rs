use core::{cell::Cell, fmt};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::path::{Heading, TurnCommand, TurnConflict, TurnFlags};

/// Distance covered by one command, in canvas units.
pub const STEP: i32 = 10;

/// A point on the drawing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    const fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.unit();
        Self {
            x: self.x.wrapping_add(dx * STEP),
            y: self.y.wrapping_add(dy * STEP),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A canvas drawing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTo(pub Position);

impl fmt::Display for LineTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ctx.lineTo({},{});", self.0.x, self.0.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathState {
    heading: Heading,
    position: Position,
}

/// Traces one continuous path, one turn command per call.
///
/// The tracker owns the heading and position for as long as the path is
/// being drawn; it is shared by every connection that requests `stop-io`.
/// It is **not** thread-safe: state lives in a [`Cell`] and is updated
/// without suspension, which is all a cooperative scheduler needs.
///
/// Every command moves [`STEP`] units along the heading *after* the turn,
/// so `Straight` continues along the current heading while `Left`/`Right`
/// first rotate and then advance.
///
/// # Example
/// ```
/// use spool::{Heading, PathTracker, Position, TurnCommand};
///
/// let path = PathTracker::new(Position::new(0, 0), Heading::East);
/// assert_eq!(path.apply(TurnCommand::Left).0, Position::new(0, -10));
/// assert_eq!(path.heading(), Heading::North);
/// ```
#[derive(Debug)]
pub struct PathTracker {
    state: Cell<PathState>,
    conflict: TurnConflict,
}

impl PathTracker {
    /// Canvas origin of a fresh path.
    pub const ORIGIN: Position = Position::new(10, 350);

    /// Starts a path at `position`, facing `heading`, rejecting conflicting
    /// flags.
    pub const fn new(position: Position, heading: Heading) -> Self {
        Self::with_conflict(position, heading, TurnConflict::Reject)
    }

    pub const fn with_conflict(position: Position, heading: Heading, conflict: TurnConflict) -> Self {
        Self {
            state: Cell::new(PathState { heading, position }),
            conflict,
        }
    }

    pub fn heading(&self) -> Heading {
        self.state.get().heading
    }

    pub fn position(&self) -> Position {
        self.state.get().position
    }

    pub const fn conflict(&self) -> TurnConflict {
        self.conflict
    }

    /// Applies exactly one transition and returns the instruction for the new
    /// position.
    pub fn apply(&self, command: TurnCommand) -> LineTo {
        let state = self.state.get();
        let heading = state.heading.turn(command);
        let position = state.position.step(heading);
        self.state.set(PathState { heading, position });
        LineTo(position)
    }

    /// Reads `flags` under this tracker's conflict policy and applies the
    /// resulting command.
    ///
    /// Returns `None`, leaving heading and position untouched, when the flags
    /// carry no valid command.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn advance(&self, flags: TurnFlags) -> Option<LineTo> {
        let command = flags.command(self.conflict)?;
        Some(self.apply(command))
    }

    /// Returns to `position`, facing `heading`.
    pub fn reset(&self, position: Position, heading: Heading) {
        self.state.set(PathState { heading, position });
    }
}

impl Default for PathTracker {
    fn default() -> Self {
        Self::new(Self::ORIGIN, Heading::East)
    }
}
