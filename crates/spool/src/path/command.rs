/// One of the four cardinal directions, in canvas coordinates.
///
/// North is up the canvas, i.e. towards decreasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// The heading after applying `command`.
    pub const fn turn(self, command: TurnCommand) -> Self {
        match (self, command) {
            (heading, TurnCommand::Straight) => heading,
            (Self::North, TurnCommand::Left) => Self::West,
            (Self::West, TurnCommand::Left) => Self::South,
            (Self::South, TurnCommand::Left) => Self::East,
            (Self::East, TurnCommand::Left) => Self::North,
            (Self::North, TurnCommand::Right) => Self::East,
            (Self::East, TurnCommand::Right) => Self::South,
            (Self::South, TurnCommand::Right) => Self::West,
            (Self::West, TurnCommand::Right) => Self::North,
        }
    }

    /// Unit step `(dx, dy)` along this heading.
    pub const fn unit(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// A single steering decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnCommand {
    Straight,
    Left,
    Right,
}

/// How to read [`TurnFlags`] when more than one flag is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnConflict {
    /// Conflicting flags are not a command; the path is left untouched.
    #[default]
    Reject,
    /// Straight beats Left, Left beats Right.
    Ordered,
}

/// The three independent steering flags raised by the line follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TurnFlags {
    pub straight: bool,
    pub left: bool,
    pub right: bool,
}

impl TurnFlags {
    pub const NONE: Self = Self {
        straight: false,
        left: false,
        right: false,
    };

    pub const fn straight() -> Self {
        Self {
            straight: true,
            ..Self::NONE
        }
    }

    pub const fn left() -> Self {
        Self {
            left: true,
            ..Self::NONE
        }
    }

    pub const fn right() -> Self {
        Self {
            right: true,
            ..Self::NONE
        }
    }

    /// Number of raised flags.
    pub const fn raised(&self) -> u8 {
        self.straight as u8 + self.left as u8 + self.right as u8
    }

    /// Collapses the flags into a command.
    ///
    /// No raised flag is never a command. More than one raised flag is
    /// resolved by `conflict`.
    pub const fn command(&self, conflict: TurnConflict) -> Option<TurnCommand> {
        if self.raised() > 1 && matches!(conflict, TurnConflict::Reject) {
            return None;
        }
        if self.straight {
            Some(TurnCommand::Straight)
        } else if self.left {
            Some(TurnCommand::Left)
        } else if self.right {
            Some(TurnCommand::Right)
        } else {
            None
        }
    }
}

impl From<TurnCommand> for TurnFlags {
    fn from(command: TurnCommand) -> Self {
        match command {
            TurnCommand::Straight => Self::straight(),
            TurnCommand::Left => Self::left(),
            TurnCommand::Right => Self::right(),
        }
    }
}
