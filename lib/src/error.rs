//! All kinds of errors in this crate.

use crate::{cells::Coord, config::Symmetry};
use ca_rules::ParseRuleError;
use displaydoc::Display;
use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Unable to set cell at {0:?}.
    SetCell(Coord),
    /// The {0} is full: at most {1} entries.
    CapacityExceeded(Buffer, usize),
    /// Height and width should be between 5 and 81, got {0} x {1}.
    Dimensions(i32, i32),
    /// Symmetry {0} requires the world to be square.
    SquareWorld(Symmetry),
    /// Day/night replication is only supported for D2-, D2| and C2, not {0}.
    DayNight(Symmetry),
    /// Invalid rule: {0:?}.
    ParseRule(#[from] ParseRuleError),
    /// B0 rules are not supported: the dead border would never be stable.
    B0Rule,
    /// Invalid character {0:?} in pattern at {1:?}.
    PatternChar(char, Coord),
    /// Unknown variable index {0}.
    UnknownVar(usize),
    /// Probability should be a percentage at most 100, got {0}.
    Probability(u32),
    /// The corners of triangle {0:?} are collinear.
    DegenerateTriangle([Coord; 3]),
}

/// Bounded buffers of the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Buffer {
    /// list of changed cells
    ChangeList,
    /// table of seen outcomes
    HashTable,
}

/// Reasons why a cell of the background cannot be assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Error)]
pub enum AssignError {
    /// Cell at {0:?} is in the border or outside the world.
    Immutable(Coord),
    /// Cell at {0:?} is already known.
    NotUnknown(Coord),
    /// Cell at {0:?} cannot be set to the unknown state.
    UnknownState(Coord),
    /// Symmetric image {0:?} already has the opposite state.
    Contradiction(Coord),
}
