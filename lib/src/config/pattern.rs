//! Initial patterns and regions of the background.

use crate::{
    cells::{CellFlags, Coord, State},
    error::Error,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A partial pattern placed in the world.
///
/// Each line of `text` is a row, starting at `(row, col)`. Characters:
///
/// | char | background | generation 0 | fixed | uncounted |
/// |------|------------|--------------|-------|-----------|
/// | `.`  | dead       | dead         | no    | yes       |
/// | `o`  | alive      | alive        | no    | yes       |
/// | `0`  | alive      | dead         | no    | yes       |
/// | `1`  | dead       | alive        | no    | yes       |
/// | `?`  | unknown    | unchanged    | no    | yes       |
/// | `,`  | unknown    | unchanged    | no    | no        |
/// | `:`  | dead       | dead         | yes   | no        |
/// | `O`  | alive      | alive        | yes   | no        |
/// | `s`  | unknown    | unchanged    | yes   | no        |
///
/// The cells in the last column are only left out of the statistics
/// when [`uncount_known`](crate::Config#structfield.uncount_known) is set.
/// A `!` ends the pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pattern {
    pub row: i32,
    pub col: i32,
    pub text: String,
}

/// A cell given by a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PatternCell {
    pub(crate) coord: Coord,
    /// `None` for skipped cells.
    pub(crate) background: Option<State>,
    /// Whether the cell differs from its background in generation 0.
    pub(crate) changed: bool,
    pub(crate) fixed: bool,
    /// Whether `uncount_known` marks the cell as uncounted.
    pub(crate) uncounted_when_known: bool,
}

impl Pattern {
    pub fn new(row: i32, col: i32, text: &str) -> Self {
        Pattern {
            row,
            col,
            text: text.to_owned(),
        }
    }

    /// Parses the cells of the pattern.
    pub(crate) fn cells(&self) -> Result<Vec<PatternCell>, Error> {
        let mut cells = Vec::new();
        'lines: for (i, line) in self.text.lines().enumerate() {
            for (j, c) in line.chars().enumerate() {
                let coord = (self.row + i as i32, self.col + j as i32);
                let (background, changed, fixed) = match c {
                    '.' => (Some(State::Off), false, false),
                    'o' => (Some(State::On), false, false),
                    '0' => (Some(State::On), true, false),
                    '1' => (Some(State::Off), true, false),
                    ',' | '?' => (None, false, false),
                    ':' => (Some(State::Off), false, true),
                    'O' => (Some(State::On), false, true),
                    's' => (None, false, true),
                    '!' => break 'lines,
                    _ => return Err(Error::PatternChar(c, coord)),
                };
                cells.push(PatternCell {
                    coord,
                    background,
                    changed,
                    fixed,
                    uncounted_when_known: matches!(c, '.' | 'o' | '0' | '1' | '?'),
                });
            }
        }
        Ok(cells)
    }
}

/// A set of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Region {
    Point { at: Coord },
    /// A digital line segment: the cells whose centers lie on the segment.
    Line { from: Coord, to: Coord },
    /// A rectangle given by two opposite corners.
    Rect { from: Coord, to: Coord },
    /// A triangle, edges included.
    Triangle { corners: [Coord; 3] },
}

impl Region {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        match *self {
            Region::Triangle { corners } if orientation(corners) == 0 => {
                Err(Error::DegenerateTriangle(corners))
            }
            _ => Ok(()),
        }
    }

    /// The smallest rectangle containing the region,
    /// as `(min_row, min_col, max_row, max_col)`.
    pub fn bounding_box(&self) -> (i32, i32, i32, i32) {
        let corners: &[Coord] = match self {
            Region::Point { at } => std::slice::from_ref(at),
            Region::Line { from, to } | Region::Rect { from, to } => {
                return (
                    from.0.min(to.0),
                    from.1.min(to.1),
                    from.0.max(to.0),
                    from.1.max(to.1),
                )
            }
            Region::Triangle { corners } => corners,
        };
        corners.iter().fold(
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |(r0, c0, r1, c1), &(r, c)| (r0.min(r), c0.min(c), r1.max(r), c1.max(c)),
        )
    }

    /// Whether the region contains the cell.
    pub fn contains(&self, coord: Coord) -> bool {
        let (min_row, min_col, max_row, max_col) = self.bounding_box();
        let (row, col) = coord;
        if row < min_row || row > max_row || col < min_col || col > max_col {
            return false;
        }
        match *self {
            Region::Point { .. } | Region::Rect { .. } => true,
            Region::Line { from, to } => cross(from, to, coord) == 0,
            Region::Triangle { corners: [a, b, c] } => {
                let orient = orientation([a, b, c]).signum();
                cross(a, b, coord) * orient >= 0
                    && cross(b, c, coord) * orient >= 0
                    && cross(c, a, coord) * orient >= 0
            }
        }
    }
}

/// Twice the signed area of the triangle `a`, `b`, `p`.
fn cross(a: Coord, b: Coord, p: Coord) -> i64 {
    let (ar, ac) = (a.0 as i64, a.1 as i64);
    (b.0 as i64 - ar) * (p.1 as i64 - ac) - (b.1 as i64 - ac) * (p.0 as i64 - ar)
}

fn orientation([a, b, c]: [Coord; 3]) -> i64 {
    cross(a, b, c)
}

/// Flags that a region operation may set or clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Flag {
    Fixed,
    Uncounted,
}

impl From<Flag> for CellFlags {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Fixed => CellFlags::FIXED,
            Flag::Uncounted => CellFlags::UNCOUNTED,
        }
    }
}

/// An operation on every cell of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegionOp {
    /// Sets every unknown cell to dead.
    Clear { region: Region },
    Flag { region: Region, flag: Flag },
    Unflag { region: Region, flag: Flag },
}

impl RegionOp {
    pub fn region(&self) -> &Region {
        match self {
            RegionOp::Clear { region }
            | RegionOp::Flag { region, .. }
            | RegionOp::Unflag { region, .. } => region,
        }
    }
}
