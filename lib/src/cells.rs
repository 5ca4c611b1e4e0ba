//! Cells of the background lattice.

use bitflags::bitflags;
use std::ops::Not;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Possible states of a cell.
///
/// Unlike the searched generations, the background may be unknown,
/// so `Unknown` is a state of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum State {
    /// The dead state.
    Off,
    /// The alive state.
    On,
    /// Not yet decided.
    Unknown,
}

impl State {
    /// The weight of this state in a neighbor sum.
    ///
    /// An unknown neighbor weighs 16, so a sum `k + 16 * u` tells
    /// both the number of known alive neighbors and of unknown ones.
    #[inline]
    pub const fn weight(self) -> u8 {
        match self {
            State::Off => 0,
            State::On => 1,
            State::Unknown => UNKNOWN_WEIGHT,
        }
    }

    /// Whether the state is known.
    #[inline]
    pub fn is_known(self) -> bool {
        self != State::Unknown
    }

    #[inline]
    pub(crate) fn from_bool(on: bool) -> Self {
        if on {
            State::On
        } else {
            State::Off
        }
    }
}

/// Flips a known state. `Unknown` stays unknown.
impl Not for State {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        match self {
            State::Off => State::On,
            State::On => State::Off,
            State::Unknown => State::Unknown,
        }
    }
}

/// The coordinates of a cell.
///
/// `(row, column)`, both 0-indexed.
pub type Coord = (i32, i32);

/// Weight of an unknown cell in a neighbor sum.
pub const UNKNOWN_WEIGHT: u8 = 16;

/// Number of distinct neighbor sums, `0..=8 * UNKNOWN_WEIGHT`.
pub const SUMS: usize = 8 * UNKNOWN_WEIGHT as usize + 1;

bitflags! {
    /// Flags attached to a cell of the background.
    #[derive(Default)]
    pub struct CellFlags: u8 {
        /// The cell may never differ from its background.
        const FIXED = 0b01;
        /// Changes of the cell are left out of the statistics.
        const UNCOUNTED = 0b10;
    }
}

/// Offsets of the eight neighbors, in row-major order.
pub(crate) const NEIGHBORS: [Coord; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Order in which an unknown neighbor is picked for a free decision:
/// N, S, E, W, NW, SW, NE, SE.
pub(crate) const PRIORITY: [Coord; 8] = [
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

#[inline]
pub(crate) fn offset((row, col): Coord, (dr, dc): Coord) -> Coord {
    (row + dr, col + dc)
}
