//! Bounds on the changes of a branch.
//!
//! Every bound is disabled when zero (or empty).

use crate::error::Error;
use educe::Educe;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Change counts of 19 consecutive generations of a known 5c/9 signal.
///
/// Compared with the last 19 generations of a branch.
pub const SIGNATURE_5C9: [u32; 19] = [1, 3, 4, 4, 4, 6, 5, 3, 3, 1, 3, 4, 4, 4, 6, 5, 3, 3, 1];

/// An axis of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Rows, increasing downwards.
    Row,
    /// Columns, increasing rightwards.
    Col,
}

/// Forces every change to move along an axis at a minimal speed.
///
/// A change at generation `gen` with coordinate `x` along the axis is
/// rejected when `den * x < num * gen + offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Drift {
    pub axis: Axis,
    pub num: i32,
    pub den: i32,
    pub offset: i32,
}

impl Drift {
    /// Whether a change at `coord` in generation `gen` moves fast enough.
    pub fn allows(&self, (row, col): (i32, i32), gen: u32) -> bool {
        let x = match self.axis {
            Axis::Row => row,
            Axis::Col => col,
        };
        self.den * x >= self.num * gen as i32 + self.offset
    }
}

/// A rectangle of cells, both corners included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Window {
    pub min_row: i32,
    pub min_col: i32,
    pub max_row: i32,
    pub max_col: i32,
}

impl Window {
    pub fn contains(&self, (row, col): (i32, i32)) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }
}

/// Bounds on the changes of a branch.
///
/// The size bounds `max_height`, `max_width` and `max_change_count`
/// live in [`Config`](crate::Config); the fields here refine them
/// or add other bounds.
#[derive(Clone, Debug, Educe, PartialEq, Eq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Bounds {
    /// Only reject too many changes when it lasts this many generations.
    pub sustain_changes: u32,

    /// Only reject a too tall region when it lasts this many generations.
    pub sustain_height: u32,

    /// Only reject a too wide region when it lasts this many generations.
    pub sustain_width: u32,

    /// Allows the changed region to be split into two pieces,
    /// each at most `max_height` tall.
    pub split_height: bool,

    /// Allows the changed region to be split into two pieces,
    /// each at most `max_width` wide.
    pub split_width: bool,

    /// Lower bound on a nonzero change count.
    pub min_change_count: u32,

    /// Max number of cells changed now but not in the previous generation.
    pub max_new_changes: u32,

    /// Max number of cells changed now but not
    /// [`new_changes_lag`](#structfield.new_changes_lag) generations ago.
    pub max_lagged_new_changes: u32,

    #[educe(Default = 1)]
    pub new_changes_lag: u32,

    /// Bound on the extent along the NE-SW direction, `|row - col|`.
    pub max_diag_ne: u32,

    /// Bound on the extent along the NW-SE direction, `|row + col|`.
    pub max_diag_nw: u32,

    /// Minimal speeds of the changes.
    pub drifts: Vec<Drift>,

    /// Only changes in generations from this one on are checked and counted.
    pub count_from_gen: u32,

    /// A cell may not change in two generations whose distance is
    /// between `no_rechange_min` and `no_rechange_max`.
    pub no_rechange_min: u32,

    pub no_rechange_max: u32,

    /// At most this many consecutive generations may have exactly two changes.
    pub max_twos_streak: u32,

    /// Every change of generation `g - persist_lag` inside
    /// [`persist_region`](#structfield.persist_region) must also be a change
    /// of generation `g`.
    pub persist_lag: u32,

    pub persist_region: Window,

    /// Change counts which the last generations of a branch may not all
    /// have, the last entry being the generation just computed.
    pub excluded_signature: Vec<u32>,

    /// Generation `forbid_gen` may not have `forbid_count` changes.
    pub forbid_gen: u32,

    pub forbid_count: u32,

    /// Generations before `require_until_gen` must have `require_count`
    /// changes, and generation `require_until_gen` may not.
    pub require_until_gen: u32,

    pub require_count: u32,

    /// Generations `g` and `g - repeat_lag` must have the same change count
    /// and the same bounding box, up to a swap of width and height.
    pub repeat_lag: u32,

    /// Bound on the sum of the ages of the changes in a generation.
    ///
    /// The age of a change is the number of generations since the cell
    /// first changed, plus one.
    pub max_age_sum: u32,

    /// Bound on the sum of the lengths of the streaks of consecutive
    /// generations in which the changed cells changed.
    pub max_streak_sum: u32,

    /// Number of unchanged generations a streak tolerates.
    pub streak_gap: u32,

    /// Bound on the number of cells to examine in a generation.
    pub max_frontier: u32,
}

impl Bounds {
    /// Sets a bound by its variable index.
    ///
    /// | index | bound |
    /// |-------|-------|
    /// | 100 | `sustain_changes` |
    /// | 101 | `max_new_changes` |
    /// | 102, 103 | `max_diag_ne`, `max_diag_nw` |
    /// | 104 | rightward drift, `3 col >= 2 gen + value` |
    /// | 105 | downward drift, `3 row >= 2 gen + value` |
    /// | 106 | `count_from_gen` |
    /// | 107, 108 | `no_rechange_min`, `no_rechange_max` |
    /// | 109 | downward drift, `2 row >= gen + value` |
    /// | 110 | `max_twos_streak` |
    /// | 111 | `persist_lag` |
    /// | 112, 113 | `split_height`, `split_width` |
    /// | 116 | `excluded_signature` (the 5c/9 signature when nonzero) |
    /// | 117, 118 | `max_lagged_new_changes`, `new_changes_lag` |
    /// | 120 | `min_change_count` |
    /// | 121, 122 | `forbid_gen`, `forbid_count` |
    /// | 123, 124 | `require_until_gen`, `require_count` |
    /// | 125, 126 | `sustain_height`, `sustain_width` |
    /// | 128 | `repeat_lag` |
    /// | 129 | `max_age_sum` |
    /// | 132 to 135 | `persist_region`: min row, min col, max row, max col |
    /// | 137, 138 | `max_streak_sum`, `streak_gap` |
    /// | 139 | `max_frontier` |
    pub fn set_var(&mut self, index: usize, value: i32) -> Result<(), Error> {
        let count = value.max(0) as u32;
        match index {
            100 => self.sustain_changes = count,
            101 => self.max_new_changes = count,
            102 => self.max_diag_ne = count,
            103 => self.max_diag_nw = count,
            104 => self.set_drift(Axis::Col, 2, 3, value),
            105 => self.set_drift(Axis::Row, 2, 3, value),
            106 => self.count_from_gen = count,
            107 => self.no_rechange_min = count,
            108 => self.no_rechange_max = count,
            109 => self.set_drift(Axis::Row, 1, 2, value),
            110 => self.max_twos_streak = count,
            111 => self.persist_lag = count,
            112 => self.split_height = value != 0,
            113 => self.split_width = value != 0,
            116 => {
                self.excluded_signature = if value != 0 {
                    SIGNATURE_5C9.to_vec()
                } else {
                    Vec::new()
                }
            }
            117 => self.max_lagged_new_changes = count,
            118 => self.new_changes_lag = count,
            120 => self.min_change_count = count,
            121 => self.forbid_gen = count,
            122 => self.forbid_count = count,
            123 => self.require_until_gen = count,
            124 => self.require_count = count,
            125 => self.sustain_height = count,
            126 => self.sustain_width = count,
            128 => self.repeat_lag = count,
            129 => self.max_age_sum = count,
            132 => self.persist_region.min_row = value,
            133 => self.persist_region.min_col = value,
            134 => self.persist_region.max_row = value,
            135 => self.persist_region.max_col = value,
            137 => self.max_streak_sum = count,
            138 => self.streak_gap = count,
            139 => self.max_frontier = count,
            _ => return Err(Error::UnknownVar(index)),
        }
        Ok(())
    }

    /// Replaces the drift with the same speed, or removes it when `offset`
    /// is zero.
    fn set_drift(&mut self, axis: Axis, num: i32, den: i32, offset: i32) {
        self.drifts
            .retain(|d| (d.axis, d.num, d.den) != (axis, num, den));
        if offset != 0 {
            self.drifts.push(Drift {
                axis,
                num,
                den,
                offset,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_var() -> Result<(), Error> {
        let mut bounds = Bounds::default();
        bounds.set_var(104, 5)?;
        bounds.set_var(104, 7)?;
        bounds.set_var(109, 1)?;
        assert_eq!(bounds.drifts.len(), 2);
        assert!(bounds.drifts[0].allows((0, 5), 4));
        assert!(!bounds.drifts[0].allows((0, 4), 4));

        bounds.set_var(116, 1)?;
        assert_eq!(bounds.excluded_signature, SIGNATURE_5C9);
        bounds.set_var(134, 12)?;
        assert_eq!(bounds.persist_region.max_row, 12);
        assert_eq!(bounds.set_var(119, 1), Err(Error::UnknownVar(119)));
        Ok(())
    }
}
