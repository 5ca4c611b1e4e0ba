//! World configuration.

use crate::{error::Error, rules::Rule, world::World};
use educe::Educe;

mod bounds;
mod pattern;
mod symmetry;

pub use bounds::{Axis, Bounds, Drift, Window, SIGNATURE_5C9};
pub use pattern::{Flag, Pattern, Region, RegionOp};
pub use symmetry::{Symmetry, Transform};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest height or width: the two dead rings of the border
/// and one searchable cell.
pub const MIN_SIZE: i32 = 5;

/// Largest height or width.
pub const MAX_SIZE: i32 = 81;

/// Sizes of the bounded buffers of the search.
#[derive(Clone, Copy, Debug, Educe, PartialEq, Eq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Capacity {
    /// Total number of changed and examined cells over all generations
    /// of a branch.
    #[educe(Default = 1_000_000)]
    pub change_list: usize,

    /// Number of distinct outcomes remembered.
    #[educe(Default = 2_000_000)]
    pub hash_table: usize,
}

/// World configuration.
///
/// The world will be generated from this configuration.
#[derive(Clone, Debug, Educe, PartialEq, Eq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Height, including the dead border.
    #[educe(Default = 81)]
    pub height: i32,

    /// Width, including the dead border.
    #[educe(Default = 81)]
    pub width: i32,

    /// The rule string of the cellular automaton.
    #[educe(Default(expression = "String::from(\"B3/S23\")"))]
    pub rule_string: String,

    /// Symmetry of the background.
    pub symmetry: Symmetry,

    /// Whether the images of a cell under the symmetry take the
    /// opposite state.
    pub day_night: bool,

    /// `D2-` only applies to the columns from this one on.
    pub symmetry_from_col: u32,

    /// `D2|` only applies to the rows from this one on.
    pub symmetry_from_row: u32,

    /// Max number of changed cells in a generation.
    ///
    /// `None` means that there is no limit.
    #[educe(Default(expression = "Some(9)"))]
    pub max_change_count: Option<u32>,

    /// Max width of the changed cells in a generation.
    #[educe(Default(expression = "Some(3)"))]
    pub max_width: Option<u32>,

    /// Max height of the changed cells in a generation.
    #[educe(Default(expression = "Some(3)"))]
    pub max_height: Option<u32>,

    /// Probability, in percent, that a free choice sets a cell alive.
    #[educe(Default = 50)]
    pub probability: u32,

    /// Seed of the random number generator.
    #[educe(Default = 1)]
    pub seed: u64,

    /// A branch ends at this generation.
    #[educe(Default = 500)]
    pub max_gen: u32,

    pub capacity: Capacity,

    /// Partial patterns, placed in order.
    pub patterns: Vec<Pattern>,

    /// Region operations, applied in order after the patterns.
    pub regions: Vec<RegionOp>,

    pub bounds: Bounds,

    /// Required change counts of the first generations.
    ///
    /// A non-negative entry `n` at index `g` requires generation `g` to
    /// have exactly `n` changes; a negative entry `-n` forbids `n` changes.
    /// The size bounds are waived in these generations.
    pub required_counts: Vec<i32>,

    /// Whether the pattern cells `.`, `o`, `0`, `1` and `?` are left out
    /// of the statistics.
    pub uncount_known: bool,

    /// Whether stable outcomes are not reported.
    pub skip_stable: bool,

    /// Whether quiescent outcomes are not reported.
    pub skip_fizzle: bool,
}

impl Config {
    /// Sets up a new configuration with given size.
    pub fn new(height: i32, width: i32) -> Self {
        Config {
            height,
            width,
            ..Config::default()
        }
    }

    /// Sets the rule string.
    pub fn set_rule_string<S: ToString>(mut self, rule_string: S) -> Self {
        self.rule_string = rule_string.to_string();
        self
    }

    /// Sets the symmetry.
    pub fn set_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Sets whether the symmetry is a day/night one.
    pub fn set_day_night(mut self, day_night: bool) -> Self {
        self.day_night = day_night;
        self
    }

    /// Limits `D2-` to the columns from `col` on.
    pub fn set_symmetry_from_col(mut self, col: u32) -> Self {
        self.symmetry_from_col = col;
        self
    }

    /// Limits `D2|` to the rows from `row` on.
    pub fn set_symmetry_from_row(mut self, row: u32) -> Self {
        self.symmetry_from_row = row;
        self
    }

    /// Sets the maximal number of changed cells.
    pub fn set_max_change_count<T: Into<Option<u32>>>(mut self, max_change_count: T) -> Self {
        self.max_change_count = max_change_count.into();
        self
    }

    /// Sets the maximal width of the changed cells.
    pub fn set_max_width<T: Into<Option<u32>>>(mut self, max_width: T) -> Self {
        self.max_width = max_width.into();
        self
    }

    /// Sets the maximal height of the changed cells.
    pub fn set_max_height<T: Into<Option<u32>>>(mut self, max_height: T) -> Self {
        self.max_height = max_height.into();
        self
    }

    /// Sets the probability of choosing an alive state.
    pub fn set_probability(mut self, probability: u32) -> Self {
        self.probability = probability;
        self
    }

    /// Sets the random seed.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the generation at which a branch ends.
    pub fn set_max_gen(mut self, max_gen: u32) -> Self {
        self.max_gen = max_gen;
        self
    }

    /// Sets the sizes of the bounded buffers.
    pub fn set_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Adds a partial pattern at `(row, col)`.
    pub fn add_pattern(mut self, row: i32, col: i32, text: &str) -> Self {
        self.patterns.push(Pattern::new(row, col, text));
        self
    }

    /// Adds a region operation.
    pub fn add_region(mut self, op: RegionOp) -> Self {
        self.regions.push(op);
        self
    }

    /// Sets the bounds.
    pub fn set_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the required change counts.
    pub fn set_required_counts(mut self, required_counts: Vec<i32>) -> Self {
        self.required_counts = required_counts;
        self
    }

    /// Sets whether the known cells of patterns are left out of the statistics.
    pub fn set_uncount_known(mut self, uncount_known: bool) -> Self {
        self.uncount_known = uncount_known;
        self
    }

    /// Sets whether stable outcomes are skipped.
    pub fn set_skip_stable(mut self, skip_stable: bool) -> Self {
        self.skip_stable = skip_stable;
        self
    }

    /// Sets whether quiescent outcomes are skipped.
    pub fn set_skip_fizzle(mut self, skip_fizzle: bool) -> Self {
        self.skip_fizzle = skip_fizzle;
        self
    }

    /// Sets an option by its variable index.
    ///
    /// 114 is [`symmetry_from_col`](#structfield.symmetry_from_col),
    /// 115 is [`symmetry_from_row`](#structfield.symmetry_from_row),
    /// 127 is [`uncount_known`](#structfield.uncount_known),
    /// 130 is [`day_night`](#structfield.day_night);
    /// the other indices are the ones of [`Bounds::set_var`].
    pub fn set_var(mut self, index: usize, value: i32) -> Result<Self, Error> {
        match index {
            114 => self.symmetry_from_col = value.max(0) as u32,
            115 => self.symmetry_from_row = value.max(0) as u32,
            127 => self.uncount_known = value != 0,
            130 => self.day_night = value != 0,
            _ => self.bounds.set_var(index, value)?,
        }
        Ok(self)
    }

    /// Parses the rule string.
    pub fn rule(&self) -> Result<Rule, Error> {
        self.rule_string.parse()
    }

    /// Creates a new world from the configuration.
    ///
    /// Returns an error if the configuration is invalid,
    /// or if the patterns contradict each other.
    pub fn world(&self) -> Result<World, Error> {
        let size = MIN_SIZE..=MAX_SIZE;
        if !size.contains(&self.height) || !size.contains(&self.width) {
            return Err(Error::Dimensions(self.height, self.width));
        }
        if self.symmetry.square_world() && self.height != self.width {
            return Err(Error::SquareWorld(self.symmetry));
        }
        if self.day_night && !self.symmetry.day_night() {
            return Err(Error::DayNight(self.symmetry));
        }
        if self.probability > 100 {
            return Err(Error::Probability(self.probability));
        }
        for op in &self.regions {
            op.region().validate()?;
        }
        let rule = self.rule()?;
        World::new(self, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.rule_string, "B3/S23");
        assert_eq!(config.max_change_count, Some(9));
        assert_eq!(config.max_gen, 500);
        assert_eq!(config.bounds.new_changes_lag, 1);
        assert_eq!(config.capacity.hash_table, 2_000_000);
    }

    #[test]
    fn set_var() -> Result<(), Error> {
        let config = Config::new(9, 9)
            .set_var(127, 1)?
            .set_var(101, 3)?
            .set_var(114, 4)?;
        assert!(config.uncount_known);
        assert_eq!(config.symmetry_from_col, 4);
        assert_eq!(config.bounds.max_new_changes, 3);
        assert_eq!(
            Config::new(9, 9).set_var(99, 1),
            Err(Error::UnknownVar(99))
        );
        Ok(())
    }
}
