//! Bounds on the changes, checked while generations are computed.
//!
//! Bounds that can only get worse as more changes are recorded are
//! checked for each change, so a branch is cut as soon as possible.
//! The others are checked when a generation is finalized.

use super::GenStats;
use crate::{
    cells::{CellFlags, Coord},
    world::World,
};
use displaydoc::Display;

/// Why a branch is cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Rejection {
    /// a border cell changed
    Border,
    /// a fixed cell changed
    Fixed,
    /// the changed region is too tall
    TooTall,
    /// the changed region is too wide
    TooWide,
    /// too many changes
    TooManyChanges,
    /// the changed region is too wide from NE to SW
    DiagonalNe,
    /// the changed region is too wide from NW to SE
    DiagonalNw,
    /// a cell changed again too soon
    Rechanged,
    /// too many changes not in the previous generation
    TooManyNew,
    /// too many changes not in the lagged generation
    TooManyLaggedNew,
    /// the age sum is too large
    AgeSum,
    /// the streak sum is too large
    StreakSum,
    /// a change moves too slowly
    Drift,
    /// too many generations with two changes in a row
    TwosStreak,
    /// forbidden change count
    ForbiddenCount,
    /// the change count differs from the required one
    RequiredCount,
    /// the change count differs from the listed one
    RequiredCounts,
    /// the changes differ in size from the lagged generation
    Repeat,
    /// the change counts follow the excluded signature
    Signature,
    /// a change in the persistence region did not persist
    Persistence,
    /// too few changes
    TooFewChanges,
    /// too many cells to examine
    FrontierTooLarge,
}

impl World {
    /// The changes of a generation that are counted.
    fn counted_changes(&self, gen: u32) -> impl Iterator<Item = Coord> + '_ {
        self.changes(gen)
            .iter()
            .copied()
            .filter(move |&cell| !self.flags(cell).contains(CellFlags::UNCOUNTED))
    }

    fn stats(&self, gen: u32) -> &GenStats {
        &self.gens[gen as usize].stats
    }

    /// Whether none of the last `window - 1` generations satisfies `fits`.
    ///
    /// Always true for a window of 0 or 1.
    fn sustained<F: Fn(&GenStats) -> bool>(&self, window: u32, fits: F) -> bool {
        let from = self.gen.saturating_sub(window.saturating_sub(1));
        !(from..self.gen).any(|g| fits(self.stats(g)))
    }

    /// Checks a change just recorded in the generation being computed.
    ///
    /// Nothing is checked before `count_from_gen`, not even fixed cells.
    pub(crate) fn check_change(&mut self, coord: Coord) -> Result<(), Rejection> {
        if self.gen < self.config.bounds.count_from_gen {
            return Ok(());
        }
        if self.is_border(coord) {
            return Err(Rejection::Border);
        }
        let flags = self.flags(coord);
        if flags.contains(CellFlags::FIXED) {
            return Err(Rejection::Fixed);
        }
        if flags.contains(CellFlags::UNCOUNTED) {
            return Ok(());
        }
        self.check_size()?;
        self.check_diagonals(coord)?;
        self.check_rechange(coord)?;
        self.check_new_changes()?;
        self.check_age_sum(coord)?;
        self.check_streak_sum()?;
        self.check_drifts(coord)
    }

    fn check_size(&self) -> Result<(), Rejection> {
        let bounds = &self.config.bounds;
        let gen = self.gen;
        // Size bounds are waived while the change counts are listed.
        let waived = (gen as usize) < self.config.required_counts.len();

        let (mut min_row, mut min_col, mut max_row, mut max_col) =
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        let mut count = 0;
        for (row, col) in self.counted_changes(gen) {
            count += 1;
            min_row = min_row.min(row);
            min_col = min_col.min(col);
            max_row = max_row.max(row);
            max_col = max_col.max(col);
        }

        if let Some(max_height) = self.config.max_height {
            let max = max_height as i32;
            if bounds.split_height {
                // Two pieces, each at most `max` tall: no change may lie
                // far from both ends.
                if self
                    .counted_changes(gen)
                    .any(|(row, _)| row >= min_row + max && row <= max_row - max)
                {
                    return Err(Rejection::TooTall);
                }
            } else if max_row - min_row >= max
                && !waived
                && self.sustained(bounds.sustain_height, |s| s.height <= max_height)
            {
                return Err(Rejection::TooTall);
            }
        }

        if let Some(max_width) = self.config.max_width {
            let max = max_width as i32;
            if bounds.split_width {
                if self
                    .counted_changes(gen)
                    .any(|(_, col)| col >= min_col + max && col <= max_col - max)
                {
                    return Err(Rejection::TooWide);
                }
            } else if max_col - min_col >= max
                && !waived
                && self.sustained(bounds.sustain_width, |s| s.width <= max_width)
            {
                return Err(Rejection::TooWide);
            }
        }

        if let Some(max_count) = self.config.max_change_count {
            if count > max_count
                && !waived
                && self.sustained(bounds.sustain_changes, |s| s.change_count <= max_count)
            {
                return Err(Rejection::TooManyChanges);
            }
        }
        Ok(())
    }

    fn check_diagonals(&self, (row, col): Coord) -> Result<(), Rejection> {
        let ne = self.config.bounds.max_diag_ne;
        let nw = self.config.bounds.max_diag_nw;
        if ne == 0 && nw == 0 {
            return Ok(());
        }
        for (r, c) in self.counted_changes(self.gen) {
            if ne != 0 && ((row - col) - (r - c)).unsigned_abs() >= ne {
                return Err(Rejection::DiagonalNe);
            }
            if nw != 0 && ((row + col) - (r + c)).unsigned_abs() >= nw {
                return Err(Rejection::DiagonalNw);
            }
        }
        Ok(())
    }

    fn check_rechange(&self, coord: Coord) -> Result<(), Rejection> {
        let bounds = &self.config.bounds;
        if bounds.no_rechange_min == 0 {
            return Ok(());
        }
        let gen = self.gen as i64;
        let nearest = gen - bounds.no_rechange_min as i64;
        let farthest = (gen - bounds.no_rechange_max as i64).max(0);
        if (farthest..=nearest).any(|g| self.changes(g as u32).contains(&coord)) {
            return Err(Rejection::Rechanged);
        }
        Ok(())
    }

    /// Number of changes of the generation being computed that are not
    /// changes of generation `earlier`.
    fn new_changes(&self, earlier: u32) -> usize {
        let old = self.changes(earlier);
        self.changes(self.gen)
            .iter()
            .filter(|cell| !old.contains(cell))
            .count()
    }

    fn check_new_changes(&self) -> Result<(), Rejection> {
        let bounds = &self.config.bounds;
        let gen = self.gen;
        if bounds.max_new_changes != 0
            && gen > 0
            && self.new_changes(gen - 1) > bounds.max_new_changes as usize
        {
            return Err(Rejection::TooManyNew);
        }
        let lag = bounds.new_changes_lag.max(1);
        if bounds.max_lagged_new_changes != 0
            && gen >= lag
            && self.new_changes(gen - lag) > bounds.max_lagged_new_changes as usize
        {
            return Err(Rejection::TooManyLaggedNew);
        }
        Ok(())
    }

    fn check_age_sum(&mut self, coord: Coord) -> Result<(), Rejection> {
        let max = self.config.bounds.max_age_sum;
        if max == 0 {
            return Ok(());
        }
        let gen = self.gen;
        let first = (0..gen)
            .find(|&g| self.changes(g).contains(&coord))
            .unwrap_or(gen);
        self.age_sum += gen - first + 1;
        if self.age_sum > max {
            return Err(Rejection::AgeSum);
        }
        Ok(())
    }

    /// Sums, over the changes, the length of the streak of generations in
    /// which the cell changed, gaps of at most `streak_gap` generations
    /// included.
    fn check_streak_sum(&self) -> Result<(), Rejection> {
        let bounds = &self.config.bounds;
        if bounds.max_streak_sum == 0 {
            return Ok(());
        }
        let gen = self.gen as i64;
        let gap = bounds.streak_gap as i64;
        let mut sum = 0;
        for cell in self.changes(self.gen) {
            let mut first = gen;
            let mut g = gen - 1;
            while g >= 0 && g >= first - gap - 1 {
                if self.changes(g as u32).contains(cell) {
                    first = g;
                }
                g -= 1;
            }
            sum += gen - first + 1;
            if sum > bounds.max_streak_sum as i64 {
                return Err(Rejection::StreakSum);
            }
        }
        Ok(())
    }

    fn check_drifts(&self, coord: Coord) -> Result<(), Rejection> {
        let gen = self.gen;
        if self
            .config
            .bounds
            .drifts
            .iter()
            .all(|drift| drift.allows(coord, gen))
        {
            Ok(())
        } else {
            Err(Rejection::Drift)
        }
    }

    /// Checks generation `gen` when it is finalized. `current` holds it.
    pub(crate) fn check_generation(&self, gen: u32) -> Result<(), Rejection> {
        let bounds = &self.config.bounds;
        let stats = self.stats(gen);
        let count = stats.change_count;

        let twos = bounds.max_twos_streak;
        if twos != 0 && gen >= twos && (gen - twos..=gen).all(|g| self.stats(g).change_count == 2)
        {
            return Err(Rejection::TwosStreak);
        }

        if bounds.forbid_gen != 0 && gen == bounds.forbid_gen && count == bounds.forbid_count {
            return Err(Rejection::ForbiddenCount);
        }

        let until = bounds.require_until_gen;
        if until != 0
            && ((gen < until && count != bounds.require_count)
                || (gen == until && count == bounds.require_count))
        {
            return Err(Rejection::RequiredCount);
        }

        if let Some(&required) = self.config.required_counts.get(gen as usize) {
            let full = stats.full_count as i64;
            let required = required as i64;
            if (required >= 0 && full != required) || (required < 0 && full == -required) {
                return Err(Rejection::RequiredCounts);
            }
        }

        let lag = bounds.repeat_lag;
        if lag != 0 && gen >= lag {
            let prev = self.stats(gen - lag);
            let size = (stats.width, stats.height);
            if prev.change_count != count
                || (size != (prev.width, prev.height) && size != (prev.height, prev.width))
            {
                return Err(Rejection::Repeat);
            }
        }

        let signature = &bounds.excluded_signature;
        let len = signature.len() as u32;
        if len != 0
            && gen + 1 >= len
            && (gen + 1 - len..=gen)
                .zip(signature)
                .all(|(g, &expected)| self.stats(g).change_count == expected)
        {
            return Err(Rejection::Signature);
        }

        let lag = bounds.persist_lag;
        if lag != 0 && gen >= lag {
            let region = &bounds.persist_region;
            if self
                .changes(gen - lag)
                .iter()
                .any(|&cell| region.contains(cell) && self.current(cell) == self.background(cell))
            {
                return Err(Rejection::Persistence);
            }
        }

        if bounds.min_change_count != 0 && count != 0 && count < bounds.min_change_count {
            return Err(Rejection::TooFewChanges);
        }
        Ok(())
    }
}
