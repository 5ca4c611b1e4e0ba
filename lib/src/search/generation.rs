//! Computing the generations of a branch.
//!
//! All generations share one list of cells. For each generation `g`
//! the list holds a run of the cells changed in `g`, followed by a run
//! of the cells to examine for `g + 1`: the changed cells and their
//! neighbors. Cells that are not examined cannot change.

use super::{Halt, Outcome, Rejection};
use crate::{
    cells::{offset, CellFlags, Coord, State, NEIGHBORS, PRIORITY},
    error::{Buffer, Error},
    world::{Cursor, World},
};
use log::{debug, info, trace};
use rand::Rng;
use std::iter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Statistics of the changes of a generation.
///
/// Uncounted cells are left out of all but `full_count`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenStats {
    pub change_count: u32,
    pub width: u32,
    pub height: u32,
    /// Sum of the ages of the changes. Only tracked when bounded.
    pub age_sum: u32,
    /// Number of changes, uncounted cells included.
    pub full_count: u32,
}

/// Positions of a finalized generation in the cell list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Generation {
    pub(crate) changed_start: usize,
    pub(crate) frontier_start: usize,
    pub(crate) frontier_end: usize,
    pub(crate) stats: GenStats,
}

/// The next state of a cell, if it is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Next {
    Known(State),
    /// The cell whose background state must be decided first.
    Undetermined(Coord),
}

impl World {
    /// The cells changed in a generation.
    ///
    /// Empty for generations not computed yet.
    pub fn changes(&self, gen: u32) -> &[Coord] {
        let (start, end) = self.changed_range(gen);
        &self.cells[start..end]
    }

    /// The cells examined to compute the generation after `gen`.
    pub fn frontier(&self, gen: u32) -> &[Coord] {
        match self.gens.get(gen as usize) {
            Some(g) => &self.cells[g.frontier_start..g.frontier_end],
            None => &[],
        }
    }

    /// Statistics of every finalized generation of the current branch.
    pub fn gen_stats(&self) -> Vec<GenStats> {
        self.gens.iter().map(|g| g.stats).collect()
    }

    pub(crate) fn changed_range(&self, gen: u32) -> (usize, usize) {
        match self.gens.get(gen as usize) {
            Some(g) => (g.changed_start, g.frontier_start),
            None if gen == self.gen => (self.frontier_end(), self.cells.len()),
            None => (0, 0),
        }
    }

    /// End of the cells to examine for the generation being computed.
    pub(crate) fn frontier_end(&self) -> usize {
        self.gens.last().map_or(0, |g| g.frontier_end)
    }

    fn push_cell(&mut self, coord: Coord) -> Result<(), Error> {
        let capacity = self.config.capacity.change_list;
        if self.cells.len() >= capacity {
            return Err(Error::CapacityExceeded(Buffer::ChangeList, capacity));
        }
        self.cells.push(coord);
        Ok(())
    }

    /// The next state of a cell, computed from the generation `current`
    /// holds.
    ///
    /// When the cell or its neighborhood is not known enough, names a cell
    /// to decide: the cell itself, or its first unknown neighbor in the
    /// order N, S, E, W, NW, SW, NE, SE.
    pub(crate) fn next_value(&self, coord: Coord) -> Next {
        let state = self.current(coord);
        if !state.is_known() {
            return Next::Undetermined(coord);
        }
        let sum: u8 = NEIGHBORS
            .iter()
            .map(|&d| self.current(offset(coord, d)).weight())
            .sum();
        match self.tables.transition(state, sum) {
            // The sum is undetermined only if some neighbor is unknown.
            State::Unknown => PRIORITY
                .iter()
                .map(|&d| offset(coord, d))
                .find(|&neighbor| !self.current(neighbor).is_known())
                .map_or(Next::Known(state), Next::Undetermined),
            next => Next::Known(next),
        }
    }

    fn snapshot(&self) -> Cursor {
        Cursor {
            gen: self.gen,
            frontier_pos: self.cursor,
            changed_end: self.cells.len(),
            age_sum: self.age_sum,
        }
    }

    /// Computes the next state of the cell under the cursor, deciding
    /// unknown cells freely as needed, and records it if it changes.
    pub(crate) fn try_cell(&mut self) -> Result<(), Halt> {
        let coord = self.cells[self.cursor];
        let state = loop {
            match self.next_value(coord) {
                Next::Known(state) => break state,
                Next::Undetermined(cell) => {
                    let cursor = self.snapshot();
                    let on = self.rng.gen_range(0..100) < self.config.probability;
                    self.try_value(cell, State::from_bool(on), true, Some(cursor))?;
                }
            }
        };
        if state == self.background(coord) {
            return Ok(());
        }
        self.push_cell(coord)?;
        if let Err(rejection) = self.check_change(coord) {
            trace!("Change at {:?} in generation {}: {}", coord, self.gen, rejection);
            return Err(Halt::Conflict);
        }
        Ok(())
    }

    fn compute_stats(&self, gen: u32, start: usize, end: usize) -> GenStats {
        let full_count = (end - start) as u32;
        let age_sum = match gen {
            0 if self.config.bounds.max_age_sum != 0 => full_count,
            0 => 0,
            _ => self.age_sum,
        };
        let mut stats = GenStats {
            full_count,
            age_sum,
            ..GenStats::default()
        };
        if gen < self.config.bounds.count_from_gen {
            return stats;
        }
        let (mut min_row, mut min_col, mut max_row, mut max_col) = (i32::MAX, i32::MAX, -1, -1);
        for &(row, col) in &self.cells[start..end] {
            if self.flags((row, col)).contains(CellFlags::UNCOUNTED) {
                continue;
            }
            stats.change_count += 1;
            min_row = min_row.min(row);
            min_col = min_col.min(col);
            max_row = max_row.max(row);
            max_col = max_col.max(col);
        }
        if stats.change_count > 0 {
            stats.width = (max_col - min_col + 1) as u32;
            stats.height = (max_row - min_row + 1) as u32;
        }
        stats
    }

    /// Lists the cells to examine for the generation after `gen`:
    /// each changed cell and its neighbors, without repetition, those
    /// with fewer unknown cells around first.
    fn build_frontier(&mut self, gen: u32) -> Result<(), Error> {
        let (start, end) = self.changed_range(gen);
        for k in start..end {
            let coord = self.cells[k];
            for d in iter::once((0, 0)).chain(NEIGHBORS.iter().copied()) {
                let cell = offset(coord, d);
                if self.contains(cell) {
                    let i = self.index(cell);
                    if !self.marks[i] {
                        self.marks[i] = true;
                        self.push_cell(cell)?;
                    }
                }
            }
        }
        for k in end..self.cells.len() {
            let i = self.index(self.cells[k]);
            self.marks[i] = false;
        }

        // Stable, so ties keep the order of discovery.
        let mut keyed: Vec<(usize, Coord)> = self.cells[end..]
            .iter()
            .map(|&cell| (self.unknowns_around(cell), cell))
            .collect();
        keyed.sort_by_key(|&(unknowns, _)| unknowns);
        for (slot, (_, cell)) in self.cells[end..].iter_mut().zip(keyed) {
            *slot = cell;
        }

        let frontier_end = self.cells.len();
        if let Some(g) = self.gens.get_mut(gen as usize) {
            g.frontier_end = frontier_end;
        }
        Ok(())
    }

    /// Number of unknown background cells in the 3 x 3 block around a cell.
    fn unknowns_around(&self, coord: Coord) -> usize {
        iter::once((0, 0))
            .chain(NEIGHBORS.iter().copied())
            .filter(|&d| self.background(offset(coord, d)) == State::Unknown)
            .count()
    }

    /// Finalizes generation 0, given by the patterns.
    pub(crate) fn start(&mut self) -> Result<(), Error> {
        let end = self.cells.len();
        let stats = self.compute_stats(0, 0, end);
        self.gens.push(Generation {
            changed_start: 0,
            frontier_start: end,
            frontier_end: end,
            stats,
        });
        self.toggle(0);
        self.build_frontier(0)?;
        self.gen = 1;
        self.cursor = end;
        if let Err(rejection) = self.check_frontier(0) {
            trace!("Generation 0: {}", rejection);
            self.must_backtrack = true;
        }
        Ok(())
    }

    /// Finalizes the generation being computed.
    ///
    /// Either the branch ends here, with a new outcome if it should be
    /// reported, or the cells to examine for the next generation are listed.
    pub(crate) fn finalize(&mut self) -> Result<Option<Outcome>, Error> {
        let gen = self.gen;
        let (start, end) = self.changed_range(gen);
        let stats = self.compute_stats(gen, start, end);
        self.gens.push(Generation {
            changed_start: start,
            frontier_start: end,
            frontier_end: end,
            stats,
        });
        // Now `current` holds this generation.
        self.toggle(gen - 1);
        self.toggle(gen);
        self.gen += 1;
        self.age_sum = 0;

        if gen > self.deepest {
            self.deepest = gen;
            debug!("Reached generation {} ({} conflicts)", gen, self.conflicts);
        }

        if let Err(rejection) = self.check_generation(gen) {
            trace!("Generation {}: {}", gen, rejection);
            self.must_backtrack = true;
            return Ok(None);
        }

        if let Some(kind) = self.classify(gen) {
            self.must_backtrack = true;
            let new = self.seen.insert(self.history_hash(gen))?;
            if !new || self.is_skipped(kind) {
                trace!("Generation {}: skipped {}", gen, kind);
                return Ok(None);
            }
            let outcome = self.outcome_at(kind, gen);
            info!("Found {} at generation {}", kind, gen);
            return Ok(Some(outcome));
        }

        self.build_frontier(gen)?;
        if let Err(rejection) = self.check_frontier(gen) {
            trace!("Generation {}: {}", gen, rejection);
            self.must_backtrack = true;
            return Ok(None);
        }
        self.cursor = end;
        Ok(None)
    }

    /// Checks the number of cells to examine after generation `gen`.
    fn check_frontier(&self, gen: u32) -> Result<(), Rejection> {
        let max = self.config.bounds.max_frontier;
        if max != 0 && self.frontier(gen).len() > max as usize {
            Err(Rejection::FrontierTooLarge)
        } else {
            Ok(())
        }
    }
}
