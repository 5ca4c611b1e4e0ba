//! The searching algorithm.
//!
//! Every decision on the background is followed by propagation to a local
//! fixpoint of the consistency table. Conflicts undo decisions back to the
//! last free one, which is then retried with the other state.

use crate::{
    cells::{offset, Coord, State, NEIGHBORS},
    error::{AssignError, Error},
    rules::Implication,
    world::{Cursor, Decision, World},
};

mod generation;
mod outcome;
mod policy;

pub use generation::GenStats;
pub(crate) use generation::Generation;
pub use outcome::{history_hash, Outcome, OutcomeKind, Seen};
pub use policy::Rejection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// A result is found.
    Found,
    /// No more results.
    None,
    /// Still searching.
    Searching,
}

/// The background cannot be made consistent with the decisions made so far.
///
/// Recovered from by backtracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Conflict;

impl From<AssignError> for Conflict {
    fn from(_: AssignError) -> Self {
        Conflict
    }
}

/// Why a step of the search stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Halt {
    /// The branch must be backtracked.
    Conflict,
    /// The whole search must stop.
    Fatal(Error),
}

impl From<Conflict> for Halt {
    fn from(_: Conflict) -> Self {
        Halt::Conflict
    }
}

impl From<Error> for Halt {
    fn from(error: Error) -> Self {
        Halt::Fatal(error)
    }
}

impl World {
    /// Consistifies a cell.
    ///
    /// Looks up what the stability of the background implies for the cell,
    /// and assigns the cell or its unknown neighbors accordingly. When the
    /// cell itself is assigned, the table is read again; the second reading
    /// never assigns the cell, so the loop runs at most twice.
    fn consistify(&mut self, coord: Coord) -> Result<(), Conflict> {
        loop {
            let implication = self
                .tables
                .implication(self.background(coord), self.neighbor_sum(coord));
            let state = match implication {
                Implication::NoInfo => return Ok(()),
                Implication::Conflict => return Err(Conflict),
                Implication::CellOff => State::Off,
                Implication::CellOn => State::On,
                Implication::NeighborsOff | Implication::NeighborsOn => {
                    let state = if implication == Implication::NeighborsOn {
                        State::On
                    } else {
                        State::Off
                    };
                    for &d in NEIGHBORS.iter() {
                        let neighbor = offset(coord, d);
                        // An earlier assignment may have set it by symmetry.
                        if self.background(neighbor) == State::Unknown {
                            self.assign(neighbor, state, false)?;
                        }
                    }
                    return Ok(());
                }
            };
            self.assign(coord, state, false)?;
        }
    }

    /// Consistifies a cell and its neighbors.
    fn consistify9(&mut self, coord: Coord) -> Result<(), Conflict> {
        self.consistify(coord)?;
        for &d in NEIGHBORS.iter() {
            self.consistify(offset(coord, d))?;
        }
        Ok(())
    }

    /// Deduces all the consequences of the decisions after
    /// [`check_index`](World#structfield.check_index).
    ///
    /// New decisions are appended to the log, so they are examined
    /// in the order they are made.
    fn proceed(&mut self) -> Result<(), Conflict> {
        while self.check_index < self.decisions.len() {
            let coord = self.decisions[self.check_index].coord;
            self.consistify9(coord)?;
            self.check_index += 1;
        }
        Ok(())
    }

    /// Assigns a cell and deduces all the consequences.
    pub(crate) fn try_value(
        &mut self,
        coord: Coord,
        state: State,
        free: bool,
        cursor: Option<Cursor>,
    ) -> Result<(), Conflict> {
        self.check_index = self.decisions.len();
        self.assign_with(coord, state, free, cursor)?;
        self.proceed()
    }

    /// Assigns a cell, replicates it by symmetry, and deduces all the
    /// consequences.
    ///
    /// On conflict the decisions made so far are kept; undo them with
    /// [`revert_last`](Self::revert_last).
    pub fn commit(&mut self, coord: Coord, state: State, free: bool) -> Result<(), Conflict> {
        self.try_value(coord, state, free, None)
    }

    /// Undoes decisions until a free one is undone, and returns it.
    ///
    /// Returns `None` when the log is empty.
    fn backtrack_once(&mut self) -> Option<Decision> {
        while let Some(decision) = self.revert_last() {
            if decision.free {
                return Some(decision);
            }
        }
        None
    }

    /// Retreats to the last free decision and switches that cell to the
    /// other state, as a deduced decision that keeps the cursor of the
    /// free one.
    ///
    /// Repeats until the switched state is consistent, and returns it.
    /// Returns `None` when there is no free decision left.
    fn retreat(&mut self) -> Option<Decision> {
        loop {
            let decision = self.backtrack_once()?;
            let state = !decision.state;
            if self
                .try_value(decision.coord, state, false, decision.cursor)
                .is_ok()
            {
                return Some(Decision {
                    state,
                    free: false,
                    ..decision
                });
            }
            self.conflicts += 1;
        }
    }

    /// Leaves the current branch, and resumes the generation advancer
    /// where the switched decision was made.
    ///
    /// Returns `false` if the search space is exhausted.
    fn backtrack(&mut self) -> bool {
        self.must_backtrack = false;
        // Now `current` holds the background.
        self.toggle(self.gen - 1);
        match self.retreat() {
            Some(decision) => {
                if let Some(cursor) = decision.cursor {
                    self.restore(cursor);
                }
                self.toggle(self.gen - 1);
                true
            }
            None => {
                self.exhausted = true;
                false
            }
        }
    }

    fn restore(&mut self, cursor: Cursor) {
        self.gen = cursor.gen;
        self.gens.truncate(cursor.gen as usize);
        self.cells.truncate(cursor.changed_end);
        self.cursor = cursor.frontier_pos;
        self.age_sum = cursor.age_sum;
    }

    /// The search function.
    ///
    /// Returns [`Status::Found`] if a result is found,
    /// [`Status::None`] if there are no more results,
    /// [`Status::Searching`] if the number of steps reaches `max_step`
    /// and no results are found.
    ///
    /// Each call after [`Status::Found`] goes on with the next branch.
    pub fn search(&mut self, max_step: Option<u64>) -> Result<Status, Error> {
        let mut step_count = 0;
        loop {
            if self.exhausted || (self.must_backtrack && !self.backtrack()) {
                return Ok(Status::None);
            }
            if self.cursor == self.frontier_end() {
                if let Some(outcome) = self.finalize()? {
                    self.outcome = Some(outcome);
                    return Ok(Status::Found);
                }
                continue;
            }
            match self.try_cell() {
                Ok(()) => self.cursor += 1,
                Err(Halt::Conflict) => {
                    self.conflicts += 1;
                    self.must_backtrack = true;
                }
                Err(Halt::Fatal(error)) => return Err(error),
            }
            step_count += 1;
            if let Some(max) = max_step {
                if step_count >= max {
                    return Ok(Status::Searching);
                }
            }
        }
    }

    /// The last outcome found.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Number of conflicts during the search.
    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    /// The generation being computed.
    pub fn gen(&self) -> u32 {
        self.gen
    }

    /// The deepest generation finalized so far.
    pub fn deepest_gen(&self) -> u32 {
        self.deepest
    }
}
