//! How a branch ends, and which ends were seen before.

use super::GenStats;
use crate::{
    cells::{CellFlags, Coord},
    error::{Buffer, Error},
    world::World,
};
use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a branch ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutcomeKind {
    /// Nothing changes any more.
    Quiescent,
    /// The changes repeat.
    Periodic {
        period: u32,
        /// Whether only uncounted cells still change.
        semi_quiescent: bool,
    },
    /// The generation limit is reached.
    MaxGeneration,
}

impl Display for OutcomeKind {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            OutcomeKind::Quiescent => write!(f, "fizzle"),
            OutcomeKind::Periodic {
                period: 1,
                semi_quiescent,
            } => write!(f, "stable{}", if *semi_quiescent { " (semi)" } else { "" }),
            OutcomeKind::Periodic {
                period,
                semi_quiescent,
            } => write!(
                f,
                "period {}{}",
                period,
                if *semi_quiescent { " (semi)" } else { "" }
            ),
            OutcomeKind::MaxGeneration => write!(f, "max generation"),
        }
    }
}

/// A reported end of a branch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// The generation at which the branch ends.
    pub gen: u32,
    /// The changed cells of every generation, from generation 0.
    pub history: Vec<Vec<Coord>>,
    pub stats: Vec<GenStats>,
}

/// Hash of a history of changes.
///
/// Equal hashes are taken for equal histories.
pub fn history_hash<'a, I>(history: I) -> u64
where
    I: IntoIterator<Item = &'a [Coord]>,
{
    history
        .into_iter()
        .flatten()
        .fold(0u64, |h, &(row, col)| {
            let h = h.wrapping_mul(31).wrapping_add(row as u64);
            h.wrapping_mul(31).wrapping_add(col as u64)
        })
}

/// Hashes of the histories seen so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Seen {
    hashes: HashSet<u64>,
    capacity: usize,
}

impl Seen {
    pub fn new(capacity: usize) -> Self {
        Seen {
            hashes: HashSet::new(),
            capacity,
        }
    }

    /// Records a hash. Returns whether it is new.
    pub fn insert(&mut self, hash: u64) -> Result<bool, Error> {
        if self.hashes.contains(&hash) {
            return Ok(false);
        }
        if self.hashes.len() >= self.capacity {
            return Err(Error::CapacityExceeded(Buffer::HashTable, self.capacity));
        }
        self.hashes.insert(hash);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl World {
    /// Whether the branch ends at generation `gen`, which `current` holds.
    pub(crate) fn classify(&self, gen: u32) -> Option<OutcomeKind> {
        let changes = self.changes(gen);
        if changes.is_empty() {
            return Some(OutcomeKind::Quiescent);
        }
        // The changes of `g0` are those of `gen` when they all still differ
        // from the background.
        let repeated = (0..gen).rev().find(|&g0| {
            let earlier = self.changes(g0);
            earlier.len() == changes.len()
                && earlier
                    .iter()
                    .all(|&cell| self.current(cell) != self.background(cell))
        });
        if let Some(g0) = repeated {
            let semi_quiescent = changes
                .iter()
                .all(|&cell| self.flags(cell).contains(CellFlags::UNCOUNTED));
            return Some(OutcomeKind::Periodic {
                period: gen - g0,
                semi_quiescent,
            });
        }
        if gen >= self.config.max_gen {
            return Some(OutcomeKind::MaxGeneration);
        }
        None
    }

    pub(crate) fn is_skipped(&self, kind: OutcomeKind) -> bool {
        match kind {
            OutcomeKind::Quiescent => self.config.skip_fizzle,
            OutcomeKind::Periodic {
                period: 1,
                semi_quiescent: false,
            } => self.config.skip_stable,
            _ => false,
        }
    }

    pub(crate) fn history_hash(&self, gen: u32) -> u64 {
        history_hash((0..=gen).map(|g| self.changes(g)))
    }

    pub(crate) fn outcome_at(&self, kind: OutcomeKind, gen: u32) -> Outcome {
        Outcome {
            kind,
            gen,
            history: (0..=gen).map(|g| self.changes(g).to_vec()).collect(),
            stats: self.gen_stats(),
        }
    }
}
