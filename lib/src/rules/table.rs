//! Lookup tables compiled from a rule.
//!
//! Both tables are indexed by an encoded neighbor sum `k + 16 * u`, where
//! `k` is the number of alive neighbors and `u` the number of unknown ones.
//! Sums that no neighborhood can produce are left as `Unknown`/`NoInfo`.

use super::Rule;
use crate::cells::{State, SUMS, UNKNOWN_WEIGHT};

/// What the consistency of a stable background implies for a cell
/// and its neighborhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Implication {
    /// Nothing can be deduced yet.
    NoInfo,
    /// No completion of the neighborhood is stable.
    Conflict,
    /// Every unknown neighbor must be dead.
    NeighborsOff,
    /// Every unknown neighbor must be alive.
    NeighborsOn,
    /// The cell itself must be dead.
    CellOff,
    /// The cell itself must be alive.
    CellOn,
}

/// The transition table and the consistency table of a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTables {
    /// `(dead | alive, sum) -> next state`, unknown if undetermined.
    trans: [[State; SUMS]; 2],
    /// `(background, sum) -> implication`.
    consistency: [[Implication; SUMS]; 3],
}

impl RuleTables {
    /// Compiles the tables of a rule.
    pub fn new(rule: &Rule) -> Self {
        RuleTables {
            trans: [[State::Unknown; SUMS]; 2],
            consistency: [[Implication::NoInfo; SUMS]; 3],
        }
        .init_trans(rule)
        .init_consistency(rule)
    }

    /// The state of a known cell in the next generation.
    #[inline]
    pub fn transition(&self, state: State, sum: u8) -> State {
        match state {
            State::Off => self.trans[0][sum as usize],
            State::On => self.trans[1][sum as usize],
            State::Unknown => State::Unknown,
        }
    }

    /// What the stability of the background implies for a cell in
    /// state `state` whose neighbor sum is `sum`.
    #[inline]
    pub fn implication(&self, state: State, sum: u8) -> Implication {
        self.consistency[index(state)][sum as usize]
    }

    fn init_trans(mut self, rule: &Rule) -> Self {
        for (k, u) in neighborhoods() {
            let sum = k + UNKNOWN_WEIGHT as usize * u;
            let births = (k..=k + u).filter(|&n| rule.birth(n)).count();
            let survivals = (k..=k + u).filter(|&n| rule.survival(n)).count();
            self.trans[0][sum] = decided(births, u);
            self.trans[1][sum] = decided(survivals, u);
        }
        self
    }

    fn init_consistency(mut self, rule: &Rule) -> Self {
        for state in [State::Off, State::On, State::Unknown] {
            for (k, u) in neighborhoods() {
                let sum = k + UNKNOWN_WEIGHT as usize * u;
                self.consistency[index(state)][sum] = implication(rule, state, k, u);
            }
        }
        self
    }
}

#[inline]
fn index(state: State) -> usize {
    match state {
        State::Off => 0,
        State::On => 1,
        State::Unknown => 2,
    }
}

/// All pairs `(alive, unknown)` of neighbor counts.
fn neighborhoods() -> impl Iterator<Item = (usize, usize)> {
    (0..=8).flat_map(|u| (0..=8 - u).map(move |k| (k, u)))
}

fn decided(hits: usize, unknowns: usize) -> State {
    if hits == unknowns + 1 {
        State::On
    } else if hits == 0 {
        State::Off
    } else {
        State::Unknown
    }
}

/// The background must be stable: a dead cell must not be born, an alive
/// one must survive.
fn implication(rule: &Rule, state: State, k: usize, u: usize) -> Implication {
    let may_be_off = state != State::On;
    let may_be_on = state != State::Off;

    // Completions in which the cell stays as it is.
    let sterile = if may_be_off {
        (k..=k + u).filter(|&n| !rule.birth(n)).count()
    } else {
        0
    };
    let survivable = if may_be_on {
        (k..=k + u).filter(|&n| rule.survival(n)).count()
    } else {
        0
    };

    if sterile == 0 && survivable == 0 {
        return Implication::Conflict;
    }
    if state == State::Unknown {
        if sterile == 0 {
            return Implication::CellOn;
        }
        if survivable == 0 {
            return Implication::CellOff;
        }
    }
    if u == 0 {
        return Implication::NoInfo;
    }

    let off_forces_off = sterile == 1 && !rule.birth(k);
    let off_forces_on = sterile == 1 && !rule.birth(k + u);
    let on_forces_off = survivable == 1 && rule.survival(k);
    let on_forces_on = survivable == 1 && rule.survival(k + u);

    let (forces_off, forces_on) = match state {
        State::Off => (off_forces_off, off_forces_on),
        State::On => (on_forces_off, on_forces_on),
        State::Unknown => (
            off_forces_off && on_forces_off,
            off_forces_on && on_forces_on,
        ),
    };

    if forces_off {
        Implication::NeighborsOff
    } else if forces_on {
        Implication::NeighborsOn
    } else {
        Implication::NoInfo
    }
}
