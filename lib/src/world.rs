//! The world: the background lattice and its decision log.

use crate::{
    cells::{offset, CellFlags, Coord, State, NEIGHBORS},
    config::{Config, RegionOp, Symmetry},
    error::{AssignError, Error},
    rules::{Rule, RuleTables},
    search::{Generation, Outcome, Seen},
};
use log::debug;
use rand::{rngs::StdRng, SeedableRng};

/// Where the generation advancer stood when a free decision was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// The generation being computed.
    pub gen: u32,
    /// Position of the examined cell in the change list.
    pub frontier_pos: usize,
    /// End of the change list.
    pub changed_end: usize,
    /// Age sum of the changes of `gen` so far.
    pub age_sum: u32,
}

/// A record in the decision log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decision {
    pub coord: Coord,
    pub state: State,
    /// Whether the state was chosen freely, rather than deduced.
    ///
    /// Only free decisions are retried with the other state.
    pub free: bool,
    /// Where to resume computing generations when this decision is undone.
    pub cursor: Option<Cursor>,
}

/// The world.
pub struct World {
    /// World configuration.
    pub(crate) config: Config,

    /// The rule of the cellular automaton.
    pub(crate) rule: Rule,

    pub(crate) tables: RuleTables,

    pub(crate) height: i32,

    pub(crate) width: i32,

    /// Background states, row-major.
    background: Vec<State>,

    /// States of the generation next to the one being computed.
    ///
    /// It differs from the background exactly on the changes of
    /// that generation.
    current: Vec<State>,

    /// Weighted sums of the background states of the 8 neighbors.
    sums: Vec<u8>,

    flags: Vec<CellFlags>,

    /// A stack to record the background cells whose values are set
    /// during the search.
    ///
    /// It is used in the backtracking.
    pub(crate) decisions: Vec<Decision>,

    /// The position of the next decision whose consequences are
    /// to be examined.
    pub(crate) check_index: usize,

    /// Changed cells and examined cells of every generation.
    ///
    /// See [`Generation`] for the layout.
    pub(crate) cells: Vec<Coord>,

    /// Finalized generations.
    pub(crate) gens: Vec<Generation>,

    /// The generation being computed.
    pub(crate) gen: u32,

    /// Position of the next cell to examine in [`cells`](#structfield.cells).
    pub(crate) cursor: usize,

    /// Age sum of the changes recorded so far in the generation being
    /// computed.
    pub(crate) age_sum: u32,

    /// Marks used to deduplicate the cells to examine.
    pub(crate) marks: Vec<bool>,

    pub(crate) rng: StdRng,

    pub(crate) seen: Seen,

    /// The last reported outcome.
    pub(crate) outcome: Option<Outcome>,

    /// Whether the current branch has ended, so the search must backtrack
    /// before going on.
    pub(crate) must_backtrack: bool,

    /// Whether the whole search space is exhausted.
    pub(crate) exhausted: bool,

    /// The deepest generation ever finalized.
    pub(crate) deepest: u32,

    /// Number of conflicts during the search.
    pub(crate) conflicts: u64,
}

impl World {
    /// Creates a new world from the configuration and the rule.
    ///
    /// Prefer [`Config::world`], which also validates the configuration.
    pub fn new(config: &Config, rule: Rule) -> Result<Self, Error> {
        let size = (config.height * config.width) as usize;
        let mut world = World {
            config: config.clone(),
            rule,
            tables: RuleTables::new(&rule),
            height: config.height,
            width: config.width,
            background: vec![State::Unknown; size],
            current: vec![State::Unknown; size],
            sums: vec![0; size],
            flags: vec![CellFlags::empty(); size],
            decisions: Vec::with_capacity(size),
            check_index: 0,
            cells: Vec::new(),
            gens: Vec::new(),
            gen: 0,
            cursor: 0,
            age_sum: 0,
            marks: vec![false; size],
            rng: StdRng::seed_from_u64(config.seed),
            seen: Seen::new(config.capacity.hash_table),
            outcome: None,
            must_backtrack: false,
            exhausted: false,
            deepest: 0,
            conflicts: 0,
        }
        .init_border()
        .init_sums();

        world.init_patterns()?;
        world.init_regions()?;

        // Nothing given before the search may be undone.
        world.decisions.clear();
        world.check_index = 0;

        world.start()?;
        debug!(
            "Created a {} x {} world for rule {} with symmetry {}",
            world.height, world.width, world.rule, world.config.symmetry
        );
        Ok(world)
    }

    /// The outer two rings are dead, fixed and uncounted.
    fn init_border(mut self) -> Self {
        for row in 0..self.height {
            for col in 0..self.width {
                if self.is_border((row, col)) {
                    let i = self.index((row, col));
                    self.background[i] = State::Off;
                    self.current[i] = State::Off;
                    self.flags[i] = CellFlags::FIXED | CellFlags::UNCOUNTED;
                }
            }
        }
        self
    }

    fn init_sums(mut self) -> Self {
        for row in 0..self.height {
            for col in 0..self.width {
                let sum: u8 = NEIGHBORS
                    .iter()
                    .map(|&d| self.background(offset((row, col), d)).weight())
                    .sum();
                let i = self.index((row, col));
                self.sums[i] = sum;
            }
        }
        self
    }

    fn init_patterns(&mut self) -> Result<(), Error> {
        let patterns = self.config.patterns.clone();
        for pattern in &patterns {
            for cell in pattern.cells()? {
                let coord = cell.coord;
                if !self.contains(coord) || (cell.changed && self.is_border(coord)) {
                    return Err(Error::SetCell(coord));
                }
                let i = self.index(coord);
                if cell.fixed {
                    self.flags[i] |= CellFlags::FIXED;
                }
                if self.config.uncount_known && cell.uncounted_when_known {
                    self.flags[i] |= CellFlags::UNCOUNTED;
                }
                if let Some(state) = cell.background {
                    match self.background[i] {
                        State::Unknown => self
                            .commit(coord, state, false)
                            .map_err(|_| Error::SetCell(coord))?,
                        known if known != state => return Err(Error::SetCell(coord)),
                        _ => (),
                    }
                    if cell.changed && !self.cells.contains(&coord) {
                        self.cells.push(coord);
                    }
                }
            }
        }
        Ok(())
    }

    fn init_regions(&mut self) -> Result<(), Error> {
        let regions = self.config.regions.clone();
        for op in &regions {
            let (min_row, min_col, max_row, max_col) = op.region().bounding_box();
            for row in min_row.max(0)..=max_row.min(self.height - 1) {
                for col in min_col.max(0)..=max_col.min(self.width - 1) {
                    let coord = (row, col);
                    if !op.region().contains(coord) {
                        continue;
                    }
                    let i = self.index(coord);
                    match *op {
                        RegionOp::Clear { .. } => {
                            if self.background[i] == State::Unknown {
                                self.commit(coord, State::Off, false)
                                    .map_err(|_| Error::SetCell(coord))?;
                            }
                        }
                        RegionOp::Flag { flag, .. } => self.flags[i].insert(flag.into()),
                        RegionOp::Unflag { flag, .. } => self.flags[i].remove(flag.into()),
                    }
                }
            }
        }
        Ok(())
    }

    /// World configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The rule of the cellular automaton.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub(crate) fn index(&self, (row, col): Coord) -> usize {
        (row * self.width + col) as usize
    }

    /// Whether the cell is inside the world.
    #[inline]
    pub fn contains(&self, (row, col): Coord) -> bool {
        row >= 0 && row < self.height && col >= 0 && col < self.width
    }

    /// Whether the cell is in the outer two rings.
    #[inline]
    pub fn is_border(&self, (row, col): Coord) -> bool {
        row < 2 || col < 2 || row >= self.height - 2 || col >= self.width - 2
    }

    /// Background state of a cell. Cells outside the world are dead.
    pub fn background(&self, coord: Coord) -> State {
        if self.contains(coord) {
            self.background[self.index(coord)]
        } else {
            State::Off
        }
    }

    /// State of a cell in the generation before the one being computed.
    pub fn current(&self, coord: Coord) -> State {
        if self.contains(coord) {
            self.current[self.index(coord)]
        } else {
            State::Off
        }
    }

    /// Weighted sum of the background states of the neighbors of a cell.
    pub fn neighbor_sum(&self, coord: Coord) -> u8 {
        if self.contains(coord) {
            self.sums[self.index(coord)]
        } else {
            0
        }
    }

    pub fn flags(&self, coord: Coord) -> CellFlags {
        if self.contains(coord) {
            self.flags[self.index(coord)]
        } else {
            CellFlags::FIXED | CellFlags::UNCOUNTED
        }
    }

    /// The decision log, oldest first.
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Sets the background state of an unknown cell, and replicates it
    /// over the symmetry orbit of the cell.
    ///
    /// Consequences are not deduced; see [`commit`](Self::commit).
    pub fn assign(&mut self, coord: Coord, state: State, free: bool) -> Result<(), AssignError> {
        self.assign_with(coord, state, free, None)
    }

    pub(crate) fn assign_with(
        &mut self,
        coord: Coord,
        state: State,
        free: bool,
        cursor: Option<Cursor>,
    ) -> Result<(), AssignError> {
        if !self.contains(coord) || self.is_border(coord) {
            return Err(AssignError::Immutable(coord));
        }
        if !state.is_known() {
            return Err(AssignError::UnknownState(coord));
        }
        if self.background(coord).is_known() {
            return Err(AssignError::NotUnknown(coord));
        }
        self.set_state(coord, state);
        self.decisions.push(Decision {
            coord,
            state,
            free,
            cursor,
        });
        self.replicate(coord, state)
    }

    /// Whether the symmetry applies to a cell.
    ///
    /// The mirror symmetries `D2-` and `D2|` may be limited to the columns
    /// or the rows from a given one on.
    fn is_replicated(&self, (row, col): Coord) -> bool {
        match self.config.symmetry {
            Symmetry::D2Row => col >= self.config.symmetry_from_col as i32,
            Symmetry::D2Col => row >= self.config.symmetry_from_row as i32,
            _ => true,
        }
    }

    /// Assigns the images of a cell under the symmetry.
    fn replicate(&mut self, coord: Coord, state: State) -> Result<(), AssignError> {
        if !self.is_replicated(coord) {
            return Ok(());
        }
        let state = if self.config.day_night { !state } else { state };
        for transform in self.config.symmetry.images() {
            let image = transform.act_on(coord, self.height, self.width);
            match self.background(image) {
                State::Unknown => {
                    self.set_state(image, state);
                    self.decisions.push(Decision {
                        coord: image,
                        state,
                        free: false,
                        cursor: None,
                    });
                }
                known if known == state => (),
                _ => return Err(AssignError::Contradiction(image)),
            }
        }
        Ok(())
    }

    /// Undoes the last decision, making the cell unknown again.
    pub fn revert_last(&mut self) -> Option<Decision> {
        let decision = self.decisions.pop()?;
        self.set_state(decision.coord, State::Unknown);
        Some(decision)
    }

    /// Sets the state of a cell in both the background and the current
    /// generation, and updates the neighbor sums.
    fn set_state(&mut self, coord: Coord, state: State) {
        let i = self.index(coord);
        let delta = state.weight() as i16 - self.background[i].weight() as i16;
        self.background[i] = state;
        self.current[i] = state;
        for &d in NEIGHBORS.iter() {
            let neighbor = offset(coord, d);
            if self.contains(neighbor) {
                let j = self.index(neighbor);
                self.sums[j] = (self.sums[j] as i16 + delta) as u8;
            }
        }
    }

    /// Flips the current states of the changes of a generation.
    ///
    /// Flipping the changes of the generation `current` holds turns it
    /// back into the background, and vice versa.
    pub(crate) fn toggle(&mut self, gen: u32) {
        let (start, end) = self.changed_range(gen);
        for k in start..end {
            let i = self.index(self.cells[k]);
            self.current[i] = !self.current[i];
        }
    }
}
