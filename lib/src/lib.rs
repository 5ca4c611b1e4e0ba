//! Searches for drifters: patterns that evolve in a still-life background,
//! where the background itself is decided during the search.

mod cells;
mod config;
mod error;
pub mod rules;
mod search;
mod world;

pub use cells::{CellFlags, Coord, State};
pub use config::{
    Axis, Bounds, Capacity, Config, Drift, Flag, Pattern, Region, RegionOp, Symmetry, Transform,
    Window, SIGNATURE_5C9,
};
pub use error::{AssignError, Buffer, Error};
pub use search::{
    history_hash, Conflict, GenStats, Outcome, OutcomeKind, Rejection, Seen, Status,
};
pub use world::{Cursor, Decision, World};
