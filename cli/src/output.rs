//! Printing the outcomes.

use anyhow::Result;
use drifter_lib::{Outcome, State, World};
use std::fmt::{self, Write};

/// Output format of the outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Format {
    /// The background and the changes of every generation.
    Text,
    /// One JSON object per line.
    Json,
    /// A YAML document per outcome.
    Yaml,
}

/// Renders an outcome, found in `world`.
pub(crate) fn render(world: &World, outcome: &Outcome, format: Format) -> Result<String> {
    Ok(match format {
        Format::Text => text(world, outcome)?,
        Format::Json => serde_json::to_string(outcome)?,
        Format::Yaml => format!("---\n{}", serde_yaml::to_string(outcome)?),
    })
}

fn text(world: &World, outcome: &Outcome) -> Result<String, fmt::Error> {
    let start = outcome.history.first().map_or(&[][..], Vec::as_slice);
    let mut out = String::new();
    writeln!(
        out,
        "{} at generation {}, rule = {}",
        outcome.kind,
        outcome.gen,
        world.rule()
    )?;
    for row in 0..world.height() {
        for col in 0..world.width() {
            let c = match (world.background((row, col)), start.contains(&(row, col))) {
                (State::Off, false) => '.',
                (State::On, false) => 'o',
                (State::Off, true) => '1',
                (State::On, true) => '0',
                (State::Unknown, _) => '?',
            };
            out.push(c);
        }
        out.push('\n');
    }
    for (gen, (changes, stats)) in outcome.history.iter().zip(&outcome.stats).enumerate() {
        write!(
            out,
            "gen {}: {} changes ({} x {})",
            gen, stats.change_count, stats.width, stats.height
        )?;
        for (row, col) in changes {
            write!(out, " ({}, {})", row, col)?;
        }
        out.push('\n');
    }
    Ok(out)
}
