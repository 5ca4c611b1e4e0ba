mod args;
mod output;

use anyhow::{Context, Result};
use args::Args;
use drifter_lib::Status;
use log::info;

fn main() -> Result<()> {
    let args = Args::parse()?;
    tracing_subscriber::fmt()
        .with_max_level(args.level)
        .with_writer(std::io::stderr)
        .init();
    search(&args)
}

/// Runs the search and prints the outcomes until the limit is reached
/// or there are no more.
fn search(args: &Args) -> Result<()> {
    let mut world = args.config.world().context("Invalid configuration")?;
    let limit = match (args.all, args.limit) {
        (true, _) => None,
        (false, Some(limit)) => Some(limit),
        (false, None) => Some(1),
    };
    let mut found = 0;
    while limit.map_or(true, |limit| found < limit) {
        match world.search(Some(args.step))? {
            Status::Found => {
                found += 1;
                if let Some(outcome) = world.outcome() {
                    println!("{}", output::render(&world, outcome, args.format)?);
                }
            }
            Status::None => break,
            Status::Searching => info!(
                "Searching generation {} (deepest {}), {} conflicts",
                world.gen(),
                world.deepest_gen(),
                world.conflicts()
            ),
        }
    }
    info!("{} outcomes, {} conflicts", found, world.conflicts());
    Ok(())
}
