#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs path queries against a map file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tilepath_core::{PathfinderKind, Position, SearchConfig, TieBreak, WorldData};
use tilepath_world::pathfinding::{path_cost, PathGoal};
use tilepath_world::World;

/// Finds a walkable route between two points of a chunked tile map.
#[derive(Debug, Parser)]
#[command(name = "tilepath", version)]
struct Args {
    /// Map file holding a JSON-encoded world record.
    #[arg(long)]
    map: PathBuf,

    /// Horizontal start coordinate in tile units.
    from_x: f32,
    /// Vertical start coordinate in tile units.
    from_y: f32,
    /// Horizontal goal coordinate in tile units.
    to_x: f32,
    /// Vertical goal coordinate in tile units.
    to_y: f32,

    /// Search strategy executing the query.
    #[arg(long, value_enum, default_value = "indexed")]
    strategy: Strategy,

    /// Perturb equal-cost choices with the provided jitter seed.
    #[arg(long)]
    jitter_seed: Option<u64>,

    /// Abort the search after expanding this many tiles.
    #[arg(long)]
    iteration_cap: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Strategy {
    /// List-based search with linearly scanned score vectors.
    Scan,
    /// Index-based search with flat score arrays.
    Indexed,
}

impl From<Strategy> for PathfinderKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Scan => Self::Scan,
            Strategy::Indexed => Self::Indexed,
        }
    }
}

/// Entry point for the Tilepath command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let raw = fs::read_to_string(&args.map)
        .with_context(|| format!("reading map file {}", args.map.display()))?;
    let data: WorldData = serde_json::from_str(&raw)
        .with_context(|| format!("decoding map file {}", args.map.display()))?;

    let config = SearchConfig {
        tie_break: match args.jitter_seed {
            Some(seed) => TieBreak::Jittered { seed },
            None => TieBreak::Deterministic,
        },
        iteration_cap: args.iteration_cap,
    };
    let mut world = World::new(args.strategy.into(), config);
    world.import(data).context("importing map")?;

    let start = Position::new(args.from_x, args.from_y);
    let goal = Position::new(args.to_x, args.to_y);
    match world.find_path(start, PathGoal::Point(goal)) {
        Some(path) => {
            for tile in &path {
                let global = tile.global_position();
                println!("{} {}", global.column(), global.row());
            }
            println!(
                "{} tiles, cost {}",
                path.len(),
                path_cost(&path)
            );
        }
        None => println!("no path"),
    }

    Ok(())
}
