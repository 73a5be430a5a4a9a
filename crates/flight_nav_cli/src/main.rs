//! Navigation scene runner.
//!
//! Builds the octree for a scene file, runs every query in it through the
//! path scheduler and prints the results.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=flight_nav=debug` to see
//! build and per-search summaries.

mod scene;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flight_nav::{BuildStats, Octree, PathScheduler, RequestStatus};

use scene::Scene;

/// Pause between scheduler ticks.
const TICK: Duration = Duration::from_millis(1);

/// Builds a navigation octree from a scene and runs its path queries.
#[derive(Parser, Debug)]
#[command(name = "flight_nav")]
#[command(about = "Builds a navigation octree from a TOML scene and runs its path queries")]
struct Args {
	/// Path to the scene TOML file.
	#[arg(short, long)]
	scene: PathBuf,

	/// Print every leaf with its bounds and occupancy.
	#[arg(long)]
	dump_leaves: bool,

	/// Override the scene's max_concurrency.
	#[arg(long)]
	max_concurrency: Option<usize>,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	println!("Loading scene from: {}", args.scene.display());
	let scene = Scene::load(&args.scene)?;

	let mut config = scene.nav_config();
	if let Some(max_concurrency) = args.max_concurrency {
		config.scheduler.max_concurrency = max_concurrency;
	}
	config.validate().context("Invalid command line overrides")?;

	let obstacles = scene.obstacle_set();
	println!(
		"Building octree over {} obstacles (min cell size {})",
		obstacles.len(),
		config.build.min_cell_size
	);
	let tree = Arc::new(
		Octree::build(scene.region(), &obstacles, &config.build).context("Building octree")?,
	);
	print_stats(tree.stats());

	if args.dump_leaves {
		dump_leaves(&tree);
	}

	if scene.queries.is_empty() {
		println!("\nNo queries in scene");
		return Ok(());
	}

	let mut scheduler =
		PathScheduler::new(Arc::clone(&tree), config.scheduler).context("Starting path scheduler")?;
	let handles: Vec<_> = scene
		.queries
		.iter()
		.map(|query| scheduler.submit(query.start(), query.goal(), query.agent()))
		.collect();

	let mut ticks = 0usize;
	while !scheduler.is_idle() {
		scheduler.step();
		ticks += 1;
		thread::sleep(TICK);
	}
	println!(
		"\nFinished {} queries in {} ticks ({} at once)",
		handles.len(),
		ticks,
		config.scheduler.max_concurrency
	);

	for (index, (query, handle)) in scene.queries.iter().zip(handles).enumerate() {
		let request = scheduler.request(handle)?;
		println!(
			"\nQuery {}: {} -> {}",
			index,
			query.start(),
			query.goal()
		);

		match request.outcome() {
			Some(Ok(outcome)) => {
				println!(
					"  {} waypoints{} ({} cells expanded, {} yields, {} us)",
					outcome.path.len(),
					if outcome.partial { ", partial" } else { "" },
					outcome.stats.expanded,
					outcome.stats.yields,
					outcome.stats.elapsed_us
				);
				for point in &outcome.path {
					println!("    {:>8.2} {:>8.2} {:>8.2}", point.x, point.y, point.z);
				}
			}
			Some(Err(err)) => println!("  no path: {}", err),
			None => anyhow::bail!(
				"query {} still {:?} after the scheduler went idle",
				index,
				request.status()
			),
		}

		debug_assert_eq!(request.status(), RequestStatus::Done);
		scheduler.release(handle)?;
	}

	Ok(())
}

fn print_stats(stats: &BuildStats) {
	println!("  cells:          {}", stats.cell_count);
	println!(
		"  leaves:         {} ({} occupied)",
		stats.leaf_count, stats.occupied_leaf_count
	);
	println!("  max depth:      {}", stats.max_depth);
	if stats.oracle_failures > 0 {
		println!("  oracle errors:  {}", stats.oracle_failures);
	}
	println!("  build:          {} us", stats.build_us);
	println!("  link:           {} us", stats.link_us);
}

fn dump_leaves(tree: &Octree) {
	println!("\nLeaves:");
	for leaf in tree.leaves() {
		let (min, max) = (leaf.region.min(), leaf.region.max());
		println!(
			"  {:>6} d{} {} [{:.2}, {:.2}, {:.2}] - [{:.2}, {:.2}, {:.2}]",
			leaf.id.raw(),
			leaf.depth,
			if leaf.occupied { "blocked" } else { "free   " },
			min.x,
			min.y,
			min.z,
			max.x,
			max.y,
			max.z
		);
	}
}
