//! Scene file parsing.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use flight_nav::{
	AgentParams, BuildConfig, LayerMask, NavConfig, Obstacle, ObstacleSet, Region, SchedulerConfig,
	TimeBudget,
};
use glam::Vec3;
use serde::Deserialize;

/// Root of a scene file: the volume, its obstacles and the queries to run.
#[derive(Debug, Deserialize)]
pub struct Scene {
	/// Volume covered by the octree.
	pub region: RegionConfig,
	/// Smallest cell size blocked cells are refined to.
	#[serde(default = "default_min_cell_size")]
	pub min_cell_size: f32,
	/// Layers that count as blocking (default: all).
	#[serde(default)]
	pub mask_layers: Option<Vec<u32>>,
	/// Searches allowed to run at once.
	#[serde(default = "default_max_concurrency")]
	pub max_concurrency: usize,
	#[serde(default)]
	pub budget: BudgetConfig,
	#[serde(default)]
	pub obstacles: Vec<ObstacleConfig>,
	#[serde(default)]
	pub queries: Vec<QueryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RegionConfig {
	pub center: [f32; 3],
	pub half_extents: [f32; 3],
}

/// Per-search time slicing, in milliseconds. `slice_ms = 0` disables it.
#[derive(Debug, Deserialize)]
pub struct BudgetConfig {
	#[serde(default = "default_slice_ms")]
	pub slice_ms: u64,
	#[serde(default = "default_pause_ms")]
	pub pause_ms: u64,
}

impl Default for BudgetConfig {
	fn default() -> Self {
		Self {
			slice_ms: default_slice_ms(),
			pause_ms: default_pause_ms(),
		}
	}
}

/// Solid box. Without a layer it blocks on every layer.
#[derive(Debug, Deserialize)]
pub struct ObstacleConfig {
	pub min: [f32; 3],
	pub max: [f32; 3],
	pub layer: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct QueryConfig {
	pub from: [f32; 3],
	pub to: [f32; 3],
	#[serde(default)]
	pub preferred_height: Option<f32>,
	#[serde(default)]
	pub min_height: Option<f32>,
	#[serde(default)]
	pub max_height: Option<f32>,
}

fn default_min_cell_size() -> f32 {
	BuildConfig::DEFAULT.min_cell_size
}

fn default_max_concurrency() -> usize {
	SchedulerConfig::DEFAULT.max_concurrency
}

fn default_slice_ms() -> u64 {
	TimeBudget::DEFAULT.slice.as_millis() as u64
}

fn default_pause_ms() -> u64 {
	TimeBudget::DEFAULT.pause.as_millis() as u64
}

impl Scene {
	/// Load a scene from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read scene file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate scene TOML.
	pub fn parse(content: &str) -> Result<Self> {
		let scene: Scene = toml::from_str(content).with_context(|| "Failed to parse scene TOML")?;

		if scene.region.half_extents.iter().any(|h| !h.is_finite() || *h <= 0.0) {
			anyhow::bail!(
				"region half_extents must be positive, got {:?}",
				scene.region.half_extents
			);
		}
		for layer in scene.mask_layers.iter().flatten() {
			if *layer >= 32 {
				anyhow::bail!("mask layer must be below 32, got {}", layer);
			}
		}
		for (index, obstacle) in scene.obstacles.iter().enumerate() {
			if (0..3).any(|axis| obstacle.min[axis] > obstacle.max[axis]) {
				anyhow::bail!("obstacle {} has min above max", index);
			}
			if obstacle.layer.is_some_and(|layer| layer >= 32) {
				anyhow::bail!("obstacle {} layer must be below 32", index);
			}
		}

		scene
			.nav_config()
			.validate()
			.with_context(|| "Invalid navigation settings")?;

		Ok(scene)
	}

	pub fn region(&self) -> Region {
		Region::new(
			Vec3::from(self.region.center),
			Vec3::from(self.region.half_extents),
		)
	}

	pub fn mask(&self) -> LayerMask {
		match &self.mask_layers {
			None => LayerMask::ALL,
			Some(layers) => LayerMask(
				layers
					.iter()
					.fold(0, |bits, layer| bits | LayerMask::layer(*layer).0),
			),
		}
	}

	pub fn nav_config(&self) -> NavConfig {
		NavConfig {
			build: BuildConfig {
				min_cell_size: self.min_cell_size,
				mask: self.mask(),
			},
			scheduler: SchedulerConfig {
				max_concurrency: self.max_concurrency,
				time_budget: TimeBudget {
					slice: Duration::from_millis(self.budget.slice_ms),
					pause: Duration::from_millis(self.budget.pause_ms),
				},
			},
		}
	}

	pub fn obstacle_set(&self) -> ObstacleSet {
		self
			.obstacles
			.iter()
			.map(|obstacle| Obstacle {
				bounds: Region::from_min_max(Vec3::from(obstacle.min), Vec3::from(obstacle.max)),
				layers: obstacle.layer.map_or(LayerMask::ALL, LayerMask::layer),
			})
			.collect()
	}
}

impl QueryConfig {
	pub fn start(&self) -> Vec3 {
		Vec3::from(self.from)
	}

	pub fn goal(&self) -> Vec3 {
		Vec3::from(self.to)
	}

	pub fn agent(&self) -> AgentParams {
		let defaults = AgentParams::DEFAULT;
		AgentParams {
			preferred_height: self.preferred_height.unwrap_or(defaults.preferred_height),
			min_height: self.min_height.unwrap_or(defaults.min_height),
			max_height: self.max_height.unwrap_or(defaults.max_height),
		}
	}
}
