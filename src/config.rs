//! Configuration loading for Strix
//!
//! Every constant the avoider used to bake in at compile time lives here and is
//! read from YAML. [`StrixConfig::validate`] must pass before a
//! [`NavigationCore`](crate::navigation::NavigationCore) is built; an invalid
//! configuration is a startup failure, never a runtime one.

use crate::error::{Result, StrixError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StrixConfig {
    /// Outer polygon and inner segment sizing
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
    /// Obstacle map limits
    #[serde(default)]
    pub obstacles: ObstacleConfig,
    /// Arrival checks and cycle rate
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Reference optimizer tuning
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Trajectory sizing and outer waypoint policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    /// Number of outer waypoints, start position included
    #[serde(default = "default_outer_length")]
    pub outer_length: usize,

    /// Points per inner segment when first built
    #[serde(default = "default_inner_length")]
    pub inner_length: usize,

    /// Capacity of every inner segment after replanning
    #[serde(default = "default_inner_space")]
    pub inner_space: usize,

    /// Outer points 1..outer_length (point 0 is always the start position)
    #[serde(default = "default_outer_waypoints")]
    pub outer_waypoints: Vec<[f64; 2]>,

    /// Treat `outer_waypoints` as offsets from the start position
    #[serde(default)]
    pub relative_waypoints: bool,
}

/// Obstacle map limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObstacleConfig {
    /// Map capacity
    #[serde(default = "default_max_obstacles")]
    pub max_obstacles: usize,

    /// Detections closer than this to a known obstacle are the same obstacle (meters)
    #[serde(default = "default_duplicate_radius")]
    pub duplicate_radius: f64,

    /// Range substituted for a zero sensor reading (meters)
    #[serde(default = "default_min_sensed_distance")]
    pub min_sensed_distance: f64,
}

/// Navigation state machine parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Distance under which a waypoint counts as reached (meters)
    #[serde(default = "default_arrival_threshold")]
    pub arrival_threshold: f64,

    /// Periodic task rate used by the demo binary (Hz)
    #[serde(default = "default_cycle_hz")]
    pub cycle_hz: f64,
}

/// Reference optimizer tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Minimum distance kept between path points and obstacles (meters)
    #[serde(default = "default_clearance")]
    pub clearance: f64,

    /// Gap above which a midpoint is inserted (meters)
    #[serde(default = "default_max_spacing")]
    pub max_spacing: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            outer_length: default_outer_length(),
            inner_length: default_inner_length(),
            inner_space: default_inner_space(),
            outer_waypoints: default_outer_waypoints(),
            relative_waypoints: false,
        }
    }
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            max_obstacles: default_max_obstacles(),
            duplicate_radius: default_duplicate_radius(),
            min_sensed_distance: default_min_sensed_distance(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: default_arrival_threshold(),
            cycle_hz: default_cycle_hz(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            clearance: default_clearance(),
            max_spacing: default_max_spacing(),
        }
    }
}

impl StrixConfig {
    /// Loads and validates a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: StrixConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parses and validates a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: StrixConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks sizing and threshold invariants
    pub fn validate(&self) -> Result<()> {
        let t = &self.trajectory;
        if t.outer_length < 2 {
            return Err(invalid(format!(
                "outer_length must be at least 2, got {}",
                t.outer_length
            )));
        }
        if t.inner_length == 0 {
            return Err(invalid("inner_length must be positive".to_string()));
        }
        if t.inner_length > t.inner_space {
            return Err(invalid(format!(
                "inner_length {} exceeds inner_space {}",
                t.inner_length, t.inner_space
            )));
        }
        if t.outer_waypoints.len() != t.outer_length - 1 {
            return Err(invalid(format!(
                "expected {} outer waypoints after the start, got {}",
                t.outer_length - 1,
                t.outer_waypoints.len()
            )));
        }
        if t.outer_waypoints.iter().flatten().any(|c| !c.is_finite()) {
            return Err(invalid("outer waypoints must be finite".to_string()));
        }

        if self.obstacles.max_obstacles == 0 {
            return Err(invalid("max_obstacles must be positive".to_string()));
        }
        positive("duplicate_radius", self.obstacles.duplicate_radius)?;
        positive("min_sensed_distance", self.obstacles.min_sensed_distance)?;
        positive("arrival_threshold", self.navigation.arrival_threshold)?;
        positive("cycle_hz", self.navigation.cycle_hz)?;
        positive("clearance", self.optimizer.clearance)?;
        positive("max_spacing", self.optimizer.max_spacing)?;

        Ok(())
    }
}

fn invalid(msg: String) -> StrixError {
    StrixError::Config(msg)
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be positive and finite, got {}", name, value)))
    }
}

// Default value functions
fn default_outer_length() -> usize {
    3
}
fn default_inner_length() -> usize {
    10
}
fn default_inner_space() -> usize {
    30
}
fn default_outer_waypoints() -> Vec<[f64; 2]> {
    vec![[2.0, 2.0], [2.0, -2.0]]
}
fn default_max_obstacles() -> usize {
    20
}
fn default_duplicate_radius() -> f64 {
    1.0
}
fn default_min_sensed_distance() -> f64 {
    0.5
}
fn default_arrival_threshold() -> f64 {
    0.5
}
fn default_cycle_hz() -> f64 {
    10.0
}
fn default_clearance() -> f64 {
    0.8
}
fn default_max_spacing() -> f64 {
    0.5
}
