//! Navigation system for Strix
//!
//! This module owns the periodic navigation task: it builds the two-tier
//! trajectory on the first cycle, checks arrival at the commanded waypoints,
//! replans the active inner segment when the obstacle map changed and advances
//! the cursor. Obstacle ingestion runs concurrently through an
//! [`ObstacleIngestor`] handle and only ever touches the shared map and the
//! dirty flag.

/// Initial trajectory construction
pub mod builder;
/// Pose and guidance collaborators
pub mod controller;
/// Obstacle ingestion from perception
pub mod ingestion;
/// Replanning and path optimizers
pub mod planner;

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use builder::TrajectoryBuilder;
pub use controller::{Guidance, PoseSource, WaypointId};
pub use ingestion::{Detection, IngestReport, ObstacleIngestor};
pub use planner::{ClearanceOptimizer, ReplanReport, Replanner, TrajectoryOptimizer};

use crate::config::StrixConfig;
use crate::core::geometry::{horizontal_distance, Point2};
use crate::core::obstacle_map::{Obstacle, ObstacleMap};
use crate::core::state::NavigationCursor;
use crate::core::trajectory::TrajectoryStore;
use crate::error::{Result, StrixError};
use ingestion::lock_map;

/// What happened during one periodic cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The trajectory was built on this cycle
    pub initialized: bool,
    /// The inner waypoint was moved
    pub inner_advanced: bool,
    /// The outer waypoint was moved
    pub outer_advanced: bool,
    /// Number of optimizer invocations (dirty map and/or new leg)
    pub replans: u8,
}

/// Navigation status
#[derive(Clone, Debug, Serialize)]
pub struct NavigationStatus {
    /// Whether the trajectory has been built
    pub initialized: bool,
    /// Current cursor
    pub cursor: NavigationCursor,
    /// Obstacles in the map
    pub obstacle_count: usize,
    /// Obstacles dropped because the map was full
    pub dropped_obstacles: u64,
    /// Successful replans
    pub replans: u64,
    /// Failed replans
    pub replan_failures: u64,
    /// Optimizer time of the latest replan
    pub last_replan_latency: Option<Duration>,
}

/// Trajectory planning and avoidance core.
///
/// Owns every piece of mutable navigation state. The periodic task calls
/// [`tick`](Self::tick); perception feeds obstacles through the handle returned
/// by [`ingestor`](Self::ingestor).
pub struct NavigationCore<G, O> {
    config: StrixConfig,
    builder: TrajectoryBuilder,
    store: Option<TrajectoryStore>,
    cursor: NavigationCursor,
    obstacle_map: Arc<Mutex<ObstacleMap>>,
    map_updated: Arc<AtomicBool>,
    pose: Arc<dyn PoseSource>,
    guidance: G,
    replanner: Replanner<O>,
    inner_target: Point2,
}

impl<G: Guidance, O: TrajectoryOptimizer> NavigationCore<G, O> {
    /// Creates a core after validating `config`
    pub fn new(
        config: StrixConfig,
        pose: Arc<dyn PoseSource>,
        guidance: G,
        optimizer: O,
    ) -> Result<Self> {
        config.validate()?;
        let obstacle_map = ObstacleMap::new(
            config.obstacles.max_obstacles,
            config.obstacles.duplicate_radius,
        );

        Ok(NavigationCore {
            builder: TrajectoryBuilder::new(&config.trajectory),
            config,
            store: None,
            cursor: NavigationCursor::new(),
            obstacle_map: Arc::new(Mutex::new(obstacle_map)),
            map_updated: Arc::new(AtomicBool::new(false)),
            pose,
            guidance,
            replanner: Replanner::new(optimizer),
            inner_target: Point2::origin(),
        })
    }

    /// Handle for the perception side
    pub fn ingestor(&self) -> ObstacleIngestor {
        ObstacleIngestor::new(
            Arc::clone(&self.obstacle_map),
            Arc::clone(&self.map_updated),
            Arc::clone(&self.pose),
            self.config.obstacles.min_sensed_distance,
        )
    }

    /// Runs one navigation cycle
    pub fn tick(&mut self) -> Result<TickReport> {
        let mut report = TickReport::default();

        let position = self.pose.position();
        if self.store.is_none() {
            self.initialize(position)?;
            report.initialized = true;
        }
        let outer_len = self.config.trajectory.outer_length;
        let threshold = self.config.navigation.arrival_threshold;

        // Check how close we are to both targets
        let outer_target = self.store()?.outer_point(self.cursor.outer_index)?;
        let mse_outer = horizontal_distance(&position, &outer_target);
        let mse_inner = horizontal_distance(&position, &self.inner_target);

        // New obstacles since the last cycle: replan the leg being flown
        if self.map_updated.swap(false, Ordering::AcqRel) {
            self.replan_active();
            report.replans += 1;
        }

        if mse_inner < threshold && self.cursor.trajectory_valid {
            let segment = self.store()?.segment(self.cursor.subtraj_index)?;
            let size = segment.size();
            if let Some(target) = segment.get(self.cursor.inner_index) {
                debug!(
                    "[INNER TRAJECTORY] Setting new waypoint at {}, going to: ({:.2}/{:.2})",
                    self.cursor.inner_index, target.x, target.y
                );
                self.inner_target = target;
                self.guidance.move_waypoint(WaypointId::Inner, target);
                report.inner_advanced = true;
            }
            self.cursor.advance_inner(size);
        }

        if mse_outer < threshold {
            self.cursor.advance_outer(outer_len);
            let target = self.store()?.outer_point(self.cursor.outer_index)?;
            info!(
                "[OUTER TRAJECTORY] Setting new waypoint at {}, going to: ({:.2}/{:.2})",
                self.cursor.outer_index, target.x, target.y
            );
            self.guidance.move_waypoint(WaypointId::Outer, target);
            report.outer_advanced = true;

            self.replan_active();
            report.replans += 1;
        }

        self.guidance.proceed_toward(WaypointId::Inner);
        Ok(report)
    }

    fn initialize(&mut self, start: Point2) -> Result<()> {
        let store = self.builder.build(start)?;
        let first_outer = store.outer_point(0)?;
        let first_inner = store.segment(0)?.get(0).unwrap_or(first_outer);

        self.guidance.move_waypoint(WaypointId::Outer, first_outer);
        self.guidance.move_waypoint(WaypointId::Inner, first_inner);
        self.inner_target = first_inner;
        self.store = Some(store);
        info!(
            "Trajectory initialized: {} outer waypoints, {} inner points per leg",
            self.config.trajectory.outer_length, self.config.trajectory.inner_length
        );
        Ok(())
    }

    /// Replans the leg being flown and updates its validity. A shorter plan
    /// pulls the inner index back onto its last point; an empty plan leaves
    /// nothing to walk, so the leg stays invalid until the next replan.
    fn replan_active(&mut self) {
        let segment = self.cursor.subtraj_index;
        self.cursor.trajectory_valid = match self.replan(segment) {
            Ok(report) => {
                if self.cursor.clamp_inner(report.size) {
                    debug!(
                        "[INNER TRAJECTORY] Segment {} shrank to {} points, inner index now {}",
                        segment, report.size, self.cursor.inner_index
                    );
                }
                if report.size == 0 {
                    warn!("Segment {} replanned to an empty path, leg marked invalid", segment);
                }
                report.size > 0
            }
            Err(_) => false,
        };
    }

    fn replan(&mut self, segment: usize) -> Result<ReplanReport> {
        // Snapshot under the lock; the optimizer runs without holding it
        let obstacles: Vec<Obstacle> = lock_map(&self.obstacle_map).obstacles().to_vec();
        let store = self.store.as_mut().ok_or_else(not_initialized)?;
        let result = self.replanner.replan(store, segment, &obstacles);
        match &result {
            Ok(report) => debug!(
                "Replanned segment {} around {} obstacles: {} points",
                report.segment,
                obstacles.len(),
                report.size
            ),
            Err(_) => warn!("Leg {} marked invalid until the next successful replan", segment),
        }
        result
    }

    fn store(&self) -> Result<&TrajectoryStore> {
        self.store.as_ref().ok_or_else(not_initialized)
    }

    /// Current cursor
    pub fn cursor(&self) -> NavigationCursor {
        self.cursor
    }

    /// Built trajectory, `None` before the first cycle
    pub fn trajectory(&self) -> Option<&TrajectoryStore> {
        self.store.as_ref()
    }

    /// Position of the inner guidance waypoint last commanded
    pub fn inner_target(&self) -> Point2 {
        self.inner_target
    }

    /// Snapshot of the obstacle map
    pub fn obstacles(&self) -> Vec<Obstacle> {
        lock_map(&self.obstacle_map).obstacles().to_vec()
    }

    /// Guidance sink the core commands
    pub fn guidance(&self) -> &G {
        &self.guidance
    }

    /// Get current navigation status
    pub fn get_status(&self) -> NavigationStatus {
        let map = lock_map(&self.obstacle_map);
        NavigationStatus {
            initialized: self.store.is_some(),
            cursor: self.cursor,
            obstacle_count: map.len(),
            dropped_obstacles: map.dropped(),
            replans: self.replanner.replans(),
            replan_failures: self.replanner.failures(),
            last_replan_latency: self.replanner.last_latency(),
        }
    }
}

fn not_initialized() -> StrixError {
    StrixError::NotInitialized
}
