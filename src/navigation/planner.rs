// src/navigation/planner.rs
// Replanning trigger: hands the active inner segment and the current obstacle
// snapshot to a path optimizer and installs whatever comes back.

use log::{debug, warn};
use nalgebra::Vector2;
use std::time::{Duration, Instant};

use crate::config::OptimizerConfig;
use crate::core::geometry::{horizontal_distance, interpolate, Point2};
use crate::core::obstacle_map::Obstacle;
use crate::core::trajectory::TrajectoryStore;
use crate::error::Result;

/// Collision-avoiding path optimizer.
///
/// Receives the obstacle snapshot, the valid points of the segment being
/// replanned and the segment capacity. Must return at most `capacity` points;
/// longer outputs are rejected by the [`Replanner`].
pub trait TrajectoryOptimizer {
    /// New points for the segment whose valid points are `current`
    fn optimize(
        &mut self,
        obstacles: &[Obstacle],
        current: &[Point2],
        capacity: usize,
    ) -> Result<Vec<Point2>>;
}

impl<F> TrajectoryOptimizer for F
where
    F: FnMut(&[Obstacle], &[Point2], usize) -> Result<Vec<Point2>>,
{
    fn optimize(
        &mut self,
        obstacles: &[Obstacle],
        current: &[Point2],
        capacity: usize,
    ) -> Result<Vec<Point2>> {
        self(obstacles, current, capacity)
    }
}

/// Result of a successful replan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplanReport {
    /// Segment that was rewritten
    pub segment: usize,
    /// New valid size of that segment
    pub size: usize,
    /// Time spent inside the optimizer
    pub latency: Duration,
}

/// Invokes the optimizer and installs its output, keeping the old segment on failure
pub struct Replanner<O> {
    optimizer: O,
    replans: u64,
    failures: u64,
    last_latency: Option<Duration>,
}

impl<O: TrajectoryOptimizer> Replanner<O> {
    /// Wraps `optimizer` with zeroed counters
    pub fn new(optimizer: O) -> Self {
        Replanner {
            optimizer,
            replans: 0,
            failures: 0,
            last_latency: None,
        }
    }

    /// Rewrites segment `index` of `store` from the optimizer's output.
    ///
    /// Slots past the new size are zeroed. If the optimizer fails or returns
    /// more points than the segment holds, the segment keeps its previous
    /// contents and the error is returned.
    pub fn replan(
        &mut self,
        store: &mut TrajectoryStore,
        index: usize,
        obstacles: &[Obstacle],
    ) -> Result<ReplanReport> {
        let segment = store.segment_mut(index)?;

        let started = Instant::now();
        let outcome = self
            .optimizer
            .optimize(obstacles, segment.points(), segment.capacity());
        let latency = started.elapsed();
        self.last_latency = Some(latency);
        debug!(
            "Time taken for trajectory optimization: {:.3} ms ({} obstacles)",
            latency.as_secs_f64() * 1000.0,
            obstacles.len()
        );

        match outcome.and_then(|points| segment.install(&points).map(|_| points.len())) {
            Ok(size) => {
                self.replans += 1;
                Ok(ReplanReport {
                    segment: index,
                    size,
                    latency,
                })
            }
            Err(e) => {
                self.failures += 1;
                warn!("Replanning segment {} failed, keeping previous path: {}", index, e);
                Err(e)
            }
        }
    }

    /// Successful replans so far
    pub fn replans(&self) -> u64 {
        self.replans
    }

    /// Failed replans so far
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Optimizer time of the most recent attempt
    pub fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }
}

/// Reference optimizer: pushes path points out of each obstacle's clearance
/// disc, then inserts midpoints where the pushed path became too sparse.
/// The last point (the next outer waypoint) is never moved.
#[derive(Clone, Debug)]
pub struct ClearanceOptimizer {
    clearance: f64,
    max_spacing: f64,
}

impl ClearanceOptimizer {
    /// Optimizer tuned by `config`
    pub fn new(config: &OptimizerConfig) -> Self {
        ClearanceOptimizer {
            clearance: config.clearance,
            max_spacing: config.max_spacing,
        }
    }

    fn push_clear(&self, point: Point2, obstacles: &[Obstacle]) -> Point2 {
        obstacles.iter().fold(point, |p, obstacle| {
            let offset = p - obstacle.location;
            let distance = offset.norm();
            if distance >= self.clearance {
                p
            } else if distance > 1e-9 {
                obstacle.location + offset * (self.clearance / distance)
            } else {
                // sitting on the obstacle: no gradient, step sideways
                obstacle.location + Vector2::new(self.clearance, 0.0)
            }
        })
    }
}

impl TrajectoryOptimizer for ClearanceOptimizer {
    fn optimize(
        &mut self,
        obstacles: &[Obstacle],
        current: &[Point2],
        capacity: usize,
    ) -> Result<Vec<Point2>> {
        let Some(last) = current.len().checked_sub(1) else {
            return Ok(Vec::new());
        };

        let mut path: Vec<Point2> = current
            .iter()
            .enumerate()
            .map(|(i, p)| if i == last { *p } else { self.push_clear(*p, obstacles) })
            .collect();

        let mut i = 0;
        while i + 1 < path.len() && path.len() < capacity {
            if horizontal_distance(&path[i], &path[i + 1]) > self.max_spacing {
                let mid = interpolate(&path[i], &path[i + 1], 0.5);
                path.insert(i + 1, self.push_clear(mid, obstacles));
            } else {
                i += 1;
            }
        }

        path.truncate(capacity);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trajectory::InnerSegment;
    use crate::error::StrixError;

    fn store_with(points: &[Point2], capacity: usize) -> TrajectoryStore {
        let mut segment = InnerSegment::new(capacity);
        segment.install(points).unwrap();
        TrajectoryStore::new(vec![Point2::origin(), Point2::new(1.0, 0.0)], vec![
            segment.clone(),
            segment,
        ])
        .unwrap()
    }

    fn row(n: usize) -> Vec<Point2> {
        (1..=n).map(|i| Point2::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn shorter_plan_zeroes_the_old_tail() {
        let mut store = store_with(&row(6), 10);
        let mut replanner = Replanner::new(
            |_: &[Obstacle], current: &[Point2], _: usize| -> Result<Vec<Point2>> {
                Ok(current[..3].to_vec())
            },
        );

        let report = replanner.replan(&mut store, 1, &[]).unwrap();
        assert_eq!(report.size, 3);
        assert_eq!(report.segment, 1);

        let segment = store.segment(1).unwrap();
        assert_eq!(segment.points(), &row(3)[..]);
        for i in 3..10 {
            assert_eq!(segment.raw(i), Some(Point2::origin()));
        }
        // other legs untouched
        assert_eq!(store.segment(0).unwrap().size(), 6);
        assert_eq!(replanner.replans(), 1);
        assert!(replanner.last_latency().is_some());
    }

    #[test]
    fn optimizer_sees_snapshot_and_capacity() {
        let mut store = store_with(&row(4), 12);
        let obstacles = [Obstacle {
            location: Point2::new(2.0, 2.0),
        }];
        let mut replanner = Replanner::new(
            |obs: &[Obstacle], current: &[Point2], capacity: usize| -> Result<Vec<Point2>> {
                assert_eq!(obs.len(), 1);
                assert_eq!(current.len(), 4);
                assert_eq!(capacity, 12);
                Ok(current.to_vec())
            },
        );
        replanner.replan(&mut store, 0, &obstacles).unwrap();
    }

    #[test]
    fn failure_keeps_previous_segment() {
        let mut store = store_with(&row(5), 8);
        let before = store.segment(0).unwrap().clone();
        let mut replanner = Replanner::new(
            |_: &[Obstacle], _: &[Point2], _: usize| -> Result<Vec<Point2>> {
                Err(StrixError::Optimizer("diverged".to_string()))
            },
        );

        assert!(matches!(
            replanner.replan(&mut store, 0, &[]),
            Err(StrixError::Optimizer(_))
        ));
        assert_eq!(store.segment(0).unwrap(), &before);
        assert_eq!(replanner.failures(), 1);
        assert_eq!(replanner.replans(), 0);
    }

    #[test]
    fn oversized_output_is_rejected() {
        let mut store = store_with(&row(2), 4);
        let mut replanner = Replanner::new(
            |_: &[Obstacle], _: &[Point2], _: usize| -> Result<Vec<Point2>> { Ok(row(5)) },
        );
        assert!(matches!(
            replanner.replan(&mut store, 0, &[]),
            Err(StrixError::SegmentOverflow { len: 5, capacity: 4 })
        ));
        assert_eq!(store.segment(0).unwrap().points(), &row(2)[..]);
    }

    #[test]
    fn unknown_segment_is_an_error() {
        let mut store = store_with(&row(2), 4);
        let mut replanner = Replanner::new(ClearanceOptimizer::new(&OptimizerConfig::default()));
        assert!(matches!(
            replanner.replan(&mut store, 7, &[]),
            Err(StrixError::IndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn clearance_optimizer_keeps_points_out_of_obstacles() {
        let mut optimizer = ClearanceOptimizer::new(&OptimizerConfig {
            clearance: 0.8,
            max_spacing: 0.5,
        });
        let current: Vec<Point2> = (1..=10).map(|i| Point2::new(i as f64 * 0.3, 0.0)).collect();
        let obstacles = [Obstacle {
            location: Point2::new(1.5, 0.1),
        }];

        let path = optimizer.optimize(&obstacles, &current, 30).unwrap();

        assert!(path.len() >= current.len());
        assert!(path.len() <= 30);
        assert_eq!(path.last(), current.last());
        for p in &path[..path.len() - 1] {
            assert!(horizontal_distance(p, &obstacles[0].location) >= 0.8 - 1e-9);
        }
    }

    #[test]
    fn clearance_optimizer_without_obstacles_is_identity_for_dense_paths() {
        let mut optimizer = ClearanceOptimizer::new(&OptimizerConfig::default());
        let current: Vec<Point2> = (1..=10).map(|i| Point2::new(i as f64 * 0.2, 0.0)).collect();
        assert_eq!(optimizer.optimize(&[], &current, 30).unwrap(), current);
        assert!(optimizer.optimize(&[], &[], 30).unwrap().is_empty());
    }

    #[test]
    fn densification_respects_capacity() {
        let mut optimizer = ClearanceOptimizer::new(&OptimizerConfig::default());
        let current = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let path = optimizer.optimize(&[], &current, 5).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.last(), Some(&Point2::new(10.0, 0.0)));
    }
}
