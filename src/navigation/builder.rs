// src/navigation/builder.rs
// One-time construction of the outer polygon and the straight-line inner
// segments between consecutive outer points.

use log::{debug, info};

use crate::config::TrajectoryConfig;
use crate::core::geometry::{interpolate, Point2};
use crate::core::trajectory::{InnerSegment, TrajectoryStore};
use crate::error::{Result, StrixError};

/// Builds the initial two-tier trajectory from configuration
pub struct TrajectoryBuilder {
    config: TrajectoryConfig,
}

impl TrajectoryBuilder {
    /// Creates a builder for the given sizing and waypoint policy
    pub fn new(config: &TrajectoryConfig) -> Self {
        TrajectoryBuilder {
            config: config.clone(),
        }
    }

    /// Outer polygon: the start position followed by the configured waypoints,
    /// absolute or offset from `start` depending on `relative_waypoints`.
    pub fn build_outer(&self, start: Point2) -> Vec<Point2> {
        info!("[OUTER TRAJECTORY] Starting position ({:.2}/{:.2})", start.x, start.y);

        let mut outer = Vec::with_capacity(self.config.outer_length);
        outer.push(start);
        for [x, y] in self.config.outer_waypoints.iter().copied() {
            let point = if self.config.relative_waypoints {
                Point2::new(start.x + x, start.y + y)
            } else {
                Point2::new(x, y)
            };
            info!("[OUTER TRAJECTORY] Point added: ({:.2}/{:.2})", point.x, point.y);
            outer.push(point);
        }
        outer
    }

    /// Evenly spaced points from `outer[index]` (excluded) to the next outer
    /// point (included), wrapping from the last index back to the first.
    pub fn build_inner(&self, outer: &[Point2], index: usize) -> Result<InnerSegment> {
        let start = outer.get(index).ok_or(StrixError::IndexOutOfRange {
            index,
            len: outer.len(),
        })?;
        let end = &outer[(index + 1) % outer.len()];

        let n = self.config.inner_length;
        let points: Vec<Point2> = (0..n)
            .map(|k| interpolate(start, end, (k + 1) as f64 / n as f64))
            .collect();
        for p in &points {
            debug!("[INNER TRAJECTORY] Point added: ({:.2}/{:.2})", p.x, p.y);
        }

        let mut segment = InnerSegment::new(self.config.inner_space);
        segment.install(&points)?;
        Ok(segment)
    }

    /// Full trajectory anchored at `start`
    pub fn build(&self, start: Point2) -> Result<TrajectoryStore> {
        let outer = self.build_outer(start);
        let segments = (0..outer.len())
            .map(|i| self.build_inner(&outer, i))
            .collect::<Result<Vec<_>>>()?;
        TrajectoryStore::new(outer, segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::horizontal_distance;
    use rstest::rstest;

    fn builder() -> TrajectoryBuilder {
        TrajectoryBuilder::new(&TrajectoryConfig::default())
    }

    #[test]
    fn outer_starts_at_vehicle_position() {
        let outer = builder().build_outer(Point2::new(0.0, 0.0));
        assert_eq!(
            outer,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(2.0, -2.0)
            ]
        );
    }

    #[test]
    fn relative_waypoints_follow_the_start() {
        let config = TrajectoryConfig {
            relative_waypoints: true,
            ..TrajectoryConfig::default()
        };
        let outer = TrajectoryBuilder::new(&config).build_outer(Point2::new(1.0, -1.0));
        assert_eq!(outer[1], Point2::new(3.0, 1.0));
        assert_eq!(outer[2], Point2::new(3.0, -3.0));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn inner_segment_ends_on_next_outer_point(#[case] index: usize) {
        let b = builder();
        let outer = b.build_outer(Point2::new(0.3, -0.1));
        let segment = b.build_inner(&outer, index).unwrap();

        assert_eq!(segment.size(), 10);
        assert_eq!(segment.capacity(), 30);
        assert_eq!(segment.get(9), Some(outer[(index + 1) % 3]));
    }

    #[test]
    fn inner_points_are_collinear_and_evenly_spaced() {
        let b = builder();
        let outer = b.build_outer(Point2::new(0.0, 0.0));
        let segment = b.build_inner(&outer, 0).unwrap();
        let points = segment.points();

        let step = horizontal_distance(&outer[0], &points[0]);
        assert!((step - 8.0_f64.sqrt() / 10.0).abs() < 1e-12);
        for pair in points.windows(2) {
            assert!((horizontal_distance(&pair[0], &pair[1]) - step).abs() < 1e-9);
            // on the y = x line
            assert!((pair[1].x - pair[1].y).abs() < 1e-12);
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn build_fills_every_leg() {
        let store = builder().build(Point2::new(0.0, 0.0)).unwrap();
        assert_eq!(store.outer_len(), 3);
        for i in 0..3 {
            let segment = store.segment(i).unwrap();
            assert_eq!(segment.size(), 10);
            assert_eq!(segment.raw(10), Some(Point2::origin()));
        }
        // last leg closes the polygon
        assert_eq!(store.segment(2).unwrap().get(9), Some(Point2::new(0.0, 0.0)));
    }

    #[test]
    fn out_of_range_leg_is_an_error() {
        let b = builder();
        let outer = b.build_outer(Point2::origin());
        assert!(b.build_inner(&outer, 3).is_err());
    }
}
