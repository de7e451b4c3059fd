// core/obstacle_map.rs

// Append-only store of detected obstacle positions. New detections are merged
// into existing entries when they fall inside the duplicate radius, so the map
// holds one entry per physical obstacle. Entries are never moved or removed,
// which lets the replanner read a snapshot while ingestion keeps appending.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::geometry::{horizontal_distance, is_finite, Point2};

/// A detected obstacle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Absolute position in the local frame
    pub location: Point2,
}

/// Outcome of an insertion attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// Appended as a new obstacle
    Added,
    /// Within the duplicate radius of a known obstacle, or malformed
    Duplicate,
    /// Capacity exhausted
    Full,
}

/// Capacity-bounded, deduplicated obstacle set in arrival order
#[derive(Clone, Debug)]
pub struct ObstacleMap {
    obstacles: Vec<Obstacle>,
    capacity: usize,
    duplicate_radius: f64,
    dropped: u64,
}

impl ObstacleMap {
    /// Creates an empty map holding at most `capacity` obstacles
    pub fn new(capacity: usize, duplicate_radius: f64) -> Self {
        ObstacleMap {
            obstacles: Vec::with_capacity(capacity),
            capacity,
            duplicate_radius,
            dropped: 0,
        }
    }

    /// Inserts `position` unless it duplicates a known obstacle or the map is full
    pub fn insert(&mut self, position: Point2) -> Insertion {
        if !is_finite(&position) || self.contains_near(&position) {
            debug!(
                "Obstacle at {:.2}/{:.2} already known",
                position.x, position.y
            );
            return Insertion::Duplicate;
        }

        if self.obstacles.len() >= self.capacity {
            self.dropped += 1;
            warn!(
                "Obstacle map full ({} entries), dropping obstacle at {:.2}/{:.2} ({} dropped so far)",
                self.capacity, position.x, position.y, self.dropped
            );
            return Insertion::Full;
        }

        self.obstacles.push(Obstacle { location: position });
        Insertion::Added
    }

    /// Returns whether a new obstacle was actually inserted
    pub fn try_add(&mut self, position: Point2) -> bool {
        self.insert(position) == Insertion::Added
    }

    /// True if any known obstacle lies within the duplicate radius of `position`.
    /// A NaN distance counts as a match: no useful information, nothing to add.
    pub fn contains_near(&self, position: &Point2) -> bool {
        self.obstacles.iter().any(|obstacle| {
            let distance = horizontal_distance(&obstacle.location, position);
            distance < self.duplicate_radius || distance.is_nan()
        })
    }

    /// Obstacles in arrival order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Obstacles stored
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// True before the first obstacle
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Maximum number of obstacles
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of obstacles rejected because the map was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn close_detection_is_a_duplicate() {
        let mut map = ObstacleMap::new(20, 1.0);
        assert!(map.try_add(Point2::new(3.0, 3.0)));
        assert!(!map.try_add(Point2::new(3.5, 3.2)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn repeated_position_is_added_once() {
        let mut map = ObstacleMap::new(20, 1.0);
        let p = Point2::new(-4.2, 0.7);
        assert_eq!(map.insert(p), Insertion::Added);
        assert_eq!(map.insert(p), Insertion::Duplicate);
        assert_eq!(map.obstacles(), &[Obstacle { location: p }]);
    }

    #[rstest]
    #[case(Point2::new(1.0, 0.0), Insertion::Added)]
    #[case(Point2::new(0.99, 0.0), Insertion::Duplicate)]
    #[case(Point2::new(0.6, 0.6), Insertion::Duplicate)]
    #[case(Point2::new(0.8, 0.8), Insertion::Added)]
    fn radius_is_a_strict_bound(#[case] candidate: Point2, #[case] expected: Insertion) {
        let mut map = ObstacleMap::new(20, 1.0);
        map.insert(Point2::origin());
        assert_eq!(map.insert(candidate), expected);
    }

    #[test]
    fn nan_position_is_treated_as_known() {
        let mut map = ObstacleMap::new(20, 1.0);
        assert_eq!(map.insert(Point2::new(f64::NAN, 1.0)), Insertion::Duplicate);
        map.insert(Point2::new(5.0, 5.0));
        assert_eq!(map.insert(Point2::new(1.0, f64::NAN)), Insertion::Duplicate);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn never_exceeds_capacity_and_counts_drops() {
        let mut map = ObstacleMap::new(3, 1.0);
        for i in 0..10 {
            map.insert(Point2::new(i as f64 * 2.0, 0.0));
        }
        assert_eq!(map.len(), 3);
        assert_eq!(map.dropped(), 7);
    }

    #[test]
    fn duplicate_in_full_map_is_not_a_drop() {
        let mut map = ObstacleMap::new(1, 1.0);
        map.insert(Point2::new(0.0, 0.0));
        assert_eq!(map.insert(Point2::new(0.1, 0.1)), Insertion::Duplicate);
        assert_eq!(map.dropped(), 0);
    }
}
