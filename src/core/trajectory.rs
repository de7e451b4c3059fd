// core/trajectory.rs

// Two-tier route storage: a sparse outer polygon and, for every outer leg, a
// dense inner segment that the replanner rewrites in place. Inner segments keep
// a fixed number of slots; everything past the valid size reads as the origin
// so a shorter plan never exposes the tail of a longer one.

use crate::error::{Result, StrixError};

use super::geometry::{origin, Point2};

/// Fixed-capacity point sequence for one outer leg
#[derive(Clone, Debug, PartialEq)]
pub struct InnerSegment {
    points: Vec<Point2>, // always `capacity` long, zero padded
    size: usize,
}

impl InnerSegment {
    /// Empty segment with `capacity` zeroed slots
    pub fn new(capacity: usize) -> Self {
        InnerSegment {
            points: vec![origin(); capacity],
            size: 0,
        }
    }

    /// Number of valid points
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// True when no point is valid
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Valid prefix
    pub fn points(&self) -> &[Point2] {
        &self.points[..self.size]
    }

    /// Valid point at `index`
    pub fn get(&self, index: usize) -> Option<Point2> {
        self.points().get(index).copied()
    }

    /// Any slot, including the zeroed tail
    pub fn raw(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    /// Overwrites the segment with `points` and zeroes every remaining slot.
    /// On overflow the segment is left untouched.
    pub fn install(&mut self, points: &[Point2]) -> Result<()> {
        if points.len() > self.capacity() {
            return Err(StrixError::SegmentOverflow {
                len: points.len(),
                capacity: self.capacity(),
            });
        }

        let (valid, tail) = self.points.split_at_mut(points.len());
        valid.copy_from_slice(points);
        tail.fill(origin());
        self.size = points.len();
        Ok(())
    }
}

/// Outer polygon plus one inner segment per outer index
#[derive(Clone, Debug)]
pub struct TrajectoryStore {
    outer: Vec<Point2>,
    segments: Vec<InnerSegment>,
}

impl TrajectoryStore {
    /// Pairs an outer polygon with its segments; one segment per outer point
    pub fn new(outer: Vec<Point2>, segments: Vec<InnerSegment>) -> Result<Self> {
        if outer.len() != segments.len() {
            return Err(StrixError::Config(format!(
                "{} outer points but {} inner segments",
                outer.len(),
                segments.len()
            )));
        }
        Ok(TrajectoryStore { outer, segments })
    }

    /// Outer polygon, start position first
    pub fn outer(&self) -> &[Point2] {
        &self.outer
    }

    /// Number of outer waypoints
    pub fn outer_len(&self) -> usize {
        self.outer.len()
    }

    /// Outer waypoint `index`
    pub fn outer_point(&self, index: usize) -> Result<Point2> {
        self.outer
            .get(index)
            .copied()
            .ok_or(StrixError::IndexOutOfRange {
                index,
                len: self.outer.len(),
            })
    }

    /// Segment leading from `outer[index]` to the next outer point
    pub fn segment(&self, index: usize) -> Result<&InnerSegment> {
        let len = self.segments.len();
        self.segments
            .get(index)
            .ok_or(StrixError::IndexOutOfRange { index, len })
    }

    /// Mutable access for the replanner
    pub fn segment_mut(&mut self, index: usize) -> Result<&mut InnerSegment> {
        let len = self.segments.len();
        self.segments
            .get_mut(index)
            .ok_or(StrixError::IndexOutOfRange { index, len })
    }

    /// Outer index following `index`, wrapping after the last point
    pub fn next_outer_index(&self, index: usize) -> usize {
        (index + 1) % self.outer.len()
    }
}
