// core/state.rs

// Navigation cursor: which outer waypoint is targeted, which point of the
// active inner segment is commanded, and whether that segment may be walked.
// Behaves as a two-level counter; the outer level wraps around the polygon.

use serde::Serialize;

/// Process-wide navigation position within the two-tier trajectory.
///
/// `subtraj_index` names the active inner segment, i.e. the leg that ends at
/// `outer[outer_index]`. After every outer advance it equals
/// `outer_index - 1`, or `outer_len - 1` when `outer_index` wrapped to 0. The
/// only time the two disagree with that rule is before the first outer advance,
/// when both start at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavigationCursor {
    /// Outer waypoint currently targeted
    pub outer_index: usize,
    /// Point of the active segment currently commanded
    pub inner_index: usize,
    /// Active inner segment
    pub subtraj_index: usize,
    /// Whether the active segment came from a successful replan
    pub trajectory_valid: bool,
}

impl NavigationCursor {
    /// Cursor at the start of the route
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to the next outer waypoint, wrapping after `outer_len - 1`, and
    /// restarts the inner walk at the first point of the new active segment.
    pub fn advance_outer(&mut self, outer_len: usize) {
        if self.outer_index + 1 < outer_len {
            self.outer_index += 1;
            self.subtraj_index = self.outer_index - 1;
        } else {
            self.outer_index = 0;
            self.subtraj_index = outer_len - 1;
        }
        self.inner_index = 0;
    }

    /// Steps to the next inner point unless already on the last valid one.
    /// Returns whether the index moved.
    pub fn advance_inner(&mut self, segment_size: usize) -> bool {
        if self.inner_index + 1 < segment_size {
            self.inner_index += 1;
            true
        } else {
            false
        }
    }

    /// Pulls the inner index back onto the last valid point of a segment that
    /// shrank to `segment_size`. Returns whether the index moved.
    pub fn clamp_inner(&mut self, segment_size: usize) -> bool {
        let last = segment_size.saturating_sub(1);
        if self.inner_index > last {
            self.inner_index = last;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn starts_at_zero_and_invalid() {
        let cursor = NavigationCursor::new();
        assert_eq!(cursor.outer_index, 0);
        assert_eq!(cursor.inner_index, 0);
        assert_eq!(cursor.subtraj_index, 0);
        assert!(!cursor.trajectory_valid);
    }

    #[rstest]
    #[case(0, 1, 0)]
    #[case(1, 2, 1)]
    #[case(2, 0, 2)]
    fn outer_advance_tracks_departed_leg(
        #[case] from: usize,
        #[case] outer: usize,
        #[case] subtraj: usize,
    ) {
        let mut cursor = NavigationCursor {
            outer_index: from,
            inner_index: 4,
            ..NavigationCursor::default()
        };
        cursor.advance_outer(3);
        assert_eq!(cursor.outer_index, outer);
        assert_eq!(cursor.subtraj_index, subtraj);
        assert_eq!(cursor.inner_index, 0);
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut cursor = NavigationCursor::new();
        for _ in 0..5 {
            cursor.advance_outer(5);
        }
        assert_eq!(cursor.outer_index, 0);
        assert_eq!(cursor.subtraj_index, 4);
    }

    #[test]
    fn inner_advance_stops_on_last_point() {
        let mut cursor = NavigationCursor::new();
        assert!(cursor.advance_inner(3));
        assert!(cursor.advance_inner(3));
        assert!(!cursor.advance_inner(3));
        assert_eq!(cursor.inner_index, 2);
    }

    #[test]
    fn inner_advance_on_empty_segment_is_a_no_op() {
        let mut cursor = NavigationCursor::new();
        assert!(!cursor.advance_inner(0));
        assert_eq!(cursor.inner_index, 0);
    }

    #[rstest]
    #[case(6, 3, 2, true)]
    #[case(1, 3, 1, false)]
    #[case(4, 0, 0, true)]
    fn clamp_pulls_index_onto_shrunk_segment(
        #[case] index: usize,
        #[case] size: usize,
        #[case] expected: usize,
        #[case] moved: bool,
    ) {
        let mut cursor = NavigationCursor {
            inner_index: index,
            ..NavigationCursor::default()
        };
        assert_eq!(cursor.clamp_inner(size), moved);
        assert_eq!(cursor.inner_index, expected);
    }
}
