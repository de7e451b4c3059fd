// core/mod.rs

// Declares and exposes the data layer of Strix: planar geometry, the obstacle
// map, the two-tier trajectory store and the navigation cursor. Nothing in here
// talks to collaborators; the navigation module drives these types.

/// Planar points and distances
pub mod geometry;
/// Bounded obstacle store
pub mod obstacle_map;
/// Navigation cursor
pub mod state;
/// Outer polygon and inner segments
pub mod trajectory;

// Re-export key types for a unified API
pub use geometry::{horizontal_distance, interpolate, project_detection, Point2};
pub use obstacle_map::{Insertion, Obstacle, ObstacleMap};
pub use state::NavigationCursor;
pub use trajectory::{InnerSegment, TrajectoryStore};
