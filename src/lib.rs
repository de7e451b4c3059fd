//! Strix - waypoint trajectory planning and dynamic obstacle avoidance
//!
//! This library provides the navigation core of an autonomous aerial vehicle:
//! a two-tier route (sparse outer polygon, densified inner segments), an
//! obstacle map fed asynchronously by perception, replanning of the active
//! segment through a pluggable optimizer, and the arrival state machine that
//! decides which waypoint is commanded.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
/// Geometry, obstacle map, trajectory store and cursor
pub mod core;
pub mod error;
pub mod navigation;
pub mod sim;

// Re-export commonly used items for easier access
pub use crate::config::StrixConfig;
pub use crate::core::{Insertion, NavigationCursor, Obstacle, ObstacleMap, Point2};
pub use crate::error::{Result, StrixError};
pub use crate::navigation::{
    ClearanceOptimizer, Detection, Guidance, NavigationCore, NavigationStatus, ObstacleIngestor,
    PoseSource, TickReport, TrajectoryOptimizer, WaypointId,
};
