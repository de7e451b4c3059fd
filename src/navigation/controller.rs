// src/navigation/controller.rs
// Collaborator seams of the navigation core: where the vehicle is, and where
// waypoint commands go. Implementations live outside the core (autopilot
// bindings, the simulator in `sim`, mocks in tests).

use crate::core::geometry::Point2;

/// Guidance waypoints the core steers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaypointId {
    /// Macro waypoint at the end of the current leg
    Outer,
    /// Densified waypoint the vehicle is actually flown to
    Inner,
}

/// Outbound waypoint commands
#[cfg_attr(test, mockall::automock)]
pub trait Guidance {
    /// Moves guidance waypoint `id` to `target`
    fn move_waypoint(&mut self, id: WaypointId, target: Point2);

    /// Flies toward waypoint `id`, heading along the direction of travel
    fn proceed_toward(&mut self, id: WaypointId);
}

/// Vehicle state estimate. Queried from both the periodic task and the
/// ingestion handler, hence `Send + Sync`.
pub trait PoseSource: Send + Sync {
    /// Horizontal position in the local frame
    fn position(&self) -> Point2;

    /// Yaw in radians
    fn yaw(&self) -> f64;
}
