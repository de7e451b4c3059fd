//! Simulated collaborators
//!
//! A point-mass vehicle that implements both [`PoseSource`] and [`Guidance`],
//! and a perception model that turns a fixed obstacle field into detections.
//! Used by the demo binary and by the integration tests.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::geometry::{horizontal_distance, Point2};
use crate::navigation::{Detection, Guidance, PoseSource, WaypointId};

/// Simulation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Vehicle start position
    #[serde(default)]
    pub start: [f64; 2],
    /// Distance flown per `proceed_toward` call (meters)
    #[serde(default = "default_step")]
    pub step: f64,
    /// Obstacles present in the world
    #[serde(default = "default_obstacles")]
    pub obstacles: Vec<[f64; 2]>,
    /// Obstacle radius used for the bearing spread (meters)
    #[serde(default = "default_obstacle_radius")]
    pub obstacle_radius: f64,
    /// Maximum sensing range (meters)
    #[serde(default = "default_sensor_range")]
    pub sensor_range: f64,
    /// Horizontal field of view (degrees)
    #[serde(default = "default_field_of_view")]
    pub field_of_view_deg: f64,
    /// Number of navigation cycles the demo runs
    #[serde(default = "default_cycles")]
    pub cycles: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: [0.0, 0.0],
            step: default_step(),
            obstacles: default_obstacles(),
            obstacle_radius: default_obstacle_radius(),
            sensor_range: default_sensor_range(),
            field_of_view_deg: default_field_of_view(),
            cycles: default_cycles(),
        }
    }
}

fn default_step() -> f64 {
    0.1
}
fn default_obstacles() -> Vec<[f64; 2]> {
    vec![[1.0, 1.1], [2.0, 0.1]]
}
fn default_obstacle_radius() -> f64 {
    0.2
}
fn default_sensor_range() -> f64 {
    3.0
}
fn default_field_of_view() -> f64 {
    90.0
}
fn default_cycles() -> usize {
    600
}

#[derive(Debug)]
struct VehicleState {
    position: Point2,
    yaw: f64,
    waypoints: HashMap<WaypointId, Point2>,
}

/// Point-mass vehicle. Clones share the same state, so one clone can be the
/// pose source while another receives guidance commands.
#[derive(Clone, Debug)]
pub struct SimulatedVehicle {
    state: Arc<Mutex<VehicleState>>,
    step: f64,
}

impl SimulatedVehicle {
    /// Vehicle at `start` flying `step` meters per guidance cycle
    pub fn new(start: Point2, step: f64) -> Self {
        SimulatedVehicle {
            state: Arc::new(Mutex::new(VehicleState {
                position: start,
                yaw: 0.0,
                waypoints: HashMap::new(),
            })),
            step,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VehicleState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Last position commanded for waypoint `id`
    pub fn waypoint(&self, id: WaypointId) -> Option<Point2> {
        self.lock().waypoints.get(&id).copied()
    }
}

impl PoseSource for SimulatedVehicle {
    fn position(&self) -> Point2 {
        self.lock().position
    }

    fn yaw(&self) -> f64 {
        self.lock().yaw
    }
}

impl Guidance for SimulatedVehicle {
    fn move_waypoint(&mut self, id: WaypointId, target: Point2) {
        self.lock().waypoints.insert(id, target);
    }

    fn proceed_toward(&mut self, id: WaypointId) {
        let step = self.step;
        let mut state = self.lock();
        let Some(target) = state.waypoints.get(&id).copied() else {
            return;
        };

        let offset = target - state.position;
        let distance = offset.norm();
        if distance <= f64::EPSILON {
            return;
        }
        // heading-following: nose along the direction of travel
        state.yaw = offset.x.atan2(offset.y);
        state.position = if distance <= step {
            target
        } else {
            state.position + offset * (step / distance)
        };
        debug!(
            "Vehicle at {:.2}/{:.2}, yaw {:.1} deg",
            state.position.x,
            state.position.y,
            state.yaw.to_degrees()
        );
    }
}

/// Perception model over a fixed obstacle field
#[derive(Clone, Debug)]
pub struct SimulatedPerception {
    obstacles: Vec<Point2>,
    obstacle_radius: f64,
    range: f64,
    half_fov: f64,
}

impl SimulatedPerception {
    /// Perception over the obstacles listed in `config`
    pub fn new(config: &SimulationConfig) -> Self {
        SimulatedPerception {
            obstacles: config
                .obstacles
                .iter()
                .map(|[x, y]| Point2::new(*x, *y))
                .collect(),
            obstacle_radius: config.obstacle_radius,
            range: config.sensor_range,
            half_fov: config.field_of_view_deg.to_radians() / 2.0,
        }
    }

    /// Detections of every obstacle inside range and field of view
    pub fn observe(&self, position: &Point2, yaw: f64) -> Vec<Detection> {
        self.obstacles
            .iter()
            .filter_map(|obstacle| {
                let distance = horizontal_distance(position, obstacle);
                if distance > self.range {
                    return None;
                }
                let offset = *obstacle - *position;
                let heading = wrap_angle(offset.x.atan2(offset.y) - yaw);
                if heading.abs() > self.half_fov {
                    return None;
                }
                let spread = if distance > self.obstacle_radius {
                    (self.obstacle_radius / distance).asin()
                } else {
                    PI / 2.0
                };
                Some(Detection {
                    distance,
                    left_bearing_deg: (heading - spread).to_degrees(),
                    right_bearing_deg: (heading + spread).to_degrees(),
                })
            })
            .collect()
    }
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ingestion::resolve_detection;

    #[test]
    fn vehicle_flies_toward_commanded_waypoint() {
        let mut vehicle = SimulatedVehicle::new(Point2::origin(), 0.5);
        vehicle.move_waypoint(WaypointId::Inner, Point2::new(0.0, 2.0));
        vehicle.proceed_toward(WaypointId::Inner);
        assert!((vehicle.position() - Point2::new(0.0, 0.5)).norm() < 1e-12);
        assert!(vehicle.yaw().abs() < 1e-12);

        for _ in 0..10 {
            vehicle.proceed_toward(WaypointId::Inner);
        }
        assert_eq!(vehicle.position(), Point2::new(0.0, 2.0));
    }

    #[test]
    fn proceed_without_waypoint_stays_put() {
        let mut vehicle = SimulatedVehicle::new(Point2::new(1.0, 1.0), 0.5);
        vehicle.proceed_toward(WaypointId::Outer);
        assert_eq!(vehicle.position(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn detections_resolve_back_to_the_obstacle() {
        let config = SimulationConfig {
            obstacles: vec![[1.0, 2.0]],
            ..SimulationConfig::default()
        };
        let perception = SimulatedPerception::new(&config);
        let position = Point2::new(0.5, 0.0);
        let yaw = 0.3;

        let detections = perception.observe(&position, yaw);
        assert_eq!(detections.len(), 1);
        let resolved = resolve_detection(&detections[0], &position, yaw, 0.5);
        assert!((resolved - Point2::new(1.0, 2.0)).norm() < 1e-9);
    }

    #[test]
    fn obstacles_behind_or_far_are_not_seen() {
        let config = SimulationConfig {
            obstacles: vec![[0.0, -1.0], [0.0, 10.0]],
            ..SimulationConfig::default()
        };
        let perception = SimulatedPerception::new(&config);
        assert!(perception.observe(&Point2::origin(), 0.0).is_empty());
    }

    #[test]
    fn wrap_angle_stays_in_half_open_range() {
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-12);
    }
}
