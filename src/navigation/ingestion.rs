// src/navigation/ingestion.rs
// Turns relative obstacle detections into absolute map entries. Runs on the
// perception side, concurrently with the periodic navigation task: it only
// appends to the shared map and raises the dirty flag, it never plans.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::controller::PoseSource;
use crate::core::geometry::{project_detection, Point2};
use crate::core::obstacle_map::{Insertion, ObstacleMap};

/// Raw detection from the perception pipeline
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Range to the obstacle (meters); 0 means the sensor had no range
    pub distance: f64,
    /// Bearing of the obstacle's left edge (degrees, relative to the nose)
    pub left_bearing_deg: f64,
    /// Bearing of the obstacle's right edge (degrees, relative to the nose)
    pub right_bearing_deg: f64,
}

/// Per-batch ingestion outcome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// New obstacles appended to the map
    pub added: usize,
    /// Detections matching a known obstacle, or malformed
    pub duplicates: usize,
    /// Detections lost to a full map
    pub dropped: usize,
}

/// Cloneable handle the perception side uses to feed the obstacle map
#[derive(Clone)]
pub struct ObstacleIngestor {
    map: Arc<Mutex<ObstacleMap>>,
    dirty: Arc<AtomicBool>,
    pose: Arc<dyn PoseSource>,
    min_sensed_distance: f64,
}

/// Locks the shared map. The map is append-only, so a writer that panicked
/// mid-batch cannot have left a partial record behind and the guard is reused.
pub(crate) fn lock_map(map: &Mutex<ObstacleMap>) -> MutexGuard<'_, ObstacleMap> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Absolute position of `detection` seen from `position` with `yaw`.
/// A zero range is read as "very close" rather than "at the vehicle".
pub fn resolve_detection(
    detection: &Detection,
    position: &Point2,
    yaw: f64,
    min_sensed_distance: f64,
) -> Point2 {
    let distance = if detection.distance == 0.0 {
        min_sensed_distance
    } else {
        detection.distance
    };
    let heading = ((detection.left_bearing_deg + detection.right_bearing_deg) / 2.0).to_radians();
    project_detection(position, yaw, distance, heading)
}

impl ObstacleIngestor {
    pub(crate) fn new(
        map: Arc<Mutex<ObstacleMap>>,
        dirty: Arc<AtomicBool>,
        pose: Arc<dyn PoseSource>,
        min_sensed_distance: f64,
    ) -> Self {
        ObstacleIngestor {
            map,
            dirty,
            pose,
            min_sensed_distance,
        }
    }

    /// Ingests a batch using the vehicle pose at the time of the call
    pub fn handle_batch(&self, detections: &[Detection]) -> IngestReport {
        let position = self.pose.position();
        let yaw = self.pose.yaw();
        self.ingest_with_pose(detections, &position, yaw)
    }

    /// Ingests a batch observed from `position` with `yaw`
    pub fn ingest_with_pose(
        &self,
        detections: &[Detection],
        position: &Point2,
        yaw: f64,
    ) -> IngestReport {
        let mut report = IngestReport::default();
        let mut map = lock_map(&self.map);

        for detection in detections {
            let malformed = !(detection.distance.is_finite()
                && detection.left_bearing_deg.is_finite()
                && detection.right_bearing_deg.is_finite());
            if malformed {
                warn!("Ignoring malformed detection {:?}", detection);
                report.duplicates += 1;
                continue;
            }

            let absolute = resolve_detection(detection, position, yaw, self.min_sensed_distance);
            match map.insert(absolute) {
                Insertion::Added => {
                    info!(
                        "New obstacle at {:.2}/{:.2} (distance {:.2}, bearings {:.1}/{:.1}), map size {}",
                        absolute.x,
                        absolute.y,
                        detection.distance,
                        detection.left_bearing_deg,
                        detection.right_bearing_deg,
                        map.len()
                    );
                    report.added += 1;
                }
                Insertion::Duplicate => report.duplicates += 1,
                Insertion::Full => report.dropped += 1,
            }
        }
        drop(map);

        if report.added > 0 {
            self.dirty.store(true, Ordering::Release);
        }
        report
    }

    /// Obstacles currently in the map
    pub fn obstacle_count(&self) -> usize {
        lock_map(&self.map).len()
    }
}
