// core/geometry.rs

// Planar geometry shared by the map, the trajectory store and the ingestion
// handler. Everything lives in the local ENU frame; altitude never enters a
// distance computation.

use nalgebra::Vector2;

/// Position in the local horizontal frame (meters)
pub type Point2 = nalgebra::Point2<f64>;

/// Zero point used to pad unused trajectory slots
pub fn origin() -> Point2 {
    Point2::origin()
}

/// Euclidean distance in the horizontal plane. NaN inputs yield NaN.
pub fn horizontal_distance(a: &Point2, b: &Point2) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Point at fraction `t` from `a` to `b`.
///
/// Written as `a*(1-t) + b*t` so that `t == 1.0` returns `b` bit for bit.
pub fn interpolate(a: &Point2, b: &Point2, t: f64) -> Point2 {
    Point2::from(a.coords * (1.0 - t) + b.coords * t)
}

/// Absolute position of a return `distance` meters away along `heading`
/// (radians, relative to the vehicle) from a vehicle at `position` with `yaw`.
///
/// x follows the sine and y the cosine of the absolute bearing, matching the
/// forward/right convention of the local frame.
pub fn project_detection(position: &Point2, yaw: f64, distance: f64, heading: f64) -> Point2 {
    let bearing = heading + yaw;
    *position + Vector2::new(bearing.sin(), bearing.cos()) * distance
}

/// True when both coordinates are finite
pub fn is_finite(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
