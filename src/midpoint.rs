//! Spherical midpoint of a group of locations
//!
//! Points are projected onto the unit sphere, averaged in Cartesian space and
//! projected back. Unlike a plain mean of degrees this stays correct across
//! the antimeridian and near the poles.

use haversine::{Location as HaversineLocation, Units, distance};

use crate::models::GeoPoint;
use crate::{MeetPointError, Result};

/// Geographic midpoint of `points`.
///
/// A single point is returned unchanged. An empty slice is an error rather
/// than a silent `(0, 0)`.
pub fn midpoint(points: &[GeoPoint]) -> Result<GeoPoint> {
    match points {
        [] => Err(MeetPointError::EmptyInput),
        [only] => Ok(*only),
        _ => {
            let (x_total, y_total, z_total) =
                points
                    .iter()
                    .fold((0.0_f64, 0.0_f64, 0.0_f64), |(x, y, z), point| {
                        let lat = point.latitude.to_radians();
                        let lon = point.longitude.to_radians();
                        (
                            x + lat.cos() * lon.cos(),
                            y + lat.cos() * lon.sin(),
                            z + lat.sin(),
                        )
                    });

            let count = points.len() as f64;
            let x_avg = x_total / count;
            let y_avg = y_total / count;
            let z_avg = z_total / count;

            let hypotenuse = x_avg.hypot(y_avg);
            Ok(GeoPoint {
                latitude: z_avg.atan2(hypotenuse).to_degrees(),
                longitude: y_avg.atan2(x_avg).to_degrees(),
            })
        }
    }
}

/// Great-circle distance between two points in kilometers
#[must_use]
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let from = HaversineLocation {
        latitude: from.latitude,
        longitude: from.longitude,
    };
    let to = HaversineLocation {
        latitude: to.latitude,
        longitude: to.longitude,
    };
    distance(from, to, Units::Kilometers)
}
