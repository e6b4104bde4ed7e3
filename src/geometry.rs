//! Planar grid geometry: bearings, distances and observer-relative target plotting.
//!
//! Azimuths are measured in degrees clockwise from grid north. Every
//! azimuth-to-vector conversion in the crate goes through [`unit_vector`].

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub easting: f64,
    pub northing: f64,
}

impl GridCoord {
    pub fn new(easting: f64, northing: f64) -> Self {
        GridCoord { easting, northing }
    }

    pub fn distance_to(&self, other: &GridCoord) -> f64 {
        distance(*self, *other)
    }

    pub fn azimuth_to(&self, other: &GridCoord) -> f64 {
        azimuth_from_grids(*self, *other)
    }

    /// Point reached by travelling `range` metres along `azimuth`.
    pub fn project(&self, azimuth: f64, range: f64) -> GridCoord {
        let (de, dn) = unit_vector(azimuth);
        GridCoord {
            easting: self.easting + de * range,
            northing: self.northing + dn * range,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.easting.is_finite() && self.northing.is_finite()
    }
}

/// Folds any finite angle into `[0, 360)`.
pub fn normalize_azimuth(degrees: f64) -> f64 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a + 0.0
    }
}

/// Mathematical angle (counter-clockwise from east) matching a compass azimuth.
pub fn azimuth_to_vertical_angle(azimuth: f64) -> f64 {
    (90.0 - azimuth).rem_euclid(360.0)
}

/// `(east, north)` components of a unit vector pointing along `azimuth`.
pub fn unit_vector(azimuth: f64) -> (f64, f64) {
    let theta = azimuth_to_vertical_angle(azimuth).to_radians();
    (theta.cos(), theta.sin())
}

pub fn distance(p1: GridCoord, p2: GridCoord) -> f64 {
    let de = p2.easting - p1.easting;
    let dn = p2.northing - p1.northing;
    (de * de + dn * dn).sqrt()
}

/// Straight-line distance with height treated as a third axis.
pub fn slant_distance(p1: GridCoord, h1: f64, p2: GridCoord, h2: f64) -> f64 {
    let horizontal = distance(p1, p2);
    let dh = h2 - h1;
    (horizontal * horizontal + dh * dh).sqrt()
}

/// Bearing from `from` to `to`, clockwise from north.
///
/// Northing plays the role of the x axis and easting the y axis, so
/// `atan2(Δe, Δn)` yields a compass bearing directly. Coincident points
/// give 0.
pub fn azimuth_from_grids(from: GridCoord, to: GridCoord) -> f64 {
    let de = to.easting - from.easting;
    let dn = to.northing - from.northing;
    normalize_azimuth(de.atan2(dn).to_degrees())
}

pub fn target_from_observer(
    observer: GridCoord,
    bearing_from_observer: f64,
    range_from_observer: f64,
) -> GridCoord {
    observer.project(bearing_from_observer, range_from_observer)
}

/// Converts an observer's polar call for fire into the mortar's
/// `(azimuth, distance)` to the target.
pub fn resolve_relative_target(
    mortar: GridCoord,
    observer: GridCoord,
    bearing_from_observer: f64,
    range_from_observer: f64,
) -> (f64, f64) {
    let target = target_from_observer(observer, bearing_from_observer, range_from_observer);
    (azimuth_from_grids(mortar, target), distance(mortar, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn cardinal_azimuths() {
        let origin = GridCoord::new(0.0, 0.0);
        assert_eq!(azimuth_from_grids(origin, GridCoord::new(0.0, 100.0)), 0.0);
        assert_eq!(azimuth_from_grids(origin, GridCoord::new(100.0, 0.0)), 90.0);
        assert_eq!(azimuth_from_grids(origin, GridCoord::new(0.0, -100.0)), 180.0);
        assert_eq!(azimuth_from_grids(origin, GridCoord::new(-100.0, 0.0)), 270.0);
    }

    #[test]
    fn coincident_points_face_north() {
        let p = GridCoord::new(1234.5, 678.9);
        assert_eq!(azimuth_from_grids(p, p), 0.0);
    }

    #[test]
    fn azimuth_survives_unit_vector_round_trip() {
        let base = GridCoord::new(512_300.0, 4_711_800.0);
        let mut theta = 0.0;
        while theta < 360.0 {
            let tip = base.project(theta, 1.0);
            let back = azimuth_from_grids(base, tip);
            assert!(
                angle_diff(back, theta) < 1e-6,
                "theta={theta} came back as {back}"
            );
            assert!((0.0..360.0).contains(&back));
            theta += 0.25;
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = GridCoord::new(-40.0, 17.5);
        let b = GridCoord::new(310.0, -2200.25);
        assert_eq!(distance(a, b), distance(b, a));
        assert_eq!(distance(a, a), 0.0);
        assert!((distance(GridCoord::new(0.0, 0.0), GridCoord::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn slant_distance_adds_height_axis() {
        let a = GridCoord::new(0.0, 0.0);
        let b = GridCoord::new(3.0, 0.0);
        assert!((slant_distance(a, 10.0, b, 14.0) - 5.0).abs() < 1e-12);
        assert_eq!(slant_distance(a, 7.0, b, 7.0), distance(a, b));
    }

    #[test]
    fn normalize_never_returns_full_circle() {
        assert_eq!(normalize_azimuth(360.0), 0.0);
        assert_eq!(normalize_azimuth(-90.0), 270.0);
        assert_eq!(normalize_azimuth(725.0), 5.0);
        assert!(normalize_azimuth(-1e-15) < 360.0);
        assert!(normalize_azimuth(-0.0).is_sign_positive());
    }

    #[test]
    fn observer_report_is_plotted_from_observer() {
        let observer = GridCoord::new(1000.0, 1000.0);
        let target = target_from_observer(observer, 90.0, 500.0);
        assert!((target.easting - 1500.0).abs() < 1e-9);
        assert!((target.northing - 1000.0).abs() < 1e-9);

        let target = target_from_observer(observer, 225.0, 2f64.sqrt() * 100.0);
        assert!((target.easting - 900.0).abs() < 1e-9);
        assert!((target.northing - 900.0).abs() < 1e-9);
    }

    #[test]
    fn resolve_relative_target_from_mortar() {
        // observer 1 km east of the mortar, target 1 km north of the observer
        let mortar = GridCoord::new(0.0, 0.0);
        let observer = GridCoord::new(1000.0, 0.0);
        let (az, dist) = resolve_relative_target(mortar, observer, 0.0, 1000.0);
        assert!((az - 45.0).abs() < 1e-9);
        assert!((dist - 1000.0 * 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn observer_colocated_with_mortar_passes_report_through() {
        let p = GridCoord::new(250.0, -75.0);
        let (az, dist) = resolve_relative_target(p, p, 312.5, 1800.0);
        assert!(angle_diff(az, 312.5) < 1e-9);
        assert!((dist - 1800.0).abs() < 1e-9);
    }
}
