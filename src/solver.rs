//! Inverts the trajectory integrator: finds the elevation that puts the shell
//! on a target at a given horizontal distance and relative height.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ensure_finite, ensure_non_negative, FireError};
use crate::munition::MunitionProfile;
use crate::trajectory::{Flight, IntegratorConfig};

pub const DEFAULT_TOLERANCE_M: f64 = 0.5;
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Width, in degrees, at which the search for the range peak stops.
const PEAK_SEARCH_WIDTH_DEG: f64 = 1e-3;
const INV_PHI: f64 = 0.618_033_988_749_894_9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Accepted miss distance, metres.
    pub tolerance: f64,
    pub max_iterations: u32,
    pub integrator: IntegratorConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: DEFAULT_TOLERANCE_M,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            integrator: IntegratorConfig::default(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), FireError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(FireError::invalid("tolerance", "must be a positive number"));
        }
        if self.max_iterations == 0 {
            return Err(FireError::invalid("max_iterations", "must be at least 1"));
        }
        self.integrator.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Elevations between 45 and 90 degrees.
    High,
    /// Elevations between 0 and 45 degrees.
    Low,
}

impl Regime {
    pub fn of(profile: &MunitionProfile) -> Self {
        if profile.high_angle {
            Regime::High
        } else {
            Regime::Low
        }
    }

    pub fn bracket(&self) -> (f64, f64) {
        match self {
            Regime::High => (45.0, 90.0),
            Regime::Low => (0.0, 45.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ElevationSolution {
    pub elevation_deg: f64,
    pub time_of_flight_s: f64,
    /// Range actually achieved at `elevation_deg`.
    pub range_m: f64,
    pub max_ordinate_m: f64,
    pub iterations: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unreachable {
    /// Beyond the longest shot the regime allows.
    OutOfRange { max_range_m: f64, peak_elevation_deg: f64 },
    /// Iteration budget spent without landing inside the tolerance.
    NotConverged { closest_range_m: f64, iterations: u32 },
    /// No elevation in the regime climbs as high as the target.
    AboveApex { max_ordinate_m: f64 },
    /// The shell is still falling when the integrator's flight time cap runs out.
    FlightTimeExceeded { max_flight_time_s: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Solution {
    Solved(ElevationSolution),
    Unreachable(Unreachable),
}

impl Solution {
    pub fn solved(&self) -> Option<&ElevationSolution> {
        match self {
            Solution::Solved(s) => Some(s),
            Solution::Unreachable(_) => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Solution::Unreachable(_))
    }
}

/// Elevation with the longest range inside the regime's bracket, and the
/// flight fired at it.
///
/// Range is unimodal in elevation; without drag and at level ground the
/// peak sits at 45 degrees, drag pulls it lower and target height moves it
/// either way, so it is located numerically. Flights that never climb to
/// the target height score by their negative shortfall, which keeps the
/// search moving toward steeper shots; if none reaches it the returned
/// flight is the one with the highest apex.
pub fn bracket_peak(
    profile: &MunitionProfile,
    target_height: f64,
    regime: Regime,
    integrator: &IntegratorConfig,
) -> (f64, Flight) {
    let fire = |e: f64| {
        let flight = integrator.simulate(profile, e, target_height);
        (e, flight, peak_score(&flight, target_height))
    };
    let (mut a, mut b) = regime.bracket();

    let mut c = fire(b - INV_PHI * (b - a));
    let mut d = fire(a + INV_PHI * (b - a));

    while b - a > PEAK_SEARCH_WIDTH_DEG {
        if c.2 >= d.2 {
            b = d.0;
            d = c;
            c = fire(b - INV_PHI * (b - a));
        } else {
            a = c.0;
            c = d;
            d = fire(a + INV_PHI * (b - a));
        }
    }

    let mut best = if c.2 >= d.2 { c } else { d };
    // a monotonic bracket pushes the peak onto its 45 degree edge
    let (lo, hi) = regime.bracket();
    let edge = fire(match regime {
        Regime::High => lo,
        Regime::Low => hi,
    });
    if edge.2 > best.2 {
        best = edge;
    }
    (best.0, best.1)
}

fn peak_score(flight: &Flight, target_height: f64) -> f64 {
    if flight.reached_height {
        flight.range_m
    } else {
        flight.max_ordinate_m - target_height
    }
}

pub fn solve_elevation(
    profile: &MunitionProfile,
    target_height: f64,
    horizontal_distance: f64,
    config: &SolverConfig,
) -> Result<Solution, FireError> {
    profile.validate()?;
    config.validate()?;
    let target_height = ensure_finite("target_height", target_height)?;
    let distance = ensure_non_negative("distance", horizontal_distance)?;

    let regime = Regime::of(profile);
    let integrator = &config.integrator;
    let (peak_elevation, peak) = bracket_peak(profile, target_height, regime, integrator);

    if !peak.reached_height {
        debug!(
            munition = profile.name,
            target_height,
            max_ordinate = peak.max_ordinate_m,
            "target above every apex"
        );
        return Ok(Solution::Unreachable(Unreachable::AboveApex {
            max_ordinate_m: peak.max_ordinate_m,
        }));
    }

    let max_range = peak.range_m;
    if distance > max_range + config.tolerance {
        // a truncated peak only bounds the range from below
        let reason = if peak.truncated {
            Unreachable::FlightTimeExceeded {
                max_flight_time_s: integrator.max_flight_time,
            }
        } else {
            Unreachable::OutOfRange {
                max_range_m: max_range,
                peak_elevation_deg: peak_elevation,
            }
        };
        debug!(
            munition = profile.name,
            distance,
            max_range,
            peak_elevation,
            truncated = peak.truncated,
            "target beyond maximum range"
        );
        return Ok(Solution::Unreachable(reason));
    }

    // range falls as elevation moves away from the peak on either side
    let (mut lo, mut hi) = match regime {
        Regime::High => (peak_elevation, regime.bracket().1),
        Regime::Low => (regime.bracket().0, peak_elevation),
    };

    let mut closest: Option<Flight> = None;
    let mut truncated_seen = false;
    for iteration in 1..=config.max_iterations {
        let elevation = (lo + hi) / 2.0;
        let flight = integrator.simulate(profile, elevation, target_height);
        let miss = flight.range_m - distance;
        trace!(
            iteration,
            elevation,
            range = flight.range_m,
            miss,
            reached = flight.reached_height,
            truncated = flight.truncated,
            "bisection step"
        );

        if flight.truncated {
            // flight time grows with elevation in both regimes
            truncated_seen = true;
            hi = elevation;
            continue;
        }
        if !flight.reached_height {
            // so does the apex
            lo = elevation;
            continue;
        }

        if miss.abs() <= config.tolerance {
            debug!(
                munition = profile.name,
                distance,
                elevation,
                iterations = iteration,
                "elevation solved"
            );
            return Ok(Solution::Solved(ElevationSolution {
                elevation_deg: elevation,
                time_of_flight_s: flight.time_of_flight_s,
                range_m: flight.range_m,
                max_ordinate_m: flight.max_ordinate_m,
                iterations: iteration,
            }));
        }

        if closest.map_or(true, |c| miss.abs() < (c.range_m - distance).abs()) {
            closest = Some(flight);
        }

        let too_long = flight.range_m > distance;
        match (regime, too_long) {
            (Regime::High, true) | (Regime::Low, false) => lo = elevation,
            (Regime::High, false) | (Regime::Low, true) => hi = elevation,
        }
    }

    let reason = match closest {
        None if truncated_seen => Unreachable::FlightTimeExceeded {
            max_flight_time_s: integrator.max_flight_time,
        },
        _ => Unreachable::NotConverged {
            closest_range_m: closest.map(|f| f.range_m).unwrap_or(0.0),
            iterations: config.max_iterations,
        },
    };
    debug!(
        munition = profile.name,
        distance,
        ?reason,
        "bisection did not converge"
    );
    Ok(Solution::Unreachable(reason))
}
