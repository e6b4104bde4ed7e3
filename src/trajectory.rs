//! Point-mass trajectory integration under gravity and quadratic drag.

use serde::{Deserialize, Serialize};

use crate::error::FireError;
use crate::munition::MunitionProfile;

pub const GRAVITY: f64 = 9.81;
pub const DEFAULT_TIME_STEP: f64 = 0.001;
pub const DEFAULT_MAX_FLIGHT_TIME: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Integration step, seconds.
    pub time_step: f64,
    /// Hard stop for the integration loop, seconds of simulated flight.
    pub max_flight_time: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig {
            time_step: DEFAULT_TIME_STEP,
            max_flight_time: DEFAULT_MAX_FLIGHT_TIME,
        }
    }
}

impl IntegratorConfig {
    pub fn validate(&self) -> Result<(), FireError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(FireError::invalid("time_step", "must be a positive number"));
        }
        if !self.max_flight_time.is_finite() || self.max_flight_time < self.time_step {
            return Err(FireError::invalid("max_flight_time", "must be at least one time step"));
        }
        Ok(())
    }
}

/// Outcome of a single simulated shot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Flight {
    /// Horizontal distance at which the shell comes down through the target height.
    pub range_m: f64,
    pub time_of_flight_s: f64,
    /// Apex height above the firing point.
    pub max_ordinate_m: f64,
    /// False when the apex stays below the target height; range and time
    /// then describe the apex, not a descent onto the target.
    pub reached_height: bool,
    /// Set when `max_flight_time` stopped the loop with the shell still in flight.
    pub truncated: bool,
}

impl Flight {
    /// The shell climbed to the target height and came back down through it.
    pub fn is_hit(&self) -> bool {
        self.reached_height && !self.truncated
    }
}

impl IntegratorConfig {
    /// Fires from the origin and integrates with semi-implicit Euler until the
    /// shell is descending at or below `target_height` (relative to the gun).
    ///
    /// The returned range and time are those of the last step that still
    /// satisfied the flight condition. Inputs are expected to be validated
    /// (finite, positive muzzle velocity and mass).
    pub fn simulate(&self, profile: &MunitionProfile, elevation_deg: f64, target_height: f64) -> Flight {
        let dt = self.time_step;
        let k = profile.drag_factor();
        let elevation = elevation_deg.to_radians();

        let (mut x, mut y) = (0.0_f64, 0.0_f64);
        let mut vx = profile.muzzle_velocity * elevation.cos();
        let mut vy = profile.muzzle_velocity * elevation.sin();
        let mut t = 0.0_f64;

        let mut last_x = x;
        let mut apex = 0.0_f64;

        while (vy > 0.0 || y > target_height) && t < self.max_flight_time {
            let speed = (vx * vx + vy * vy).sqrt();
            let (ax, ay) = if speed > 0.0 {
                (-k * speed * vx, -GRAVITY - k * speed * vy)
            } else {
                (0.0, -GRAVITY)
            };

            vx += ax * dt;
            vy += ay * dt;

            last_x = x;
            x += vx * dt;
            y += vy * dt;
            t += dt;

            if y > apex {
                apex = y;
            }
        }

        Flight {
            range_m: last_x,
            time_of_flight_s: (t - dt).max(0.0),
            max_ordinate_m: apex,
            reached_height: apex >= target_height,
            truncated: vy > 0.0 || y > target_height,
        }
    }
}

/// Simulates with the default step.
pub fn simulate(profile: &MunitionProfile, elevation_deg: f64, target_height: f64) -> Flight {
    IntegratorConfig::default().simulate(profile, elevation_deg, target_height)
}
