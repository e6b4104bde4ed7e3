use serde::{Deserialize, Serialize};
use tracing::info;

pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod munition;
pub mod server;
pub mod server_cli;
pub mod solver;
pub mod trajectory;

pub use error::FireError;
pub use geometry::{azimuth_from_grids, distance, resolve_relative_target, GridCoord};
pub use munition::MunitionProfile;
pub use solver::{solve_elevation, ElevationSolution, Regime, Solution, SolverConfig, Unreachable};
pub use trajectory::{simulate, Flight, IntegratorConfig};

use error::{ensure_finite, ensure_non_negative};
use geometry::normalize_azimuth;

/// Milliradians per radian, the elevation display unit.
pub const MIL_PER_RADIAN: f64 = 1000.0;

// =====================
// Fire missions
// =====================

/// Call for fire where the observer reports the target by bearing and range.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolarMission {
    pub mortar_easting: f64,
    pub mortar_northing: f64,
    #[serde(default)]
    pub mortar_height: f64,
    pub observer_easting: f64,
    pub observer_northing: f64,
    #[serde(default)]
    pub observer_height: f64,
    pub observer_to_enemy_azimuth: f64,
    pub observer_to_enemy_horizontal: f64,
    /// Target height above (positive) or below the observer.
    #[serde(default)]
    pub observer_to_enemy_vertical: f64,
    pub artillery: String,
}

/// Call for fire with the target given directly as a grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridMission {
    pub mortar_easting: f64,
    pub mortar_northing: f64,
    #[serde(default)]
    pub mortar_height: f64,
    pub enemy_easting: f64,
    pub enemy_northing: f64,
    #[serde(default)]
    pub enemy_height: f64,
    pub artillery: String,
}

/// Observer report resolved to the mortar, without a munition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub mortar_easting: f64,
    pub mortar_northing: f64,
    pub observer_easting: f64,
    pub observer_northing: f64,
    pub obs_to_enemy_azimuth: f64,
    pub obs_to_enemy_distance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub azimuth: f64,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FiringSolution {
    pub artillery: &'static str,
    /// Degrees, 2 decimals.
    pub azimuth: f64,
    /// Metres, 2 decimals.
    pub distance: f64,
    /// Degrees, 1 decimal.
    pub elevation: f64,
    /// Whole mils, after the munition's sight offset.
    pub elevation_mil: f64,
    /// Seconds, 1 decimal.
    pub time_to_impact: f64,
    /// Metres above the gun, 1 decimal.
    pub max_ord: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnreachableTarget {
    pub artillery: &'static str,
    pub azimuth: f64,
    pub distance: f64,
    #[serde(flatten)]
    pub reason: Unreachable,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FireOutcome {
    Solved(FiringSolution),
    Unreachable(UnreachableTarget),
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn elevation_to_mil(elevation_deg: f64, offset_mil: f64) -> f64 {
    (elevation_deg.to_radians() * MIL_PER_RADIAN - offset_mil).round()
}

fn display_azimuth(azimuth: f64) -> f64 {
    normalize_azimuth(round_to(azimuth, 2))
}

impl PolarMission {
    pub fn mortar(&self) -> GridCoord {
        GridCoord::new(self.mortar_easting, self.mortar_northing)
    }

    pub fn observer(&self) -> GridCoord {
        GridCoord::new(self.observer_easting, self.observer_northing)
    }

    /// Target height relative to the mortar.
    pub fn relative_height(&self) -> f64 {
        self.observer_height + self.observer_to_enemy_vertical - self.mortar_height
    }

    fn validate(&self) -> Result<(), FireError> {
        ensure_finite("mortar_easting", self.mortar_easting)?;
        ensure_finite("mortar_northing", self.mortar_northing)?;
        ensure_finite("mortar_height", self.mortar_height)?;
        ensure_finite("observer_easting", self.observer_easting)?;
        ensure_finite("observer_northing", self.observer_northing)?;
        ensure_finite("observer_height", self.observer_height)?;
        ensure_finite("observer_to_enemy_azimuth", self.observer_to_enemy_azimuth)?;
        ensure_non_negative("observer_to_enemy_horizontal", self.observer_to_enemy_horizontal)?;
        ensure_finite("observer_to_enemy_vertical", self.observer_to_enemy_vertical)?;
        Ok(())
    }
}

impl GridMission {
    pub fn mortar(&self) -> GridCoord {
        GridCoord::new(self.mortar_easting, self.mortar_northing)
    }

    pub fn target(&self) -> GridCoord {
        GridCoord::new(self.enemy_easting, self.enemy_northing)
    }

    pub fn relative_height(&self) -> f64 {
        self.enemy_height - self.mortar_height
    }

    fn validate(&self) -> Result<(), FireError> {
        ensure_finite("mortar_easting", self.mortar_easting)?;
        ensure_finite("mortar_northing", self.mortar_northing)?;
        ensure_finite("mortar_height", self.mortar_height)?;
        ensure_finite("enemy_easting", self.enemy_easting)?;
        ensure_finite("enemy_northing", self.enemy_northing)?;
        ensure_finite("enemy_height", self.enemy_height)?;
        Ok(())
    }
}

pub fn resolve_polar(req: &ResolveRequest) -> Result<ResolveResponse, FireError> {
    ensure_finite("mortar_easting", req.mortar_easting)?;
    ensure_finite("mortar_northing", req.mortar_northing)?;
    ensure_finite("observer_easting", req.observer_easting)?;
    ensure_finite("observer_northing", req.observer_northing)?;
    ensure_finite("obs_to_enemy_azimuth", req.obs_to_enemy_azimuth)?;
    ensure_non_negative("obs_to_enemy_distance", req.obs_to_enemy_distance)?;

    let (azimuth, distance) = resolve_relative_target(
        GridCoord::new(req.mortar_easting, req.mortar_northing),
        GridCoord::new(req.observer_easting, req.observer_northing),
        req.obs_to_enemy_azimuth,
        req.obs_to_enemy_distance,
    );
    Ok(ResolveResponse {
        azimuth: display_azimuth(azimuth),
        distance: round_to(distance, 2),
    })
}

pub fn compute_polar(mission: &PolarMission, config: &SolverConfig) -> Result<FireOutcome, FireError> {
    let profile = MunitionProfile::parse_str(&mission.artillery)?;
    mission.validate()?;

    let (azimuth, distance) = resolve_relative_target(
        mission.mortar(),
        mission.observer(),
        mission.observer_to_enemy_azimuth,
        mission.observer_to_enemy_horizontal,
    );
    fire(profile, azimuth, distance, mission.relative_height(), config)
}

pub fn compute_grid(mission: &GridMission, config: &SolverConfig) -> Result<FireOutcome, FireError> {
    let profile = MunitionProfile::parse_str(&mission.artillery)?;
    mission.validate()?;

    let mortar = mission.mortar();
    let target = mission.target();
    fire(
        profile,
        azimuth_from_grids(mortar, target),
        distance(mortar, target),
        mission.relative_height(),
        config,
    )
}

fn fire(
    profile: &'static MunitionProfile,
    azimuth: f64,
    distance: f64,
    relative_height: f64,
    config: &SolverConfig,
) -> Result<FireOutcome, FireError> {
    let solution = solve_elevation(profile, relative_height, distance, config)?;
    let azimuth = display_azimuth(azimuth);
    let distance = round_to(distance, 2);

    let outcome = match solution {
        Solution::Solved(s) => FireOutcome::Solved(FiringSolution {
            artillery: profile.name,
            azimuth,
            distance,
            elevation: round_to(s.elevation_deg, 1),
            elevation_mil: elevation_to_mil(s.elevation_deg, profile.elevation_offset_mil),
            time_to_impact: round_to(s.time_of_flight_s, 1),
            max_ord: round_to(s.max_ordinate_m, 1),
        }),
        Solution::Unreachable(reason) => FireOutcome::Unreachable(UnreachableTarget {
            artillery: profile.name,
            azimuth,
            distance,
            reason,
        }),
    };

    match &outcome {
        FireOutcome::Solved(s) => info!(
            munition = profile.name,
            azimuth = s.azimuth,
            distance = s.distance,
            elevation = s.elevation,
            "firing solution"
        ),
        FireOutcome::Unreachable(u) => info!(
            munition = profile.name,
            distance = u.distance,
            "target unreachable"
        ),
    }
    Ok(outcome)
}

// =====================
// Range tables
// =====================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeTableRow {
    pub range_m: f64,
    pub elev_deg: Option<f64>,
    pub elev_mil: Option<f64>,
    pub time_flight_s: Option<f64>,
}

/// Elevation for each distance; unreachable distances keep empty columns.
pub fn range_table<I>(
    profile: &MunitionProfile,
    distances: I,
    target_height: f64,
    config: &SolverConfig,
) -> Result<Vec<RangeTableRow>, FireError>
where
    I: IntoIterator<Item = f64>,
{
    let mut rows = Vec::new();
    for range_m in distances {
        let row = match solve_elevation(profile, target_height, range_m, config)? {
            Solution::Solved(s) => RangeTableRow {
                range_m,
                elev_deg: Some(round_to(s.elevation_deg, 1)),
                elev_mil: Some(elevation_to_mil(s.elevation_deg, profile.elevation_offset_mil)),
                time_flight_s: Some(round_to(s.time_of_flight_s, 1)),
            },
            Solution::Unreachable(_) => RangeTableRow {
                range_m,
                elev_deg: None,
                elev_mil: None,
                time_flight_s: None,
            },
        };
        rows.push(row);
    }
    Ok(rows)
}

/// Most rows a single range table may hold.
pub const MAX_TABLE_ROWS: usize = 10_000;

/// `start, start + step, ...` up to and including `end`.
pub fn distance_steps(start: f64, end: f64, step: f64) -> Result<Vec<f64>, FireError> {
    let start = ensure_non_negative("start", start)?;
    let end = ensure_non_negative("end", end)?;
    let step = ensure_finite("step", step)?;
    if step <= 0.0 {
        return Err(FireError::invalid("step", "must be a positive number"));
    }
    let count = ((end - start) / step).floor();
    if count < 0.0 {
        return Ok(Vec::new());
    }
    if count >= MAX_TABLE_ROWS as f64 {
        return Err(FireError::invalid("step", "too many rows"));
    }
    Ok((0..=count as u64).map(|i| start + i as f64 * step).collect())
}
