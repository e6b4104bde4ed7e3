//! Command-line / environment configuration shared by the binaries.

use clap::Args;

use crate::logging::{parse_log_level, LogConfig, LogFormat};
use crate::solver::{SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE_M};
use crate::trajectory::{IntegratorConfig, DEFAULT_MAX_FLIGHT_TIME, DEFAULT_TIME_STEP};
use crate::FireError;

#[derive(Args, Debug, Clone)]
pub struct SolverArgs {
    /// Accepted miss distance in metres
    #[arg(long, env = "ARTILLERY_TOLERANCE", default_value_t = DEFAULT_TOLERANCE_M)]
    pub tolerance: f64,
    /// Bisection iteration budget
    #[arg(long, env = "ARTILLERY_MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,
    /// Integration step in seconds
    #[arg(long, env = "ARTILLERY_TIME_STEP", default_value_t = DEFAULT_TIME_STEP)]
    pub time_step: f64,
    /// Longest simulated flight in seconds
    #[arg(long, env = "ARTILLERY_MAX_FLIGHT_TIME", default_value_t = DEFAULT_MAX_FLIGHT_TIME)]
    pub max_flight_time: f64,
}

impl SolverArgs {
    pub fn solver_config(&self) -> Result<SolverConfig, FireError> {
        let config = SolverConfig {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            integrator: IntegratorConfig {
                time_step: self.time_step,
                max_flight_time: self.max_flight_time,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// trace, debug, info, warn or error (RUST_LOG takes precedence)
    #[arg(long, env = "ARTILLERY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    /// compact or json
    #[arg(long, env = "ARTILLERY_LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,
}

impl LogArgs {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: parse_log_level(&self.log_level),
            format: self.log_format,
        }
    }
}
