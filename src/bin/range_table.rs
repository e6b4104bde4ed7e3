use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;

use artillery::config::{LogArgs, SolverArgs};
use artillery::logging::init_logging;
use artillery::{distance_steps, range_table, MunitionProfile, RangeTableRow};

/// Writes a range table (elevation and time of flight per distance) as CSV.
#[derive(Parser, Debug)]
struct Args {
    /// Munition name (m252, m119, t2s1)
    munition: String,
    /// First distance in metres
    #[arg(long, default_value_t = 100.0)]
    start: f64,
    /// Last distance in metres
    #[arg(long, default_value_t = 6000.0)]
    end: f64,
    /// Step in metres
    #[arg(long, default_value_t = 100.0)]
    step: f64,
    /// Target height relative to the gun, metres
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    height: f64,
    /// Output CSV path (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Drop distances the munition cannot reach
    #[arg(long)]
    reachable_only: bool,
    #[command(flatten)]
    solver: SolverArgs,
    #[command(flatten)]
    log: LogArgs,
}

fn write_rows<W: io::Write>(writer: W, rows: &[RangeTableRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log.log_config())?;

    let Some(profile) = MunitionProfile::lookup(&args.munition) else {
        bail!("unknown munition: {}", args.munition);
    };
    let config = args.solver.solver_config()?;

    let distances = distance_steps(args.start, args.end, args.step)?;
    let mut rows = range_table(profile, distances, args.height, &config)?;
    if args.reachable_only {
        rows.retain(|r| r.elev_deg.is_some());
    }

    match &args.out {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
            write_rows(f, &rows)?;
            info!(munition = profile.name, rows = rows.len(), out = %path.display(), "range table written");
        }
        None => write_rows(io::stdout().lock(), &rows)?,
    }

    Ok(())
}
