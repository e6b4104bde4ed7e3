use std::io::{self, Write};

use crate::server::AppState;
use crate::{
    compute_grid, compute_polar, distance_steps, range_table, resolve_polar, FireError, FireOutcome, GridMission,
    MunitionProfile, PolarMission, ResolveRequest, Unreachable,
};

pub const COMMANDS: &[&str] = &[
    "help", "munitions", "resolve", "grid", "polar", "table", "clear", "exit",
];

pub fn handle_cli_command(line: &str, state: &AppState) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return;
    }

    match parts[0] {
        "help" | "h" => print_help(),
        "munitions" | "m" => list_munitions(),
        "resolve" | "r" => resolve_cli(&parts),
        "grid" | "g" => grid_cli(&parts, state),
        "polar" | "p" => polar_cli(&parts, state),
        "table" | "t" => table_cli(&parts, state),
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
            let _ = io::stdout().flush();
        }
        _ => println!(
            "Unknown command: '{}'. Type 'help' for available commands.",
            parts[0]
        ),
    }
}

pub fn print_help() {
    println!();
    println!("=== ARTILLERY CALCULATOR CLI ===");
    println!();
    println!("Commands:");
    println!("  help, h                                   Show this help");
    println!("  munitions, m                              List munitions");
    println!("  resolve, r <me> <mn> <oe> <on> <az> <d>   Observer report -> mortar azimuth/distance");
    println!("  grid, g <mun> <me> <mn> <mh> <te> <tn> <th>");
    println!("                                            Firing solution from two grids");
    println!("  polar, p <mun> <me> <mn> <mh> <oe> <on> <oh> <az> <dh> <dv>");
    println!("                                            Firing solution from an observer report");
    println!("  table, t <mun> <start> <end> <step> [h]   Range table (elevation per distance)");
    println!("  clear                                     Clear screen");
    println!("  exit, quit, q                             Quit");
    println!();
    println!("  me/mn/mh: mortar easting/northing/height   oe/on/oh: observer");
    println!("  te/tn/th: target   az: observer->target azimuth (deg)");
    println!("  dh/dv: observer->target horizontal/vertical offset (m)");
    println!();
}

fn parse_numbers(values: &[&str], names: &[&str]) -> Result<Vec<f64>, String> {
    values
        .iter()
        .zip(names)
        .map(|(v, name)| {
            v.parse::<f64>()
                .map_err(|_| format!("Error: invalid {name} '{v}'"))
        })
        .collect()
}

pub fn list_munitions() {
    println!();
    println!("  {:>6} | {:<12} | {:>8} | {:>6} | {:>8} | ANGLE", "NAME", "LABEL", "MASS kg", "DRAG", "V0 m/s");
    println!("  {}", "-".repeat(62));
    for p in MunitionProfile::all() {
        println!(
            "  {:>6} | {:<12} | {:>8.1} | {:>6.4} | {:>8.1} | {}",
            p.name,
            p.label,
            p.mass,
            p.drag_coefficient,
            p.muzzle_velocity,
            if p.high_angle { "HIGH" } else { "LOW" }
        );
    }
    println!();
}

fn resolve_cli(parts: &[&str]) {
    if parts.len() < 7 {
        println!("Usage: resolve <mortar_e> <mortar_n> <observer_e> <observer_n> <azimuth> <distance>");
        return;
    }
    let v = match parse_numbers(
        &parts[1..7],
        &["mortar_e", "mortar_n", "observer_e", "observer_n", "azimuth", "distance"],
    ) {
        Ok(v) => v,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    let req = ResolveRequest {
        mortar_easting: v[0],
        mortar_northing: v[1],
        observer_easting: v[2],
        observer_northing: v[3],
        obs_to_enemy_azimuth: v[4],
        obs_to_enemy_distance: v[5],
    };
    match resolve_polar(&req) {
        Ok(res) => {
            println!();
            println!("  Azimuth:  {:.2} deg", res.azimuth);
            println!("  Distance: {:.2} m", res.distance);
            println!();
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn grid_cli(parts: &[&str], state: &AppState) {
    if parts.len() < 8 {
        println!("Usage: grid <munition> <mortar_e> <mortar_n> <mortar_h> <target_e> <target_n> <target_h>");
        return;
    }
    let v = match parse_numbers(
        &parts[2..8],
        &["mortar_e", "mortar_n", "mortar_h", "target_e", "target_n", "target_h"],
    ) {
        Ok(v) => v,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    let mission = GridMission {
        mortar_easting: v[0],
        mortar_northing: v[1],
        mortar_height: v[2],
        enemy_easting: v[3],
        enemy_northing: v[4],
        enemy_height: v[5],
        artillery: parts[1].to_string(),
    };
    print_outcome(compute_grid(&mission, &state.solver));
}

fn polar_cli(parts: &[&str], state: &AppState) {
    if parts.len() < 11 {
        println!(
            "Usage: polar <munition> <mortar_e> <mortar_n> <mortar_h> <observer_e> <observer_n> <observer_h> <azimuth> <horizontal> <vertical>"
        );
        return;
    }
    let v = match parse_numbers(
        &parts[2..11],
        &[
            "mortar_e",
            "mortar_n",
            "mortar_h",
            "observer_e",
            "observer_n",
            "observer_h",
            "azimuth",
            "horizontal",
            "vertical",
        ],
    ) {
        Ok(v) => v,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    let mission = PolarMission {
        mortar_easting: v[0],
        mortar_northing: v[1],
        mortar_height: v[2],
        observer_easting: v[3],
        observer_northing: v[4],
        observer_height: v[5],
        observer_to_enemy_azimuth: v[6],
        observer_to_enemy_horizontal: v[7],
        observer_to_enemy_vertical: v[8],
        artillery: parts[1].to_string(),
    };
    print_outcome(compute_polar(&mission, &state.solver));
}

fn table_cli(parts: &[&str], state: &AppState) {
    if parts.len() < 5 {
        println!("Usage: table <munition> <start_m> <end_m> <step_m> [target_h]");
        return;
    }
    let profile = match MunitionProfile::parse_str(parts[1]) {
        Ok(p) => p,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    let height_arg = parts.get(5).copied().unwrap_or("0");
    let v = match parse_numbers(
        &[parts[2], parts[3], parts[4], height_arg],
        &["start", "end", "step", "target_h"],
    ) {
        Ok(v) => v,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    let rows = match distance_steps(v[0], v[1], v[2]).and_then(|d| range_table(profile, d, v[3], &state.solver)) {
        Ok(rows) => rows,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    println!();
    println!("--- {} @ {:+.0} m ---", profile, v[3]);
    println!("  {:>8} | {:>7} | {:>6} | {:>6}", "RANGE m", "ELEV", "MIL", "TOF s");
    println!("  {}", "-".repeat(38));
    for row in rows {
        match (row.elev_deg, row.elev_mil, row.time_flight_s) {
            (Some(e), Some(m), Some(t)) => {
                println!("  {:>8.0} | {:>7.1} | {:>6.0} | {:>6.1}", row.range_m, e, m, t)
            }
            _ => println!("  {:>8.0} | {:>7} | {:>6} | {:>6}", row.range_m, "N/A", "N/A", "N/A"),
        }
    }
    println!();
}

fn print_outcome(outcome: Result<FireOutcome, FireError>) {
    match outcome {
        Ok(FireOutcome::Solved(s)) => {
            println!();
            println!("=== FIRING SOLUTION ({}) ===", s.artillery);
            println!();
            println!("  Azimuth:    {:.2} deg", s.azimuth);
            println!("  Distance:   {:.2} m", s.distance);
            println!("  Elevation:  {:.1} deg ({:.0} mil)", s.elevation, s.elevation_mil);
            println!("  Flight:     {:.1} s", s.time_to_impact);
            println!("  Max ord:    {:.1} m", s.max_ord);
            println!();
        }
        Ok(FireOutcome::Unreachable(u)) => {
            println!();
            println!("  Target unreachable ({})", u.artillery);
            println!("  Azimuth:  {:.2} deg", u.azimuth);
            println!("  Distance: {:.2} m", u.distance);
            println!("  {}", unreachable_reason(&u.reason));
            println!();
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn unreachable_reason(reason: &Unreachable) -> String {
    match reason {
        Unreachable::OutOfRange { max_range_m, .. } => format!("Max range: {max_range_m:.0} m"),
        Unreachable::NotConverged { closest_range_m, .. } => {
            format!("No convergence (closest range {closest_range_m:.0} m)")
        }
        Unreachable::AboveApex { max_ordinate_m } => {
            format!("Target above the highest apex ({max_ordinate_m:.0} m)")
        }
        Unreachable::FlightTimeExceeded { max_flight_time_s } => {
            format!("Still in flight after {max_flight_time_s:.0} s")
        }
    }
}

pub fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_parsed_in_order() {
        let v = parse_numbers(&["1.5", "-20", "3e2"], &["a", "b", "c"]).unwrap();
        assert_eq!(v, vec![1.5, -20.0, 300.0]);
    }

    #[test]
    fn bad_number_names_the_argument() {
        let err = parse_numbers(&["10", "north"], &["mortar_e", "mortar_n"]).unwrap_err();
        assert!(err.contains("mortar_n"));
        assert!(err.contains("north"));
    }

    #[test]
    fn unreachable_reasons_read_as_english() {
        let apex = unreachable_reason(&Unreachable::AboveApex { max_ordinate_m: 31.3 });
        assert_eq!(apex, "Target above the highest apex (31 m)");
        let capped = unreachable_reason(&Unreachable::FlightTimeExceeded { max_flight_time_s: 600.0 });
        assert_eq!(capped, "Still in flight after 600 s");
        let far = unreachable_reason(&Unreachable::OutOfRange {
            max_range_m: 2881.4,
            peak_elevation_deg: 41.4,
        });
        assert_eq!(far, "Max range: 2881 m");
    }
}
