//! # Crossing Screening CLI
//!
//! Terminal interface for the crossing_core screening engine.
//!
//! ## Usage
//!
//! ```text
//! crossing_cli                      interactive demo
//! crossing_cli run <case.json>      analyze a case file, print summary + JSON
//! crossing_cli sweep <sweep.json>   run a sweep from a spec file, CSV to stdout
//! crossing_cli sweep <case.json> <param> <start> <stop> <steps>
//!                                   sweep one parameter of a case file
//! ```

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use crossing_core::analysis::AnalysisResult;
use crossing_core::case::{CrossingCase, Vehicle};
use crossing_core::errors::CalcResult;
use crossing_core::pipe::PipeSection;
use crossing_core::soil::{EprimeMethod, SoilProfile, SoilType};
use crossing_core::sweep::{run_sweep, SweepParameter, SweepSpec};
use crossing_core::{analyze, CalcError};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let outcome = match args.get(1).map(String::as_str) {
        None => run_demo(),
        Some("run") => match args.get(2) {
            Some(path) => run_case_file(path),
            None => usage_error("run needs a case file path"),
        },
        Some("sweep") => match args.get(2..) {
            Some([path]) => run_sweep_file(path),
            Some([path, param, start, stop, steps]) => {
                run_sweep_args(path, param, start, stop, steps)
            }
            _ => usage_error("sweep needs a spec file, or a case file plus parameter/start/stop/steps"),
        },
        Some(other) => usage_error(&format!("unknown command '{}'", other)),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn usage_error(message: &str) -> CalcResult<()> {
    eprintln!("{}", message);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  crossing_cli                      interactive demo");
    eprintln!("  crossing_cli run <case.json>      analyze a case file");
    eprintln!("  crossing_cli sweep <sweep.json>   run a parameter sweep (CSV to stdout)");
    eprintln!("  crossing_cli sweep <case.json> <param> <start> <stop> <steps>");
    eprintln!("                                    sweep one parameter of a case file");
    Err(CalcError::invalid_input("arguments", message, "See usage"))
}

fn run_case_file(path: &str) -> CalcResult<()> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path, e.to_string()))?;
    let case: CrossingCase =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path, e),
        })?;

    let result = analyze(&case)?;
    print_summary(&case, &result);

    println!();
    println!("JSON Output (for LLM/API use):");
    if let Ok(json) = serde_json::to_string_pretty(&result) {
        println!("{}", json);
    }
    Ok(())
}

fn run_sweep_file(path: &str) -> CalcResult<()> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path, e.to_string()))?;
    let spec: SweepSpec =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path, e),
        })?;

    let result = run_sweep(&spec)?;
    print!("{}", result.to_csv());
    Ok(())
}

fn run_sweep_args(
    path: &str,
    param: &str,
    start: &str,
    stop: &str,
    steps: &str,
) -> CalcResult<()> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path, e.to_string()))?;
    let base: CrossingCase =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path, e),
        })?;

    let parameter = SweepParameter::parse(param)?;
    let parse_f64 = |field: &str, raw: &str| -> CalcResult<f64> {
        raw.parse()
            .map_err(|_| CalcError::invalid_input(field, raw, "Expected a number"))
    };
    let start = parse_f64("start", start)?;
    let stop = parse_f64("stop", stop)?;
    let steps: u32 = steps
        .parse()
        .map_err(|_| CalcError::invalid_input("steps", steps, "Expected a whole number"))?;

    let spec = SweepSpec::linear(base, parameter, start, stop, steps)?;
    let result = run_sweep(&spec)?;
    print!("{}", result.to_csv());
    Ok(())
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn run_demo() -> CalcResult<()> {
    println!("Crossing CLI - Buried Pipe Surface-Load Screening");
    println!("=================================================");
    println!();

    let cover_ft = prompt_f64("Depth of cover (ft) [4.0]: ", 4.0);
    let weight_lb = prompt_f64("Vehicle total weight (lb) [80000]: ", 80000.0);
    let mop_psi = prompt_f64("Max operating pressure (psi) [1000]: ", 1000.0);

    println!();
    println!("Screening NPS 24 x 0.375 X52 under a tracked vehicle...");
    println!();

    let case = CrossingCase {
        label: "CLI demo crossing".to_string(),
        unit_system: Default::default(),
        pipe: PipeSection {
            outer_diameter: 24.0,
            wall_thickness: 0.375,
            smys: 52000.0,
            max_operating_pressure: mop_psi,
            temperature_differential: 40.0,
        },
        soil: SoilProfile {
            unit_weight: 120.0,
            depth_of_cover: cover_ft,
            bedding_angle_deg: 90,
            load_method: Default::default(),
            friction_angle_deg: None,
            cohesion: 0.0,
            lateral_earth_coefficient: None,
            eprime: EprimeMethod::Lookup {
                soil_type: SoilType::CoarseWithFines,
                compaction_pct: 90.0,
            },
        },
        analysis: Default::default(),
        vehicle: Vehicle::Track {
            total_weight: weight_lb,
            track_length: 10.0,
            track_width: 2.0,
            track_separation: 8.0,
        },
    };

    let result = analyze(&case)?;
    print_summary(&case, &result);

    println!();
    println!("JSON Output (for LLM/API use):");
    if let Ok(json) = serde_json::to_string_pretty(&result) {
        println!("{}", json);
    }
    Ok(())
}

fn print_summary(case: &CrossingCase, result: &AnalysisResult) {
    println!("═══════════════════════════════════════");
    println!("  CROSSING SCREENING RESULTS");
    println!("═══════════════════════════════════════");
    println!();
    println!("Case: {}", case.label);
    println!("  Vehicle:  {}", case.vehicle.type_name());
    println!("  Units:    {}", result.unit_system);
    println!();
    println!("Transmitted Load:");
    println!(
        "  Surface pressure: {:.3} at '{}'",
        result.governing_pressure, result.governing_location
    );
    println!("  Impact factor:    {:.3}", result.impact_factor);
    println!("  Live pressure:    {:.3}", result.live_pressure);
    println!("  Earth pressure:   {:.3}", result.soil_pressure);
    println!();
    println!("Stress Envelopes (zero pressure / MOP):");
    println!(
        "  Hoop:         {:.0} / {:.0}",
        result.zero_pressure.hoop.high, result.max_operating.hoop.high
    );
    println!(
        "  Longitudinal: {:.0} / {:.0}",
        result.zero_pressure.longitudinal.high, result.max_operating.longitudinal.high
    );
    println!(
        "  Equivalent:   {:.0} / {:.0} ({:.1}% SMYS)",
        result.zero_pressure.equivalent.high,
        result.max_operating.equivalent.high,
        result
            .zero_pressure
            .equivalent
            .percent_smys
            .max(result.max_operating.equivalent.percent_smys)
    );
    println!(
        "  Deflection:   {:.2}% of diameter",
        result.deflection_ratio * 100.0
    );
    println!();
    println!("Compliance ({}):", case.analysis.code.display_name());
    for check in result
        .compliance
        .checks
        .iter()
        .chain(result.compliance.sustained.iter())
    {
        println!(
            "  {:<34} {:>9.0} / {:>9.0}  {}",
            check.name,
            check.stress,
            check.allowable,
            status_icon(check.passes)
        );
    }
    println!();
    println!("═══════════════════════════════════════");
    println!(
        "  RESULT: {}",
        if result.passes() { "PASS" } else { "FAIL" }
    );
    println!("═══════════════════════════════════════");
}

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}
