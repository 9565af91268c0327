//! Parameter sweeps.
//!
//! Re-runs one base case across a list of values for a single swept
//! parameter and tabulates the screening outcome per value, with CSV
//! export for spreadsheets.

use serde::{Deserialize, Serialize};

use crate::analysis::{analyze, AnalysisResult};
use crate::case::{CrossingCase, GridLoad, Vehicle};
use crate::errors::{CalcError, CalcResult};

/// Which input field the sweep varies.
///
/// Values are interpreted in the base case's unit system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepParameter {
    /// Soil depth of cover (ft / m)
    DepthOfCover,
    /// Pipe wall thickness (in / mm)
    WallThickness,
    /// Maximum operating pressure (psi / kPa)
    MaxOperatingPressure,
    /// Temperature differential (degF / degC)
    TemperatureDifferential,
    /// Soil unit weight (pcf / kg/m3)
    UnitWeight,
    /// Total vehicle load (lb / kN), distributed per vehicle variant
    TotalLoad,
}

impl SweepParameter {
    /// Column header used in the CSV export; also the CLI name.
    pub fn column_name(&self) -> &'static str {
        match self {
            SweepParameter::DepthOfCover => "depth_of_cover",
            SweepParameter::WallThickness => "wall_thickness",
            SweepParameter::MaxOperatingPressure => "max_operating_pressure",
            SweepParameter::TemperatureDifferential => "temperature_differential",
            SweepParameter::UnitWeight => "unit_weight",
            SweepParameter::TotalLoad => "total_load",
        }
    }

    /// Parse a CLI parameter name (the `column_name` spelling).
    pub fn parse(name: &str) -> CalcResult<Self> {
        match name {
            "depth_of_cover" => Ok(SweepParameter::DepthOfCover),
            "wall_thickness" => Ok(SweepParameter::WallThickness),
            "max_operating_pressure" => Ok(SweepParameter::MaxOperatingPressure),
            "temperature_differential" => Ok(SweepParameter::TemperatureDifferential),
            "unit_weight" => Ok(SweepParameter::UnitWeight),
            "total_load" => Ok(SweepParameter::TotalLoad),
            _ => Err(CalcError::invalid_input(
                "parameter",
                name,
                "Unknown sweep parameter; expected one of depth_of_cover, \
                 wall_thickness, max_operating_pressure, temperature_differential, \
                 unit_weight, total_load",
            )),
        }
    }

    fn apply(&self, case: &mut CrossingCase, value: f64) -> CalcResult<()> {
        match self {
            SweepParameter::DepthOfCover => case.soil.depth_of_cover = value,
            SweepParameter::WallThickness => case.pipe.wall_thickness = value,
            SweepParameter::MaxOperatingPressure => case.pipe.max_operating_pressure = value,
            SweepParameter::TemperatureDifferential => {
                case.pipe.temperature_differential = value
            }
            SweepParameter::UnitWeight => case.soil.unit_weight = value,
            SweepParameter::TotalLoad => apply_total_load(&mut case.vehicle, value)?,
        }
        Ok(())
    }
}

/// Set a vehicle's total load, preserving the axle distribution where the
/// load is split across axles.
fn apply_total_load(vehicle: &mut Vehicle, value: f64) -> CalcResult<()> {
    match vehicle {
        Vehicle::Track { total_weight, .. } => *total_weight = value,
        Vehicle::TwoAxle {
            front_axle_load,
            rear_axle_load,
            ..
        } => {
            let sum = *front_axle_load + *rear_axle_load;
            if sum <= 0.0 {
                return Err(CalcError::degenerate(
                    "axle_loads",
                    "Cannot rescale a vehicle with non-positive total axle load",
                ));
            }
            *front_axle_load *= value / sum;
            *rear_axle_load *= value / sum;
        }
        Vehicle::ThreeAxle { axle_loads, .. } => {
            let sum: f64 = axle_loads.iter().sum();
            if sum <= 0.0 {
                return Err(CalcError::degenerate(
                    "axle_loads",
                    "Cannot rescale a vehicle with non-positive total axle load",
                ));
            }
            for load in axle_loads.iter_mut() {
                *load *= value / sum;
            }
        }
        Vehicle::Grid { load, .. } => match load {
            GridLoad::TotalLoad(total) => *total = value,
            GridLoad::UniformPressure(_) => {
                return Err(CalcError::invalid_input(
                    "parameter",
                    "total_load",
                    "A uniform-pressure grid has no total-load field to sweep",
                ))
            }
        },
    }
    Ok(())
}

/// Sweep definition: one base case, one parameter, many values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub base: CrossingCase,
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
}

impl SweepSpec {
    /// Build a sweep over `steps` evenly spaced values from `start` to
    /// `stop` inclusive. This is the form the CLI drives.
    pub fn linear(
        base: CrossingCase,
        parameter: SweepParameter,
        start: f64,
        stop: f64,
        steps: u32,
    ) -> CalcResult<Self> {
        if steps == 0 {
            return Err(CalcError::invalid_input(
                "steps",
                "0",
                "A sweep needs at least one step",
            ));
        }
        let values = if steps == 1 {
            vec![start]
        } else {
            let increment = (stop - start) / f64::from(steps - 1);
            (0..steps)
                .map(|i| start + increment * f64::from(i))
                .collect()
        };
        Ok(SweepSpec {
            base,
            parameter,
            values,
        })
    }
}

/// Outcome for one swept value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub parameter_value: f64,
    /// Governing transmitted surface pressure before impact
    pub governing_pressure: f64,
    pub governing_location: String,
    pub impact_factor: f64,
    /// Governing hoop utilization across both states (% SMYS)
    pub hoop_pct_smys: f64,
    /// Governing longitudinal utilization across both states (% SMYS)
    pub longitudinal_pct_smys: f64,
    /// Governing equivalent utilization across both states (% SMYS)
    pub equivalent_pct_smys: f64,
    pub passes: bool,
}

/// Full sweep output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub parameter: SweepParameter,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    /// Render the sweep as CSV, one row per swept value.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{},governing_pressure,governing_location,impact_factor,\
             hoop_pct_smys,longitudinal_pct_smys,equivalent_pct_smys,passes\n",
            self.parameter.column_name()
        ));
        for p in &self.points {
            out.push_str(&format!(
                "{},{:.6},{},{:.3},{:.2},{:.2},{:.2},{}\n",
                p.parameter_value,
                p.governing_pressure,
                p.governing_location,
                p.impact_factor,
                p.hoop_pct_smys,
                p.longitudinal_pct_smys,
                p.equivalent_pct_smys,
                p.passes
            ));
        }
        out
    }
}

/// Utilization of an envelope pair across both pressure states (% SMYS).
fn utilization_pct(smys: f64, magnitudes: [f64; 4]) -> f64 {
    let governing = magnitudes.iter().fold(0.0_f64, |acc, m| acc.max(m.abs()));
    governing / smys * 100.0
}

fn point_from_result(value: f64, smys: f64, result: &AnalysisResult) -> SweepPoint {
    SweepPoint {
        parameter_value: value,
        governing_pressure: result.governing_pressure,
        governing_location: result.governing_location.clone(),
        impact_factor: result.impact_factor,
        hoop_pct_smys: utilization_pct(
            smys,
            [
                result.zero_pressure.hoop.high,
                result.zero_pressure.hoop.low,
                result.max_operating.hoop.high,
                result.max_operating.hoop.low,
            ],
        ),
        longitudinal_pct_smys: utilization_pct(
            smys,
            [
                result.zero_pressure.longitudinal.high,
                result.zero_pressure.longitudinal.low,
                result.max_operating.longitudinal.high,
                result.max_operating.longitudinal.low,
            ],
        ),
        equivalent_pct_smys: result
            .zero_pressure
            .equivalent
            .percent_smys
            .max(result.max_operating.equivalent.percent_smys),
        passes: result.compliance.overall_pass,
    }
}

/// Run the sweep. Every value must produce a valid analysis; the first
/// failing value aborts with its error.
pub fn run_sweep(spec: &SweepSpec) -> CalcResult<SweepResult> {
    if spec.values.is_empty() {
        return Err(CalcError::invalid_input(
            "values",
            "[]",
            "A sweep needs at least one value",
        ));
    }

    let mut points = Vec::with_capacity(spec.values.len());
    for &value in &spec.values {
        let mut case = spec.base.clone();
        spec.parameter.apply(&mut case, value)?;
        let result = analyze(&case)?;
        // SMYS and the reported stresses share the case's unit system, so
        // the utilization ratio needs no conversion
        points.push(point_from_result(value, case.pipe.smys, &result));
    }

    Ok(SweepResult {
        parameter: spec.parameter,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{TireSpec, Vehicle};
    use crate::pipe::PipeSection;
    use crate::soil::{EprimeMethod, SoilProfile, SoilType};
    use crate::units::UnitSystem;

    fn base_case() -> CrossingCase {
        CrossingCase {
            label: "Sweep base".to_string(),
            unit_system: UnitSystem::UsCustomary,
            pipe: PipeSection {
                outer_diameter: 24.0,
                wall_thickness: 0.375,
                smys: 52000.0,
                max_operating_pressure: 800.0,
                temperature_differential: 30.0,
            },
            soil: SoilProfile {
                unit_weight: 120.0,
                depth_of_cover: 4.0,
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
                total_weight: 80000.0,
                track_length: 10.0,
                track_width: 2.0,
                track_separation: 8.0,
            },
        }
    }

    #[test]
    fn test_depth_sweep_pressure_decreases() {
        let spec = SweepSpec {
            base: base_case(),
            parameter: SweepParameter::DepthOfCover,
            values: vec![3.0, 5.0, 8.0],
        };
        let result = run_sweep(&spec).unwrap();
        assert_eq!(result.points.len(), 3);
        assert!(result.points[0].governing_pressure > result.points[2].governing_pressure);
    }

    #[test]
    fn test_wall_thickness_sweep_reduces_utilization() {
        let spec = SweepSpec {
            base: base_case(),
            parameter: SweepParameter::WallThickness,
            values: vec![0.25, 0.5],
        };
        let result = run_sweep(&spec).unwrap();
        assert!(
            result.points[0].equivalent_pct_smys > result.points[1].equivalent_pct_smys,
            "thinner wall must be worked harder"
        );
    }

    #[test]
    fn test_csv_shape() {
        let spec = SweepSpec {
            base: base_case(),
            parameter: SweepParameter::DepthOfCover,
            values: vec![4.0, 6.0],
        };
        let csv = run_sweep(&spec).unwrap().to_csv();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("depth_of_cover,"));
        assert_eq!(lines[1].split(',').count(), 8);
    }

    #[test]
    fn test_unit_weight_sweep_raises_earth_load() {
        let spec = SweepSpec {
            base: base_case(),
            parameter: SweepParameter::UnitWeight,
            values: vec![100.0, 140.0],
        };
        let result = run_sweep(&spec).unwrap();
        // Heavier backfill works the wall harder at the same cover
        assert!(
            result.points[1].equivalent_pct_smys > result.points[0].equivalent_pct_smys
        );
        assert!(run_sweep(&spec).unwrap().to_csv().starts_with("unit_weight,"));
    }

    #[test]
    fn test_total_load_sweep_rescales_axles() {
        let mut base = base_case();
        base.vehicle = Vehicle::TwoAxle {
            axle_spacing: 14.0,
            front_axle_load: 12000.0,
            rear_axle_load: 34000.0,
            lane_offset: 0.0,
            tires: TireSpec::Manual {
                width: 10.0,
                length: 10.0,
            },
        };
        let spec = SweepSpec {
            base,
            parameter: SweepParameter::TotalLoad,
            values: vec![46000.0, 92000.0],
        };
        let result = run_sweep(&spec).unwrap();
        // Doubling the total doubles every transmitted point-load stress
        let ratio = result.points[1].governing_pressure / result.points[0].governing_pressure;
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_load_rejected_for_pressure_grid() {
        let mut base = base_case();
        base.vehicle = Vehicle::Grid {
            length: 10.0,
            width: 10.0,
            longitudinal_offset: 0.0,
            lateral_offset: 0.0,
            divisions_longitudinal: 4,
            divisions_lateral: 4,
            load: crate::case::GridLoad::UniformPressure(20.0),
        };
        let spec = SweepSpec {
            base,
            parameter: SweepParameter::TotalLoad,
            values: vec![50000.0],
        };
        assert!(run_sweep(&spec).is_err());
    }

    #[test]
    fn test_linear_spec_spacing() {
        let spec =
            SweepSpec::linear(base_case(), SweepParameter::DepthOfCover, 2.0, 6.0, 5).unwrap();
        assert_eq!(spec.values, vec![2.0, 3.0, 4.0, 5.0, 6.0]);

        let single =
            SweepSpec::linear(base_case(), SweepParameter::DepthOfCover, 3.0, 9.0, 1).unwrap();
        assert_eq!(single.values, vec![3.0]);

        assert!(SweepSpec::linear(base_case(), SweepParameter::DepthOfCover, 2.0, 6.0, 0).is_err());
    }

    #[test]
    fn test_parameter_names_round_trip() {
        for param in [
            SweepParameter::DepthOfCover,
            SweepParameter::WallThickness,
            SweepParameter::MaxOperatingPressure,
            SweepParameter::TemperatureDifferential,
            SweepParameter::UnitWeight,
            SweepParameter::TotalLoad,
        ] {
            assert_eq!(SweepParameter::parse(param.column_name()).unwrap(), param);
        }
        assert!(SweepParameter::parse("bedding_angle").is_err());
    }

    #[test]
    fn test_empty_values_rejected() {
        let spec = SweepSpec {
            base: base_case(),
            parameter: SweepParameter::DepthOfCover,
            values: vec![],
        };
        assert!(run_sweep(&spec).is_err());
    }

    #[test]
    fn test_invalid_swept_value_aborts() {
        let spec = SweepSpec {
            base: base_case(),
            parameter: SweepParameter::WallThickness,
            values: vec![0.375, -0.1],
        };
        assert!(run_sweep(&spec).is_err());
    }
}
