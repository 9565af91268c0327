//! # Crossing Case
//!
//! The single input record for one analysis invocation: pipe, soil,
//! analysis options and the surface load (vehicle) definition.
//!
//! All numeric fields are in the unit system named by `unit_system`; the
//! dispatcher normalizes the whole record once on entry.
//!
//! ## Example
//!
//! ```rust
//! use crossing_core::case::{CrossingCase, Vehicle};
//! use crossing_core::pipe::PipeSection;
//! use crossing_core::soil::{EprimeMethod, SoilProfile, SoilType};
//!
//! let case = CrossingCase {
//!     label: "Track crossing at MP 14.2".to_string(),
//!     unit_system: Default::default(),
//!     pipe: PipeSection {
//!         outer_diameter: 24.0,
//!         wall_thickness: 0.375,
//!         smys: 52000.0,
//!         max_operating_pressure: 1000.0,
//!         temperature_differential: 40.0,
//!     },
//!     soil: SoilProfile {
//!         unit_weight: 120.0,
//!         depth_of_cover: 4.0,
//!         bedding_angle_deg: 90,
//!         load_method: Default::default(),
//!         friction_angle_deg: None,
//!         cohesion: 0.0,
//!         lateral_earth_coefficient: None,
//!         eprime: EprimeMethod::Lookup {
//!             soil_type: SoilType::CoarseWithFines,
//!             compaction_pct: 90.0,
//!         },
//!     },
//!     analysis: Default::default(),
//!     vehicle: Vehicle::Track {
//!         total_weight: 80000.0,
//!         track_length: 10.0,
//!         track_width: 2.0,
//!         track_separation: 8.0,
//!     },
//! };
//! assert!(case.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::analysis::compliance::DesignCode;
use crate::errors::{CalcError, CalcResult};
use crate::pipe::PipeSection;
use crate::soil::SoilProfile;
use crate::units::{Dimension, UnitSystem};

/// Tire contact patch definition for axle vehicles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum TireSpec {
    /// Contact rectangle given directly (in / mm)
    Manual { width: f64, length: f64 },
    /// Contact rectangle derived from tire pressure and count.
    ///
    /// Contact area per tire = (axle load / tires per axle) / tire
    /// pressure; contact length = area / tire width.
    Automatic {
        /// Tire inflation pressure (psi / kPa)
        tire_pressure: Option<f64>,
        /// Number of tires on the axle
        tires_per_axle: Option<u32>,
        /// Tire tread width (in / mm)
        tire_width: f64,
    },
}

impl TireSpec {
    fn validate(&self) -> CalcResult<()> {
        match self {
            TireSpec::Manual { width, length } => {
                if *width <= 0.0 {
                    return Err(CalcError::invalid_input(
                        "tire_width",
                        width.to_string(),
                        "Tire contact width must be positive",
                    ));
                }
                if *length <= 0.0 {
                    return Err(CalcError::invalid_input(
                        "tire_length",
                        length.to_string(),
                        "Tire contact length must be positive",
                    ));
                }
                Ok(())
            }
            TireSpec::Automatic {
                tire_pressure,
                tires_per_axle,
                tire_width,
            } => {
                let pressure = tire_pressure.ok_or_else(|| CalcError::missing_field("tire_pressure"))?;
                let tires = tires_per_axle.ok_or_else(|| CalcError::missing_field("tires_per_axle"))?;
                if pressure <= 0.0 {
                    return Err(CalcError::invalid_input(
                        "tire_pressure",
                        pressure.to_string(),
                        "Tire pressure must be positive",
                    ));
                }
                if tires == 0 {
                    return Err(CalcError::invalid_input(
                        "tires_per_axle",
                        "0",
                        "At least one tire per axle is required",
                    ));
                }
                if *tire_width <= 0.0 {
                    return Err(CalcError::invalid_input(
                        "tire_width",
                        tire_width.to_string(),
                        "Tire width must be positive",
                    ));
                }
                Ok(())
            }
        }
    }

    fn to_canonical(&self, from: UnitSystem) -> Self {
        match self {
            TireSpec::Manual { width, length } => TireSpec::Manual {
                width: from.to_canonical(Dimension::LengthSmall, *width),
                length: from.to_canonical(Dimension::LengthSmall, *length),
            },
            TireSpec::Automatic {
                tire_pressure,
                tires_per_axle,
                tire_width,
            } => TireSpec::Automatic {
                tire_pressure: tire_pressure.map(|p| from.to_canonical(Dimension::Pressure, p)),
                tires_per_axle: *tires_per_axle,
                tire_width: from.to_canonical(Dimension::LengthSmall, *tire_width),
            },
        }
    }
}

/// Load definition for a rectangular grid footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum GridLoad {
    /// Total load over the whole footprint (lb / kN)
    TotalLoad(f64),
    /// Uniform pressure over the footprint (psi / kPa)
    UniformPressure(f64),
}

/// Surface load (vehicle) definition - one variant per footprint shape.
///
/// Coordinate frame: `longitudinal` runs along the pipe axis, `lateral`
/// across it, both centered over the pipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Vehicle {
    /// Tracked vehicle crossing the pipe: two parallel track footprints
    /// symmetric about the pipe.
    Track {
        /// Total vehicle weight (lb / kN)
        total_weight: f64,
        /// Track ground-contact length (ft / m)
        track_length: f64,
        /// Track shoe width (ft / m)
        track_width: f64,
        /// Center-to-center separation of the tracks (ft / m)
        track_separation: f64,
    },

    /// Two-axle truck travelling parallel to the pipe at a lane offset.
    TwoAxle {
        /// Front-to-rear axle spacing (ft / m)
        axle_spacing: f64,
        /// Front axle load (lb / kN)
        front_axle_load: f64,
        /// Rear axle load (lb / kN)
        rear_axle_load: f64,
        /// Lateral distance from the pipe to the lane centerline (ft / m)
        lane_offset: f64,
        /// Tire contact patch
        tires: TireSpec,
    },

    /// Three-axle truck travelling parallel to the pipe at a lane offset.
    ThreeAxle {
        /// Spacing between axles 1 and 2 (ft / m)
        spacing_1_2: f64,
        /// Spacing between axles 2 and 3 (ft / m)
        spacing_2_3: f64,
        /// Per-axle loads, front to rear (lb / kN)
        axle_loads: [f64; 3],
        /// Lateral distance from the pipe to the lane centerline (ft / m)
        lane_offset: f64,
        /// Tire contact patch (applies to every axle)
        tires: TireSpec,
    },

    /// Arbitrary rectangular area load with explicit subdivision counts.
    Grid {
        /// Footprint extent along the pipe (ft / m)
        length: f64,
        /// Footprint extent across the pipe (ft / m)
        width: f64,
        /// Footprint center along the pipe (ft / m)
        longitudinal_offset: f64,
        /// Footprint center across the pipe (ft / m)
        lateral_offset: f64,
        /// Subdivision count along the pipe
        divisions_longitudinal: u32,
        /// Subdivision count across the pipe
        divisions_lateral: u32,
        /// Total load or uniform pressure
        load: GridLoad,
    },
}

/// Vehicle class for the impact factor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleClass {
    Tracked,
    Wheeled,
}

impl Vehicle {
    /// Class used by the impact factor lookup
    pub fn class(&self) -> VehicleClass {
        match self {
            Vehicle::Track { .. } => VehicleClass::Tracked,
            _ => VehicleClass::Wheeled,
        }
    }

    /// Short type name for display and run records
    pub fn type_name(&self) -> &'static str {
        match self {
            Vehicle::Track { .. } => "Track",
            Vehicle::TwoAxle { .. } => "TwoAxle",
            Vehicle::ThreeAxle { .. } => "ThreeAxle",
            Vehicle::Grid { .. } => "Grid",
        }
    }

    /// Validate variant-specific geometry and loads.
    pub fn validate(&self) -> CalcResult<()> {
        fn positive(field: &str, value: f64) -> CalcResult<()> {
            if value <= 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Value must be positive",
                ));
            }
            Ok(())
        }

        match self {
            Vehicle::Track {
                total_weight,
                track_length,
                track_width,
                track_separation,
            } => {
                positive("total_weight", *total_weight)?;
                positive("track_length", *track_length)?;
                positive("track_width", *track_width)?;
                positive("track_separation", *track_separation)?;
                Ok(())
            }
            Vehicle::TwoAxle {
                axle_spacing,
                front_axle_load,
                rear_axle_load,
                lane_offset,
                tires,
            } => {
                positive("axle_spacing", *axle_spacing)?;
                positive("front_axle_load", *front_axle_load)?;
                positive("rear_axle_load", *rear_axle_load)?;
                if *lane_offset < 0.0 {
                    return Err(CalcError::invalid_input(
                        "lane_offset",
                        lane_offset.to_string(),
                        "Lane offset cannot be negative",
                    ));
                }
                tires.validate()
            }
            Vehicle::ThreeAxle {
                spacing_1_2,
                spacing_2_3,
                axle_loads,
                lane_offset,
                tires,
            } => {
                positive("spacing_1_2", *spacing_1_2)?;
                positive("spacing_2_3", *spacing_2_3)?;
                for (i, load) in axle_loads.iter().enumerate() {
                    positive(&format!("axle_loads[{}]", i), *load)?;
                }
                if *lane_offset < 0.0 {
                    return Err(CalcError::invalid_input(
                        "lane_offset",
                        lane_offset.to_string(),
                        "Lane offset cannot be negative",
                    ));
                }
                tires.validate()
            }
            Vehicle::Grid {
                length,
                width,
                divisions_longitudinal,
                divisions_lateral,
                load,
                ..
            } => {
                positive("length", *length)?;
                positive("width", *width)?;
                if *divisions_longitudinal == 0 || *divisions_lateral == 0 {
                    return Err(CalcError::invalid_input(
                        "divisions",
                        format!("{}x{}", divisions_longitudinal, divisions_lateral),
                        "Grid division counts must be at least 1",
                    ));
                }
                match load {
                    GridLoad::TotalLoad(f) => positive("total_load", *f),
                    GridLoad::UniformPressure(p) => positive("uniform_pressure", *p),
                }
            }
        }
    }

    /// Convert every field from `from` into the canonical system.
    pub fn to_canonical(&self, from: UnitSystem) -> Self {
        let len = |v: f64| from.to_canonical(Dimension::LengthLarge, v);
        let force = |v: f64| from.to_canonical(Dimension::Force, v);
        match self {
            Vehicle::Track {
                total_weight,
                track_length,
                track_width,
                track_separation,
            } => Vehicle::Track {
                total_weight: force(*total_weight),
                track_length: len(*track_length),
                track_width: len(*track_width),
                track_separation: len(*track_separation),
            },
            Vehicle::TwoAxle {
                axle_spacing,
                front_axle_load,
                rear_axle_load,
                lane_offset,
                tires,
            } => Vehicle::TwoAxle {
                axle_spacing: len(*axle_spacing),
                front_axle_load: force(*front_axle_load),
                rear_axle_load: force(*rear_axle_load),
                lane_offset: len(*lane_offset),
                tires: tires.to_canonical(from),
            },
            Vehicle::ThreeAxle {
                spacing_1_2,
                spacing_2_3,
                axle_loads,
                lane_offset,
                tires,
            } => Vehicle::ThreeAxle {
                spacing_1_2: len(*spacing_1_2),
                spacing_2_3: len(*spacing_2_3),
                axle_loads: [
                    force(axle_loads[0]),
                    force(axle_loads[1]),
                    force(axle_loads[2]),
                ],
                lane_offset: len(*lane_offset),
                tires: tires.to_canonical(from),
            },
            Vehicle::Grid {
                length,
                width,
                longitudinal_offset,
                lateral_offset,
                divisions_longitudinal,
                divisions_lateral,
                load,
            } => Vehicle::Grid {
                length: len(*length),
                width: len(*width),
                longitudinal_offset: len(*longitudinal_offset),
                lateral_offset: len(*lateral_offset),
                divisions_longitudinal: *divisions_longitudinal,
                divisions_lateral: *divisions_lateral,
                load: match load {
                    GridLoad::TotalLoad(f) => GridLoad::TotalLoad(force(*f)),
                    GridLoad::UniformPressure(p) => {
                        GridLoad::UniformPressure(from.to_canonical(Dimension::Pressure, *p))
                    }
                },
            },
        }
    }
}

/// Equivalent-stress combination criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StressCriterion {
    /// Maximum shear (stress intensity)
    Tresca,
    /// Distortion energy
    #[default]
    VonMises,
}

impl StressCriterion {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            StressCriterion::Tresca => "Tresca (max shear)",
            StressCriterion::VonMises => "Von Mises (distortion energy)",
        }
    }
}

/// Pavement above the pipe, for the impact factor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PavementType {
    Paved,
    #[default]
    Unpaved,
    /// No prepared surface at all (open field / right-of-way travel)
    None,
}

/// Analysis configuration shared by every vehicle type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Equivalent stress criterion
    #[serde(default)]
    pub criterion: StressCriterion,
    /// Design code governing the allowable fractions of SMYS
    #[serde(default)]
    pub code: DesignCode,
    /// Surface pavement above the crossing
    #[serde(default)]
    pub pavement: PavementType,
}

/// One complete analysis input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingCase {
    /// User label for this case (e.g. "MP 14.2 road crossing")
    #[serde(default)]
    pub label: String,

    /// Unit system of every numeric field in this record
    #[serde(default)]
    pub unit_system: UnitSystem,

    /// Pipe section being screened
    pub pipe: PipeSection,

    /// Soil conditions
    pub soil: SoilProfile,

    /// Shared analysis options
    #[serde(default)]
    pub analysis: AnalysisOptions,

    /// Surface load definition
    pub vehicle: Vehicle,
}

impl CrossingCase {
    /// Validate the whole record. Runs before any numerical work.
    pub fn validate(&self) -> CalcResult<()> {
        self.pipe.validate()?;
        self.soil.validate()?;
        self.vehicle.validate()?;
        self.analysis.code.validate()?;
        Ok(())
    }

    /// Return the case expressed in the canonical unit system.
    ///
    /// Idempotent: a case already in canonical units converts to itself.
    pub fn to_canonical(&self) -> Self {
        let from = self.unit_system;
        CrossingCase {
            label: self.label.clone(),
            unit_system: UnitSystem::UsCustomary,
            pipe: self.pipe.to_canonical(from),
            soil: self.soil.to_canonical(from),
            analysis: self.analysis.clone(),
            vehicle: self.vehicle.to_canonical(from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::{EprimeMethod, SoilType};

    pub(crate) fn track_case() -> CrossingCase {
        CrossingCase {
            label: "Test track crossing".to_string(),
            unit_system: UnitSystem::UsCustomary,
            pipe: PipeSection {
                outer_diameter: 24.0,
                wall_thickness: 0.375,
                smys: 52000.0,
                max_operating_pressure: 1000.0,
                temperature_differential: 40.0,
            },
            soil: SoilProfile {
                unit_weight: 120.0,
                depth_of_cover: 4.0,
                bedding_angle_deg: 90,
                load_method: Default::default(),
                friction_angle_deg: Some(30.0),
                cohesion: 0.0,
                lateral_earth_coefficient: None,
                eprime: EprimeMethod::Lookup {
                    soil_type: SoilType::CoarseWithFines,
                    compaction_pct: 90.0,
                },
            },
            analysis: AnalysisOptions::default(),
            vehicle: Vehicle::Track {
                total_weight: 80000.0,
                track_length: 10.0,
                track_width: 2.0,
                track_separation: 8.0,
            },
        }
    }

    #[test]
    fn test_valid_case() {
        assert!(track_case().validate().is_ok());
    }

    #[test]
    fn test_automatic_tires_require_pressure() {
        let mut case = track_case();
        case.vehicle = Vehicle::TwoAxle {
            axle_spacing: 14.0,
            front_axle_load: 12000.0,
            rear_axle_load: 34000.0,
            lane_offset: 0.0,
            tires: TireSpec::Automatic {
                tire_pressure: None,
                tires_per_axle: Some(4),
                tire_width: 8.0,
            },
        };
        assert_eq!(
            case.validate().unwrap_err(),
            CalcError::missing_field("tire_pressure")
        );
    }

    #[test]
    fn test_grid_rejects_zero_divisions() {
        let mut case = track_case();
        case.vehicle = Vehicle::Grid {
            length: 10.0,
            width: 10.0,
            longitudinal_offset: 0.0,
            lateral_offset: 0.0,
            divisions_longitudinal: 0,
            divisions_lateral: 4,
            load: GridLoad::TotalLoad(50000.0),
        };
        assert!(case.validate().is_err());
    }

    #[test]
    fn test_canonicalization_idempotent() {
        let case = track_case();
        let once = case.to_canonical();
        let twice = once.to_canonical();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_si_case_normalizes() {
        let mut case = track_case();
        case.unit_system = UnitSystem::Si;
        case.vehicle = Vehicle::Track {
            total_weight: 355.85772922084, // kN = 80000 lb
            track_length: 3.048,           // m = 10 ft
            track_width: 0.6096,           // m = 2 ft
            track_separation: 2.4384,      // m = 8 ft
        };
        let canonical = case.to_canonical();
        match canonical.vehicle {
            Vehicle::Track {
                total_weight,
                track_length,
                ..
            } => {
                assert!((total_weight - 80000.0).abs() < 1e-6);
                assert!((track_length - 10.0).abs() < 1e-9);
            }
            _ => panic!("variant changed during normalization"),
        }
    }

    #[test]
    fn test_case_serialization() {
        let case = track_case();
        let json = serde_json::to_string_pretty(&case).unwrap();
        let roundtrip: CrossingCase = serde_json::from_str(&json).unwrap();
        assert_eq!(case, roundtrip);
    }
}
