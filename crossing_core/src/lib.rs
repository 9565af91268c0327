//! # crossing_core - Buried Pipeline Surface-Load Screening Engine
//!
//! `crossing_core` screens buried pressurized pipe against surface vehicle
//! loads, providing hoop/longitudinal/equivalent stress resolution and code
//! compliance checks with a clean, JSON-first API. All inputs and outputs
//! are serializable, making it easy to drive from CLIs, services, or AI
//! assistants.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Unit-Aware**: Cases come in US customary or SI; results come back
//!   in the same system
//!
//! ## Quick Start
//!
//! ```rust
//! use crossing_core::analyze;
//! use crossing_core::case::{CrossingCase, Vehicle};
//! use crossing_core::pipe::PipeSection;
//! use crossing_core::soil::{EprimeMethod, SoilProfile, SoilType};
//!
//! let case = CrossingCase {
//!     label: "MP 14.2 track crossing".to_string(),
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
//!
//! let result = analyze(&case).unwrap();
//! println!("{}: pass = {}", case.label, result.passes());
//! ```
//!
//! ## Modules
//!
//! - [`case`] - The analysis input record (pipe + soil + vehicle + options)
//! - [`analysis`] - The dispatcher and the stress/compliance stages
//! - [`loads`] - Footprint discretization into point loads
//! - [`soil`] - Bedding coefficients, E' lookup, earth load
//! - [`pipe`] - Pipe section geometry and derived properties
//! - [`materials`] - API 5L grade catalog and pipe size presets
//! - [`sweep`] - Parameter sweeps with CSV export
//! - [`units`] - Unit system normalization
//! - [`errors`] - Structured error types
//! - [`file_io`] - Run history with atomic saves and locking

pub mod analysis;
pub mod case;
pub mod constants;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod pipe;
pub mod soil;
pub mod sweep;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use analysis::{analyze, AnalysisResult};
pub use case::CrossingCase;
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_history, save_history, FileLock, RunHistory, RunRecord};
pub use sweep::{run_sweep, SweepSpec};
pub use units::UnitSystem;
