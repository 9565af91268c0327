//! Surface load discretization
//!
//! Converts each vehicle's real contact footprint into a set of discrete
//! point loads in the pipe-centered horizontal frame, plus the fixed set of
//! measurement points where transmitted pressure is evaluated.
//!
//! # Coordinate frame
//!
//! - `longitudinal` - along the pipe axis (in)
//! - `lateral` - across the pipe axis (in)
//!
//! Origin is on the pipe centerline at the crossing. Depth does not appear
//! here; the Boussinesq stage supplies it.

pub mod footprint;

use serde::{Deserialize, Serialize};

pub use footprint::{contact_patch_in, generate_point_loads};

/// A discrete surface point load.
///
/// Only ever produced by discretizing a footprint rectangle; positions are
/// cell centers in canonical inches, loads in pounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Position along the pipe axis (in)
    pub longitudinal_in: f64,
    /// Position across the pipe axis (in)
    pub lateral_in: f64,
    /// Load magnitude (lb)
    pub load_lb: f64,
}

/// A candidate evaluation location with a descriptive label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    /// Position along the pipe axis (in)
    pub longitudinal_in: f64,
    /// Position across the pipe axis (in)
    pub lateral_in: f64,
    /// Where this point sits relative to the load (e.g. "Under track")
    pub label: String,
}

impl MeasurementPoint {
    pub fn new(longitudinal_in: f64, lateral_in: f64, label: impl Into<String>) -> Self {
        MeasurementPoint {
            longitudinal_in,
            lateral_in,
            label: label.into(),
        }
    }
}
