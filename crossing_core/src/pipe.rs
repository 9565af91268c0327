//! # Pipe Section
//!
//! Geometry and strength of the buried pipe being screened.
//!
//! All fields are stored in the case's declared unit system; formulas only
//! ever see the canonical values (in, psi, degF).
//!
//! ## Example
//!
//! ```rust
//! use crossing_core::pipe::PipeSection;
//!
//! let pipe = PipeSection {
//!     outer_diameter: 24.0,
//!     wall_thickness: 0.375,
//!     smys: 52000.0,
//!     max_operating_pressure: 1000.0,
//!     temperature_differential: 40.0,
//! };
//! assert!(pipe.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{Dimension, UnitSystem};

/// A buried pipe cross-section.
///
/// ## JSON Example (US customary)
///
/// ```json
/// {
///   "outer_diameter": 24.0,
///   "wall_thickness": 0.375,
///   "smys": 52000.0,
///   "max_operating_pressure": 1000.0,
///   "temperature_differential": 40.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeSection {
    /// Outer diameter (in / mm)
    pub outer_diameter: f64,

    /// Wall thickness (in / mm)
    pub wall_thickness: f64,

    /// Specified minimum yield strength (psi / kPa)
    pub smys: f64,

    /// Maximum operating internal pressure (psi / kPa)
    pub max_operating_pressure: f64,

    /// Operating minus installation temperature (degF / degC differential).
    /// Positive means the pipe warmed up after tie-in.
    pub temperature_differential: f64,
}

impl PipeSection {
    /// Validate section invariants.
    pub fn validate(&self) -> CalcResult<()> {
        if self.wall_thickness <= 0.0 {
            return Err(CalcError::invalid_input(
                "wall_thickness",
                self.wall_thickness.to_string(),
                "Wall thickness must be positive",
            ));
        }
        if self.outer_diameter <= 2.0 * self.wall_thickness {
            return Err(CalcError::invalid_input(
                "outer_diameter",
                self.outer_diameter.to_string(),
                "Outer diameter must exceed twice the wall thickness",
            ));
        }
        if self.smys <= 0.0 {
            return Err(CalcError::invalid_input(
                "smys",
                self.smys.to_string(),
                "SMYS must be positive",
            ));
        }
        if self.max_operating_pressure < 0.0 {
            return Err(CalcError::invalid_input(
                "max_operating_pressure",
                self.max_operating_pressure.to_string(),
                "MOP cannot be negative",
            ));
        }
        Ok(())
    }

    /// Inner diameter d = D - 2t (in)
    pub fn inner_diameter(&self) -> f64 {
        self.outer_diameter - 2.0 * self.wall_thickness
    }

    /// Diameter-to-thickness ratio D/t
    pub fn dt_ratio(&self) -> f64 {
        self.outer_diameter / self.wall_thickness
    }

    /// Cross-section moment of inertia I = pi/64 (D^4 - d^4) (in^4)
    pub fn moment_of_inertia_in4(&self) -> f64 {
        let d_out = self.outer_diameter;
        let d_in = self.inner_diameter();
        std::f64::consts::PI / 64.0 * (d_out.powi(4) - d_in.powi(4))
    }

    /// Wall moment of inertia per unit length i = t^3/12 (in^4/in),
    /// used by the ring-deflection formula
    pub fn wall_inertia_per_in(&self) -> f64 {
        self.wall_thickness.powi(3) / 12.0
    }

    /// Mean radius r = (D - t)/2 (in)
    pub fn mean_radius_in(&self) -> f64 {
        (self.outer_diameter - self.wall_thickness) / 2.0
    }

    /// Thin-wall hoop stress from an internal pressure: p D / (2 t) (psi)
    pub fn hoop_from_internal(&self, internal_pressure: f64) -> f64 {
        internal_pressure * self.outer_diameter / (2.0 * self.wall_thickness)
    }

    /// Convert every field from `from` into the canonical system.
    pub fn to_canonical(&self, from: UnitSystem) -> Self {
        PipeSection {
            outer_diameter: from.to_canonical(Dimension::LengthSmall, self.outer_diameter),
            wall_thickness: from.to_canonical(Dimension::LengthSmall, self.wall_thickness),
            smys: from.to_canonical(Dimension::Pressure, self.smys),
            max_operating_pressure: from
                .to_canonical(Dimension::Pressure, self.max_operating_pressure),
            temperature_differential: from
                .to_canonical(Dimension::TemperatureDiff, self.temperature_differential),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pipe() -> PipeSection {
        PipeSection {
            outer_diameter: 24.0,
            wall_thickness: 0.375,
            smys: 52000.0,
            max_operating_pressure: 1000.0,
            temperature_differential: 40.0,
        }
    }

    #[test]
    fn test_section_properties() {
        let pipe = test_pipe();
        assert!((pipe.dt_ratio() - 64.0).abs() < 1e-12);
        assert!((pipe.inner_diameter() - 23.25).abs() < 1e-12);
        // I = pi/64 (24^4 - 23.25^4) = 1942.1 in^4
        assert!((pipe.moment_of_inertia_in4() - 1942.1).abs() < 1.0);
    }

    #[test]
    fn test_hoop_from_internal() {
        let pipe = test_pipe();
        // 1000 * 24 / (2 * 0.375) = 32000 psi
        assert!((pipe.hoop_from_internal(1000.0) - 32000.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_thickness() {
        let mut pipe = test_pipe();
        pipe.wall_thickness = 0.0;
        assert!(pipe.validate().is_err());
    }

    #[test]
    fn test_diameter_thickness_invariant() {
        let mut pipe = test_pipe();
        pipe.outer_diameter = 0.7;
        assert!(pipe.validate().is_err());
    }

    #[test]
    fn test_si_normalization() {
        let si = PipeSection {
            outer_diameter: 609.6, // mm = 24 in
            wall_thickness: 9.525, // mm = 0.375 in
            smys: 358527.3792447548, // kPa = 52000 psi
            max_operating_pressure: 6894.757293168361, // kPa = 1000 psi
            temperature_differential: 10.0, // degC = 18 degF
        };
        let us = si.to_canonical(UnitSystem::Si);
        assert!((us.outer_diameter - 24.0).abs() < 1e-9);
        assert!((us.wall_thickness - 0.375).abs() < 1e-9);
        assert!((us.smys - 52000.0).abs() < 1e-6);
        assert!((us.max_operating_pressure - 1000.0).abs() < 1e-9);
        assert!((us.temperature_differential - 18.0).abs() < 1e-9);
    }
}
