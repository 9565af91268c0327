//! # Unit Systems
//!
//! Conversion between the caller's unit system and the canonical internal
//! system used by every formula in the engine.
//!
//! ## Design Philosophy
//!
//! We use plain f64 fields plus a single `unit_system` tag on the input
//! record rather than a full units library because:
//! - The engine uses a small, fixed set of dimensions
//! - JSON serialization stays clean (just numbers)
//! - Conversion happens exactly twice: once on entry, once on exit
//!
//! ## Canonical Units (US Customary)
//!
//! - Pipe diameter / wall thickness / footprint geometry: inches (in)
//! - Depth of cover, spacings, offsets: feet (ft)
//! - Pressure and stress: pounds per square inch (psi)
//! - Force: pounds (lb)
//! - Density: pounds per cubic foot (pcf)
//! - Temperature differential: Fahrenheit degrees (degF)
//!
//! ## SI Inputs
//!
//! - Small lengths: millimetres (mm), large lengths: metres (m)
//! - Pressure: kilopascals (kPa)
//! - Force: kilonewtons (kN)
//! - Density: kilograms per cubic metre (kg/m3)
//! - Temperature differential: Celsius degrees (degC)
//!
//! ## Example
//!
//! ```rust
//! use crossing_core::units::{Dimension, UnitSystem};
//!
//! let sys = UnitSystem::Si;
//! let d_in = sys.to_canonical(Dimension::LengthSmall, 508.0); // 508 mm OD
//! assert!((d_in - 20.0).abs() < 1e-12);
//!
//! // Canonical inputs pass through untouched
//! let same = UnitSystem::UsCustomary.to_canonical(Dimension::LengthSmall, 20.0);
//! assert_eq!(same, 20.0);
//! ```

use serde::{Deserialize, Serialize};

// Exact definition-based conversion factors
const MM_PER_IN: f64 = 25.4;
const M_PER_FT: f64 = 0.3048;
const KPA_PER_PSI: f64 = 6.894_757_293_168_361;
const KN_PER_LB: f64 = 4.448_221_615_260_5e-3;
const KGM3_PER_PCF: f64 = 16.018_463_373_960_142;
const DEGF_PER_DEGC: f64 = 1.8;
const NM_PER_INLB: f64 = 0.112_984_829_027_616_7;

/// Unit system of a case's numeric fields.
///
/// The engine normalizes every input to [`UnitSystem::UsCustomary`] before
/// computing and converts every output field back on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// US customary (in, ft, psi, lb, pcf, degF) - the canonical system
    #[default]
    UsCustomary,
    /// SI (mm, m, kPa, kN, kg/m3, degC)
    Si,
}

impl UnitSystem {
    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            UnitSystem::UsCustomary => "US Customary (in/ft/psi/lb)",
            UnitSystem::Si => "SI (mm/m/kPa/kN)",
        }
    }

    /// True if this already is the canonical internal system
    pub fn is_canonical(&self) -> bool {
        matches!(self, UnitSystem::UsCustomary)
    }

    /// Convert a value expressed in this system to the canonical system.
    ///
    /// Idempotent: a canonical value converts to itself.
    pub fn to_canonical(&self, dim: Dimension, value: f64) -> f64 {
        match self {
            UnitSystem::UsCustomary => value,
            UnitSystem::Si => value / dim.si_per_canonical(),
        }
    }

    /// Convert a canonical value into this system (inverse of
    /// [`UnitSystem::to_canonical`]).
    pub fn from_canonical(&self, dim: Dimension, value: f64) -> f64 {
        match self {
            UnitSystem::UsCustomary => value,
            UnitSystem::Si => value * dim.si_per_canonical(),
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Physical dimension of a converted field.
///
/// Each dimension carries a single exact factor between its SI unit and
/// its canonical US customary unit, so round trips reproduce the input to
/// floating precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    /// Small lengths: in (canonical) vs mm
    LengthSmall,
    /// Large lengths: ft (canonical) vs m
    LengthLarge,
    /// Pressure and stress: psi (canonical) vs kPa
    Pressure,
    /// Force: lb (canonical) vs kN
    Force,
    /// Density: pcf (canonical) vs kg/m3
    Density,
    /// Temperature differential: degF (canonical) vs degC
    TemperatureDiff,
    /// Bending moment: in-lb (canonical) vs N-m
    Moment,
    /// Already dimensionless (ratios, percentages, factors)
    Dimensionless,
}

impl Dimension {
    /// SI units per one canonical unit for this dimension
    fn si_per_canonical(&self) -> f64 {
        match self {
            Dimension::LengthSmall => MM_PER_IN,
            Dimension::LengthLarge => M_PER_FT,
            Dimension::Pressure => KPA_PER_PSI,
            Dimension::Force => KN_PER_LB,
            Dimension::Density => KGM3_PER_PCF,
            Dimension::TemperatureDiff => DEGF_PER_DEGC,
            Dimension::Moment => NM_PER_INLB,
            Dimension::Dimensionless => 1.0,
        }
    }
}
