//! # Soil-Pipe Interaction
//!
//! Bedding support coefficients, modulus of soil reaction (E') and the
//! earth load carried by the pipe.
//!
//! ## Overview
//!
//! - [`bedding_coefficients`] - the Spangler Kb/Kz stress and deflection
//!   parameters plus the effective-support coefficient theta, tabulated for
//!   the seven standard bedding angles. No interpolation: any other angle
//!   fails validation.
//! - [`EprimeMethod`] - a direct user value, or a table lookup by soil type
//!   and compaction with linear interpolation of the coefficients between
//!   the 80/85/90/95/100 percent anchors.
//! - [`SoilProfile::soil_load_psi`] - Prism overburden or Trap-Door
//!   (Terzaghi-style arching) earth pressure at the crown.
//!
//! ## Example
//!
//! ```rust
//! use crossing_core::soil::bedding_coefficients;
//!
//! let b = bedding_coefficients(90).unwrap();
//! assert!((b.kb - 0.157).abs() < 1e-12);
//! assert!(bedding_coefficients(45).is_err()); // not a standard bedding
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CalcError, CalcResult};
use crate::units::{Dimension, UnitSystem};

// ============================================================================
// Bedding Coefficients
// ============================================================================

/// Support coefficients for a standard bedding angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeddingCoefficients {
    /// Spangler bending stress parameter
    pub kb: f64,
    /// Spangler deflection parameter
    pub kz: f64,
    /// Effective-support coefficient feeding the beam-on-elastic-foundation
    /// decay parameter
    pub theta: f64,
}

/// The seven standard bedding angles (degrees)
pub const BEDDING_ANGLES_DEG: [u32; 7] = [0, 30, 60, 90, 120, 150, 180];

/// Look up the support coefficients for a bedding angle.
///
/// Only the seven standard angles are legal; anything else is a validation
/// error, never a silent default.
pub fn bedding_coefficients(angle_deg: u32) -> CalcResult<BeddingCoefficients> {
    let (kb, kz, theta) = match angle_deg {
        0 => (0.294, 0.110, 1.00),
        30 => (0.235, 0.108, 1.10),
        60 => (0.189, 0.103, 1.20),
        90 => (0.157, 0.096, 1.30),
        120 => (0.138, 0.089, 1.40),
        150 => (0.128, 0.085, 1.45),
        180 => (0.125, 0.083, 1.50),
        _ => {
            return Err(CalcError::invalid_input(
                "bedding_angle_deg",
                angle_deg.to_string(),
                "Bedding angle must be one of 0, 30, 60, 90, 120, 150, 180",
            ))
        }
    };
    Ok(BeddingCoefficients { kb, kz, theta })
}

// ============================================================================
// Modulus of Soil Reaction (E')
// ============================================================================

/// Backfill soil category for the E' lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilType {
    /// Fine-grained soils (CL, ML)
    Fine,
    /// Coarse-grained soils with fines (SM, SC, GM, GC)
    CoarseWithFines,
    /// Clean coarse-grained soils (SW, SP, GW, GP)
    Coarse,
}

impl SoilType {
    /// All soil types for UI selection
    pub const ALL: [SoilType; 3] = [SoilType::Fine, SoilType::CoarseWithFines, SoilType::Coarse];

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            SoilType::Fine => "Fine-grained (CL, ML)",
            SoilType::CoarseWithFines => "Coarse-grained with fines (SM, SC)",
            SoilType::Coarse => "Clean coarse-grained (SW, GW)",
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Coefficient triple for the E' growth formula
/// E' = Epr1 * Epr2^H * (compaction/100)^Epr3
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EprimeCoefficients {
    pub epr1: f64,
    pub epr2: f64,
    pub epr3: f64,
}

/// Compaction anchors of the E' table (percent Standard Proctor)
pub const COMPACTION_ANCHORS_PCT: [f64; 5] = [80.0, 85.0, 90.0, 95.0, 100.0];

/// E' coefficient anchors per soil type, one row per compaction anchor.
static EPRIME_TABLE: Lazy<HashMap<SoilType, [EprimeCoefficients; 5]>> = Lazy::new(|| {
    fn row(epr1: f64, epr2: f64, epr3: f64) -> EprimeCoefficients {
        EprimeCoefficients { epr1, epr2, epr3 }
    }
    let mut table = HashMap::new();
    table.insert(
        SoilType::Fine,
        [
            row(500.0, 1.00, 3.0),
            row(700.0, 1.00, 3.0),
            row(1000.0, 1.00, 3.5),
            row(1500.0, 1.01, 4.0),
            row(2000.0, 1.01, 4.0),
        ],
    );
    table.insert(
        SoilType::CoarseWithFines,
        [
            row(600.0, 1.00, 3.0),
            row(1000.0, 1.00, 3.5),
            row(2000.0, 1.00, 4.0),
            row(2500.0, 1.01, 4.5),
            row(3000.0, 1.01, 5.0),
        ],
    );
    table.insert(
        SoilType::Coarse,
        [
            row(1000.0, 1.00, 3.0),
            row(1500.0, 1.01, 3.5),
            row(2500.0, 1.01, 4.0),
            row(3000.0, 1.02, 4.5),
            row(3500.0, 1.02, 5.0),
        ],
    );
    table
});

/// Interpolated E' coefficients for a soil type and compaction percentage.
///
/// Exactly at an anchor the anchor row is returned; between anchors all
/// three coefficients are interpolated linearly; outside the table the 80
/// or 100 row applies unchanged.
pub fn eprime_coefficients(soil_type: SoilType, compaction_pct: f64) -> EprimeCoefficients {
    let rows = &EPRIME_TABLE[&soil_type];

    if compaction_pct <= COMPACTION_ANCHORS_PCT[0] {
        return rows[0];
    }
    if compaction_pct >= COMPACTION_ANCHORS_PCT[4] {
        return rows[4];
    }

    // Find the bracketing anchors
    let mut upper = 1;
    while COMPACTION_ANCHORS_PCT[upper] < compaction_pct {
        upper += 1;
    }
    let lower = upper - 1;
    if (compaction_pct - COMPACTION_ANCHORS_PCT[upper]).abs() < f64::EPSILON {
        return rows[upper];
    }

    let t = (compaction_pct - COMPACTION_ANCHORS_PCT[lower])
        / (COMPACTION_ANCHORS_PCT[upper] - COMPACTION_ANCHORS_PCT[lower]);
    let lerp = |a: f64, b: f64| a + t * (b - a);
    EprimeCoefficients {
        epr1: lerp(rows[lower].epr1, rows[upper].epr1),
        epr2: lerp(rows[lower].epr2, rows[upper].epr2),
        epr3: lerp(rows[lower].epr3, rows[upper].epr3),
    }
}

/// How E' is obtained for a case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum EprimeMethod {
    /// Direct value supplied by the user (psi / kPa)
    UserDefined { value: f64 },
    /// Table lookup by soil type and compaction percentage
    Lookup {
        soil_type: SoilType,
        compaction_pct: f64,
    },
}

impl EprimeMethod {
    /// Resolve E' in psi given the (canonical) depth of cover in feet.
    pub fn resolve_psi(&self, cover_ft: f64) -> CalcResult<f64> {
        match self {
            EprimeMethod::UserDefined { value } => {
                if *value <= 0.0 {
                    return Err(CalcError::degenerate(
                        "eprime",
                        "User-defined E' must be positive (it divides the deflection term)",
                    ));
                }
                Ok(*value)
            }
            EprimeMethod::Lookup {
                soil_type,
                compaction_pct,
            } => {
                let c = eprime_coefficients(*soil_type, *compaction_pct);
                Ok(c.epr1 * c.epr2.powf(cover_ft) * (compaction_pct / 100.0).powf(c.epr3))
            }
        }
    }
}

// ============================================================================
// Soil Profile and Earth Load
// ============================================================================

/// Earth load model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoilLoadMethod {
    /// Full overburden prism: gamma * H
    #[default]
    Prism,
    /// Terzaghi trap-door active arching; reverts to Prism when cover is
    /// too shallow for arching to develop (H < 2.5 D)
    TrapDoor,
}

impl SoilLoadMethod {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            SoilLoadMethod::Prism => "Prism (full overburden)",
            SoilLoadMethod::TrapDoor => "Trap-Door (active arching)",
        }
    }
}

/// Soil conditions around the pipe.
///
/// ## JSON Example
///
/// ```json
/// {
///   "unit_weight": 120.0,
///   "depth_of_cover": 4.0,
///   "bedding_angle_deg": 90,
///   "load_method": "Prism",
///   "friction_angle_deg": 30.0,
///   "cohesion": 0.0,
///   "eprime": { "method": "Lookup", "soil_type": "CoarseWithFines", "compaction_pct": 90.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    /// Soil unit weight (pcf / kg/m3)
    pub unit_weight: f64,

    /// Depth of cover to the pipe crown (ft / m)
    pub depth_of_cover: f64,

    /// Bedding angle in whole degrees; must be a standard value
    pub bedding_angle_deg: u32,

    /// Earth load model
    #[serde(default)]
    pub load_method: SoilLoadMethod,

    /// Internal friction angle (degrees); required for Trap-Door
    #[serde(default)]
    pub friction_angle_deg: Option<f64>,

    /// Soil cohesion (psi / kPa)
    #[serde(default)]
    pub cohesion: f64,

    /// Lateral earth-pressure coefficient override; when absent the
    /// Rankine active coefficient derived from the friction angle is used
    #[serde(default)]
    pub lateral_earth_coefficient: Option<f64>,

    /// Modulus of soil reaction
    pub eprime: EprimeMethod,
}

impl SoilProfile {
    /// Validate profile invariants.
    pub fn validate(&self) -> CalcResult<()> {
        if self.unit_weight <= 0.0 {
            return Err(CalcError::invalid_input(
                "unit_weight",
                self.unit_weight.to_string(),
                "Unit weight must be positive",
            ));
        }
        if self.depth_of_cover <= 0.0 {
            return Err(CalcError::invalid_input(
                "depth_of_cover",
                self.depth_of_cover.to_string(),
                "Depth of cover must be positive",
            ));
        }
        bedding_coefficients(self.bedding_angle_deg)?;

        if self.load_method == SoilLoadMethod::TrapDoor {
            match self.friction_angle_deg {
                None => return Err(CalcError::missing_field("friction_angle_deg")),
                Some(phi) if phi <= 0.0 || phi >= 90.0 => {
                    return Err(CalcError::invalid_input(
                        "friction_angle_deg",
                        phi.to_string(),
                        "Friction angle must lie between 0 and 90 degrees",
                    ))
                }
                Some(_) => {}
            }
        }
        if self.cohesion < 0.0 {
            return Err(CalcError::invalid_input(
                "cohesion",
                self.cohesion.to_string(),
                "Cohesion cannot be negative",
            ));
        }
        if let Some(k) = self.lateral_earth_coefficient {
            if k <= 0.0 {
                return Err(CalcError::invalid_input(
                    "lateral_earth_coefficient",
                    k.to_string(),
                    "Lateral earth-pressure coefficient must be positive",
                ));
            }
        }
        if let EprimeMethod::Lookup { compaction_pct, .. } = self.eprime {
            if compaction_pct <= 0.0 {
                return Err(CalcError::invalid_input(
                    "compaction_pct",
                    compaction_pct.to_string(),
                    "Compaction must be positive",
                ));
            }
        }
        if let EprimeMethod::UserDefined { value } = self.eprime {
            if value <= 0.0 {
                return Err(CalcError::degenerate(
                    "eprime",
                    "User-defined E' must be positive (it divides the deflection term)",
                ));
            }
        }
        Ok(())
    }

    /// Earth pressure transmitted to the pipe crown (psi).
    ///
    /// Prism: gamma H / 144.
    ///
    /// Trap-Door: when cover exceeds 2.5 pipe diameters, a Terzaghi-style
    /// arching relief applies over a trench width of one diameter:
    ///
    /// ```text
    /// P = B (gamma - 2c/B) / (2 K tan(phi)) * (1 - e^(-2 K tan(phi) H / B))
    /// ```
    ///
    /// which tends to gamma H as H -> 0 and to the arched asymptote at
    /// large depth. Shallower covers fall back to Prism.
    pub fn soil_load_psi(&self, pipe_od_in: f64) -> CalcResult<f64> {
        let gamma = self.unit_weight;
        let h_ft = self.depth_of_cover;
        let prism_psi = gamma * h_ft / 144.0;

        match self.load_method {
            SoilLoadMethod::Prism => Ok(prism_psi),
            SoilLoadMethod::TrapDoor => {
                let d_ft = pipe_od_in / 12.0;
                if h_ft < 2.5 * d_ft {
                    // Arching has not developed
                    return Ok(prism_psi);
                }
                let phi = self
                    .friction_angle_deg
                    .ok_or_else(|| CalcError::missing_field("friction_angle_deg"))?
                    .to_radians();
                let ka = self
                    .lateral_earth_coefficient
                    .unwrap_or_else(|| ((std::f64::consts::FRAC_PI_4) - phi / 2.0).tan().powi(2));
                let mu = 2.0 * ka * phi.tan();
                if mu < 1e-9 {
                    return Ok(prism_psi);
                }
                let b_ft = d_ft;
                let c_psf = self.cohesion * 144.0;
                let net = gamma - 2.0 * c_psf / b_ft;
                if net <= 0.0 {
                    // Cohesion alone carries the column
                    return Ok(0.0);
                }
                let p_psf = b_ft * net / mu * (1.0 - (-mu * h_ft / b_ft).exp());
                Ok((p_psf / 144.0).min(prism_psi))
            }
        }
    }

    /// Convert every field from `from` into the canonical system.
    pub fn to_canonical(&self, from: UnitSystem) -> Self {
        SoilProfile {
            unit_weight: from.to_canonical(Dimension::Density, self.unit_weight),
            depth_of_cover: from.to_canonical(Dimension::LengthLarge, self.depth_of_cover),
            bedding_angle_deg: self.bedding_angle_deg,
            load_method: self.load_method,
            friction_angle_deg: self.friction_angle_deg,
            cohesion: from.to_canonical(Dimension::Pressure, self.cohesion),
            lateral_earth_coefficient: self.lateral_earth_coefficient,
            eprime: match self.eprime {
                EprimeMethod::UserDefined { value } => EprimeMethod::UserDefined {
                    value: from.to_canonical(Dimension::Pressure, value),
                },
                lookup @ EprimeMethod::Lookup { .. } => lookup,
            },
        }
    }
}
