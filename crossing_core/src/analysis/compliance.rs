//! Code compliance evaluation.
//!
//! Each design code caps hoop, longitudinal and equivalent stress at a
//! percentage of SMYS. One code additionally requires a sustained
//! longitudinal check that excludes live load: a crossing can pass the
//! live-inclusive checks and still fail on the sustained case.
//!
//! A stress exactly at its allowable passes; anything above fails.

use serde::{Deserialize, Serialize};

use crate::analysis::stress::StressState;
use crate::errors::{CalcError, CalcResult};

/// Allowable limits as percentages of SMYS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodeProfile {
    pub hoop_pct_smys: f64,
    pub longitudinal_pct_smys: f64,
    pub equivalent_pct_smys: f64,
    /// Whether the sustained (no-live) longitudinal check applies
    pub sustained_check: bool,
}

impl CodeProfile {
    fn validate(&self) -> CalcResult<()> {
        for (field, pct) in [
            ("hoop_pct_smys", self.hoop_pct_smys),
            ("longitudinal_pct_smys", self.longitudinal_pct_smys),
            ("equivalent_pct_smys", self.equivalent_pct_smys),
        ] {
            if pct <= 0.0 || pct > 100.0 {
                return Err(CalcError::invalid_input(
                    field,
                    pct.to_string(),
                    "Allowable percentage must lie in (0, 100]",
                ));
            }
        }
        Ok(())
    }
}

/// Design code selection.
///
/// Three built-in profiles plus fully user-defined limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum DesignCode {
    /// CSA Z662 oil and gas pipeline systems
    CsaZ662,
    /// ASME B31.4 liquid pipelines (carries the sustained check)
    AsmeB31_4,
    /// ASME B31.8 gas transmission
    AsmeB31_8,
    /// Explicit user-supplied limits
    UserDefined {
        hoop_pct_smys: f64,
        longitudinal_pct_smys: f64,
        equivalent_pct_smys: f64,
        sustained_check: bool,
    },
}

impl Default for DesignCode {
    fn default() -> Self {
        DesignCode::CsaZ662
    }
}

impl DesignCode {
    /// Display name for UI and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            DesignCode::CsaZ662 => "CSA Z662",
            DesignCode::AsmeB31_4 => "ASME B31.4",
            DesignCode::AsmeB31_8 => "ASME B31.8",
            DesignCode::UserDefined { .. } => "User defined",
        }
    }

    /// Resolve the allowable profile for this code.
    pub fn profile(&self) -> CodeProfile {
        match self {
            DesignCode::CsaZ662 => CodeProfile {
                hoop_pct_smys: 90.0,
                longitudinal_pct_smys: 90.0,
                equivalent_pct_smys: 90.0,
                sustained_check: false,
            },
            DesignCode::AsmeB31_4 => CodeProfile {
                hoop_pct_smys: 90.0,
                longitudinal_pct_smys: 80.0,
                equivalent_pct_smys: 90.0,
                sustained_check: true,
            },
            DesignCode::AsmeB31_8 => CodeProfile {
                hoop_pct_smys: 90.0,
                longitudinal_pct_smys: 90.0,
                equivalent_pct_smys: 90.0,
                sustained_check: false,
            },
            DesignCode::UserDefined {
                hoop_pct_smys,
                longitudinal_pct_smys,
                equivalent_pct_smys,
                sustained_check,
            } => CodeProfile {
                hoop_pct_smys: *hoop_pct_smys,
                longitudinal_pct_smys: *longitudinal_pct_smys,
                equivalent_pct_smys: *equivalent_pct_smys,
                sustained_check: *sustained_check,
            },
        }
    }

    /// Validate the code selection (user-defined limits in range).
    pub fn validate(&self) -> CalcResult<()> {
        self.profile().validate()
    }
}

/// One allowable-stress check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// e.g. "Hoop at MOP", "Sustained longitudinal"
    pub name: String,
    /// Governing stress magnitude compared against the allowable
    pub stress: f64,
    /// Allowable stress
    pub allowable: f64,
    pub passes: bool,
}

impl CheckResult {
    fn new(name: impl Into<String>, stress: f64, allowable: f64) -> Self {
        CheckResult {
            name: name.into(),
            stress,
            allowable,
            // Boundary inclusive: exactly at the allowable passes
            passes: stress <= allowable,
        }
    }
}

/// Full compliance verdict for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// The six hoop/longitudinal/equivalent checks at both states
    pub checks: Vec<CheckResult>,
    /// The sustained longitudinal checks, present only when the code
    /// requires them
    pub sustained: Vec<CheckResult>,
    /// Allowable stresses used
    pub hoop_allowable: f64,
    pub longitudinal_allowable: f64,
    pub equivalent_allowable: f64,
    pub overall_pass: bool,
}

/// Envelope magnitude compared against an allowable: the worse of the two
/// envelope extremes.
fn governing_magnitude(high: f64, low: f64) -> f64 {
    high.abs().max(low.abs())
}

/// Evaluate a code against the zero-pressure and MOP stress states.
pub fn evaluate(
    code: DesignCode,
    smys_psi: f64,
    zero_state: &StressState,
    mop_state: &StressState,
) -> CalcResult<ComplianceReport> {
    code.validate()?;
    if smys_psi <= 0.0 {
        return Err(CalcError::degenerate(
            "smys",
            "SMYS must be positive to derive allowables",
        ));
    }
    let profile = code.profile();

    let hoop_allowable = profile.hoop_pct_smys / 100.0 * smys_psi;
    let long_allowable = profile.longitudinal_pct_smys / 100.0 * smys_psi;
    let equiv_allowable = profile.equivalent_pct_smys / 100.0 * smys_psi;

    let mut checks = Vec::with_capacity(6);
    for (state, tag) in [(zero_state, "at zero pressure"), (mop_state, "at MOP")] {
        checks.push(CheckResult::new(
            format!("Hoop {}", tag),
            governing_magnitude(state.hoop.high, state.hoop.low),
            hoop_allowable,
        ));
        checks.push(CheckResult::new(
            format!("Longitudinal {}", tag),
            governing_magnitude(state.longitudinal.high, state.longitudinal.low),
            long_allowable,
        ));
        checks.push(CheckResult::new(
            format!("Equivalent {}", tag),
            state.equivalent.high,
            equiv_allowable,
        ));
    }

    let mut sustained = Vec::new();
    if profile.sustained_check {
        for (state, tag) in [(zero_state, "at zero pressure"), (mop_state, "at MOP")] {
            sustained.push(CheckResult::new(
                format!("Sustained longitudinal {}", tag),
                state.sustained_longitudinal,
                long_allowable,
            ));
        }
    }

    let overall_pass =
        checks.iter().all(|c| c.passes) && sustained.iter().all(|c| c.passes);

    Ok(ComplianceReport {
        checks,
        sustained,
        hoop_allowable,
        longitudinal_allowable: long_allowable,
        equivalent_allowable: equiv_allowable,
        overall_pass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stress::{EquivalentEnvelope, StressComponents, StressEnvelope};

    fn state(
        hoop_high: f64,
        long_high: f64,
        equiv_high: f64,
        sustained: f64,
    ) -> StressState {
        let envelope = |high: f64| StressEnvelope {
            high,
            low: 0.0,
            components: StressComponents {
                pressure: 0.0,
                earth: 0.0,
                thermal: 0.0,
                total: high,
            },
        };
        StressState {
            internal_pressure: 0.0,
            hoop: envelope(hoop_high),
            longitudinal: envelope(long_high),
            equivalent: EquivalentEnvelope {
                high: equiv_high,
                low: 0.0,
                percent_smys: equiv_high / 520.0,
            },
            sustained_longitudinal: sustained,
            axial_moment: 0.0,
        }
    }

    #[test]
    fn test_boundary_stress_passes() {
        // Allowable = 90% of 52000 = 46800; exactly at the limit passes
        let s = state(46800.0, 0.0, 0.0, 0.0);
        let report = evaluate(DesignCode::CsaZ662, 52000.0, &s, &s).unwrap();
        assert!(report.overall_pass);

        // One ulp above fails
        let s = state(f64::from_bits(46800.0f64.to_bits() + 1), 0.0, 0.0, 0.0);
        let report = evaluate(DesignCode::CsaZ662, 52000.0, &s, &s).unwrap();
        assert!(!report.overall_pass);
    }

    #[test]
    fn test_sustained_check_diverges_between_codes() {
        // Live-inclusive longitudinal passes (30000 < 80% of 52000) but the
        // sustained magnitude exceeds the longitudinal allowable.
        let s = state(1000.0, 30000.0, 1000.0, 45000.0);

        let without = evaluate(DesignCode::CsaZ662, 52000.0, &s, &s).unwrap();
        assert!(without.overall_pass);
        assert!(without.sustained.is_empty());

        let with = evaluate(DesignCode::AsmeB31_4, 52000.0, &s, &s).unwrap();
        assert!(!with.overall_pass);
        assert_eq!(with.sustained.len(), 2);
        assert!(with.checks.iter().all(|c| c.passes));
    }

    #[test]
    fn test_six_checks_reported() {
        let s = state(0.0, 0.0, 0.0, 0.0);
        let report = evaluate(DesignCode::AsmeB31_8, 52000.0, &s, &s).unwrap();
        assert_eq!(report.checks.len(), 6);
    }

    #[test]
    fn test_user_defined_limits_validated() {
        let code = DesignCode::UserDefined {
            hoop_pct_smys: 0.0,
            longitudinal_pct_smys: 90.0,
            equivalent_pct_smys: 90.0,
            sustained_check: false,
        };
        assert!(code.validate().is_err());

        let code = DesignCode::UserDefined {
            hoop_pct_smys: 72.0,
            longitudinal_pct_smys: 80.0,
            equivalent_pct_smys: 90.0,
            sustained_check: true,
        };
        assert!(code.validate().is_ok());
        assert!(code.profile().sustained_check);
    }

    #[test]
    fn test_compressive_envelope_governs_by_magnitude() {
        let mut s = state(0.0, 0.0, 0.0, 0.0);
        s.longitudinal.low = -50000.0;
        let report = evaluate(DesignCode::CsaZ662, 52000.0, &s, &s).unwrap();
        assert!(!report.overall_pass);
    }
}
