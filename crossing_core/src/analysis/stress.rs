//! Pipe stress resolver.
//!
//! Combines the earth load, the impact-adjusted live surface pressure and
//! the internal pressure into hoop and longitudinal stress envelopes, then
//! an equivalent-stress envelope, at one internal-pressure state.
//!
//! ## Components
//!
//! - Hoop from external pressure: Spangler form
//!   `3 Kb P (D/t)^2 / (1 + 3 Kz (Pint/E)(D/t)^3 + 0.0915 (E'/E)(D/t)^3)`
//! - Hoop from internal pressure: thin-wall `Pint D / 2t`
//! - Longitudinal live: local ovaling bending (shape coefficient x Beta x
//!   hoop) plus axial bending from a beam-on-elastic-foundation model with
//!   a bounded numerical search for the governing moment
//! - Longitudinal thermal: `-E alpha dT` (compressive when the line warms)
//! - Equivalent: Tresca or Von Mises over all four hoop/longitudinal sign
//!   combinations

use serde::{Deserialize, Serialize};

use crate::case::StressCriterion;
use crate::constants::{
    beta_ovaling, ALPHA_STEEL_PER_DEGF, E_STEEL_PSI, LOAD_SPREAD_ANGLE_DEG, MOMENT_SCAN_SAMPLES,
    MOMENT_SCAN_SPAN_FACTOR, OVALING_SHAPE_COEFF, POISSON_STEEL, SPANGLER_DEFLECTION_COEFF,
    HOOP_SOIL_SUPPORT_COEFF,
};
use crate::errors::{CalcError, CalcResult};
use crate::pipe::PipeSection;
use crate::soil::BeddingCoefficients;

/// Stress component breakdown (psi). `total` is the high-envelope value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressComponents {
    /// From internal pressure
    pub pressure: f64,
    /// From the earth load
    pub earth: f64,
    /// From the temperature differential (zero for hoop)
    pub thermal: f64,
    /// High-envelope total
    pub total: f64,
}

/// High/low stress envelope with its component breakdown (psi).
///
/// Convention: live load enters the high envelope only; the low envelope
/// carries the permanent components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressEnvelope {
    pub high: f64,
    pub low: f64,
    pub components: StressComponents,
}

/// Equivalent-stress envelope (psi) plus utilization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquivalentEnvelope {
    pub high: f64,
    pub low: f64,
    /// High envelope as a percentage of SMYS
    pub percent_smys: f64,
}

/// Resolved stresses at one internal-pressure state.
///
/// Fields are unit-neutral: canonical psi / in-lb inside the engine, the
/// case's unit system after the dispatcher denormalizes the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressState {
    /// Internal pressure of this state: 0 or MOP
    pub internal_pressure: f64,
    pub hoop: StressEnvelope,
    pub longitudinal: StressEnvelope,
    pub equivalent: EquivalentEnvelope,
    /// Governing sustained longitudinal magnitude (internal + thermal
    /// +/- earth, live load excluded), for the code-specific check
    pub sustained_longitudinal: f64,
    /// Governing axial bending moment found by the foundation-beam scan
    pub axial_moment: f64,
}

/// Shared inputs for resolving both pressure states.
#[derive(Debug, Clone, Copy)]
pub struct StressInputs<'a> {
    pub pipe: &'a PipeSection,
    pub bedding: BeddingCoefficients,
    /// Modulus of soil reaction (psi)
    pub eprime_psi: f64,
    /// Earth pressure at the crown (psi)
    pub soil_pressure_psi: f64,
    /// Impact-adjusted governing live pressure (psi)
    pub live_pressure_psi: f64,
    /// Depth of cover (ft)
    pub cover_ft: f64,
    pub criterion: StressCriterion,
}

impl<'a> StressInputs<'a> {
    /// Resolve the full stress state at one internal pressure.
    pub fn resolve_state(&self, internal_pressure_psi: f64) -> CalcResult<StressState> {
        let pipe = self.pipe;
        if pipe.wall_thickness <= 0.0 {
            return Err(CalcError::degenerate(
                "wall_thickness",
                "Wall thickness divides the hoop stress terms",
            ));
        }
        if self.eprime_psi <= 0.0 {
            return Err(CalcError::degenerate(
                "eprime",
                "E' must be positive for the soil support terms",
            ));
        }

        // Hoop
        let hoop_soil = self.spangler_hoop(self.soil_pressure_psi, internal_pressure_psi);
        let hoop_live = self.spangler_hoop(self.live_pressure_psi, internal_pressure_psi);
        let hoop_internal = pipe.hoop_from_internal(internal_pressure_psi);

        let hoop_high = hoop_internal + hoop_soil + hoop_live;
        let hoop_low = hoop_internal + hoop_soil;
        let hoop = StressEnvelope {
            high: hoop_high,
            low: hoop_low,
            components: StressComponents {
                pressure: hoop_internal,
                earth: hoop_soil,
                thermal: 0.0,
                total: hoop_high,
            },
        };

        // Longitudinal
        let beta = beta_ovaling();
        let long_pressure = POISSON_STEEL * hoop_internal;
        let long_earth = OVALING_SHAPE_COEFF * beta * hoop_soil;
        let long_thermal = -E_STEEL_PSI * ALPHA_STEEL_PER_DEGF * pipe.temperature_differential;
        let (axial_moment, axial_bending) = self.axial_bending()?;
        let long_live = OVALING_SHAPE_COEFF * beta * hoop_live + axial_bending;

        let long_low = long_pressure + long_earth + long_thermal;
        let long_high = long_low + long_live;
        let longitudinal = StressEnvelope {
            high: long_high,
            low: long_low,
            components: StressComponents {
                pressure: long_pressure,
                earth: long_earth,
                thermal: long_thermal,
                total: long_high,
            },
        };

        // Sustained longitudinal: live load excluded, earth taken both ways
        let sustained_longitudinal = (long_pressure + long_thermal + long_earth)
            .abs()
            .max((long_pressure + long_thermal - long_earth).abs());

        let equivalent = equivalent_envelope(
            hoop_high,
            hoop_low,
            long_high,
            long_low,
            self.criterion,
            pipe.smys,
        )?;

        Ok(StressState {
            internal_pressure: internal_pressure_psi,
            hoop,
            longitudinal,
            equivalent,
            sustained_longitudinal,
            axial_moment,
        })
    }

    /// Spangler hoop stress from an external pressure (psi).
    ///
    /// Internal pressure and soil support both stiffen the ring, which is
    /// what the denominator carries.
    fn spangler_hoop(&self, external_pressure_psi: f64, internal_pressure_psi: f64) -> f64 {
        let dt = self.pipe.dt_ratio();
        let denom = 1.0
            + 3.0 * self.bedding.kz * (internal_pressure_psi / E_STEEL_PSI) * dt.powi(3)
            + HOOP_SOIL_SUPPORT_COEFF * (self.eprime_psi / E_STEEL_PSI) * dt.powi(3);
        3.0 * self.bedding.kb * external_pressure_psi * dt.powi(2) / denom
    }

    /// Governing axial bending from the beam-on-elastic-foundation model:
    /// (moment in-lb, bending stress psi).
    ///
    /// The live surface pressure becomes an equivalent line load over a
    /// loaded length set by the load-spread angle; the bending moment
    /// along an infinite beam on an elastic foundation has a closed form
    /// (distinct inside and outside the loaded length) which is scanned at
    /// a fixed sample count over a fixed multiple of the loaded length.
    fn axial_bending(&self) -> CalcResult<(f64, f64)> {
        let pipe = self.pipe;
        let inertia = pipe.moment_of_inertia_in4();
        if inertia <= 0.0 {
            return Err(CalcError::degenerate(
                "moment_of_inertia",
                "Section inertia must be positive",
            ));
        }

        // Decay parameter lambda (1/in)
        let lambda =
            (self.bedding.theta * self.eprime_psi / (4.0 * E_STEEL_PSI * inertia)).powf(0.25);
        if !(lambda > 0.0) || !lambda.is_finite() {
            return Err(CalcError::degenerate(
                "lambda",
                "Foundation decay parameter is not positive and finite",
            ));
        }

        let cover_in = self.cover_ft * 12.0;
        let loaded_length_in = cover_in * LOAD_SPREAD_ANGLE_DEG.to_radians().tan();
        if loaded_length_in <= 0.0 {
            return Ok((0.0, 0.0));
        }

        // Equivalent line load on the pipe (lb/in)
        let line_load = self.live_pressure_psi * pipe.outer_diameter;

        let half = loaded_length_in / 2.0;
        let span = MOMENT_SCAN_SPAN_FACTOR * loaded_length_in;
        let step = 2.0 * span / (MOMENT_SCAN_SAMPLES - 1) as f64;
        let amplitude = line_load / (4.0 * lambda * lambda);

        // e^-u sin(u), the Hetenyi moment kernel
        let kernel = |u: f64| (-u).exp() * u.sin();

        let mut moment_max: f64 = 0.0;
        for i in 0..MOMENT_SCAN_SAMPLES {
            let x = -span + i as f64 * step;
            let moment = if x.abs() <= half {
                // Inside the loaded length
                let a = half + x;
                let b = half - x;
                amplitude * (kernel(lambda * a) + kernel(lambda * b))
            } else {
                // Outside: near-end distance a, far-end distance b
                let a = x.abs() - half;
                let b = x.abs() + half;
                amplitude * (kernel(lambda * a) - kernel(lambda * b))
            };
            moment_max = moment_max.max(moment.abs());
        }

        let stress = moment_max * (pipe.outer_diameter / 2.0) / inertia;
        Ok((moment_max, stress))
    }

    /// Spangler ring deflection ratio (dimensionless, deflection over
    /// diameter) under the combined external pressure.
    pub fn deflection_ratio(&self) -> CalcResult<f64> {
        let pipe = self.pipe;
        let r = pipe.mean_radius_in();
        let ring_stiffness = E_STEEL_PSI * pipe.wall_inertia_per_in() / r.powi(3);
        let denom = ring_stiffness + SPANGLER_DEFLECTION_COEFF * self.eprime_psi;
        if denom <= 0.0 {
            return Err(CalcError::degenerate(
                "deflection_denominator",
                "Ring stiffness plus soil support must be positive",
            ));
        }
        Ok(self.bedding.kz * (self.soil_pressure_psi + self.live_pressure_psi) / denom)
    }
}

/// Equivalent stress over all four sign combinations of the hoop and
/// longitudinal envelopes.
pub fn equivalent_envelope(
    hoop_high: f64,
    hoop_low: f64,
    long_high: f64,
    long_low: f64,
    criterion: StressCriterion,
    smys: f64,
) -> CalcResult<EquivalentEnvelope> {
    if smys <= 0.0 {
        return Err(CalcError::degenerate(
            "smys",
            "SMYS divides the utilization percentage",
        ));
    }

    let mut high = f64::NEG_INFINITY;
    let mut low = f64::INFINITY;
    for hoop in [hoop_high, hoop_low] {
        for long in [long_high, long_low] {
            let value = match criterion {
                StressCriterion::Tresca => (hoop - long).abs(),
                StressCriterion::VonMises => {
                    (hoop * hoop - hoop * long + long * long).sqrt()
                }
            };
            high = high.max(value);
            low = low.min(value);
        }
    }

    Ok(EquivalentEnvelope {
        high,
        low,
        percent_smys: high / smys * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::bedding_coefficients;

    fn test_pipe() -> PipeSection {
        PipeSection {
            outer_diameter: 24.0,
            wall_thickness: 0.375,
            smys: 52000.0,
            max_operating_pressure: 1000.0,
            temperature_differential: 40.0,
        }
    }

    fn inputs(pipe: &PipeSection) -> StressInputs<'_> {
        StressInputs {
            pipe,
            bedding: bedding_coefficients(90).unwrap(),
            eprime_psi: 1312.2,
            soil_pressure_psi: 3.333,
            live_pressure_psi: 8.0,
            cover_ft: 4.0,
            criterion: StressCriterion::VonMises,
        }
    }

    #[test]
    fn test_spangler_denominator_stiffens_with_pressure() {
        let pipe = test_pipe();
        let inp = inputs(&pipe);
        let at_zero = inp.spangler_hoop(10.0, 0.0);
        let at_mop = inp.spangler_hoop(10.0, 1000.0);
        assert!(at_mop < at_zero);
        assert!(at_zero > 0.0);
    }

    #[test]
    fn test_spangler_hand_check() {
        // D/t = 64, Kb = 0.157, Kz = 0.096, E' = 1312.2, Pint = 0:
        // denom = 1 + 0.0915 * (1312.2/30e6) * 64^3 = 2.0491
        // hoop = 3 * 0.157 * 10 * 64^2 / denom = 9414 psi
        let pipe = test_pipe();
        let inp = inputs(&pipe);
        let hoop = inp.spangler_hoop(10.0, 0.0);
        assert!((hoop - 9414.0).abs() < 25.0);
    }

    #[test]
    fn test_thermal_is_compressive_for_warming() {
        let pipe = test_pipe();
        let state = inputs(&pipe).resolve_state(0.0).unwrap();
        assert!(state.longitudinal.components.thermal < 0.0);
        // -30e6 * 6.5e-6 * 40 = -7800 psi
        assert!((state.longitudinal.components.thermal + 7800.0).abs() < 1e-6);
    }

    #[test]
    fn test_live_load_enters_high_side_only() {
        let pipe = test_pipe();
        let state = inputs(&pipe).resolve_state(0.0).unwrap();
        assert!(state.hoop.high > state.hoop.low);
        assert!(state.longitudinal.high > state.longitudinal.low);
        // Low hoop at zero internal pressure is the earth term alone
        assert!((state.hoop.low - state.hoop.components.earth).abs() < 1e-9);
    }

    #[test]
    fn test_internal_pressure_raises_hoop() {
        let pipe = test_pipe();
        let inp = inputs(&pipe);
        let zero = inp.resolve_state(0.0).unwrap();
        let mop = inp.resolve_state(1000.0).unwrap();
        assert!(mop.hoop.high > zero.hoop.high);
        // Thin-wall term: 1000 * 24 / 0.75 = 32000 psi
        assert!((mop.hoop.components.pressure - 32000.0).abs() < 1e-6);
    }

    #[test]
    fn test_axial_moment_is_bounded_and_positive() {
        let pipe = test_pipe();
        let state = inputs(&pipe).resolve_state(0.0).unwrap();
        assert!(state.axial_moment > 0.0);
        assert!(state.axial_moment.is_finite());
    }

    #[test]
    fn test_sustained_excludes_live() {
        let pipe = test_pipe();
        let inp = inputs(&pipe);
        let quiet = StressInputs {
            live_pressure_psi: 0.0,
            ..inp
        };
        let with_live = inp.resolve_state(1000.0).unwrap();
        let without = quiet.resolve_state(1000.0).unwrap();
        assert!(
            (with_live.sustained_longitudinal - without.sustained_longitudinal).abs() < 1e-9
        );
    }

    #[test]
    fn test_equivalent_tresca_known_values() {
        let env = equivalent_envelope(100.0, 50.0, -30.0, -60.0, StressCriterion::Tresca, 1000.0)
            .unwrap();
        // max |hoop - long| = |100 - (-60)| = 160, min = |50 - (-30)| = 80
        assert_eq!(env.high, 160.0);
        assert_eq!(env.low, 80.0);
        assert!((env.percent_smys - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_equivalent_von_mises_uniaxial() {
        let env = equivalent_envelope(100.0, 100.0, 0.0, 0.0, StressCriterion::VonMises, 1000.0)
            .unwrap();
        assert!((env.high - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_smys_is_degenerate() {
        assert!(
            equivalent_envelope(1.0, 0.0, 1.0, 0.0, StressCriterion::Tresca, 0.0).is_err()
        );
    }

    #[test]
    fn test_deflection_ratio_positive_and_small() {
        let pipe = test_pipe();
        let ratio = inputs(&pipe).deflection_ratio().unwrap();
        assert!(ratio > 0.0);
        assert!(ratio < 0.1);
    }
}
