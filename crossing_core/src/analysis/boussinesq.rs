//! Elastic half-space point-load superposition.
//!
//! The vertical stress at depth z below the surface, at horizontal
//! distance R from a surface point load Q, is the Boussinesq solution
//!
//! ```text
//! sigma = 3 Q / (2 pi z^2 (1 + (R/z)^2)^2.5)
//! ```
//!
//! Every discrete footprint cell contributes at every measurement point;
//! the governing result is the maximum total across the fixed point set.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::loads::{MeasurementPoint, PointLoad};

/// Governing transmitted pressure and where it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoverningPressure {
    /// Maximum transmitted vertical pressure (psi)
    pub pressure_psi: f64,
    /// Label of the governing measurement point
    pub location: String,
    /// Transmitted pressure at every candidate point, for diagnostics
    pub per_point_psi: Vec<(String, f64)>,
}

/// Vertical stress at depth from a single surface point load (psi).
pub fn point_stress_psi(load_lb: f64, depth_in: f64, radial_in: f64) -> f64 {
    let ratio = radial_in / depth_in;
    3.0 * load_lb
        / (2.0 * std::f64::consts::PI * depth_in * depth_in * (1.0 + ratio * ratio).powf(2.5))
}

/// Superpose all point loads at each measurement point and pick the
/// governing maximum.
pub fn governing_pressure(
    loads: &[PointLoad],
    points: &[MeasurementPoint],
    depth_in: f64,
) -> CalcResult<GoverningPressure> {
    if depth_in <= 0.0 {
        return Err(CalcError::degenerate(
            "depth_of_cover",
            "Boussinesq depth must be positive",
        ));
    }
    if points.is_empty() {
        return Err(CalcError::analysis_failed(
            "boussinesq",
            "No measurement points were generated",
        ));
    }

    let mut per_point = Vec::with_capacity(points.len());
    for point in points {
        let total: f64 = loads
            .iter()
            .map(|load| {
                let dx = load.longitudinal_in - point.longitudinal_in;
                let dy = load.lateral_in - point.lateral_in;
                point_stress_psi(load.load_lb, depth_in, (dx * dx + dy * dy).sqrt())
            })
            .sum();
        per_point.push((point.label.clone(), total));
    }

    let (location, pressure_psi) = per_point
        .iter()
        .cloned()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| {
            CalcError::analysis_failed("boussinesq", "No measurement points were generated")
        })?;

    Ok(GoverningPressure {
        pressure_psi,
        location,
        per_point_psi: per_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::MeasurementPoint;

    #[test]
    fn test_point_solution_directly_below() {
        // Q = 1000 lb, z = 48 in, R = 0:
        // sigma = 3*1000 / (2 pi 48^2) = 0.2073 psi
        let sigma = point_stress_psi(1000.0, 48.0, 0.0);
        assert!((sigma - 0.2073).abs() < 0.001);
    }

    #[test]
    fn test_offset_attenuates() {
        let below = point_stress_psi(1000.0, 48.0, 0.0);
        let offset = point_stress_psi(1000.0, 48.0, 24.0);
        assert!(offset < below);
        assert!(offset > 0.0);
    }

    #[test]
    fn test_deeper_cover_never_increases_pressure() {
        let loads = vec![
            PointLoad {
                longitudinal_in: -12.0,
                lateral_in: 0.0,
                load_lb: 5000.0,
            },
            PointLoad {
                longitudinal_in: 12.0,
                lateral_in: 6.0,
                load_lb: 5000.0,
            },
        ];
        let points = vec![MeasurementPoint::new(0.0, 0.0, "Origin")];

        let mut previous = f64::INFINITY;
        for depth_in in [24.0, 36.0, 48.0, 72.0, 120.0, 240.0] {
            let result = governing_pressure(&loads, &points, depth_in).unwrap();
            assert!(result.pressure_psi <= previous);
            previous = result.pressure_psi;
        }
    }

    #[test]
    fn test_governing_point_selection() {
        let loads = vec![PointLoad {
            longitudinal_in: 48.0,
            lateral_in: 0.0,
            load_lb: 10000.0,
        }];
        let points = vec![
            MeasurementPoint::new(0.0, 0.0, "At pipe centerline"),
            MeasurementPoint::new(48.0, 0.0, "Under load center"),
        ];
        let result = governing_pressure(&loads, &points, 48.0).unwrap();
        assert_eq!(result.location, "Under load center");
        assert_eq!(result.per_point_psi.len(), 2);
    }

    #[test]
    fn test_zero_depth_is_degenerate() {
        let loads = vec![];
        let points = vec![MeasurementPoint::new(0.0, 0.0, "Origin")];
        assert!(governing_pressure(&loads, &points, 0.0).is_err());
    }
}
