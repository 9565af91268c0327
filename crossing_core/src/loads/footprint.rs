//! Footprint generation per vehicle type.
//!
//! Each generator produces rectangular contact footprints, subdivides them
//! into equal-load cells at the nominal 6-inch spacing (grids use their
//! explicit division counts instead) and emits the fixed measurement-point
//! set for the vehicle geometry.

use crate::case::{GridLoad, TireSpec, Vehicle};
use crate::constants::FOOTPRINT_CELL_SPACING_IN;
use crate::errors::{CalcError, CalcResult};
use crate::loads::{MeasurementPoint, PointLoad};

/// A rectangular contact area carrying a total load.
#[derive(Debug, Clone, Copy)]
struct Footprint {
    /// Rectangle center along the pipe (in)
    center_longitudinal_in: f64,
    /// Rectangle center across the pipe (in)
    center_lateral_in: f64,
    /// Extent along the pipe (in)
    extent_longitudinal_in: f64,
    /// Extent across the pipe (in)
    extent_lateral_in: f64,
    /// Total load carried by the rectangle (lb)
    total_load_lb: f64,
}

impl Footprint {
    /// Split into an n_long x n_lat grid of equal-load cells at the cell
    /// centers.
    fn discretize(&self, n_long: usize, n_lat: usize, out: &mut Vec<PointLoad>) {
        let cell_load = self.total_load_lb / (n_long * n_lat) as f64;
        let dx = self.extent_longitudinal_in / n_long as f64;
        let dy = self.extent_lateral_in / n_lat as f64;
        let x0 = self.center_longitudinal_in - self.extent_longitudinal_in / 2.0;
        let y0 = self.center_lateral_in - self.extent_lateral_in / 2.0;

        for i in 0..n_long {
            for j in 0..n_lat {
                out.push(PointLoad {
                    longitudinal_in: x0 + (i as f64 + 0.5) * dx,
                    lateral_in: y0 + (j as f64 + 0.5) * dy,
                    load_lb: cell_load,
                });
            }
        }
    }

    /// Cell counts at the nominal spacing, at least one per side.
    fn nominal_divisions(&self) -> (usize, usize) {
        let n = |extent: f64| ((extent / FOOTPRINT_CELL_SPACING_IN).ceil() as usize).max(1);
        (
            n(self.extent_longitudinal_in),
            n(self.extent_lateral_in),
        )
    }
}

/// Tire contact rectangle (width, length) in inches for one axle.
///
/// Automatic mode sizes the patch from inflation pressure: contact area per
/// tire = (axle load / tires per axle) / tire pressure, and contact length
/// = area / tire width. Manual mode passes the rectangle through.
pub fn contact_patch_in(tires: &TireSpec, axle_load_lb: f64) -> CalcResult<(f64, f64)> {
    match tires {
        TireSpec::Manual { width, length } => Ok((*width, *length)),
        TireSpec::Automatic {
            tire_pressure,
            tires_per_axle,
            tire_width,
        } => {
            let pressure = tire_pressure.ok_or_else(|| CalcError::missing_field("tire_pressure"))?;
            let tires_n = tires_per_axle.ok_or_else(|| CalcError::missing_field("tires_per_axle"))?;
            if pressure <= 0.0 {
                return Err(CalcError::invalid_input(
                    "tire_pressure",
                    pressure.to_string(),
                    "Tire pressure must be positive",
                ));
            }
            if tires_n == 0 {
                return Err(CalcError::invalid_input(
                    "tires_per_axle",
                    "0",
                    "At least one tire per axle is required",
                ));
            }
            let area_per_tire = axle_load_lb / tires_n as f64 / pressure;
            let length = area_per_tire / tire_width;
            Ok((*tire_width, length))
        }
    }
}

/// Generate the discrete point loads and measurement points for a vehicle.
///
/// The vehicle must already be in canonical units and validated.
pub fn generate_point_loads(
    vehicle: &Vehicle,
) -> CalcResult<(Vec<PointLoad>, Vec<MeasurementPoint>)> {
    vehicle.validate()?;
    match vehicle {
        Vehicle::Track {
            total_weight,
            track_length,
            track_width,
            track_separation,
        } => generate_track(*total_weight, *track_length, *track_width, *track_separation),
        Vehicle::TwoAxle {
            axle_spacing,
            front_axle_load,
            rear_axle_load,
            lane_offset,
            tires,
        } => generate_axles(
            &[(0.0, *front_axle_load), (*axle_spacing, *rear_axle_load)],
            *lane_offset,
            tires,
        ),
        Vehicle::ThreeAxle {
            spacing_1_2,
            spacing_2_3,
            axle_loads,
            lane_offset,
            tires,
        } => generate_axles(
            &[
                (0.0, axle_loads[0]),
                (*spacing_1_2, axle_loads[1]),
                (*spacing_1_2 + *spacing_2_3, axle_loads[2]),
            ],
            *lane_offset,
            tires,
        ),
        Vehicle::Grid {
            length,
            width,
            longitudinal_offset,
            lateral_offset,
            divisions_longitudinal,
            divisions_lateral,
            load,
        } => generate_grid(
            *length,
            *width,
            *longitudinal_offset,
            *lateral_offset,
            *divisions_longitudinal,
            *divisions_lateral,
            load,
        ),
    }
}

/// Two parallel track rectangles symmetric about the pipe, each carrying
/// half the vehicle weight. Tracks run in the travel direction (across the
/// pipe); their separation spans along the pipe axis.
fn generate_track(
    total_weight_lb: f64,
    track_length_ft: f64,
    track_width_ft: f64,
    track_separation_ft: f64,
) -> CalcResult<(Vec<PointLoad>, Vec<MeasurementPoint>)> {
    let half_sep_in = track_separation_ft * 12.0 / 2.0;
    let mut loads = Vec::new();

    for side in [-1.0, 1.0] {
        let footprint = Footprint {
            center_longitudinal_in: side * half_sep_in,
            center_lateral_in: 0.0,
            extent_longitudinal_in: track_width_ft * 12.0,
            extent_lateral_in: track_length_ft * 12.0,
            total_load_lb: total_weight_lb / 2.0,
        };
        let (n_long, n_lat) = footprint.nominal_divisions();
        footprint.discretize(n_long, n_lat, &mut loads);
    }

    let points = vec![
        MeasurementPoint::new(0.0, 0.0, "Between tracks"),
        MeasurementPoint::new(half_sep_in, 0.0, "Under track"),
        MeasurementPoint::new(-half_sep_in, 0.0, "Under track (far side)"),
    ];
    Ok((loads, points))
}

/// One tire-sized rectangle per axle, positioned along the travel axis by
/// cumulative spacing and shifted laterally by the lane offset.
fn generate_axles(
    axles: &[(f64, f64)], // (cumulative position ft, axle load lb)
    lane_offset_ft: f64,
    tires: &TireSpec,
) -> CalcResult<(Vec<PointLoad>, Vec<MeasurementPoint>)> {
    let mut loads = Vec::new();
    let mut points = Vec::new();
    let lateral_in = lane_offset_ft * 12.0;

    let mut weighted_position = 0.0;
    let mut total_load = 0.0;

    for (i, &(position_ft, axle_load_lb)) in axles.iter().enumerate() {
        let (width_in, length_in) = contact_patch_in(tires, axle_load_lb)?;
        let position_in = position_ft * 12.0;

        let footprint = Footprint {
            center_longitudinal_in: position_in,
            center_lateral_in: lateral_in,
            extent_longitudinal_in: length_in,
            extent_lateral_in: width_in,
            total_load_lb: axle_load_lb,
        };
        let (n_long, n_lat) = footprint.nominal_divisions();
        footprint.discretize(n_long, n_lat, &mut loads);

        points.push(MeasurementPoint::new(
            position_in,
            0.0,
            format!("Under axle {}", i + 1),
        ));
        weighted_position += position_in * axle_load_lb;
        total_load += axle_load_lb;
    }

    points.push(MeasurementPoint::new(
        weighted_position / total_load,
        0.0,
        "Under load center",
    ));
    Ok((loads, points))
}

/// A single rectangle subdivided by the explicit division counts.
fn generate_grid(
    length_ft: f64,
    width_ft: f64,
    longitudinal_offset_ft: f64,
    lateral_offset_ft: f64,
    divisions_longitudinal: u32,
    divisions_lateral: u32,
    load: &GridLoad,
) -> CalcResult<(Vec<PointLoad>, Vec<MeasurementPoint>)> {
    let extent_longitudinal_in = length_ft * 12.0;
    let extent_lateral_in = width_ft * 12.0;
    let total_load_lb = match load {
        GridLoad::TotalLoad(f) => *f,
        GridLoad::UniformPressure(p_psi) => p_psi * extent_longitudinal_in * extent_lateral_in,
    };

    let footprint = Footprint {
        center_longitudinal_in: longitudinal_offset_ft * 12.0,
        center_lateral_in: lateral_offset_ft * 12.0,
        extent_longitudinal_in,
        extent_lateral_in,
        total_load_lb,
    };
    let mut loads = Vec::new();
    footprint.discretize(divisions_longitudinal as usize, divisions_lateral as usize, &mut loads);

    let points = vec![
        MeasurementPoint::new(longitudinal_offset_ft * 12.0, 0.0, "Under load center"),
        MeasurementPoint::new(0.0, 0.0, "At pipe centerline"),
    ];
    Ok((loads, points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_patch_automatic() {
        // 12000 lb axle, 2 tires, 80 psi, 8 in wide:
        // area per tire = 6000/80 = 75 in^2, length = 75/8 = 9.375 in
        let tires = TireSpec::Automatic {
            tire_pressure: Some(80.0),
            tires_per_axle: Some(2),
            tire_width: 8.0,
        };
        let (width, length) = contact_patch_in(&tires, 12000.0).unwrap();
        assert_eq!(width, 8.0);
        assert!((length - 9.375).abs() < 1e-12);
    }

    #[test]
    fn test_contact_patch_manual_passthrough() {
        let tires = TireSpec::Manual {
            width: 10.0,
            length: 12.0,
        };
        assert_eq!(contact_patch_in(&tires, 20000.0).unwrap(), (10.0, 12.0));
    }

    #[test]
    fn test_track_load_conservation() {
        let vehicle = Vehicle::Track {
            total_weight: 80000.0,
            track_length: 10.0,
            track_width: 2.0,
            track_separation: 8.0,
        };
        let (loads, points) = generate_point_loads(&vehicle).unwrap();
        let sum: f64 = loads.iter().map(|p| p.load_lb).sum();
        assert!((sum - 80000.0).abs() < 1e-6);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].label, "Between tracks");
    }

    #[test]
    fn test_track_cell_spacing() {
        let vehicle = Vehicle::Track {
            total_weight: 80000.0,
            track_length: 10.0, // 120 in -> 20 cells laterally
            track_width: 2.0,   // 24 in -> 4 cells longitudinally
            track_separation: 8.0,
        };
        let (loads, _) = generate_point_loads(&vehicle).unwrap();
        assert_eq!(loads.len(), 2 * 20 * 4);
    }

    #[test]
    fn test_track_symmetry() {
        let vehicle = Vehicle::Track {
            total_weight: 60000.0,
            track_length: 8.0,
            track_width: 2.5,
            track_separation: 7.0,
        };
        let (loads, _) = generate_point_loads(&vehicle).unwrap();
        let centroid: f64 =
            loads.iter().map(|p| p.longitudinal_in * p.load_lb).sum::<f64>() / 60000.0;
        assert!(centroid.abs() < 1e-9);
    }

    #[test]
    fn test_axle_positions() {
        let vehicle = Vehicle::TwoAxle {
            axle_spacing: 14.0,
            front_axle_load: 12000.0,
            rear_axle_load: 34000.0,
            lane_offset: 2.0,
            tires: TireSpec::Manual {
                width: 8.0,
                length: 10.0,
            },
        };
        let (loads, points) = generate_point_loads(&vehicle).unwrap();
        let sum: f64 = loads.iter().map(|p| p.load_lb).sum();
        assert!((sum - 46000.0).abs() < 1e-6);
        // every cell sits at the 24 in lane offset
        assert!(loads.iter().all(|p| (p.lateral_in - 24.0).abs() < 20.0));
        // measurement points: two axles plus the load center
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].label, "Under axle 2");
        assert!((points[1].longitudinal_in - 168.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_axle_cumulative_spacing() {
        let vehicle = Vehicle::ThreeAxle {
            spacing_1_2: 12.0,
            spacing_2_3: 4.5,
            axle_loads: [12000.0, 17000.0, 17000.0],
            lane_offset: 0.0,
            tires: TireSpec::Manual {
                width: 8.0,
                length: 10.0,
            },
        };
        let (_, points) = generate_point_loads(&vehicle).unwrap();
        assert!((points[2].longitudinal_in - (12.0 + 4.5) * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_explicit_divisions() {
        let vehicle = Vehicle::Grid {
            length: 10.0,
            width: 6.0,
            longitudinal_offset: 0.0,
            lateral_offset: 0.0,
            divisions_longitudinal: 5,
            divisions_lateral: 3,
            load: GridLoad::TotalLoad(30000.0),
        };
        let (loads, _) = generate_point_loads(&vehicle).unwrap();
        assert_eq!(loads.len(), 15);
        assert!((loads[0].load_lb - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_pressure_to_total() {
        let vehicle = Vehicle::Grid {
            length: 10.0, // 120 in
            width: 6.0,   // 72 in
            longitudinal_offset: 0.0,
            lateral_offset: 0.0,
            divisions_longitudinal: 2,
            divisions_lateral: 2,
            load: GridLoad::UniformPressure(5.0),
        };
        let (loads, _) = generate_point_loads(&vehicle).unwrap();
        let sum: f64 = loads.iter().map(|p| p.load_lb).sum();
        // 5 psi * 120 * 72 in^2 = 43200 lb
        assert!((sum - 43200.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_nonpositive_load() {
        let vehicle = Vehicle::Track {
            total_weight: 0.0,
            track_length: 10.0,
            track_width: 2.0,
            track_separation: 8.0,
        };
        assert!(generate_point_loads(&vehicle).is_err());
    }
}
