//! Impact factor model.
//!
//! Moving loads hit harder than their static weight; the amplification
//! depends on vehicle class and pavement quality and dies off with depth
//! of cover.

use crate::case::{PavementType, VehicleClass};
use crate::constants::{IMPACT_DECAY_PER_IN, IMPACT_DECAY_START_IN};

/// Base impact factor by vehicle class and pavement.
///
/// Tracked vehicles crawl; wheeled traffic on rough surfaces bounces.
/// `PavementType::None` is bare ground, the roughest ride of the three.
pub fn base_factor(class: VehicleClass, pavement: PavementType) -> f64 {
    match (class, pavement) {
        (VehicleClass::Tracked, PavementType::Paved) => 1.00,
        (VehicleClass::Tracked, PavementType::Unpaved) => 1.10,
        (VehicleClass::Tracked, PavementType::None) => 1.15,
        (VehicleClass::Wheeled, PavementType::Paved) => 1.30,
        (VehicleClass::Wheeled, PavementType::Unpaved) => 1.50,
        (VehicleClass::Wheeled, PavementType::None) => 1.75,
    }
}

/// Depth-adjusted impact factor.
///
/// Below 60 in of cover the base factor applies unchanged; beyond that it
/// decays linearly with excess depth and never drops below 1.0.
pub fn depth_adjusted_factor(class: VehicleClass, pavement: PavementType, cover_in: f64) -> f64 {
    let base = base_factor(class, pavement);
    if cover_in <= IMPACT_DECAY_START_IN {
        return base;
    }
    let reduced = base - IMPACT_DECAY_PER_IN * (cover_in - IMPACT_DECAY_START_IN);
    reduced.max(1.0)
}
