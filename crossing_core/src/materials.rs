//! Line Pipe Materials (API 5L)
//!
//! Steel grades and standard line-pipe outside diameters for building a
//! [`PipeSection`](crate::pipe::PipeSection) from catalog data instead of
//! raw numbers.
//!
//! ## Example
//!
//! ```rust
//! use crossing_core::materials::{grade_catalog, nps_outer_diameter};
//!
//! let catalog = grade_catalog();
//! let x52 = catalog.lookup("X52").unwrap();
//! assert_eq!(x52.smys_psi, 52000.0);
//!
//! // NPS 24 line pipe is exactly 24 in OD
//! assert_eq!(nps_outer_diameter(24).unwrap(), 24.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CalcError, CalcResult};
use crate::pipe::PipeSection;

/// One API 5L steel grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelGrade {
    /// Grade designation (e.g. "X52")
    pub name: String,
    /// Specified minimum yield strength (psi)
    pub smys_psi: f64,
    /// Specified minimum ultimate tensile strength (psi)
    pub smts_psi: f64,
}

/// Grade catalog indexed by uppercase designation.
#[derive(Debug, Clone, Default)]
pub struct GradeCatalog {
    grades: HashMap<String, SteelGrade>,
}

impl GradeCatalog {
    /// Look up a grade by designation, case-insensitive.
    pub fn lookup(&self, name: &str) -> CalcResult<&SteelGrade> {
        let key = name.to_uppercase();
        self.grades
            .get(&key)
            .ok_or_else(|| CalcError::preset_not_found(format!("Steel grade '{}'", name)))
    }

    /// All grade designations, sorted by yield strength.
    pub fn all_names(&self) -> Vec<&str> {
        let mut grades: Vec<&SteelGrade> = self.grades.values().collect();
        grades.sort_by(|a, b| a.smys_psi.total_cmp(&b.smys_psi));
        grades.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    fn insert(&mut self, name: &str, smys_psi: f64, smts_psi: f64) {
        self.grades.insert(
            name.to_uppercase(),
            SteelGrade {
                name: name.to_string(),
                smys_psi,
                smts_psi,
            },
        );
    }
}

/// Built-in API 5L PSL2 grade catalog.
pub fn grade_catalog() -> GradeCatalog {
    let mut catalog = GradeCatalog::default();
    catalog.insert("Gr B", 35500.0, 60200.0);
    catalog.insert("X42", 42100.0, 60200.0);
    catalog.insert("X46", 46400.0, 63100.0);
    catalog.insert("X52", 52000.0, 66700.0);
    catalog.insert("X56", 56600.0, 71100.0);
    catalog.insert("X60", 60200.0, 75400.0);
    catalog.insert("X65", 65300.0, 77600.0);
    catalog.insert("X70", 70300.0, 82700.0);
    catalog
}

/// Outside diameter (in) for a nominal pipe size.
///
/// Below NPS 14 the OD exceeds the nominal size; from NPS 14 up they are
/// equal.
pub fn nps_outer_diameter(nps: u32) -> CalcResult<f64> {
    let od = match nps {
        2 => 2.375,
        3 => 3.5,
        4 => 4.5,
        6 => 6.625,
        8 => 8.625,
        10 => 10.75,
        12 => 12.75,
        14..=80 => nps as f64,
        _ => {
            return Err(CalcError::preset_not_found(format!(
                "Nominal pipe size NPS {}",
                nps
            )))
        }
    };
    Ok(od)
}

/// Build a canonical-unit [`PipeSection`] from catalog data.
pub fn section_from_catalog(
    nps: u32,
    wall_thickness_in: f64,
    grade: &str,
    max_operating_pressure_psi: f64,
    temperature_differential_degf: f64,
) -> CalcResult<PipeSection> {
    let outer_diameter = nps_outer_diameter(nps)?;
    let smys = grade_catalog().lookup(grade)?.smys_psi;
    let section = PipeSection {
        outer_diameter,
        wall_thickness: wall_thickness_in,
        smys,
        max_operating_pressure: max_operating_pressure_psi,
        temperature_differential: temperature_differential_degf,
    };
    section.validate()?;
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_lookup_case_insensitive() {
        let catalog = grade_catalog();
        let upper = catalog.lookup("X52").unwrap();
        let lower = catalog.lookup("x52").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.smys_psi, 52000.0);
    }

    #[test]
    fn test_grades_sorted_by_yield() {
        let catalog = grade_catalog();
        let names = catalog.all_names();
        assert_eq!(names.first(), Some(&"Gr B"));
        assert_eq!(names.last(), Some(&"X70"));
        assert_eq!(catalog.len(), 8);
    }

    #[test]
    fn test_unknown_grade() {
        assert!(grade_catalog().lookup("X120").is_err());
    }

    #[test]
    fn test_nps_outer_diameters() {
        assert_eq!(nps_outer_diameter(8).unwrap(), 8.625);
        assert_eq!(nps_outer_diameter(12).unwrap(), 12.75);
        assert_eq!(nps_outer_diameter(36).unwrap(), 36.0);
        assert!(nps_outer_diameter(5).is_err());
    }

    #[test]
    fn test_section_from_catalog() {
        let section = section_from_catalog(24, 0.375, "X52", 1000.0, 40.0).unwrap();
        assert_eq!(section.outer_diameter, 24.0);
        assert_eq!(section.smys, 52000.0);
        assert!(section.validate().is_ok());
    }

    #[test]
    fn test_section_from_catalog_validates() {
        // Wall thicker than the radius is rejected by the section check
        assert!(section_from_catalog(2, 1.5, "X52", 1000.0, 0.0).is_err());
    }
}
