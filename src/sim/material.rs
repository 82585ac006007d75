//! Shell material definition passed through to the simulation backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A homogeneous material given as element weight fractions.
///
/// The pipeline never interprets the composition; it is forwarded to the
/// backend unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Material {
    pub name: String,
    /// Density in g/cm3.
    pub density_g_cm3: f64,
    /// Element symbol to weight percent.
    pub elements: BTreeMap<String, f64>,
}

impl Material {
    /// EUROFER97 reduced-activation steel.
    pub fn eurofer() -> Self {
        let elements = [
            ("Fe", 89.067),
            ("C", 0.11),
            ("Mn", 0.4),
            ("Cr", 9.0),
            ("Ta", 0.12),
            ("W", 1.1),
            ("N", 0.003),
            ("V", 0.2),
        ]
        .into_iter()
        .map(|(el, wo)| (el.to_string(), wo))
        .collect();
        Self {
            name: "eurofer".to_string(),
            density_g_cm3: 7.75,
            elements,
        }
    }

    /// Sum of all weight percentages.
    pub fn total_weight_percent(&self) -> f64 {
        self.elements.values().sum()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::eurofer()
    }
}

#[cfg(test)]
mod tests {
    use super::Material;

    #[test]
    fn eurofer_weight_fractions_sum_to_one_hundred() {
        let m = Material::eurofer();
        assert!((m.total_weight_percent() - 100.0).abs() < 1e-9);
        assert_eq!(m.density_g_cm3, 7.75);
    }
}
