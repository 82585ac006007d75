//! Core sweep types: geometry, run settings, tally definitions, and run records.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::material::Material;

/// Geometry input that a sweep may vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellParameter {
    /// Radius of the inner shell surface (cm).
    InnerRadius,
    /// Radial thickness of the shell (cm).
    Thickness,
}

impl ShellParameter {
    /// Field name used for this parameter in result records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InnerRadius => "inner_radius",
            Self::Thickness => "thickness",
        }
    }
}

impl fmt::Display for ShellParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named geometry input with the ordered values to try.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParameter {
    pub name: ShellParameter,
    pub values: Vec<f64>,
}

impl SweepParameter {
    pub fn new(name: ShellParameter, values: Vec<f64>) -> Self {
        Self { name, values }
    }

    /// Builds `num` evenly spaced values from `start` to `stop` inclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// use shell_sweep::sim::types::{ShellParameter, SweepParameter};
    ///
    /// let p = SweepParameter::linspace(ShellParameter::Thickness, 1.0, 5.0, 5);
    /// assert_eq!(p.values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    /// ```
    pub fn linspace(name: ShellParameter, start: f64, stop: f64, num: usize) -> Self {
        let values = match num {
            0 => Vec::new(),
            1 => vec![start],
            n => {
                let step = (stop - start) / (n - 1) as f64;
                (0..n).map(|i| start + step * i as f64).collect()
            }
        };
        Self { name, values }
    }
}

/// Spherical first-wall shell: a vacuum sphere surrounded by a single-material shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShellGeometry {
    /// Inner surface radius (cm).
    pub inner_radius: f64,
    /// Shell thickness (cm).
    pub thickness: f64,
}

impl ShellGeometry {
    pub fn new(inner_radius: f64, thickness: f64) -> Self {
        Self {
            inner_radius,
            thickness,
        }
    }

    /// Outer (vacuum boundary) radius (cm).
    pub fn outer_radius(&self) -> f64 {
        self.inner_radius + self.thickness
    }

    pub fn get(&self, param: ShellParameter) -> f64 {
        match param {
            ShellParameter::InnerRadius => self.inner_radius,
            ShellParameter::Thickness => self.thickness,
        }
    }

    /// Returns a copy with `param` replaced by `value`.
    pub fn with(mut self, param: ShellParameter, value: f64) -> Self {
        match param {
            ShellParameter::InnerRadius => self.inner_radius = value,
            ShellParameter::Thickness => self.thickness = value,
        }
        self
    }
}

impl Default for ShellGeometry {
    fn default() -> Self {
        Self {
            inner_radius: 1.0,
            thickness: 1.0,
        }
    }
}

/// Fixed simulation settings shared by every run of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Number of batches.
    pub batches: u32,
    /// Particles per batch.
    pub particles: u64,
    /// Inactive batches (always 0 in fixed-source mode).
    pub inactive: u32,
    /// Random number seed handed to the engine.
    pub seed: u64,
    /// Monoenergetic point source energy (eV).
    pub source_energy_ev: f64,
    /// Shell material, passed through to the backend unchanged.
    pub material: Material,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            batches: 2,
            particles: 1000,
            inactive: 0,
            seed: 1,
            source_energy_ev: 14.08e6,
            material: Material::eurofer(),
        }
    }
}

/// How sub-bin means are reduced to a scalar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Sum over all bins.
    #[default]
    Sum,
    /// Arithmetic mean over all bins.
    Mean,
}

/// How per-bin standard deviations are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uncertainty {
    /// Plain sum of bin standard deviations (conservative upper bound).
    #[default]
    Linear,
    /// Root-sum-square of bin standard deviations (independent bins).
    Quadrature,
}

/// Score requested from the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    #[default]
    Current,
    Flux,
}

/// Shell surface a tally is filtered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Inner surface, facing the source.
    #[default]
    Inner,
    /// Outer vacuum boundary.
    Outer,
}

/// A named physical quantity to extract after each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TallySpec {
    pub name: String,
    pub aggregation: Aggregation,
    pub uncertainty: Uncertainty,
    pub score: Score,
    pub surface: Surface,
    /// Number of energy groups the tally is binned into, if any.
    pub energy_groups: Option<usize>,
}

impl TallySpec {
    /// A summed neutron current tally on the given surface.
    pub fn current(name: impl Into<String>, surface: Surface) -> Self {
        Self {
            name: name.into(),
            surface,
            ..Self::default()
        }
    }
}

impl Default for TallySpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            aggregation: Aggregation::Sum,
            uncertainty: Uncertainty::Linear,
            score: Score::Current,
            surface: Surface::Inner,
            energy_groups: None,
        }
    }
}

/// Per-bin tally output as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TallyBins {
    pub mean: Vec<f64>,
    pub std_dev: Vec<f64>,
}

impl TallyBins {
    /// A single-bin tally.
    pub fn scalar(mean: f64, std_dev: f64) -> Self {
        Self {
            mean: vec![mean],
            std_dev: vec![std_dev],
        }
    }
}

/// Aggregated scalar tally result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyEstimate {
    pub value: f64,
    pub std_dev: f64,
}

/// One record per simulation invocation.
///
/// Serializes as a single flat JSON object: parameter fields (numbers) first,
/// then one `{"value", "std_dev"}` object per tally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunResult {
    parameters: BTreeMap<String, f64>,
    tallies: BTreeMap<String, TallyEstimate>,
}

impl RunResult {
    pub fn new(
        parameters: BTreeMap<String, f64>,
        tallies: BTreeMap<String, TallyEstimate>,
    ) -> Self {
        Self {
            parameters,
            tallies,
        }
    }

    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }

    pub fn tallies(&self) -> &BTreeMap<String, TallyEstimate> {
        &self.tallies
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    pub fn tally(&self, name: &str) -> Option<&TallyEstimate> {
        self.tallies.get(name)
    }

    /// Top-level field names in serialization order.
    pub fn keys(&self) -> Vec<&str> {
        self.parameters
            .keys()
            .chain(self.tallies.keys())
            .map(String::as_str)
            .collect()
    }
}

impl Serialize for RunResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.parameters.len() + self.tallies.len()))?;
        for (name, value) in &self.parameters {
            map.serialize_entry(name, value)?;
        }
        for (name, estimate) in &self.tallies {
            map.serialize_entry(name, estimate)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RunResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RunResultVisitor)
    }
}

struct RunResultVisitor;

/// A record field is either a bare number (parameter) or a tally object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Field {
    Parameter(f64),
    Tally(TallyEstimate),
}

impl<'de> Visitor<'de> for RunResultVisitor {
    type Value = RunResult;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of numeric parameters and {value, std_dev} tallies")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RunResult, A::Error> {
        let mut result = RunResult::default();
        while let Some((key, field)) = access.next_entry::<String, Field>()? {
            let duplicate = result.parameters.contains_key(&key) || result.tallies.contains_key(&key);
            if duplicate {
                return Err(de::Error::custom(format!("duplicate field \"{key}\"")));
            }
            match field {
                Field::Parameter(v) => {
                    result.parameters.insert(key, v);
                }
                Field::Tally(t) => {
                    result.tallies.insert(key, t);
                }
            }
        }
        Ok(result)
    }
}

/// Ordered run records of one sweep, in execution order.
pub type SweepResult = Vec<RunResult>;
