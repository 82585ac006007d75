//! TOML-based sweep configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, SweepError};
use crate::sim::driver::SweepPlan;
use crate::sim::material::Material;
use crate::sim::types::{
    RunSettings, Score, ShellGeometry, ShellParameter, Surface, SweepParameter, TallySpec,
};

/// Top-level sweep configuration parsed from TOML.
///
/// All fields have defaults matching the baseline sweep. Load from TOML with
/// [`SweepConfig::from_toml_file`] or use [`SweepConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Swept parameter and its values.
    #[serde(default)]
    pub sweep: SweepSection,
    /// Base shell geometry (the swept field is overridden per run).
    #[serde(default)]
    pub geometry: GeometryConfig,
    /// Fixed transport settings.
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Shell material.
    #[serde(default)]
    pub material: Material,
    /// Tallies scored and extracted on every run.
    #[serde(default = "default_tallies")]
    pub tallies: Vec<TallySpec>,
    /// Simulation backend selection.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Swept parameter and its values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSection {
    /// Geometry field to vary.
    pub parameter: ShellParameter,
    /// Explicit values, in run order.
    pub values: Vec<f64>,
    /// Evenly spaced values; replaces `values` when set.
    pub linspace: Option<LinspaceConfig>,
    /// Number of passes over the values (must be >= 1).
    pub repeats: usize,
    /// Fixed geometry fields recorded in every result alongside the swept one.
    pub record: Vec<ShellParameter>,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            parameter: ShellParameter::Thickness,
            values: SweepParameter::linspace(ShellParameter::Thickness, 1.0, 5.0, 6).values,
            linspace: None,
            repeats: 1,
            record: vec![ShellParameter::InnerRadius],
        }
    }
}

/// `num` evenly spaced values from `start` to `stop` inclusive.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinspaceConfig {
    pub start: f64,
    pub stop: f64,
    pub num: usize,
}

/// Base shell geometry (cm).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Inner surface radius (must be > 0).
    pub inner_radius: f64,
    /// Shell thickness (must be > 0).
    pub thickness: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            inner_radius: 1.0,
            thickness: 1.0,
        }
    }
}

/// Fixed transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    /// Number of batches (must be > 0).
    pub batches: u32,
    /// Particles per batch (must be > 0).
    pub particles: u64,
    /// Engine random seed.
    pub seed: u64,
    /// Point source energy in eV (must be > 0).
    pub source_energy_ev: f64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            batches: 2,
            particles: 1000,
            seed: 1,
            source_energy_ev: 14.08e6,
        }
    }
}

/// Which simulation backend executes the runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Constant tallies, no physics.
    Stub,
    /// Seeded attenuation model.
    #[default]
    Synthetic,
    /// External engine command.
    Process,
}

/// Backend selection and per-backend parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Engine executable for the `process` backend.
    pub command: Option<String>,
    /// Extra arguments passed to `command`.
    pub args: Vec<String>,
    /// Parent of the per-run working directories.
    pub work_dir: PathBuf,
    /// Removal cross-section for the `synthetic` backend (1/cm, >= 0).
    pub attenuation_per_cm: f64,
    /// Incident current for the `synthetic` backend.
    pub incident_current: f64,
    /// Tally mean reported by the `stub` backend.
    pub stub_mean: f64,
    /// Tally standard deviation reported by the `stub` backend.
    pub stub_std_dev: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Synthetic,
            command: None,
            args: Vec::new(),
            work_dir: PathBuf::from("runs"),
            attenuation_per_cm: 0.25,
            incident_current: 1.0,
            stub_mean: 10.0,
            stub_std_dev: 0.1,
        }
    }
}

fn default_tallies() -> Vec<TallySpec> {
    vec![
        TallySpec::current("incident_neutron_current", Surface::Inner),
        TallySpec::current("leakage_neutron_current", Surface::Outer),
    ]
}

/// VITAMIN-J group structure size used for the spectrum tallies.
const VITAMIN_J_GROUPS: usize = 175;

impl SweepConfig {
    /// Returns the baseline sweep: eurofer shell, thickness 1..5 cm in six steps.
    pub fn baseline() -> Self {
        Self {
            sweep: SweepSection::default(),
            geometry: GeometryConfig::default(),
            settings: SettingsConfig::default(),
            material: Material::eurofer(),
            tallies: default_tallies(),
            backend: BackendConfig::default(),
        }
    }

    /// Baseline repeated five times to expose run-to-run statistical scatter.
    pub fn repeated() -> Self {
        Self {
            sweep: SweepSection {
                repeats: 5,
                ..SweepSection::default()
            },
            ..Self::baseline()
        }
    }

    /// Baseline plus energy-binned spectrum tallies on both surfaces, summed to scalars.
    pub fn spectra() -> Self {
        let mut tallies = default_tallies();
        for (name, surface) in [
            ("incident_neutron_spectrum", Surface::Inner),
            ("leakage_neutron_spectrum", Surface::Outer),
        ] {
            tallies.push(TallySpec {
                name: name.to_string(),
                score: Score::Flux,
                surface,
                energy_groups: Some(VITAMIN_J_GROUPS),
                ..TallySpec::default()
            });
        }
        Self {
            tallies,
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "repeated", "spectra"];

    /// Loads a sweep from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "repeated" => Ok(Self::repeated()),
            "spectra" => Ok(Self::spectra()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a sweep from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a sweep from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Values of the swept parameter in run order.
    pub fn sweep_values(&self) -> Vec<f64> {
        match self.sweep.linspace {
            Some(l) => SweepParameter::linspace(self.sweep.parameter, l.start, l.stop, l.num).values,
            None => self.sweep.values.clone(),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let sw = &self.sweep;
        check(sw.repeats >= 1, "sweep.repeats", "must be >= 1");
        if let Some(l) = sw.linspace {
            check(
                l.start.is_finite() && l.stop.is_finite(),
                "sweep.linspace",
                "start and stop must be finite",
            );
        }
        check(
            self.sweep_values().iter().all(|v| v.is_finite() && *v > 0.0),
            "sweep.values",
            "every value must be finite and > 0",
        );

        let g = &self.geometry;
        check(
            g.inner_radius.is_finite() && g.inner_radius > 0.0,
            "geometry.inner_radius",
            "must be finite and > 0",
        );
        check(
            g.thickness.is_finite() && g.thickness > 0.0,
            "geometry.thickness",
            "must be finite and > 0",
        );

        let s = &self.settings;
        check(s.batches > 0, "settings.batches", "must be > 0");
        check(s.particles > 0, "settings.particles", "must be > 0");
        check(
            s.source_energy_ev.is_finite() && s.source_energy_ev > 0.0,
            "settings.source_energy_ev",
            "must be finite and > 0",
        );

        let m = &self.material;
        check(
            m.density_g_cm3.is_finite() && m.density_g_cm3 > 0.0,
            "material.density_g_cm3",
            "must be finite and > 0",
        );
        check(!m.elements.is_empty(), "material.elements", "must not be empty");

        check(!self.tallies.is_empty(), "tallies", "at least one tally is required");
        let mut seen = HashSet::new();
        for (i, t) in self.tallies.iter().enumerate() {
            check(!t.name.is_empty(), &format!("tallies[{i}].name"), "must not be empty");
            check(
                seen.insert(t.name.as_str()),
                &format!("tallies[{i}].name"),
                &format!("duplicate tally name \"{}\"", t.name),
            );
            check(
                t.energy_groups != Some(0),
                &format!("tallies[{i}].energy_groups"),
                "must be > 0 when set",
            );
            let parameter_clash = [ShellParameter::InnerRadius, ShellParameter::Thickness]
                .iter()
                .any(|p| p.as_str() == t.name);
            check(
                !parameter_clash,
                &format!("tallies[{i}].name"),
                "must not reuse a geometry parameter name",
            );
        }

        let b = &self.backend;
        if b.kind == BackendKind::Process {
            check(
                b.command.as_deref().is_some_and(|c| !c.trim().is_empty()),
                "backend.command",
                "required for the process backend",
            );
        }
        if b.kind == BackendKind::Synthetic {
            check(
                b.attenuation_per_cm.is_finite() && b.attenuation_per_cm >= 0.0,
                "backend.attenuation_per_cm",
                "must be finite and >= 0",
            );
            check(
                b.incident_current.is_finite() && b.incident_current >= 0.0,
                "backend.incident_current",
                "must be finite and >= 0",
            );
        }

        errors
    }

    /// Validates the configuration and builds the sweep plan.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Config` with every validation error found.
    pub fn to_plan(&self) -> Result<SweepPlan, SweepError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SweepError::Config(errors));
        }
        Ok(SweepPlan {
            parameter: SweepParameter::new(self.sweep.parameter, self.sweep_values()),
            base_geometry: ShellGeometry::new(self.geometry.inner_radius, self.geometry.thickness),
            repeats: self.sweep.repeats,
            record: self.sweep.record.clone(),
            settings: RunSettings {
                batches: self.settings.batches,
                particles: self.settings.particles,
                inactive: 0,
                seed: self.settings.seed,
                source_energy_ev: self.settings.source_energy_ev,
                material: self.material.clone(),
            },
            tallies: self.tallies.clone(),
        })
    }
}
