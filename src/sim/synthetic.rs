//! Seeded analytic stand-in for the transport engine.
//!
//! Models the shell as a pure attenuator: every source neutron crosses the
//! inner surface and a fraction `exp(-mu * thickness)` leaks through the outer
//! surface. Statistical noise scales as `1 / sqrt(particles * batches)` so
//! results look like Monte Carlo output while staying reproducible for a seed.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::backend::{RunHandle, RunRequest, SimulationBackend};
use super::types::{Score, Surface, TallyBins};

/// Seed offset between consecutive runs to avoid correlated noise.
const RUN_SEED_STRIDE: u64 = 7919;

/// Attenuation-model backend.
#[derive(Debug, Clone)]
pub struct SyntheticBackend {
    /// Macroscopic removal cross-section of the shell material (1/cm).
    pub attenuation_per_cm: f64,
    /// Current crossing the inner surface per source particle.
    pub incident_current: f64,
}

/// Output of one synthetic run.
#[derive(Debug, Clone)]
pub struct SyntheticRun {
    tallies: BTreeMap<String, TallyBins>,
}

impl SyntheticBackend {
    pub fn new(attenuation_per_cm: f64, incident_current: f64) -> Self {
        Self {
            attenuation_per_cm,
            incident_current,
        }
    }

    /// Noise-free current through `surface` for a shell of `thickness` cm.
    pub fn expected_current(&self, surface: Surface, thickness: f64) -> f64 {
        match surface {
            Surface::Inner => self.incident_current,
            Surface::Outer => self.incident_current * (-self.attenuation_per_cm * thickness).exp(),
        }
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new(0.25, 1.0)
    }
}

impl SimulationBackend for SyntheticBackend {
    type Handle = SyntheticRun;

    fn run(&mut self, request: &RunRequest<'_>) -> Result<SyntheticRun, String> {
        let g = request.geometry;
        if !(g.inner_radius > 0.0 && g.thickness > 0.0) {
            return Err(format!(
                "degenerate shell (inner_radius={}, thickness={})",
                g.inner_radius, g.thickness
            ));
        }

        let s = request.settings;
        let histories = (s.particles as f64) * f64::from(s.batches);
        let rel_err = 1.0 / histories.max(1.0).sqrt();
        let seed = s
            .seed
            .wrapping_add((request.index as u64).wrapping_mul(RUN_SEED_STRIDE));
        let mut rng = StdRng::seed_from_u64(seed);

        let mut tallies = BTreeMap::new();
        for spec in request.tallies {
            let current = self.expected_current(spec.surface, g.thickness);
            let total = match spec.score {
                Score::Current => current,
                Score::Flux => {
                    let r = match spec.surface {
                        Surface::Inner => g.inner_radius,
                        Surface::Outer => g.outer_radius(),
                    };
                    current / (4.0 * PI * r * r)
                }
            };
            let groups = spec.energy_groups.unwrap_or(1).max(1);
            let per_bin = total / groups as f64;
            let mut bins = TallyBins::default();
            for _ in 0..groups {
                let sigma = per_bin * rel_err;
                bins.mean.push(per_bin + gaussian_noise(&mut rng, sigma));
                bins.std_dev.push(sigma);
            }
            tallies.insert(spec.name.clone(), bins);
        }

        Ok(SyntheticRun { tallies })
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

impl RunHandle for SyntheticRun {
    fn get_tally(&self, name: &str) -> Option<TallyBins> {
        self.tallies.get(name).cloned()
    }
}

/// Gaussian noise with mean 0 via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * std_dev
}
