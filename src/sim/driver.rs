//! Sweep driver: one synchronous simulation per parameter value, in order.

use std::collections::{BTreeMap, BTreeSet};

use super::backend::{RunRequest, SimulationBackend};
use super::extract::extract_tallies;
use super::types::{
    RunResult, RunSettings, ShellGeometry, ShellParameter, SweepParameter, TallySpec,
};
use crate::error::SweepError;
use crate::io::export::ResultStore;

/// Everything needed to execute a sweep.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// The geometry input being varied and its values.
    pub parameter: SweepParameter,
    /// Geometry used for every field that is not swept.
    pub base_geometry: ShellGeometry,
    /// Number of passes over `parameter.values`.
    pub repeats: usize,
    /// Fixed geometry fields recorded alongside the swept one.
    pub record: Vec<ShellParameter>,
    pub settings: RunSettings,
    pub tallies: Vec<TallySpec>,
}

impl SweepPlan {
    /// A single-pass plan that records only the swept parameter.
    pub fn new(parameter: SweepParameter, tallies: Vec<TallySpec>) -> Self {
        Self {
            parameter,
            base_geometry: ShellGeometry::default(),
            repeats: 1,
            record: Vec::new(),
            settings: RunSettings::default(),
            tallies,
        }
    }

    /// Total number of runs the plan will execute.
    pub fn total_runs(&self) -> usize {
        self.parameter.values.len() * self.repeats
    }

    /// Geometry for each run, in execution order.
    pub fn geometries(&self) -> impl Iterator<Item = ShellGeometry> + '_ {
        (0..self.repeats).flat_map(move |_| {
            self.parameter
                .values
                .iter()
                .map(move |&v| self.base_geometry.with(self.parameter.name, v))
        })
    }

    /// Checks that every record will carry each field name exactly once.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::DuplicateField` if a tally reuses a recorded
    /// parameter name or two tallies share a name.
    pub fn check_fields(&self) -> Result<(), SweepError> {
        let mut seen: BTreeSet<&str> = std::iter::once(self.parameter.name)
            .chain(self.record.iter().copied())
            .map(ShellParameter::as_str)
            .collect();
        for spec in &self.tallies {
            if !seen.insert(spec.name.as_str()) {
                return Err(SweepError::DuplicateField {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn recorded_parameters(&self, geometry: &ShellGeometry) -> BTreeMap<String, f64> {
        std::iter::once(self.parameter.name)
            .chain(self.record.iter().copied())
            .map(|p| (p.as_str().to_string(), geometry.get(p)))
            .collect()
    }
}

/// Executes every run of `plan` against `backend` and collects the records.
///
/// Runs are strictly sequential. The first backend or extraction failure
/// aborts the sweep; no partial result is returned. Files the backend writes
/// are left in place.
///
/// # Errors
///
/// Returns `SweepError::DuplicateField` before any run if the plan's field
/// names collide, `SweepError::Backend` if a run fails, `SweepError::MissingTally` or
/// `SweepError::MalformedTally` if extraction fails, and
/// `SweepError::SchemaMismatch` if a record's fields differ from the first.
pub fn run_sweep<B: SimulationBackend>(
    backend: &mut B,
    plan: &SweepPlan,
) -> Result<ResultStore, SweepError> {
    plan.check_fields()?;
    let total = plan.total_runs();
    let mut store = ResultStore::with_capacity(total);
    tracing::info!(
        backend = backend.name(),
        parameter = %plan.parameter.name,
        runs = total,
        "starting sweep"
    );

    for (index, geometry) in plan.geometries().enumerate() {
        let value = geometry.get(plan.parameter.name);
        tracing::info!(
            run = index + 1,
            of = total,
            parameter = %plan.parameter.name,
            value,
            "running simulation"
        );

        let request = RunRequest {
            index,
            geometry,
            settings: &plan.settings,
            tallies: &plan.tallies,
        };
        let handle = backend.run(&request).map_err(|message| {
            tracing::error!(run = index, value, %message, "simulation failed, aborting sweep");
            SweepError::Backend { run: index, message }
        })?;

        let tallies = extract_tallies(index, &handle, &plan.tallies).inspect_err(|err| {
            tracing::error!(run = index, value, %err, "tally extraction failed, aborting sweep");
        })?;

        store.push(RunResult::new(plan.recorded_parameters(&geometry), tallies))?;
    }

    tracing::info!(records = store.len(), "sweep complete");
    Ok(store)
}
