//! Fixed-output backend for dry runs and tests.

use std::collections::BTreeMap;

use super::backend::{RunHandle, RunRequest, SimulationBackend};
use super::types::{TallyBins, TallySpec};

/// Backend that returns the same tally bins for every run, regardless of geometry.
#[derive(Debug, Clone, Default)]
pub struct StubBackend {
    tallies: BTreeMap<String, TallyBins>,
    fail_at: Option<usize>,
    calls: usize,
}

/// Output of one stub run.
#[derive(Debug, Clone)]
pub struct StubRun {
    tallies: BTreeMap<String, TallyBins>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `mean` / `std_dev` as a single bin for every tally in `specs`.
    pub fn constant(specs: &[TallySpec], mean: f64, std_dev: f64) -> Self {
        specs.iter().fold(Self::new(), |stub, spec| {
            stub.with_tally(spec.name.clone(), TallyBins::scalar(mean, std_dev))
        })
    }

    pub fn with_tally(mut self, name: impl Into<String>, bins: TallyBins) -> Self {
        self.tallies.insert(name.into(), bins);
        self
    }

    /// Makes the run with sweep index `index` fail.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Number of runs attempted so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SimulationBackend for StubBackend {
    type Handle = StubRun;

    fn run(&mut self, request: &RunRequest<'_>) -> Result<StubRun, String> {
        self.calls += 1;
        if self.fail_at == Some(request.index) {
            return Err(format!("stub failure injected at run {}", request.index));
        }
        Ok(StubRun {
            tallies: self.tallies.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

impl RunHandle for StubRun {
    fn get_tally(&self, name: &str) -> Option<TallyBins> {
        self.tallies.get(name).cloned()
    }
}
