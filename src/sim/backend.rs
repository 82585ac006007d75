//! Simulation collaborator contract.

use super::types::{RunSettings, ShellGeometry, TallyBins, TallySpec};

/// Everything a backend needs to perform one run.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    /// Zero-based position of this run in the sweep.
    pub index: usize,
    pub geometry: ShellGeometry,
    pub settings: &'a RunSettings,
    /// Tally definitions the engine should score.
    pub tallies: &'a [TallySpec],
}

/// Output store of a completed run (the engine's statepoint).
pub trait RunHandle {
    /// Returns per-bin mean and standard deviation, or `None` if the run did
    /// not produce a tally with this name.
    fn get_tally(&self, name: &str) -> Option<TallyBins>;
}

/// An engine that can execute one simulation synchronously.
///
/// Failures are reported as a message; the driver attaches run context.
pub trait SimulationBackend {
    type Handle: RunHandle;

    fn run(&mut self, request: &RunRequest<'_>) -> Result<Self::Handle, String>;

    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;
}

impl<B: SimulationBackend + ?Sized> SimulationBackend for &mut B {
    type Handle = B::Handle;

    fn run(&mut self, request: &RunRequest<'_>) -> Result<Self::Handle, String> {
        (**self).run(request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
