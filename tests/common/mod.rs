//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use shell_sweep::sim::driver::SweepPlan;
use shell_sweep::sim::process::ProcessBackend;
use shell_sweep::sim::stub::StubBackend;
use shell_sweep::sim::types::{ShellParameter, Surface, SweepParameter, TallyBins, TallySpec};

/// Thickness sweep over `values` scoring a single `leakage_current` tally.
pub fn thickness_plan(values: &[f64]) -> SweepPlan {
    SweepPlan::new(
        SweepParameter::new(ShellParameter::Thickness, values.to_vec()),
        vec![TallySpec::current("leakage_current", Surface::Outer)],
    )
}

/// Stub backend reporting `leakage_current` mean 10.0, std dev 0.1 for every run.
pub fn leakage_stub() -> StubBackend {
    StubBackend::new().with_tally("leakage_current", TallyBins::scalar(10.0, 0.1))
}

/// Writes a shell script acting as the transport engine.
pub fn write_engine_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("engine.sh");
    fs::write(&path, format!("{body}\n")).expect("script should be written");
    path
}

/// Process backend running `script` through `sh`, so the script needs no exec bit.
pub fn sh_engine(script: &Path, work_dir: &Path) -> ProcessBackend {
    ProcessBackend::new("sh", vec![script.display().to_string()], work_dir)
}

/// Writes a TOML scenario file and returns its path.
pub fn write_scenario(dir: &Path, toml: &str) -> PathBuf {
    let path = dir.join("scenario.toml");
    fs::write(&path, toml).expect("scenario should be written");
    path
}
