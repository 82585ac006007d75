//! Backend that drives an external transport engine as a child process.
//!
//! Each run gets its own working directory `<work_dir>/run_<index>`. The
//! backend writes `run_input.json` there, runs the configured command with
//! that directory as cwd, and reads the tally summary `tallies.json` the
//! command must leave behind:
//!
//! ```text
//! { "leakage_current": { "mean": [0.41], "std_dev": [0.002] }, ... }
//! ```
//!
//! Working directories are not cleaned up, but a summary left over from an
//! earlier sweep is removed before the command runs. A program given as a
//! path (`./engine.sh`, `bin/run`) is resolved against the current directory
//! when the backend is built, not against the run directory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use super::backend::{RunHandle, RunRequest, SimulationBackend};
use super::types::{RunSettings, ShellGeometry, TallyBins, TallySpec};

/// File the backend writes into each run directory.
pub const RUN_INPUT_FILE: &str = "run_input.json";
/// File the engine command must write into each run directory.
pub const TALLY_SUMMARY_FILE: &str = "tallies.json";
/// Environment variable carrying the absolute path of the run input.
pub const RUN_INPUT_ENV: &str = "SHELL_SWEEP_RUN_INPUT";

/// External-command backend.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    program: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
}

/// Output of one external run.
#[derive(Debug, Clone)]
pub struct ProcessRun {
    dir: PathBuf,
    tallies: BTreeMap<String, TallyBins>,
}

#[derive(Serialize)]
struct RunInput<'a> {
    index: usize,
    geometry: GeometryInput,
    settings: &'a RunSettings,
    tallies: &'a [TallySpec],
}

#[derive(Serialize)]
struct GeometryInput {
    inner_radius: f64,
    thickness: f64,
    outer_radius: f64,
}

impl From<ShellGeometry> for GeometryInput {
    fn from(g: ShellGeometry) -> Self {
        Self {
            inner_radius: g.inner_radius,
            thickness: g.thickness,
            outer_radius: g.outer_radius(),
        }
    }
}

impl ProcessBackend {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: resolve_program(program.into()),
            args,
            work_dir: work_dir.into(),
        }
    }

    /// Program the backend launches for every run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Working directory used for the run with sweep index `index`.
    pub fn run_dir(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!("run_{index:04}"))
    }
}

impl SimulationBackend for ProcessBackend {
    type Handle = ProcessRun;

    fn run(&mut self, request: &RunRequest<'_>) -> Result<ProcessRun, String> {
        let dir = self.run_dir(request.index);
        fs::create_dir_all(&dir)
            .map_err(|e| format!("cannot create run directory \"{}\": {e}", dir.display()))?;

        let input = RunInput {
            index: request.index,
            geometry: request.geometry.into(),
            settings: request.settings,
            tallies: request.tallies,
        };
        let input_path = dir.join(RUN_INPUT_FILE);
        let body = serde_json::to_vec_pretty(&input)
            .map_err(|e| format!("cannot encode run input: {e}"))?;
        fs::write(&input_path, body)
            .map_err(|e| format!("cannot write \"{}\": {e}", input_path.display()))?;

        let summary_path = dir.join(TALLY_SUMMARY_FILE);
        match fs::remove_file(&summary_path) {
            Ok(()) => tracing::debug!(path = %summary_path.display(), "removed stale tally summary"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(format!(
                    "cannot remove stale \"{}\": {e}",
                    summary_path.display()
                ));
            }
        }

        tracing::debug!(
            program = %self.program.display(),
            dir = %dir.display(),
            "launching engine"
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&dir)
            .env(RUN_INPUT_ENV, absolute(&input_path))
            .output()
            .map_err(|e| format!("cannot launch \"{}\": {e}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "\"{}\" exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            ));
        }

        let raw = fs::read_to_string(&summary_path).map_err(|e| {
            format!("engine produced no readable \"{}\": {e}", summary_path.display())
        })?;
        let tallies = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid tally summary \"{}\": {e}", summary_path.display()))?;

        Ok(ProcessRun { dir, tallies })
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

impl ProcessRun {
    /// Directory holding this run's engine artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RunHandle for ProcessRun {
    fn get_tally(&self, name: &str) -> Option<TallyBins> {
        self.tallies.get(name).cloned()
    }
}

/// Anchors a program given as a multi-component path to the current
/// directory. Bare names are left for `PATH` lookup.
fn resolve_program(program: PathBuf) -> PathBuf {
    if program.components().count() > 1 {
        absolute(&program)
    } else {
        program
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_program_names_are_left_for_path_lookup() {
        let backend = ProcessBackend::new("openmc", Vec::new(), "runs");
        assert_eq!(backend.program(), Path::new("openmc"));
    }

    #[test]
    fn relative_program_paths_are_anchored_to_current_dir() {
        let backend = ProcessBackend::new("./engines/run.sh", Vec::new(), "runs");
        assert!(backend.program().is_absolute());
        assert!(backend.program().ends_with("engines/run.sh"));
    }

    #[test]
    fn run_dirs_are_numbered_under_work_dir() {
        let backend = ProcessBackend::new("sh", Vec::new(), "runs");
        assert_eq!(backend.run_dir(7), Path::new("runs/run_0007"));
    }
}
