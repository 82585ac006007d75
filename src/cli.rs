use std::path::PathBuf;

use clap::Parser;

use crate::config::{BackendKind, SweepConfig};
use crate::error::ConfigError;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "shell-sweep")]
#[command(about = "Sweep a first-wall shell geometry and collect tally results as JSON")]
pub struct Args {
    /// Load the sweep from a TOML config file
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, repeated, spectra)
    #[arg(long)]
    pub preset: Option<String>,

    /// Override the configured simulation backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Results JSON path
    #[arg(short, long, default_value = "simulation_results.json")]
    pub output: PathBuf,

    /// Also export a flattened CSV table
    #[arg(long)]
    pub csv_out: Option<PathBuf>,

    /// Override the engine random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Do not print the per-run summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Resolves the sweep config: `--scenario`, then `--preset`, then baseline,
    /// with command-line overrides applied.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the scenario cannot be loaded or the preset is unknown.
    pub fn load_config(&self) -> Result<SweepConfig, ConfigError> {
        let mut config = match (&self.scenario, &self.preset) {
            (Some(path), _) => SweepConfig::from_toml_file(path)?,
            (None, Some(name)) => SweepConfig::from_preset(name)?,
            (None, None) => SweepConfig::baseline(),
        };
        if let Some(kind) = self.backend {
            config.backend.kind = kind;
        }
        if let Some(seed) = self.seed {
            config.settings.seed = seed;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("shell-sweep").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_baseline_and_standard_output_name() {
        let args = parse(&[]).expect("parse should succeed");
        assert!(args.scenario.is_none());
        assert!(args.preset.is_none());
        assert_eq!(args.output, PathBuf::from("simulation_results.json"));
        let cfg = args.load_config().expect("baseline");
        assert_eq!(cfg.sweep_values().len(), 6);
    }

    #[test]
    fn supports_preset_with_overrides() {
        let args = parse(&["--preset", "repeated", "--backend", "stub", "--seed", "9"])
            .expect("parse should succeed");
        let cfg = args.load_config().expect("preset");
        assert_eq!(cfg.sweep.repeats, 5);
        assert_eq!(cfg.backend.kind, BackendKind::Stub);
        assert_eq!(cfg.settings.seed, 9);
    }

    #[test]
    fn scenario_and_preset_are_mutually_exclusive() {
        assert!(parse(&["--scenario", "a.toml", "--preset", "baseline"]).is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(parse(&["--backend", "mcnp"]).is_err());
    }
}
