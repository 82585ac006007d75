//! Parameter sweeps of a first-wall shell through a neutron-transport engine,
//! collected as schema-consistent JSON records.

pub mod cli;
pub mod config;
pub mod error;
/// JSON and tabular outputs.
pub mod io;
pub mod logging;
pub mod reporting;
pub mod runner;
/// Sweep driver, tally extraction, and simulation backends.
pub mod sim;

pub use error::{ConfigError, SweepError};
