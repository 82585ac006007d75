/// Simulation collaborator traits.
pub mod backend;
pub mod driver;
/// Tally aggregation.
pub mod extract;
pub mod material;
/// External engine driven as a child process.
pub mod process;
pub mod stub;
pub mod synthetic;
pub mod types;
