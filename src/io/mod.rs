/// JSON result store.
pub mod export;
/// Flattened tables and plotting series.
pub mod table;
