//! Reduces per-bin tally output to scalar estimates.

use std::collections::BTreeMap;

use super::backend::RunHandle;
use super::types::{Aggregation, TallyBins, TallyEstimate, TallySpec, Uncertainty};
use crate::error::SweepError;

/// Retrieves every tally in `specs` from a completed run and aggregates it.
///
/// # Arguments
///
/// * `run` - Sweep index of the run, used in error reports
/// * `handle` - Output store of the completed run
/// * `specs` - Tallies to retrieve
///
/// # Errors
///
/// Returns `SweepError::MissingTally` if the run did not produce a requested
/// tally, or `SweepError::MalformedTally` if its bins cannot be aggregated.
pub fn extract_tallies<H: RunHandle + ?Sized>(
    run: usize,
    handle: &H,
    specs: &[TallySpec],
) -> Result<BTreeMap<String, TallyEstimate>, SweepError> {
    let mut out = BTreeMap::new();
    for spec in specs {
        let bins = handle
            .get_tally(&spec.name)
            .ok_or_else(|| SweepError::MissingTally {
                run,
                name: spec.name.clone(),
            })?;
        let estimate = aggregate(&spec.name, &bins, spec.aggregation, spec.uncertainty)?;
        tracing::debug!(
            run,
            tally = %spec.name,
            bins = bins.mean.len(),
            value = estimate.value,
            std_dev = estimate.std_dev,
            "extracted tally"
        );
        out.insert(spec.name.clone(), estimate);
    }
    Ok(out)
}

/// Aggregates one tally's bins into a single estimate.
///
/// # Errors
///
/// Returns `SweepError::MalformedTally` if mean and std-dev bin counts differ,
/// if any bin is non-finite, or if a mean is requested over zero bins.
pub fn aggregate(
    name: &str,
    bins: &TallyBins,
    aggregation: Aggregation,
    uncertainty: Uncertainty,
) -> Result<TallyEstimate, SweepError> {
    let malformed = |reason: String| SweepError::MalformedTally {
        name: name.to_string(),
        reason,
    };

    if bins.mean.len() != bins.std_dev.len() {
        return Err(malformed(format!(
            "{} mean bins but {} std-dev bins",
            bins.mean.len(),
            bins.std_dev.len()
        )));
    }
    if let Some(i) = bins
        .mean
        .iter()
        .chain(&bins.std_dev)
        .position(|v| !v.is_finite())
    {
        return Err(malformed(format!("non-finite value at bin {}", i % bins.mean.len().max(1))));
    }

    let sum: f64 = bins.mean.iter().sum();
    let spread = match uncertainty {
        Uncertainty::Linear => bins.std_dev.iter().sum::<f64>(),
        Uncertainty::Quadrature => bins.std_dev.iter().map(|s| s * s).sum::<f64>().sqrt(),
    };

    match aggregation {
        Aggregation::Sum => Ok(TallyEstimate {
            value: sum,
            std_dev: spread,
        }),
        Aggregation::Mean => {
            if bins.mean.is_empty() {
                return Err(malformed("cannot average zero bins".to_string()));
            }
            let n = bins.mean.len() as f64;
            Ok(TallyEstimate {
                value: sum / n,
                std_dev: spread / n,
            })
        }
    }
}
