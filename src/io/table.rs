//! Flat tabular view of sweep records for plotting tools.
//!
//! Columns follow the dotted naming plotting consumers get from normalizing
//! the JSON document: parameter names as-is, then `<tally>.value` and
//! `<tally>.std_dev` for each tally.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::SweepError;
use crate::sim::types::RunResult;

/// Flattened column names of a record, in output order.
pub fn columns(record: &RunResult) -> Vec<String> {
    let params = record.parameters().keys().cloned();
    let tallies = record
        .tallies()
        .keys()
        .flat_map(|name| [format!("{name}.value"), format!("{name}.std_dev")]);
    params.chain(tallies).collect()
}

/// Flattened numeric row of a record, aligned with [`columns`].
pub fn row(record: &RunResult) -> Vec<f64> {
    let params = record.parameters().values().copied();
    let tallies = record
        .tallies()
        .values()
        .flat_map(|t| [t.value, t.std_dev]);
    params.chain(tallies).collect()
}

/// Looks up a flattened column by name.
pub fn field(record: &RunResult, column: &str) -> Option<f64> {
    if let Some(v) = record.parameter(column) {
        return Some(v);
    }
    let (tally, part) = column.rsplit_once('.')?;
    let estimate = record.tally(tally)?;
    match part {
        "value" => Some(estimate.value),
        "std_dev" => Some(estimate.std_dev),
        _ => None,
    }
}

/// Writes records as CSV with a header row. Nothing is written for an empty slice.
///
/// # Errors
///
/// Returns `SweepError::Csv` if writing fails.
pub fn write_csv(records: &[RunResult], writer: impl Write) -> Result<(), SweepError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    if let Some(first) = records.first() {
        wtr.write_record(columns(first))?;
    }
    for r in records {
        wtr.write_record(row(r).iter().map(f64::to_string))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Exports records to a CSV file at the given path.
///
/// # Errors
///
/// Returns `SweepError::Io` if the file cannot be created, `SweepError::Csv`
/// if writing fails.
pub fn export_csv(records: &[RunResult], path: &Path) -> Result<(), SweepError> {
    let file = File::create(path).map_err(|e| SweepError::io(path, e))?;
    write_csv(records, io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = records.len(), "table written");
    Ok(())
}

/// Typed plotting columns pulled from records by name.
///
/// Every record must carry every requested field; a missing field is reported
/// when the series is built rather than when it is drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Option<Vec<f64>>,
    pub z: Vec<f64>,
    /// Standard deviation of `z` when `z` names a tally value.
    pub z_err: Option<Vec<f64>>,
}

impl Series {
    /// Extracts `x` (and optionally `y`) against the column `z`.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::MissingField` naming the first record and field
    /// that could not be resolved.
    pub fn from_records(
        records: &[RunResult],
        x: &str,
        y: Option<&str>,
        z: &str,
    ) -> Result<Self, SweepError> {
        let err_column = z.strip_suffix(".value").map(|t| format!("{t}.std_dev"));
        let mut series = Self {
            y: y.map(|_| Vec::with_capacity(records.len())),
            z_err: err_column.as_ref().map(|_| Vec::with_capacity(records.len())),
            ..Self::default()
        };

        for (index, r) in records.iter().enumerate() {
            let get = |column: &str| {
                field(r, column).ok_or_else(|| SweepError::MissingField {
                    index,
                    field: column.to_string(),
                })
            };
            series.x.push(get(x)?);
            if let (Some(col), Some(ys)) = (y, series.y.as_mut()) {
                ys.push(get(col)?);
            }
            series.z.push(get(z)?);
            if let (Some(col), Some(errs)) = (err_column.as_deref(), series.z_err.as_mut()) {
                errs.push(get(col)?);
            }
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::sim::types::TallyEstimate;

    fn make_record(fw: f64, armour: f64) -> RunResult {
        let mut params = BTreeMap::new();
        params.insert("fw_thickness".to_string(), fw);
        params.insert("armour_thickness".to_string(), armour);
        let mut tallies = BTreeMap::new();
        tallies.insert(
            "leakage_neutron_current".to_string(),
            TallyEstimate {
                value: 0.5 / (fw + armour),
                std_dev: 0.001,
            },
        );
        RunResult::new(params, tallies)
    }

    #[test]
    fn columns_follow_normalized_json_naming() {
        assert_eq!(
            columns(&make_record(1.0, 2.0)),
            vec![
                "armour_thickness",
                "fw_thickness",
                "leakage_neutron_current.value",
                "leakage_neutron_current.std_dev",
            ]
        );
    }

    #[test]
    fn row_aligns_with_columns() {
        let r = make_record(1.0, 4.0);
        let cols = columns(&r);
        let vals = row(&r);
        assert_eq!(cols.len(), vals.len());
        for (c, v) in cols.iter().zip(&vals) {
            assert_eq!(field(&r, c), Some(*v));
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let records: Vec<RunResult> = (1..=3).map(|i| make_record(i as f64, 1.0)).collect();
        let mut buf = Vec::new();
        write_csv(&records, &mut buf).expect("csv export");

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().expect("header row");
        assert_eq!(headers.len(), 4);
        assert_eq!(&headers[2], "leakage_neutron_current.value");
        let rows: Vec<csv::StringRecord> = rdr.records().filter_map(Result::ok).collect();
        assert_eq!(rows.len(), 3);
        let fw: Result<f64, _> = rows[2][1].parse();
        assert_eq!(fw.ok(), Some(3.0));
    }

    #[test]
    fn csv_for_no_records_is_empty() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).expect("csv export");
        assert!(buf.is_empty());
    }

    #[test]
    fn series_pulls_typed_columns_and_errors() {
        let records = vec![make_record(1.0, 0.5), make_record(2.0, 1.5)];
        let s = Series::from_records(
            &records,
            "fw_thickness",
            Some("armour_thickness"),
            "leakage_neutron_current.value",
        )
        .expect("series");
        assert_eq!(s.x, vec![1.0, 2.0]);
        assert_eq!(s.y, Some(vec![0.5, 1.5]));
        assert_eq!(s.z_err, Some(vec![0.001, 0.001]));
        assert!((s.z[0] - 0.5 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn series_reports_missing_field_at_construction() {
        let records = vec![make_record(1.0, 0.5)];
        let err = Series::from_records(&records, "thickness", None, "leakage_neutron_current.value");
        match err {
            Err(SweepError::MissingField { index, field }) => {
                assert_eq!(index, 0);
                assert_eq!(field, "thickness");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }
}
