use std::io::{self, Write};

use crate::sim::types::RunResult;

/// Writes a human-readable line per run: parameters, then `value ± std_dev` per tally.
pub fn write_sweep_summary(mut out: impl Write, records: &[RunResult]) -> io::Result<()> {
    writeln!(out, "--- Sweep Summary ({} runs) ---", records.len())?;
    for (i, r) in records.iter().enumerate() {
        write!(out, "#{i:<3}")?;
        for (name, value) in r.parameters() {
            write!(out, " {name}={value:.3}")?;
        }
        for (name, t) in r.tallies() {
            write!(out, " | {name}={:.6e} ± {:.2e}", t.value, t.std_dev)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn print_sweep_summary(records: &[RunResult]) -> io::Result<()> {
    write_sweep_summary(io::stdout().lock(), records)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::write_sweep_summary;
    use crate::sim::types::{RunResult, TallyEstimate};

    #[test]
    fn one_line_per_run_after_header() {
        let mut params = BTreeMap::new();
        params.insert("thickness".to_string(), 2.0);
        let mut tallies = BTreeMap::new();
        tallies.insert(
            "leakage_current".to_string(),
            TallyEstimate {
                value: 0.5,
                std_dev: 0.01,
            },
        );
        let records = vec![RunResult::new(params, tallies); 3];

        let mut out = Vec::new();
        write_sweep_summary(&mut out, &records).expect("summary");
        let text = String::from_utf8(out).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("3 runs"));
        assert!(lines[1].contains("thickness=2.000"));
        assert!(lines[1].contains("leakage_current="));
    }
}
