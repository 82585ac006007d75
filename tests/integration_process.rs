//! Sweeps driven through an external engine command.

#![cfg(unix)]

mod common;

use std::path::{Path, PathBuf};

use shell_sweep::SweepError;
use shell_sweep::sim::driver::run_sweep;
use shell_sweep::sim::process::{ProcessBackend, RUN_INPUT_FILE, TALLY_SUMMARY_FILE};

const TWO_BIN_SUMMARY: &str = r#"printf '{"leakage_current":{"mean":[0.25,0.5],"std_dev":[0.01,0.02]}}' > tallies.json"#;

#[test]
fn engine_output_is_summed_into_one_record_per_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = common::write_engine_script(dir.path(), TWO_BIN_SUMMARY);
    let mut backend = common::sh_engine(&script, &dir.path().join("runs"));

    let store = run_sweep(&mut backend, &common::thickness_plan(&[1.0, 2.5])).expect("sweep");

    assert_eq!(store.len(), 2);
    for (record, thickness) in store.records().iter().zip([1.0, 2.5]) {
        assert_eq!(record.parameter("thickness"), Some(thickness));
        let t = record.tally("leakage_current").expect("tally");
        assert!((t.value - 0.75).abs() < 1e-12);
        assert!((t.std_dev - 0.03).abs() < 1e-12);
    }

    for index in 0..2 {
        let run_dir = backend.run_dir(index);
        assert!(run_dir.join(TALLY_SUMMARY_FILE).exists(), "run dirs are kept");
        let input = std::fs::read_to_string(run_dir.join(RUN_INPUT_FILE)).expect("run input");
        let input: serde_json::Value = serde_json::from_str(&input).expect("json");
        assert_eq!(input["index"], index);
        assert!(input["geometry"]["outer_radius"].is_number());
    }
}

#[test]
fn engine_sees_run_input_path_in_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = format!("test -f \"$SHELL_SWEEP_RUN_INPUT\" || exit 7\n{TWO_BIN_SUMMARY}");
    let script = common::write_engine_script(dir.path(), &body);
    let mut backend = common::sh_engine(&script, &dir.path().join("runs"));

    let store = run_sweep(&mut backend, &common::thickness_plan(&[1.0])).expect("sweep");
    assert_eq!(store.len(), 1);
}

#[test]
fn failing_engine_aborts_with_backend_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = common::write_engine_script(dir.path(), "echo 'lost particle' >&2\nexit 3");
    let mut backend = common::sh_engine(&script, &dir.path().join("runs"));

    let err = run_sweep(&mut backend, &common::thickness_plan(&[1.0, 2.0]))
        .expect_err("engine failure should abort the sweep");

    match err {
        SweepError::Backend { run, message } => {
            assert_eq!(run, 0);
            assert!(message.contains("lost particle"), "stderr carried: {message}");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
    assert!(!backend.run_dir(1).exists(), "no run after the failure");
}

#[test]
fn tally_absent_from_engine_output_is_reported_by_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = common::write_engine_script(
        dir.path(),
        r#"printf '{"heating":{"mean":[1.0],"std_dev":[0.1]}}' > tallies.json"#,
    );
    let mut backend = common::sh_engine(&script, &dir.path().join("runs"));

    let err = run_sweep(&mut backend, &common::thickness_plan(&[1.0]))
        .expect_err("missing tally should abort the sweep");

    assert!(
        matches!(err, SweepError::MissingTally { run: 0, ref name } if name == "leakage_current"),
        "got {err:?}"
    );
}

#[test]
fn engine_without_summary_file_is_a_backend_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = common::write_engine_script(dir.path(), "exit 0");
    let mut backend = common::sh_engine(&script, &dir.path().join("runs"));

    let err = run_sweep(&mut backend, &common::thickness_plan(&[1.0])).expect_err("no summary");
    assert!(matches!(err, SweepError::Backend { run: 0, .. }), "got {err:?}");
}

#[test]
fn summary_from_an_earlier_sweep_is_not_reused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let work = dir.path().join("runs");
    let plan = common::thickness_plan(&[1.0]);

    let first = common::write_engine_script(dir.path(), TWO_BIN_SUMMARY);
    run_sweep(&mut common::sh_engine(&first, &work), &plan).expect("first sweep");
    assert!(work.join("run_0000").join(TALLY_SUMMARY_FILE).exists());

    let silent = common::write_engine_script(dir.path(), "exit 0");
    let err = run_sweep(&mut common::sh_engine(&silent, &work), &plan)
        .expect_err("second sweep must not read the first sweep's summary");
    assert!(matches!(err, SweepError::Backend { run: 0, .. }), "got {err:?}");
}

#[test]
fn relative_program_path_resolves_from_the_caller_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = common::write_engine_script(dir.path(), TWO_BIN_SUMMARY);

    // `./../../bin/sh` style path: valid from the test's cwd, not from a run dir.
    let cwd = std::env::current_dir().expect("cwd");
    let up: PathBuf = cwd.components().skip(1).map(|_| "..").collect();
    let program = Path::new(".").join(up).join("bin/sh");
    assert!(program.is_relative());

    let mut backend = ProcessBackend::new(
        &program,
        vec![script.display().to_string()],
        dir.path().join("runs"),
    );
    assert!(backend.program().is_absolute());

    let store = run_sweep(&mut backend, &common::thickness_plan(&[1.0])).expect("sweep");
    assert_eq!(store.len(), 1);
}
