//! shell-sweep entry point: CLI wiring, config loading, sweep, and output.

use std::process;

use clap::Parser;

use shell_sweep::cli::Args;
use shell_sweep::logging::init_logging;
use shell_sweep::reporting::print_sweep_summary;
use shell_sweep::runner::{run_config, write_outputs};

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, args.log_file.as_deref()) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    let config = match args.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let store = match run_config(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("sweep aborted: {e}");
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Err(e) = print_sweep_summary(store.records()) {
            eprintln!("error: failed to print summary: {e}");
        }
    }

    if let Err(e) = write_outputs(&store, &args.output, args.csv_out.as_deref()) {
        eprintln!("error: {e}");
        process::exit(1);
    }
    eprintln!("Results written to {}", args.output.display());
}
