use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use osa_calib::{load_config, run, CalibrationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "uo-building-to-osa",
    about = "Convert a URBANopt building workflow (OSW) into a calibration analysis (OSA)"
)]
struct Cli {
    /// Building identifier; selects the simulation directory.
    building_id: String,
    /// YAML configuration overriding the default directory layout.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log every applied transformation.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CalibrationConfig::default(),
    };

    let mut stdout = io::stdout();
    match run(&config, &cli.building_id, &mut stdout) {
        Ok(report) => {
            info!(
                measures = report.measures.len(),
                gas_data = report.gas_data,
                patched = report.patched_steps,
                "analysis written to {}",
                report.paths.sim_dir_save.display()
            );
            Ok(())
        }
        Err(err) if err.is_precondition() => {
            writeln!(stdout, "{err}")?;
            stdout.flush()?;
            process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

/// Log filter from the command line only; `RUST_LOG` is not consulted.
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_writer(io::stdout)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn filter_defaults_to_info_and_verbose_enables_debug() {
        assert_eq!(log_filter(false).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn cli_accepts_config_and_verbose() {
        let cli = Cli::try_parse_from(["uo-building-to-osa", "7", "--config", "calib.yaml", "-v"]).unwrap();
        assert_eq!(cli.building_id, "7");
        assert_eq!(cli.config, Some(PathBuf::from("calib.yaml")));
        assert!(cli.verbose);
    }
}
