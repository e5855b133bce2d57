extern crate solar_roi;

use clap::Parser;
use solar_roi::output::FileOutput;
use solar_roi::run_calculation;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct SolarRoiArgs {
    /// JSON file containing the calculation input document.
    input_file: String,
    /// Directory the summary and series CSV files are written into.
    #[arg(long, short, default_value = ".")]
    output_directory: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = SolarRoiArgs::parse();

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let file_prefix = Path::new(input_file_stem)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("results");

    let output = FileOutput::new(args.output_directory.clone(), file_prefix.to_string());

    let result = run_calculation(
        BufReader::new(File::open(Path::new(input_file))?),
        output,
    )?;

    info!(
        "install cost {}, net of grant {}, first year savings {}",
        result.install_cost, result.net_install_cost, result.first_year_savings
    );
    match result.payback_period_years {
        Some(years) => info!("payback after {years:.1} years"),
        None => info!("system does not pay back over the horizon"),
    }
    info!(
        "results written to {}",
        args.output_directory.join(format!("{file_prefix}_*.csv")).display()
    );

    Ok(())
}
