use cirrusvol_core::cli::{Cli, OutputFormat};
use cirrusvol_core::{Converter, RunSummary, TextReport};
use clap::Parser;
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Converting {} -> {}",
        config.input_root.display(),
        config.output_root.display()
    );

    let converter = match Converter::new(config) {
        Ok(converter) => converter,
        Err(e) => {
            error!("Cannot start run: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let summary = converter.run();
    output_summary(&summary, cli.format);

    if summary.has_failures() {
        process::exit(2);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn output_summary(summary: &RunSummary, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(summary));
        }
        OutputFormat::Json => match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize to JSON: {}", e);
                eprintln!("Error: Failed to serialize to JSON: {}", e);
                process::exit(1);
            }
        },
    }
}
