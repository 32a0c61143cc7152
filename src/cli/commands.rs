use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::info;
use tracing_subscriber::EnvFilter;
use validator::Validate;

use crate::analyzers::{QueryEngine, QueryRequest, QueryResult};
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::cli::output::{render, render_catalog, Section};
use crate::config::Settings;
use crate::error::Result;
use crate::models::parameter::lookup;
use crate::models::{Dataset, ParameterSpec, POLLUTANTS};
use crate::processors::IntegrityChecker;
use crate::readers::DatasetLoader;
use crate::utils::constants::DEFAULT_BATCH_SIZE;
use crate::utils::{generate_default_parquet_filename, ProgressReporter};
use crate::writers::ParquetWriter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    if let Commands::Parameters = cli.command {
        println!("{}", render_catalog(cli.format)?);
        return Ok(());
    }

    let settings = resolve_settings(&cli)?;
    let dataset = Arc::new(load_dataset(&settings, cli.format)?);
    let engine = QueryEngine::new(Arc::clone(&dataset), settings.query_options());
    let format = cli.format;

    match cli.command {
        Commands::Daily {
            station,
            day,
            parameter,
        } => {
            let spec = lookup(&parameter)?;
            let result = engine.execute(&QueryRequest::Daily {
                station,
                day,
                parameter,
            })?;
            println!("{}", render(format, &[Section::new(spec, &result)])?);
        }

        Commands::Range {
            station,
            start,
            end,
            parameter,
        } => {
            let spec = lookup(&parameter)?;
            let result = engine.execute(&QueryRequest::Ranged {
                station,
                start,
                end,
                parameter,
            })?;
            println!("{}", render(format, &[Section::new(spec, &result)])?);
        }

        Commands::Ranking { pollutant } => {
            let specs = pollutant_specs(pollutant.as_deref())?;
            let results = specs
                .iter()
                .map(|spec| {
                    engine.execute(&QueryRequest::Ranking {
                        pollutant: spec.column.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            print_sections(format, &specs, &results)?;
        }

        Commands::WeekdayWeekend { pollutant } => {
            let specs = pollutant_specs(pollutant.as_deref())?;
            let results = specs
                .iter()
                .map(|spec| {
                    engine.execute(&QueryRequest::WeekdayWeekend {
                        pollutant: spec.column.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            print_sections(format, &specs, &results)?;
        }

        Commands::Info { sample } => {
            let checker = IntegrityChecker::new();
            let report = checker.check_integrity(&dataset)?;
            let preview = &dataset.records()[..sample.min(dataset.len())];

            match format {
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "report": report,
                        "sample": preview,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Text => {
                    println!("{}", checker.generate_summary(&report));
                    if !preview.is_empty() {
                        println!("Sample Records (showing {} records):", preview.len());
                        for (i, record) in preview.iter().enumerate() {
                            println!(
                                "{}. {} {}: PM2.5={} PM10={} TEMP={} wd={}",
                                i + 1,
                                record.station,
                                record.timestamp,
                                display_value(record.pm25),
                                display_value(record.pm10),
                                display_value(record.temperature),
                                record
                                    .wind_direction
                                    .map_or("-", |wd| wd.as_str())
                            );
                        }
                    }
                }
            }
        }

        Commands::Export {
            output,
            compression,
        } => {
            if dataset.is_empty() {
                println!("No records to write");
                return Ok(());
            }

            let output = output.unwrap_or_else(generate_default_parquet_filename);
            let writer = ParquetWriter::new().with_compression(&compression)?;

            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }

            println!(
                "Writing {} records to {}...",
                dataset.len(),
                output.display()
            );
            writer.write_records_batched(dataset.records(), &output, DEFAULT_BATCH_SIZE)?;

            let file_info = writer.get_file_info(&output)?;
            println!("\n{}", file_info.summary());
        }

        Commands::Parameters => {}
    }

    Ok(())
}

/// `--verbose` raises the default level to DEBUG; `RUST_LOG` overrides both.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }

    Ok(())
}

/// Settings file and environment first, then explicit flags on top.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;

    if let Some(path) = &cli.dataset {
        settings.dataset_path = path.clone();
    }
    if let Some(policy) = cli.range_policy {
        settings.range_policy = policy;
    }
    if let Some(policy) = cli.missing_values {
        settings.missing_values = policy;
    }
    if let Some(workers) = cli.max_workers {
        settings.max_workers = workers;
    }
    if cli.mmap {
        settings.use_mmap = true;
    }

    settings.validate()?;
    Ok(settings)
}

fn load_dataset(settings: &Settings, format: OutputFormat) -> Result<Dataset> {
    let progress = ProgressReporter::new_spinner(
        &format!("Loading {}...", settings.dataset_path.display()),
        format == OutputFormat::Json,
    );

    let dataset = DatasetLoader::from_settings(settings).load(&settings.dataset_path)?;

    progress.finish_and_clear();
    info!(
        "Dataset ready: {} records, coverage {:?}",
        dataset.len(),
        dataset.date_coverage()
    );
    Ok(dataset)
}

fn pollutant_specs(pollutant: Option<&str>) -> Result<Vec<&'static ParameterSpec>> {
    match pollutant {
        Some(label) => Ok(vec![lookup(label)?]),
        None => Ok(POLLUTANTS.iter().map(|p| p.spec()).collect()),
    }
}

fn print_sections(
    format: OutputFormat,
    specs: &[&'static ParameterSpec],
    results: &[QueryResult],
) -> Result<()> {
    let sections: Vec<Section<'_>> = specs
        .iter()
        .zip(results)
        .map(|(spec, result)| Section::new(spec, result))
        .collect();
    println!("{}", render(format, &sections)?);
    Ok(())
}

fn display_value(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{:.1}", v))
}
