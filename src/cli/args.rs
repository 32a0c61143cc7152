use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analyzers::{MissingValuePolicy, RangePolicy};
use crate::models::Station;
use crate::utils::constants::{DATASET_END, DATASET_START, DEFAULT_SAMPLE_SIZE};

#[derive(Parser)]
#[command(name = "aq-dashboard")]
#[command(about = "Query hourly air quality measurements from Beijing monitoring stations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Dataset source (.csv, .zip or .parquet)")]
    pub dataset: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: aq-dashboard.toml]")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, global = true, value_enum)]
    pub range_policy: Option<RangePolicy>,

    #[arg(long, global = true, value_enum)]
    pub missing_values: Option<MissingValuePolicy>,

    #[arg(long, global = true)]
    pub max_workers: Option<usize>,

    #[arg(long, global = true, help = "Memory-map CSV sources")]
    pub mmap: bool,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hourly values of one parameter at one station on one day
    Daily {
        #[arg(short, long, value_parser = parse_station)]
        station: Station,

        #[arg(short, long, default_value_t = DATASET_END)]
        day: NaiveDate,

        #[arg(short, long, help = "Parameter label or column, e.g. \"PM2.5\" or \"TEMP\"")]
        parameter: String,
    },

    /// Daily means of one parameter at one station over a date range
    Range {
        #[arg(short, long, value_parser = parse_station)]
        station: Station,

        #[arg(long, default_value_t = DATASET_START)]
        start: NaiveDate,

        #[arg(long, default_value_t = DATASET_END)]
        end: NaiveDate,

        #[arg(short, long)]
        parameter: String,
    },

    /// Stations ordered by their mean pollutant level
    Ranking {
        #[arg(short, long, help = "Pollutant label [default: all six pollutants]")]
        pollutant: Option<String>,
    },

    /// Weekday and weekend means per station
    WeekdayWeekend {
        #[arg(short, long, help = "Pollutant label [default: all six pollutants]")]
        pollutant: Option<String>,
    },

    /// List the selectable parameters
    Parameters,

    /// Integrity report and a preview of the loaded dataset
    Info {
        #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        sample: usize,
    },

    /// Write the normalized dataset to Parquet
    Export {
        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/air-quality-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,
    },
}

fn parse_station(value: &str) -> Result<Station, String> {
    value.parse::<Station>().map_err(|e| e.to_string())
}
