use crate::error::{DashboardError, Result};
use crate::models::{AirQualityRecord, Parameter, ParameterKind, Station, WindDirection, CATALOG};
use crate::utils::constants::{
    COLUMN_DATETIME, COLUMN_DAY, COLUMN_HOUR, COLUMN_MONTH, COLUMN_STATION, COLUMN_YEAR,
    DATETIME_FORMATS, DATE_FORMAT, MISSING_TOKENS,
};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Reads the air quality table from CSV, either the combined layout with a
/// `Datetime` column or the raw per-station layout with `year, month, day, hour`.
pub struct CsvDatasetReader {
    use_mmap: bool,
    max_workers: usize,
}

impl CsvDatasetReader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Read every record of a CSV file, in file order
    pub fn read_path(&self, path: &Path) -> Result<Vec<AirQualityRecord>> {
        let file = File::open(path)?;
        let source = path.display().to_string();

        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from(&mmap[..], &source)
        } else {
            self.read_from(BufReader::new(file), &source)
        }
    }

    /// Read records from any CSV byte stream; `source` names it in errors
    pub fn read_from<R: Read>(&self, reader: R, source: &str) -> Result<Vec<AirQualityRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let layout = ColumnLayout::from_headers(&headers)?;

        let rows: Vec<StringRecord> = csv_reader
            .records()
            .collect::<std::result::Result<_, _>>()?;
        debug!("{}: {} rows, {:?}", source, rows.len(), layout.timestamp);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| DashboardError::Config(e.to_string()))?;

        // Header is line 1
        pool.install(|| {
            rows.par_iter()
                .enumerate()
                .map(|(index, row)| {
                    layout.parse_row(row).map_err(|e| {
                        DashboardError::InvalidFormat(format!(
                            "{} line {}: {}",
                            source,
                            index + 2,
                            e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
    }
}

impl Default for CsvDatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum TimestampColumns {
    Datetime(usize),
    Parts {
        year: usize,
        month: usize,
        day: usize,
        hour: usize,
    },
}

/// Positions of the required columns within a header row
#[derive(Debug)]
struct ColumnLayout {
    timestamp: TimestampColumns,
    station: usize,
    numeric: Vec<(Parameter, usize)>,
    wind_direction: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| DashboardError::MissingColumn {
                column: name.to_string(),
            })
        };

        let timestamp = match find(COLUMN_DATETIME) {
            Some(index) => TimestampColumns::Datetime(index),
            None => match (
                find(COLUMN_YEAR),
                find(COLUMN_MONTH),
                find(COLUMN_DAY),
                find(COLUMN_HOUR),
            ) {
                (Some(year), Some(month), Some(day), Some(hour)) => TimestampColumns::Parts {
                    year,
                    month,
                    day,
                    hour,
                },
                _ => {
                    return Err(DashboardError::MissingColumn {
                        column: COLUMN_DATETIME.to_string(),
                    })
                }
            },
        };

        let station = require(COLUMN_STATION)?;

        let mut numeric = Vec::new();
        let mut wind_direction = None;
        for spec in CATALOG.iter() {
            let index = require(spec.column)?;
            match spec.kind {
                ParameterKind::Numeric => numeric.push((spec.parameter, index)),
                ParameterKind::Categorical => wind_direction = Some(index),
            }
        }

        let wind_direction = wind_direction.ok_or_else(|| DashboardError::MissingColumn {
            column: Parameter::WindDirection.column().to_string(),
        })?;

        Ok(Self {
            timestamp,
            station,
            numeric,
            wind_direction,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<AirQualityRecord> {
        let field = |index: usize| row.get(index).unwrap_or("");

        let timestamp = match self.timestamp {
            TimestampColumns::Datetime(index) => parse_datetime(field(index))?,
            TimestampColumns::Parts {
                year,
                month,
                day,
                hour,
            } => timestamp_from_parts(field(year), field(month), field(day), field(hour))?,
        };

        let station = field(self.station).parse::<Station>().map_err(|_| {
            DashboardError::InvalidFormat(format!("Unknown station: '{}'", field(self.station)))
        })?;

        let mut record = AirQualityRecord::new(timestamp, station);
        for &(parameter, index) in &self.numeric {
            record.set_numeric_value(parameter, parse_measurement(field(index), parameter)?);
        }

        let wd = field(self.wind_direction);
        record.wind_direction = if is_missing(wd) {
            None
        } else {
            Some(wd.parse::<WindDirection>()?)
        };

        Ok(record)
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// Parse a `Datetime` cell; a bare date means midnight
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| DashboardError::InvalidFormat(format!("Invalid timestamp: '{}'", value)))
}

fn timestamp_from_parts(year: &str, month: &str, day: &str, hour: &str) -> Result<NaiveDateTime> {
    let invalid = || {
        DashboardError::InvalidFormat(format!(
            "Invalid timestamp parts: year={} month={} day={} hour={}",
            year, month, day, hour
        ))
    };

    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    let day = day.parse::<u32>().map_err(|_| invalid())?;
    let hour = hour.parse::<u32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .ok_or_else(invalid)
}

fn parse_measurement(value: &str, parameter: Parameter) -> Result<Option<f64>> {
    if is_missing(value) {
        return Ok(None);
    }

    let parsed = value.parse::<f64>().map_err(|_| {
        DashboardError::InvalidFormat(format!("Invalid {} value: '{}'", parameter, value))
    })?;

    if parsed.is_nan() {
        return Ok(None);
    }
    if parsed.is_infinite() {
        return Err(DashboardError::InvalidFormat(format!(
            "Non-finite {} value: '{}'",
            parameter, value
        )));
    }

    Ok(Some(parsed))
}
