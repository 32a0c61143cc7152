use crate::error::{DashboardError, Result};
use crate::models::{AirQualityRecord, Parameter, ParameterKind, Station, WindDirection, CATALOG};
use crate::readers::csv_reader::parse_datetime;
use crate::utils::constants::{COLUMN_DATETIME, COLUMN_STATION, DEFAULT_BATCH_SIZE};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Reads the normalized table back from Parquet. Columns are located by name,
/// so files written by other tools load as long as the names match.
pub struct ParquetDatasetReader {
    batch_size: usize,
}

impl ParquetDatasetReader {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn read_path(&self, path: &Path) -> Result<Vec<AirQualityRecord>> {
        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.batch_size)
            .build()?;

        let mut records = Vec::new();
        for batch_result in parquet_reader {
            let batch = batch_result?;
            records.extend(batch_to_records(&batch)?);
        }

        Ok(records)
    }
}

impl Default for ParquetDatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DashboardError::MissingColumn {
            column: name.to_string(),
        })
}

fn as_strings(array: &ArrayRef, name: &str) -> Result<StringArray> {
    let array = cast(array, &DataType::Utf8)?;
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| DashboardError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn as_floats(array: &ArrayRef, name: &str) -> Result<Float64Array> {
    let array = cast(array, &DataType::Float64)?;
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| DashboardError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn timestamps(array: &ArrayRef) -> Result<Vec<Option<NaiveDateTime>>> {
    if matches!(array.data_type(), DataType::Utf8 | DataType::LargeUtf8) {
        let strings = as_strings(array, COLUMN_DATETIME)?;
        return strings
            .iter()
            .map(|value| value.map(parse_datetime).transpose())
            .collect();
    }

    let array = cast(array, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
    let millis = array
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .ok_or_else(|| {
            DashboardError::InvalidFormat(format!("Invalid {} column type", COLUMN_DATETIME))
        })?;

    millis
        .iter()
        .map(|value| {
            value
                .map(|ms| {
                    DateTime::from_timestamp_millis(ms)
                        .map(|dt| dt.naive_utc())
                        .ok_or_else(|| {
                            DashboardError::InvalidFormat(format!("Timestamp out of range: {}", ms))
                        })
                })
                .transpose()
        })
        .collect()
}

fn batch_to_records(batch: &RecordBatch) -> Result<Vec<AirQualityRecord>> {
    let times = timestamps(column(batch, COLUMN_DATETIME)?)?;
    let stations = as_strings(column(batch, COLUMN_STATION)?, COLUMN_STATION)?;

    let mut numeric: Vec<(Parameter, Float64Array)> = Vec::new();
    let mut wind_direction = None;
    for spec in CATALOG.iter() {
        let array = column(batch, spec.column)?;
        match spec.kind {
            ParameterKind::Numeric => numeric.push((spec.parameter, as_floats(array, spec.column)?)),
            ParameterKind::Categorical => wind_direction = Some(as_strings(array, spec.column)?),
        }
    }
    let wind_direction = wind_direction.ok_or_else(|| DashboardError::MissingColumn {
        column: Parameter::WindDirection.column().to_string(),
    })?;

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let timestamp = times[row].ok_or_else(|| {
            DashboardError::InvalidFormat(format!("Row {} has no timestamp", row))
        })?;
        if stations.is_null(row) {
            return Err(DashboardError::InvalidFormat(format!(
                "Row {} has no station",
                row
            )));
        }
        let station = stations.value(row).parse::<Station>().map_err(|_| {
            DashboardError::InvalidFormat(format!("Unknown station: '{}'", stations.value(row)))
        })?;

        let mut record = AirQualityRecord::new(timestamp, station);
        for (parameter, values) in &numeric {
            let value = if values.is_null(row) {
                None
            } else {
                Some(values.value(row)).filter(|v| !v.is_nan())
            };
            if value.is_some_and(f64::is_infinite) {
                return Err(DashboardError::InvalidFormat(format!(
                    "Row {} has a non-finite {} value",
                    row, parameter
                )));
            }
            record.set_numeric_value(*parameter, value);
        }

        if !wind_direction.is_null(row) && !wind_direction.value(row).is_empty() {
            record.wind_direction = Some(wind_direction.value(row).parse::<WindDirection>()?);
        }

        records.push(record);
    }

    Ok(records)
}
