use crate::error::{DashboardError, Result};
use crate::models::{AirQualityRecord, Parameter, ParameterKind, CATALOG};
use crate::utils::constants::{
    COLUMN_DATETIME, COLUMN_STATION, COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE,
    COMPRESSION_SNAPPY, COMPRESSION_ZSTD, DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Columnar layout of the normalized table: timestamp, station, then every
/// catalog column under its dataset name.
pub fn dataset_schema() -> Arc<Schema> {
    let mut fields = vec![
        Field::new(
            COLUMN_DATETIME,
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new(COLUMN_STATION, DataType::Utf8, false),
    ];

    for spec in CATALOG.iter() {
        let data_type = match spec.kind {
            ParameterKind::Numeric => DataType::Float64,
            ParameterKind::Categorical => DataType::Utf8,
        };
        fields.push(Field::new(spec.column, data_type, true));
    }

    Arc::new(Schema::new(fields))
}

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(DashboardError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write records to a Parquet file as a single batch
    pub fn write_records(&self, records: &[AirQualityRecord], path: &Path) -> Result<()> {
        self.write_records_batched(records, path, records.len().max(1))
    }

    /// Write records in batches for memory efficiency
    pub fn write_records_batched(
        &self,
        records: &[AirQualityRecord],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = dataset_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(batch_size.max(1)) {
            let batch = records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn records_to_batch(records: &[AirQualityRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
    let timestamps: Vec<i64> = records
        .iter()
        .map(|r| r.timestamp.and_utc().timestamp_millis())
        .collect();
    let stations: Vec<&str> = records.iter().map(|r| r.station.name()).collect();

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampMillisecondArray::from(timestamps)),
        Arc::new(StringArray::from(stations)),
    ];

    for spec in CATALOG.iter() {
        let column: ArrayRef = match spec.parameter {
            Parameter::WindDirection => Arc::new(StringArray::from(
                records
                    .iter()
                    .map(|r| r.wind_direction.map(|wd| wd.as_str()))
                    .collect::<Vec<_>>(),
            )),
            parameter => Arc::new(Float64Array::from(
                records
                    .iter()
                    .map(|r| r.numeric_value(parameter))
                    .collect::<Vec<_>>(),
            )),
        };
        columns.push(column);
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}
