use crate::config::Settings;
use crate::error::{DashboardError, Result};
use crate::models::Dataset;
use crate::readers::{ArchiveDatasetReader, CsvDatasetReader, ParquetDatasetReader};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Source formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Zip,
    Parquet,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("zip") => Ok(SourceFormat::Zip),
            Some("parquet") | Some("pq") => Ok(SourceFormat::Parquet),
            _ => Err(DashboardError::UnsupportedSource(path.display().to_string())),
        }
    }
}

/// Builds the in-memory Dataset from a CSV file, a zip of station CSVs, or
/// a Parquet export.
pub struct DatasetLoader {
    use_mmap: bool,
    max_workers: usize,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            max_workers: num_cpus::get(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_mmap(settings.use_mmap)
            .with_max_workers(settings.max_workers)
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn load(&self, path: &Path) -> Result<Dataset> {
        let format = SourceFormat::detect(path)?;
        let started = Instant::now();

        let csv_reader = CsvDatasetReader::new()
            .with_mmap(self.use_mmap)
            .with_max_workers(self.max_workers);

        let records = match format {
            SourceFormat::Csv => csv_reader.read_path(path)?,
            SourceFormat::Zip => ArchiveDatasetReader::new(csv_reader).read_path(path)?,
            SourceFormat::Parquet => ParquetDatasetReader::new().read_path(path)?,
        };

        let dataset = Dataset::new(records);
        info!(
            "Loaded {} records for {} stations from {} ({:?}) in {:.2?}",
            dataset.len(),
            dataset.stations().len(),
            path.display(),
            format,
            started.elapsed()
        );

        Ok(dataset)
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a dataset with default reader settings
pub fn load(path: &Path) -> Result<Dataset> {
    DatasetLoader::default().load(path)
}
