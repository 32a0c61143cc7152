pub mod archive_reader;
pub mod csv_reader;
pub mod loader;
pub mod parquet_reader;

pub use archive_reader::ArchiveDatasetReader;
pub use csv_reader::{parse_datetime, CsvDatasetReader};
pub use loader::{load, DatasetLoader, SourceFormat};
pub use parquet_reader::ParquetDatasetReader;
