pub mod parquet_writer;

pub use parquet_writer::{dataset_schema, ParquetFileInfo, ParquetWriter};
