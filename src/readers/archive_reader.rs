use crate::error::Result;
use crate::models::AirQualityRecord;
use crate::readers::CsvDatasetReader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Reads a zip of per-station CSV files (the PRSA distribution) as one table.
pub struct ArchiveDatasetReader {
    csv_reader: CsvDatasetReader,
}

impl ArchiveDatasetReader {
    pub fn new(csv_reader: CsvDatasetReader) -> Self {
        Self { csv_reader }
    }

    /// CSV entry names in the order they are concatenated
    pub fn csv_entries(path: &Path) -> Result<Vec<String>> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        Ok(Self::sorted_csv_entries(&archive))
    }

    pub fn read_path(&self, path: &Path) -> Result<Vec<AirQualityRecord>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;
        let entries = Self::sorted_csv_entries(&archive);

        let mut records = Vec::new();
        for name in entries {
            let mut entry = archive.by_name(&name)?;
            let mut buffer = Vec::new();
            entry.read_to_end(&mut buffer)?;

            let source = format!("{}:{}", path.display(), name);
            let mut parsed = self.csv_reader.read_from(buffer.as_slice(), &source)?;
            debug!("{}: {} records", source, parsed.len());
            records.append(&mut parsed);
        }

        Ok(records)
    }

    fn sorted_csv_entries(archive: &ZipArchive<File>) -> Vec<String> {
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| {
                !name.ends_with('/')
                    && !name.starts_with("__MACOSX")
                    && name.to_ascii_lowercase().ends_with(".csv")
            })
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }
}

impl Default for ArchiveDatasetReader {
    fn default() -> Self {
        Self::new(CsvDatasetReader::default())
    }
}
