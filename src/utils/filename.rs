use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Default export path: output/air-quality-{YYMMDD}.parquet
pub fn generate_default_parquet_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100;

    let filename = format!(
        "air-quality-{:02}{:02}{:02}.parquet",
        year,
        now.month(),
        now.day()
    );
    PathBuf::from("output").join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_parquet_filename() {
        let filename = generate_default_parquet_filename();
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.ends_with(".parquet"));

        let file_part = filename.file_name().unwrap().to_string_lossy();
        assert!(file_part.starts_with("air-quality-"));
        // air-quality- + YYMMDD + .parquet
        assert_eq!(file_part.len(), "air-quality-".len() + 6 + ".parquet".len());
    }
}
