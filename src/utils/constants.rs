use chrono::NaiveDate;

/// Column names of the dataset source
pub const COLUMN_DATETIME: &str = "Datetime";
pub const COLUMN_STATION: &str = "station";
pub const COLUMN_YEAR: &str = "year";
pub const COLUMN_MONTH: &str = "month";
pub const COLUMN_DAY: &str = "day";
pub const COLUMN_HOUR: &str = "hour";

/// Accepted `Datetime` layouts, tried in order
pub const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tokens treated as a missing measurement
pub const MISSING_TOKENS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// Dataset coverage and dashboard default selections
pub const DATASET_START: NaiveDate = match NaiveDate::from_ymd_opt(2013, 3, 1) {
    Some(date) => date,
    None => panic!("invalid dataset start"),
};
pub const DATASET_END: NaiveDate = match NaiveDate::from_ymd_opt(2017, 2, 28) {
    Some(date) => date,
    None => panic!("invalid dataset end"),
};

/// Default file locations
pub const DEFAULT_DATASET_PATH: &str = "data/all_df.csv";
pub const DEFAULT_CONFIG_FILE: &str = "aq-dashboard.toml";
pub const ENV_PREFIX: &str = "AQD";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 8192;
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Shown by presentation adapters for an empty result
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";
