use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::analyzers::{MissingValuePolicy, QueryOptions, RangePolicy};
use crate::error::Result;
use crate::utils::constants::{DEFAULT_CONFIG_FILE, DEFAULT_DATASET_PATH, ENV_PREFIX};

/// Runtime settings, layered: defaults, TOML file, `AQD_*` environment, CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub dataset_path: PathBuf,

    pub range_policy: RangePolicy,

    pub missing_values: MissingValuePolicy,

    #[validate(range(min = 1, max = 1024))]
    pub max_workers: usize,

    pub use_mmap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            range_policy: RangePolicy::default(),
            missing_values: MissingValuePolicy::default(),
            max_workers: num_cpus::get(),
            use_mmap: false,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `config_file` must exist; otherwise
    /// `aq-dashboard.toml` in the working directory is read when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let builder = Config::builder()
            .set_default("dataset_path", DEFAULT_DATASET_PATH)?
            .set_default("range_policy", "intersect")?
            .set_default("missing_values", "exclude")?
            .set_default("max_workers", defaults.max_workers as i64)?
            .set_default("use_mmap", defaults.use_mmap)?;

        let builder = match config_file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            range_policy: self.range_policy,
            missing_values: self.missing_values,
        }
    }
}
