pub mod dataset;
pub mod parameter;
pub mod record;
pub mod station;

pub use dataset::Dataset;
pub use parameter::{Parameter, ParameterKind, ParameterSpec, CATALOG, POLLUTANTS};
pub use record::{AirQualityRecord, AirQualityRecordBuilder, WindDirection};
pub use station::Station;
