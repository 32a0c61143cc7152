use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::DashboardError;
use crate::models::{Parameter, Station};

/// Compass sector of the prevailing wind, in clockwise order from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl WindDirection {
    pub const ALL: [WindDirection; 16] = [
        WindDirection::N,
        WindDirection::NNE,
        WindDirection::NE,
        WindDirection::ENE,
        WindDirection::E,
        WindDirection::ESE,
        WindDirection::SE,
        WindDirection::SSE,
        WindDirection::S,
        WindDirection::SSW,
        WindDirection::SW,
        WindDirection::WSW,
        WindDirection::W,
        WindDirection::WNW,
        WindDirection::NW,
        WindDirection::NNW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::NNE => "NNE",
            WindDirection::NE => "NE",
            WindDirection::ENE => "ENE",
            WindDirection::E => "E",
            WindDirection::ESE => "ESE",
            WindDirection::SE => "SE",
            WindDirection::SSE => "SSE",
            WindDirection::S => "S",
            WindDirection::SSW => "SSW",
            WindDirection::SW => "SW",
            WindDirection::WSW => "WSW",
            WindDirection::W => "W",
            WindDirection::WNW => "WNW",
            WindDirection::NW => "NW",
            WindDirection::NNW => "NNW",
        }
    }
}

impl FromStr for WindDirection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        WindDirection::ALL
            .iter()
            .copied()
            .find(|wd| wd.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                DashboardError::InvalidFormat(format!("Invalid wind direction: '{}'", trimmed))
            })
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One hourly observation. `None` marks a missing measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AirQualityRecord {
    pub timestamp: NaiveDateTime,
    pub station: Station,

    #[validate(range(min = 0.0))]
    pub pm25: Option<f64>,

    #[validate(range(min = 0.0))]
    pub pm10: Option<f64>,

    #[validate(range(min = 0.0))]
    pub so2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub no2: Option<f64>,

    #[validate(range(min = 0.0))]
    pub co: Option<f64>,

    #[validate(range(min = 0.0))]
    pub o3: Option<f64>,

    // °C
    #[validate(range(min = -60.0, max = 60.0))]
    pub temperature: Option<f64>,

    // hPa
    #[validate(range(min = 850.0, max = 1100.0))]
    pub pressure: Option<f64>,

    #[validate(range(min = -60.0, max = 60.0))]
    pub dew_point: Option<f64>,

    // mm
    #[validate(range(min = 0.0))]
    pub rainfall: Option<f64>,

    pub wind_direction: Option<WindDirection>,

    // m/s
    #[validate(range(min = 0.0, max = 60.0))]
    pub wind_speed: Option<f64>,
}

impl AirQualityRecord {
    /// A record with every measurement missing.
    pub fn new(timestamp: NaiveDateTime, station: Station) -> Self {
        Self {
            timestamp,
            station,
            pm25: None,
            pm10: None,
            so2: None,
            no2: None,
            co: None,
            o3: None,
            temperature: None,
            pressure: None,
            dew_point: None,
            rainfall: None,
            wind_direction: None,
            wind_speed: None,
        }
    }

    pub fn builder(timestamp: NaiveDateTime, station: Station) -> AirQualityRecordBuilder {
        AirQualityRecordBuilder {
            record: Self::new(timestamp, station),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Saturday or Sunday, with Monday as day zero.
    pub fn is_weekend(&self) -> bool {
        self.timestamp.weekday().num_days_from_monday() >= 5
    }

    /// Value of a numeric parameter; always `None` for wind direction.
    pub fn numeric_value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Pm10 => self.pm10,
            Parameter::Pm25 => self.pm25,
            Parameter::So2 => self.so2,
            Parameter::No2 => self.no2,
            Parameter::Co => self.co,
            Parameter::O3 => self.o3,
            Parameter::Temperature => self.temperature,
            Parameter::Pressure => self.pressure,
            Parameter::DewPoint => self.dew_point,
            Parameter::Rainfall => self.rainfall,
            Parameter::WindSpeed => self.wind_speed,
            Parameter::WindDirection => None,
        }
    }

    pub fn set_numeric_value(&mut self, parameter: Parameter, value: Option<f64>) {
        match parameter {
            Parameter::Pm10 => self.pm10 = value,
            Parameter::Pm25 => self.pm25 = value,
            Parameter::So2 => self.so2 = value,
            Parameter::No2 => self.no2 = value,
            Parameter::Co => self.co = value,
            Parameter::O3 => self.o3 = value,
            Parameter::Temperature => self.temperature = value,
            Parameter::Pressure => self.pressure = value,
            Parameter::DewPoint => self.dew_point = value,
            Parameter::Rainfall => self.rainfall = value,
            Parameter::WindSpeed => self.wind_speed = value,
            Parameter::WindDirection => {}
        }
    }

    pub fn is_missing(&self, parameter: Parameter) -> bool {
        match parameter {
            Parameter::WindDirection => self.wind_direction.is_none(),
            other => self.numeric_value(other).is_none(),
        }
    }
}

/// Fluent construction, mostly for fixtures and benchmarks.
pub struct AirQualityRecordBuilder {
    record: AirQualityRecord,
}

impl AirQualityRecordBuilder {
    pub fn value(mut self, parameter: Parameter, value: f64) -> Self {
        self.record.set_numeric_value(parameter, Some(value));
        self
    }

    pub fn wind_direction(mut self, direction: WindDirection) -> Self {
        self.record.wind_direction = Some(direction);
        self
    }

    pub fn build(self) -> AirQualityRecord {
        self.record
    }
}
