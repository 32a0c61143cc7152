use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashboardError, Result};

/// Every measured field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Pm10,
    Pm25,
    So2,
    No2,
    Co,
    O3,
    Temperature,
    Pressure,
    DewPoint,
    Rainfall,
    WindDirection,
    WindSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Aggregated with arithmetic means.
    Numeric,
    /// Aggregated with frequency counts.
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub parameter: Parameter,
    pub label: &'static str,
    pub column: &'static str,
    pub kind: ParameterKind,
    pub units: &'static str,
}

impl ParameterSpec {
    pub fn is_numeric(&self) -> bool {
        self.kind == ParameterKind::Numeric
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == ParameterKind::Categorical
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

const fn numeric(
    parameter: Parameter,
    label: &'static str,
    column: &'static str,
    units: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        parameter,
        label,
        column,
        kind: ParameterKind::Numeric,
        units,
    }
}

/// Display label → column mapping, in dashboard selection order.
pub static CATALOG: [ParameterSpec; 12] = [
    numeric(Parameter::Pm10, "PM10 (Particulate Matter Diameter 10)", "PM10", "µg/m³"),
    numeric(Parameter::Pm25, "PM2.5 (Particulate Matter Diameter 2.5)", "PM2.5", "µg/m³"),
    numeric(Parameter::So2, "SO2 (Sulfur Dioxide)", "SO2", "µg/m³"),
    numeric(Parameter::No2, "NO2 (Nitrogen Dioxide)", "NO2", "µg/m³"),
    numeric(Parameter::Co, "CO (Carbon Monoxide)", "CO", "µg/m³"),
    numeric(Parameter::O3, "O3 (Ozone)", "O3", "µg/m³"),
    numeric(Parameter::Temperature, "Temperature", "TEMP", "°C"),
    numeric(Parameter::Pressure, "Pressure", "PRES", "hPa"),
    numeric(Parameter::DewPoint, "Dew Point", "DEWP", "°C"),
    numeric(Parameter::Rainfall, "Rainfall", "RAIN", "mm"),
    ParameterSpec {
        parameter: Parameter::WindDirection,
        label: "Wind Direction",
        column: "wd",
        kind: ParameterKind::Categorical,
        units: "",
    },
    numeric(Parameter::WindSpeed, "Wind Speed", "WSPM", "m/s"),
];

/// Pollutants offered by the ranking and weekday/weekend views.
pub const POLLUTANTS: [Parameter; 6] = [
    Parameter::Pm25,
    Parameter::Pm10,
    Parameter::So2,
    Parameter::No2,
    Parameter::Co,
    Parameter::O3,
];

/// Resolve a display label to its catalog entry.
pub fn resolve(label: &str) -> Result<&'static ParameterSpec> {
    CATALOG
        .iter()
        .find(|spec| spec.label == label)
        .ok_or_else(|| DashboardError::UnknownParameter {
            label: label.to_string(),
        })
}

/// Resolve an internal column identifier (e.g. `PM2.5`, `wd`).
pub fn resolve_column(column: &str) -> Result<&'static ParameterSpec> {
    CATALOG
        .iter()
        .find(|spec| spec.column == column)
        .ok_or_else(|| DashboardError::UnknownParameter {
            label: column.to_string(),
        })
}

/// Accepts either a display label or a column identifier.
pub fn lookup(text: &str) -> Result<&'static ParameterSpec> {
    let trimmed = text.trim();
    resolve(trimmed).or_else(|_| resolve_column(trimmed))
}

impl Parameter {
    pub fn spec(&self) -> &'static ParameterSpec {
        // CATALOG holds exactly one entry per variant
        CATALOG
            .iter()
            .find(|spec| spec.parameter == *self)
            .unwrap_or(&CATALOG[0])
    }

    pub fn kind(&self) -> ParameterKind {
        self.spec().kind
    }

    pub fn column(&self) -> &'static str {
        self.spec().column
    }

    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    pub fn units(&self) -> &'static str {
        self.spec().units
    }

    pub fn is_pollutant(&self) -> bool {
        POLLUTANTS.contains(self)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_label() {
        let spec = resolve("PM2.5 (Particulate Matter Diameter 2.5)").unwrap();
        assert_eq!(spec.column, "PM2.5");
        assert_eq!(spec.parameter, Parameter::Pm25);
        assert!(spec.is_numeric());

        let wd = resolve("Wind Direction").unwrap();
        assert_eq!(wd.column, "wd");
        assert!(wd.is_categorical());
    }

    #[test]
    fn test_resolve_unknown_label() {
        let err = resolve("Humidity").unwrap_err();
        assert!(matches!(err, DashboardError::UnknownParameter { label } if label == "Humidity"));

        // Column ids are not labels
        assert!(resolve("PM2.5").is_err());
    }

    #[test]
    fn test_lookup_accepts_label_or_column() {
        assert_eq!(lookup("TEMP").unwrap().parameter, Parameter::Temperature);
        assert_eq!(lookup("Temperature").unwrap().parameter, Parameter::Temperature);
        assert_eq!(lookup(" WSPM ").unwrap().parameter, Parameter::WindSpeed);
        assert!(lookup("XX").is_err());
    }

    #[test]
    fn test_catalog_is_complete() {
        assert_eq!(CATALOG.len(), 12);
        for spec in CATALOG.iter() {
            assert_eq!(spec.parameter.spec(), spec);
        }

        let categorical: Vec<_> = CATALOG.iter().filter(|s| s.is_categorical()).collect();
        assert_eq!(categorical.len(), 1);
        assert_eq!(categorical[0].parameter, Parameter::WindDirection);
    }

    #[test]
    fn test_pollutants() {
        assert!(Parameter::So2.is_pollutant());
        assert!(!Parameter::Rainfall.is_pollutant());
        assert_eq!(Parameter::Co.units(), "µg/m³");
        assert_eq!(Parameter::Pressure.units(), "hPa");
        assert_eq!(Parameter::Pm25.to_string(), "PM2.5");
    }
}
