use crate::error::Result;
use crate::models::{AirQualityRecord, Dataset, Parameter, Station, CATALOG};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_records: usize,
    /// Records with every catalog parameter present.
    pub complete_records: usize,
    pub coverage: Option<(NaiveDateTime, NaiveDateTime)>,
    pub missing_values: BTreeMap<Parameter, usize>,
    pub station_statistics: BTreeMap<Station, StationStatistics>,
    pub violations: Vec<RecordViolation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordViolation {
    pub station: Station,
    pub timestamp: NaiveDateTime,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    OutOfRange,
    DuplicateTimestamp,
    TimestampRegression,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationStatistics {
    pub total_records: usize,
    pub complete_records: usize,
    pub weekend_records: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

pub struct IntegrityChecker {
    max_violations: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_violations: usize::MAX,
        }
    }

    /// Stop recording violations after `max_violations`; counting continues.
    pub fn with_max_violations(max_violations: usize) -> Self {
        Self { max_violations }
    }

    /// Check integrity of a loaded dataset
    pub fn check_integrity(&self, dataset: &Dataset) -> Result<IntegrityReport> {
        let mut report = IntegrityReport {
            total_records: dataset.len(),
            complete_records: 0,
            coverage: dataset.coverage(),
            missing_values: CATALOG.iter().map(|spec| (spec.parameter, 0)).collect(),
            station_statistics: BTreeMap::new(),
            violations: Vec::new(),
        };

        for record in dataset.records() {
            self.check_record(record, &mut report);
        }

        for station in dataset.stations() {
            let records: Vec<&AirQualityRecord> = dataset.station_records(station).collect();
            self.check_time_series(station, &records, &mut report);
        }

        Ok(report)
    }

    fn check_record(&self, record: &AirQualityRecord, report: &mut IntegrityReport) {
        let mut complete = true;
        for spec in CATALOG.iter() {
            if record.is_missing(spec.parameter) {
                complete = false;
                *report.missing_values.entry(spec.parameter).or_insert(0) += 1;
            }
        }

        if let Err(e) = record.validate() {
            self.push_violation(
                report,
                RecordViolation {
                    station: record.station,
                    timestamp: record.timestamp,
                    violation_type: ViolationType::OutOfRange,
                    details: e.to_string(),
                },
            );
        }

        let stats = report
            .station_statistics
            .entry(record.station)
            .or_default();

        stats.total_records += 1;
        if record.is_weekend() {
            stats.weekend_records += 1;
        }
        if complete {
            stats.complete_records += 1;
            report.complete_records += 1;
        }

        stats.first_timestamp = Some(
            stats
                .first_timestamp
                .map_or(record.timestamp, |t| t.min(record.timestamp)),
        );
        stats.last_timestamp = Some(
            stats
                .last_timestamp
                .map_or(record.timestamp, |t| t.max(record.timestamp)),
        );
    }

    /// Source order is expected to be strictly increasing per station
    fn check_time_series(
        &self,
        station: Station,
        records: &[&AirQualityRecord],
        report: &mut IntegrityReport,
    ) {
        for window in records.windows(2) {
            let prev = window[0];
            let curr = window[1];

            let violation_type = if curr.timestamp == prev.timestamp {
                ViolationType::DuplicateTimestamp
            } else if curr.timestamp < prev.timestamp {
                ViolationType::TimestampRegression
            } else {
                continue;
            };

            self.push_violation(
                report,
                RecordViolation {
                    station,
                    timestamp: curr.timestamp,
                    violation_type,
                    details: format!("{} follows {}", curr.timestamp, prev.timestamp),
                },
            );
        }
    }

    fn push_violation(&self, report: &mut IntegrityReport, violation: RecordViolation) {
        if report.violations.len() < self.max_violations {
            report.violations.push(violation);
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Complete Records: {} ({:.1}%)\n",
            report.complete_records,
            percentage(report.complete_records, report.total_records)
        ));
        if let Some((first, last)) = report.coverage {
            summary.push_str(&format!("Coverage: {} to {}\n", first, last));
        }

        summary.push_str("\nMissing Values:\n");
        for (parameter, count) in &report.missing_values {
            summary.push_str(&format!(
                "  {:<6} {:>8} ({:.1}%)\n",
                parameter.column(),
                count,
                percentage(*count, report.total_records)
            ));
        }

        summary.push_str("\nStations:\n");
        for (station, stats) in &report.station_statistics {
            summary.push_str(&format!(
                "  {:<14} {:>7} records, {:>7} complete, {:>7} weekend",
                station.name(),
                stats.total_records,
                stats.complete_records,
                stats.weekend_records
            ));
            if let (Some(first), Some(last)) = (stats.first_timestamp, stats.last_timestamp) {
                summary.push_str(&format!(", {} to {}", first, last));
            }
            summary.push('\n');
        }

        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));
        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {} at {} ({:?}): {}\n",
                    i + 1,
                    violation.station,
                    violation.timestamp,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
