use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::analyzers::aggregate::{frequency_counts, MeanAccumulator, MissingValuePolicy};
use crate::analyzers::results::{
    DailyMean, DailyResult, NumericSlice, QueryResult, RangedResult, RankingEntry,
    StationComparison, TimePoint,
};
use crate::analyzers::window::{RangePolicy, TimeWindow};
use crate::error::{DashboardError, Result};
use crate::models::parameter::lookup;
use crate::models::{AirQualityRecord, Dataset, ParameterKind, ParameterSpec, Station};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub range_policy: RangePolicy,
    pub missing_values: MissingValuePolicy,
}

/// A user selection with the parameter still in textual form
/// (display label or column identifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    Daily {
        station: Station,
        day: NaiveDate,
        parameter: String,
    },
    Ranged {
        station: Station,
        start: NaiveDate,
        end: NaiveDate,
        parameter: String,
    },
    Ranking {
        pollutant: String,
    },
    WeekdayWeekend {
        pollutant: String,
    },
}

/// Read-only queries over a shared dataset.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    dataset: Arc<Dataset>,
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(dataset: Arc<Dataset>, options: QueryOptions) -> Self {
        Self { dataset, options }
    }

    pub fn with_defaults(dataset: Arc<Dataset>) -> Self {
        Self::new(dataset, QueryOptions::default())
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Resolves the parameter through the catalog and runs the matching query.
    pub fn execute(&self, request: &QueryRequest) -> Result<QueryResult> {
        match request {
            QueryRequest::Daily {
                station,
                day,
                parameter,
            } => Ok(self.daily_slice(*station, *day, lookup(parameter)?)?.into()),
            QueryRequest::Ranged {
                station,
                start,
                end,
                parameter,
            } => Ok(self
                .ranged_series(*station, *start, *end, lookup(parameter)?)?
                .into()),
            QueryRequest::Ranking { pollutant } => {
                Ok(QueryResult::Ranking(self.station_ranking(lookup(pollutant)?)?))
            }
            QueryRequest::WeekdayWeekend { pollutant } => Ok(QueryResult::Comparison(
                self.weekday_weekend_comparison(lookup(pollutant)?)?,
            )),
        }
    }

    /// One station, one calendar day.
    pub fn daily_slice(
        &self,
        station: Station,
        day: NaiveDate,
        param: &ParameterSpec,
    ) -> Result<DailyResult> {
        let window = match self.window(day, day)? {
            Some(window) => window,
            None => return Ok(DailyResult::Empty),
        };

        let records = self.select(station, &window);
        debug!(
            "daily slice {} {} {}: {} records",
            station,
            day,
            param.column,
            records.len()
        );

        if records.is_empty() {
            return Ok(DailyResult::Empty);
        }

        match param.kind {
            ParameterKind::Categorical => Ok(DailyResult::Frequencies(frequency_counts(
                records.iter().map(|r| r.wind_direction),
            ))),
            ParameterKind::Numeric => {
                let mut acc = MeanAccumulator::default();
                let mut series = Vec::with_capacity(records.len());

                for record in &records {
                    let value = record.numeric_value(param.parameter);
                    if let Some(value) = acc.push(value, self.options.missing_values) {
                        series.push(TimePoint {
                            timestamp: record.timestamp,
                            value,
                        });
                    }
                }
                series.sort_by_key(|point| point.timestamp);

                Ok(DailyResult::Numeric(NumericSlice {
                    mean: acc.mean(),
                    series,
                }))
            }
        }
    }

    /// One station over `[start, end]`, reduced to one mean per calendar date.
    pub fn ranged_series(
        &self,
        station: Station,
        start: NaiveDate,
        end: NaiveDate,
        param: &ParameterSpec,
    ) -> Result<RangedResult> {
        let window = match self.window(start, end)? {
            Some(window) => window,
            None => return Ok(RangedResult::Empty),
        };

        let records = self.select(station, &window);
        debug!(
            "ranged series {} {}..{} {}: {} records",
            station,
            start,
            end,
            param.column,
            records.len()
        );

        if records.is_empty() {
            return Ok(RangedResult::Empty);
        }

        match param.kind {
            ParameterKind::Categorical => Ok(RangedResult::Frequencies(frequency_counts(
                records.iter().map(|r| r.wind_direction),
            ))),
            ParameterKind::Numeric => {
                let mut by_date: BTreeMap<NaiveDate, MeanAccumulator> = BTreeMap::new();
                for record in &records {
                    by_date.entry(record.date()).or_default().push(
                        record.numeric_value(param.parameter),
                        self.options.missing_values,
                    );
                }

                let series = by_date
                    .into_iter()
                    .filter_map(|(date, acc)| {
                        acc.mean().map(|mean| DailyMean {
                            date,
                            mean,
                            count: acc.count(),
                        })
                    })
                    .collect();

                Ok(RangedResult::Daily(series))
            }
        }
    }

    /// Mean of `pollutant` per station over the whole dataset, highest first.
    pub fn station_ranking(&self, pollutant: &ParameterSpec) -> Result<Vec<RankingEntry>> {
        require_numeric(pollutant, "station ranking")?;

        let mut entries: Vec<RankingEntry> = self
            .dataset
            .stations()
            .into_iter()
            .filter_map(|station| {
                let acc = self.station_mean(station, pollutant, |_| true);
                acc.mean().map(|mean| RankingEntry {
                    station,
                    mean,
                    count: acc.count(),
                    is_max: false,
                })
            })
            .collect();

        // Stable, so equal means keep alphabetical station order
        entries.sort_by(|a, b| b.mean.total_cmp(&a.mean));

        let max = entries
            .iter()
            .map(|entry| entry.mean)
            .fold(f64::NEG_INFINITY, f64::max);
        for entry in &mut entries {
            entry.is_max = entry.mean == max;
        }

        debug!(
            "station ranking {}: {} stations",
            pollutant.column,
            entries.len()
        );
        Ok(entries)
    }

    /// Weekday and weekend means of `pollutant` for every station present.
    pub fn weekday_weekend_comparison(
        &self,
        pollutant: &ParameterSpec,
    ) -> Result<Vec<StationComparison>> {
        require_numeric(pollutant, "weekday/weekend comparison")?;

        let comparison = self
            .dataset
            .stations()
            .into_iter()
            .map(|station| StationComparison {
                station,
                weekday_mean: self
                    .station_mean(station, pollutant, |r| !r.is_weekend())
                    .mean(),
                weekend_mean: self
                    .station_mean(station, pollutant, AirQualityRecord::is_weekend)
                    .mean(),
            })
            .collect();

        Ok(comparison)
    }

    fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<Option<TimeWindow>> {
        self.options
            .range_policy
            .apply(start, end, self.dataset.date_coverage())
    }

    fn select(&self, station: Station, window: &TimeWindow) -> Vec<&AirQualityRecord> {
        self.dataset
            .station_records(station)
            .filter(|record| window.contains(record.timestamp))
            .collect()
    }

    fn station_mean<F>(&self, station: Station, param: &ParameterSpec, keep: F) -> MeanAccumulator
    where
        F: Fn(&AirQualityRecord) -> bool,
    {
        let mut acc = MeanAccumulator::default();
        for record in self.dataset.station_records(station).filter(|r| keep(r)) {
            acc.push(
                record.numeric_value(param.parameter),
                self.options.missing_values,
            );
        }
        acc
    }
}

fn require_numeric(param: &ParameterSpec, operation: &'static str) -> Result<()> {
    match param.kind {
        ParameterKind::Numeric => Ok(()),
        ParameterKind::Categorical => Err(DashboardError::UnsupportedAggregation {
            parameter: param.column.to_string(),
            operation,
        }),
    }
}
