use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{Station, WindDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: WindDirection,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Numeric view of a single day: the day's mean and its hourly series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSlice {
    /// `None` when no value contributed.
    pub mean: Option<f64>,
    /// Ascending by timestamp.
    pub series: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum DailyResult {
    Empty,
    Frequencies(Vec<CategoryCount>),
    Numeric(NumericSlice),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub mean: f64,
    /// Number of values behind `mean`.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RangedResult {
    Empty,
    Frequencies(Vec<CategoryCount>),
    /// Sparse and ascending by date.
    Daily(Vec<DailyMean>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankingEntry {
    pub station: Station,
    pub mean: f64,
    pub count: usize,
    /// Emphasised in presentation; true for every entry equal to the maximum.
    pub is_max: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationComparison {
    pub station: Station,
    pub weekday_mean: Option<f64>,
    pub weekend_mean: Option<f64>,
}

/// Everything a presentation adapter can be handed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryResult {
    Empty,
    Daily(DailyResult),
    Ranged(RangedResult),
    Ranking(Vec<RankingEntry>),
    Comparison(Vec<StationComparison>),
}

impl QueryResult {
    /// The displayable "no data" state, as opposed to a failed query.
    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::Empty => true,
            QueryResult::Daily(result) => matches!(result, DailyResult::Empty),
            QueryResult::Ranged(result) => matches!(result, RangedResult::Empty),
            QueryResult::Ranking(entries) => entries.is_empty(),
            QueryResult::Comparison(entries) => entries.is_empty(),
        }
    }
}

impl From<DailyResult> for QueryResult {
    fn from(result: DailyResult) -> Self {
        match result {
            DailyResult::Empty => QueryResult::Empty,
            other => QueryResult::Daily(other),
        }
    }
}

impl From<RangedResult> for QueryResult {
    fn from(result: RangedResult) -> Self {
        match result {
            RangedResult::Empty => QueryResult::Empty,
            other => QueryResult::Ranged(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_results_collapse() {
        assert_eq!(QueryResult::from(DailyResult::Empty), QueryResult::Empty);
        assert_eq!(QueryResult::from(RangedResult::Empty), QueryResult::Empty);
        assert!(QueryResult::Ranking(Vec::new()).is_empty());

        let frequencies = QueryResult::from(DailyResult::Frequencies(vec![CategoryCount {
            category: WindDirection::N,
            count: 2,
        }]));
        assert!(!frequencies.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let result = QueryResult::from(RangedResult::Daily(vec![DailyMean {
            date: NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
            mean: 7.5,
            count: 24,
        }]));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "ranged");
        assert_eq!(json["data"]["kind"], "daily");
        assert_eq!(json["data"]["data"][0]["date"], "2013-03-01");
        assert_eq!(json["data"]["data"][0]["mean"], 7.5);

        let empty = serde_json::to_value(QueryResult::Empty).unwrap();
        assert_eq!(empty["kind"], "empty");
    }
}
