use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => panic!("invalid end of day"),
};

/// Closed timestamp interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// `[day 00:00:00, day 23:59:59]`
    pub fn day(day: NaiveDate) -> Self {
        Self::dates(day, day)
    }

    /// `[start 00:00:00, end 23:59:59]`; bounds are kept as given.
    pub fn dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(END_OF_DAY),
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// How date selections outside the dataset coverage are treated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Use the bounds as given and return whatever intersects, possibly nothing.
    #[default]
    Intersect,
    /// Pull the bounds into the covered dates first.
    Clamp,
    /// Reject bounds outside the covered dates, or inverted bounds.
    Strict,
}

impl RangePolicy {
    /// Window to filter with, or `None` when the selection cannot match anything.
    pub fn apply(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        coverage: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Option<TimeWindow>> {
        match self {
            RangePolicy::Intersect => Ok(Some(TimeWindow::dates(start, end))),
            RangePolicy::Clamp => Ok(coverage.and_then(|(first, last)| {
                let start = start.max(first);
                let end = end.min(last);
                (start <= end).then(|| TimeWindow::dates(start, end))
            })),
            RangePolicy::Strict => match coverage {
                Some((first, last)) if first <= start && start <= end && end <= last => {
                    Ok(Some(TimeWindow::dates(start, end)))
                }
                _ => Err(DashboardError::InvalidRange {
                    start,
                    end,
                    coverage: coverage
                        .map(|(first, last)| format!("{} to {}", first, last))
                        .unwrap_or_else(|| "(empty dataset)".to_string()),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_window_is_closed() {
        let window = TimeWindow::day(date(2017, 2, 28));
        assert!(window.contains(date(2017, 2, 28).and_hms_opt(0, 0, 0).unwrap()));
        assert!(window.contains(date(2017, 2, 28).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!window.contains(date(2017, 3, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(!window.contains(date(2017, 2, 27).and_hms_opt(23, 59, 59).unwrap()));
    }

    #[test]
    fn test_intersect_keeps_bounds() {
        let coverage = Some((date(2013, 3, 1), date(2017, 2, 28)));
        let window = RangePolicy::Intersect
            .apply(date(2012, 1, 1), date(2013, 3, 2), coverage)
            .unwrap()
            .unwrap();
        assert_eq!(window, TimeWindow::dates(date(2012, 1, 1), date(2013, 3, 2)));

        // Inverted bounds are not reordered
        let inverted = RangePolicy::Intersect
            .apply(date(2014, 1, 2), date(2014, 1, 1), coverage)
            .unwrap()
            .unwrap();
        assert!(inverted.start > inverted.end);
    }

    #[test]
    fn test_clamp_pulls_bounds_in() {
        let coverage = Some((date(2013, 3, 1), date(2017, 2, 28)));
        let window = RangePolicy::Clamp
            .apply(date(2012, 1, 1), date(2020, 1, 1), coverage)
            .unwrap()
            .unwrap();
        assert_eq!(window, TimeWindow::dates(date(2013, 3, 1), date(2017, 2, 28)));

        let outside = RangePolicy::Clamp
            .apply(date(2018, 1, 1), date(2018, 2, 1), coverage)
            .unwrap();
        assert!(outside.is_none());

        assert!(RangePolicy::Clamp
            .apply(date(2014, 1, 1), date(2014, 1, 2), None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_strict_rejects_out_of_coverage() {
        let coverage = Some((date(2013, 3, 1), date(2017, 2, 28)));
        assert!(RangePolicy::Strict
            .apply(date(2013, 3, 1), date(2017, 2, 28), coverage)
            .is_ok());

        let err = RangePolicy::Strict
            .apply(date(2013, 2, 28), date(2013, 3, 2), coverage)
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));

        assert!(RangePolicy::Strict
            .apply(date(2014, 1, 2), date(2014, 1, 1), coverage)
            .is_err());
        assert!(RangePolicy::Strict
            .apply(date(2014, 1, 1), date(2014, 1, 1), None)
            .is_err());
    }
}
