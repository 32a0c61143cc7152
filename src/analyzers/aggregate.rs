use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzers::results::CategoryCount;
use crate::models::WindDirection;

/// Treatment of missing measurements in means.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Missing values count toward neither the sum nor the count.
    #[default]
    Exclude,
    /// Missing values count as 0.0.
    Zero,
}

impl MissingValuePolicy {
    pub fn resolve(&self, value: Option<f64>) -> Option<f64> {
        match self {
            MissingValuePolicy::Exclude => value,
            MissingValuePolicy::Zero => Some(value.unwrap_or(0.0)),
        }
    }
}

/// Running arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    /// Adds a value under `policy` and returns what was actually counted.
    pub fn push(&mut self, value: Option<f64>, policy: MissingValuePolicy) -> Option<f64> {
        let resolved = policy.resolve(value)?;
        self.sum += resolved;
        self.count += 1;
        Some(resolved)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Tally of wind directions, most frequent first; ties keep compass order.
/// Missing directions are skipped and absent directions are omitted.
pub fn frequency_counts<I>(directions: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = Option<WindDirection>>,
{
    let mut tally: BTreeMap<WindDirection, usize> = BTreeMap::new();
    for direction in directions.into_iter().flatten() {
        *tally.entry(direction).or_insert(0) += 1;
    }

    let mut counts: Vec<CategoryCount> = tally
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
