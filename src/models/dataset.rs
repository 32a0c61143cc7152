use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::models::{AirQualityRecord, Station};

/// The loaded table: immutable after construction and shared through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<AirQualityRecord>,
    station_index: BTreeMap<Station, Vec<usize>>,
    coverage: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl Dataset {
    pub fn new(records: Vec<AirQualityRecord>) -> Self {
        let mut station_index: BTreeMap<Station, Vec<usize>> = BTreeMap::new();
        let mut coverage: Option<(NaiveDateTime, NaiveDateTime)> = None;

        for (position, record) in records.iter().enumerate() {
            station_index
                .entry(record.station)
                .or_default()
                .push(position);

            coverage = Some(match coverage {
                None => (record.timestamp, record.timestamp),
                Some((first, last)) => (first.min(record.timestamp), last.max(record.timestamp)),
            });
        }

        Self {
            records,
            station_index,
            coverage,
        }
    }

    pub fn records(&self) -> &[AirQualityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one station, in source order.
    pub fn station_records(&self, station: Station) -> impl Iterator<Item = &AirQualityRecord> {
        self.station_index
            .get(&station)
            .map(|positions| positions.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&position| &self.records[position])
    }

    /// Stations present in the dataset, alphabetically.
    pub fn stations(&self) -> Vec<Station> {
        self.station_index.keys().copied().collect()
    }

    pub fn station_count(&self, station: Station) -> usize {
        self.station_index.get(&station).map_or(0, Vec::len)
    }

    /// Earliest and latest timestamp.
    pub fn coverage(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.coverage
    }

    pub fn date_coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.coverage
            .map(|(first, last)| (first.date(), last.date()))
    }
}
