use serde::Serialize;
use std::fmt::Write;

use crate::analyzers::{DailyResult, QueryResult, RangedResult};
use crate::cli::args::OutputFormat;
use crate::error::Result;
use crate::models::{ParameterSpec, CATALOG};
use crate::utils::constants::NO_DATA_MESSAGE;

/// One query result labelled with the parameter it was computed for.
#[derive(Debug, Serialize)]
pub struct Section<'a> {
    pub parameter: &'a str,
    pub column: &'a str,
    pub units: &'a str,
    pub result: &'a QueryResult,
}

impl<'a> Section<'a> {
    pub fn new(spec: &'a ParameterSpec, result: &'a QueryResult) -> Self {
        Self {
            parameter: spec.label,
            column: spec.column,
            units: spec.units,
            result,
        }
    }
}

pub fn render(format: OutputFormat, sections: &[Section<'_>]) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(sections)?),
        OutputFormat::Text => Ok(sections
            .iter()
            .map(render_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn render_text(section: &Section<'_>) -> String {
    let mut out = String::new();
    if section.units.is_empty() {
        let _ = writeln!(out, "== {} ==", section.parameter);
    } else {
        let _ = writeln!(out, "== {} ({}) ==", section.parameter, section.units);
    }

    if section.result.is_empty() {
        let _ = writeln!(out, "{}", NO_DATA_MESSAGE);
        return out;
    }

    match section.result {
        QueryResult::Empty => {}
        QueryResult::Daily(DailyResult::Empty) | QueryResult::Ranged(RangedResult::Empty) => {}
        QueryResult::Daily(DailyResult::Frequencies(counts))
        | QueryResult::Ranged(RangedResult::Frequencies(counts)) => {
            let _ = writeln!(out, "{:<6} {:>8}", "wd", "count");
            for entry in counts {
                let _ = writeln!(out, "{:<6} {:>8}", entry.category, entry.count);
            }
        }
        QueryResult::Daily(DailyResult::Numeric(slice)) => {
            match slice.mean {
                Some(mean) => {
                    let _ = writeln!(out, "Daily mean: {:.2} {}", mean, section.units);
                }
                None => {
                    let _ = writeln!(out, "Daily mean: -");
                }
            }
            for point in &slice.series {
                let _ = writeln!(out, "{}  {:>10.2}", point.timestamp, point.value);
            }
        }
        QueryResult::Ranged(RangedResult::Daily(days)) => {
            let _ = writeln!(out, "{:<10}  {:>10}  {:>6}", "date", "mean", "hours");
            for day in days {
                let _ = writeln!(out, "{}  {:>10.2}  {:>6}", day.date, day.mean, day.count);
            }
        }
        QueryResult::Ranking(entries) => {
            for (rank, entry) in entries.iter().enumerate() {
                let marker = if entry.is_max { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "{:>2}. {} {:<14} {:>10.2}",
                    rank + 1,
                    marker,
                    entry.station,
                    entry.mean
                );
            }
        }
        QueryResult::Comparison(rows) => {
            let _ = writeln!(out, "{:<14} {:>10} {:>10}", "station", "weekday", "weekend");
            for row in rows {
                let _ = writeln!(
                    out,
                    "{:<14} {:>10} {:>10}",
                    row.station,
                    format_mean(row.weekday_mean),
                    format_mean(row.weekend_mean)
                );
            }
        }
    }

    out
}

fn format_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| "-".to_string(), |m| format!("{:.2}", m))
}

/// Catalog listing for the `parameters` command.
pub fn render_catalog(format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&CATALOG)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "{:<40} {:<6} {:<12} units", "label", "column", "kind");
            for spec in CATALOG.iter() {
                let _ = writeln!(
                    out,
                    "{:<40} {:<6} {:<12} {}",
                    spec.label,
                    spec.column,
                    format!("{:?}", spec.kind),
                    spec.units
                );
            }
            Ok(out)
        }
    }
}
