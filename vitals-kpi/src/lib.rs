//! Health-record aggregation and metric fixture documents for `vitals-core`.
//!
//! Raw records (as exported by a phone health app) are grouped per day, ISO
//! week and month; each group becomes a `PeriodEntry` with its mean and the
//! percent change from the previous group.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use vitals_core::{AggregationWindow, DashboardError, MetricKey, MetricSeries, PeriodEntry};

mod export;
mod fixture;

pub use export::{records_from_export_xml, summarize_export_str, summarize_input_str};
pub use fixture::{fixture_document, parse_fixture_str, parse_fixture_value, DirectoryFixtures};

/// Summarize records for `key` from a JSON string.
pub fn summarize_records_str(
    records_json: &str,
    key: MetricKey,
) -> Result<MetricSeries, DashboardError> {
    let value: Value =
        serde_json::from_str(records_json).map_err(|err| DashboardError::Parse(err.to_string()))?;
    summarize_records_value(&value, key)
}

/// Summarize records for `key` from a `serde_json::Value`.
///
/// Accepts either an array of record objects or a column-oriented object
/// (`{"type": [...], "startDate": [...], "value": [...]}`).
pub fn summarize_records_value(
    records: &Value,
    key: MetricKey,
) -> Result<MetricSeries, DashboardError> {
    let rows = records_from_value(records)?;
    summarize_rows(&rows, key)
}

/// Group already-flattened record objects (`type`, `startDate`, `value`).
pub(crate) fn summarize_rows(rows: &[Value], key: MetricKey) -> Result<MetricSeries, DashboardError> {
    let record_type = key.record_type();

    let mut aggregate = Aggregate::default();
    let mut skipped = 0usize;
    for row in rows {
        let Some(record) = HealthRecord::from_row(row) else {
            skipped += 1;
            continue;
        };
        if record.record_type == record_type {
            aggregate.push(record.day, record.value);
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "records without a usable type or start date");
    }

    if aggregate.days.is_empty() {
        return Err(DashboardError::MissingData);
    }

    Ok(aggregate.finalize())
}

struct HealthRecord {
    record_type: String,
    day: NaiveDate,
    value: Option<f64>,
}

impl HealthRecord {
    fn from_row(row: &Value) -> Option<Self> {
        let record_type = row.get("type").and_then(Value::as_str)?.to_string();
        let day = row
            .get("startDate")
            .and_then(Value::as_str)
            .and_then(parse_record_day)?;
        let value = row.get("value").and_then(numeric_value);
        Some(Self {
            record_type,
            day,
            value,
        })
    }
}

fn records_from_value(records: &Value) -> Result<Vec<Value>, DashboardError> {
    match records {
        Value::Array(rows) => Ok(rows.clone()),
        Value::Object(columns) => {
            if let Some(Value::Array(rows)) = columns.get("records") {
                return Ok(rows.clone());
            }

            let mut arrays = Vec::new();
            for (name, column) in columns {
                let Some(values) = column.as_array() else {
                    return Err(DashboardError::Parse(format!(
                        "Column {name} is not an array"
                    )));
                };
                arrays.push((name, values));
            }

            let length = arrays.iter().map(|(_, values)| values.len()).max().unwrap_or(0);
            let rows = (0..length)
                .map(|index| {
                    let mut row = serde_json::Map::new();
                    for (name, values) in &arrays {
                        if let Some(value) = values.get(index) {
                            row.insert((*name).clone(), value.clone());
                        }
                    }
                    Value::Object(row)
                })
                .collect();
            Ok(rows)
        }
        _ => Err(DashboardError::Parse(
            "Expected an array of health records".to_string(),
        )),
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Groups keyed by the first day of each period.
#[derive(Default)]
struct Aggregate {
    days: BTreeMap<NaiveDate, Accumulator>,
    weeks: BTreeMap<NaiveDate, Accumulator>,
    months: BTreeMap<NaiveDate, Accumulator>,
}

impl Aggregate {
    fn push(&mut self, day: NaiveDate, value: Option<f64>) {
        self.days.entry(day).or_default().push(value);
        self.weeks.entry(week_start(day)).or_default().push(value);
        self.months.entry(month_start(day)).or_default().push(value);
    }

    fn finalize(self) -> MetricSeries {
        let mut series = MetricSeries::default();
        *series.window_mut(AggregationWindow::Daily) = build_entries(&self.days, |day| {
            day.format("%Y-%m-%d").to_string()
        });
        *series.window_mut(AggregationWindow::Weekly) = build_entries(&self.weeks, week_label);
        *series.window_mut(AggregationWindow::Monthly) = build_entries(&self.months, |start| {
            start.format("%Y-%m").to_string()
        });

        let daily = series.window(AggregationWindow::Daily);
        let day_count = daily.len() as f64;
        let average_sum: f64 = daily.iter().filter_map(|entry| entry.average).sum();
        let evolution_sum: f64 = daily.iter().filter_map(|entry| entry.evolution).sum();

        series.overall_avg = Some(average_sum / day_count);
        series.overall_avg_ev = Some(evolution_sum / day_count);
        series
    }
}

fn build_entries(
    groups: &BTreeMap<NaiveDate, Accumulator>,
    label: impl Fn(NaiveDate) -> String,
) -> Vec<PeriodEntry> {
    let mut previous: Option<Option<f64>> = None;
    groups
        .iter()
        .map(|(start, acc)| {
            let average = acc.mean();
            let evolution = match previous {
                None => Some(0.0),
                Some(prev) => percent_change(prev, average),
            };
            previous = Some(average);
            PeriodEntry {
                period: Some(label(*start)),
                average,
                evolution,
            }
        })
        .collect()
}

fn percent_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    let (previous, current) = (previous?, current?);
    if previous == 0.0 {
        return None;
    }
    let change = (current / previous - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

fn week_label(start: NaiveDate) -> String {
    let end = start + Duration::days(6);
    format!("{}/{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Calendar day of a record in its own UTC offset.
fn parse_record_day(value: &str) -> Option<NaiveDate> {
    let text = value.trim();
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Numbers or numeric strings; anything else, including non-finite values, is missing.
pub(crate) fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
