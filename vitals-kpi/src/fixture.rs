//! Metric fixture documents: `{"status": "success", "data": {...}}`.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use vitals_core::{
    AggregationWindow, DashboardError, FixtureSource, MetricKey, MetricSeries, PeriodEntry,
};

use crate::numeric_value;

/// Decode a fixture document from a JSON string.
pub fn parse_fixture_str(document: &str) -> Result<MetricSeries, DashboardError> {
    let value: Value =
        serde_json::from_str(document).map_err(|err| DashboardError::Parse(err.to_string()))?;
    parse_fixture_value(&value)
}

/// Decode a fixture document. Absent windows are empty; `null` numbers are absent.
pub fn parse_fixture_value(document: &Value) -> Result<MetricSeries, DashboardError> {
    if let Some(status) = document.get("status").and_then(Value::as_str) {
        if status != "success" {
            return Err(DashboardError::Parse(format!(
                "Fixture reports status {status}"
            )));
        }
    }

    let data = document.get("data").ok_or(DashboardError::MissingData)?;
    if !data.is_object() {
        return Err(DashboardError::Parse(
            "Fixture data must be an object".to_string(),
        ));
    }

    let mut series = MetricSeries::default();
    for window in AggregationWindow::ALL {
        let Some(entries) = data.get(window.field_name()).and_then(Value::as_array) else {
            continue;
        };
        *series.window_mut(window) = entries
            .iter()
            .filter(|entry| entry.is_object())
            .map(|entry| parse_entry(window, entry))
            .collect();
    }

    series.overall_avg = data.get("overall_avg").and_then(numeric_value);
    series.overall_avg_ev = data.get("overall_avg_ev").and_then(numeric_value);
    Ok(series)
}

fn parse_entry(window: AggregationWindow, entry: &Value) -> PeriodEntry {
    let period = entry
        .get(window.period_field())
        .and_then(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        });
    let average = entry
        .get(window.field_name())
        .or_else(|| entry.get("average"))
        .and_then(numeric_value);
    let evolution = entry.get("evolution").and_then(numeric_value);

    PeriodEntry {
        period,
        average,
        evolution,
    }
}

/// Encode a series in the fixture document layout.
pub fn fixture_document(series: &MetricSeries) -> Value {
    let mut data = Map::new();
    for window in AggregationWindow::ALL {
        let entries: Vec<Value> = series
            .window(window)
            .iter()
            .map(|entry| {
                let mut object = Map::new();
                object.insert(window.period_field().to_string(), json!(entry.period));
                object.insert(window.field_name().to_string(), json!(entry.average));
                object.insert("evolution".to_string(), json!(entry.evolution));
                Value::Object(object)
            })
            .collect();
        data.insert(window.field_name().to_string(), Value::Array(entries));
    }
    data.insert("overall_avg".to_string(), json!(series.overall_avg));
    data.insert("overall_avg_ev".to_string(), json!(series.overall_avg_ev));

    json!({
        "status": "success",
        "data": Value::Object(data),
    })
}

/// Fixture documents stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryFixtures {
    root: PathBuf,
}

impl DirectoryFixtures {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: MetricKey) -> PathBuf {
        self.root.join(key.fixture_name())
    }
}

impl FixtureSource for DirectoryFixtures {
    async fn load(&self, key: MetricKey) -> Result<MetricSeries, DashboardError> {
        let path = self.path_for(key);
        let fixture_error = |reason: String| DashboardError::Fixture {
            name: key.fixture_name().to_string(),
            reason,
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|err| fixture_error(format!("{}: {err}", path.display())))?;
        parse_fixture_str(&text).map_err(|err| fixture_error(err.to_string()))
    }
}
