//! Bridge WASM <-> JavaScript trung lập framework cho bảng điều khiển chỉ số.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use vitals_core::{DashboardConfig, DashboardError, MetricKey, Patient, Timeframe};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsDashboardConfig {
    #[serde(default)]
    storage_key: Option<String>,
    #[serde(default)]
    fixture_base_url: Option<String>,
    #[serde(default)]
    processing_delay_ms: Option<u32>,
    #[serde(default)]
    chat_delay_ms: Option<u32>,
    #[serde(default)]
    default_timeframe: Option<String>,
}

impl JsDashboardConfig {
    fn merge(self) -> Result<DashboardConfig, DashboardError> {
        let mut base = DashboardConfig::default();
        if let Some(key) = self.storage_key {
            base.storage_key = key;
        }
        if let Some(url) = self.fixture_base_url {
            base.fixture_base_url = url;
        }
        if let Some(delay) = self.processing_delay_ms {
            base.processing_delay_ms = delay;
        }
        if let Some(delay) = self.chat_delay_ms {
            base.chat_delay_ms = delay;
        }
        if let Some(timeframe) = self.default_timeframe {
            base.default_timeframe = timeframe.parse()?;
        }
        Ok(base)
    }
}

/// Cấu hình mặc định, ghi đè bằng các trường JS được cung cấp.
#[wasm_bindgen]
pub fn default_config(config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let cfg = read_config(config)?;
    to_value(&cfg).map_err(|err| JsValue::from_str(&format!("Không serialize config: {err}")))
}

/// Phân giải (value, trend) của một chỉ số; bệnh nhân `null` cho "N/A".
#[wasm_bindgen]
pub fn resolve_metric(
    patient: JsValue,
    metric_key: &str,
    timeframe: &str,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let patient = read_patient(patient)?;
    let timeframe = read_timeframe(timeframe)?;
    let resolved = vitals_core::resolve(patient.as_ref(), metric_key, timeframe);

    to_value(&resolved)
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

/// Toàn bộ thẻ chỉ số theo thứ tự hiển thị.
#[wasm_bindgen]
pub fn resolve_cards(patient: JsValue, timeframe: &str) -> Result<JsValue, JsValue> {
    let patient = read_patient(patient)?;
    let timeframe = read_timeframe(timeframe)?;
    let cards = vitals_core::resolve_all(patient.as_ref(), timeframe);

    to_value(&cards).map_err(|err| JsValue::from_str(&format!("Không serialize thẻ: {err}")))
}

#[wasm_bindgen]
pub fn chart_points(
    patient: JsValue,
    metric_key: &str,
    timeframe: &str,
) -> Result<JsValue, JsValue> {
    let patient = read_patient(patient)?;
    let timeframe = read_timeframe(timeframe)?;
    let points = vitals_core::chart_points(patient.as_ref(), metric_key, timeframe);

    to_value(&points)
        .map_err(|err| JsValue::from_str(&format!("Không serialize biểu đồ: {err}")))
}

/// Tổng hợp bản ghi sức khỏe thô thành `MetricSeries`.
#[wasm_bindgen]
pub fn summarize_records(records: JsValue, metric_key: &str) -> Result<JsValue, JsValue> {
    let records = from_value::<serde_json::Value>(records)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bản ghi: {err}")))?;
    let key: MetricKey = metric_key
        .parse()
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))?;

    let series = vitals_kpi::summarize_records_value(&records, key)
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))?;

    to_value(&series).map_err(|err| JsValue::from_str(&format!("Không serialize chuỗi: {err}")))
}

/// Đọc một tài liệu fixture thành `MetricSeries`.
#[wasm_bindgen]
pub fn parse_fixture(document: JsValue) -> Result<JsValue, JsValue> {
    let document = from_value::<serde_json::Value>(document)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được fixture: {err}")))?;

    let series = vitals_kpi::parse_fixture_value(&document)
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))?;

    to_value(&series).map_err(|err| JsValue::from_str(&format!("Không serialize chuỗi: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<DashboardConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            cfg.merge().map_err(|err| JsValue::from_str(&format_dashboard_error(err)))
        }
        _ => Ok(DashboardConfig::default()),
    }
}

fn read_patient(patient: JsValue) -> Result<Option<Patient>, JsValue> {
    if patient.is_null() || patient.is_undefined() {
        return Ok(None);
    }
    from_value::<Patient>(patient)
        .map(Some)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bệnh nhân: {err}")))
}

fn read_timeframe(timeframe: &str) -> Result<Timeframe, JsValue> {
    timeframe
        .parse()
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))
}

fn format_dashboard_error(err: DashboardError) -> String {
    format!("Dashboard error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_merge_onto_defaults() {
        let cfg: JsDashboardConfig = serde_json::from_value(serde_json::json!({
            "storage_key": "ward-7",
            "processing_delay_ms": 0,
            "default_timeframe": "weekly"
        }))
        .expect("Config không hợp lệ");

        let merged = cfg.merge().expect("Không gộp được config");
        assert_eq!(merged.storage_key, "ward-7");
        assert_eq!(merged.processing_delay_ms, 0);
        assert_eq!(merged.default_timeframe, Timeframe::Weekly);
        assert_eq!(merged.fixture_base_url, DashboardConfig::default().fixture_base_url);
    }

    #[test]
    fn unknown_timeframe_is_rejected() {
        let cfg: JsDashboardConfig =
            serde_json::from_value(serde_json::json!({ "default_timeframe": "hourly" }))
                .expect("Config không hợp lệ");

        assert!(matches!(cfg.merge(), Err(DashboardError::Parse(_))));
    }
}
