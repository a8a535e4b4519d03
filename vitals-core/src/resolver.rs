//! Phân giải giá trị hiển thị từ hồ sơ bệnh nhân và khung thời gian.

use serde::{Deserialize, Serialize};

use crate::{MetricKey, MetricSeries, Patient, Timeframe};

/// Giá trị thay thế khi không có dữ liệu.
pub const NOT_AVAILABLE: &str = "N/A";

/// Cặp giá trị đã định dạng cho một thẻ chỉ số.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedMetric {
    pub value: String,
    pub trend: String,
}

impl ResolvedMetric {
    pub fn not_available() -> Self {
        Self {
            value: NOT_AVAILABLE.to_string(),
            trend: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.value != NOT_AVAILABLE
    }

    /// Sắc thái xu hướng dùng cho phần trình bày.
    pub fn tone(&self) -> Option<TrendTone> {
        if self.trend == NOT_AVAILABLE {
            None
        } else if self.trend.starts_with('-') {
            Some(TrendTone::Negative)
        } else {
            Some(TrendTone::Positive)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendTone {
    Positive,
    Negative,
}

impl TrendTone {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendTone::Positive => "positive",
            TrendTone::Negative => "negative",
        }
    }
}

/// Thẻ chỉ số hoàn chỉnh (tiêu đề, đơn vị, giá trị).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricCard {
    pub key: MetricKey,
    pub title: String,
    pub unit: String,
    pub resolved: ResolvedMetric,
}

/// Một điểm trên biểu đồ đường.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub label: Option<String>,
    pub value: f64,
}

/// Phân giải giá trị và xu hướng của `metric_key` theo `timeframe`.
///
/// Không bao giờ trả lỗi: thiếu bệnh nhân, khóa lạ, thiếu chuỗi hoặc cửa sổ rỗng
/// đều cho `("N/A", "N/A")`. Mỗi trường còn lại được định dạng độc lập.
pub fn resolve(patient: Option<&Patient>, metric_key: &str, timeframe: Timeframe) -> ResolvedMetric {
    let Some(series) = lookup_series(patient, metric_key) else {
        return ResolvedMetric::not_available();
    };

    let (average, evolution) = match timeframe.window() {
        Some(window) => match series.latest(window) {
            Some(entry) => (entry.average, entry.evolution),
            None => return ResolvedMetric::not_available(),
        },
        None => (series.overall_avg, series.overall_avg_ev),
    };

    ResolvedMetric {
        value: format_value(average),
        trend: format_trend(evolution),
    }
}

/// Phân giải toàn bộ chỉ số đã biết theo thứ tự hiển thị.
pub fn resolve_all(patient: Option<&Patient>, timeframe: Timeframe) -> Vec<MetricCard> {
    MetricKey::ALL
        .into_iter()
        .map(|key| MetricCard {
            key,
            title: key.title().to_string(),
            unit: key.unit().to_string(),
            resolved: resolve(patient, key.as_str(), timeframe),
        })
        .collect()
}

/// Chuỗi điểm cho biểu đồ; `Overall` không có chuỗi nên trả về rỗng.
pub fn chart_points(
    patient: Option<&Patient>,
    metric_key: &str,
    timeframe: Timeframe,
) -> Vec<ChartPoint> {
    let Some(series) = lookup_series(patient, metric_key) else {
        return Vec::new();
    };
    let Some(window) = timeframe.window() else {
        return Vec::new();
    };

    series
        .window(window)
        .iter()
        .filter_map(|entry| {
            let value = entry.average.and_then(round_two)?;
            Some(ChartPoint {
                label: entry.period.clone(),
                value,
            })
        })
        .collect()
}

fn lookup_series<'a>(patient: Option<&'a Patient>, metric_key: &str) -> Option<&'a MetricSeries> {
    let key = MetricKey::parse(metric_key)?;
    patient?.metric(key)
}

fn format_value(value: Option<f64>) -> String {
    match value.and_then(round_two) {
        Some(number) => format!("{number:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_trend(value: Option<f64>) -> String {
    match value.and_then(round_two) {
        // Giá trị làm tròn về 0 (kể cả -0.001) hiển thị "+0.00%".
        Some(number) => {
            let number = if number == 0.0 { 0.0 } else { number };
            format!("{number:+.2}%")
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Làm tròn hai chữ số (nửa lên, xa số 0); thẻ và biểu đồ dùng chung hàm này.
fn round_two(value: f64) -> Option<f64> {
    let rounded = (value * 100.0).round() / 100.0;
    rounded.is_finite().then_some(rounded)
}
