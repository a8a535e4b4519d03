//! Mô hình dữ liệu lõi cho bảng điều khiển chỉ số sức khỏe bệnh nhân.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod insights;
pub mod intake;
pub mod resolver;
pub mod score;
pub mod store;

pub use insights::{
    metric_highlights, ChatExchange, ChatSession, InsightGenerator, TemplateInsights,
};
pub use intake::{
    admit_patient, prepare_patient, FixtureSource, PatientDraft, PreparedPatient, UploadedFile,
};
pub use resolver::{
    chart_points, resolve, resolve_all, ChartPoint, MetricCard, ResolvedMetric, TrendTone,
    NOT_AVAILABLE,
};
pub use score::{patient_scores, score_metric, MetricScore, SCORED_METRICS};
pub use store::{sort_patients, PatientStore, PersistFn, SortKey};

/// Cấu hình bảng điều khiển (khóa lưu trữ, nguồn fixture, độ trễ giả lập).
///
/// Trường bị thiếu khi đọc lấy giá trị mặc định.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Khóa duy nhất trong local storage chứa danh sách bệnh nhân.
    pub storage_key: String,
    /// Đường dẫn gốc chứa các tài liệu fixture JSON.
    pub fixture_base_url: String,
    /// Thời gian "xử lý" (ms) trước khi bệnh nhân mới hiển thị.
    pub processing_delay_ms: u32,
    /// Thời gian chờ (ms) trước khi câu trả lời chat xuất hiện.
    pub chat_delay_ms: u32,
    pub default_timeframe: Timeframe,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            storage_key: "patients".to_string(),
            fixture_base_url: "/data".to_string(),
            processing_delay_ms: 2000,
            chat_delay_ms: 1000,
            default_timeframe: Timeframe::Daily,
        }
    }
}

/// Giới tính khai báo trong biểu mẫu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(DashboardError::Parse(format!("unknown gender '{other}'"))),
        }
    }
}

/// Bộ chọn khung thời gian trên giao diện.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    #[serde(alias = "daily")]
    Daily,
    #[serde(alias = "weekly")]
    Weekly,
    #[serde(alias = "yearly")]
    Yearly,
    #[serde(alias = "overall")]
    Overall,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Daily,
        Timeframe::Weekly,
        Timeframe::Yearly,
        Timeframe::Overall,
    ];

    /// Cửa sổ tổng hợp tương ứng; `Overall` đọc trường tóm tắt nên không có cửa sổ.
    pub fn window(self) -> Option<AggregationWindow> {
        match self {
            Timeframe::Daily => Some(AggregationWindow::Daily),
            Timeframe::Weekly => Some(AggregationWindow::Weekly),
            Timeframe::Yearly => Some(AggregationWindow::Monthly),
            Timeframe::Overall => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
            Timeframe::Yearly => "Yearly",
            Timeframe::Overall => "Overall",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Timeframe::Daily),
            "weekly" => Ok(Timeframe::Weekly),
            "yearly" => Ok(Timeframe::Yearly),
            "overall" => Ok(Timeframe::Overall),
            other => Err(DashboardError::Parse(format!("unknown timeframe '{other}'"))),
        }
    }
}

/// Cửa sổ tổng hợp trong một `MetricSeries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationWindow {
    Daily,
    Weekly,
    Monthly,
}

impl AggregationWindow {
    pub const ALL: [AggregationWindow; 3] = [
        AggregationWindow::Daily,
        AggregationWindow::Weekly,
        AggregationWindow::Monthly,
    ];

    /// Tên trường trong tài liệu fixture (`daily_avg`, ...).
    pub fn field_name(self) -> &'static str {
        match self {
            AggregationWindow::Daily => "daily_avg",
            AggregationWindow::Weekly => "weekly_avg",
            AggregationWindow::Monthly => "monthly_avg",
        }
    }

    /// Tên cột nhãn kỳ trong mỗi mục (`day`, `week`, `month`).
    pub fn period_field(self) -> &'static str {
        match self {
            AggregationWindow::Daily => "day",
            AggregationWindow::Weekly => "week",
            AggregationWindow::Monthly => "month",
        }
    }
}

/// Các chỉ số mà bộ phân giải nhận biết, mỗi chỉ số ứng với một fixture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Heart,
    Hrv,
    Vo2max,
    Respiratory,
    Oxygen,
    Energy,
}

impl MetricKey {
    /// Thứ tự hiển thị trên lưới thẻ.
    pub const ALL: [MetricKey; 6] = [
        MetricKey::Heart,
        MetricKey::Hrv,
        MetricKey::Vo2max,
        MetricKey::Respiratory,
        MetricKey::Oxygen,
        MetricKey::Energy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Heart => "heart",
            MetricKey::Hrv => "hrv",
            MetricKey::Vo2max => "vo2max",
            MetricKey::Respiratory => "respiratory",
            MetricKey::Oxygen => "oxygen",
            MetricKey::Energy => "energy",
        }
    }

    /// Nhận diện khóa chỉ số; trả về `None` nếu không biết.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == key.trim())
    }

    pub fn fixture_name(self) -> &'static str {
        match self {
            MetricKey::Heart => "heart.json",
            MetricKey::Hrv => "hrv.json",
            MetricKey::Vo2max => "vomax.json",
            MetricKey::Respiratory => "respiratory.json",
            MetricKey::Oxygen => "oxygen.json",
            MetricKey::Energy => "energy.json",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MetricKey::Heart => "Avg Heart Rate",
            MetricKey::Hrv => "Heart Rate Variability",
            MetricKey::Vo2max => "VO2 Max",
            MetricKey::Respiratory => "Respiratory Rate",
            MetricKey::Oxygen => "Oxygen Saturation",
            MetricKey::Energy => "Calories Burned",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MetricKey::Heart => "bpm",
            MetricKey::Hrv => "ms",
            MetricKey::Vo2max => "mL/kg/min",
            MetricKey::Respiratory => "breaths/min",
            MetricKey::Oxygen => "%",
            MetricKey::Energy => "kcal",
        }
    }

    /// Kiểu bản ghi trong dữ liệu xuất từ ứng dụng sức khỏe.
    pub fn record_type(self) -> &'static str {
        match self {
            MetricKey::Heart => "HKQuantityTypeIdentifierHeartRate",
            MetricKey::Hrv => "HKQuantityTypeIdentifierHeartRateVariabilitySDNN",
            MetricKey::Vo2max => "HKQuantityTypeIdentifierVO2Max",
            MetricKey::Respiratory => "HKQuantityTypeIdentifierRespiratoryRate",
            MetricKey::Oxygen => "HKQuantityTypeIdentifierOxygenSaturation",
            MetricKey::Energy => "HKQuantityTypeIdentifierActiveEnergyBurned",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKey::parse(s).ok_or_else(|| DashboardError::UnknownMetric(s.to_string()))
    }
}

/// Một kỳ tổng hợp (ngày, tuần hoặc tháng).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PeriodEntry {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub average: Option<f64>,
    /// Phần trăm thay đổi so với kỳ trước.
    #[serde(default)]
    pub evolution: Option<f64>,
}

/// Chuỗi tổng hợp của một chỉ số; các mục được sắp theo thời gian, mục cuối là mới nhất.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MetricSeries {
    #[serde(default)]
    pub daily_avg: Vec<PeriodEntry>,
    #[serde(default)]
    pub weekly_avg: Vec<PeriodEntry>,
    #[serde(default)]
    pub monthly_avg: Vec<PeriodEntry>,
    #[serde(default)]
    pub overall_avg: Option<f64>,
    #[serde(default)]
    pub overall_avg_ev: Option<f64>,
}

impl MetricSeries {
    pub fn window(&self, window: AggregationWindow) -> &[PeriodEntry] {
        match window {
            AggregationWindow::Daily => &self.daily_avg,
            AggregationWindow::Weekly => &self.weekly_avg,
            AggregationWindow::Monthly => &self.monthly_avg,
        }
    }

    pub fn window_mut(&mut self, window: AggregationWindow) -> &mut Vec<PeriodEntry> {
        match window {
            AggregationWindow::Daily => &mut self.daily_avg,
            AggregationWindow::Weekly => &mut self.weekly_avg,
            AggregationWindow::Monthly => &mut self.monthly_avg,
        }
    }

    /// Mục mới nhất của cửa sổ.
    pub fn latest(&self, window: AggregationWindow) -> Option<&PeriodEntry> {
        self.window(window).last()
    }

    pub fn is_empty(&self) -> bool {
        AggregationWindow::ALL
            .into_iter()
            .all(|window| self.window(window).is_empty())
            && self.overall_avg.is_none()
            && self.overall_avg_ev.is_none()
    }
}

/// Hồ sơ bệnh nhân; không thay đổi sau khi được thêm vào danh sách.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub gender: Gender,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricSeries>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name.trim(), self.family_name.trim())
            .trim()
            .to_string()
    }

    pub fn metric(&self, key: MetricKey) -> Option<&MetricSeries> {
        self.metrics.get(key.as_str())
    }

    /// Tuổi tròn tại ngày `today`; `None` nếu thiếu ngày sinh hoặc ngày sinh ở tương lai.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth_date = self.birth_date?;
        let mut age = today.year() - birth_date.year();
        if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
            age -= 1;
        }
        (age >= 0).then_some(age)
    }

    /// Các trường của khung tổng quan; giá trị trống hiển thị "N/A".
    pub fn overview_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", display_text(&self.given_name)),
            ("Last Name", display_text(&self.family_name)),
            (
                "Birth Date",
                self.birth_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            ("Gender", self.gender.label().to_string()),
            ("Height (cm)", display_number(self.height_cm)),
            ("Weight (kg)", display_number(self.weight_kg)),
        ]
    }
}

fn display_text(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn display_number(value: Option<f64>) -> String {
    match value {
        Some(number) if number.is_finite() => {
            if number.fract() == 0.0 {
                format!("{number:.0}")
            } else {
                format!("{number:.1}")
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Lỗi chung của bảng điều khiển.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error("{field} is missing or invalid")]
    Validation { field: &'static str },
    #[error("A patient file must be uploaded before submitting")]
    MissingUpload,
    #[error("Failed to load metric data {name}: {reason}")]
    Fixture { name: String, reason: String },
    #[error("Input is missing the minimum required data")]
    MissingData,
    #[error("Unable to read data: {0}")]
    Parse(String),
    #[error("Unable to save patients: {0}")]
    Storage(String),
    #[error("Insight generation failed: {0}")]
    Insight(String),
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}
