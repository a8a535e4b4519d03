//! Chấm điểm theo ngưỡng cố định trên giá trị trung bình toàn kỳ.

use serde::{Deserialize, Serialize};

use crate::{MetricKey, Patient};

/// Kết quả chấm điểm một chỉ số.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricScore {
    pub key: MetricKey,
    /// Giá trị đã quy đổi sang đơn vị hiển thị (SpO2 tính theo %).
    pub value: f64,
    pub label: String,
    pub advice: String,
}

impl MetricScore {
    pub fn summary(&self) -> String {
        format!(
            "{} score: {} ({:.0} {}). {}",
            self.key.title(),
            self.label,
            self.value,
            self.key.unit(),
            self.advice
        )
    }
}

struct Band {
    below: f64,
    label: &'static str,
    advice: &'static str,
}

const HEART_BANDS: [Band; 4] = [
    Band {
        below: 50.0,
        label: "Critical",
        advice: "Your heart rate is too low, consult a doctor.",
    },
    Band {
        below: 70.0,
        label: "Ideal",
        advice: "Your heart rate is optimal and reflects good physical health.",
    },
    Band {
        below: 90.0,
        label: "Normal",
        advice: "Your heart rate is within the average range.",
    },
    Band {
        below: f64::INFINITY,
        label: "High",
        advice: "Consult a healthcare professional immediately.",
    },
];

const ENERGY_BANDS: [Band; 4] = [
    Band {
        below: 200.0,
        label: "Low",
        advice: "Try to increase your daily physical activity.",
    },
    Band {
        below: 500.0,
        label: "Moderate",
        advice: "Good effort, keep moving regularly!",
    },
    Band {
        below: 800.0,
        label: "Active",
        advice: "Very good! You are maintaining a good fitness level.",
    },
    Band {
        below: f64::INFINITY,
        label: "Intense",
        advice: "Excellent! You have achieved a high level of activity.",
    },
];

const OXYGEN_BANDS: [Band; 4] = [
    Band {
        below: 90.0,
        label: "Critical",
        advice: "Your SpO2 is dangerously low, seek medical attention immediately.",
    },
    Band {
        below: 94.0,
        label: "Low",
        advice: "Your SpO2 is below normal, monitor your condition closely.",
    },
    Band {
        below: 97.0,
        label: "Normal",
        advice: "Your oxygen saturation is within the expected range.",
    },
    Band {
        below: f64::INFINITY,
        label: "Excellent",
        advice: "Your respiratory and circulatory functions are optimal.",
    },
];

/// Các chỉ số có thang điểm, theo thứ tự hiển thị.
pub const SCORED_METRICS: [MetricKey; 3] = [MetricKey::Heart, MetricKey::Energy, MetricKey::Oxygen];

/// Chấm điểm `average`; `None` với chỉ số không có thang điểm hoặc giá trị không hữu hạn.
///
/// SpO2 dạng tỉ lệ (<= 1) được đổi sang phần trăm trước khi so ngưỡng.
pub fn score_metric(key: MetricKey, average: f64) -> Option<MetricScore> {
    if !average.is_finite() {
        return None;
    }

    let (bands, value) = match key {
        MetricKey::Heart => (&HEART_BANDS, average),
        MetricKey::Energy => (&ENERGY_BANDS, average),
        MetricKey::Oxygen if average <= 1.0 => (&OXYGEN_BANDS, average * 100.0),
        MetricKey::Oxygen => (&OXYGEN_BANDS, average),
        _ => return None,
    };

    let band = bands.iter().find(|band| value < band.below)?;
    Some(MetricScore {
        key,
        value,
        label: band.label.to_string(),
        advice: band.advice.to_string(),
    })
}

/// Điểm của mọi chỉ số có trung bình toàn kỳ.
pub fn patient_scores(patient: &Patient) -> Vec<MetricScore> {
    SCORED_METRICS
        .into_iter()
        .filter_map(|key| {
            let average = patient.metric(key)?.overall_avg?;
            score_metric(key, average)
        })
        .collect()
}
