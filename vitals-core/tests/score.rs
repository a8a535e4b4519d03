use std::collections::BTreeMap;

use vitals_core::{patient_scores, score_metric, Gender, MetricKey, MetricSeries, Patient};

fn label(key: MetricKey, average: f64) -> String {
    score_metric(key, average)
        .expect("Chỉ số phải có điểm")
        .label
}

#[test]
fn heart_rate_band_boundaries() {
    assert_eq!(label(MetricKey::Heart, 49.9), "Critical");
    assert_eq!(label(MetricKey::Heart, 50.0), "Ideal");
    assert_eq!(label(MetricKey::Heart, 69.9), "Ideal");
    assert_eq!(label(MetricKey::Heart, 70.0), "Normal");
    assert_eq!(label(MetricKey::Heart, 89.9), "Normal");
    assert_eq!(label(MetricKey::Heart, 90.0), "High");
}

#[test]
fn active_energy_band_boundaries() {
    assert_eq!(label(MetricKey::Energy, 199.0), "Low");
    assert_eq!(label(MetricKey::Energy, 200.0), "Moderate");
    assert_eq!(label(MetricKey::Energy, 499.0), "Moderate");
    assert_eq!(label(MetricKey::Energy, 500.0), "Active");
    assert_eq!(label(MetricKey::Energy, 799.0), "Active");
    assert_eq!(label(MetricKey::Energy, 800.0), "Intense");
}

#[test]
fn oxygen_band_boundaries_in_percent_and_fraction() {
    assert_eq!(label(MetricKey::Oxygen, 89.5), "Critical");
    assert_eq!(label(MetricKey::Oxygen, 90.0), "Low");
    assert_eq!(label(MetricKey::Oxygen, 93.9), "Low");
    assert_eq!(label(MetricKey::Oxygen, 94.0), "Normal");
    assert_eq!(label(MetricKey::Oxygen, 96.9), "Normal");
    assert_eq!(label(MetricKey::Oxygen, 97.0), "Excellent");

    let fraction = score_metric(MetricKey::Oxygen, 0.5).expect("SpO2 dạng tỉ lệ phải có điểm");
    assert_eq!(fraction.value, 50.0);
    assert_eq!(fraction.label, "Critical");
}

#[test]
fn unscored_metrics_and_non_finite_values() {
    assert!(score_metric(MetricKey::Hrv, 45.0).is_none());
    assert!(score_metric(MetricKey::Respiratory, 16.0).is_none());
    assert!(score_metric(MetricKey::Heart, f64::NAN).is_none());
}

#[test]
fn patient_scores_use_overall_averages() {
    let mut metrics = BTreeMap::new();
    metrics.insert(
        MetricKey::Energy.as_str().to_string(),
        MetricSeries {
            overall_avg: Some(650.0),
            ..MetricSeries::default()
        },
    );
    metrics.insert(
        MetricKey::Heart.as_str().to_string(),
        MetricSeries::default(),
    );
    let patient = Patient {
        id: "1".to_string(),
        given_name: "Jane".to_string(),
        family_name: "Roe".to_string(),
        gender: Gender::Female,
        birth_date: None,
        height_cm: None,
        weight_kg: None,
        metrics,
    };

    let scores = patient_scores(&patient);
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].key, MetricKey::Energy);
    assert_eq!(
        scores[0].summary(),
        "Calories Burned score: Active (650 kcal). Very good! You are maintaining a good fitness level."
    );
}
