use std::collections::BTreeMap;

use vitals_core::{
    chart_points, resolve, resolve_all, Gender, MetricKey, MetricSeries, Patient, PeriodEntry,
    Timeframe, TrendTone, NOT_AVAILABLE,
};

fn entry(period: &str, average: f64, evolution: Option<f64>) -> PeriodEntry {
    PeriodEntry {
        period: Some(period.to_string()),
        average: Some(average),
        evolution,
    }
}

fn patient_with(key: MetricKey, series: MetricSeries) -> Patient {
    let mut metrics = BTreeMap::new();
    metrics.insert(key.as_str().to_string(), series);
    Patient {
        id: "1".to_string(),
        given_name: "John".to_string(),
        family_name: "Doe".to_string(),
        gender: Gender::Male,
        birth_date: None,
        height_cm: Some(180.0),
        weight_kg: Some(75.0),
        metrics,
    }
}

#[test]
fn missing_metric_yields_sentinel_for_every_timeframe() {
    let patient = patient_with(MetricKey::Oxygen, MetricSeries::default());

    for timeframe in Timeframe::ALL {
        let resolved = resolve(Some(&patient), "heart", timeframe);
        assert_eq!(resolved.value, NOT_AVAILABLE);
        assert_eq!(resolved.trend, NOT_AVAILABLE);
    }
}

#[test]
fn daily_uses_last_entry_only() {
    let series = MetricSeries {
        daily_avg: vec![
            entry("2024-03-01", 70.004, Some(1.2)),
            entry("2024-03-02", 72.0, Some(-0.5)),
        ],
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Heart, series);

    let resolved = resolve(Some(&patient), "heart", Timeframe::Daily);
    assert_eq!(resolved.value, "72.00");
    assert_eq!(resolved.trend, "-0.50%");
    assert_eq!(resolved.tone(), Some(TrendTone::Negative));
}

#[test]
fn overall_formats_each_field_independently() {
    let series = MetricSeries {
        overall_avg: Some(98.456),
        overall_avg_ev: None,
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Oxygen, series);

    let resolved = resolve(Some(&patient), "oxygen", Timeframe::Overall);
    assert_eq!(resolved.value, "98.46");
    assert_eq!(resolved.trend, NOT_AVAILABLE);
    assert_eq!(resolved.tone(), None);
}

#[test]
fn yearly_reads_monthly_window() {
    let series = MetricSeries {
        daily_avg: vec![entry("2024-03-02", 10.0, Some(0.0))],
        monthly_avg: vec![
            entry("2024-02", 31.5, Some(0.0)),
            entry("2024-03", 33.25, Some(1.2)),
        ],
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Vo2max, series);

    let resolved = resolve(Some(&patient), "vo2max", Timeframe::Yearly);
    assert_eq!(resolved.value, "33.25");
    assert_eq!(resolved.trend, "+1.20%");
    assert_eq!(resolved.tone(), Some(TrendTone::Positive));
}

#[test]
fn empty_window_and_unknown_inputs_fall_back() {
    let series = MetricSeries {
        daily_avg: vec![entry("2024-03-02", 16.0, Some(2.0))],
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Respiratory, series);

    let weekly = resolve(Some(&patient), "respiratory", Timeframe::Weekly);
    assert!(!weekly.is_available());
    assert_eq!(weekly.trend, NOT_AVAILABLE);

    let unknown = resolve(Some(&patient), "steps", Timeframe::Daily);
    assert_eq!(unknown.value, NOT_AVAILABLE);

    let nobody = resolve(None, "respiratory", Timeframe::Daily);
    assert_eq!(nobody.value, NOT_AVAILABLE);
    assert_eq!(nobody.trend, NOT_AVAILABLE);
}

#[test]
fn zero_and_non_finite_trends() {
    let series = MetricSeries {
        daily_avg: vec![entry("2024-03-01", 400.0, Some(-0.0))],
        weekly_avg: vec![entry("2024-02-26/2024-03-03", 410.0, Some(f64::INFINITY))],
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Energy, series);

    let daily = resolve(Some(&patient), "energy", Timeframe::Daily);
    assert_eq!(daily.trend, "+0.00%");
    assert_eq!(daily.tone(), Some(TrendTone::Positive));

    let weekly = resolve(Some(&patient), "energy", Timeframe::Weekly);
    assert_eq!(weekly.value, "410.00");
    assert_eq!(weekly.trend, NOT_AVAILABLE);
}

#[test]
fn chart_points_follow_window_order() {
    let series = MetricSeries {
        daily_avg: vec![
            entry("2024-03-01", 70.004, Some(0.0)),
            PeriodEntry {
                period: Some("2024-03-02".to_string()),
                average: None,
                evolution: None,
            },
            entry("2024-03-03", 72.456, Some(3.5)),
        ],
        overall_avg: Some(71.0),
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Heart, series);

    let points = chart_points(Some(&patient), "heart", Timeframe::Daily);
    let values: Vec<f64> = points.iter().map(|point| point.value).collect();
    assert_eq!(values, vec![70.0, 72.46]);
    assert_eq!(points[1].label.as_deref(), Some("2024-03-03"));

    assert!(chart_points(Some(&patient), "heart", Timeframe::Overall).is_empty());
    assert!(chart_points(None, "heart", Timeframe::Daily).is_empty());
}

#[test]
fn resolve_all_lists_every_metric_in_display_order() {
    let series = MetricSeries {
        overall_avg: Some(72.0),
        overall_avg_ev: Some(0.25),
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Heart, series);

    let cards = resolve_all(Some(&patient), Timeframe::Overall);
    let keys: Vec<MetricKey> = cards.iter().map(|card| card.key).collect();
    assert_eq!(keys, MetricKey::ALL.to_vec());
    assert_eq!(cards[0].resolved.value, "72.00");
    assert_eq!(cards[0].resolved.trend, "+0.25%");
    assert_eq!(cards[0].unit, "bpm");
    assert!(cards[1..].iter().all(|card| !card.resolved.is_available()));
}

#[test]
fn card_and_chart_round_ties_the_same_way() {
    let series = MetricSeries {
        daily_avg: vec![
            entry("2024-03-01", 70.0, Some(0.0)),
            entry("2024-03-02", 72.125, Some(3.0)),
        ],
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Heart, series);

    let resolved = resolve(Some(&patient), "heart", Timeframe::Daily);
    let points = chart_points(Some(&patient), "heart", Timeframe::Daily);

    assert_eq!(resolved.value, "72.13");
    assert_eq!(points[1].value, 72.13);
    assert_eq!(format!("{:.2}", points[1].value), resolved.value);
}

#[test]
fn tiny_negative_trend_displays_as_zero() {
    let series = MetricSeries {
        daily_avg: vec![entry("2024-03-01", 400.0, Some(-0.001))],
        weekly_avg: vec![entry("2024-02-26/2024-03-03", 410.0, Some(-0.006))],
        ..MetricSeries::default()
    };
    let patient = patient_with(MetricKey::Energy, series);

    let daily = resolve(Some(&patient), "energy", Timeframe::Daily);
    assert_eq!(daily.trend, "+0.00%");
    assert_eq!(daily.tone(), Some(TrendTone::Positive));

    let weekly = resolve(Some(&patient), "energy", Timeframe::Weekly);
    assert_eq!(weekly.trend, "-0.01%");
    assert_eq!(weekly.tone(), Some(TrendTone::Negative));
}
