use std::fs;

use serde_json::{json, Value};
use vitals_core::{resolve, DashboardError, MetricKey, Timeframe};
use vitals_kpi::{
    fixture_document, parse_fixture_str, parse_fixture_value, summarize_records_str,
    summarize_records_value,
};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn heart_records_match_golden_fixture() {
    let records = fs::read_to_string(fixture_path("heart_records.json"))
        .expect("Không đọc được bản ghi mẫu");

    let series =
        summarize_records_str(&records, MetricKey::Heart).expect("Không tổng hợp được bản ghi");
    let actual = fixture_document(&series);

    let expected = fs::read_to_string(fixture_path("heart_fixture.json"))
        .expect("Không đọc được golden fixture");
    let expected_value: Value = serde_json::from_str(&expected).expect("Golden không hợp lệ");

    assert_eq!(actual, expected_value);

    let reparsed = parse_fixture_str(&expected).expect("Không đọc lại được fixture");
    assert_eq!(reparsed, series);
}

#[test]
fn column_oriented_records_are_accepted() {
    let columns = json!({
        "type": [
            "HKQuantityTypeIdentifierOxygenSaturation",
            "HKQuantityTypeIdentifierOxygenSaturation",
            "HKQuantityTypeIdentifierHeartRate"
        ],
        "startDate": [
            "2024-03-01 08:00:00 +0000",
            "2024-03-01 20:00:00 +0000",
            "2024-03-01 20:00:00 +0000"
        ],
        "value": ["0.96", "0.98", "70"]
    });

    let series =
        summarize_records_value(&columns, MetricKey::Oxygen).expect("Không tổng hợp được cột");

    assert_eq!(series.daily_avg.len(), 1);
    assert_eq!(series.daily_avg[0].period.as_deref(), Some("2024-03-01"));
    assert_eq!(series.daily_avg[0].evolution, Some(0.0));
    assert_eq!(series.monthly_avg[0].period.as_deref(), Some("2024-03"));
    assert_eq!(series.overall_avg_ev, Some(0.0));
}

#[test]
fn no_matching_records_is_missing_data() {
    let records = json!([
        { "type": "HKQuantityTypeIdentifierStepCount", "startDate": "2024-03-01", "value": "10" }
    ]);

    let result = summarize_records_value(&records, MetricKey::Energy);
    assert_eq!(result, Err(DashboardError::MissingData));

    let invalid = summarize_records_str("{\"records\": 3", MetricKey::Energy);
    assert!(matches!(invalid, Err(DashboardError::Parse(_))));
}

#[test]
fn zero_previous_average_has_no_evolution() {
    let records = json!([
        { "type": "HKQuantityTypeIdentifierActiveEnergyBurned", "startDate": "2024-03-01", "value": 0 },
        { "type": "HKQuantityTypeIdentifierActiveEnergyBurned", "startDate": "2024-03-02", "value": 250 }
    ]);

    let series = summarize_records_value(&records, MetricKey::Energy).expect("Không tổng hợp được");

    assert_eq!(series.daily_avg[1].evolution, None);
    assert_eq!(series.overall_avg, Some(125.0));
    assert_eq!(series.overall_avg_ev, Some(0.0));
}

#[test]
fn fixture_nulls_become_absent_fields() {
    let document = json!({
        "status": "success",
        "data": {
            "daily_avg": [
                { "day": "2024-03-01", "daily_avg": 70.004, "evolution": 1.2 },
                { "day": "2024-03-02", "daily_avg": 72.0, "evolution": -0.5 }
            ],
            "weekly_avg": [
                { "week": "2024-02-26/2024-03-03", "weekly_avg": null }
            ],
            "overall_avg": 98.456,
            "overall_avg_ev": null
        }
    });

    let series = parse_fixture_value(&document).expect("Fixture hợp lệ");
    assert!(series.monthly_avg.is_empty());
    assert_eq!(series.weekly_avg[0].average, None);
    assert_eq!(series.overall_avg_ev, None);

    let mut patient = vitals_core::Patient {
        id: "1".to_string(),
        given_name: "John".to_string(),
        family_name: "Doe".to_string(),
        gender: vitals_core::Gender::Male,
        birth_date: None,
        height_cm: None,
        weight_kg: None,
        metrics: Default::default(),
    };
    patient.metrics.insert("heart".to_string(), series);

    let daily = resolve(Some(&patient), "heart", Timeframe::Daily);
    assert_eq!((daily.value.as_str(), daily.trend.as_str()), ("72.00", "-0.50%"));
    let weekly = resolve(Some(&patient), "heart", Timeframe::Weekly);
    assert_eq!((weekly.value.as_str(), weekly.trend.as_str()), ("N/A", "N/A"));
    let overall = resolve(Some(&patient), "heart", Timeframe::Overall);
    assert_eq!((overall.value.as_str(), overall.trend.as_str()), ("98.46", "N/A"));
}

#[test]
fn malformed_fixtures_are_rejected() {
    assert_eq!(
        parse_fixture_value(&json!({ "status": "success" })),
        Err(DashboardError::MissingData)
    );
    assert!(matches!(
        parse_fixture_value(&json!({ "status": "error", "data": {} })),
        Err(DashboardError::Parse(_))
    ));
    assert!(matches!(
        parse_fixture_value(&json!({ "data": [1, 2] })),
        Err(DashboardError::Parse(_))
    ));
    assert!(matches!(parse_fixture_str("not json"), Err(DashboardError::Parse(_))));
}
