use std::collections::BTreeMap;

use chrono::NaiveDate;
use vitals_core::{sort_patients, Gender, Patient, PatientStore, SortKey, NOT_AVAILABLE};

fn patient(id: &str, given: &str, family: &str, gender: Gender, birth: Option<&str>) -> Patient {
    Patient {
        id: id.to_string(),
        given_name: given.to_string(),
        family_name: family.to_string(),
        gender,
        birth_date: birth.and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()),
        height_cm: None,
        weight_kg: None,
        metrics: BTreeMap::new(),
    }
}

fn sample_store() -> PatientStore {
    PatientStore::with_patients(vec![
        patient("1", "John", "Doe", Gender::Male, Some("1985-06-15")),
        patient("2", "Jane", "Smith", Gender::Female, Some("1992-09-23")),
        patient("3", "Alice", "Johnson", Gender::Female, Some("1978-04-12")),
        patient("4", "Sam", "Avery", Gender::Other, None),
    ])
}

fn ids(patients: &[&Patient]) -> Vec<String> {
    patients.iter().map(|patient| patient.id.clone()).collect()
}

#[test]
fn search_matches_full_name_case_insensitively() {
    let store = sample_store();

    assert_eq!(ids(&store.search("jo")), vec!["1", "3"]);
    assert_eq!(ids(&store.search("JANE SM")), vec!["2"]);
    assert_eq!(store.search("  ").len(), 4);
    assert!(store.search("zelda").is_empty());
}

#[test]
fn sorting_by_each_key() {
    let store = sample_store();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("Ngày không hợp lệ");

    assert_eq!(ids(&store.sorted(SortKey::GivenName, today)), vec!["3", "2", "1", "4"]);
    assert_eq!(ids(&store.sorted(SortKey::FamilyName, today)), vec!["4", "1", "3", "2"]);
    assert_eq!(ids(&store.sorted(SortKey::Age, today)), vec!["2", "1", "3", "4"]);
    assert_eq!(ids(&store.sorted(SortKey::Gender, today)), vec!["1", "2", "3", "4"]);

    let mut found = store.search("j");
    sort_patients(&mut found, SortKey::FamilyName, today);
    assert_eq!(ids(&found), vec!["1", "3", "2"]);
}

#[test]
fn age_counts_completed_years() {
    let jane = patient("2", "Jane", "Smith", Gender::Female, Some("1992-09-23"));

    let before = NaiveDate::from_ymd_opt(2024, 9, 22).expect("Ngày không hợp lệ");
    let on = NaiveDate::from_ymd_opt(2024, 9, 23).expect("Ngày không hợp lệ");
    let past = NaiveDate::from_ymd_opt(1990, 1, 1).expect("Ngày không hợp lệ");

    assert_eq!(jane.age_on(before), Some(31));
    assert_eq!(jane.age_on(on), Some(32));
    assert_eq!(jane.age_on(past), None);
}

#[test]
fn overview_marks_missing_fields() {
    let mut sam = patient("4", "Sam", " ", Gender::Other, None);
    sam.height_cm = Some(172.5);

    let fields = sam.overview_fields();
    let lookup = |label: &str| {
        fields
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| value.clone())
            .expect("Thiếu trường tổng quan")
    };

    assert_eq!(lookup("Name"), "Sam");
    assert_eq!(lookup("Last Name"), NOT_AVAILABLE);
    assert_eq!(lookup("Birth Date"), NOT_AVAILABLE);
    assert_eq!(lookup("Height (cm)"), "172.5");
    assert_eq!(lookup("Weight (kg)"), NOT_AVAILABLE);
}

#[test]
fn json_snapshot_restores_the_same_list() {
    let store = sample_store();
    let snapshot = store.to_json().expect("Không serialize được danh sách");

    let restored = PatientStore::from_json(&snapshot).expect("Không đọc lại được danh sách");
    assert_eq!(restored.list(), store.list());
    assert_eq!(restored.get("3").map(Patient::full_name).as_deref(), Some("Alice Johnson"));

    assert!(PatientStore::from_json("").expect("Chuỗi rỗng hợp lệ").is_empty());
    assert!(PatientStore::from_json("{not json").is_err());
}
