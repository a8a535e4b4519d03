use vitals_core::{DashboardConfig, Timeframe};

#[test]
fn partial_config_fills_defaults() {
    let config: DashboardConfig = serde_json::from_str(r#"{ "storage_key": "ward-7" }"#)
        .expect("Config một phần phải hợp lệ");

    assert_eq!(config.storage_key, "ward-7");
    assert_eq!(config.fixture_base_url, DashboardConfig::default().fixture_base_url);
    assert_eq!(config.default_timeframe, Timeframe::Daily);
}

#[test]
fn timeframe_accepts_lowercase_and_variant_names() {
    let lower: DashboardConfig = serde_json::from_str(r#"{ "default_timeframe": "weekly" }"#)
        .expect("Tên viết thường phải hợp lệ");
    let variant: DashboardConfig = serde_json::from_str(r#"{ "default_timeframe": "Yearly" }"#)
        .expect("Tên biến thể phải hợp lệ");

    assert_eq!(lower.default_timeframe, Timeframe::Weekly);
    assert_eq!(variant.default_timeframe, Timeframe::Yearly);
    assert_eq!(
        "weekly".parse::<Timeframe>().expect("FromStr phải nhận tên viết thường"),
        lower.default_timeframe
    );
}
