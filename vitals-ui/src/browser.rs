#![cfg(target_arch = "wasm32")]
//! Cầu nối trình duyệt: local storage cho danh sách bệnh nhân và tải fixture qua HTTP.

use vitals_core::{DashboardError, FixtureSource, MetricKey, MetricSeries, Patient, PatientStore};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Response, Storage};

/// Mở danh sách đã lưu dưới `key`; dữ liệu hỏng được bỏ qua và danh sách bắt đầu rỗng.
pub fn open_store(key: &str) -> PatientStore {
    let snapshot = match local_storage().and_then(|storage| read_item(&storage, key)) {
        Ok(snapshot) => snapshot.unwrap_or_default(),
        Err(err) => {
            console::warn_1(&JsValue::from_str(&format!(
                "Không đọc được local storage: {err}"
            )));
            String::new()
        }
    };

    let store = PatientStore::from_json(&snapshot).unwrap_or_else(|err| {
        console::warn_1(&JsValue::from_str(&format!(
            "Bỏ qua danh sách bệnh nhân đã lưu: {err}"
        )));
        PatientStore::new()
    });

    let key = key.to_string();
    store.on_change(Box::new(move |patients: &[Patient]| {
        save_patients(&key, patients)
    }))
}

fn save_patients(key: &str, patients: &[Patient]) -> Result<(), DashboardError> {
    let snapshot = serde_json::to_string(patients)
        .map_err(|err| DashboardError::Storage(err.to_string()))?;
    local_storage()?
        .set_item(key, &snapshot)
        .map_err(|err| DashboardError::Storage(js_message(&err)))
}

fn local_storage() -> Result<Storage, DashboardError> {
    web_sys::window()
        .ok_or_else(|| DashboardError::Storage("no window".to_string()))?
        .local_storage()
        .map_err(|err| DashboardError::Storage(js_message(&err)))?
        .ok_or_else(|| DashboardError::Storage("local storage is unavailable".to_string()))
}

fn read_item(storage: &Storage, key: &str) -> Result<Option<String>, DashboardError> {
    storage
        .get_item(key)
        .map_err(|err| DashboardError::Storage(js_message(&err)))
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Fixture phục vụ tĩnh dưới `base_url`, mỗi chỉ số một tệp.
#[derive(Debug, Clone)]
pub struct HttpFixtures {
    base_url: String,
}

impl HttpFixtures {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, key: MetricKey) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            key.fixture_name()
        )
    }

    async fn fetch_text(&self, url: &str) -> Result<String, String> {
        let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|err| js_message(&err))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| "fetch did not return a Response".to_string())?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }

        let body = response.text().map_err(|err| js_message(&err))?;
        let text = JsFuture::from(body).await.map_err(|err| js_message(&err))?;
        text.as_string()
            .ok_or_else(|| "response body is not text".to_string())
    }
}

impl FixtureSource for HttpFixtures {
    async fn load(&self, key: MetricKey) -> Result<MetricSeries, DashboardError> {
        let url = self.url_for(key);
        let fixture_error = |reason: String| DashboardError::Fixture {
            name: key.fixture_name().to_string(),
            reason,
        };

        let text = self
            .fetch_text(&url)
            .await
            .map_err(|reason| fixture_error(format!("{url}: {reason}")))?;
        vitals_kpi::parse_fixture_str(&text).map_err(|err| fixture_error(err.to_string()))
    }
}
