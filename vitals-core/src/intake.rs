//! Tiếp nhận bệnh nhân mới: kiểm tra biểu mẫu, nạp fixture chỉ số, rồi ghi vào danh sách.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DashboardError, Gender, MetricKey, MetricSeries, Patient, PatientStore};

/// Tệp được chọn trong biểu mẫu; chỉ là điều kiện mở khóa, nội dung không được đọc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
}

/// Dữ liệu thô từ biểu mẫu "New Patient".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDraft {
    pub given_name: String,
    pub family_name: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub upload: Option<UploadedFile>,
}

impl PatientDraft {
    /// Kiểm tra các trường bắt buộc; không có tác dụng phụ.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.given_name.trim().is_empty() {
            return Err(DashboardError::Validation {
                field: "First name",
            });
        }
        if self.family_name.trim().is_empty() {
            return Err(DashboardError::Validation { field: "Last name" });
        }
        self.required_gender()?;
        check_measurement(self.height_cm, "Height")?;
        check_measurement(self.weight_kg, "Weight")?;
        match &self.upload {
            Some(file) if !file.name.trim().is_empty() => Ok(()),
            _ => Err(DashboardError::MissingUpload),
        }
    }

    fn required_gender(&self) -> Result<Gender, DashboardError> {
        self.gender
            .ok_or(DashboardError::Validation { field: "Gender" })
    }
}

fn check_measurement(value: Option<f64>, field: &'static str) -> Result<(), DashboardError> {
    match value {
        Some(number) if !number.is_finite() || number <= 0.0 => {
            Err(DashboardError::Validation { field })
        }
        _ => Ok(()),
    }
}

/// Bệnh nhân đã hợp lệ và có đủ chỉ số, chờ được cấp mã định danh.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPatient {
    pub given_name: String,
    pub family_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub metrics: BTreeMap<String, MetricSeries>,
}

impl PreparedPatient {
    pub(crate) fn into_patient(self, id: String) -> Patient {
        Patient {
            id,
            given_name: self.given_name,
            family_name: self.family_name,
            gender: self.gender,
            birth_date: self.birth_date,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            metrics: self.metrics,
        }
    }
}

/// Nguồn tài liệu fixture, mỗi `MetricKey` một tài liệu.
#[allow(async_fn_in_trait)]
pub trait FixtureSource {
    async fn load(&self, key: MetricKey) -> Result<MetricSeries, DashboardError>;
}

/// Kiểm tra biểu mẫu rồi nạp lần lượt mọi fixture; một lỗi bất kỳ hủy toàn bộ thao tác.
pub async fn prepare_patient<S: FixtureSource>(
    draft: PatientDraft,
    source: &S,
) -> Result<PreparedPatient, DashboardError> {
    draft.validate()?;
    let gender = draft.required_gender()?;

    let mut metrics = BTreeMap::new();
    for key in MetricKey::ALL {
        let series = source.load(key).await.map_err(|err| match err {
            DashboardError::Fixture { .. } => err,
            other => DashboardError::Fixture {
                name: key.fixture_name().to_string(),
                reason: other.to_string(),
            },
        })?;
        tracing::debug!(metric = %key, "fixture loaded");
        metrics.insert(key.as_str().to_string(), series);
    }

    Ok(PreparedPatient {
        given_name: draft.given_name.trim().to_string(),
        family_name: draft.family_name.trim().to_string(),
        gender,
        birth_date: draft.birth_date,
        height_cm: draft.height_cm,
        weight_kg: draft.weight_kg,
        metrics,
    })
}

/// Chuẩn bị và thêm bệnh nhân; danh sách chỉ thay đổi khi mọi bước đều thành công.
pub async fn admit_patient<S: FixtureSource>(
    store: &mut PatientStore,
    draft: PatientDraft,
    source: &S,
) -> Result<Patient, DashboardError> {
    let prepared = match prepare_patient(draft, source).await {
        Ok(prepared) => prepared,
        Err(err) => {
            tracing::warn!("Patient intake aborted: {err}");
            return Err(err);
        }
    };
    Ok(store.add(prepared))
}
