//! Danh sách bệnh nhân trong phiên làm việc, với lưu trữ được tiêm từ bên ngoài.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::{DashboardError, Patient, PreparedPatient};

/// Callback lưu trữ, được gọi sau mỗi thay đổi với toàn bộ danh sách.
pub type PersistFn = Box<dyn Fn(&[Patient]) -> Result<(), DashboardError>>;

/// Tiêu chí sắp xếp ở thanh bên.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    GivenName,
    FamilyName,
    Age,
    Gender,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::GivenName,
        SortKey::FamilyName,
        SortKey::Age,
        SortKey::Gender,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::GivenName => "Name",
            SortKey::FamilyName => "Last Name",
            SortKey::Age => "Age",
            SortKey::Gender => "Gender",
        }
    }
}

#[derive(Default)]
pub struct PatientStore {
    patients: Vec<Patient>,
    persist: Option<PersistFn>,
}

impl fmt::Debug for PatientStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatientStore")
            .field("patients", &self.patients)
            .field("persist", &self.persist.is_some())
            .finish()
    }
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Khởi tạo từ danh sách đã lưu trước đó.
    pub fn with_patients(patients: Vec<Patient>) -> Self {
        Self {
            patients,
            persist: None,
        }
    }

    /// Đọc ảnh chụp JSON (mảng bệnh nhân) từ khóa lưu trữ.
    pub fn from_json(snapshot: &str) -> Result<Self, DashboardError> {
        if snapshot.trim().is_empty() {
            return Ok(Self::new());
        }
        let patients: Vec<Patient> =
            serde_json::from_str(snapshot).map_err(|err| DashboardError::Parse(err.to_string()))?;
        Ok(Self::with_patients(patients))
    }

    pub fn to_json(&self) -> Result<String, DashboardError> {
        serde_json::to_string(&self.patients).map_err(|err| DashboardError::Storage(err.to_string()))
    }

    /// Gắn callback lưu trữ.
    pub fn on_change(mut self, persist: PersistFn) -> Self {
        self.persist = Some(persist);
        self
    }

    pub fn list(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|patient| patient.id == id)
    }

    /// Thêm bệnh nhân đã chuẩn bị; mã định danh là số thứ tự kế tiếp.
    pub fn add(&mut self, prepared: PreparedPatient) -> Patient {
        let id = (self.patients.len() + 1).to_string();
        let patient = prepared.into_patient(id);
        self.patients.push(patient.clone());
        tracing::info!(id = %patient.id, total = self.patients.len(), "patient added");

        if let Some(persist) = &self.persist {
            if let Err(err) = persist(&self.patients) {
                tracing::warn!("Failed to persist patient list: {err}");
            }
        }

        patient
    }

    /// Lọc theo họ tên, không phân biệt hoa thường.
    pub fn search(&self, query: &str) -> Vec<&Patient> {
        let needle = query.trim().to_lowercase();
        self.patients
            .iter()
            .filter(|patient| {
                needle.is_empty()
                    || format!("{} {}", patient.given_name, patient.family_name)
                        .to_lowercase()
                        .contains(&needle)
            })
            .collect()
    }

    /// Sắp xếp ổn định theo `key`; tuổi tính tại `today`, bệnh nhân thiếu ngày sinh xếp cuối.
    pub fn sorted(&self, key: SortKey, today: NaiveDate) -> Vec<&Patient> {
        let mut patients: Vec<&Patient> = self.patients.iter().collect();
        sort_patients(&mut patients, key, today);
        patients
    }
}

/// Sắp xếp một tập con bệnh nhân (ví dụ kết quả của `search`).
pub fn sort_patients(patients: &mut [&Patient], key: SortKey, today: NaiveDate) {
    patients.sort_by(|a, b| match key {
        SortKey::GivenName => compare_text(&a.given_name, &b.given_name),
        SortKey::FamilyName => compare_text(&a.family_name, &b.family_name),
        SortKey::Gender => a.gender.cmp(&b.gender),
        SortKey::Age => match (a.age_on(today), b.age_on(today)) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    });
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
