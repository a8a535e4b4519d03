use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vitals_core::{
    admit_patient, metric_highlights, resolve_all, Gender, MetricKey, Patient, PatientDraft,
    PatientStore, SortKey, Timeframe, UploadedFile,
};
use vitals_kpi::{fixture_document, summarize_input_str, DirectoryFixtures};

#[derive(Parser, Debug)]
#[command(
    name = "vitals-cli",
    about = "Tổng hợp bản ghi sức khỏe và quản lý danh sách bệnh nhân từ dòng lệnh."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tổng hợp bản ghi thô thành tài liệu fixture cho một chỉ số.
    Summarize {
        /// File xuất XML của ứng dụng sức khỏe, hoặc bản ghi JSON.
        #[arg(short, long)]
        input: PathBuf,
        /// Chỉ số cần tổng hợp (heart, hrv, vo2max, respiratory, oxygen, energy).
        #[arg(short, long)]
        metric: MetricKey,
        /// Ghi ra file thay vì stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Thêm bệnh nhân mới, nạp chỉ số từ thư mục fixture.
    Admit {
        #[arg(long)]
        patients: PathBuf,
        #[arg(long)]
        fixtures: PathBuf,
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long)]
        gender: Gender,
        /// Tên file xuất từ ứng dụng sức khỏe.
        #[arg(long)]
        upload: String,
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Liệt kê bệnh nhân, có thể lọc và sắp xếp.
    List {
        #[arg(long)]
        patients: PathBuf,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },
    /// In các thẻ chỉ số của một bệnh nhân theo khung thời gian.
    Resolve {
        #[arg(long)]
        patients: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "daily")]
        timeframe: Timeframe,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    GivenName,
    FamilyName,
    Age,
    Gender,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::GivenName => SortKey::GivenName,
            SortArg::FamilyName => SortKey::FamilyName,
            SortArg::Age => SortKey::Age,
            SortArg::Gender => SortKey::Gender,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let today = Utc::now().date_naive();

    match args.command {
        Command::Summarize {
            input,
            metric,
            output,
        } => {
            let data = std::fs::read_to_string(&input)
                .with_context(|| format!("Không đọc được file {:?}", input))?;
            let series = summarize_input_str(&data, metric)?;
            let document = serde_json::to_string_pretty(&fixture_document(&series))?;

            match output {
                Some(path) => {
                    std::fs::write(&path, document)
                        .with_context(|| format!("Không ghi được file {:?}", path))?;
                    tracing::info!(metric = %metric, path = %path.display(), "fixture written");
                }
                None => println!("{document}"),
            }
        }
        Command::Admit {
            patients,
            fixtures,
            first,
            last,
            gender,
            upload,
            birth_date,
            height,
            weight,
        } => {
            let mut store = open_store(&patients)?;
            let draft = PatientDraft {
                given_name: first,
                family_name: last,
                gender: Some(gender),
                birth_date,
                height_cm: height,
                weight_kg: weight,
                upload: Some(UploadedFile { name: upload }),
            };
            let source = DirectoryFixtures::new(fixtures);
            let patient = admit_patient(&mut store, draft, &source).await?;
            save_store(&patients, &store)?;

            println!("Added patient {}: {}", patient.id, patient.full_name());
        }
        Command::List {
            patients,
            search,
            sort,
        } => {
            let store = open_store(&patients)?;
            let mut listed = store.search(search.as_deref().unwrap_or(""));
            if let Some(sort) = sort {
                vitals_core::sort_patients(&mut listed, sort.into(), today);
            }

            if listed.is_empty() {
                println!("No patients.");
            }
            for patient in listed {
                print_patient_line(patient, today);
            }
        }
        Command::Resolve {
            patients,
            id,
            timeframe,
        } => {
            let store = open_store(&patients)?;
            let Some(patient) = store.get(&id) else {
                bail!("Không tìm thấy bệnh nhân {id}");
            };

            println!("{} ({timeframe})", patient.full_name());
            for card in resolve_all(Some(patient), timeframe) {
                println!(
                    "  {:<28} {:>10} {:<12} {}",
                    card.title, card.resolved.value, card.unit, card.resolved.trend
                );
            }
            for line in metric_highlights(Some(patient), timeframe) {
                println!("- {line}");
            }
        }
    }

    Ok(())
}

/// Nạp danh sách từ file; file chưa tồn tại là danh sách rỗng.
fn open_store(path: &Path) -> anyhow::Result<PatientStore> {
    let snapshot = if path.exists() {
        std::fs::read_to_string(path).with_context(|| format!("Không đọc được file {:?}", path))?
    } else {
        String::new()
    };
    PatientStore::from_json(&snapshot)
        .with_context(|| format!("Danh sách bệnh nhân hỏng: {:?}", path))
}

/// Ghi toàn bộ danh sách; lỗi ghi làm lệnh thất bại.
fn save_store(path: &Path, store: &PatientStore) -> anyhow::Result<()> {
    let snapshot = store.to_json()?;
    std::fs::write(path, snapshot).with_context(|| format!("Không ghi được file {:?}", path))
}

fn print_patient_line(patient: &Patient, today: NaiveDate) {
    let age = patient
        .age_on(today)
        .map(|age| age.to_string())
        .unwrap_or_else(|| vitals_core::NOT_AVAILABLE.to_string());
    println!(
        "{:>4}  {:<32} {:<7} {}",
        patient.id,
        patient.full_name(),
        patient.gender.label(),
        age
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vitals-cli-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("Không tạo được thư mục tạm");
        dir
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = scratch_dir("unwritable");
        let store = PatientStore::new();

        // Đường dẫn là một thư mục nên không thể ghi.
        let err = save_store(&dir, &store).expect_err("Ghi vào thư mục phải lỗi");
        assert!(err.to_string().contains("Không ghi được file"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn saved_store_reopens() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("patients.json");

        let empty = open_store(&path).expect("File chưa có là danh sách rỗng");
        assert!(empty.is_empty());

        save_store(&path, &empty).expect("Phải ghi được danh sách");
        let reopened = open_store(&path).expect("Phải đọc lại được danh sách");
        assert_eq!(reopened.list(), empty.list());

        std::fs::remove_dir_all(&dir).ok();
    }
}
