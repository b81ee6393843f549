//! 患者目录与查询处理器

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use ehr_core::{EhrError, Gender, Patient, Result, ScanType};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use tracing::info;

use crate::error::ApiResult;
use crate::server::AppState;

/// 只读患者目录
#[derive(Debug, Clone, Default)]
pub struct PatientDirectory {
    patients: Vec<Patient>,
}

impl PatientDirectory {
    pub fn new(patients: Vec<Patient>) -> Result<Self> {
        let mut seen = HashSet::new();
        for patient in &patients {
            if !seen.insert(patient.patient_id.as_str()) {
                return Err(EhrError::Config(format!(
                    "Duplicate patient id {}",
                    patient.patient_id
                )));
            }
        }

        Ok(Self { patients })
    }

    /// 演示用患者数据
    pub fn demo() -> Self {
        let patient = |id: &str, name: &str, age, gender, diagnosis: &str, history: &str| Patient {
            patient_id: id.to_string(),
            name: name.to_string(),
            age,
            gender,
            diagnosis: diagnosis.to_string(),
            medical_history: history.to_string(),
            scan_type: ScanType::Mri,
        };

        Self {
            patients: vec![
                patient("P001", "John Smith", 45, Gender::Male, "Glioma", "Headaches, vision problems"),
                patient("P002", "Sarah Johnson", 38, Gender::Female, "Meningioma", "Seizures, memory loss"),
                patient("P003", "Mike Wilson", 52, Gender::Male, "Pituitary", "Hormonal imbalance"),
            ],
        }
    }

    /// 从JSON文件加载患者列表
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let patients: Vec<Patient> = serde_json::from_str(&content)?;
        Self::new(patients)
    }

    pub fn get(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.patient_id == patient_id)
    }

    /// 按姓名或患者ID做大小写不敏感的子串搜索，保持原有顺序
    pub fn search(&self, query: &str) -> Vec<&Patient> {
        let query = query.trim().to_lowercase();
        self.patients
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.patient_id.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

/// 患者详情（附带摘要和影像链接）
#[derive(Debug, Serialize)]
pub struct PatientDetails {
    #[serde(flatten)]
    pub patient: Patient,
    pub medical_summary: String,
    pub scan_images: Vec<String>,
}

/// 患者搜索参数
#[derive(Debug, Deserialize)]
pub struct PatientSearchParams {
    #[serde(default)]
    pub query: String,
}

fn clinical_text(patient: &Patient) -> String {
    format!(
        "Patient: {}, Age: {}, Gender: {}. Medical History: {}. Diagnosis: {}",
        patient.name, patient.age, patient.gender, patient.medical_history, patient.diagnosis
    )
}

/// 患者详情处理器
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<Json<PatientDetails>> {
    info!("Getting patient {}", patient_id);

    let patient = state
        .patients
        .get(&patient_id)
        .ok_or_else(|| EhrError::NotFound("Patient not found".to_string()))?;

    let medical_summary = state.summarizer.summarize(&clinical_text(patient));
    let scan_images = vec![format!(
        "/images/{}/sample1.jpg",
        patient.diagnosis.to_lowercase()
    )];

    Ok(Json(PatientDetails {
        patient: patient.clone(),
        medical_summary,
        scan_images,
    }))
}

/// 患者搜索处理器
pub async fn search_patients(
    State(state): State<AppState>,
    Query(params): Query<PatientSearchParams>,
) -> impl IntoResponse {
    info!("Searching patients with query: {:?}", params.query);

    let patients = state.patients.search(&params.query);
    Json(json!({ "patients": patients }))
}
