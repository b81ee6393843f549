//! 临床建议查询

use ehr_core::{EhrError, Result};
use std::collections::HashMap;

/// 通用建议必须覆盖的条目：(小写关键字, 名称)
const REQUIRED_FALLBACK: [(&str, &str); 2] = [
    ("specialist", "specialist consultation"),
    ("correlation", "clinical correlation"),
];

/// 诊断名称到临床建议的映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationTable {
    entries: HashMap<String, Vec<String>>,
    fallback: Vec<String>,
}

impl RecommendationTable {
    /// 创建建议表，任何一组建议都不能为空
    ///
    /// 通用建议必须包含专科会诊和临床关联两类条目。
    pub fn new(entries: HashMap<String, Vec<String>>, fallback: Vec<String>) -> Result<Self> {
        if fallback.is_empty() {
            return Err(EhrError::Config(
                "Fallback recommendations cannot be empty".to_string(),
            ));
        }
        for (required, label) in REQUIRED_FALLBACK {
            if !fallback.iter().any(|r| r.to_lowercase().contains(required)) {
                return Err(EhrError::Config(format!(
                    "Fallback recommendations must include a {} entry",
                    label
                )));
            }
        }
        if let Some((condition, _)) = entries.iter().find(|(_, list)| list.is_empty()) {
            return Err(EhrError::Config(format!(
                "Recommendations for {} cannot be empty",
                condition
            )));
        }

        Ok(Self { entries, fallback })
    }

    /// 标准建议表，覆盖标准规则表的所有诊断
    pub fn standard() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("Glioblastoma Multiforme", &[
                "URGENT: Immediate neurosurgical consultation",
                "MRI with contrast for surgical planning",
                "Neuro-oncology referral required",
            ]),
            ("Meningioma", &[
                "Neurosurgical consultation recommended",
                "Serial MRI monitoring every 6 months",
                "Symptom assessment required",
            ]),
            ("Pituitary Adenoma", &[
                "Endocrinology referral for hormonal panel",
                "Dedicated pituitary MRI protocol",
                "Visual field assessment recommended",
            ]),
            ("Intracranial Neoplasm", &[
                "Contrast-enhanced MRI for characterisation",
                "Neurosurgical consultation recommended",
                "Multidisciplinary tumor board review",
            ]),
            ("Acute Ischemic Stroke", &[
                "URGENT: Activate stroke protocol",
                "Assess eligibility for thrombolysis or thrombectomy",
                "CT angiography of head and neck",
            ]),
            ("Suspected Cerebrovascular Event", &[
                "Urgent neurology assessment",
                "Dedicated stroke imaging (MRI DWI or CT perfusion)",
            ]),
            ("Bone Fracture", &[
                "Orthopedic consultation recommended",
                "Immobilisation and analgesia",
                "Follow-up radiograph in 2 weeks",
            ]),
            ("Skull Fracture", &[
                "URGENT: Neurosurgical review",
                "Observe for neurological deterioration",
                "Assess for underlying intracranial injury",
            ]),
            ("Community-Acquired Pneumonia", &[
                "Initiate empirical antibiotic therapy",
                "Monitor oxygen saturation",
                "Follow-up chest X-ray in 6 weeks",
            ]),
            ("Suspected Pneumonia", &[
                "Clinical assessment for infection markers",
                "Dedicated chest radiograph for confirmation",
            ]),
            ("Normal MRI Brain", &[
                "No acute intervention required",
                "Continue routine preventive care",
                "Follow-up as clinically indicated",
            ]),
            ("Normal CT Head", &[
                "No acute intervention required",
                "Continue routine preventive care",
                "Follow-up as clinically indicated",
            ]),
            ("Normal Chest X-Ray", &[
                "No acute intervention required",
                "Continue routine preventive care",
                "Follow-up as clinically indicated",
            ]),
            ("Mild Cerebral Atrophy", &[
                "Correlate with cognitive assessment",
                "Routine follow-up as clinically indicated",
            ]),
            ("No Acute Intracranial Abnormality", &[
                "No acute intervention required",
                "Follow-up as clinically indicated",
            ]),
            ("No Acute Cardiopulmonary Process", &[
                "No acute intervention required",
                "Follow-up as clinically indicated",
            ]),
        ];

        let entries = table
            .iter()
            .map(|(condition, list)| {
                (
                    condition.to_string(),
                    list.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();

        Self {
            entries,
            fallback: vec![
                "Specialist consultation recommended".to_string(),
                "Clinical correlation advised".to_string(),
            ],
        }
    }

    /// 按诊断名称精确查找建议，未收录的诊断返回通用建议
    pub fn recommend(&self, condition: &str) -> &[String] {
        self.entries
            .get(condition)
            .map(Vec::as_slice)
            .unwrap_or(self.fallback.as_slice())
    }

    pub fn contains(&self, condition: &str) -> bool {
        self.entries.contains_key(condition)
    }

    pub fn fallback(&self) -> &[String] {
        &self.fallback
    }
}

impl Default for RecommendationTable {
    fn default() -> Self {
        Self::standard()
    }
}
