//! 诊断规则引擎
//!
//! 有序的关键字规则表。规则按声明顺序逐条评估，第一条命中的规则生效，
//! 因此更具体的规则必须排在更宽泛的规则之前。没有规则命中时返回该检查类型的默认诊断。

use ehr_core::{DiagnosisRecord, EhrError, Result, ScanType, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 诊断规则
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosisRule {
    pub keywords: Vec<String>,          // 触发关键字（小写子串）
    #[serde(default)]
    pub scan_type: Option<ScanType>,    // 检查类型限制，None 表示不限
    #[serde(flatten)]
    pub record: DiagnosisRecord,
}

impl DiagnosisRule {
    /// 创建规则，关键字统一转为小写
    pub fn new(keywords: &[&str], scan_type: Option<ScanType>, record: DiagnosisRecord) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            scan_type,
            record,
        }
    }

    /// 规则是否命中（filename 需已转为小写）
    fn matches(&self, filename: &str, scan_type: ScanType) -> bool {
        let scan_type_ok = self.scan_type.map_or(true, |restriction| restriction == scan_type);
        scan_type_ok && self.keywords.iter().any(|keyword| filename.contains(keyword.as_str()))
    }
}

/// 各检查类型的默认诊断
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultRecords {
    #[serde(rename = "MRI")]
    pub mri: DiagnosisRecord,
    #[serde(rename = "CT")]
    pub ct: DiagnosisRecord,
    #[serde(rename = "X-RAY")]
    pub x_ray: DiagnosisRecord,
}

impl DefaultRecords {
    pub fn for_scan(&self, scan_type: ScanType) -> &DiagnosisRecord {
        match scan_type {
            ScanType::Mri => &self.mri,
            ScanType::Ct => &self.ct,
            ScanType::XRay => &self.x_ray,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &DiagnosisRecord> {
        ScanType::ALL.into_iter().map(move |scan_type| self.for_scan(scan_type))
    }
}

/// 有序规则表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<DiagnosisRule>,
    defaults: DefaultRecords,
}

impl RuleSet {
    /// 由外部提供的规则创建规则表，顺序保持不变
    pub fn new(rules: Vec<DiagnosisRule>, defaults: DefaultRecords) -> Result<Self> {
        let rules: Vec<DiagnosisRule> = rules
            .into_iter()
            .map(|mut rule| {
                rule.keywords = rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .collect();
                rule
            })
            .collect();

        let rule_set = Self { rules, defaults };
        rule_set.validate()?;
        Ok(rule_set)
    }

    /// 标准规则表
    pub fn standard() -> Self {
        use ScanType::{Ct, Mri, XRay};

        const STROKE: &[&str] = &["stroke", "infarct", "ischemi"];
        const SKULL_FRACTURE: &[&str] = &["skull_fracture", "skull-fracture", "skull fracture"];
        const FRACTURE: &[&str] = &["fracture"];
        const PNEUMONIA: &[&str] = &["pneumonia", "consolidation"];
        const NORMAL: &[&str] = &["normal", "healthy"];

        fn rule(
            keywords: &[&str],
            scan_type: Option<ScanType>,
            condition: &str,
            confidence: u8,
            severity: Severity,
            description: &str,
        ) -> DiagnosisRule {
            DiagnosisRule::new(
                keywords,
                scan_type,
                DiagnosisRecord::new(condition, confidence, severity, description),
            )
        }

        let rules = vec![
            // 肿瘤：具体类型在前，泛指在后
            rule(&["glioma"], None, "Glioblastoma Multiforme", 91, Severity::High,
                "Aggressive primary brain tumor detected"),
            rule(&["meningioma"], None, "Meningioma", 88, Severity::Medium,
                "Well-circumscribed brain tumor detected"),
            rule(&["pituitary"], None, "Pituitary Adenoma", 86, Severity::Medium,
                "Sellar mass consistent with pituitary adenoma"),
            rule(&["tumor", "tumour", "mass", "neoplasm"], None, "Intracranial Neoplasm", 79, Severity::High,
                "Space-occupying lesion requiring further characterisation"),
            // 卒中
            rule(STROKE, Some(Mri), "Acute Ischemic Stroke", 89, Severity::High,
                "Restricted diffusion within a vascular territory"),
            rule(STROKE, Some(Ct), "Acute Ischemic Stroke", 82, Severity::High,
                "Early ischemic changes on non-contrast imaging"),
            rule(STROKE, None, "Suspected Cerebrovascular Event", 70, Severity::High,
                "Findings suggestive of a cerebrovascular event"),
            // 骨折：不限检查类型，"fracture" 本身含有 CT 识别关键字 "ct"
            rule(SKULL_FRACTURE, None, "Skull Fracture", 87, Severity::High,
                "Calvarial fracture line identified"),
            rule(FRACTURE, None, "Bone Fracture", 90, Severity::Medium,
                "Cortical discontinuity consistent with fracture"),
            // 肺炎
            rule(PNEUMONIA, Some(XRay), "Community-Acquired Pneumonia", 87, Severity::Medium,
                "Focal airspace consolidation identified"),
            rule(PNEUMONIA, Some(Ct), "Community-Acquired Pneumonia", 89, Severity::Medium,
                "Lobar consolidation with air bronchograms"),
            rule(PNEUMONIA, None, "Suspected Pneumonia", 70, Severity::Medium,
                "Findings may represent infectious consolidation"),
            // 正常
            rule(NORMAL, Some(Mri), "Normal MRI Brain", 96, Severity::None,
                "No abnormalities detected"),
            rule(NORMAL, Some(Ct), "Normal CT Head", 96, Severity::None,
                "No abnormalities detected"),
            rule(NORMAL, Some(XRay), "Normal Chest X-Ray", 96, Severity::None,
                "No abnormalities detected"),
        ];

        let defaults = DefaultRecords {
            mri: DiagnosisRecord::new("Mild Cerebral Atrophy", 92, Severity::None,
                "Age-appropriate volume loss, no acute intracranial findings"),
            ct: DiagnosisRecord::new("No Acute Intracranial Abnormality", 94, Severity::None,
                "No acute pathology identified"),
            x_ray: DiagnosisRecord::new("No Acute Cardiopulmonary Process", 93, Severity::None,
                "No acute findings identified"),
        };

        Self { rules, defaults }
    }

    /// 校验规则表
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(EhrError::Config(format!(
                    "Rule #{} ({}) has an empty keyword",
                    index + 1,
                    rule.record.condition
                )));
            }
            check_record(&rule.record)?;
        }

        for record in self.defaults.iter() {
            check_record(record)?;
        }

        Ok(())
    }

    /// 按文件名和检查类型匹配诊断
    pub fn match_diagnosis(&self, filename: &str, scan_type: ScanType) -> &DiagnosisRecord {
        let filename = filename.to_lowercase();

        match self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(&filename, scan_type))
        {
            Some((index, rule)) => {
                debug!("Rule #{} matched '{}': {}", index + 1, filename, rule.record.condition);
                &rule.record
            }
            None => {
                debug!("No rule matched '{}', using {} default", filename, scan_type);
                self.defaults.for_scan(scan_type)
            }
        }
    }

    /// 规则表可能产生的全部诊断名称（包括默认诊断）
    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|rule| &rule.record)
            .chain(self.defaults.iter())
            .map(|record| record.condition.as_str())
    }

    pub fn rules(&self) -> &[DiagnosisRule] {
        &self.rules
    }

    pub fn defaults(&self) -> &DefaultRecords {
        &self.defaults
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_record(record: &DiagnosisRecord) -> Result<()> {
    if record.condition.trim().is_empty() {
        return Err(EhrError::Config("Diagnosis condition cannot be empty".to_string()));
    }
    if record.confidence > 100 {
        return Err(EhrError::Config(format!(
            "Confidence {} for {} exceeds 100",
            record.confidence, record.condition
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rules_are_valid() {
        assert!(RuleSet::standard().validate().is_ok());
    }

    #[test]
    fn test_glioma_any_case_any_scan() {
        let rules = RuleSet::standard();
        for scan_type in ScanType::ALL {
            for filename in ["glioma.png", "GLIOMA_tumor.jpg", "left_GlIoMa_mass_chest.bmp"] {
                let record = rules.match_diagnosis(filename, scan_type);
                assert_eq!(record.condition, "Glioblastoma Multiforme");
                assert_eq!(record.severity, Severity::High);
            }
        }
    }

    #[test]
    fn test_meningioma() {
        let rules = RuleSet::standard();
        for scan_type in ScanType::ALL {
            let record = rules.match_diagnosis("Meningioma_Tumor_01.jpg", scan_type);
            assert_eq!(record.condition, "Meningioma");
            assert_eq!(record.severity, Severity::Medium);
            assert_eq!(record.confidence, 88);
        }
    }

    #[test]
    fn test_specific_rule_beats_generic_tumor() {
        let rules = RuleSet::standard();
        let record = rules.match_diagnosis("tumor_pituitary.jpg", ScanType::Mri);
        assert_eq!(record.condition, "Pituitary Adenoma");

        let record = rules.match_diagnosis("tumor_unknown.jpg", ScanType::Mri);
        assert_eq!(record.condition, "Intracranial Neoplasm");
    }

    #[test]
    fn test_scan_type_restriction() {
        let rules = RuleSet::standard();
        assert_eq!(rules.match_diagnosis("stroke.png", ScanType::Mri).confidence, 89);
        assert_eq!(rules.match_diagnosis("stroke.png", ScanType::Ct).confidence, 82);
        assert_eq!(
            rules.match_diagnosis("stroke.png", ScanType::XRay).condition,
            "Suspected Cerebrovascular Event"
        );
    }

    #[test]
    fn test_fracture_ignores_scan_type() {
        let rules = RuleSet::standard();
        for scan_type in ScanType::ALL {
            assert_eq!(rules.match_diagnosis("wrist_fracture.jpg", scan_type).condition, "Bone Fracture");
            let record = rules.match_diagnosis("Skull_Fracture_01.png", scan_type);
            assert_eq!(record.condition, "Skull Fracture");
            assert_eq!(record.severity, Severity::High);
        }
    }

    #[test]
    fn test_no_category_keyword_gives_default() {
        let rules = RuleSet::standard();
        for filename in ["mri_cyst.png", "scan_bleed.png", "sinus_view.jpg", "IMG_0042.jpeg", "lesion.png"] {
            for scan_type in ScanType::ALL {
                assert_eq!(
                    rules.match_diagnosis(filename, scan_type),
                    rules.defaults().for_scan(scan_type),
                    "{} as {}",
                    filename,
                    scan_type
                );
            }
        }
    }

    #[test]
    fn test_normal_per_scan_type() {
        let rules = RuleSet::standard();
        let record = rules.match_diagnosis("ct_normal_head.png", ScanType::Ct);
        assert_eq!(record.condition, "Normal CT Head");
        assert_eq!(record.severity, Severity::None);

        assert_eq!(rules.match_diagnosis("healthy.png", ScanType::Mri).condition, "Normal MRI Brain");
        assert_eq!(rules.match_diagnosis("normal.png", ScanType::XRay).condition, "Normal Chest X-Ray");
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let rules = RuleSet::standard();

        let mri = rules.match_diagnosis("xxxxx.dat", ScanType::Mri);
        assert_eq!(mri.condition, "Mild Cerebral Atrophy");
        assert_eq!(mri.severity, Severity::None);
        assert!(mri.confidence >= 80);

        for scan_type in ScanType::ALL {
            let record = rules.match_diagnosis("", scan_type);
            assert_eq!(record, rules.defaults().for_scan(scan_type));
            assert!((90..=95).contains(&record.confidence));
        }
    }

    #[test]
    fn test_rule_order_is_significant() {
        let first = DiagnosisRule::new(&["alpha"], None, DiagnosisRecord::new("First", 50, Severity::Low, ""));
        let second = DiagnosisRule::new(&["beta"], None, DiagnosisRecord::new("Second", 60, Severity::High, ""));
        let defaults = RuleSet::standard().defaults().clone();

        let forward = RuleSet::new(vec![first.clone(), second.clone()], defaults.clone()).unwrap();
        let reversed = RuleSet::new(vec![second, first], defaults).unwrap();

        assert_eq!(forward.match_diagnosis("alpha_beta", ScanType::Mri).condition, "First");
        assert_eq!(reversed.match_diagnosis("alpha_beta", ScanType::Mri).condition, "Second");
    }

    #[test]
    fn test_new_normalizes_keywords() {
        let rule = DiagnosisRule {
            keywords: vec![" Lesion ".to_string()],
            scan_type: None,
            record: DiagnosisRecord::new("Lesion", 80, Severity::Medium, "x"),
        };
        let rules = RuleSet::new(vec![rule], RuleSet::standard().defaults().clone()).unwrap();
        assert_eq!(rules.match_diagnosis("LESION.png", ScanType::Ct).condition, "Lesion");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let defaults = RuleSet::standard().defaults().clone();

        let blank = DiagnosisRule::new(&["  "], None, DiagnosisRecord::new("X", 50, Severity::Low, ""));
        assert!(matches!(RuleSet::new(vec![blank], defaults.clone()), Err(EhrError::Config(_))));

        let no_keywords = DiagnosisRule::new(&[], None, DiagnosisRecord::new("X", 50, Severity::Low, ""));
        assert!(RuleSet::new(vec![no_keywords], defaults.clone()).is_err());

        let too_confident = DiagnosisRule::new(&["x"], None, DiagnosisRecord::new("X", 101, Severity::Low, ""));
        assert!(RuleSet::new(vec![too_confident], defaults).is_err());
    }
}
