//! 影像分析引擎
//!
//! 组合检查类型识别、诊断规则匹配和临床建议查询。引擎在启动时构建一次，
//! 之后只读，可以被任意数量的请求处理器并发调用。

use ehr_core::{DiagnosisRecord, EhrError, Result, ScanType, Verdict};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::classifier::classify_scan_type;
use crate::recommendations::RecommendationTable;
use crate::rules::{DefaultRecords, DiagnosisRule, RuleSet};

/// 自定义规则文件格式（TOML）
#[derive(Debug, Deserialize)]
struct RuleFile {
    fallback: Vec<String>,
    #[serde(default)]
    rules: Vec<DiagnosisRule>,
    defaults: DefaultRecords,
    #[serde(default)]
    recommendations: HashMap<String, Vec<String>>,
}

/// 影像分析引擎
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    rules: RuleSet,
    recommendations: RecommendationTable,
}

impl AnalysisEngine {
    pub fn new(rules: RuleSet, recommendations: RecommendationTable) -> Self {
        for condition in rules.conditions() {
            if !recommendations.contains(condition) {
                warn!("No recommendations configured for {}, fallback will be used", condition);
            }
        }

        Self { rules, recommendations }
    }

    /// 使用标准规则表和建议表
    pub fn standard() -> Self {
        Self {
            rules: RuleSet::standard(),
            recommendations: RecommendationTable::standard(),
        }
    }

    /// 从TOML文本加载规则表和建议表
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(content)
            .map_err(|e| EhrError::Config(format!("Invalid rule file: {}", e)))?;

        let rules = RuleSet::new(file.rules, file.defaults)?;
        let recommendations = RecommendationTable::new(file.recommendations, file.fallback)?;

        Ok(Self::new(rules, recommendations))
    }

    /// 从TOML文件加载规则表和建议表
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let engine = Self::from_toml_str(&content)?;

        info!(
            "Loaded {} diagnosis rules from {}",
            engine.rules.rules().len(),
            path.display()
        );
        Ok(engine)
    }

    /// 分析一次上传
    ///
    /// 声明了检查类型时直接使用，否则从文件名识别。相同输入总是得到相同结论。
    pub fn analyze(&self, filename: &str, declared_scan_type: Option<ScanType>) -> Verdict {
        let scan_type = declared_scan_type.unwrap_or_else(|| classify_scan_type(filename));
        let record = self.match_diagnosis(filename, scan_type);

        Verdict {
            scan_type,
            diagnosis: record.condition.clone(),
            confidence: record.confidence,
            severity: record.severity,
            description: record.description.clone(),
            recommendations: self.recommend(&record.condition).to_vec(),
        }
    }

    pub fn match_diagnosis(&self, filename: &str, scan_type: ScanType) -> &DiagnosisRecord {
        self.rules.match_diagnosis(filename, scan_type)
    }

    pub fn recommend(&self, condition: &str) -> &[String] {
        self.recommendations.recommend(condition)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::standard()
    }
}
