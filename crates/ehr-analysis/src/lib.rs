//! # EHR影像分析模块
//!
//! 根据上传文件名给出确定性的诊断结论，包括：
//! - 检查类型识别：从文件名关键字推断 MRI / CT / X-RAY
//! - 诊断规则匹配：有序关键字规则，首条命中生效，无命中时使用默认诊断
//! - 临床建议查询：诊断名称到建议列表的固定映射，带通用兜底
//!
//! 引擎不读取影像内容，只依赖文件名和检查类型。

pub mod classifier;
pub mod engine;
pub mod recommendations;
pub mod rules;

// 重新导出主要类型
pub use classifier::{classify_scan_type, DEFAULT_SCAN_TYPE};
pub use engine::AnalysisEngine;
pub use recommendations::RecommendationTable;
pub use rules::{DefaultRecords, DiagnosisRule, RuleSet};
