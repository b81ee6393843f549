//! 核心数据模型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EhrError;

/// 影像检查类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScanType {
    #[serde(rename = "MRI")]
    Mri, // 磁共振
    #[serde(rename = "CT")]
    Ct, // 计算机断层
    #[serde(rename = "X-RAY")]
    XRay, // X线平片
}

impl ScanType {
    /// 全部检查类型，按声明顺序
    pub const ALL: [ScanType; 3] = [ScanType::Mri, ScanType::Ct, ScanType::XRay];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Mri => "MRI",
            ScanType::Ct => "CT",
            ScanType::XRay => "X-RAY",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = EhrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MRI" => Ok(ScanType::Mri),
            "CT" => Ok(ScanType::Ct),
            "X-RAY" | "XRAY" => Ok(ScanType::XRay),
            other => Err(EhrError::Validation(format!(
                "Unknown scan type '{}', expected one of MRI, CT, X-RAY",
                other
            ))),
        }
    }
}

/// 临床严重程度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    None,   // 无
    Low,    // 低
    Medium, // 中
    High,   // 高
}

/// 诊断结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosisRecord {
    pub condition: String,
    pub confidence: u8, // 0-100
    pub severity: Severity,
    pub description: String,
}

impl DiagnosisRecord {
    pub fn new(
        condition: impl Into<String>,
        confidence: u8,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            confidence,
            severity,
            description: description.into(),
        }
    }
}

/// 一次分析调用的完整结论
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub scan_type: ScanType,
    pub diagnosis: String,
    pub confidence: u8,
    pub severity: Severity,
    pub description: String,
    pub recommendations: Vec<String>,
}

/// 性别枚举
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(text)
    }
}

/// 患者基本信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: String, // 医院内部患者ID
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub diagnosis: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default = "default_patient_scan_type")]
    pub scan_type: ScanType,
}

fn default_patient_scan_type() -> ScanType {
    ScanType::Mri
}
