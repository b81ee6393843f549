//! 检查类型识别
//!
//! 根据文件名中的关键字推断影像检查类型。无法识别时固定回落到 MRI。

use ehr_core::ScanType;

/// 识别顺序：先匹配的分组优先
const SCAN_TYPE_TOKENS: [(ScanType, &[&str]); 3] = [
    (ScanType::Mri, &["mri", "brain"]),
    (ScanType::Ct, &["ct", "computed"]),
    (ScanType::XRay, &["xray", "x-ray", "chest"]),
];

/// 无任何关键字时的检查类型
pub const DEFAULT_SCAN_TYPE: ScanType = ScanType::Mri;

/// 根据文件名识别检查类型
///
/// 大小写不敏感的子串匹配。总是返回结果，空文件名得到 [`DEFAULT_SCAN_TYPE`]。
pub fn classify_scan_type(filename: &str) -> ScanType {
    let filename = filename.to_lowercase();

    SCAN_TYPE_TOKENS
        .iter()
        .find(|(_, tokens)| tokens.iter().any(|token| filename.contains(token)))
        .map(|(scan_type, _)| *scan_type)
        .unwrap_or(DEFAULT_SCAN_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_token() {
        assert_eq!(classify_scan_type("patient_mri_glioma_scan.jpg"), ScanType::Mri);
        assert_eq!(classify_scan_type("Brain_axial.png"), ScanType::Mri);
        assert_eq!(classify_scan_type("ct_normal_head.png"), ScanType::Ct);
        assert_eq!(classify_scan_type("Computed-Tomography.jpg"), ScanType::Ct);
        assert_eq!(classify_scan_type("XRAY_left_hand.jpg"), ScanType::XRay);
        assert_eq!(classify_scan_type("x-ray.png"), ScanType::XRay);
        assert_eq!(classify_scan_type("chest_pa.jpg"), ScanType::XRay);
    }

    #[test]
    fn test_priority_order() {
        // MRI 分组优先于 CT 和 X-RAY
        assert_eq!(classify_scan_type("brain_ct.png"), ScanType::Mri);
        assert_eq!(classify_scan_type("chest_ct.png"), ScanType::Ct);
        // "infarct" 含有 "ct"，按子串规则归为 CT
        assert_eq!(classify_scan_type("infarct.png"), ScanType::Ct);
    }

    #[test]
    fn test_default_scan_type() {
        assert_eq!(classify_scan_type(""), ScanType::Mri);
        assert_eq!(classify_scan_type("xxxxx.dat"), ScanType::Mri);
        assert_eq!(classify_scan_type("   "), ScanType::Mri);
    }
}
