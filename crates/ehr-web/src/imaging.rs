//! 影像上传分析处理器

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ehr_core::{utils::format_timestamp, EhrError, Result, ScanType, Verdict};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::error::ApiResult;
use crate::server::AppState;

/// 上传文件的表单字段名
const FILE_FIELD: &str = "file";
/// 可选的检查类型字段名
const SCAN_TYPE_FIELD: &str = "scan_type";

/// 已解析的上传内容
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
    pub declared_scan_type: Option<ScanType>,
}

/// 分析结果（结论加耗时）
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub analysis_time: String,
}

/// 影像分析响应
#[derive(Debug, Serialize)]
pub struct AnalyzeImageResponse {
    pub success: bool,
    pub filename: String,
    pub image_data: String,
    pub analysis: AnalysisReport,
    pub timestamp: String,
}

/// 影像分析处理器
///
/// 只接受 `image/*` 类型的上传，其余一律在调用分析引擎之前拒绝。
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalyzeImageResponse>> {
    let upload = read_upload(&mut multipart).await?;

    info!(
        "Analyzing upload {} ({}, {} bytes, declared scan type: {:?})",
        upload.filename,
        upload.content_type,
        upload.data.len(),
        upload.declared_scan_type
    );

    let started = Instant::now();
    let verdict = state
        .engine
        .analyze(&upload.filename, upload.declared_scan_type);
    let elapsed = started.elapsed();

    info!(
        "Upload {} classified as {} / {} ({}%)",
        upload.filename, verdict.scan_type, verdict.diagnosis, verdict.confidence
    );

    Ok(Json(AnalyzeImageResponse {
        success: true,
        image_data: format!(
            "data:{};base64,{}",
            upload.content_type,
            STANDARD.encode(&upload.data)
        ),
        filename: upload.filename,
        analysis: AnalysisReport {
            verdict,
            analysis_time: format!("{:.3} seconds", elapsed.as_secs_f64()),
        },
        timestamp: format_timestamp(chrono::Utc::now()),
    }))
}

/// 解析multipart表单
async fn read_upload(multipart: &mut Multipart) -> Result<ImageUpload> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut declared_scan_type = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Malformed multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            FILE_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();

                if !content_type.starts_with("image/") {
                    return Err(EhrError::Validation("Invalid image file".to_string()));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| upload_error("Failed to read upload", e))?;
                file = Some((filename, content_type, data));
            }
            SCAN_TYPE_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| upload_error("Failed to read scan type", e))?;
                if !text.trim().is_empty() {
                    declared_scan_type = Some(text.parse::<ScanType>()?);
                }
            }
            _ => {}
        }
    }

    let (filename, content_type, data) = file
        .ok_or_else(|| EhrError::Validation("Missing file field".to_string()))?;

    Ok(ImageUpload {
        filename,
        content_type,
        data,
        declared_scan_type,
    })
}

/// 超出上传大小限制时返回 413，其余读取错误视为请求格式错误
fn upload_error(context: &str, err: MultipartError) -> EhrError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        EhrError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", err))
    } else {
        EhrError::Validation(format!("{}: {}", context, err))
    }
}
