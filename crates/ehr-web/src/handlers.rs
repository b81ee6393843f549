//! HTTP处理器

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::server::AppState;

/// 服务根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "AI Enhanced EHR System",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// 摘要请求
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub text: String,
}

/// 摘要生成处理器
pub async fn generate_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> impl IntoResponse {
    info!("Generating summary for {} characters of text", request.text.chars().count());

    Json(json!({
        "summary": state.summarizer.summarize(&request.text)
    }))
}
