//! HTTP错误响应

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ehr_core::EhrError;
use serde_json::json;
use tracing::{error, warn};

/// 包装核心错误，用于转换为HTTP响应
#[derive(Debug)]
pub struct ApiError(pub EhrError);

/// Web层统一结果类型
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<EhrError> for ApiError {
    fn from(err: EhrError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EhrError::Validation(_) => StatusCode::BAD_REQUEST,
            EhrError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            EhrError::NotFound(_) => StatusCode::NOT_FOUND,
            EhrError::Config(_)
            | EhrError::Io(_)
            | EhrError::Serialization(_)
            | EhrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = Json(json!({
            "error": true,
            "message": self.0.to_string(),
            "detail": self.0.detail(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (EhrError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (EhrError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (EhrError::PayloadTooLarge("big".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (EhrError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                EhrError::Io(std::io::Error::new(std::io::ErrorKind::Other, "io")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError(EhrError::NotFound("Patient not found".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], true);
        assert_eq!(body["detail"], "Patient not found");
        assert_eq!(body["status"], 404);
    }
}
