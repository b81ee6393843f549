//! Web服务器

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use ehr_analysis::AnalysisEngine;
use ehr_core::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::{api_root, generate_summary, health};
use crate::imaging::analyze_image;
use crate::patients::{get_patient, search_patients, PatientDirectory};
use crate::static_files::{frontend_service, images_service};
use crate::summary::Summarizer;

/// 处理器共享状态，启动时构建一次
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    pub summarizer: Arc<dyn Summarizer>,
    pub patients: Arc<PatientDirectory>,
}

impl AppState {
    pub fn new(
        engine: AnalysisEngine,
        summarizer: impl Summarizer + 'static,
        patients: PatientDirectory,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            summarizer: Arc::new(summarizer),
            patients: Arc::new(patients),
        }
    }
}

/// Web层配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub enable_cors: bool,
    pub images_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            images_dir: PathBuf::from("images"),
            static_dir: None,
            max_upload_bytes: 20 * 1024 * 1024, // 20MB
        }
    }
}

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState, config: &WebConfig) -> Self {
        let app = create_app(state, config);

        Self { addr, app }
    }

    /// 运行直到收到 Ctrl-C
    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// 构建路由
pub fn create_app(state: AppState, config: &WebConfig) -> Router {
    let mut app = Router::new()
        // 根路径与健康检查
        .route("/", get(api_root))
        .route("/health", get(health))

        // 影像分析
        .route("/analyze-image", post(analyze_image))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))

        // 摘要与患者
        .route("/generate-summary", post(generate_summary))
        .route("/patient/:patient_id", get(get_patient))
        .route("/patients/search", get(search_patients))

        // 影像文件
        .nest_service("/images", images_service(&config.images_dir))
        .with_state(state);

    if let Some(static_dir) = &config.static_dir {
        app = app.fallback_service(frontend_service(static_dir));
    }

    // 全局中间件
    let app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if config.enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}
